// Copyright 2024 The Lakesync Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Core library behind the `lakesync` binary: dataset discovery over
//! an object store, Parquet footer/schema decoding, and metastore
//! reconciliation against either catalog back-end.

pub mod catalogs;
pub mod dataset;
pub mod footer;
pub mod models;
pub mod reconciler;
pub mod schema;

pub use reconciler::reconcile;
pub use reconciler::ReconcileOutcome;
pub use reconciler::Reconciler;
