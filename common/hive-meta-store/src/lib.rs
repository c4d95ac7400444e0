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

mod client;
pub mod ttypes;

pub use client::ThriftHiveMetastoreClient;
pub use ttypes::DropPartitionsRequest;
pub use ttypes::FieldSchema;
pub use ttypes::NoSuchObjectException;
pub use ttypes::Partition;
pub use ttypes::RequestPartsSpec;
pub use ttypes::SerDeInfo;
pub use ttypes::SkewedInfo;
pub use ttypes::StorageDescriptor;
pub use ttypes::Table;
pub use ttypes::PARQUET_INPUT_FORMAT;
pub use ttypes::PARQUET_OUTPUT_FORMAT;
pub use ttypes::PARQUET_SERDE_LIB;
