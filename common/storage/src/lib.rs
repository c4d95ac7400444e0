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

pub mod lister;
pub mod path;

pub use lister::list_directories;
pub use lister::list_objects;
pub use lister::ObjectSummary;
pub use path::chunks;
pub use path::ensure_trailing_slash;
pub use path::remove_trailing_slash;
pub use path::split_s3;
pub use path::underscore;
