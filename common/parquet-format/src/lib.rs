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

pub mod ttypes;

use std::io::Cursor;

use common_exception::ErrorCode;
use common_exception::Result;
use thrift::protocol::TCompactInputProtocol;

pub use ttypes::ConvertedType;
pub use ttypes::FieldRepetitionType;
pub use ttypes::FileMetaData;
pub use ttypes::SchemaElement;
pub use ttypes::Type;

/// Decode a `FileMetaData` from the raw bytes of a Parquet footer
/// (the Thrift-compact-encoded region between the leading `4 +
/// footer_length` offset and the trailing 8-byte magic/length pair).
pub fn decode_file_metadata(footer_bytes: &[u8]) -> Result<FileMetaData> {
    let mut protocol = TCompactInputProtocol::new(Cursor::new(footer_bytes));
    FileMetaData::read_from_in_protocol(&mut protocol)
        .map_err(|e| ErrorCode::parquet(format!("failed to decode footer: {}", e)))
}
