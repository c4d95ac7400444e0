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

//! Decodes a Parquet file's trailing `FileMetaData` from two range
//! reads against an object, without fetching the row groups.

use common_exception::ErrorCode;
use common_exception::Result;
use common_parquet_format::decode_file_metadata;
use common_parquet_format::FileMetaData;
use opendal::Operator;

const TRAILER_LEN: u64 = 8;
const MAGIC: &[u8; 4] = b"PAR1";

/// Validates the trailing 8 bytes of a Parquet object (little-endian
/// footer length followed by the `PAR1` magic) and returns the
/// footer's byte length.
fn validate_trailer(tail: &[u8], size: u64) -> Result<u64> {
    if tail.len() != TRAILER_LEN as usize {
        return Err(ErrorCode::parquet("file is too small"));
    }
    if &tail[4..8] != MAGIC {
        return Err(ErrorCode::parquet("magic number is invalid"));
    }
    let footer_length = u32::from_le_bytes([tail[0], tail[1], tail[2], tail[3]]) as u64;
    if footer_length + 12 > size {
        return Err(ErrorCode::parquet("file is too small"));
    }
    Ok(footer_length)
}

/// Reads and decodes the `FileMetaData` at the tail of the object at
/// `key`, which is `size` bytes long.
pub async fn read_file_metadata(op: &Operator, key: &str, size: u64) -> Result<FileMetaData> {
    if size < 12 {
        return Err(ErrorCode::parquet("file is too small"));
    }
    let object = op.object(key);
    let tail = object.range_read(size - TRAILER_LEN..size).await?;
    let footer_length = validate_trailer(&tail, size)?;

    let footer_start = size - TRAILER_LEN - footer_length;
    let footer_bytes = object.range_read(footer_start..size - TRAILER_LEN).await?;
    decode_file_metadata(&footer_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trailer(footer_length: u32) -> Vec<u8> {
        let mut bytes = footer_length.to_le_bytes().to_vec();
        bytes.extend_from_slice(MAGIC);
        bytes
    }

    #[test]
    fn accepts_a_well_formed_trailer() {
        let tail = trailer(20);
        assert_eq!(validate_trailer(&tail, 40).unwrap(), 20);
    }

    #[test]
    fn rejects_a_footer_length_that_does_not_fit() {
        let tail = trailer(100);
        let err = validate_trailer(&tail, 40).unwrap_err();
        assert!(err.to_string().contains("too small"));
    }

    #[test]
    fn rejects_bad_magic() {
        let mut tail = trailer(20);
        tail[7] = b'X';
        let err = validate_trailer(&tail, 40).unwrap_err();
        assert!(err.to_string().contains("magic number is invalid"));
    }
}
