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

//! Composes [`common_storage`]'s listing primitives and the
//! [`crate::footer`]/[`crate::schema`] decoders into a single
//! [`crate::models::Dataset`] value.

use common_exception::ErrorCode;
use common_exception::Result;
use common_storage::ensure_trailing_slash;
use common_storage::list_directories;
use common_storage::list_objects;
use common_storage::split_s3;
use futures::StreamExt;
use once_cell::sync::Lazy;
use opendal::Operator;
use regex::Regex;
use time::OffsetDateTime;

use crate::footer::read_file_metadata;
use crate::models::Column;
use crate::models::Dataset;
use crate::models::Partition;
use crate::schema::project_columns;

static DATASET_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^[a-z][a-z0-9]*(?:[_-]?[a-z0-9]+)*$").unwrap());
static VERSION_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^v[0-9]+$").unwrap());
static PARTITION_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^=/]+=[^=/]+(?:/[^=/]+=[^=/]+)*$").unwrap());

fn last_segment(uri: &str) -> String {
    uri.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Immediate dataset roots one level below `root`, as full
/// `s3://bucket/...` URIs, filtered to names matching the dataset
/// naming convention.
pub async fn get_datasets(op: &Operator, root: &str) -> Result<Vec<String>> {
    let (bucket, key) = split_s3(root);
    let key = ensure_trailing_slash(&key);
    let dirs = list_directories(op, &key).await?;
    Ok(dirs
        .into_iter()
        .filter(|dir| DATASET_NAME.is_match(&last_segment(dir)))
        .map(|dir| format!("s3://{}/{}", bucket, ensure_trailing_slash(&dir)))
        .collect())
}

/// Immediate `vN/` version directories one level below `root`, as
/// full `s3://bucket/...` URIs.
pub async fn get_versions(op: &Operator, root: &str) -> Result<Vec<String>> {
    let (bucket, key) = split_s3(root);
    let key = ensure_trailing_slash(&key);
    let dirs = list_directories(op, &key).await?;
    Ok(dirs
        .into_iter()
        .filter(|dir| VERSION_NAME.is_match(&last_segment(dir)))
        .map(|dir| format!("s3://{}/{}", bucket, ensure_trailing_slash(&dir)))
        .collect())
}

/// `(name, version)` parsed off the trailing one or two path segments
/// of a dataset location.
fn parse_name_and_version(key: &str) -> Option<(String, Option<String>)> {
    let segments: Vec<&str> = key.trim_end_matches('/').split('/').filter(|s| !s.is_empty()).collect();
    let last = *segments.last()?;
    if VERSION_NAME.is_match(last) {
        let name = *segments.get(segments.len().checked_sub(2)?)?;
        Some((name.to_string(), Some(last.to_string())))
    } else {
        Some((last.to_string(), None))
    }
}

/// Scans the single object-mode pass under `location` and builds the
/// `Dataset` it describes. Returns `ErrorCode::NoDatasetAtLocation`
/// (a recoverable error, per [`common_exception::ErrorCode::is_recoverable`])
/// when `location` yields no usable Parquet object.
pub async fn get_dataset(op: &Operator, location: &str) -> Result<Dataset> {
    let location = ensure_trailing_slash(location);
    let (bucket, key) = split_s3(&location);
    let (name, version) = parse_name_and_version(&key)
        .ok_or_else(|| ErrorCode::NoDatasetAtLocation(location.clone()))?;

    let mut best_key: Option<String> = None;
    let mut best_size: u64 = 0;
    let mut best_modified = OffsetDateTime::UNIX_EPOCH;
    let mut partition_paths = std::collections::BTreeSet::new();

    let mut objects = list_objects(op, &key);
    while let Some(summary) = objects.next().await.transpose()? {
        let relative = summary.key.strip_prefix(&key).unwrap_or(&summary.key);
        if let Some(slash) = relative.rfind('/') {
            let partition_path = &relative[..slash];
            if PARTITION_PATH.is_match(partition_path) {
                partition_paths.insert(partition_path.to_string());
            }
        }
        if best_key.is_none() || summary.last_modified > best_modified {
            best_key = Some(summary.key.clone());
            best_size = summary.size;
            best_modified = summary.last_modified;
        }
    }

    let best_key = best_key.ok_or_else(|| ErrorCode::NoDatasetAtLocation(location.clone()))?;
    let metadata = read_file_metadata(op, &best_key, best_size).await?;
    let columns = project_columns(&metadata.schema)?;

    let partition_keys: Vec<Column> = match partition_paths.iter().next_back() {
        Some(last) => last
            .split('/')
            .map(|segment| {
                let key_name = segment.split('=').next().unwrap_or_default();
                Column::new(key_name, "string")
            })
            .collect(),
        None => Vec::new(),
    };

    let partitions = partition_paths
        .into_iter()
        .map(|partition_path| {
            let values = partition_path
                .split('/')
                .map(|segment| segment.splitn(2, '=').nth(1).unwrap_or_default().to_string())
                .collect();
            Partition {
                values,
                columns: columns.clone(),
                location: format!("s3://{}/{}{}/", bucket, key, partition_path),
            }
        })
        .collect();

    Ok(Dataset {
        name,
        version,
        columns,
        partitions,
        location,
        partition_keys,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_only_location() {
        assert_eq!(
            parse_name_and_version("ds/"),
            Some(("ds".to_string(), None))
        );
    }

    #[test]
    fn parses_name_and_version() {
        assert_eq!(
            parse_name_and_version("prefix/ds/v3/"),
            Some(("ds".to_string(), Some("v3".to_string())))
        );
    }

    #[test]
    fn rejects_an_empty_location() {
        assert_eq!(parse_name_and_version("/"), None);
    }
}
