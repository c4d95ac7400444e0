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

//! Paginated listing over an `opendal::Operator`, in the same two
//! modes the original S3 `ListObjectsV2` call offered: a one-level
//! "directory" mode (common prefixes) and a fully recursive "object"
//! mode (individual file summaries).

use std::pin::Pin;

use common_exception::ErrorCode;
use common_exception::Result;
use futures::Stream;
use once_cell::sync::Lazy;
use opendal::ObjectMode;
use opendal::Operator;
use regex::Regex;
use time::OffsetDateTime;

/// One object found in object mode, after the ignore/size filters
/// have already been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    pub key: String,
    pub size: u64,
    pub last_modified: OffsetDateTime,
}

/// Keys matching this pattern are not part of any dataset: Spark/Hive
/// sidecar files, temporary directories, folder markers, and the
/// legacy `_<token>` convention kept around for historical reasons.
static IGNORED_MATCHER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:.*/)?(?:_spark_metadata/|_common_metadata$|_metadata$|_temporary/|[^/]_\$folder\$$|/$|_[^=/]*(?:/|$))",
    )
    .unwrap()
});

fn is_ignored_key(key: &str) -> bool {
    IGNORED_MATCHER.is_match(key) || key.contains("=__HIVE_DEFAULT_PARTITION__/")
}

/// Directory-mode listing: the immediate subdirectories one level
/// below `prefix`, as full paths (trailing slash). Small and bounded
/// by partition-key cardinality, so this collects eagerly rather than
/// streaming.
pub async fn list_directories(op: &Operator, prefix: &str) -> Result<Vec<String>> {
    let object = op.object(prefix);
    let mut entries = object.list().await?;

    let mut dirs = Vec::new();
    use futures::TryStreamExt;
    while let Some(entry) = entries.try_next().await? {
        if entry.mode() == ObjectMode::DIR {
            dirs.push(entry.path().to_string());
        }
    }
    Ok(dirs)
}

/// Object-mode listing: every filtered object strictly under
/// `prefix`, recursing through subdirectories. Yields lazily so a
/// caller diffing a large partition set never materializes the full
/// result in memory.
pub fn list_objects<'a>(
    op: &'a Operator,
    prefix: &'a str,
) -> Pin<Box<dyn Stream<Item = Result<ObjectSummary>> + 'a>> {
    let stream = async_stream::try_stream! {
        let mut stack = vec![prefix.to_string()];

        while let Some(dir) = stack.pop() {
            let object = op.object(&dir);
            let mut entries = object.list().await.map_err(ErrorCode::from)?;

            use futures::TryStreamExt;
            while let Some(mut entry) = entries.try_next().await.map_err(ErrorCode::from)? {
                match entry.mode() {
                    ObjectMode::DIR => stack.push(entry.path().to_string()),
                    ObjectMode::FILE => {
                        let key = entry.path().to_string();
                        if is_ignored_key(&key) {
                            continue;
                        }
                        let meta = entry.metadata().await.map_err(ErrorCode::from)?;
                        let size = meta.content_length();
                        if size < 12 {
                            continue;
                        }
                        let last_modified = meta.last_modified().unwrap_or(OffsetDateTime::UNIX_EPOCH);
                        yield ObjectSummary { key, size, last_modified };
                    }
                    ObjectMode::Unknown => {
                        Err(ErrorCode::object_store(format!("could not determine object mode for {}", entry.path())))?;
                    }
                }
            }
        }
    };
    Box::pin(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_spark_metadata() {
        assert!(is_ignored_key("ds/v1/_spark_metadata/0"));
        assert!(is_ignored_key("ds/v1/_common_metadata"));
        assert!(is_ignored_key("ds/v1/_metadata"));
        assert!(is_ignored_key("ds/v1/_temporary/0/part-0.parquet"));
        assert!(is_ignored_key("ds/v1/foo_$folder$"));
        assert!(is_ignored_key("ds/v1/_SUCCESS"));
        assert!(is_ignored_key("ds/v1/_delta_log/00000.json"));
    }

    #[test]
    fn ignores_hive_default_partition() {
        assert!(is_ignored_key(
            "ds/v1/k=__HIVE_DEFAULT_PARTITION__/part-0.parquet"
        ));
    }

    #[test]
    fn keeps_ordinary_partition_files() {
        assert!(!is_ignored_key("ds/v1/k=a/part-00000.parquet"));
        assert!(!is_ignored_key("ds/v1/part-00000.parquet"));
    }
}
