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

//! Pure string operations on dataset locations and table names. No
//! I/O, nothing async; these are unit-tested in isolation from the
//! object store and the catalogs.

use once_cell::sync::Lazy;
use regex::Regex;

pub fn ensure_trailing_slash(s: &str) -> String {
    if s.ends_with('/') {
        s.to_string()
    } else {
        format!("{}/", s)
    }
}

pub fn remove_trailing_slash(s: &str) -> String {
    s.strip_suffix('/').unwrap_or(s).to_string()
}

/// Split an (optionally `s3://`-prefixed) URI into `(bucket, key)`. A
/// bare bucket with no further path returns `(bucket, "")`.
pub fn split_s3(uri: &str) -> (String, String) {
    let stripped = uri.strip_prefix("s3://").unwrap_or(uri);
    match stripped.split_once('/') {
        Some((bucket, key)) => (bucket.to_string(), key.to_string()),
        None => (stripped.to_string(), String::new()),
    }
}

static ACRONYM_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"([A-Z]+)([A-Z][a-z])").unwrap());
static WORD_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])").unwrap());

/// Canonicalize a dataset name into a Hive-safe table-name stem:
/// insert `_` at acronym and camel-case word boundaries, fold `-`
/// into `_`, lowercase. Idempotent: `underscore(underscore(s)) ==
/// underscore(s)`.
pub fn underscore(s: &str) -> String {
    let s = ACRONYM_BOUNDARY.replace_all(s, "${1}_${2}");
    let s = WORD_BOUNDARY.replace_all(&s, "${1}_${2}");
    s.replace('-', "_").to_lowercase()
}

/// Lazily group a slice into fixed-size chunks; the last chunk may be
/// shorter. A thin wrapper over `slice::chunks` kept as a named
/// function so call sites read the same as the original `chunks(l,
/// n)` helper.
pub fn chunks<T>(items: &[T], n: usize) -> std::slice::Chunks<'_, T> {
    items.chunks(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_roundtrip() {
        assert_eq!(ensure_trailing_slash("s3://bucket/a"), "s3://bucket/a/");
        assert_eq!(ensure_trailing_slash("s3://bucket/a/"), "s3://bucket/a/");
        assert_eq!(remove_trailing_slash("s3://bucket/a/"), "s3://bucket/a");
        assert_eq!(remove_trailing_slash("s3://bucket/a"), "s3://bucket/a");
    }

    #[test]
    fn trailing_slash_identity_when_present() {
        let with_slash = "s3://bucket/a/b/";
        assert_eq!(
            ensure_trailing_slash(&remove_trailing_slash(with_slash)),
            with_slash
        );
    }

    #[test]
    fn split_s3_with_and_without_scheme() {
        assert_eq!(
            split_s3("s3://my-bucket/prefix/key"),
            ("my-bucket".to_string(), "prefix/key".to_string())
        );
        assert_eq!(
            split_s3("my-bucket/prefix/key"),
            ("my-bucket".to_string(), "prefix/key".to_string())
        );
        assert_eq!(
            split_s3("s3://my-bucket"),
            ("my-bucket".to_string(), "".to_string())
        );
    }

    #[test]
    fn underscore_boundaries() {
        assert_eq!(underscore("PageViews"), "page_views");
        assert_eq!(underscore("HTTPResponse"), "http_response");
        assert_eq!(underscore("user-events"), "user_events");
        assert_eq!(underscore("already_snake"), "already_snake");
    }

    #[test]
    fn underscore_is_idempotent() {
        for s in ["PageViews", "HTTPResponse", "user-events", "plain"] {
            let once = underscore(s);
            assert_eq!(underscore(&once), once);
        }
    }

    #[test]
    fn chunks_splits_with_short_last_chunk() {
        let items = [1, 2, 3, 4, 5];
        let grouped: Vec<Vec<i32>> = chunks(&items, 2).map(|c| c.to_vec()).collect();
        assert_eq!(grouped, vec![vec![1, 2], vec![3, 4], vec![5]]);
    }
}
