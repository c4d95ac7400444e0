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

//! In-memory value types shared by every dataset-discovery and
//! catalog component. All five are immutable once built; the
//! reconciler never mutates one in place, it builds a new value.

use std::cmp::Ordering;
use std::hash::Hash;
use std::hash::Hasher;

/// A named, Hive-typed column. Equality and hashing are over the pair
/// `(name, type)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    pub name: String,
    pub type_: String,
}

impl Column {
    pub fn new(name: impl Into<String>, type_: impl Into<String>) -> Self {
        Column {
            name: name.into().to_lowercase(),
            type_: type_.into(),
        }
    }
}

/// One partition of a dataset. Equality, ordering and hashing are
/// solely over `location` — two partitions describing the same
/// storage path are "the same" partition even mid-reconciliation,
/// when `columns` may still reflect the catalog's stale view.
#[derive(Debug, Clone)]
pub struct Partition {
    pub values: Vec<String>,
    pub columns: Vec<Column>,
    pub location: String,
}

impl PartialEq for Partition {
    fn eq(&self, other: &Self) -> bool {
        self.location == other.location
    }
}

impl Eq for Partition {}

impl Hash for Partition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.location.hash(state);
    }
}

impl PartialOrd for Partition {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Partition {
    fn cmp(&self, other: &Self) -> Ordering {
        self.location.cmp(&other.location)
    }
}

impl Partition {
    /// A partition carrying `dataset_columns` instead of its current
    /// `columns`, keeping `values` and `location` unchanged — the
    /// value-semantics form of "rewrite this partition's columns".
    pub fn with_columns(&self, columns: Vec<Column>) -> Partition {
        Partition {
            values: self.values.clone(),
            columns,
            location: self.location.clone(),
        }
    }
}

/// A Hive-compatible external table. `columns` excludes the partition
/// keys; `location` is the dataset root (trailing slash).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub database_name: String,
    pub name: String,
    pub columns: Vec<Column>,
    pub location: String,
    pub partition_keys: Vec<Column>,
}

/// A discovered dataset: the schema and partition set found under one
/// `{root}/{dataset}/[vN/]` prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    pub name: String,
    pub version: Option<String>,
    pub columns: Vec<Column>,
    pub partitions: Vec<Partition>,
    pub location: String,
    pub partition_keys: Vec<Column>,
}

impl Dataset {
    /// The numeric suffix of `version` (`"v12"` → `12`), used to order
    /// datasets by recency. Datasets with no version sort before any
    /// versioned dataset.
    fn version_number(&self) -> u64 {
        self.version
            .as_deref()
            .and_then(|v| v.strip_prefix('v'))
            .and_then(|n| n.parse::<u64>().ok())
            .unwrap_or(0)
    }
}

impl PartialOrd for Dataset {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Dataset {
    fn cmp(&self, other: &Self) -> Ordering {
        self.version_number().cmp(&other.version_number())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_equality_ignores_columns() {
        let a = Partition {
            values: vec!["1".to_string()],
            columns: vec![Column::new("a", "int")],
            location: "s3://b/ds/k=1/".to_string(),
        };
        let b = Partition {
            values: vec!["1".to_string()],
            columns: vec![Column::new("a", "int"), Column::new("b", "string")],
            location: "s3://b/ds/k=1/".to_string(),
        };
        assert_eq!(a, b);
    }

    #[test]
    fn dataset_ordering_is_by_numeric_version_suffix() {
        let mut ds = vec![
            Dataset {
                name: "ds".to_string(),
                version: Some("v2".to_string()),
                columns: vec![],
                partitions: vec![],
                location: "s3://b/ds/v2/".to_string(),
                partition_keys: vec![],
            },
            Dataset {
                name: "ds".to_string(),
                version: Some("v10".to_string()),
                columns: vec![],
                partitions: vec![],
                location: "s3://b/ds/v10/".to_string(),
                partition_keys: vec![],
            },
        ];
        ds.sort();
        assert_eq!(ds[0].version.as_deref(), Some("v2"));
        assert_eq!(ds[1].version.as_deref(), Some("v10"));
    }
}
