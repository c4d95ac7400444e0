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

//! Drives the create/recreate/update/leave-alone decision tree for one
//! dataset root and flushes the resulting partition diff against a
//! catalog back-end. Table mutation always precedes partition
//! mutation, and every partition rewrite is flushed before the trailing
//! partition-add batch, so a reader never observes a partition sitting
//! at an address that isn't yet populated with the expected columns.

use std::collections::BTreeSet;
use std::collections::HashSet;

use common_exception::Result;
use common_storage::underscore;
use futures::StreamExt;
use opendal::Operator;

use crate::catalogs::Catalog;
use crate::dataset::get_dataset;
use crate::dataset::get_datasets;
use crate::dataset::get_versions;
use crate::models::Column;
use crate::models::Dataset;
use crate::models::Partition;

const REWRITE_FLUSH_SIZE: usize = 100;

/// What the reconciler actually did for one target table, surfaced for
/// logging and tests rather than left implicit in log lines alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableAction {
    Created,
    Recreated,
    Updated,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub table_name: String,
    pub action: TableAction,
    pub partitions_added: usize,
    pub partitions_rewritten: usize,
}

fn column_set(columns: &[Column]) -> HashSet<(String, String)> {
    columns.iter().map(|c| (c.name.clone(), c.type_.clone())).collect()
}

fn columns_differ(a: &[Column], b: &[Column]) -> bool {
    column_set(a) != column_set(b)
}

/// One target table name the dataset should be reconciled into, per
/// the naming rule in the module doc: always the versioned name, plus
/// a floating alias when no explicit version was pinned.
fn target_table_names(dataset: &Dataset, alias: Option<&str>, pinned_version: bool) -> Vec<String> {
    let stem = underscore(alias.unwrap_or(&dataset.name));
    // `reconcile_root` always resolves a `vN/` location before loading
    // the dataset, so `version` is populated on every real call path;
    // the empty fallback only matters for synthetic callers in tests.
    let version = dataset.version.clone().unwrap_or_default();
    let mut names = vec![format!("{}_{}", stem, version)];
    if !pinned_version {
        names.push(stem);
    }
    names
}

pub struct Reconciler<'a> {
    pub op: &'a Operator,
    pub catalog: &'a dyn Catalog,
    pub database: String,
}

impl<'a> Reconciler<'a> {
    pub fn new(op: &'a Operator, catalog: &'a dyn Catalog, database: impl Into<String>) -> Self {
        Reconciler {
            op,
            catalog,
            database: database.into(),
        }
    }

    /// Reconciles a single dataset root. `version` pins the version
    /// directory; `None` means "pick the lexicographically largest
    /// `vN/` under `root`".
    pub async fn reconcile_root(
        &self,
        root: &str,
        version: Option<&str>,
        alias: Option<&str>,
    ) -> Result<Vec<ReconcileOutcome>> {
        let pinned_version = version.is_some();
        let location = match version {
            Some(v) => format!("{}{}/", common_storage::ensure_trailing_slash(root), v),
            None => {
                let versions = get_versions(self.op, root).await?;
                match versions.into_iter().max() {
                    Some(v) => v,
                    None => {
                        common_tracing::tracing::warn!(root = %root, "skipping dataset, no version directories found");
                        return Ok(Vec::new());
                    }
                }
            }
        };

        let dataset = match get_dataset(self.op, &location).await {
            Ok(dataset) => dataset,
            Err(e) if e.is_recoverable() => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut outcomes = Vec::new();
        for table_name in target_table_names(&dataset, alias, pinned_version) {
            let outcome = self.reconcile_table(&table_name, &dataset).await?;
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// Iterates every dataset under `root` and reconciles each
    /// independently, logging and continuing past a single dataset's
    /// error rather than aborting the whole sweep. Each discovered
    /// dataset keeps its own name rather than sharing a single alias,
    /// which would otherwise collide every table onto one stem.
    pub async fn discover(&self, root: &str) -> Result<Vec<ReconcileOutcome>> {
        let datasets = get_datasets(self.op, root).await?;
        let mut outcomes = Vec::new();
        for dataset_root in datasets {
            match self.reconcile_root(&dataset_root, None, None).await {
                Ok(mut found) => outcomes.append(&mut found),
                Err(e) => {
                    common_tracing::tracing::warn!(dataset = %dataset_root, error = %e, "skipping dataset after reconciliation error");
                }
            }
        }
        Ok(outcomes)
    }

    /// Runs the decision tree and partition diff for one target table
    /// name against an already-loaded `Dataset`. Exposed as its own
    /// entry point (rather than folded entirely into
    /// [`Reconciler::reconcile_root`]) so tests can drive the catalog
    /// side of reconciliation against a synthetic `Dataset` without
    /// standing up a real object store.
    pub async fn reconcile_table(&self, table_name: &str, dataset: &Dataset) -> Result<ReconcileOutcome> {
        let existing = self.catalog.get(&self.database, table_name).await?;

        let (table, action) = match existing {
            None => {
                let table = self
                    .catalog
                    .create(
                        &self.database,
                        table_name,
                        dataset.columns.clone(),
                        dataset.location.clone(),
                        dataset.partition_keys.clone(),
                    )
                    .await?;
                (table, TableAction::Created)
            }
            Some(existing) if existing.table().location != dataset.location => {
                self.catalog.drop_table(&self.database, table_name).await?;
                let table = self
                    .catalog
                    .create(
                        &self.database,
                        table_name,
                        dataset.columns.clone(),
                        dataset.location.clone(),
                        dataset.partition_keys.clone(),
                    )
                    .await?;
                (table, TableAction::Recreated)
            }
            Some(existing) if columns_differ(&existing.table().columns, &dataset.columns) => {
                let table = self
                    .catalog
                    .update(
                        &self.database,
                        table_name,
                        dataset.columns.clone(),
                        dataset.location.clone(),
                        dataset.partition_keys.clone(),
                    )
                    .await?;
                (table, TableAction::Updated)
            }
            Some(existing) => (existing, TableAction::Unchanged),
        };

        let (added, rewritten) = self.reconcile_partitions(table.as_ref(), dataset).await?;

        Ok(ReconcileOutcome {
            table_name: table_name.to_string(),
            action,
            partitions_added: added,
            partitions_rewritten: rewritten,
        })
    }

    async fn reconcile_partitions(
        &self,
        table: &dyn crate::catalogs::CatalogTable,
        dataset: &Dataset,
    ) -> Result<(usize, usize)> {
        let mut missing: BTreeSet<Partition> = dataset.partitions.iter().cloned().collect();
        let mut different: Vec<Partition> = Vec::new();
        let mut rewritten = 0usize;

        let mut catalog_partitions = table.list_partitions();
        while let Some(catalog_partition) = catalog_partitions.next().await.transpose()? {
            missing.remove(&catalog_partition);
            if columns_differ(&catalog_partition.columns, &dataset.columns) {
                different.push(catalog_partition.with_columns(dataset.columns.clone()));
            }
            if different.len() == REWRITE_FLUSH_SIZE {
                rewritten += different.len();
                table.update_partitions(&different).await?;
                different.clear();
            }
        }
        drop(catalog_partitions);

        if !different.is_empty() {
            rewritten += different.len();
            table.update_partitions(&different).await?;
        }

        let missing: Vec<Partition> = missing.into_iter().collect();
        let added = missing.len();
        if !missing.is_empty() {
            table.add_partitions(&missing, self.catalog.add_batch_size()).await?;
        }

        Ok((added, rewritten))
    }
}

/// Convenience entry point wrapping a single `Reconciler` call, used by
/// the CLI binary.
pub async fn reconcile(
    op: &Operator,
    catalog: &dyn Catalog,
    database: &str,
    root: &str,
    version: Option<&str>,
    alias: Option<&str>,
    discover: bool,
) -> Result<Vec<ReconcileOutcome>> {
    let reconciler = Reconciler::new(op, catalog, database);
    if discover {
        reconciler.discover(root).await
    } else {
        reconciler.reconcile_root(root, version, alias).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ds(name: &str, version: Option<&str>) -> Dataset {
        Dataset {
            name: name.to_string(),
            version: version.map(|v| v.to_string()),
            columns: vec![],
            partitions: vec![],
            location: format!("s3://b/{}/", name),
            partition_keys: vec![],
        }
    }

    #[test]
    fn versioned_dataset_without_pin_gets_versioned_and_floating_names() {
        let dataset = ds("page_views", Some("v3"));
        let names = target_table_names(&dataset, None, false);
        assert_eq!(names, vec!["page_views_v3".to_string(), "page_views".to_string()]);
    }

    #[test]
    fn pinned_version_only_gets_the_versioned_name() {
        let dataset = ds("page_views", Some("v3"));
        let names = target_table_names(&dataset, None, true);
        assert_eq!(names, vec!["page_views_v3".to_string()]);
    }

    #[test]
    fn alias_is_underscored_in_place_of_the_dataset_name() {
        let dataset = ds("PageViews", Some("v1"));
        let names = target_table_names(&dataset, Some("CustomAlias"), false);
        assert_eq!(names, vec!["custom_alias_v1".to_string(), "custom_alias".to_string()]);
    }

    #[test]
    fn column_set_comparison_ignores_order() {
        let a = vec![Column::new("a", "int"), Column::new("b", "string")];
        let b = vec![Column::new("b", "string"), Column::new("a", "int")];
        assert!(!columns_differ(&a, &b));
    }
}
