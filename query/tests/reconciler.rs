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

//! Drives [`Reconciler::reconcile_table`] against a hand-rolled
//! in-memory `Catalog` double, covering the decision tree's concrete
//! column-update, relocation and no-op scenarios without standing up a
//! real object store or metastore.

use std::collections::BTreeMap;
use std::pin::Pin;
use std::sync::Mutex;

use async_trait::async_trait;
use common_exception::Result;
use futures::stream;
use futures::Stream;
use futures::StreamExt;
use lakesync_query::catalogs::Catalog;
use lakesync_query::catalogs::CatalogTable;
use lakesync_query::models::Column;
use lakesync_query::models::Dataset;
use lakesync_query::models::Partition;
use lakesync_query::models::Table;
use lakesync_query::reconciler::Reconciler;
use lakesync_query::reconciler::TableAction;
use opendal::services::memory;
use opendal::Operator;

#[derive(Debug, Default)]
struct Calls {
    created: Vec<String>,
    updated: Vec<String>,
    dropped: Vec<String>,
}

/// An in-memory `Catalog`: tables keyed by name, each carrying its own
/// partition list. Call counters let tests assert exactly which
/// catalog mutations a scenario performed.
struct FakeCatalog {
    tables: Mutex<BTreeMap<String, FakeTableState>>,
    calls: Mutex<Calls>,
}

#[derive(Clone)]
struct FakeTableState {
    table: Table,
    partitions: Vec<Partition>,
}

impl FakeCatalog {
    fn new() -> Self {
        FakeCatalog {
            tables: Mutex::new(BTreeMap::new()),
            calls: Mutex::new(Calls::default()),
        }
    }

    fn seed(&self, name: &str, table: Table, partitions: Vec<Partition>) {
        self.tables
            .lock()
            .unwrap()
            .insert(name.to_string(), FakeTableState { table, partitions });
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn get(&self, _db: &str, name: &str) -> Result<Option<Box<dyn CatalogTable>>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.get(name).map(|state| {
            Box::new(FakeTable {
                name: name.to_string(),
                state: state.clone(),
            }) as Box<dyn CatalogTable>
        }))
    }

    async fn create(
        &self,
        _db: &str,
        name: &str,
        columns: Vec<Column>,
        location: String,
        partition_keys: Vec<Column>,
    ) -> Result<Box<dyn CatalogTable>> {
        let table = Table {
            database_name: "telemetry".to_string(),
            name: name.to_string(),
            columns,
            location,
            partition_keys,
        };
        self.seed(name, table.clone(), Vec::new());
        self.calls.lock().unwrap().created.push(name.to_string());
        Ok(Box::new(FakeTable {
            name: name.to_string(),
            state: FakeTableState {
                table,
                partitions: Vec::new(),
            },
        }))
    }

    async fn update(
        &self,
        _db: &str,
        name: &str,
        columns: Vec<Column>,
        location: String,
        partition_keys: Vec<Column>,
    ) -> Result<Box<dyn CatalogTable>> {
        let mut tables = self.tables.lock().unwrap();
        let state = tables.get_mut(name).expect("update on unknown table");
        state.table.columns = columns;
        state.table.location = location;
        state.table.partition_keys = partition_keys;
        let state = state.clone();
        drop(tables);
        self.calls.lock().unwrap().updated.push(name.to_string());
        Ok(Box::new(FakeTable {
            name: name.to_string(),
            state,
        }))
    }

    async fn drop_table(&self, _db: &str, name: &str) -> Result<()> {
        self.tables.lock().unwrap().remove(name);
        self.calls.lock().unwrap().dropped.push(name.to_string());
        Ok(())
    }

    fn add_batch_size(&self) -> usize {
        100
    }
}

struct FakeTable {
    name: String,
    state: FakeTableState,
}

#[async_trait]
impl CatalogTable for FakeTable {
    fn table(&self) -> &Table {
        &self.state.table
    }

    fn list_partitions(&self) -> Pin<Box<dyn Stream<Item = Result<Partition>> + Send + '_>> {
        Box::pin(stream::iter(self.state.partitions.clone().into_iter().map(Ok)))
    }

    async fn add_partitions(&self, _partitions: &[Partition], _batch_size: usize) -> Result<()> {
        Ok(())
    }

    async fn update_partitions(&self, _partitions: &[Partition]) -> Result<()> {
        Ok(())
    }
}

fn memory_operator() -> Operator {
    Operator::new(memory::Builder::default().build().unwrap())
}

fn partition(values: &[&str], columns: Vec<Column>, location: &str) -> Partition {
    Partition {
        values: values.iter().map(|v| v.to_string()).collect(),
        columns,
        location: location.to_string(),
    }
}

#[tokio::test]
async fn string_column_update_rewrites_partitions_without_dropping() {
    let catalog = FakeCatalog::new();
    let old_columns = vec![Column::new("a", "int")];
    let new_columns = vec![Column::new("a", "int"), Column::new("b", "string")];

    let existing_table = Table {
        database_name: "telemetry".to_string(),
        name: "t_v3".to_string(),
        columns: old_columns.clone(),
        location: "s3://b/ds/v3/".to_string(),
        partition_keys: vec![Column::new("k", "string")],
    };
    let stale_partition = partition(&["1"], old_columns.clone(), "s3://b/ds/v3/k=1/");
    catalog.seed("t_v3", existing_table, vec![stale_partition]);

    let dataset = Dataset {
        name: "ds".to_string(),
        version: Some("v3".to_string()),
        columns: new_columns.clone(),
        partitions: vec![partition(&["1"], new_columns.clone(), "s3://b/ds/v3/k=1/")],
        location: "s3://b/ds/v3/".to_string(),
        partition_keys: vec![Column::new("k", "string")],
    };

    let op = memory_operator();
    let reconciler = Reconciler::new(&op, &catalog, "telemetry");
    let outcome = reconciler.reconcile_table("t_v3", &dataset).await.unwrap();

    assert_eq!(outcome.action, TableAction::Updated);
    assert_eq!(outcome.partitions_rewritten, 1);
    assert_eq!(outcome.partitions_added, 0);

    let calls = catalog.calls.lock().unwrap();
    assert_eq!(calls.updated, vec!["t_v3".to_string()]);
    assert!(calls.dropped.is_empty());
    assert!(calls.created.is_empty());
}

#[tokio::test]
async fn relocated_floating_alias_is_dropped_and_recreated() {
    let catalog = FakeCatalog::new();
    let columns = vec![Column::new("a", "int")];

    let stale_alias_table = Table {
        database_name: "telemetry".to_string(),
        name: "ds".to_string(),
        columns: columns.clone(),
        location: "s3://b/ds/v2/".to_string(),
        partition_keys: vec![],
    };
    catalog.seed("ds", stale_alias_table, Vec::new());

    let dataset = Dataset {
        name: "ds".to_string(),
        version: Some("v3".to_string()),
        columns: columns.clone(),
        partitions: vec![],
        location: "s3://b/ds/v3/".to_string(),
        partition_keys: vec![],
    };

    let op = memory_operator();
    let reconciler = Reconciler::new(&op, &catalog, "telemetry");

    let versioned = reconciler.reconcile_table("ds_v3", &dataset).await.unwrap();
    assert_eq!(versioned.action, TableAction::Created);

    let floating = reconciler.reconcile_table("ds", &dataset).await.unwrap();
    assert_eq!(floating.action, TableAction::Recreated);

    let calls = catalog.calls.lock().unwrap();
    assert_eq!(calls.dropped, vec!["ds".to_string()]);
    assert!(calls.created.contains(&"ds_v3".to_string()));
    assert!(calls.created.contains(&"ds".to_string()));
}

#[tokio::test]
async fn unchanged_dataset_performs_no_mutating_catalog_calls() {
    let catalog = FakeCatalog::new();
    let columns = vec![Column::new("a", "int")];

    let table = Table {
        database_name: "telemetry".to_string(),
        name: "t_v1".to_string(),
        columns: columns.clone(),
        location: "s3://b/ds/v1/".to_string(),
        partition_keys: vec![Column::new("k", "string")],
    };
    let existing_partition = partition(&["1"], columns.clone(), "s3://b/ds/v1/k=1/");
    catalog.seed("t_v1", table, vec![existing_partition.clone()]);

    let dataset = Dataset {
        name: "ds".to_string(),
        version: Some("v1".to_string()),
        columns: columns.clone(),
        partitions: vec![existing_partition],
        location: "s3://b/ds/v1/".to_string(),
        partition_keys: vec![Column::new("k", "string")],
    };

    let op = memory_operator();
    let reconciler = Reconciler::new(&op, &catalog, "telemetry");
    let outcome = reconciler.reconcile_table("t_v1", &dataset).await.unwrap();

    assert_eq!(outcome.action, TableAction::Unchanged);
    assert_eq!(outcome.partitions_added, 0);
    assert_eq!(outcome.partitions_rewritten, 0);

    let calls = catalog.calls.lock().unwrap();
    assert!(calls.created.is_empty());
    assert!(calls.updated.is_empty());
    assert!(calls.dropped.is_empty());
}
