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

//! The back-end-agnostic catalog interface. [`GlueCatalog`](glue::GlueCatalog)
//! and [`HiveCatalog`](hive::HiveCatalog) are two independent
//! implementors sharing only the in-memory [`Column`]/[`Partition`]/
//! [`Table`] model — never a shared base class.

pub mod glue;
pub mod hive;

use std::pin::Pin;

use async_trait::async_trait;
use common_exception::Result;
use futures::Stream;

use crate::models::Column;
use crate::models::Partition;
use crate::models::Table;

/// Table CRUD against a metastore back-end. Every method here is a
/// suspension point (a single RPC or HTTP call); none retry or pool
/// connections beyond what the underlying client crate does on its
/// own.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn get(&self, db: &str, name: &str) -> Result<Option<Box<dyn CatalogTable>>>;

    async fn create(
        &self,
        db: &str,
        name: &str,
        columns: Vec<Column>,
        location: String,
        partition_keys: Vec<Column>,
    ) -> Result<Box<dyn CatalogTable>>;

    async fn update(
        &self,
        db: &str,
        name: &str,
        columns: Vec<Column>,
        location: String,
        partition_keys: Vec<Column>,
    ) -> Result<Box<dyn CatalogTable>>;

    async fn drop_table(&self, db: &str, name: &str) -> Result<()>;

    /// Batch size for `add_partitions` on tables from this catalog.
    fn add_batch_size(&self) -> usize;
}

/// A handle to one table in a catalog, returned by
/// [`Catalog::get`]/[`Catalog::create`]/[`Catalog::update`]. Partition
/// operations hang off the handle rather than the catalog itself
/// since they always apply to one already-resolved table.
#[async_trait]
pub trait CatalogTable: Send + Sync {
    fn table(&self) -> &Table;

    /// A lazy stream over every partition currently registered for
    /// this table, so the reconciler can diff in bounded memory.
    fn list_partitions(&self) -> Pin<Box<dyn Stream<Item = Result<Partition>> + Send + '_>>;

    async fn add_partitions(&self, partitions: &[Partition], batch_size: usize) -> Result<()>;

    /// Rewrites `partitions` (same `values`, new `columns`) as an
    /// atomic-per-batch drop-then-create.
    async fn update_partitions(&self, partitions: &[Partition]) -> Result<()>;
}
