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

//! A managed HTTP/JSON catalog back-end (the wire shape of a
//! Glue-compatible metastore). Transport is a plain `reqwest` client
//! speaking an AWS-JSON-1.1-style RPC: one endpoint, one `POST` per
//! action, action named in `X-Amz-Target`.

use std::collections::BTreeMap;
use std::pin::Pin;

use async_trait::async_trait;
use common_exception::ErrorCode;
use common_exception::Result;
use futures::Stream;
use serde::Deserialize;
use serde::Serialize;
use serde_json::json;

use super::Catalog;
use super::CatalogTable;
use crate::models::Column;
use crate::models::Partition;
use crate::models::Table;

const ADD_BATCH_SIZE: usize = 50;
const REWRITE_BATCH_SIZE: usize = 25;

#[derive(Debug, Clone)]
pub struct GlueCatalog {
    client: reqwest::Client,
    endpoint: String,
}

impl GlueCatalog {
    pub fn new(endpoint: impl Into<String>) -> Self {
        GlueCatalog {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    async fn call(&self, action: &str, body: &serde_json::Value) -> Result<(bool, String)> {
        let resp = self
            .client
            .post(&self.endpoint)
            .header("X-Amz-Target", format!("AWSGlue.{}", action))
            .header("Content-Type", "application/x-amz-json-1.1")
            .json(body)
            .send()
            .await?;
        let ok = resp.status().is_success();
        let text = resp.text().await?;
        Ok((ok, text))
    }

    async fn call_json<R: for<'de> Deserialize<'de>>(&self, action: &str, body: &serde_json::Value) -> Result<R> {
        let (ok, text) = self.call(action, body).await?;
        if ok {
            serde_json::from_str(&text).map_err(ErrorCode::from)
        } else {
            Err(translate_error(&text))
        }
    }
}

fn translate_error(text: &str) -> ErrorCode {
    if let Ok(body) = serde_json::from_str::<GlueErrorBody>(text) {
        let type_ = body.type_.unwrap_or_default();
        return ErrorCode::catalog(format!("{}: {}", type_, body.message.unwrap_or_default()));
    }
    ErrorCode::catalog(text.to_string())
}

fn is_not_found(text: &str) -> bool {
    text.contains("EntityNotFoundException")
}

#[derive(Debug, Deserialize)]
struct GlueErrorBody {
    #[serde(rename = "__type")]
    type_: Option<String>,
    #[serde(rename = "Message", alias = "message")]
    message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireColumn {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Type")]
    type_: String,
}

impl From<&Column> for WireColumn {
    fn from(c: &Column) -> Self {
        WireColumn {
            name: c.name.clone(),
            type_: c.type_.clone(),
        }
    }
}

impl From<WireColumn> for Column {
    fn from(c: WireColumn) -> Self {
        Column::new(c.name, c.type_)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireSerdeInfo {
    #[serde(rename = "SerializationLibrary")]
    serialization_library: String,
    #[serde(rename = "Parameters")]
    parameters: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireStorageDescriptor {
    #[serde(rename = "Columns")]
    columns: Vec<WireColumn>,
    #[serde(rename = "Location")]
    location: String,
    #[serde(rename = "InputFormat")]
    input_format: String,
    #[serde(rename = "OutputFormat")]
    output_format: String,
    #[serde(rename = "Compressed")]
    compressed: bool,
    #[serde(rename = "NumberOfBuckets")]
    number_of_buckets: i32,
    #[serde(rename = "SerdeInfo")]
    serde_info: WireSerdeInfo,
}

impl WireStorageDescriptor {
    fn template(columns: &[Column], location: &str) -> Self {
        let mut parameters = BTreeMap::new();
        parameters.insert("serialization.format".to_string(), "1".to_string());
        WireStorageDescriptor {
            columns: columns.iter().map(WireColumn::from).collect(),
            location: location.trim_end_matches('/').to_string(),
            input_format: "org.apache.hadoop.hive.ql.io.parquet.MapredParquetInputFormat".to_string(),
            output_format: "org.apache.hadoop.hive.ql.io.parquet.MapredParquetOutputFormat".to_string(),
            compressed: false,
            number_of_buckets: -1,
            serde_info: WireSerdeInfo {
                serialization_library: "org.apache.hadoop.hive.ql.io.parquet.serde.ParquetHiveSerDe".to_string(),
                parameters,
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireTableInput {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "StorageDescriptor")]
    storage_descriptor: WireStorageDescriptor,
    #[serde(rename = "PartitionKeys")]
    partition_keys: Vec<WireColumn>,
    #[serde(rename = "TableType")]
    table_type: String,
    #[serde(rename = "Parameters")]
    parameters: BTreeMap<String, String>,
}

impl WireTableInput {
    fn new(name: &str, columns: &[Column], location: &str, partition_keys: &[Column]) -> Self {
        let mut parameters = BTreeMap::new();
        parameters.insert("EXTERNAL".to_string(), "TRUE".to_string());
        WireTableInput {
            name: name.to_string(),
            storage_descriptor: WireStorageDescriptor::template(columns, location),
            partition_keys: partition_keys.iter().map(WireColumn::from).collect(),
            table_type: "EXTERNAL_TABLE".to_string(),
            parameters,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireTable {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "StorageDescriptor")]
    storage_descriptor: WireStorageDescriptor,
    #[serde(rename = "PartitionKeys", default)]
    partition_keys: Vec<WireColumn>,
}

#[derive(Debug, Deserialize)]
struct GetTableResponse {
    #[serde(rename = "Table")]
    table: WireTable,
}

#[derive(Debug, Serialize)]
struct WirePartitionInput {
    #[serde(rename = "Values")]
    values: Vec<String>,
    #[serde(rename = "StorageDescriptor")]
    storage_descriptor: WireStorageDescriptor,
}

#[derive(Debug, Deserialize)]
struct WirePartition {
    #[serde(rename = "Values")]
    values: Vec<String>,
    #[serde(rename = "StorageDescriptor")]
    storage_descriptor: WireStorageDescriptor,
}

#[derive(Debug, Deserialize)]
struct GetPartitionsResponse {
    #[serde(rename = "Partitions", default)]
    partitions: Vec<WirePartition>,
    #[serde(rename = "NextToken")]
    next_token: Option<String>,
}

fn to_table(db: &str, wire: WireTable) -> Table {
    Table {
        database_name: db.to_string(),
        name: wire.name,
        columns: wire.storage_descriptor.columns.into_iter().map(Column::from).collect(),
        location: common_storage::ensure_trailing_slash(&wire.storage_descriptor.location),
        partition_keys: wire.partition_keys.into_iter().map(Column::from).collect(),
    }
}

#[async_trait]
impl Catalog for GlueCatalog {
    async fn get(&self, db: &str, name: &str) -> Result<Option<Box<dyn CatalogTable>>> {
        let body = json!({ "DatabaseName": db, "Name": name });
        let (ok, text) = self.call("GetTable", &body).await?;
        if !ok {
            return if is_not_found(&text) { Ok(None) } else { Err(translate_error(&text)) };
        }
        let parsed: GetTableResponse = serde_json::from_str(&text)?;
        Ok(Some(Box::new(GlueTable {
            catalog: self.clone(),
            table: to_table(db, parsed.table),
        })))
    }

    async fn create(
        &self,
        db: &str,
        name: &str,
        columns: Vec<Column>,
        location: String,
        partition_keys: Vec<Column>,
    ) -> Result<Box<dyn CatalogTable>> {
        let table_input = WireTableInput::new(name, &columns, &location, &partition_keys);
        let body = json!({ "DatabaseName": db, "TableInput": table_input });
        let _: serde_json::Value = self.call_json("CreateTable", &body).await?;
        Ok(Box::new(GlueTable {
            catalog: self.clone(),
            table: Table {
                database_name: db.to_string(),
                name: name.to_string(),
                columns,
                location,
                partition_keys,
            },
        }))
    }

    async fn update(
        &self,
        db: &str,
        name: &str,
        columns: Vec<Column>,
        location: String,
        partition_keys: Vec<Column>,
    ) -> Result<Box<dyn CatalogTable>> {
        let table_input = WireTableInput::new(name, &columns, &location, &partition_keys);
        let body = json!({ "DatabaseName": db, "TableInput": table_input });
        let _: serde_json::Value = self.call_json("UpdateTable", &body).await?;
        Ok(Box::new(GlueTable {
            catalog: self.clone(),
            table: Table {
                database_name: db.to_string(),
                name: name.to_string(),
                columns,
                location,
                partition_keys,
            },
        }))
    }

    async fn drop_table(&self, db: &str, name: &str) -> Result<()> {
        let body = json!({ "DatabaseName": db, "Name": name });
        let _: serde_json::Value = self.call_json("DeleteTable", &body).await?;
        Ok(())
    }

    fn add_batch_size(&self) -> usize {
        ADD_BATCH_SIZE
    }
}

struct GlueTable {
    catalog: GlueCatalog,
    table: Table,
}

#[async_trait]
impl CatalogTable for GlueTable {
    fn table(&self) -> &Table {
        &self.table
    }

    fn list_partitions(&self) -> Pin<Box<dyn Stream<Item = Result<Partition>> + Send + '_>> {
        let db = self.table.database_name.clone();
        let name = self.table.name.clone();
        let stream = async_stream::try_stream! {
            let mut next_token: Option<String> = None;
            loop {
                let body = json!({
                    "DatabaseName": db,
                    "TableName": name,
                    "NextToken": next_token,
                    "MaxResults": 1000,
                });
                let page: GetPartitionsResponse = self.catalog.call_json("GetPartitions", &body).await?;
                for partition in page.partitions {
                    yield Partition {
                        values: partition.values,
                        columns: partition.storage_descriptor.columns.into_iter().map(Column::from).collect(),
                        location: common_storage::ensure_trailing_slash(&partition.storage_descriptor.location),
                    };
                }
                next_token = page.next_token;
                if next_token.is_none() {
                    break;
                }
            }
        };
        Box::pin(stream)
    }

    async fn add_partitions(&self, partitions: &[Partition], batch_size: usize) -> Result<()> {
        for batch in common_storage::chunks(partitions, batch_size) {
            let inputs: Vec<WirePartitionInput> = batch
                .iter()
                .map(|p| WirePartitionInput {
                    values: p.values.clone(),
                    storage_descriptor: WireStorageDescriptor::template(&p.columns, &p.location),
                })
                .collect();
            let body = json!({
                "DatabaseName": self.table.database_name,
                "TableName": self.table.name,
                "PartitionInputList": inputs,
            });
            let _: serde_json::Value = self.catalog.call_json("BatchCreatePartition", &body).await?;
        }
        Ok(())
    }

    async fn update_partitions(&self, partitions: &[Partition]) -> Result<()> {
        for batch in common_storage::chunks(partitions, REWRITE_BATCH_SIZE) {
            let to_delete: Vec<serde_json::Value> = batch
                .iter()
                .map(|p| json!({ "Values": p.values }))
                .collect();
            let delete_body = json!({
                "DatabaseName": self.table.database_name,
                "TableName": self.table.name,
                "PartitionsToDelete": to_delete,
            });
            let _: serde_json::Value = self.catalog.call_json("BatchDeletePartition", &delete_body).await?;

            let inputs: Vec<WirePartitionInput> = batch
                .iter()
                .map(|p| WirePartitionInput {
                    values: p.values.clone(),
                    storage_descriptor: WireStorageDescriptor::template(&p.columns, &p.location),
                })
                .collect();
            let create_body = json!({
                "DatabaseName": self.table.database_name,
                "TableName": self.table.name,
                "PartitionInputList": inputs,
            });
            let _: serde_json::Value = self.catalog.call_json("BatchCreatePartition", &create_body).await?;
        }
        Ok(())
    }
}
