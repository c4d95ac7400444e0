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

//! `lakesync` entry point: parse configuration, build the object-store
//! operator and the selected catalog back-end, run one reconciliation,
//! and report what happened.

use common_config::Config;
use common_exception::ErrorCode;
use common_exception::Result;
use common_tracing::tracing;
use lakesync_query::catalogs::glue::GlueCatalog;
use lakesync_query::catalogs::hive::HiveCatalog;
use lakesync_query::catalogs::Catalog;
use lakesync_query::reconcile;
use opendal::layers::RetryLayer;
use opendal::services::s3;
use opendal::Operator;

fn build_operator(config: &Config, bucket: &str) -> Result<Operator> {
    let mut builder = s3::Builder::default();
    builder.bucket(bucket);
    builder.region(&config.s3_region);
    if let Some(ref endpoint) = config.s3_endpoint {
        builder.endpoint(endpoint);
    }
    if let Some(ref access_key_id) = config.s3_access_key_id {
        builder.access_key_id(access_key_id);
    }
    if let Some(ref secret_access_key) = config.s3_secret_access_key {
        builder.secret_access_key(secret_access_key);
    }
    let accessor = builder.build().map_err(|e| ErrorCode::object_store(e.to_string()))?;
    Ok(Operator::new(accessor).layer(RetryLayer::new()))
}

async fn build_catalog(config: &Config) -> Result<Box<dyn Catalog>> {
    if let Some(endpoint) = config.hive_endpoint() {
        let (host, port) = endpoint?;
        Ok(Box::new(HiveCatalog::new(host, port)))
    } else {
        let endpoint = config
            .catalog_endpoint
            .clone()
            .ok_or_else(|| ErrorCode::config("no catalog endpoint configured"))?;
        Ok(Box::new(GlueCatalog::new(endpoint)))
    }
}

#[tokio::main]
async fn main() {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("lakesync: {}", e);
            std::process::exit(1);
        }
    };

    common_tracing::init_logging("lakesync", config.verbose);

    if let Err(e) = run(&config).await {
        tracing::error!(error = %e, "reconciliation failed");
        std::process::exit(1);
    }
}

async fn run(config: &Config) -> Result<()> {
    let (bucket, _) = common_storage::split_s3(&config.src);
    let op = build_operator(config, &bucket)?;
    let catalog = build_catalog(config).await?;

    let outcomes = reconcile(
        &op,
        catalog.as_ref(),
        &config.database,
        &config.src,
        config.version.as_deref(),
        config.alias.as_deref(),
        config.discover,
    )
    .await?;

    for outcome in &outcomes {
        tracing::info!(
            table = %outcome.table_name,
            action = ?outcome.action,
            partitions_added = outcome.partitions_added,
            partitions_rewritten = outcome.partitions_rewritten,
            "reconciled table"
        );
    }
    if outcomes.is_empty() {
        tracing::info!(src = %config.src, "nothing to reconcile");
    }
    Ok(())
}
