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

//! CLI configuration for the lakesync reconciler, built the way the
//! teacher's `common-config` builds `Config`: one `clap::Parser`
//! struct, environment-variable fallback through `clap`'s `env`
//! feature, and a `load()` entry point that validates cross-field
//! constraints `clap` itself can't express.

use clap::Parser;
use common_exception::ErrorCode;
use common_exception::Result;

/// `lakesync <src> [flags]` — see module docs for the flag reference.
#[derive(Parser, Debug, Clone)]
#[clap(name = "lakesync", about = "Reconcile a Hive-compatible metastore against a Parquet dataset layout")]
pub struct Config {
    /// Dataset root (`s3://bucket/prefix/dataset/`), or a directory of
    /// datasets when `--discover` is set.
    pub src: String,

    /// Pin the version directory instead of picking the latest `vN/`.
    #[clap(long)]
    pub version: Option<String>,

    /// Override the table-name stem (defaults to the dataset name).
    #[clap(long)]
    pub alias: Option<String>,

    /// Treat `src` as a directory of dataset roots and reconcile each.
    #[clap(long)]
    pub discover: bool,

    /// Switch the catalog back-end to Thrift Hive Metastore at
    /// `HOST` or `HOST:PORT` (default port 9083).
    #[clap(long)]
    pub hive: Option<String>,

    /// Catalog database name.
    #[clap(long, default_value = "telemetry")]
    pub database: String,

    /// Raise the log level; repeatable (`-vv` for trace).
    #[clap(short, long, parse(from_occurrences))]
    pub verbose: u8,

    /// HTTP/JSON catalog endpoint, required unless `--hive` is set.
    #[clap(long, env = "LAKESYNC_CATALOG_ENDPOINT")]
    pub catalog_endpoint: Option<String>,

    #[clap(long, env = "AWS_ENDPOINT_URL")]
    pub s3_endpoint: Option<String>,

    #[clap(long, env = "AWS_REGION", default_value = "us-east-1")]
    pub s3_region: String,

    #[clap(long, env = "AWS_ACCESS_KEY_ID")]
    pub s3_access_key_id: Option<String>,

    #[clap(long, env = "AWS_SECRET_ACCESS_KEY")]
    pub s3_secret_access_key: Option<String>,
}

impl Config {
    /// Parses `std::env::args()` and validates cross-field
    /// constraints `clap` cannot express declaratively.
    pub fn load() -> Result<Config> {
        let config = Config::parse();
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.hive.is_none() && self.catalog_endpoint.is_none() {
            return Err(ErrorCode::config(
                "either --hive or --catalog-endpoint (LAKESYNC_CATALOG_ENDPOINT) must be set",
            ));
        }
        if let Some(ref hive) = self.hive {
            self.hive_endpoint_from(hive)?;
        }
        Ok(())
    }

    /// Parsed `(host, port)` for `--hive`, defaulting the port to the
    /// standard metastore Thrift port.
    pub fn hive_endpoint(&self) -> Option<Result<(String, u16)>> {
        self.hive.as_ref().map(|hive| self.hive_endpoint_from(hive))
    }

    fn hive_endpoint_from(&self, raw: &str) -> Result<(String, u16)> {
        match raw.split_once(':') {
            Some((host, port)) => {
                let port: u16 = port
                    .parse()
                    .map_err(|_| ErrorCode::config(format!("invalid --hive port in {:?}", raw)))?;
                Ok((host.to_string(), port))
            }
            None => Ok((raw.to_string(), 9083)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Config {
        Config {
            src: "s3://bucket/ds/".to_string(),
            version: None,
            alias: None,
            discover: false,
            hive: None,
            database: "telemetry".to_string(),
            verbose: 0,
            catalog_endpoint: Some("https://glue.example.com".to_string()),
            s3_endpoint: None,
            s3_region: "us-east-1".to_string(),
            s3_access_key_id: None,
            s3_secret_access_key: None,
        }
    }

    #[test]
    fn requires_a_catalog_endpoint_or_hive() {
        let mut config = base();
        config.catalog_endpoint = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn hive_without_port_defaults_to_9083() {
        let mut config = base();
        config.hive = Some("metastore.internal".to_string());
        assert_eq!(
            config.hive_endpoint().unwrap().unwrap(),
            ("metastore.internal".to_string(), 9083)
        );
    }

    #[test]
    fn hive_with_port_is_parsed() {
        let mut config = base();
        config.hive = Some("metastore.internal:10000".to_string());
        assert_eq!(
            config.hive_endpoint().unwrap().unwrap(),
            ("metastore.internal".to_string(), 10000)
        );
    }

    #[test]
    fn hive_with_bad_port_is_a_config_error() {
        let mut config = base();
        config.hive = Some("metastore.internal:notaport".to_string());
        assert!(config.validate().is_err());
    }
}
