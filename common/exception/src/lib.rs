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

//! Crate-wide error taxonomy for lakesync.
//!
//! Every fallible operation in the core returns [`Result<T>`], a thin
//! alias over `std::result::Result<T, ErrorCode>`. `ErrorCode` is the
//! single place lower-level library errors (object storage, HTTP,
//! Thrift) get translated into the domain taxonomy the reconciler
//! reasons about.

use std::fmt::Debug;

/// The full error taxonomy for a reconciliation run.
#[derive(thiserror::Error, Debug)]
pub enum ErrorCode {
    /// The Parquet footer at the tail of an object was malformed: too
    /// small to contain a trailer, bad magic, or undecodable Thrift.
    #[error("ParquetError: {0}")]
    ParquetError(String),

    /// A listing or range-read against the object store failed.
    #[error("ObjectStoreError: {0}")]
    ObjectStoreError(String),

    /// A catalog RPC failed for a reason other than "not found" (which
    /// `Catalog::get` translates locally into `Ok(None)` instead).
    #[error("CatalogError: {0}")]
    CatalogError(String),

    /// The scanner found no usable Parquet object under a dataset
    /// location. Recovered from by the reconciler: logged and skipped.
    #[error("NoDatasetAtLocation: no parquet files found under {0}")]
    NoDatasetAtLocation(String),

    /// No `vN/` subdirectory exists under a dataset root. Recovered
    /// from by the reconciler: logged and skipped.
    #[error("NoVersions: no version directories found under {0}")]
    NoVersions(String),

    /// CLI arguments or environment failed validation before any I/O
    /// was attempted.
    #[error("ConfigError: {0}")]
    ConfigError(String),
}

impl ErrorCode {
    pub fn parquet(msg: impl Into<String>) -> Self {
        ErrorCode::ParquetError(msg.into())
    }

    pub fn object_store(msg: impl Into<String>) -> Self {
        ErrorCode::ObjectStoreError(msg.into())
    }

    pub fn catalog(msg: impl Into<String>) -> Self {
        ErrorCode::CatalogError(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        ErrorCode::ConfigError(msg.into())
    }

    /// True for the two "expected flow" errors the reconciler recovers
    /// from locally rather than propagating.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ErrorCode::NoDatasetAtLocation(_) | ErrorCode::NoVersions(_)
        )
    }
}

impl From<opendal::Error> for ErrorCode {
    fn from(err: opendal::Error) -> Self {
        ErrorCode::ObjectStoreError(err.to_string())
    }
}

impl From<reqwest::Error> for ErrorCode {
    fn from(err: reqwest::Error) -> Self {
        ErrorCode::CatalogError(err.to_string())
    }
}

impl From<thrift::Error> for ErrorCode {
    fn from(err: thrift::Error) -> Self {
        ErrorCode::CatalogError(err.to_string())
    }
}

impl From<std::io::Error> for ErrorCode {
    fn from(err: std::io::Error) -> Self {
        ErrorCode::ObjectStoreError(err.to_string())
    }
}

impl From<serde_json::Error> for ErrorCode {
    fn from(err: serde_json::Error) -> Self {
        ErrorCode::CatalogError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ErrorCode>;
