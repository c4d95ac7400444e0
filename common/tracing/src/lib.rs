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

//! Logging setup for the lakesync CLI.
//!
//! A single-process command-line tool has no spans to export across a
//! cluster, so this is deliberately a much smaller surface than a
//! server's tracing stack: one subscriber, installed once, driven by
//! `RUST_LOG` or a verbosity count.

pub use tracing;

use std::sync::Once;

use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Verbosity levels the `-v` CLI flag maps onto when `RUST_LOG` is unset.
fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global `tracing` subscriber. Safe to call more than
/// once per process (only the first call takes effect) so tests that
/// spin up multiple reconciliations don't panic on a double-init.
pub fn init_logging(app_name: &str, verbosity: u8) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(level_for_verbosity(verbosity)));

        let ansi = atty::is(atty::Stream::Stdout);

        fmt()
            .with_env_filter(filter)
            .with_ansi(ansi)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();

        set_panic_hook();
        tracing::info!(app_name, "logging initialized");
    });
}

/// Route panics through `tracing::error!` so they land in the same
/// sink as ordinary log lines instead of only going to stderr raw.
pub fn set_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!(panic = %info, "panic");
        default_hook(info);
    }));
}
