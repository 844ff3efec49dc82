// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! The logging framework for Meridian systems.
//!
//! Synchronous library code logs through the `log` facade, which [`init_logging`] backs with a
//! [`Logger`](logger::Logger) writing on a dedicated thread. Async tasks log through `tracing`,
//! enabled by [`init_tracing`].

pub mod logger;

use std::{
    env,
    sync::atomic::{AtomicBool, Ordering},
};

use tracing_subscriber::EnvFilter;

use self::logger::{LogGuard, Logger, LoggerConfig};

/// The environment variable holding the logging spec read by [`LoggerConfig::from_env`].
pub const LOGGING_ENV_VAR: &str = "MERIDIAN_LOG";

pub const RECV: &str = "<--";
pub const SEND: &str = "-->";
pub const CMD: &str = "[CMD]";
pub const EVT: &str = "[EVT]";

static LOGGING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Returns whether the core logger is enabled.
pub fn logging_is_initialized() -> bool {
    LOGGING_INITIALIZED.load(Ordering::Relaxed)
}

/// Installs a `tracing` subscriber for the async tasks of the live runner.
///
/// Filtering follows the `RUST_LOG` environment variable. Nothing is installed when it is unset,
/// so library users keep control of their own subscriber.
///
/// # Errors
///
/// Returns an error if `RUST_LOG` is malformed or a global subscriber is already set.
pub fn init_tracing() -> anyhow::Result<()> {
    let Ok(directives) = env::var(EnvFilter::DEFAULT_ENV) else {
        return Ok(());
    };

    let filter = EnvFilter::try_new(&directives)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {e}"))?;

    log::debug!("Tracing enabled with {}={directives}", EnvFilter::DEFAULT_ENV);
    Ok(())
}

/// Initialize logging.
///
/// Logging should be used for sync Rust logic, which is most of the engine.
/// Logging can be configured to filter components and write up to a specific level only
/// by passing a configuration spec, see [`LoggerConfig::from_spec`].
///
/// Should only be called once during an applications run; the returned guard must be
/// held for as long as logs should be written.
///
/// # Errors
///
/// Returns an error if the logging subsystem fails to initialize.
pub fn init_logging(config: LoggerConfig) -> anyhow::Result<LogGuard> {
    let guard = Logger::init_with_config(config)?;
    LOGGING_INITIALIZED.store(true, Ordering::Relaxed);
    Ok(guard)
}

/// Logs that a task has started using `tracing::debug!`.
pub fn log_task_started(task_name: &str) {
    tracing::debug!("Started task '{task_name}'");
}

/// Logs that a task has stopped using `tracing::debug!`.
pub fn log_task_stopped(task_name: &str) {
    tracing::debug!("Stopped task '{task_name}'");
}
