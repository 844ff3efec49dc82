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

use std::{
    collections::HashMap,
    env,
    fmt::Display,
    io::{BufWriter, Stderr, Write},
    str::FromStr,
    sync::mpsc::SendError,
};

use chrono::{DateTime, SecondsFormat, Utc};
use log::{Level, LevelFilter, Log, STATIC_MAX_LEVEL, set_boxed_logger, set_max_level};
use serde::{Deserialize, Serialize};
use ustr::Ustr;

use super::LOGGING_ENV_VAR;

const LOGGING: &str = "logging";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    /// Maximum log level to write to stderr.
    pub stdout_level: LevelFilter,
    /// Per-component log levels, keyed by module path prefix (e.g. `meridian_risk`).
    component_level: HashMap<Ustr, LevelFilter>,
    /// If the configuration should be printed at initialization.
    pub print_config: bool,
}

impl Default for LoggerConfig {
    /// Creates a new default [`LoggerConfig`] instance.
    fn default() -> Self {
        Self {
            stdout_level: LevelFilter::Info,
            component_level: HashMap::new(),
            print_config: false,
        }
    }
}

impl LoggerConfig {
    /// Creates a new [`LoggerConfig`] instance.
    #[must_use]
    pub const fn new(
        stdout_level: LevelFilter,
        component_level: HashMap<Ustr, LevelFilter>,
        print_config: bool,
    ) -> Self {
        Self {
            stdout_level,
            component_level,
            print_config,
        }
    }

    /// Parses a `;`-separated logging spec such as `"stdout=info;meridian_risk=debug"`.
    ///
    /// # Errors
    ///
    /// Returns an error if a pair is malformed or names an unknown level.
    pub fn from_spec(spec: &str) -> anyhow::Result<Self> {
        let mut config = Self::default();
        for kv in spec.split(';') {
            let kv = kv.trim();
            if kv.is_empty() {
                continue;
            }
            if kv.eq_ignore_ascii_case("print_config") {
                config.print_config = true;
                continue;
            }

            let Some((k, v)) = kv.split_once('=') else {
                anyhow::bail!("Invalid spec pair: {kv}");
            };
            let (k, v) = (k.trim(), v.trim());
            let lvl = LevelFilter::from_str(v)
                .map_err(|_| anyhow::anyhow!("Invalid log level: {v}"))?;

            if k.eq_ignore_ascii_case("stdout") {
                config.stdout_level = lvl;
            } else {
                config.component_level.insert(Ustr::from(k), lvl);
            }
        }
        Ok(config)
    }

    /// Retrieves the logger configuration from the `MERIDIAN_LOG` environment variable.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is unset or invalid.
    pub fn from_env() -> anyhow::Result<Self> {
        let spec = env::var(LOGGING_ENV_VAR)?;
        Self::from_spec(&spec)
    }

    /// Returns the level filter configured for the component with the given target,
    /// matching on the longest configured module path prefix.
    #[must_use]
    pub fn component_filter(&self, target: &str) -> Option<LevelFilter> {
        self.component_level
            .iter()
            .filter(|(component, _)| {
                let component = component.as_str();
                target == component
                    || target
                        .strip_prefix(component)
                        .is_some_and(|rest| rest.starts_with("::"))
            })
            .max_by_key(|(component, _)| component.len())
            .map(|(_, level)| *level)
    }
}

/// A logger writing through a background thread fed by an MPSC channel.
#[derive(Debug)]
pub struct Logger {
    /// Configuration for logging levels and behavior.
    pub config: LoggerConfig,
    /// Transmitter for sending log events to the 'logging' thread.
    tx: std::sync::mpsc::Sender<LogEvent>,
}

/// Represents a type of log event.
#[derive(Debug)]
pub enum LogEvent {
    /// A log line event.
    Log(LogLine),
    /// A command to flush all logger buffers.
    Flush,
}

/// Represents a log event which includes a message.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogLine {
    /// The timestamp for the event.
    pub timestamp: DateTime<Utc>,
    /// The log level for the event.
    pub level: Level,
    /// The component (module path) the log event originated from.
    pub component: Ustr,
    /// The log message content.
    pub message: String,
}

impl Display for LogLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}: {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true),
            self.level,
            self.component,
            self.message
        )
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        let level = self
            .config
            .component_filter(metadata.target())
            .unwrap_or(self.config.stdout_level);
        metadata.level() == Level::Error || metadata.level() <= level
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            let line = LogLine {
                timestamp: Utc::now(),
                level: record.level(),
                component: Ustr::from(record.metadata().target()),
                message: format!("{}", record.args()),
            };
            if let Err(SendError(LogEvent::Log(line))) = self.tx.send(LogEvent::Log(line)) {
                eprintln!("Error sending log event (receiver closed): {line}");
            }
        }
    }

    fn flush(&self) {
        if let Err(e) = self.tx.send(LogEvent::Flush) {
            eprintln!("Error sending flush log event (receiver closed): {e:?}");
        }
    }
}

impl Logger {
    /// Initializes the logger from the `MERIDIAN_LOG` environment variable.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is unset or invalid, or the logger is already set.
    pub fn init_with_env() -> anyhow::Result<LogGuard> {
        let config = LoggerConfig::from_env()?;
        Self::init_with_config(config)
    }

    /// Initializes the logger with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a `log` implementation is already set or the writer thread
    /// cannot be spawned.
    pub fn init_with_config(config: LoggerConfig) -> anyhow::Result<LogGuard> {
        let (tx, rx) = std::sync::mpsc::channel::<LogEvent>();

        let logger = Self {
            tx,
            config: config.clone(),
        };

        let print_config = config.print_config;
        if print_config {
            println!("STATIC_MAX_LEVEL={STATIC_MAX_LEVEL}");
            println!("Logger initialized with {config:?}");
        }

        if let Err(e) = set_boxed_logger(Box::new(logger)) {
            anyhow::bail!("Cannot initialize logger because of error: {e}");
        }

        let handle = std::thread::Builder::new()
            .name(LOGGING.to_string())
            .spawn(move || Self::handle_messages(&rx))?;

        let max_level = LevelFilter::Trace;
        set_max_level(max_level);
        if print_config {
            println!("Logger set as `log` implementation with max level {max_level}");
        }

        Ok(LogGuard::new(Some(handle)))
    }

    fn handle_messages(rx: &std::sync::mpsc::Receiver<LogEvent>) {
        let mut writer: BufWriter<Stderr> = BufWriter::new(std::io::stderr());

        // Continue to receive and handle log events until channel is hung up
        while let Ok(event) = rx.recv() {
            match event {
                LogEvent::Flush => {
                    if let Err(e) = writer.flush() {
                        eprintln!("Error flushing stderr writer: {e}");
                    }
                    break;
                }
                LogEvent::Log(line) => {
                    if let Err(e) = writeln!(writer, "{line}") {
                        eprintln!("Error writing log line: {e}");
                    }
                    if line.level == Level::Error {
                        let _ = writer.flush();
                    }
                }
            }
        }
        let _ = writer.flush();
    }
}

/// Joins the logging thread on drop, flushing any buffered lines.
#[derive(Debug, Default)]
pub struct LogGuard {
    handle: Option<std::thread::JoinHandle<()>>,
}

impl LogGuard {
    /// Creates a new [`LogGuard`] instance.
    #[must_use]
    pub const fn new(handle: Option<std::thread::JoinHandle<()>>) -> Self {
        Self { handle }
    }
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        log::logger().flush();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            eprintln!("Error joining logging handle");
        }
    }
}
