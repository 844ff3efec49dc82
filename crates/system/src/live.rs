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

//! The live runner: one processing task ingests events in arrival order while other callers
//! materialise summaries concurrently.
//!
//! Every ingest holds the generator's write lock for the whole event, and readers take the
//! read lock, so a summary never reflects a partially applied event. Shutdown closes the
//! intake and waits for the processing task to apply everything queued before it.

use std::{
    sync::{
        Arc, Mutex, RwLock,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::Duration,
};

use chrono::{DateTime, Utc};
use meridian_analysis::{summary::TradingSummary, time::TimeInterval};
use meridian_common::logging::{log_task_started, log_task_stopped};
use meridian_core::MUTEX_POISONED;
use meridian_model::{
    balance::AssetBalance,
    events::EngineEvent,
    orders::{OrderRequestCancel, OrderRequestOpen},
};
use meridian_risk::manager::{RiskCheckOutput, RiskManager};
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::{
    config::{ConfigError, LiveConfig},
    engine::SummaryGenerator,
    error::EngineError,
    state::EngineState,
};

const EVENT_LOOP_TASK: &str = "live-event-loop";

#[derive(thiserror::Error, Debug)]
pub enum LiveError {
    #[error("Live system is shut down")]
    ShutDown,
    #[error("Live system was already shut down")]
    AlreadyShutDown,
    #[error("Audit stream was already taken")]
    AuditAlreadyTaken,
    #[error("Event loop was already spawned")]
    EventLoopAlreadySpawned,
    #[error("Timed out after {0:?} waiting for an audit tick")]
    AuditTimeout(Duration),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Emitted after each successfully ingested event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditTick {
    /// Position of the event among successfully ingested events, starting at 0.
    pub sequence: u64,
    /// Engine time after the event was applied.
    pub time_engine: DateTime<Utc>,
    pub event: EngineEvent,
}

/// The single consumer end of the audit stream.
#[derive(Debug)]
pub struct AuditReceiver {
    rx: mpsc::Receiver<AuditTick>,
    timeout: Duration,
}

impl AuditReceiver {
    /// Waits up to `timeout` for the next tick.
    ///
    /// Returns `Ok(None)` once the system has shut down and every buffered tick was received.
    ///
    /// # Errors
    ///
    /// Returns [`LiveError::AuditTimeout`] if no tick arrives in time.
    pub async fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<AuditTick>, LiveError> {
        tokio::time::timeout(timeout, self.rx.recv())
            .await
            .map_err(|_| LiveError::AuditTimeout(timeout))
    }

    /// Waits for the next tick using the configured audit timeout.
    ///
    /// # Errors
    ///
    /// Returns [`LiveError::AuditTimeout`] if no tick arrives in time.
    pub async fn recv(&mut self) -> Result<Option<AuditTick>, LiveError> {
        self.recv_timeout(self.timeout).await
    }
}

/// A [`SummaryGenerator`] shared between one ingesting task and any number of readers.
#[derive(Debug)]
pub struct LiveSystem<R> {
    generator: Arc<RwLock<SummaryGenerator<R>>>,
    audit_tx: Mutex<Option<mpsc::Sender<AuditTick>>>,
    audit_rx: Mutex<Option<mpsc::Receiver<AuditTick>>>,
    audit_timeout: Duration,
    sequence: AtomicU64,
    dropped: AtomicU64,
    cancellation: CancellationToken,
    event_loop: Mutex<Option<JoinHandle<()>>>,
    is_closing: AtomicBool,
    is_shutdown: AtomicBool,
}

impl<R> LiveSystem<R>
where
    R: RiskManager<EngineState>,
{
    /// Creates a new [`LiveSystem`] instance around `generator`.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid.
    pub fn new(generator: SummaryGenerator<R>, config: LiveConfig) -> Result<Self, LiveError> {
        config.validate()?;
        let (audit_tx, audit_rx) = mpsc::channel(config.audit_capacity);

        Ok(Self {
            generator: Arc::new(RwLock::new(generator)),
            audit_tx: Mutex::new(Some(audit_tx)),
            audit_rx: Mutex::new(Some(audit_rx)),
            audit_timeout: config.audit_timeout,
            sequence: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            cancellation: CancellationToken::new(),
            event_loop: Mutex::new(None),
            is_closing: AtomicBool::new(false),
            is_shutdown: AtomicBool::new(false),
        })
    }

    /// Returns the shared generator, for readers that outlive a borrow of the system.
    #[must_use]
    pub fn generator(&self) -> Arc<RwLock<SummaryGenerator<R>>> {
        Arc::clone(&self.generator)
    }

    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.is_shutdown.load(Ordering::Acquire)
    }

    /// Returns the number of events ingested so far.
    #[must_use]
    pub fn num_ingested(&self) -> u64 {
        self.sequence.load(Ordering::Acquire)
    }

    /// Returns the number of audit ticks dropped because the channel was full or closed.
    #[must_use]
    pub fn num_audit_dropped(&self) -> u64 {
        self.dropped.load(Ordering::Acquire)
    }

    /// Hands over the audit stream. Only one subscriber is ever served.
    ///
    /// # Errors
    ///
    /// Returns [`LiveError::AuditAlreadyTaken`] on every call after the first.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn take_audit(&self) -> Result<AuditReceiver, LiveError> {
        let rx = self
            .audit_rx
            .lock()
            .expect(MUTEX_POISONED)
            .take()
            .ok_or(LiveError::AuditAlreadyTaken)?;
        Ok(AuditReceiver {
            rx,
            timeout: self.audit_timeout,
        })
    }

    /// Applies one event and publishes an [`AuditTick`] without waiting for the subscriber.
    ///
    /// # Errors
    ///
    /// Returns an error if the system is shut down or the engine rejects the event.
    ///
    /// # Panics
    ///
    /// Panics if an internal lock is poisoned.
    pub fn ingest(&self, event: EngineEvent) -> Result<(), LiveError> {
        let mut generator = self.generator.write().expect(MUTEX_POISONED);
        if self.is_shutdown() {
            return Err(LiveError::ShutDown);
        }

        generator.ingest(&event)?;
        let time_engine = generator
            .time_engine_now()
            .unwrap_or_else(|| event.time_exchange());
        let tick = AuditTick {
            sequence: self.sequence.fetch_add(1, Ordering::AcqRel),
            time_engine,
            event,
        };

        // Published under the write lock so ticks arrive in sequence order
        let audit_tx = self.audit_tx.lock().expect(MUTEX_POISONED);
        let delivered = audit_tx
            .as_ref()
            .is_some_and(|tx| tx.try_send(tick).is_ok());
        if !delivered {
            let dropped = self.dropped.fetch_add(1, Ordering::AcqRel) + 1;
            log::debug!("Audit tick dropped ({dropped} total)");
        }
        Ok(())
    }

    /// Submits order requests through the risk manager.
    ///
    /// # Errors
    ///
    /// Returns [`LiveError::ShutDown`] if the system is shut down.
    ///
    /// # Panics
    ///
    /// Panics if the generator lock is poisoned.
    pub fn submit_requests(
        &self,
        cancels: Vec<OrderRequestCancel>,
        opens: Vec<OrderRequestOpen>,
    ) -> Result<RiskCheckOutput, LiveError> {
        let mut generator = self.generator.write().expect(MUTEX_POISONED);
        if self.is_shutdown() {
            return Err(LiveError::ShutDown);
        }
        Ok(generator.submit_requests(cancels, opens))
    }

    /// Applies a balance snapshot received outside the event stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the system is shut down or the asset is unknown.
    ///
    /// # Panics
    ///
    /// Panics if the generator lock is poisoned.
    pub fn update_from_balance(&self, balance: &AssetBalance) -> Result<(), LiveError> {
        let mut generator = self.generator.write().expect(MUTEX_POISONED);
        if self.is_shutdown() {
            return Err(LiveError::ShutDown);
        }
        generator.update_from_balance(balance)?;
        Ok(())
    }

    /// Advances engine time without an event.
    ///
    /// # Errors
    ///
    /// Returns [`LiveError::ShutDown`] if the system is shut down.
    ///
    /// # Panics
    ///
    /// Panics if the generator lock is poisoned.
    pub fn update_time_now(&self, time: DateTime<Utc>) -> Result<(), LiveError> {
        let mut generator = self.generator.write().expect(MUTEX_POISONED);
        if self.is_shutdown() {
            return Err(LiveError::ShutDown);
        }
        generator.update_time_now(time);
        Ok(())
    }

    /// Generates a summary of the last fully applied event.
    ///
    /// # Panics
    ///
    /// Panics if the generator lock is poisoned.
    #[must_use]
    pub fn generate(&self, interval: Option<TimeInterval>) -> TradingSummary {
        self.generator
            .read()
            .expect(MUTEX_POISONED)
            .generate(interval)
    }

    /// Waits for the processing task to finish, if one was spawned.
    ///
    /// The task finishes once every sender of its channel is dropped, or on shutdown.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub async fn wait_event_loop(&self) {
        let handle = self.event_loop.lock().expect(MUTEX_POISONED).take();
        if let Some(handle) = handle
            && let Err(e) = handle.await
        {
            log::error!("Event loop failed: {e}");
        }
    }

    /// Stops the event loop, closes the audit stream and rejects any further mutation.
    ///
    /// Events already queued for the event loop are applied before the system stops, so
    /// the final summary reflects everything sent ahead of the shutdown. Returns a final
    /// summary when `generate_final` is set.
    ///
    /// # Errors
    ///
    /// Returns [`LiveError::AlreadyShutDown`] if called more than once.
    ///
    /// # Panics
    ///
    /// Panics if an internal lock is poisoned.
    pub async fn shutdown(
        &self,
        generate_final: bool,
    ) -> Result<Option<TradingSummary>, LiveError> {
        if self.is_closing.swap(true, Ordering::AcqRel) {
            return Err(LiveError::AlreadyShutDown);
        }

        self.cancellation.cancel();
        self.wait_event_loop().await;

        let generator = self.generator.write().expect(MUTEX_POISONED);
        self.is_shutdown.store(true, Ordering::Release);
        self.audit_tx.lock().expect(MUTEX_POISONED).take();

        log::info!(
            "Live system shut down after {} events ({} audit ticks dropped)",
            self.num_ingested(),
            self.num_audit_dropped()
        );
        Ok(generate_final.then(|| generator.generate(None)))
    }
}

impl<R> LiveSystem<R>
where
    R: RiskManager<EngineState> + Send + Sync + 'static,
{
    /// Spawns the processing task, which ingests events from `rx` in arrival order.
    ///
    /// Rejected events are logged and skipped. The task stops when every sender of `rx` is
    /// dropped, or on shutdown after draining the events still queued in `rx`.
    ///
    /// # Errors
    ///
    /// Returns an error if the system is shutting down or a task was already spawned.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn spawn_event_loop(
        self: &Arc<Self>,
        mut rx: mpsc::UnboundedReceiver<EngineEvent>,
    ) -> Result<(), LiveError> {
        let mut event_loop = self.event_loop.lock().expect(MUTEX_POISONED);
        if self.is_closing.load(Ordering::Acquire) {
            return Err(LiveError::ShutDown);
        }
        if event_loop.is_some() {
            return Err(LiveError::EventLoopAlreadySpawned);
        }

        let system = Arc::clone(self);
        let cancellation = self.cancellation.clone();

        *event_loop = Some(tokio::spawn(async move {
            log_task_started(EVENT_LOOP_TASK);
            loop {
                tokio::select! {
                    biased;
                    () = cancellation.cancelled() => {
                        rx.close();
                        let mut drained = 0;
                        while let Ok(event) = rx.try_recv() {
                            system.ingest_logged(event);
                            drained += 1;
                        }
                        tracing::debug!("Event loop cancelled, drained {drained} queued events");
                        break;
                    }
                    maybe_event = rx.recv() => {
                        let Some(event) = maybe_event else {
                            tracing::debug!("Event channel closed");
                            break;
                        };
                        system.ingest_logged(event);
                    }
                }
            }
            log_task_stopped(EVENT_LOOP_TASK);
        }));
        Ok(())
    }

    fn ingest_logged(&self, event: EngineEvent) {
        let name = event.name();
        if let Err(e) = self.ingest(event) {
            tracing::error!("Failed to ingest {name} event: {e}");
        }
    }
}
