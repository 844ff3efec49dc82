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

//! The [`SummaryGenerator`] orchestrator, bridging event ingestion and summary generation.

use ahash::AHashSet;
use chrono::{DateTime, Utc};
use meridian_analysis::{
    summary::{TradingSummary, TradingSummaryGenerator},
    time::TimeInterval,
};
use meridian_common::logging::{CMD, EVT};
use meridian_model::{
    balance::AssetBalance,
    events::{AccountEventKind, EngineEvent, MarketEvent},
    identifiers::{ClientOrderId, InstrumentIndex},
    instruments::IndexedInstruments,
    orders::{Order, OrderError, OrderEvent, OrderKey, OrderRequestCancel, OrderRequestOpen},
    trade::Trade,
};
use meridian_risk::manager::{RiskCheckOutput, RiskManager, RiskRefused};
use rust_decimal::Decimal;

use crate::{
    config::SystemConfig,
    error::EngineError,
    state::{EngineState, orders::OrderLookup},
};

/// Why a request was refused before reaching the risk manager.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestRejection {
    #[error("INVALID_REQUEST: {0}")]
    Invalid(#[from] OrderError),
    #[error("UNKNOWN_INSTRUMENT: instrument={0}")]
    UnknownInstrument(InstrumentIndex),
    #[error("DUPLICATE_ORDER: cid={0}")]
    DuplicateOrder(ClientOrderId),
    #[error("UNKNOWN_ORDER: cid={0}")]
    UnknownOrder(ClientOrderId),
    #[error("ORDER_NOT_CANCELLABLE: {0}")]
    NotCancellable(OrderError),
}

/// Drives one engine: applies events to orders, positions and balances, gates outgoing
/// requests through a [`RiskManager`], and accumulates the statistics behind
/// [`TradingSummary`] snapshots.
///
/// Every operation either applies completely or returns an error with the state untouched.
#[derive(Debug)]
pub struct SummaryGenerator<R> {
    state: EngineState,
    statistics: TradingSummaryGenerator,
    risk: R,
}

impl<R> SummaryGenerator<R>
where
    R: RiskManager<EngineState>,
{
    /// Creates a new [`SummaryGenerator`] instance seeded with the configured initial balances.
    ///
    /// # Errors
    ///
    /// Returns an error if an initial balance is invalid or the registry is inconsistent.
    pub fn new(
        config: &SystemConfig,
        instruments: IndexedInstruments,
        risk: R,
    ) -> Result<Self, EngineError> {
        let initial_balances = config.resolve_initial_balances(&instruments)?;
        let statistics =
            TradingSummaryGenerator::new(config.risk_free_return, config.interval, &instruments)?;

        let mut state = EngineState::new(instruments);
        for balance in initial_balances {
            state.set_balance(balance)?;
        }

        Ok(Self {
            state,
            statistics,
            risk,
        })
    }

    /// Creates a new [`SummaryGenerator`] instance from a configuration alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn from_config(config: &SystemConfig, risk: R) -> Result<Self, EngineError> {
        let instruments = config.validate()?;
        Self::new(config, instruments, risk)
    }

    #[must_use]
    pub const fn state(&self) -> &EngineState {
        &self.state
    }

    #[must_use]
    pub const fn risk(&self) -> &R {
        &self.risk
    }

    #[must_use]
    pub const fn risk_free_return(&self) -> Decimal {
        self.statistics.risk_free_return
    }

    #[must_use]
    pub const fn interval(&self) -> TimeInterval {
        self.statistics.interval
    }

    /// Returns the time of the first update, if any.
    #[must_use]
    pub const fn time_engine_start(&self) -> Option<DateTime<Utc>> {
        self.statistics.time_engine_start
    }

    /// Returns the latest engine time, if any.
    #[must_use]
    pub const fn time_engine_now(&self) -> Option<DateTime<Utc>> {
        self.statistics.time_engine_now
    }

    /// Submits a batch of order requests.
    ///
    /// Requests that are malformed, reuse a client order ID, or cancel an order that is not
    /// active are refused first. The rest are partitioned by the risk manager. Approved opens
    /// become `OpenInFlight` orders and approved cancels move their order to `CancelInFlight`.
    pub fn submit_requests(
        &mut self,
        cancels: Vec<OrderRequestCancel>,
        opens: Vec<OrderRequestOpen>,
    ) -> RiskCheckOutput {
        let mut output = RiskCheckOutput::default();

        let mut batch = AHashSet::with_capacity(cancels.len());
        let cancels: Vec<OrderRequestCancel> = cancels
            .into_iter()
            .filter(|request| match self.precheck_cancel(request, &mut batch) {
                Ok(()) => true,
                Err(rejection) => {
                    log::warn!("{CMD} CancelRequest for {} DENIED: {rejection}", request.key.cid);
                    output
                        .refused_cancels
                        .push(RiskRefused::new(*request, rejection));
                    false
                }
            })
            .collect();

        let mut batch = AHashSet::with_capacity(opens.len());
        let opens: Vec<OrderRequestOpen> = opens
            .into_iter()
            .filter(|request| match self.precheck_open(request, &mut batch) {
                Ok(()) => true,
                Err(rejection) => {
                    log::warn!("{CMD} OpenRequest for {} DENIED: {rejection}", request.key.cid);
                    output.refused_opens.push(RiskRefused::new(*request, rejection));
                    false
                }
            })
            .collect();

        let checked = self.risk.check(&self.state, cancels, opens);

        for approved in &checked.approved_cancels {
            let key = approved.0.key;
            let next = self
                .state
                .orders()
                .get(&key.cid)
                .map(|order| order.next_state(&OrderEvent::CancelRequested));
            match next {
                Some(Ok(next)) => {
                    self.state.orders_mut().commit(&key, next);
                }
                Some(Err(error)) => log::error!("{CMD} Cannot request cancel of {}: {error}", key.cid),
                None => log::error!("{CMD} Cannot request cancel of unknown order {}", key.cid),
            }
        }
        for approved in &checked.approved_opens {
            self.state.orders_mut().insert(Order::from_request(&approved.0));
        }

        output.approved_cancels = checked.approved_cancels;
        output.approved_opens = checked.approved_opens;
        output.refused_cancels.extend(checked.refused_cancels);
        output.refused_opens.extend(checked.refused_opens);

        log::debug!(
            "{CMD} Submitted {} requests, {} refused",
            output.len(),
            output.num_refused()
        );
        output
    }

    fn precheck_open(
        &self,
        request: &OrderRequestOpen,
        batch: &mut AHashSet<ClientOrderId>,
    ) -> Result<(), RequestRejection> {
        request.request.validate()?;
        let instrument = request.key.instrument;
        if self.state.instruments().instrument(instrument).is_none() {
            return Err(RequestRejection::UnknownInstrument(instrument));
        }
        let cid = request.key.cid;
        if self.state.orders().contains(&cid) || !batch.insert(cid) {
            return Err(RequestRejection::DuplicateOrder(cid));
        }
        Ok(())
    }

    fn precheck_cancel(
        &self,
        request: &OrderRequestCancel,
        batch: &mut AHashSet<ClientOrderId>,
    ) -> Result<(), RequestRejection> {
        let cid = request.key.cid;
        let order = self
            .state
            .orders()
            .get(&cid)
            .filter(|order| order.key == request.key)
            .ok_or(RequestRejection::UnknownOrder(cid))?;
        order
            .next_state(&OrderEvent::CancelRequested)
            .map_err(RequestRejection::NotCancellable)?;
        if !batch.insert(cid) {
            return Err(RequestRejection::DuplicateOrder(cid));
        }
        Ok(())
    }

    /// Applies one event, then advances engine time to the event time if it is later.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving the state untouched, if the event:
    /// - refers to an unknown instrument, asset or order,
    /// - refers to an order already in a terminal state,
    /// - is not a valid transition for its order (e.g. an overfill).
    pub fn ingest(&mut self, event: &EngineEvent) -> Result<(), EngineError> {
        match event {
            EngineEvent::Account(account) => self.ingest_account(&account.kind)?,
            EngineEvent::Market(market) => self.ingest_market(market)?,
            EngineEvent::TimeUpdate(_) => {}
        }
        self.statistics.update_time_now(event.time_exchange());
        Ok(())
    }

    fn ingest_account(&mut self, kind: &AccountEventKind) -> Result<(), EngineError> {
        match kind {
            AccountEventKind::BalanceSnapshot(balance) => self.apply_balance(balance),
            AccountEventKind::Trade(trade) => self.apply_trade(trade),
            other => {
                let (Some(key), Some(event)) = (other.order_key(), other.to_order_event()) else {
                    return Ok(());
                };
                let next = self.active_order(key, other.name())?.next_state(&event)?;
                log::debug!("{EVT} {} for order {}", other.name(), key.cid);
                self.state.orders_mut().commit(key, next);
                Ok(())
            }
        }
    }

    fn ingest_market(&mut self, market: &MarketEvent) -> Result<(), EngineError> {
        self.state.check_instrument(market.instrument)?;
        if let Some(price) = market.kind.reference_price() {
            self.state.set_last_price(market.instrument, price)?;
        }
        Ok(())
    }

    fn apply_trade(&mut self, trade: &Trade) -> Result<(), EngineError> {
        let instrument = trade.instrument();
        self.state.check_instrument(instrument)?;

        let order = self.active_order(&trade.key, "Trade")?;
        if order.side != trade.side {
            return Err(EngineError::TradeSideMismatch {
                cid: trade.key.cid,
                trade: trade.id,
                order_side: order.side,
                trade_side: trade.side,
            });
        }
        let next = order.next_state(&OrderEvent::Fill {
            quantity: trade.quantity.abs(),
            time_exchange: trade.time_exchange,
        })?;
        let update = self.state.positions().preview(trade);

        log::debug!("{EVT} {trade}");
        self.state.orders_mut().commit(&trade.key, next);
        if let Some(exited) = self.state.positions_mut().commit(instrument, update) {
            log::debug!(
                "{EVT} Position exited for {instrument}: pnl_realised={}",
                exited.pnl_realised
            );
            self.statistics.update_from_position(&exited)?;
        }
        Ok(())
    }

    fn apply_balance(&mut self, balance: &AssetBalance) -> Result<(), EngineError> {
        self.state.check_asset(balance.asset)?;
        if self.state.set_balance(*balance)? {
            self.statistics.update_from_balance(balance)?;
        }
        Ok(())
    }

    /// Returns the active order `key`, or the error describing why it cannot take `event`.
    fn active_order(&self, key: &OrderKey, event: &'static str) -> Result<&Order, EngineError> {
        match self.state.orders().lookup(&key.cid) {
            OrderLookup::Active(order) if order.key == *key => Ok(order),
            OrderLookup::Active(order) => Err(EngineError::OrderKeyMismatch {
                cid: key.cid,
                expected: order.key,
                actual: *key,
            }),
            OrderLookup::Terminal(order) => Err(EngineError::StaleEvent {
                cid: key.cid,
                state: order.state.name(),
                event,
            }),
            OrderLookup::Unknown => Err(EngineError::UnknownOrder(*key)),
        }
    }

    /// Applies a balance snapshot received outside the event stream and advances engine time.
    ///
    /// A snapshot older than the one held for the asset is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the asset is not in the registry.
    pub fn update_from_balance(&mut self, balance: &AssetBalance) -> Result<(), EngineError> {
        self.apply_balance(balance)?;
        self.statistics.update_time_now(balance.time_exchange);
        Ok(())
    }

    /// Advances engine time to `time` if it is later than the current engine time.
    pub fn update_time_now(&mut self, time: DateTime<Utc>) {
        self.statistics.update_time_now(time);
    }

    /// Generates a [`TradingSummary`] of the current state, scaled to `interval` or to the
    /// configured interval if `None`. Does not change any state.
    #[must_use]
    pub fn generate(&self, interval: Option<TimeInterval>) -> TradingSummary {
        self.statistics.generate(interval)
    }
}
