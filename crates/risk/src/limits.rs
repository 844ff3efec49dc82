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

//! A [`RiskManager`] enforcing the position and account limits of a [`RiskConfiguration`].

use std::collections::BTreeMap;

use meridian_model::{
    identifiers::InstrumentIndex,
    instruments::Instrument,
    orders::{OrderError, OrderRequestCancel, OrderRequestOpen},
};
use rust_decimal::Decimal;

use crate::{
    check::calculate_quote_notional,
    config::RiskConfiguration,
    manager::{RiskApproved, RiskCheckOutput, RiskManager, RiskRefused},
};

/// The read-only view of engine state needed to evaluate exposure limits.
pub trait ExposureState {
    /// Returns the instrument registered at `index`.
    fn instrument(&self, index: InstrumentIndex) -> Option<&Instrument>;

    /// Returns the signed net position quantity, positive when long, of every instrument with an
    /// open position.
    fn position_quantities(&self) -> Vec<(InstrumentIndex, Decimal)>;

    /// Returns the signed unfilled quantity of working orders, netted per instrument.
    fn pending_quantities(&self) -> Vec<(InstrumentIndex, Decimal)>;

    /// Returns the last known market price of `index`.
    fn last_price(&self, index: InstrumentIndex) -> Option<Decimal>;

    /// Returns the account equity, valued in the common quote asset.
    fn equity(&self) -> Option<Decimal>;
}

/// Why an open request was refused. The `Display` form is the refusal reason.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LimitBreach {
    #[error("INVALID_REQUEST: {0}")]
    InvalidRequest(#[from] OrderError),
    #[error("UNKNOWN_INSTRUMENT: instrument={0}")]
    UnknownInstrument(InstrumentIndex),
    #[error("NO_REFERENCE_PRICE: instrument={0}")]
    NoReferencePrice(InstrumentIndex),
    #[error("EQUITY_UNAVAILABLE: equity={0:?}")]
    EquityUnavailable(Option<Decimal>),
    #[error("NOTIONAL_OVERFLOW: instrument={0}")]
    NotionalOverflow(InstrumentIndex),
    #[error("MAX_POSITION_QUANTITY_EXCEEDED: limit={limit}, projected={projected}")]
    MaxPositionQuantity { limit: Decimal, projected: Decimal },
    #[error("MAX_POSITION_NOTIONAL_EXCEEDED: limit={limit}, projected={projected}")]
    MaxPositionNotional { limit: Decimal, projected: Decimal },
    #[error("MAX_EXPOSURE_PERCENT_EXCEEDED: limit={limit}, projected={projected}")]
    MaxExposurePercent { limit: Decimal, projected: Decimal },
    #[error("MAX_LEVERAGE_EXCEEDED: limit={limit}, projected={projected}")]
    MaxLeverage { limit: Decimal, projected: Decimal },
}

/// Checks open requests against configured limits. Cancels are always approved.
///
/// Projected positions start from the open positions plus the unfilled quantity of working
/// orders. Requests are evaluated in input order, and each approval counts towards the
/// projected positions seen by later requests in the same batch. A request that does not increase the
/// absolute position of its instrument is never refused for a limit breach.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LimitsRiskManager {
    config: RiskConfiguration,
}

impl LimitsRiskManager {
    /// Creates a new [`LimitsRiskManager`] instance.
    #[must_use]
    pub const fn new(config: RiskConfiguration) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &RiskConfiguration {
        &self.config
    }

    /// Returns the projected signed position quantity of the request's instrument if approved.
    fn check_open<S: ExposureState + ?Sized>(
        &self,
        state: &S,
        projected: &BTreeMap<InstrumentIndex, Decimal>,
        request: &OrderRequestOpen,
    ) -> Result<Decimal, LimitBreach> {
        request.request.validate()?;

        let index = request.key.instrument;
        let instrument = state
            .instrument(index)
            .ok_or(LimitBreach::UnknownInstrument(index))?;

        let current = projected.get(&index).copied().unwrap_or_default();
        let next = current + request.request.signed_quantity();
        if next.abs() <= current.abs() {
            return Ok(next);
        }

        let limits = self.config.limits_for(index);
        if limits.is_empty() {
            return Ok(next);
        }

        if let Some(limit) = limits.max_position_quantity
            && next.abs() > limit
        {
            return Err(LimitBreach::MaxPositionQuantity {
                limit,
                projected: next.abs(),
            });
        }

        let needs_notional = limits.max_position_notional.is_some()
            || limits.max_exposure_percent.is_some()
            || limits.max_leverage.is_some();
        if !needs_notional {
            return Ok(next);
        }

        let price = reference_price(state, request).ok_or(LimitBreach::NoReferencePrice(index))?;
        let notional = calculate_quote_notional(next.abs(), price, instrument.contract_size)
            .ok_or(LimitBreach::NotionalOverflow(index))?;

        if let Some(limit) = limits.max_position_notional
            && notional > limit
        {
            return Err(LimitBreach::MaxPositionNotional {
                limit,
                projected: notional,
            });
        }

        if limits.max_exposure_percent.is_none() && limits.max_leverage.is_none() {
            return Ok(next);
        }

        let equity = state
            .equity()
            .filter(|equity| *equity > Decimal::ZERO)
            .ok_or(LimitBreach::EquityUnavailable(state.equity()))?;

        if let Some(limit) = limits.max_exposure_percent {
            let exposure = notional.checked_div(equity).unwrap_or(Decimal::MAX);
            if exposure > limit {
                return Err(LimitBreach::MaxExposurePercent {
                    limit,
                    projected: exposure,
                });
            }
        }

        if let Some(limit) = limits.max_leverage {
            let others = gross_notional(state, projected, index)
                .ok_or(LimitBreach::NotionalOverflow(index))?;
            let leverage = notional
                .checked_add(others)
                .and_then(|gross| gross.checked_div(equity))
                .unwrap_or(Decimal::MAX);
            if leverage > limit {
                return Err(LimitBreach::MaxLeverage {
                    limit,
                    projected: leverage,
                });
            }
        }

        Ok(next)
    }
}

impl<S: ExposureState + ?Sized> RiskManager<S> for LimitsRiskManager {
    fn check(
        &self,
        state: &S,
        cancels: Vec<OrderRequestCancel>,
        opens: Vec<OrderRequestOpen>,
    ) -> RiskCheckOutput {
        let mut output = RiskCheckOutput {
            approved_cancels: cancels.into_iter().map(RiskApproved).collect(),
            ..Default::default()
        };

        let mut projected: BTreeMap<InstrumentIndex, Decimal> =
            state.position_quantities().into_iter().collect();
        for (index, pending) in state.pending_quantities() {
            *projected.entry(index).or_default() += pending;
        }

        for request in opens {
            match self.check_open(state, &projected, &request) {
                Ok(next) => {
                    projected.insert(request.key.instrument, next);
                    output.approved_opens.push(RiskApproved(request));
                }
                Err(breach) => {
                    log::warn!("OpenRequest for {} DENIED: {breach}", request.key.cid);
                    output.refused_opens.push(RiskRefused::new(request, breach));
                }
            }
        }

        output
    }
}

/// Returns the request price, or the last market price for a market order priced at zero.
fn reference_price<S: ExposureState + ?Sized>(
    state: &S,
    request: &OrderRequestOpen,
) -> Option<Decimal> {
    if request.request.price > Decimal::ZERO {
        Some(request.request.price)
    } else {
        state
            .last_price(request.key.instrument)
            .filter(|price| *price > Decimal::ZERO)
    }
}

/// Returns the gross notional of every projected position except `exclude`.
///
/// Positions without a known last price contribute nothing.
fn gross_notional<S: ExposureState + ?Sized>(
    state: &S,
    projected: &BTreeMap<InstrumentIndex, Decimal>,
    exclude: InstrumentIndex,
) -> Option<Decimal> {
    projected
        .iter()
        .filter(|(index, _)| **index != exclude)
        .try_fold(Decimal::ZERO, |total, (index, quantity)| {
            let (Some(instrument), Some(price)) = (state.instrument(*index), state.last_price(*index))
            else {
                return Some(total);
            };
            total.checked_add(calculate_quote_notional(
                quantity.abs(),
                price,
                instrument.contract_size,
            )?)
        })
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use meridian_model::{
        enums::{OrderKind, Side},
        instruments::IndexedInstruments,
        stubs::{indexed_instruments, order_key_for, order_request_open_for},
    };
    use proptest::prelude::*;
    use rstest::{fixture, rstest};
    use rust_decimal_macros::dec;

    use super::*;
    use crate::config::RiskLimits;

    #[derive(Debug, Default)]
    struct TestState {
        instruments: IndexedInstruments,
        positions: BTreeMap<InstrumentIndex, Decimal>,
        pending: BTreeMap<InstrumentIndex, Decimal>,
        prices: BTreeMap<InstrumentIndex, Decimal>,
        equity: Option<Decimal>,
    }

    impl ExposureState for TestState {
        fn instrument(&self, index: InstrumentIndex) -> Option<&Instrument> {
            self.instruments.instrument(index)
        }

        fn position_quantities(&self) -> Vec<(InstrumentIndex, Decimal)> {
            self.positions.iter().map(|(k, v)| (*k, *v)).collect()
        }

        fn pending_quantities(&self) -> Vec<(InstrumentIndex, Decimal)> {
            self.pending.iter().map(|(k, v)| (*k, *v)).collect()
        }

        fn last_price(&self, index: InstrumentIndex) -> Option<Decimal> {
            self.prices.get(&index).copied()
        }

        fn equity(&self) -> Option<Decimal> {
            self.equity
        }
    }

    const BTC: InstrumentIndex = InstrumentIndex::new(0);
    const ETH: InstrumentIndex = InstrumentIndex::new(1);

    #[fixture]
    fn state(indexed_instruments: IndexedInstruments) -> TestState {
        TestState {
            instruments: indexed_instruments,
            prices: BTreeMap::from([(BTC, dec!(100)), (ETH, dec!(10))]),
            equity: Some(dec!(1_000)),
            ..Default::default()
        }
    }

    fn manager(global: RiskLimits) -> LimitsRiskManager {
        LimitsRiskManager::new(RiskConfiguration::new(global))
    }

    fn open(instrument: InstrumentIndex, cid: &str, side: Side, quantity: Decimal) -> OrderRequestOpen {
        let price = if instrument == BTC { dec!(100) } else { dec!(10) };
        order_request_open_for(order_key_for(instrument, cid), side, price, quantity)
    }

    #[rstest]
    fn test_no_limits_approves_everything(state: TestState) {
        let opens = vec![open(BTC, "O-1", Side::Buy, dec!(1_000))];
        let cancels = vec![OrderRequestCancel::new(order_key_for(BTC, "O-0"), None)];

        let output = LimitsRiskManager::default().check(&state, cancels, opens);

        assert_eq!(output.approved_opens.len(), 1);
        assert_eq!(output.approved_cancels.len(), 1);
        assert_eq!(output.num_refused(), 0);
    }

    #[rstest]
    fn test_max_position_quantity_counts_earlier_approvals(state: TestState) {
        let manager = manager(RiskLimits {
            max_position_quantity: Some(dec!(3)),
            ..Default::default()
        });
        let opens = vec![
            open(BTC, "O-1", Side::Buy, dec!(2)),
            open(BTC, "O-2", Side::Buy, dec!(2)),
            open(BTC, "O-3", Side::Buy, dec!(1)),
        ];

        let output = manager.check(&state, Vec::new(), opens);

        let approved: Vec<&str> = output
            .approved_opens
            .iter()
            .map(|approved| approved.0.key.cid.as_str())
            .collect();
        assert_eq!(approved, vec!["O-1", "O-3"]);
        assert_eq!(output.refused_opens.len(), 1);
        assert_eq!(
            output.refused_opens[0].reason,
            "MAX_POSITION_QUANTITY_EXCEEDED: limit=3, projected=4"
        );
    }

    #[rstest]
    fn test_working_orders_count_towards_projection(mut state: TestState) {
        state.positions.insert(BTC, dec!(1));
        state.pending.insert(BTC, dec!(2));
        let manager = manager(RiskLimits {
            max_position_quantity: Some(dec!(3)),
            ..Default::default()
        });
        let opens = vec![
            open(BTC, "O-1", Side::Buy, dec!(1)),
            open(BTC, "O-2", Side::Sell, dec!(1)),
        ];

        let output = manager.check(&state, Vec::new(), opens);

        assert_eq!(
            output.refused_opens[0].reason,
            "MAX_POSITION_QUANTITY_EXCEEDED: limit=3, projected=4"
        );
        assert_eq!(output.approved_opens.len(), 1);
        assert_eq!(output.approved_opens[0].0.key.cid.as_str(), "O-2");
    }

    #[rstest]
    fn test_reducing_request_is_approved_above_limit(mut state: TestState) {
        state.positions.insert(BTC, dec!(10));
        let manager = manager(RiskLimits {
            max_position_quantity: Some(dec!(3)),
            ..Default::default()
        });

        let output = manager.check(&state, Vec::new(), vec![open(BTC, "O-1", Side::Sell, dec!(2))]);

        assert_eq!(output.approved_opens.len(), 1);
    }

    #[rstest]
    fn test_max_position_notional_uses_contract_size(state: TestState) {
        let manager = manager(RiskLimits {
            max_position_notional: Some(dec!(250)),
            ..Default::default()
        });
        let opens = vec![
            open(BTC, "O-1", Side::Sell, dec!(2)),
            open(BTC, "O-2", Side::Sell, dec!(1)),
        ];

        let output = manager.check(&state, Vec::new(), opens);

        assert_eq!(output.approved_opens.len(), 1);
        assert_eq!(
            output.refused_opens[0].reason,
            "MAX_POSITION_NOTIONAL_EXCEEDED: limit=250, projected=300"
        );
    }

    #[rstest]
    fn test_instrument_override(state: TestState) {
        let mut config = RiskConfiguration::new(RiskLimits {
            max_position_quantity: Some(dec!(1)),
            ..Default::default()
        });
        config.set_instrument_limits(
            ETH,
            Some(RiskLimits {
                max_position_quantity: Some(dec!(50)),
                ..Default::default()
            }),
        );
        let manager = LimitsRiskManager::new(config);
        let opens = vec![
            open(ETH, "O-1", Side::Buy, dec!(20)),
            open(BTC, "O-2", Side::Buy, dec!(2)),
        ];

        let output = manager.check(&state, Vec::new(), opens);

        assert_eq!(output.approved_opens[0].0.key.cid.as_str(), "O-1");
        assert_eq!(output.refused_opens[0].item.key.cid.as_str(), "O-2");
    }

    #[rstest]
    fn test_max_exposure_percent(state: TestState) {
        let manager = manager(RiskLimits {
            max_exposure_percent: Some(dec!(0.5)),
            ..Default::default()
        });

        let output = manager.check(
            &state,
            Vec::new(),
            vec![
                open(BTC, "O-1", Side::Buy, dec!(5)),
                open(BTC, "O-2", Side::Buy, dec!(1)),
            ],
        );

        assert_eq!(output.approved_opens.len(), 1);
        assert_eq!(
            output.refused_opens[0].reason,
            "MAX_EXPOSURE_PERCENT_EXCEEDED: limit=0.5, projected=0.6"
        );
    }

    #[rstest]
    fn test_max_leverage_includes_other_instruments(mut state: TestState) {
        state.positions.insert(ETH, dec!(-100));
        let manager = manager(RiskLimits {
            max_leverage: Some(dec!(2)),
            ..Default::default()
        });

        // ETH short is 1000 notional, so 10 BTC (1000) gives 2x, 11 BTC breaches
        let output = manager.check(
            &state,
            Vec::new(),
            vec![
                open(BTC, "O-1", Side::Buy, dec!(10)),
                open(BTC, "O-2", Side::Buy, dec!(1)),
            ],
        );

        assert_eq!(output.approved_opens.len(), 1);
        assert_eq!(
            output.refused_opens[0].reason,
            "MAX_LEVERAGE_EXCEEDED: limit=2, projected=2.1"
        );
    }

    #[rstest]
    fn test_market_order_falls_back_to_last_price(mut state: TestState) {
        let manager = manager(RiskLimits {
            max_position_notional: Some(dec!(150)),
            ..Default::default()
        });
        let mut request = open(BTC, "O-1", Side::Buy, dec!(2));
        request.request.kind = OrderKind::Market;
        request.request.price = Decimal::ZERO;

        let output = manager.check(&state, Vec::new(), vec![request]);
        assert_eq!(
            output.refused_opens[0].reason,
            "MAX_POSITION_NOTIONAL_EXCEEDED: limit=150, projected=200"
        );

        state.prices.clear();
        let output = manager.check(&state, Vec::new(), vec![request]);
        assert_eq!(
            output.refused_opens[0].reason,
            "NO_REFERENCE_PRICE: instrument=InstrumentIndex(0)"
        );
    }

    #[rstest]
    fn test_refuses_without_equity(mut state: TestState) {
        state.equity = Some(Decimal::ZERO);
        let manager = manager(RiskLimits {
            max_leverage: Some(dec!(5)),
            ..Default::default()
        });

        let output = manager.check(&state, Vec::new(), vec![open(BTC, "O-1", Side::Buy, dec!(1))]);

        assert_eq!(
            output.refused_opens[0].reason,
            "EQUITY_UNAVAILABLE: equity=Some(0)"
        );
    }

    #[rstest]
    fn test_refuses_invalid_and_unknown(state: TestState) {
        let manager = LimitsRiskManager::default();
        let opens = vec![
            open(BTC, "O-1", Side::Buy, dec!(0)),
            open(InstrumentIndex::new(9), "O-2", Side::Buy, dec!(1)),
        ];

        let output = manager.check(&state, Vec::new(), opens);

        assert_eq!(output.refused_opens.len(), 2);
        assert!(output.refused_opens[0].reason.starts_with("INVALID_REQUEST: "));
        assert_eq!(
            output.refused_opens[1].reason,
            "UNKNOWN_INSTRUMENT: instrument=InstrumentIndex(9)"
        );
    }

    proptest! {
        #[test]
        fn prop_partition_is_total(
            quantities in prop::collection::vec((0usize..3, any::<bool>(), -2i64..20), 0..24),
            num_cancels in 0usize..8,
            limit in 1i64..30,
        ) {
            let state = state(indexed_instruments());
            let manager = manager(RiskLimits {
                max_position_quantity: Some(Decimal::from(limit)),
                max_leverage: Some(dec!(3)),
                ..Default::default()
            });

            let opens: Vec<OrderRequestOpen> = quantities
                .iter()
                .enumerate()
                .map(|(i, (instrument, buy, quantity))| {
                    let side = if *buy { Side::Buy } else { Side::Sell };
                    open(InstrumentIndex::new(*instrument), &format!("O-{i}"), side, Decimal::from(*quantity))
                })
                .collect();
            let cancels: Vec<OrderRequestCancel> = (0..num_cancels)
                .map(|i| OrderRequestCancel::new(order_key_for(BTC, &format!("C-{i}")), None))
                .collect();

            let output = manager.check(&state, cancels, opens.clone());

            prop_assert_eq!(output.len(), opens.len() + num_cancels);
            prop_assert_eq!(output.approved_cancels.len(), num_cancels);

            let mut seen: Vec<String> = output
                .approved_opens
                .iter()
                .map(|approved| approved.0.key.cid.to_string())
                .chain(output.refused_opens.iter().map(|refused| refused.item.key.cid.to_string()))
                .collect();
            seen.sort();
            seen.dedup();
            prop_assert_eq!(seen.len(), opens.len());
        }
    }
}
