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

//! Performance statistics for the Meridian trading engine.
//!
//! The `meridian-analysis` crate turns the stream of exited positions and balance snapshots
//! produced by an engine into reproducible performance summaries:
//!
//! - Time intervals for scaling statistics between observation periods.
//! - Welford's online mean and variance, and streaming data set summaries.
//! - Drawdown detection, with maximum and mean drawdowns.
//! - Sharpe, Sortino and Calmar ratios, rate of return, profit factor and win rate.
//! - Per-instrument and per-asset tear sheets aggregated into a [`summary::TradingSummary`].
//!
//! All statistics are computed with `Decimal` arithmetic. Where a ratio would be infinite,
//! the result saturates to `Decimal::MAX` or `Decimal::MIN`.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod dataset;
pub mod drawdown;
pub mod metric;
pub mod summary;
pub mod time;
pub mod welford;
