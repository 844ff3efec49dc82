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

//! Engine orchestration for the Meridian trading engine.
//!
//! The `meridian-system` crate ties the model, risk and analysis crates together:
//!
//! - [`engine::SummaryGenerator`] applies account and market events to the engine state,
//!   gates outgoing requests through a risk manager, and renders trading summaries.
//! - [`backtest`] replays recorded event sequences, in parallel across parameter variations.
//! - [`live::LiveSystem`] drives a generator from a stream of events while other callers
//!   read summaries concurrently.
//! - [`config::SystemConfig`] loads and validates engine configuration from JSON or TOML.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod backtest;
pub mod config;
pub mod engine;
pub mod error;
pub mod live;
pub mod state;
