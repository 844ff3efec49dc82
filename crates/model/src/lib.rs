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

//! The domain model for the Meridian trading engine.
//!
//! The `meridian-model` crate defines the value types exchanged between the engine, risk
//! management and statistics layers:
//!
//! - Identifiers and the indexed instrument registry.
//! - Balances, trades and positions.
//! - Orders, order requests and the order lifecycle state machine.
//! - Engine events (account updates, market data and time updates).
//!
//! # Feature flags
//!
//! - `stubs`: Enables type stubs for use in testing scenarios.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod balance;
pub mod enums;
pub mod events;
pub mod identifiers;
pub mod instruments;
pub mod orders;
pub mod position;
pub mod trade;

#[cfg(any(test, feature = "stubs"))]
pub mod stubs;
