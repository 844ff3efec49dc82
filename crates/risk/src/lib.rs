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

//! Pre-trade risk management for the Meridian trading engine.
//!
//! The `meridian-risk` crate decides which outgoing order requests are allowed through to
//! execution. A [`manager::RiskManager`] partitions each batch of open and cancel requests
//! into approved and refused collections, attaching a reason to every refusal.
//!
//! Two managers are provided:
//!
//! - [`manager::DefaultRiskManager`] approves everything.
//! - [`limits::LimitsRiskManager`] checks open requests against the quantity, notional,
//!   exposure and leverage limits of a [`config::RiskConfiguration`].

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod check;
pub mod config;
pub mod limits;
pub mod manager;
