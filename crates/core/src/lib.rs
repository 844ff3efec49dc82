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

//! Core foundational types and utilities for the Meridian trading engine.
//!
//! The `meridian-core` crate is designed to be lightweight and to sit at the bottom of the
//! dependency graph. It supplies the essential building blocks used across the workspace,
//! including:
//!
//! - Correctness validation functions.
//! - Decimal arithmetic helpers (checked conversion, saturation, square roots).
//! - Time and duration conversion helpers.
//! - The [`Timed`] value wrapper used by streaming statistics.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod correctness;
pub mod datetime;
pub mod math;
pub mod timed;

// Re-exports
pub use crate::timed::Timed;

/// Message for when a lock guard cannot be acquired due to poisoning.
///
/// Lock guards should use `expect` rather than handle poison errors.
/// A poisoned lock indicates a thread panicked while holding the lock,
/// meaning protected data may be in an inconsistent state.
pub const MUTEX_POISONED: &str = "Mutex poisoned";
