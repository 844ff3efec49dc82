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

//! The [`RiskManager`] interface and its approve-everything default.

use std::fmt::Display;

use meridian_model::orders::{OrderRequestCancel, OrderRequestOpen};
use serde::{Deserialize, Serialize};

/// A request the risk manager allowed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskApproved<T>(pub T);

impl<T> RiskApproved<T> {
    /// Returns the approved item.
    pub fn into_item(self) -> T {
        self.0
    }
}

/// A request the risk manager refused, with the reason for refusal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskRefused<T> {
    pub item: T,
    pub reason: String,
}

impl<T> RiskRefused<T> {
    /// Creates a new [`RiskRefused`] instance.
    pub fn new<R: Display>(item: T, reason: R) -> Self {
        Self {
            item,
            reason: reason.to_string(),
        }
    }

    /// Returns the refused item.
    pub fn into_item(self) -> T {
        self.item
    }
}

/// The partition of one batch of requests. Every input request appears in exactly one
/// collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskCheckOutput {
    pub approved_cancels: Vec<RiskApproved<OrderRequestCancel>>,
    pub approved_opens: Vec<RiskApproved<OrderRequestOpen>>,
    pub refused_cancels: Vec<RiskRefused<OrderRequestCancel>>,
    pub refused_opens: Vec<RiskRefused<OrderRequestOpen>>,
}

impl RiskCheckOutput {
    /// Returns the total number of requests across all four collections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.approved_cancels.len()
            + self.approved_opens.len()
            + self.refused_cancels.len()
            + self.refused_opens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of refused requests.
    #[must_use]
    pub fn num_refused(&self) -> usize {
        self.refused_cancels.len() + self.refused_opens.len()
    }
}

/// Filters outgoing order requests before they are dispatched for execution.
///
/// `State` is the engine state an implementation reads to make its decisions. Implementations
/// must not mutate it and must place every input request in exactly one output collection.
pub trait RiskManager<State: ?Sized> {
    /// Partitions `cancels` and `opens` into approved and refused requests.
    fn check(
        &self,
        state: &State,
        cancels: Vec<OrderRequestCancel>,
        opens: Vec<OrderRequestOpen>,
    ) -> RiskCheckOutput;
}

/// A [`RiskManager`] that approves every request, for any engine state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultRiskManager;

impl<State: ?Sized> RiskManager<State> for DefaultRiskManager {
    fn check(
        &self,
        _state: &State,
        cancels: Vec<OrderRequestCancel>,
        opens: Vec<OrderRequestOpen>,
    ) -> RiskCheckOutput {
        RiskCheckOutput {
            approved_cancels: cancels.into_iter().map(RiskApproved).collect(),
            approved_opens: opens.into_iter().map(RiskApproved).collect(),
            refused_cancels: Vec::new(),
            refused_opens: Vec::new(),
        }
    }
}
