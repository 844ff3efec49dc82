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

//! Calmar ratio: excess return per unit of maximum drawdown.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{excess_return_ratio, scale_ratio};
use crate::time::TimeInterval;

/// A Calmar ratio expressed over `interval`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalmarRatio {
    pub value: Decimal,
    pub interval: TimeInterval,
}

impl CalmarRatio {
    /// Calculates `(mean_return - risk_free_return) / |max_drawdown|` over `returns_period`.
    #[must_use]
    pub fn calculate(
        risk_free_return: Decimal,
        mean_return: Decimal,
        max_drawdown: Decimal,
        returns_period: TimeInterval,
    ) -> Self {
        Self {
            value: excess_return_ratio(risk_free_return, mean_return, max_drawdown.abs()),
            interval: returns_period,
        }
    }

    /// Rescales the ratio to `target` by the square root of the interval ratio.
    #[must_use]
    pub fn scale(self, target: TimeInterval) -> Self {
        Self {
            value: scale_ratio(self.value, self.interval, target),
            interval: target,
        }
    }
}
