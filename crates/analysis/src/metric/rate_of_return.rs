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

//! Rate of return: the mean return per interval.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::scale_value;
use crate::time::TimeInterval;

/// The mean return over `interval`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateOfReturn {
    pub value: Decimal,
    pub interval: TimeInterval,
}

impl RateOfReturn {
    /// Returns `mean_return` expressed over `returns_period`.
    #[must_use]
    pub const fn calculate(mean_return: Decimal, returns_period: TimeInterval) -> Self {
        Self {
            value: mean_return,
            interval: returns_period,
        }
    }

    /// Rescales the return to `target` linearly, as a first moment does not scale with
    /// the square root of time.
    #[must_use]
    pub fn scale(self, target: TimeInterval) -> Self {
        Self {
            value: scale_value(
                self.value,
                TimeInterval::linear_factor(self.interval, target),
            ),
            interval: target,
        }
    }
}
