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

//! A value paired with the time it was observed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A value of type `T` observed at `time`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timed<T> {
    /// The observed value.
    pub value: T,
    /// When the value was observed.
    pub time: DateTime<Utc>,
}

impl<T> Timed<T> {
    /// Creates a new [`Timed`] instance.
    pub const fn new(value: T, time: DateTime<Utc>) -> Self {
        Self { value, time }
    }
}
