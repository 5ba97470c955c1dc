// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;
use serde::Serialize;

use crate::config::SrsConfig;
use crate::sm2::Days;

/// How well-learned an item is. Always computed from a record, never stored.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MasteryLevel {
    New,
    Learning,
    Young,
    Mature,
}

impl MasteryLevel {
    pub const ALL: [MasteryLevel; 4] = [
        MasteryLevel::New,
        MasteryLevel::Learning,
        MasteryLevel::Young,
        MasteryLevel::Mature,
    ];

    /// Classify a reviewed item.
    pub fn classify(repetitions: u32, interval_days: Days, config: &SrsConfig) -> Self {
        if interval_days >= config.mature_interval_days {
            MasteryLevel::Mature
        } else if repetitions >= config.young_repetitions
            && interval_days >= config.young_interval_days
        {
            MasteryLevel::Young
        } else {
            MasteryLevel::Learning
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            MasteryLevel::New => "new",
            MasteryLevel::Learning => "learning",
            MasteryLevel::Young => "young",
            MasteryLevel::Mature => "mature",
        }
    }
}

impl Display for MasteryLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
