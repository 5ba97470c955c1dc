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

use crate::error::ErrorReport;
use crate::error::fail;

/// How well a learner recalled an item, on the 0-5 scale. Values outside
/// the scale are clamped on construction, never rejected.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct Quality(u8);

impl Quality {
    /// Complete blackout.
    pub const BLACKOUT: Quality = Quality(0);
    /// Incorrect, but remembered upon seeing the answer.
    pub const RECOGNIZED: Quality = Quality(1);
    /// Incorrect, but the answer seemed easy.
    pub const FAMILIAR: Quality = Quality(2);
    /// Correct, with difficulty.
    pub const DIFFICULT: Quality = Quality(3);
    /// Correct, after some hesitation.
    pub const HESITANT: Quality = Quality(4);
    /// Perfect recall.
    pub const PERFECT: Quality = Quality(5);

    /// The lowest passing quality.
    pub const PASSING: Quality = Quality::DIFFICULT;

    pub fn new(value: i64) -> Self {
        Self(value.clamp(0, 5) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Whether this review counts as a successful recall.
    pub fn is_pass(self) -> bool {
        self >= Self::PASSING
    }

    pub fn as_str(&self) -> &str {
        match self.0 {
            0 => "blackout",
            1 => "recognized",
            2 => "familiar",
            3 => "difficult",
            4 => "hesitant",
            _ => "perfect",
        }
    }
}

impl From<i64> for Quality {
    fn from(value: i64) -> Self {
        Quality::new(value)
    }
}

impl From<Quality> for u8 {
    fn from(q: Quality) -> u8 {
        q.0
    }
}

impl From<Quality> for f64 {
    fn from(q: Quality) -> f64 {
        q.0 as f64
    }
}

impl Display for Quality {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The learner-facing difficulty of an item.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }
}

impl Display for Difficulty {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for Difficulty {
    type Error = ErrorReport;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            _ => fail(format!("invalid difficulty: {value}")),
        }
    }
}
