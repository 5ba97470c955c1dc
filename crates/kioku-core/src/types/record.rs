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

use serde::Deserialize;
use serde::Serialize;

use crate::config::SrsConfig;
use crate::sm2::Days;
use crate::sm2::Ease;
use crate::types::quality::Quality;
use crate::types::timestamp::Timestamp;

/// The review history of one item, for one learner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ReviewState {
    /// The item has never been reviewed.
    New,
    /// The item has been reviewed at least once.
    Reviewed(ReviewRecord),
}

impl ReviewState {
    pub fn is_new(&self) -> bool {
        matches!(self, ReviewState::New)
    }

    pub fn record(&self) -> Option<&ReviewRecord> {
        match self {
            ReviewState::New => None,
            ReviewState::Reviewed(record) => Some(record),
        }
    }
}

impl From<Option<ReviewRecord>> for ReviewState {
    fn from(value: Option<ReviewRecord>) -> Self {
        match value {
            Some(record) => ReviewState::Reviewed(record),
            None => ReviewState::New,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// Consecutive successful reviews since the last lapse.
    pub repetitions: u32,
    /// Multiplier governing interval growth.
    pub ease_factor: Ease,
    /// Days from `last_reviewed_at` until `due_at`.
    pub interval_days: Days,
    /// When the item should next be reviewed.
    pub due_at: Timestamp,
    pub last_reviewed_at: Timestamp,
    /// Reviews that fell below the passing threshold.
    #[serde(default)]
    pub lapses: u32,
    /// The most recent qualities, oldest first.
    #[serde(default)]
    pub recent_qualities: Vec<Quality>,
}

impl ReviewRecord {
    /// The record an item starts from on its first review. It has no
    /// reviews yet, so it is due immediately.
    pub fn seed(config: &SrsConfig, now: Timestamp) -> Self {
        Self {
            repetitions: 0,
            ease_factor: config.starting_ease,
            interval_days: config.min_interval_days,
            due_at: now,
            last_reviewed_at: now,
            lapses: 0,
            recent_qualities: Vec::new(),
        }
    }

    pub fn last_quality(&self) -> Option<Quality> {
        self.recent_qualities.last().copied()
    }

    pub fn average_quality(&self) -> Option<f64> {
        if self.recent_qualities.is_empty() {
            return None;
        }
        let sum: f64 = self.recent_qualities.iter().map(|q| f64::from(*q)).sum();
        Some(sum / self.recent_qualities.len() as f64)
    }
}
