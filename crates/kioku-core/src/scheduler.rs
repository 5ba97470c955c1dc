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

//! The scheduling engine: turns an answer into a quality, a quality into
//! the next review record, and a record into due/priority/mastery answers.
//! Every operation is total. Out-of-range input is clamped or defaulted.

use crate::config::SrsConfig;
use crate::error::Fallible;
use crate::mastery::MasteryLevel;
use crate::sm2::Days;
use crate::sm2::Ease;
use crate::sm2::ease_after_lapse;
use crate::sm2::ease_after_pass;
use crate::sm2::interval_after_pass;
use crate::types::quality::Difficulty;
use crate::types::quality::Quality;
use crate::types::record::ReviewRecord;
use crate::types::record::ReviewState;
use crate::types::timestamp::Timestamp;

#[derive(Clone, Debug, PartialEq)]
pub struct Scheduler {
    config: SrsConfig,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            config: SrsConfig::default(),
        }
    }
}

impl Scheduler {
    pub fn new(config: SrsConfig) -> Fallible<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SrsConfig {
        &self.config
    }

    /// Rate an answer. Negative response times count as zero, and an
    /// incorrect answer with no recorded time is treated as a blackout.
    pub fn derive_quality(
        &self,
        is_correct: bool,
        response_time_ms: i64,
        difficulty: Difficulty,
    ) -> Quality {
        let elapsed: i64 = response_time_ms.max(0);
        if !is_correct {
            return if elapsed == 0 {
                Quality::BLACKOUT
            } else {
                self.config.attempted_quality
            };
        }
        let allowance: f64 = self.config.time_allowance(difficulty);
        let elapsed = elapsed as f64;
        if elapsed < self.config.fast_response_ms as f64 * allowance {
            Quality::PERFECT
        } else if elapsed < self.config.slow_response_ms as f64 * allowance {
            Quality::HESITANT
        } else {
            Quality::DIFFICULT
        }
    }

    /// Compute the record that follows a review of the given quality at
    /// `now`. New items are seeded first, so `New` and a freshly seeded
    /// record behave identically.
    pub fn schedule_next(
        &self,
        state: &ReviewState,
        quality: Quality,
        now: Timestamp,
    ) -> ReviewRecord {
        let previous: ReviewRecord = match state {
            ReviewState::New => ReviewRecord::seed(&self.config, now),
            ReviewState::Reviewed(record) => self.sanitize(record),
        };
        let (repetitions, ease_factor, interval_days, lapses): (u32, Ease, Days, u32) =
            if quality.is_pass() {
                let ease = ease_after_pass(previous.ease_factor, quality, &self.config);
                let interval = interval_after_pass(
                    previous.interval_days,
                    previous.repetitions,
                    ease,
                    &self.config,
                );
                (
                    previous.repetitions.saturating_add(1),
                    ease,
                    interval,
                    previous.lapses,
                )
            } else {
                (
                    0,
                    ease_after_lapse(previous.ease_factor, &self.config),
                    self.config.min_interval_days,
                    previous.lapses.saturating_add(1),
                )
            };
        let mut recent_qualities = previous.recent_qualities;
        recent_qualities.push(quality);
        if recent_qualities.len() > self.config.history_len {
            let excess = recent_qualities.len() - self.config.history_len;
            recent_qualities.drain(..excess);
        }
        log::debug!(
            "quality {quality}: repetitions {} -> {repetitions}, ease {:.2} -> {ease_factor:.2}, interval {} -> {interval_days}",
            previous.repetitions,
            previous.ease_factor,
            previous.interval_days,
        );
        ReviewRecord {
            repetitions,
            ease_factor,
            interval_days,
            due_at: now.plus_days(interval_days),
            last_reviewed_at: now,
            lapses,
            recent_qualities,
        }
    }

    /// Whether the item should be presented at `now`. The boundary counts
    /// as due.
    pub fn is_due(&self, state: &ReviewState, now: Timestamp) -> bool {
        match state {
            ReviewState::New => true,
            ReviewState::Reviewed(record) => now >= record.due_at,
        }
    }

    /// Ordering key for review queues, higher first. This is the number of
    /// days the item is overdue (negative if not yet due), and infinite for
    /// items never reviewed.
    pub fn priority(&self, state: &ReviewState, now: Timestamp) -> f64 {
        match state {
            ReviewState::New => f64::INFINITY,
            ReviewState::Reviewed(record) => now.days_since(record.due_at),
        }
    }

    pub fn mastery_level(&self, state: &ReviewState) -> MasteryLevel {
        match state {
            ReviewState::New => MasteryLevel::New,
            ReviewState::Reviewed(record) => {
                MasteryLevel::classify(record.repetitions, record.interval_days, &self.config)
            }
        }
    }

    /// Whether the learner keeps failing the item.
    pub fn is_struggling(&self, state: &ReviewState) -> bool {
        match state {
            ReviewState::New => false,
            ReviewState::Reviewed(record) => {
                record.ease_factor < self.config.struggling_ease
                    || record.last_quality().is_some_and(|q| !q.is_pass())
            }
        }
    }

    /// Records from storage may predate the current configuration or have
    /// been edited by hand. Pull them back into range before doing
    /// arithmetic on them.
    fn sanitize(&self, record: &ReviewRecord) -> ReviewRecord {
        let ease_factor = if record.ease_factor.is_finite() {
            record.ease_factor.max(self.config.ease_floor)
        } else {
            self.config.starting_ease
        };
        ReviewRecord {
            ease_factor,
            interval_days: record.interval_days.max(self.config.min_interval_days),
            ..record.clone()
        }
    }
}
