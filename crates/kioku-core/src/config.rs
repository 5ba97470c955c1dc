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

//! Scheduler configuration. The scheduler receives one immutable
//! `SrsConfig` at construction; nothing is configurable per call.

use serde::Deserialize;
use serde::Serialize;

use crate::error::Fallible;
use crate::error::fail;
use crate::types::quality::Difficulty;
use crate::types::quality::Quality;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SrsConfig {
    /// Ease factor of a freshly seeded record.
    pub starting_ease: f64,
    /// The ease factor never drops below this.
    pub ease_floor: f64,
    /// Subtracted from the ease factor on every lapse.
    pub lapse_penalty: f64,
    /// Interval in days after a lapse.
    pub min_interval_days: i64,
    /// Interval in days after the first successful review.
    pub first_interval_days: i64,
    /// Interval in days after the second consecutive successful review.
    pub second_interval_days: i64,
    /// Correct answers faster than this (in milliseconds, before the
    /// difficulty allowance) score a perfect quality.
    pub fast_response_ms: i64,
    /// Correct answers slower than this score the lowest passing quality.
    pub slow_response_ms: i64,
    /// Multipliers applied to both response thresholds, per difficulty.
    pub easy_allowance: f64,
    pub normal_allowance: f64,
    pub hard_allowance: f64,
    /// Quality of an incorrect answer that was at least attempted.
    pub attempted_quality: Quality,
    /// Repetitions needed, together with `young_interval_days`, to count as
    /// young.
    pub young_repetitions: u32,
    pub young_interval_days: i64,
    /// Records at or past this interval are mature.
    pub mature_interval_days: i64,
    /// How many recent qualities each record keeps.
    pub history_len: usize,
    /// Records with an ease factor below this are struggling.
    pub struggling_ease: f64,
}

impl Default for SrsConfig {
    fn default() -> Self {
        Self {
            starting_ease: 2.5,
            ease_floor: 1.3,
            lapse_penalty: 0.2,
            min_interval_days: 1,
            first_interval_days: 1,
            second_interval_days: 6,
            fast_response_ms: 3000,
            slow_response_ms: 5000,
            easy_allowance: 0.75,
            normal_allowance: 1.0,
            hard_allowance: 1.5,
            attempted_quality: Quality::RECOGNIZED,
            young_repetitions: 3,
            young_interval_days: 7,
            mature_interval_days: 21,
            history_len: 10,
            struggling_ease: 1.8,
        }
    }
}

impl SrsConfig {
    /// Parse a (possibly partial) TOML document. Missing fields take their
    /// default values.
    pub fn from_toml_str(s: &str) -> Fallible<Self> {
        let config: SrsConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn time_allowance(&self, difficulty: Difficulty) -> f64 {
        match difficulty {
            Difficulty::Easy => self.easy_allowance,
            Difficulty::Normal => self.normal_allowance,
            Difficulty::Hard => self.hard_allowance,
        }
    }

    pub fn validate(&self) -> Fallible<()> {
        if self.ease_floor.is_nan() || self.ease_floor <= 0.0 {
            return fail("ease_floor must be positive.");
        }
        if self.starting_ease.is_nan() || self.starting_ease < self.ease_floor {
            return fail("starting_ease must not be below ease_floor.");
        }
        if self.lapse_penalty.is_nan() || self.lapse_penalty < 0.0 {
            return fail("lapse_penalty must not be negative.");
        }
        if self.min_interval_days < 1
            || self.first_interval_days < 1
            || self.second_interval_days < self.first_interval_days
        {
            return fail("intervals must be positive and non-decreasing.");
        }
        if self.fast_response_ms < 0 || self.slow_response_ms < self.fast_response_ms {
            return fail("fast_response_ms must be between 0 and slow_response_ms.");
        }
        let ordered = self.easy_allowance > 0.0
            && self.easy_allowance <= self.normal_allowance
            && self.normal_allowance <= self.hard_allowance;
        if !ordered {
            return fail("difficulty allowances must be positive and ordered easy <= normal <= hard.");
        }
        if self.attempted_quality.is_pass() {
            return fail("attempted_quality must be a failing quality.");
        }
        if self.mature_interval_days < self.young_interval_days {
            return fail("mature_interval_days must not be below young_interval_days.");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(SrsConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_partial_toml() -> Fallible<()> {
        let config = SrsConfig::from_toml_str("ease_floor = 1.5\nmature_interval_days = 30\n")?;
        assert_eq!(config.ease_floor, 1.5);
        assert_eq!(config.mature_interval_days, 30);
        assert_eq!(config.starting_ease, 2.5);
        assert_eq!(config.attempted_quality, Quality::RECOGNIZED);
        Ok(())
    }

    #[test]
    fn test_empty_toml() -> Fallible<()> {
        assert_eq!(SrsConfig::from_toml_str("")?, SrsConfig::default());
        Ok(())
    }

    #[test]
    fn test_unknown_field() {
        assert!(SrsConfig::from_toml_str("ease_flor = 1.5\n").is_err());
    }

    #[test]
    fn test_floor_above_start() {
        let result = SrsConfig::from_toml_str("ease_floor = 3.0\n");
        assert_eq!(
            result.unwrap_err().to_string(),
            "error: starting_ease must not be below ease_floor."
        );
    }

    #[test]
    fn test_passing_attempted_quality() {
        assert!(SrsConfig::from_toml_str("attempted_quality = 4\n").is_err());
    }

    #[test]
    fn test_inverted_thresholds() {
        assert!(SrsConfig::from_toml_str("fast_response_ms = 9000\n").is_err());
        assert!(SrsConfig::from_toml_str("hard_allowance = 0.5\n").is_err());
        assert!(SrsConfig::from_toml_str("min_interval_days = 0\n").is_err());
    }

    #[test]
    fn test_time_allowance() {
        let config = SrsConfig::default();
        assert_eq!(config.time_allowance(Difficulty::Easy), 0.75);
        assert_eq!(config.time_allowance(Difficulty::Hard), 1.5);
    }
}
