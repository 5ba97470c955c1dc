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

//! The SM-2 formulas, free of any record bookkeeping.

use crate::config::SrsConfig;
use crate::types::quality::Quality;

pub type Ease = f64;
pub type Days = i64;

/// EF' - EF = 0.1 - (5 - q) * (0.08 + (5 - q) * 0.02)
pub fn ease_delta(q: Quality) -> f64 {
    let miss: f64 = 5.0 - f64::from(q);
    0.1 - miss * (0.08 + miss * 0.02)
}

fn floor_ease(ease: Ease, config: &SrsConfig) -> Ease {
    if ease.is_nan() {
        return config.ease_floor;
    }
    ease.max(config.ease_floor)
}

/// The ease factor after a successful review.
pub fn ease_after_pass(ease: Ease, q: Quality, config: &SrsConfig) -> Ease {
    floor_ease(ease + ease_delta(q), config)
}

/// The ease factor after a lapse.
pub fn ease_after_lapse(ease: Ease, config: &SrsConfig) -> Ease {
    floor_ease(ease - config.lapse_penalty, config)
}

/// The interval after a successful review. `streak` is the number of
/// consecutive passes before this one.
pub fn interval_after_pass(previous: Days, streak: u32, ease: Ease, config: &SrsConfig) -> Days {
    let next: Days = match streak {
        0 => config.first_interval_days,
        1 => config.second_interval_days,
        _ => (previous as f64 * ease).round() as Days,
    };
    // Successive passes never shorten the interval.
    next.max(previous).max(config.min_interval_days)
}
