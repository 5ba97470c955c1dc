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

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::store::ItemKey;
use crate::types::quality::Quality;

/// One answered item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewOutcome {
    pub key: ItemKey,
    pub quality: Quality,
    pub correct: bool,
    pub response_time_ms: i64,
}

/// Answers given within one module.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleBreakdown {
    pub total: usize,
    pub correct: usize,
}

impl ModuleBreakdown {
    pub fn accuracy(&self) -> f64 {
        percent(self.correct, self.total)
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    100.0 * part as f64 / whole as f64
}

/// Running tally of a review session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub total: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub time_spent_ms: i64,
    /// Items answered below the passing quality, in answer order, without
    /// repeats.
    pub struggling: Vec<ItemKey>,
    pub by_module: BTreeMap<String, ModuleBreakdown>,
}

impl SessionSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: &ReviewOutcome) {
        self.total += 1;
        if outcome.correct {
            self.correct += 1;
        } else {
            self.incorrect += 1;
        }
        let module = self.by_module.entry(outcome.key.module.clone()).or_default();
        module.total += 1;
        if outcome.correct {
            module.correct += 1;
        }
        self.time_spent_ms = self
            .time_spent_ms
            .saturating_add(outcome.response_time_ms.max(0));
        if !outcome.quality.is_pass() && !self.struggling.contains(&outcome.key) {
            self.struggling.push(outcome.key.clone());
        }
    }

    /// Percentage of correct answers, 0 for an empty session.
    pub fn accuracy(&self) -> f64 {
        percent(self.correct, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(item: &str, q: i64, correct: bool, ms: i64) -> ReviewOutcome {
        ReviewOutcome {
            key: ItemKey::new("vocabulary", item),
            quality: Quality::new(q),
            correct,
            response_time_ms: ms,
        }
    }

    #[test]
    fn test_empty() {
        let summary = SessionSummary::new();
        assert_eq!(summary.accuracy(), 0.0);
        assert!(summary.struggling.is_empty());
    }

    #[test]
    fn test_tally() {
        let mut summary = SessionSummary::new();
        summary.record(&outcome("inu", 5, true, 1500));
        summary.record(&outcome("neko", 1, false, 4000));
        summary.record(&outcome("tori", 4, true, -20));
        summary.record(&outcome("neko", 0, false, 0));
        assert_eq!(summary.total, 4);
        assert_eq!(summary.correct, 2);
        assert_eq!(summary.incorrect, 2);
        assert_eq!(summary.accuracy(), 50.0);
        assert_eq!(summary.time_spent_ms, 5500);
        assert_eq!(summary.struggling, vec![ItemKey::new("vocabulary", "neko")]);

        summary.record(&ReviewOutcome {
            key: ItemKey::new("kanji", "犬"),
            quality: Quality::PERFECT,
            correct: true,
            response_time_ms: 900,
        });
        assert_eq!(summary.by_module.len(), 2);
        let vocabulary = &summary.by_module["vocabulary"];
        assert_eq!((vocabulary.total, vocabulary.correct), (4, 2));
        assert_eq!(vocabulary.accuracy(), 50.0);
        let kanji = &summary.by_module["kanji"];
        assert_eq!((kanji.total, kanji.correct), (1, 1));
        assert_eq!(kanji.accuracy(), 100.0);
        assert_eq!(summary.accuracy(), 60.0);
    }
}
