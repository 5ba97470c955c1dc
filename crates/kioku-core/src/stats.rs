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

use serde::Serialize;

use crate::mastery::MasteryLevel;
use crate::scheduler::Scheduler;
use crate::store::ItemKey;
use crate::types::date::Date;
use crate::types::record::ReviewRecord;
use crate::types::record::ReviewState;
use crate::types::timestamp::Timestamp;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ModuleStats {
    pub total: usize,
    pub due_now: usize,
    pub average_ease: f64,
}

/// An overview of a learner's reviewed items.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct QueueStats {
    pub total: usize,
    pub due_now: usize,
    /// Due at any time up to the end of today.
    pub due_today: usize,
    /// Due at any time up to seven days from now.
    pub due_this_week: usize,
    /// Zero when there are no records.
    pub average_ease: f64,
    pub by_mastery: BTreeMap<MasteryLevel, usize>,
    pub by_module: BTreeMap<String, ModuleStats>,
    /// Items the learner keeps failing, ordered by key.
    pub struggling: Vec<ItemKey>,
}

fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 { 0.0 } else { sum / count as f64 }
}

impl QueueStats {
    pub fn compute(
        scheduler: &Scheduler,
        records: &[(ItemKey, ReviewRecord)],
        now: Timestamp,
    ) -> Self {
        let today: Date = now.date();
        let week_end: Timestamp = now.plus_days(7);
        let mut stats = QueueStats {
            total: records.len(),
            by_mastery: MasteryLevel::ALL.iter().map(|level| (*level, 0)).collect(),
            ..QueueStats::default()
        };
        let mut ease_sum: f64 = 0.0;
        let mut module_ease: BTreeMap<String, f64> = BTreeMap::new();
        for (key, record) in records {
            let state = ReviewState::Reviewed(record.clone());
            let due_now = scheduler.is_due(&state, now);
            let due_date: Date = record.due_at.date();
            if due_now {
                stats.due_now += 1;
            }
            if due_date <= today {
                stats.due_today += 1;
            }
            if record.due_at <= week_end {
                stats.due_this_week += 1;
            }
            ease_sum += record.ease_factor;
            *stats
                .by_mastery
                .entry(scheduler.mastery_level(&state))
                .or_insert(0) += 1;

            let module = stats.by_module.entry(key.module.clone()).or_default();
            module.total += 1;
            if due_now {
                module.due_now += 1;
            }
            *module_ease.entry(key.module.clone()).or_insert(0.0) += record.ease_factor;

            if scheduler.is_struggling(&state) {
                stats.struggling.push(key.clone());
            }
        }
        stats.average_ease = mean(ease_sum, stats.total);
        for (name, module) in stats.by_module.iter_mut() {
            let sum = module_ease.get(name).copied().unwrap_or(0.0);
            module.average_ease = mean(sum, module.total);
        }
        stats.struggling.sort();
        stats
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;
    use crate::types::quality::Quality;

    fn make_timestamp(s: &str) -> Timestamp {
        let ndt = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.3f").unwrap();
        Timestamp::new(ndt)
    }

    fn now() -> Timestamp {
        make_timestamp("2024-05-10T08:00:00.000")
    }

    fn record(due_at: &str, repetitions: u32, interval_days: i64, ease: f64) -> ReviewRecord {
        let due_at = make_timestamp(due_at);
        ReviewRecord {
            repetitions,
            ease_factor: ease,
            interval_days,
            due_at,
            last_reviewed_at: due_at.plus_days(-interval_days),
            lapses: 0,
            recent_qualities: vec![Quality::HESITANT],
        }
    }

    #[test]
    fn test_empty() {
        let stats = QueueStats::compute(&Scheduler::default(), &[], now());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.average_ease, 0.0);
        assert_eq!(stats.by_mastery.get(&MasteryLevel::Mature), Some(&0));
        assert!(stats.by_module.is_empty());
    }

    #[test]
    fn test_counts() {
        let records = vec![
            (
                ItemKey::new("kanji", "a"),
                record("2024-05-09T08:00:00.000", 2, 6, 2.5),
            ),
            (
                ItemKey::new("kanji", "b"),
                record("2024-05-10T20:00:00.000", 4, 30, 2.7),
            ),
            (
                ItemKey::new("vocabulary", "c"),
                record("2024-05-14T08:00:00.000", 3, 10, 1.5),
            ),
            (
                ItemKey::new("vocabulary", "d"),
                record("2024-06-01T08:00:00.000", 1, 1, 2.5),
            ),
        ];
        let stats = QueueStats::compute(&Scheduler::default(), &records, now());
        assert_eq!(stats.total, 4);
        assert_eq!(stats.due_now, 1);
        assert_eq!(stats.due_today, 2);
        assert_eq!(stats.due_this_week, 3);
        assert!((stats.average_ease - 2.3).abs() < 1e-9);
        assert_eq!(stats.by_mastery[&MasteryLevel::Learning], 2);
        assert_eq!(stats.by_mastery[&MasteryLevel::Young], 1);
        assert_eq!(stats.by_mastery[&MasteryLevel::Mature], 1);
        assert_eq!(stats.by_mastery[&MasteryLevel::New], 0);
        let kanji = &stats.by_module["kanji"];
        assert_eq!(kanji.total, 2);
        assert_eq!(kanji.due_now, 1);
        assert!((kanji.average_ease - 2.6).abs() < 1e-9);
        assert_eq!(stats.struggling, vec![ItemKey::new("vocabulary", "c")]);
    }

    #[test]
    fn test_week_ends_seven_days_from_now() {
        let records = vec![
            (
                ItemKey::new("kanji", "early"),
                record("2024-05-17T07:59:00.000", 2, 6, 2.5),
            ),
            (
                ItemKey::new("kanji", "boundary"),
                record("2024-05-17T08:00:00.000", 2, 6, 2.5),
            ),
            (
                ItemKey::new("kanji", "late"),
                record("2024-05-17T08:01:00.000", 2, 6, 2.5),
            ),
        ];
        let stats = QueueStats::compute(&Scheduler::default(), &records, now());
        assert_eq!(stats.due_this_week, 2);
        assert_eq!(stats.due_today, 0);
    }
}
