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

use serde::Serialize;

use crate::mastery::MasteryLevel;
use crate::rng::TinyRng;
use crate::scheduler::Scheduler;
use crate::store::ItemKey;
use crate::types::record::ReviewState;
use crate::types::timestamp::Timestamp;

/// Which items go into a review session.
#[derive(Clone, Debug, Default)]
pub struct QueueOptions {
    /// Maximum number of items in the session. `None` means all due items.
    pub max_items: Option<usize>,
    /// Maximum number of never-reviewed items in the session.
    pub max_new_items: Option<usize>,
    /// Only these modules. Empty means every module.
    pub modules: Vec<String>,
    /// Whether never-reviewed items are included at all.
    pub include_new: bool,
    /// Shuffle the selected items instead of presenting them by priority.
    pub shuffle: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QueueEntry {
    pub key: ItemKey,
    pub state: ReviewState,
    pub priority: f64,
    pub mastery: MasteryLevel,
}

/// Select and order the items to review at `now`. Most overdue first;
/// never-reviewed items rank above everything else.
pub fn build_queue(
    scheduler: &Scheduler,
    items: Vec<(ItemKey, ReviewState)>,
    options: &QueueOptions,
    now: Timestamp,
    rng: &mut TinyRng,
) -> Vec<QueueEntry> {
    let mut candidates: Vec<QueueEntry> = items
        .into_iter()
        .filter(|(key, _)| options.modules.is_empty() || options.modules.contains(&key.module))
        .filter(|(_, state)| options.include_new || !state.is_new())
        .filter(|(_, state)| scheduler.is_due(state, now))
        .map(|(key, state)| QueueEntry {
            priority: scheduler.priority(&state, now),
            mastery: scheduler.mastery_level(&state),
            key,
            state,
        })
        .collect();
    candidates.sort_by(|a, b| {
        b.priority
            .total_cmp(&a.priority)
            .then_with(|| a.key.cmp(&b.key))
    });

    let mut new_taken: usize = 0;
    let mut queue: Vec<QueueEntry> = Vec::new();
    for entry in candidates {
        if options.max_items.is_some_and(|max| queue.len() >= max) {
            break;
        }
        if entry.state.is_new() {
            if options.max_new_items.is_some_and(|max| new_taken >= max) {
                continue;
            }
            new_taken += 1;
        }
        queue.push(entry);
    }
    if options.shuffle {
        rng.shuffle(&mut queue);
    }
    log::debug!("Built a queue of {} items ({new_taken} new)", queue.len());
    queue
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;
    use crate::types::record::ReviewRecord;

    fn make_timestamp(s: &str) -> Timestamp {
        let ndt = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.3f").unwrap();
        Timestamp::new(ndt)
    }

    fn now() -> Timestamp {
        make_timestamp("2024-05-10T08:00:00.000")
    }

    fn due_in(days: i64) -> ReviewState {
        let scheduler = Scheduler::default();
        let mut record = ReviewRecord::seed(scheduler.config(), now());
        record.repetitions = 2;
        record.interval_days = 6;
        record.due_at = now().plus_days(days);
        record.last_reviewed_at = record.due_at.plus_days(-6);
        ReviewState::Reviewed(record)
    }

    fn items() -> Vec<(ItemKey, ReviewState)> {
        vec![
            (ItemKey::new("kanji", "a"), due_in(-1)),
            (ItemKey::new("kanji", "b"), due_in(-5)),
            (ItemKey::new("vocabulary", "c"), due_in(0)),
            (ItemKey::new("vocabulary", "d"), due_in(2)),
            (ItemKey::new("vocabulary", "e"), ReviewState::New),
            (ItemKey::new("kanji", "f"), ReviewState::New),
        ]
    }

    fn names(queue: &[QueueEntry]) -> Vec<&str> {
        queue.iter().map(|e| e.key.item.as_str()).collect()
    }

    #[test]
    fn test_due_only_by_priority() {
        let options = QueueOptions::default();
        let queue = build_queue(
            &Scheduler::default(),
            items(),
            &options,
            now(),
            &mut TinyRng::from_seed(0),
        );
        assert_eq!(names(&queue), vec!["b", "a", "c"]);
        assert_eq!(queue[0].priority, 5.0);
        assert_eq!(queue[0].mastery, MasteryLevel::Learning);
    }

    #[test]
    fn test_new_items_first() {
        let options = QueueOptions {
            include_new: true,
            ..QueueOptions::default()
        };
        let queue = build_queue(
            &Scheduler::default(),
            items(),
            &options,
            now(),
            &mut TinyRng::from_seed(0),
        );
        assert_eq!(names(&queue), vec!["f", "e", "b", "a", "c"]);
        assert_eq!(queue[0].mastery, MasteryLevel::New);
    }

    #[test]
    fn test_limits() {
        let options = QueueOptions {
            include_new: true,
            max_new_items: Some(1),
            max_items: Some(3),
            ..QueueOptions::default()
        };
        let queue = build_queue(
            &Scheduler::default(),
            items(),
            &options,
            now(),
            &mut TinyRng::from_seed(0),
        );
        assert_eq!(names(&queue), vec!["f", "b", "a"]);
    }

    #[test]
    fn test_module_filter() {
        let options = QueueOptions {
            include_new: true,
            modules: vec!["vocabulary".to_string()],
            ..QueueOptions::default()
        };
        let queue = build_queue(
            &Scheduler::default(),
            items(),
            &options,
            now(),
            &mut TinyRng::from_seed(0),
        );
        assert_eq!(names(&queue), vec!["e", "c"]);
    }

    #[test]
    fn test_shuffle_keeps_selection() {
        let options = QueueOptions {
            include_new: true,
            shuffle: true,
            ..QueueOptions::default()
        };
        let queue = build_queue(
            &Scheduler::default(),
            items(),
            &options,
            now(),
            &mut TinyRng::from_seed(3),
        );
        let mut selected = names(&queue);
        selected.sort();
        assert_eq!(selected, vec!["a", "b", "c", "e", "f"]);
    }

    #[test]
    fn test_empty() {
        let queue = build_queue(
            &Scheduler::default(),
            vec![],
            &QueueOptions::default(),
            now(),
            &mut TinyRng::from_seed(0),
        );
        assert!(queue.is_empty());
    }
}
