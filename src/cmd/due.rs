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

use kioku_core::Fallible;
use kioku_core::ItemKey;
use kioku_core::QueueEntry;
use kioku_core::QueueOptions;
use kioku_core::ReviewState;
use kioku_core::ReviewStore;
use kioku_core::Timestamp;
use kioku_core::build_queue;
use kioku_core::rng::TinyRng;

use crate::collection::Collection;

/// The review queue at `now`. `candidates` are items the caller knows
/// about (e.g. from a lesson); those without a record count as new.
pub fn due_queue(
    collection: &Collection,
    options: &QueueOptions,
    candidates: Vec<ItemKey>,
    now: Timestamp,
) -> Fallible<Vec<QueueEntry>> {
    let mut items: BTreeMap<ItemKey, ReviewState> = collection
        .db
        .records(None)?
        .into_iter()
        .map(|(key, record)| (key, ReviewState::Reviewed(record)))
        .collect();
    for key in candidates {
        items.entry(key).or_insert(ReviewState::New);
    }
    let mut rng = TinyRng::from_timestamp(now);
    Ok(build_queue(
        &collection.scheduler,
        items.into_iter().collect(),
        options,
        now,
        &mut rng,
    ))
}

fn format_entry(entry: &QueueEntry) -> String {
    let when = match &entry.state {
        ReviewState::New => "new".to_string(),
        ReviewState::Reviewed(record) => format!("due {}", record.due_at),
    };
    format!(
        "{}\t{}\t{}\t{:.2}",
        entry.key, entry.mastery, when, entry.priority
    )
}

pub fn due_command(
    directory: Option<String>,
    options: QueueOptions,
    candidates: Vec<ItemKey>,
) -> Fallible<()> {
    let collection = Collection::new(directory)?;
    let queue = due_queue(&collection, &options, candidates, Timestamp::now())?;
    if queue.is_empty() {
        println!("Nothing to review.");
    }
    for entry in &queue {
        println!("{}", format_entry(entry));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use kioku_core::Quality;
    use kioku_core::review_item;
    use tempfile::tempdir;

    use super::*;

    fn ts(s: &str) -> Timestamp {
        Timestamp::try_from(s.to_string()).unwrap()
    }

    #[test]
    fn test_due_queue() -> Fallible<()> {
        let dir = tempdir()?;
        let mut collection = Collection::new(Some(dir.path().display().to_string()))?;
        let start = ts("2024-04-01T10:00:00.000");
        let old = ItemKey::new("vocabulary", "mizu");
        let fresh = ItemKey::new("vocabulary", "hi");
        review_item(&mut collection.db, &collection.scheduler, &old, Quality::HESITANT, start)?;
        review_item(
            &mut collection.db,
            &collection.scheduler,
            &fresh,
            Quality::HESITANT,
            start.plus_days(1),
        )?;

        let now = ts("2024-04-02T12:00:00.000");
        let options = QueueOptions {
            include_new: true,
            ..QueueOptions::default()
        };
        let candidates = vec![old.clone(), ItemKey::new("vocabulary", "ki")];
        let queue = due_queue(&collection, &options, candidates, now)?;
        let keys: Vec<String> = queue.iter().map(|e| e.key.to_string()).collect();
        // "hi" is due tomorrow; "mizu" has a record, so it is not new.
        assert_eq!(keys, vec!["vocabulary/ki", "vocabulary/mizu"]);
        assert!(format_entry(&queue[0]).contains("\tnew\t"));
        assert_eq!(
            format_entry(&queue[1]),
            "vocabulary/mizu\tlearning\tdue 2024-04-02T10:00:00.000\t0.08"
        );
        Ok(())
    }
}
