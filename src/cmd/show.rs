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

use kioku_core::Fallible;
use kioku_core::ItemKey;
use kioku_core::MasteryLevel;
use kioku_core::ReviewState;
use kioku_core::ReviewStore;
use kioku_core::Timestamp;
use serde::Serialize;

use crate::collection::Collection;

/// Everything the scheduler can say about one item.
#[derive(Debug, PartialEq, Serialize)]
pub struct ItemReport {
    pub key: ItemKey,
    pub state: ReviewState,
    pub due: bool,
    /// `None` for items never reviewed, which always come first.
    pub priority: Option<f64>,
    pub mastery: MasteryLevel,
    pub struggling: bool,
}

pub fn item_report(collection: &Collection, key: ItemKey, now: Timestamp) -> Fallible<ItemReport> {
    let scheduler = &collection.scheduler;
    let state = collection.db.get(&key)?;
    let priority = scheduler.priority(&state, now);
    Ok(ItemReport {
        due: scheduler.is_due(&state, now),
        priority: priority.is_finite().then_some(priority),
        mastery: scheduler.mastery_level(&state),
        struggling: scheduler.is_struggling(&state),
        key,
        state,
    })
}

pub fn show_command(directory: Option<String>, key: ItemKey) -> Fallible<()> {
    let collection = Collection::new(directory)?;
    let report = item_report(&collection, key, Timestamp::now())?;
    println!("{}", serde_json::to_string_pretty(&report)?);
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
    fn test_new_item() -> Fallible<()> {
        let dir = tempdir()?;
        let collection = Collection::new(Some(dir.path().display().to_string()))?;
        let report = item_report(
            &collection,
            ItemKey::new("kanji", "木"),
            ts("2024-04-01T10:00:00.000"),
        )?;
        assert!(report.due);
        assert_eq!(report.priority, None);
        assert_eq!(report.mastery, MasteryLevel::New);
        assert!(!report.struggling);
        Ok(())
    }

    #[test]
    fn test_reviewed_item() -> Fallible<()> {
        let dir = tempdir()?;
        let mut collection = Collection::new(Some(dir.path().display().to_string()))?;
        let key = ItemKey::new("kanji", "木");
        let now = ts("2024-04-01T10:00:00.000");
        review_item(&mut collection.db, &collection.scheduler, &key, Quality::PERFECT, now)?;
        let report = item_report(&collection, key, now)?;
        assert!(!report.due);
        assert_eq!(report.priority, Some(-1.0));
        assert_eq!(report.mastery, MasteryLevel::Learning);
        Ok(())
    }
}
