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

//! Persistence of review records. The scheduler never touches storage
//! itself; callers read the current state, schedule, then save.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::scheduler::Scheduler;
use crate::types::quality::Quality;
use crate::types::record::ReviewRecord;
use crate::types::record::ReviewState;
use crate::types::timestamp::Timestamp;

/// Identifies one learning item: the module it belongs to (e.g.
/// `vocabulary`, `kanji`) and its id within that module.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct ItemKey {
    pub module: String,
    pub item: String,
}

impl ItemKey {
    pub fn new(module: impl Into<String>, item: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            item: item.into(),
        }
    }
}

impl Display for ItemKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.module, self.item)
    }
}

/// Parses `module/item`. The item id may itself contain slashes.
impl TryFrom<String> for ItemKey {
    type Error = ErrorReport;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.split_once('/') {
            Some((module, item)) if !module.is_empty() && !item.is_empty() => {
                Ok(ItemKey::new(module, item))
            }
            _ => Err(ErrorReport::new(format!(
                "invalid item key '{value}', expected module/item."
            ))),
        }
    }
}

pub trait ReviewStore {
    /// The state of an item. Items without a record are `New`.
    fn get(&self, key: &ItemKey) -> Fallible<ReviewState>;

    fn save(&mut self, key: &ItemKey, record: &ReviewRecord) -> Fallible<()>;

    fn remove(&mut self, key: &ItemKey) -> Fallible<()>;

    /// All stored records, optionally restricted to one module, ordered by
    /// key.
    fn records(&self, module: Option<&str>) -> Fallible<Vec<(ItemKey, ReviewRecord)>>;

    /// Delete every record, or every record of one module.
    fn clear(&mut self, module: Option<&str>) -> Fallible<()>;
}

/// Read the item's state, schedule the review and save the result.
pub fn review_item(
    store: &mut impl ReviewStore,
    scheduler: &Scheduler,
    key: &ItemKey,
    quality: Quality,
    now: Timestamp,
) -> Fallible<ReviewRecord> {
    let state = store.get(key)?;
    let record = scheduler.schedule_next(&state, quality, now);
    store.save(key, &record)?;
    log::debug!("Reviewed {key}, next due {}", record.due_at);
    Ok(record)
}

/// Keeps records in memory.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryStore {
    records: BTreeMap<ItemKey, ReviewRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ReviewStore for MemoryStore {
    fn get(&self, key: &ItemKey) -> Fallible<ReviewState> {
        Ok(self.records.get(key).cloned().into())
    }

    fn save(&mut self, key: &ItemKey, record: &ReviewRecord) -> Fallible<()> {
        self.records.insert(key.clone(), record.clone());
        Ok(())
    }

    fn remove(&mut self, key: &ItemKey) -> Fallible<()> {
        self.records.remove(key);
        Ok(())
    }

    fn records(&self, module: Option<&str>) -> Fallible<Vec<(ItemKey, ReviewRecord)>> {
        Ok(self
            .records
            .iter()
            .filter(|(key, _)| module.is_none_or(|m| key.module == m))
            .map(|(key, record)| (key.clone(), record.clone()))
            .collect())
    }

    fn clear(&mut self, module: Option<&str>) -> Fallible<()> {
        match module {
            Some(m) => self.records.retain(|key, _| key.module != m),
            None => self.records.clear(),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;

    fn make_timestamp(s: &str) -> Timestamp {
        let ndt = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.3f").unwrap();
        Timestamp::new(ndt)
    }

    #[test]
    fn test_missing_is_new() -> Fallible<()> {
        let store = MemoryStore::new();
        assert!(store.get(&ItemKey::new("kanji", "水"))?.is_new());
        Ok(())
    }

    #[test]
    fn test_review_item_round_trip() -> Fallible<()> {
        let mut store = MemoryStore::new();
        let scheduler = Scheduler::default();
        let key = ItemKey::new("vocabulary", "taberu");
        let t1 = make_timestamp("2024-01-01T12:00:00.000");
        let first = review_item(&mut store, &scheduler, &key, Quality::PERFECT, t1)?;
        assert_eq!(first.repetitions, 1);
        let t2 = first.due_at;
        let second = review_item(&mut store, &scheduler, &key, Quality::PERFECT, t2)?;
        assert_eq!(second.repetitions, 2);
        assert_eq!(second.interval_days, 6);
        assert_eq!(store.get(&key)?, ReviewState::Reviewed(second));
        assert_eq!(store.len(), 1);
        Ok(())
    }

    #[test]
    fn test_records_by_module() -> Fallible<()> {
        let mut store = MemoryStore::new();
        let scheduler = Scheduler::default();
        let now = make_timestamp("2024-01-01T12:00:00.000");
        for key in [
            ItemKey::new("kanji", "日"),
            ItemKey::new("grammar", "te-form"),
            ItemKey::new("kanji", "月"),
        ] {
            review_item(&mut store, &scheduler, &key, Quality::HESITANT, now)?;
        }
        assert_eq!(store.records(None)?.len(), 3);
        let kanji: Vec<String> = store
            .records(Some("kanji"))?
            .into_iter()
            .map(|(key, _)| key.item)
            .collect();
        assert_eq!(kanji, vec!["日".to_string(), "月".to_string()]);

        store.clear(Some("kanji"))?;
        assert_eq!(store.records(None)?.len(), 1);
        store.remove(&ItemKey::new("grammar", "te-form"))?;
        assert!(store.is_empty());
        Ok(())
    }

    #[test]
    fn test_key_display() {
        assert_eq!(ItemKey::new("hanzi", "好").to_string(), "hanzi/好");
    }

    #[test]
    fn test_key_parse() -> Fallible<()> {
        let key = ItemKey::try_from("reading/n5/story-1".to_string())?;
        assert_eq!(key, ItemKey::new("reading", "n5/story-1"));
        for bad in ["", "kanji", "/x", "kanji/"] {
            assert!(ItemKey::try_from(bad.to_string()).is_err(), "{bad}");
        }
        Ok(())
    }
}
