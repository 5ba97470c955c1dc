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

//! Review records persisted in the browser's localStorage.
//!
//! Each module is stored under its own key as a JSON object from item id to
//! record, and `kioku:modules` lists the modules that have records. Entries
//! that do not decode as a record read as new items and are left in place
//! until the item is reviewed again.

use std::collections::BTreeMap;

use kioku_core::ErrorReport;
use kioku_core::Fallible;
use kioku_core::ItemKey;
use kioku_core::ReviewRecord;
use kioku_core::ReviewState;
use kioku_core::ReviewStore;
use serde_json::Value;
use wasm_bindgen::JsValue;
use web_sys::Storage as WebStorage;

const MODULES_KEY: &str = "kioku:modules";

type ModuleRecords = BTreeMap<String, Value>;

fn module_key(module: &str) -> String {
    format!("kioku:reviews:{module}")
}

fn decode(key: &ItemKey, value: &Value) -> Option<ReviewRecord> {
    match serde_json::from_value(value.clone()) {
        Ok(record) => Some(record),
        Err(e) => {
            log::warn!("Ignoring malformed record for {key}: {e}");
            None
        }
    }
}

fn storage_error(e: JsValue) -> ErrorReport {
    let detail = e.as_string().unwrap_or_else(|| format!("{e:?}"));
    ErrorReport::new(format!("localStorage error: {detail}"))
}

enum Backend {
    Browser(WebStorage),
    Memory(BTreeMap<String, String>),
}

pub struct LocalStore {
    backend: Backend,
}

impl LocalStore {
    /// Use the window's localStorage, or keep records in memory when it is
    /// unavailable (e.g. private browsing).
    pub fn new() -> Self {
        match web_sys::window().and_then(|w| w.local_storage().ok()).flatten() {
            Some(storage) => Self {
                backend: Backend::Browser(storage),
            },
            None => {
                web_sys::console::warn_1(&"localStorage unavailable, reviews will not persist".into());
                Self::in_memory()
            }
        }
    }

    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(BTreeMap::new()),
        }
    }

    fn get_raw(&self, key: &str) -> Fallible<Option<String>> {
        match &self.backend {
            Backend::Browser(storage) => storage.get_item(key).map_err(storage_error),
            Backend::Memory(map) => Ok(map.get(key).cloned()),
        }
    }

    fn set_raw(&mut self, key: &str, value: String) -> Fallible<()> {
        match &mut self.backend {
            Backend::Browser(storage) => storage.set_item(key, &value).map_err(storage_error),
            Backend::Memory(map) => {
                map.insert(key.to_string(), value);
                Ok(())
            }
        }
    }

    fn remove_raw(&mut self, key: &str) -> Fallible<()> {
        match &mut self.backend {
            Backend::Browser(storage) => storage.remove_item(key).map_err(storage_error),
            Backend::Memory(map) => {
                map.remove(key);
                Ok(())
            }
        }
    }

    /// Modules with at least one record, sorted.
    pub fn modules(&self) -> Fallible<Vec<String>> {
        let Some(json) = self.get_raw(MODULES_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&json) {
            Ok(modules) => Ok(modules),
            Err(e) => {
                log::warn!("Ignoring unreadable module index: {e}");
                Ok(Vec::new())
            }
        }
    }

    fn load_module(&self, module: &str) -> Fallible<ModuleRecords> {
        let Some(json) = self.get_raw(&module_key(module))? else {
            return Ok(ModuleRecords::new());
        };
        match serde_json::from_str(&json) {
            Ok(records) => Ok(records),
            Err(e) => {
                log::warn!("Ignoring unreadable records for module {module}: {e}");
                Ok(ModuleRecords::new())
            }
        }
    }

    fn store_module(&mut self, module: &str, records: &ModuleRecords) -> Fallible<()> {
        let mut modules = self.modules()?;
        if records.is_empty() {
            self.remove_raw(&module_key(module))?;
            modules.retain(|m| m != module);
        } else {
            self.set_raw(&module_key(module), serde_json::to_string(records)?)?;
            if let Err(index) = modules.binary_search_by(|m| m.as_str().cmp(module)) {
                modules.insert(index, module.to_string());
            }
        }
        if modules.is_empty() {
            self.remove_raw(MODULES_KEY)
        } else {
            self.set_raw(MODULES_KEY, serde_json::to_string(&modules)?)
        }
    }
}

impl Default for LocalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReviewStore for LocalStore {
    fn get(&self, key: &ItemKey) -> Fallible<ReviewState> {
        let records = self.load_module(&key.module)?;
        Ok(records
            .get(&key.item)
            .and_then(|value| decode(key, value))
            .into())
    }

    fn save(&mut self, key: &ItemKey, record: &ReviewRecord) -> Fallible<()> {
        let mut records = self.load_module(&key.module)?;
        records.insert(key.item.clone(), serde_json::to_value(record)?);
        self.store_module(&key.module, &records)
    }

    fn remove(&mut self, key: &ItemKey) -> Fallible<()> {
        let mut records = self.load_module(&key.module)?;
        if records.remove(&key.item).is_some() {
            self.store_module(&key.module, &records)?;
        }
        Ok(())
    }

    fn records(&self, module: Option<&str>) -> Fallible<Vec<(ItemKey, ReviewRecord)>> {
        let modules: Vec<String> = match module {
            Some(module) => vec![module.to_string()],
            None => self.modules()?,
        };
        let mut out = Vec::new();
        for module in modules {
            for (item, value) in self.load_module(&module)? {
                let key = ItemKey::new(module.clone(), item);
                if let Some(record) = decode(&key, &value) {
                    out.push((key, record));
                }
            }
        }
        Ok(out)
    }

    fn clear(&mut self, module: Option<&str>) -> Fallible<()> {
        match module {
            Some(module) => self.store_module(module, &ModuleRecords::new()),
            None => {
                for module in self.modules()? {
                    self.remove_raw(&module_key(&module))?;
                }
                self.remove_raw(MODULES_KEY)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use kioku_core::Quality;
    use kioku_core::Scheduler;
    use kioku_core::Timestamp;
    use kioku_core::review_item;

    use super::*;

    fn now() -> Timestamp {
        Timestamp::try_from("2024-06-01T08:30:00.000".to_string()).unwrap()
    }

    #[test]
    fn test_missing_item_is_new() -> Fallible<()> {
        let store = LocalStore::in_memory();
        assert_eq!(store.get(&ItemKey::new("kanji", "火"))?, ReviewState::New);
        assert!(store.modules()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_save_and_layout() -> Fallible<()> {
        let mut store = LocalStore::in_memory();
        let scheduler = Scheduler::default();
        let fire = ItemKey::new("kanji", "火");
        let dog = ItemKey::new("vocabulary", "inu");
        let record = review_item(&mut store, &scheduler, &fire, Quality::PERFECT, now())?;
        review_item(&mut store, &scheduler, &dog, Quality::HESITANT, now())?;

        assert_eq!(store.get(&fire)?, ReviewState::Reviewed(record));
        assert_eq!(store.modules()?, vec!["kanji", "vocabulary"]);
        let raw = store.get_raw("kioku:reviews:kanji")?.unwrap();
        let parsed: ModuleRecords = serde_json::from_str(&raw)?;
        assert!(parsed.contains_key("火"));
        assert_eq!(store.records(None)?.len(), 2);
        assert_eq!(store.records(Some("vocabulary"))?[0].0, dog);
        Ok(())
    }

    #[test]
    fn test_remove_last_item_drops_module() -> Fallible<()> {
        let mut store = LocalStore::in_memory();
        let key = ItemKey::new("grammar", "te-form");
        review_item(&mut store, &Scheduler::default(), &key, Quality::DIFFICULT, now())?;
        store.remove(&key)?;
        assert_eq!(store.get(&key)?, ReviewState::New);
        assert!(store.modules()?.is_empty());
        assert_eq!(store.get_raw("kioku:reviews:grammar")?, None);
        Ok(())
    }

    #[test]
    fn test_clear() -> Fallible<()> {
        let mut store = LocalStore::in_memory();
        let scheduler = Scheduler::default();
        for (module, item) in [("kanji", "山"), ("kanji", "川"), ("reading", "story-2")] {
            review_item(&mut store, &scheduler, &ItemKey::new(module, item), Quality::PERFECT, now())?;
        }
        store.clear(Some("kanji"))?;
        assert_eq!(store.modules()?, vec!["reading"]);
        store.clear(None)?;
        assert!(store.records(None)?.is_empty());
        assert_eq!(store.get_raw(MODULES_KEY)?, None);
        Ok(())
    }

    #[test]
    fn test_malformed_entry_reads_as_new() -> Fallible<()> {
        let mut store = LocalStore::in_memory();
        let scheduler = Scheduler::default();
        let moon = ItemKey::new("kanji", "月");
        review_item(&mut store, &scheduler, &moon, Quality::PERFECT, now())?;
        let mut raw: Value = serde_json::from_str(&store.get_raw("kioku:reviews:kanji")?.unwrap())?;
        raw["日"] = serde_json::json!({"interval": 3, "easeFactor": 2.5});
        store.set_raw("kioku:reviews:kanji", raw.to_string())?;

        let sun = ItemKey::new("kanji", "日");
        assert_eq!(store.get(&sun)?, ReviewState::New);
        assert_eq!(store.get(&moon)?.record().map(|r| r.repetitions), Some(1));
        assert_eq!(store.records(None)?.len(), 1);

        let record = review_item(&mut store, &scheduler, &moon, Quality::PERFECT, now().plus_days(1))?;
        assert_eq!(record.repetitions, 2);
        let record = review_item(&mut store, &scheduler, &sun, Quality::PERFECT, now())?;
        assert_eq!(record.repetitions, 1);
        assert_eq!(store.records(Some("kanji"))?.len(), 2);
        Ok(())
    }

    #[test]
    fn test_unreadable_module_reads_as_empty() -> Fallible<()> {
        let mut store = LocalStore::in_memory();
        store.set_raw("kioku:reviews:grammar", "not json".to_string())?;
        store.set_raw(MODULES_KEY, r#"["grammar"]"#.to_string())?;
        let key = ItemKey::new("grammar", "ni");
        assert_eq!(store.get(&key)?, ReviewState::New);
        assert!(store.records(None)?.is_empty());
        review_item(&mut store, &Scheduler::default(), &key, Quality::HESITANT, now())?;
        assert_eq!(store.records(None)?.len(), 1);
        Ok(())
    }
}
