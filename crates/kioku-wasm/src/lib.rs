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

//! WASM bindings for kioku - runs the scheduler in the browser.
//!
//! Timestamps cross the boundary as `YYYY-MM-DDTHH:MM:SS.sss` strings in the
//! learner's local time, and structured results as JSON strings.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use web_sys::console;

use kioku_core::Difficulty;
use kioku_core::ErrorReport;
use kioku_core::Fallible;
use kioku_core::ItemKey;
use kioku_core::MasteryLevel;
use kioku_core::Quality;
use kioku_core::QueueEntry;
use kioku_core::QueueOptions;
use kioku_core::QueueStats;
use kioku_core::ReviewOutcome;
use kioku_core::ReviewRecord;
use kioku_core::ReviewState;
use kioku_core::ReviewStore;
use kioku_core::Scheduler;
use kioku_core::SessionSummary;
use kioku_core::SrsConfig;
use kioku_core::Timestamp;
use kioku_core::build_queue;
use kioku_core::review_item;
use kioku_core::rng::TinyRng;

mod storage;

use storage::LocalStore;

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    console::log_1(&"kioku WASM initialized".into());
}

fn to_js(e: ErrorReport) -> JsValue {
    JsValue::from_str(e.message())
}

fn parse_timestamp(s: &str) -> Fallible<Timestamp> {
    Timestamp::try_from(s.to_string())
}

/// What the front end asks for when building a session.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct QueueRequest {
    modules: Vec<String>,
    /// Items from the current lesson, as `module/item`. Those without a
    /// record are offered as new.
    new_items: Vec<String>,
    max_items: Option<usize>,
    max_new_items: Option<usize>,
    shuffle: bool,
}

#[derive(Debug, Serialize)]
struct MasteryReport {
    level: MasteryLevel,
    due: bool,
    struggling: bool,
}

/// The scheduler and the learner's records, managed from JavaScript.
#[wasm_bindgen]
pub struct KiokuApp {
    scheduler: Scheduler,
    store: LocalStore,
    session: SessionSummary,
}

#[wasm_bindgen]
impl KiokuApp {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::with_store(LocalStore::new())
    }

    /// Override scheduler settings from a TOML document.
    #[wasm_bindgen]
    pub fn configure(&mut self, config_toml: &str) -> Result<(), JsValue> {
        self.apply_config(config_toml).map_err(to_js)
    }

    /// Record a quiz answer. `difficulty` is "easy", "normal" or "hard".
    /// Returns the updated record as JSON.
    #[wasm_bindgen]
    pub fn answer(
        &mut self,
        module: &str,
        item: &str,
        correct: bool,
        response_time_ms: f64,
        difficulty: &str,
        now: &str,
    ) -> Result<String, JsValue> {
        let difficulty = Difficulty::try_from(difficulty.to_string()).map_err(to_js)?;
        let now = parse_timestamp(now).map_err(to_js)?;
        let record = self
            .record_answer(
                ItemKey::new(module, item),
                correct,
                response_time_ms as i64,
                difficulty,
                now,
            )
            .map_err(to_js)?;
        to_json(&record)
    }

    /// Record a self-graded review on the 0-5 scale.
    #[wasm_bindgen]
    pub fn review_with_quality(
        &mut self,
        module: &str,
        item: &str,
        quality: i32,
        now: &str,
    ) -> Result<String, JsValue> {
        let now = parse_timestamp(now).map_err(to_js)?;
        let record = self
            .record_quality(ItemKey::new(module, item), Quality::new(quality.into()), now)
            .map_err(to_js)?;
        to_json(&record)
    }

    /// The review queue as a JSON array. `request_json` may set `modules`,
    /// `new_items`, `max_items`, `max_new_items` and `shuffle`.
    #[wasm_bindgen]
    pub fn due_queue(&self, request_json: &str, now: &str) -> Result<String, JsValue> {
        let now = parse_timestamp(now).map_err(to_js)?;
        let queue = self.queue(request_json, now).map_err(to_js)?;
        to_json(&queue)
    }

    /// Mastery level, due flag and struggling flag of one item, as JSON.
    #[wasm_bindgen]
    pub fn mastery(&self, module: &str, item: &str, now: &str) -> Result<String, JsValue> {
        let now = parse_timestamp(now).map_err(to_js)?;
        let report = self
            .mastery_report(&ItemKey::new(module, item), now)
            .map_err(to_js)?;
        to_json(&report)
    }

    /// Statistics over the stored records, optionally for one module.
    #[wasm_bindgen]
    pub fn stats(&self, module: Option<String>, now: &str) -> Result<String, JsValue> {
        let now = parse_timestamp(now).map_err(to_js)?;
        let records = self.store.records(module.as_deref()).map_err(to_js)?;
        to_json(&QueueStats::compute(&self.scheduler, &records, now))
    }

    /// Tally of the answers given since the app was created or the last
    /// call to `reset_session`.
    #[wasm_bindgen]
    pub fn session_summary(&self) -> Result<String, JsValue> {
        to_json(&self.session)
    }

    #[wasm_bindgen]
    pub fn reset_session(&mut self) {
        self.session = SessionSummary::new();
    }

    /// Forget one item so its next review counts as the first. Returns
    /// whether it had a record.
    #[wasm_bindgen]
    pub fn reset_item(&mut self, module: &str, item: &str) -> Result<bool, JsValue> {
        self.forget_item(&ItemKey::new(module, item)).map_err(to_js)
    }

    /// Forget the history of one module. Returns how many records were
    /// deleted.
    #[wasm_bindgen]
    pub fn reset_module(&mut self, module: &str) -> Result<usize, JsValue> {
        let count = self.store.records(Some(module)).map_err(to_js)?.len();
        self.store.clear(Some(module)).map_err(to_js)?;
        console::log_1(&format!("Deleted {count} records from {module}").into());
        Ok(count)
    }

    /// All records as a JSON object from `module/item` to record.
    #[wasm_bindgen]
    pub fn export_records(&self) -> Result<String, JsValue> {
        let records: BTreeMap<String, ReviewRecord> = self
            .store
            .records(None)
            .map_err(to_js)?
            .into_iter()
            .map(|(key, record)| (key.to_string(), record))
            .collect();
        to_json(&records)
    }
}

impl KiokuApp {
    fn with_store(store: LocalStore) -> Self {
        Self {
            scheduler: Scheduler::default(),
            store,
            session: SessionSummary::new(),
        }
    }

    fn apply_config(&mut self, config_toml: &str) -> Fallible<()> {
        let config = SrsConfig::from_toml_str(config_toml)?;
        self.scheduler = Scheduler::new(config)?;
        Ok(())
    }

    fn forget_item(&mut self, key: &ItemKey) -> Fallible<bool> {
        if self.store.get(key)?.is_new() {
            return Ok(false);
        }
        self.store.remove(key)?;
        Ok(true)
    }

    fn record_answer(
        &mut self,
        key: ItemKey,
        correct: bool,
        response_time_ms: i64,
        difficulty: Difficulty,
        now: Timestamp,
    ) -> Fallible<ReviewRecord> {
        let quality = self
            .scheduler
            .derive_quality(correct, response_time_ms, difficulty);
        let record = review_item(&mut self.store, &self.scheduler, &key, quality, now)?;
        self.session.record(&ReviewOutcome {
            key,
            quality,
            correct,
            response_time_ms,
        });
        Ok(record)
    }

    fn record_quality(
        &mut self,
        key: ItemKey,
        quality: Quality,
        now: Timestamp,
    ) -> Fallible<ReviewRecord> {
        let record = review_item(&mut self.store, &self.scheduler, &key, quality, now)?;
        self.session.record(&ReviewOutcome {
            key,
            quality,
            correct: quality.is_pass(),
            response_time_ms: 0,
        });
        Ok(record)
    }

    fn queue(&self, request_json: &str, now: Timestamp) -> Fallible<Vec<QueueEntry>> {
        let request: QueueRequest = if request_json.trim().is_empty() {
            QueueRequest::default()
        } else {
            serde_json::from_str(request_json)?
        };
        let mut items: BTreeMap<ItemKey, ReviewState> = self
            .store
            .records(None)?
            .into_iter()
            .map(|(key, record)| (key, ReviewState::Reviewed(record)))
            .collect();
        for raw in request.new_items.iter() {
            items
                .entry(ItemKey::try_from(raw.clone())?)
                .or_insert(ReviewState::New);
        }
        let options = QueueOptions {
            max_items: request.max_items,
            max_new_items: request.max_new_items,
            include_new: !request.new_items.is_empty(),
            modules: request.modules,
            shuffle: request.shuffle,
        };
        let mut rng = TinyRng::from_timestamp(now);
        Ok(build_queue(
            &self.scheduler,
            items.into_iter().collect(),
            &options,
            now,
            &mut rng,
        ))
    }

    fn mastery_report(&self, key: &ItemKey, now: Timestamp) -> Fallible<MasteryReport> {
        let state = self.store.get(key)?;
        Ok(MasteryReport {
            level: self.scheduler.mastery_level(&state),
            due: self.scheduler.is_due(&state, now),
            struggling: self.scheduler.is_struggling(&state),
        })
    }
}

impl Default for KiokuApp {
    fn default() -> Self {
        Self::new()
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| to_js(e.into()))
}

/// The current local time in the format the other methods expect.
#[wasm_bindgen]
pub fn now_timestamp() -> String {
    let date = js_sys::Date::new_0();
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}",
        date.get_full_year(),
        date.get_month() + 1,
        date.get_date(),
        date.get_hours(),
        date.get_minutes(),
        date.get_seconds(),
        date.get_milliseconds()
    )
}
