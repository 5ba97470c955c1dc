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

use std::fs::write;

use kioku_core::Fallible;
use kioku_core::ReviewRecord;
use kioku_core::ReviewStore;
use kioku_core::Timestamp;
use serde::Deserialize;
use serde::Serialize;

use crate::collection::Collection;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Export {
    pub exported_at: Timestamp,
    pub records: Vec<ExportedRecord>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportedRecord {
    pub module: String,
    pub item: String,
    #[serde(flatten)]
    pub record: ReviewRecord,
}

pub fn build_export(collection: &Collection, now: Timestamp) -> Fallible<Export> {
    let records = collection
        .db
        .records(None)?
        .into_iter()
        .map(|(key, record)| ExportedRecord {
            module: key.module,
            item: key.item,
            record,
        })
        .collect();
    Ok(Export {
        exported_at: now,
        records,
    })
}

pub fn export_collection(directory: Option<String>, output: Option<String>) -> Fallible<()> {
    let collection = Collection::new(directory)?;
    let export = build_export(&collection, Timestamp::now())?;
    let json = serde_json::to_string_pretty(&export)?;
    match output {
        Some(path) => {
            write(&path, json)?;
            log::debug!("Exported {} records to {path}", export.records.len());
        }
        None => println!("{json}"),
    }
    Ok(())
}
