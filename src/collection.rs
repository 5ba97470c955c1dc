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

use std::env::current_dir;
use std::fs::read_to_string;
use std::path::PathBuf;

use kioku_core::Fallible;
use kioku_core::Scheduler;
use kioku_core::SrsConfig;
use kioku_core::fail;

use crate::db::Database;

pub const DATABASE_FILE: &str = "kioku.db";
pub const CONFIG_FILE: &str = "kioku.toml";

/// A learner's data directory: the review database and an optional
/// scheduler configuration file.
pub struct Collection {
    pub directory: PathBuf,
    pub db: Database,
    pub scheduler: Scheduler,
}

impl Collection {
    pub fn new(directory: Option<String>) -> Fallible<Self> {
        let directory: PathBuf = match directory {
            Some(dir) => PathBuf::from(dir),
            None => current_dir()?,
        };
        if !directory.is_dir() {
            return fail("directory does not exist.");
        }
        let config_path = directory.join(CONFIG_FILE);
        let config: SrsConfig = if config_path.exists() {
            log::debug!("Loading configuration from {}", config_path.display());
            SrsConfig::from_toml_str(&read_to_string(&config_path)?)?
        } else {
            SrsConfig::default()
        };
        let scheduler = Scheduler::new(config)?;
        let db = Database::open(&directory.join(DATABASE_FILE))?;
        Ok(Self {
            directory,
            db,
            scheduler,
        })
    }
}
