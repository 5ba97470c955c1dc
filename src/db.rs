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

use std::path::Path;

use kioku_core::ErrorReport;
use kioku_core::Fallible;
use kioku_core::ItemKey;
use kioku_core::Quality;
use kioku_core::ReviewRecord;
use kioku_core::ReviewState;
use kioku_core::ReviewStore;
use kioku_core::Timestamp;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::params;

const SCHEMA: &str = "
create table if not exists reviews (
    module text not null,
    item text not null,
    repetitions integer not null,
    ease_factor real not null,
    interval_days integer not null,
    due_at text not null,
    last_reviewed_at text not null,
    lapses integer not null default 0,
    recent_qualities text not null default '[]',
    primary key (module, item)
);
";

const COLUMNS: &str = "module, item, repetitions, ease_factor, interval_days, due_at, last_reviewed_at, lapses, recent_qualities";

fn db_error(e: rusqlite::Error) -> ErrorReport {
    ErrorReport::new(format!("database error: {e}"))
}

/// A value in the row that cannot be read as the column's type, e.g. text
/// in the ease column.
fn is_malformed(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::FromSqlConversionFailure(..)
            | rusqlite::Error::InvalidColumnType(..)
            | rusqlite::Error::IntegralValueOutOfRange(..)
    )
}

/// A row as stored, before the text columns are parsed.
struct RawRecord {
    module: String,
    item: String,
    repetitions: u32,
    ease_factor: f64,
    interval_days: i64,
    due_at: String,
    last_reviewed_at: String,
    lapses: u32,
    recent_qualities: String,
}

impl RawRecord {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            module: row.get(0)?,
            item: row.get(1)?,
            repetitions: row.get(2)?,
            ease_factor: row.get(3)?,
            interval_days: row.get(4)?,
            due_at: row.get(5)?,
            last_reviewed_at: row.get(6)?,
            lapses: row.get(7)?,
            recent_qualities: row.get(8)?,
        })
    }

    fn parse(self) -> Fallible<(ItemKey, ReviewRecord)> {
        let recent_qualities: Vec<Quality> = serde_json::from_str(&self.recent_qualities)?;
        let record = ReviewRecord {
            repetitions: self.repetitions,
            ease_factor: self.ease_factor,
            interval_days: self.interval_days,
            due_at: Timestamp::try_from(self.due_at)?,
            last_reviewed_at: Timestamp::try_from(self.last_reviewed_at)?,
            lapses: self.lapses,
            recent_qualities,
        };
        Ok((ItemKey::new(self.module, self.item), record))
    }
}

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Fallible<Self> {
        let conn = Connection::open(path).map_err(db_error)?;
        Self::with_connection(conn)
    }

    #[cfg(test)]
    pub fn in_memory() -> Fallible<Self> {
        let conn = Connection::open_in_memory().map_err(db_error)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Fallible<Self> {
        conn.execute_batch(SCHEMA).map_err(db_error)?;
        Ok(Self { conn })
    }

    pub fn count(&self) -> Fallible<usize> {
        let n: i64 = self
            .conn
            .query_row("select count(*) from reviews", [], |row| row.get(0))
            .map_err(db_error)?;
        Ok(n as usize)
    }
}

impl ReviewStore for Database {
    fn get(&self, key: &ItemKey) -> Fallible<ReviewState> {
        let sql = format!("select {COLUMNS} from reviews where module = ?1 and item = ?2");
        let raw: Option<RawRecord> = match self
            .conn
            .query_row(&sql, params![key.module, key.item], RawRecord::from_row)
            .optional()
        {
            Ok(raw) => raw,
            Err(e) if is_malformed(&e) => {
                log::warn!("Ignoring malformed record for {key}: {e}");
                return Ok(ReviewState::New);
            }
            Err(e) => return Err(db_error(e)),
        };
        match raw.map(RawRecord::parse) {
            Some(Ok((_, record))) => Ok(ReviewState::Reviewed(record)),
            Some(Err(e)) => {
                log::warn!("Ignoring malformed record for {key}: {}", e.message());
                Ok(ReviewState::New)
            }
            None => Ok(ReviewState::New),
        }
    }

    fn save(&mut self, key: &ItemKey, record: &ReviewRecord) -> Fallible<()> {
        let recent_qualities = serde_json::to_string(&record.recent_qualities)?;
        let sql = format!(
            "insert or replace into reviews ({COLUMNS}) values (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
        );
        self.conn
            .execute(
                &sql,
                params![
                    key.module,
                    key.item,
                    record.repetitions,
                    record.ease_factor,
                    record.interval_days,
                    record.due_at.to_string(),
                    record.last_reviewed_at.to_string(),
                    record.lapses,
                    recent_qualities,
                ],
            )
            .map_err(db_error)?;
        Ok(())
    }

    fn remove(&mut self, key: &ItemKey) -> Fallible<()> {
        self.conn
            .execute(
                "delete from reviews where module = ?1 and item = ?2",
                params![key.module, key.item],
            )
            .map_err(db_error)?;
        Ok(())
    }

    fn records(&self, module: Option<&str>) -> Fallible<Vec<(ItemKey, ReviewRecord)>> {
        let sql = format!(
            "select {COLUMNS} from reviews where ?1 is null or module = ?1 order by module, item"
        );
        let mut stmt = self.conn.prepare(&sql).map_err(db_error)?;
        let rows = stmt
            .query_map(params![module], RawRecord::from_row)
            .map_err(db_error)?;
        let mut records = Vec::new();
        for row in rows {
            let raw = match row {
                Ok(raw) => raw,
                Err(e) if is_malformed(&e) => {
                    log::warn!("Skipping malformed review row: {e}");
                    continue;
                }
                Err(e) => return Err(db_error(e)),
            };
            let key = format!("{}/{}", raw.module, raw.item);
            match raw.parse() {
                Ok(entry) => records.push(entry),
                Err(e) => log::warn!("Skipping malformed record for {key}: {}", e.message()),
            }
        }
        Ok(records)
    }

    fn clear(&mut self, module: Option<&str>) -> Fallible<()> {
        let deleted = self
            .conn
            .execute(
                "delete from reviews where ?1 is null or module = ?1",
                params![module],
            )
            .map_err(db_error)?;
        log::debug!("Deleted {deleted} review records");
        Ok(())
    }
}
