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

use std::fmt::Display;
use std::fmt::Formatter;

use clap::ValueEnum;
use kioku_core::Fallible;
use kioku_core::QueueStats;
use kioku_core::ReviewStore;
use kioku_core::Timestamp;

use crate::collection::Collection;

#[derive(ValueEnum, Clone, Copy, PartialEq, Debug)]
pub enum StatsFormat {
    /// Human-readable summary.
    Text,
    /// Machine-readable JSON.
    Json,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Text => write!(f, "text"),
            StatsFormat::Json => write!(f, "json"),
        }
    }
}

pub fn collection_stats(
    collection: &Collection,
    module: Option<&str>,
    now: Timestamp,
) -> Fallible<QueueStats> {
    let records = collection.db.records(module)?;
    Ok(QueueStats::compute(&collection.scheduler, &records, now))
}

pub fn render_text(stats: &QueueStats) -> String {
    let mut lines: Vec<String> = vec![
        format!("Items:          {}", stats.total),
        format!("Due now:        {}", stats.due_now),
        format!("Due today:      {}", stats.due_today),
        format!("Due this week:  {}", stats.due_this_week),
        format!("Average ease:   {:.2}", stats.average_ease),
    ];
    for (level, count) in &stats.by_mastery {
        lines.push(format!("  {:<13} {count}", format!("{level}:")));
    }
    if !stats.by_module.is_empty() {
        lines.push("Modules:".to_string());
        for (name, module) in &stats.by_module {
            lines.push(format!(
                "  {name}: {} items, {} due, ease {:.2}",
                module.total, module.due_now, module.average_ease
            ));
        }
    }
    if !stats.struggling.is_empty() {
        lines.push("Struggling:".to_string());
        for key in &stats.struggling {
            lines.push(format!("  {key}"));
        }
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

pub fn print_stats(
    directory: Option<String>,
    module: Option<String>,
    format: StatsFormat,
) -> Fallible<()> {
    let collection = Collection::new(directory)?;
    let stats = collection_stats(&collection, module.as_deref(), Timestamp::now())?;
    match format {
        StatsFormat::Text => print!("{}", render_text(&stats)),
        StatsFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use kioku_core::ItemKey;
    use kioku_core::Quality;
    use kioku_core::review_item;
    use tempfile::tempdir;

    use super::*;

    fn ts(s: &str) -> Timestamp {
        Timestamp::try_from(s.to_string()).unwrap()
    }

    #[test]
    fn test_stats_text() -> Fallible<()> {
        let dir = tempdir()?;
        let mut collection = Collection::new(Some(dir.path().display().to_string()))?;
        let now = ts("2024-04-01T10:00:00.000");
        for (item, q) in [("a", Quality::PERFECT), ("i", Quality::BLACKOUT)] {
            let key = ItemKey::new("alphabet", item);
            review_item(&mut collection.db, &collection.scheduler, &key, q, now)?;
        }
        let stats = collection_stats(&collection, None, now.plus_days(1))?;
        assert_eq!(stats.total, 2);
        assert_eq!(stats.due_now, 2);
        let text = render_text(&stats);
        assert!(text.starts_with("Items:          2\n"));
        assert!(text.contains("  learning:     2\n"));
        assert!(text.contains("  alphabet: 2 items, 2 due, ease 2.4"));
        assert!(text.contains("Struggling:\n  alphabet/i\n"));
        Ok(())
    }

    #[test]
    fn test_stats_module_filter() -> Fallible<()> {
        let dir = tempdir()?;
        let mut collection = Collection::new(Some(dir.path().display().to_string()))?;
        let now = ts("2024-04-01T10:00:00.000");
        for module in ["kanji", "grammar"] {
            let key = ItemKey::new(module, "x");
            review_item(&mut collection.db, &collection.scheduler, &key, Quality::HESITANT, now)?;
        }
        let stats = collection_stats(&collection, Some("grammar"), now)?;
        assert_eq!(stats.total, 1);
        assert_eq!(stats.by_module.keys().collect::<Vec<_>>(), vec!["grammar"]);
        Ok(())
    }

    #[test]
    fn test_stats_text_empty() {
        let text = render_text(&QueueStats::default());
        assert_eq!(
            text,
            "Items:          0\nDue now:        0\nDue today:      0\nDue this week:  0\nAverage ease:   0.00\n"
        );
    }
}
