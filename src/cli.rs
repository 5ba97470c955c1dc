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

use clap::ArgGroup;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use kioku_core::Difficulty;
use kioku_core::Fallible;
use kioku_core::ItemKey;
use kioku_core::Quality;
use kioku_core::QueueOptions;

use crate::cmd::due::due_command;
use crate::cmd::export::export_collection;
use crate::cmd::reset::reset_command;
use crate::cmd::review::Answer;
use crate::cmd::review::review_command;
use crate::cmd::show::show_command;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_stats;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the collection directory. By default, the current working directory is used.
    #[arg(long, short = 'C', global = true)]
    directory: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Clone, Copy, PartialEq, Debug)]
enum DifficultyArg {
    Easy,
    Normal,
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(value: DifficultyArg) -> Self {
        match value {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Normal => Difficulty::Normal,
            DifficultyArg::Hard => Difficulty::Hard,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Record a review of an item and schedule its next one.
    #[command(group(ArgGroup::new("answer").required(true).args(["correct", "incorrect", "quality"])))]
    Review {
        /// The module the item belongs to, e.g. `kanji`.
        module: String,
        /// The item's id within its module.
        item: String,
        /// The learner answered correctly.
        #[arg(long)]
        correct: bool,
        /// The learner answered incorrectly.
        #[arg(long)]
        incorrect: bool,
        /// Grade the review directly on the 0-5 scale. Out-of-range values are clamped.
        #[arg(long, allow_negative_numbers = true)]
        quality: Option<i64>,
        /// How long the learner took to answer, in milliseconds.
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        time_ms: i64,
        /// How hard the item is.
        #[arg(long, value_enum, default_value_t = DifficultyArg::Normal)]
        difficulty: DifficultyArg,
    },
    /// List the items due for review, most urgent first.
    Due {
        /// Only list items from these modules.
        #[arg(long)]
        module: Vec<String>,
        /// Maximum number of items to list.
        #[arg(long)]
        limit: Option<usize>,
        /// Maximum number of new items to list.
        #[arg(long)]
        new_limit: Option<usize>,
        /// Items (as `module/item`) to include as new if they have no history yet.
        #[arg(long = "new")]
        new_items: Vec<String>,
        /// Shuffle the queue.
        #[arg(long)]
        shuffle: bool,
    },
    /// Show the scheduling state of one item.
    Show {
        module: String,
        item: String,
    },
    /// Print review statistics.
    Stats {
        /// Only count items from this module.
        #[arg(long)]
        module: Option<String>,
        /// Which output format to use.
        #[arg(long, default_value_t = StatsFormat::Text)]
        format: StatsFormat,
    },
    /// Export all review records as JSON.
    Export {
        /// Optional path to the output file. By default, the output is printed to stdout.
        #[arg(long)]
        output: Option<String>,
    },
    /// Delete review history.
    Reset {
        /// Only delete records from this module.
        #[arg(long)]
        module: Option<String>,
        /// Only delete the record of this item. Requires `--module`.
        #[arg(long, requires = "module")]
        item: Option<String>,
    },
}

pub fn entrypoint() -> Fallible<()> {
    let Cli { directory, command } = Cli::parse();
    match command {
        Command::Review {
            module,
            item,
            correct,
            incorrect: _,
            quality,
            time_ms,
            difficulty,
        } => {
            let answer = match quality {
                Some(q) => Answer::Rated(Quality::new(q)),
                None => Answer::Response {
                    correct,
                    response_time_ms: time_ms,
                    difficulty: difficulty.into(),
                },
            };
            review_command(directory, ItemKey::new(module, item), answer)
        }
        Command::Due {
            module,
            limit,
            new_limit,
            new_items,
            shuffle,
        } => {
            let candidates: Vec<ItemKey> = new_items
                .into_iter()
                .map(ItemKey::try_from)
                .collect::<Fallible<_>>()?;
            let options = QueueOptions {
                max_items: limit,
                max_new_items: new_limit,
                modules: module,
                include_new: !candidates.is_empty(),
                shuffle,
            };
            due_command(directory, options, candidates)
        }
        Command::Show { module, item } => show_command(directory, ItemKey::new(module, item)),
        Command::Stats { module, format } => print_stats(directory, module, format),
        Command::Export { output } => export_collection(directory, output),
        Command::Reset { module, item } => reset_command(directory, module, item),
    }
}
