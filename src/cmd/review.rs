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

use kioku_core::Difficulty;
use kioku_core::Fallible;
use kioku_core::ItemKey;
use kioku_core::Quality;
use kioku_core::ReviewRecord;
use kioku_core::Timestamp;
use kioku_core::review_item;

use crate::collection::Collection;

/// What the learner did.
pub enum Answer {
    /// A quality chosen directly, e.g. from self-grading buttons.
    Rated(Quality),
    /// An answer to a quiz, rated from its correctness and timing.
    Response {
        correct: bool,
        response_time_ms: i64,
        difficulty: Difficulty,
    },
}

pub fn review(
    collection: &mut Collection,
    key: &ItemKey,
    answer: Answer,
    now: Timestamp,
) -> Fallible<ReviewRecord> {
    let quality: Quality = match answer {
        Answer::Rated(quality) => quality,
        Answer::Response {
            correct,
            response_time_ms,
            difficulty,
        } => collection
            .scheduler
            .derive_quality(correct, response_time_ms, difficulty),
    };
    review_item(&mut collection.db, &collection.scheduler, key, quality, now)
}

pub fn review_command(directory: Option<String>, key: ItemKey, answer: Answer) -> Fallible<()> {
    let mut collection = Collection::new(directory)?;
    let record = review(&mut collection, &key, answer, Timestamp::now())?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
