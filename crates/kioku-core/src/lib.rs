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

//! kioku-core: the scheduling engine behind kioku.
//!
//! This library is WASM-compatible and performs no I/O. It provides:
//! - Quality derivation from answers (correctness, response time, difficulty)
//! - SM-2 style scheduling of review records
//! - Due, priority and mastery queries, review queues and statistics
//! - The `ReviewStore` trait implemented by the CLI and browser front ends

pub mod config;
pub mod error;
pub mod mastery;
pub mod queue;
pub mod rng;
pub mod scheduler;
pub mod session;
pub mod sm2;
pub mod stats;
pub mod store;
pub mod types;

// Re-exports for convenience
pub use config::SrsConfig;
pub use error::{ErrorReport, Fallible, fail};
pub use mastery::MasteryLevel;
pub use queue::{QueueEntry, QueueOptions, build_queue};
pub use scheduler::Scheduler;
pub use session::{ModuleBreakdown, ReviewOutcome, SessionSummary};
pub use stats::QueueStats;
pub use store::{ItemKey, MemoryStore, ReviewStore, review_item};
pub use types::date::Date;
pub use types::quality::{Difficulty, Quality};
pub use types::record::{ReviewRecord, ReviewState};
pub use types::timestamp::Timestamp;
