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

use kioku_core::Fallible;
use kioku_core::ItemKey;
use kioku_core::ReviewStore;

use crate::collection::Collection;

/// Forget review history. Returns how many records were deleted.
pub fn reset(collection: &mut Collection, module: Option<&str>) -> Fallible<usize> {
    let count = collection.db.records(module)?.len();
    collection.db.clear(module)?;
    Ok(count)
}

/// Forget one item so its next review counts as the first. Returns whether
/// it had a record.
pub fn reset_item(collection: &mut Collection, key: &ItemKey) -> Fallible<bool> {
    if collection.db.get(key)?.is_new() {
        return Ok(false);
    }
    collection.db.remove(key)?;
    Ok(true)
}

pub fn reset_command(
    directory: Option<String>,
    module: Option<String>,
    item: Option<String>,
) -> Fallible<()> {
    let mut collection = Collection::new(directory)?;
    match (module, item) {
        (Some(module), Some(item)) => {
            let key = ItemKey::new(module, item);
            if reset_item(&mut collection, &key)? {
                println!("Deleted the review record of {key}.");
            } else {
                println!("{key} has no review record.");
            }
        }
        (module, _) => {
            let count = reset(&mut collection, module.as_deref())?;
            println!(
                "Deleted {count} review records from {}.",
                collection.directory.display()
            );
        }
    }
    Ok(())
}
