//! Title-keyed set difference between a snapshot and a manifest

use crate::model::TitleIndex;
use std::collections::HashSet;

/// Titles present in `current` but absent from `master`
///
/// Pure key subtraction: a retitled item counts as new.
pub fn diff(current: &TitleIndex, master: &TitleIndex) -> HashSet<String> {
    current
        .titles()
        .filter(|title| !master.contains(title))
        .map(str::to_string)
        .collect()
}
