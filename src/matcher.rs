//! Cross-run pattern matching.

use crate::error::{ReportError, Result};
use crate::table::RunRows;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Pattern keys present in every run of a batch.
pub type PatternSet = BTreeSet<String>;

/// Returns the pattern keys that appear in every table of `tables`.
///
/// A key present in only some runs is excluded so a pattern is never compared
/// against a run that did not execute it. Fails with
/// [`ReportError::NoComparableData`] when nothing qualifies.
pub fn common_patterns(tables: &[RunRows]) -> Result<PatternSet> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for table in tables {
        let distinct: HashSet<String> = table.rows.iter().map(|r| r.pattern_key()).collect();
        for key in distinct {
            *counts.entry(key).or_insert(0) += 1;
        }
    }

    let common: PatternSet = counts
        .into_iter()
        .filter(|(_, count)| *count == tables.len())
        .map(|(key, _)| key)
        .collect();

    if common.is_empty() {
        return Err(ReportError::NoComparableData);
    }
    Ok(common)
}
