//! Occurrence counting over a candidate set.

use super::types::Neighborhood;
use std::collections::HashMap;

/// Names sharing the highest occurrence count, in first-seen order.
///
/// Empty input yields an empty tie set.
pub fn most_frequent_names(candidates: &[Neighborhood]) -> Vec<String> {
    tally(candidates)
        .map(|(names, _)| names.into_iter().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Count per distinct name, returning the tie set and its shared count.
pub(super) fn tally(candidates: &[Neighborhood]) -> Option<(Vec<&str>, usize)> {
    let mut order: Vec<(&str, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for candidate in candidates {
        match index.get(candidate.name.as_str()) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(candidate.name.as_str(), order.len());
                order.push((candidate.name.as_str(), 1));
            }
        }
    }

    let max = order.iter().map(|(_, count)| *count).max()?;
    let tied = order
        .into_iter()
        .filter(|(_, count)| *count == max)
        .map(|(name, _)| name)
        .collect();

    Some((tied, max))
}
