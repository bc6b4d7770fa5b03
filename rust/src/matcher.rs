//! Edit-distance matching for near-miss identifiers.

use std::collections::HashSet;
use std::hash::BuildHasher;

/// Default bound on the edit distance accepted by [`fuzzy_match`].
pub const DEFAULT_MAX_DISTANCE: usize = 3;

/// Levenshtein distance between two strings, counted in chars.
///
/// Two-row DP: O(len(a) * len(b)) time, O(min(len(a), len(b))) space.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    // Keep the shorter string along the row
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    if short.is_empty() {
        return long.len();
    }

    let mut prev: Vec<usize> = (0..=short.len()).collect();
    let mut curr: Vec<usize> = vec![0; short.len() + 1];

    for (i, &lc) in long.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &sc) in short.iter().enumerate() {
            let substitution = prev[j] + usize::from(lc != sc);
            let deletion = prev[j + 1] + 1;
            let insertion = curr[j] + 1;
            curr[j + 1] = substitution.min(deletion).min(insertion);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[short.len()]
}

/// Find the closest valid identifier within `max_distance` edits.
///
/// Returns `reference` itself (as stored in the set) when it is already valid,
/// without computing any distance. Among candidates tied at the minimum
/// distance the lexicographically smallest wins, so the answer never depends
/// on set iteration order.
pub fn fuzzy_match<'a, S: BuildHasher>(
    reference: &str,
    valid_ids: &'a HashSet<String, S>,
    max_distance: usize,
) -> Option<&'a str> {
    if let Some(exact) = valid_ids.get(reference) {
        return Some(exact.as_str());
    }

    let mut best: Option<(usize, &'a str)> = None;
    for candidate in valid_ids {
        let dist = levenshtein(reference, candidate);
        if dist > max_distance {
            continue;
        }
        let better = match best {
            None => true,
            Some((best_dist, best_id)) => {
                (dist, candidate.as_str()) < (best_dist, best_id)
            }
        };
        if better {
            best = Some((dist, candidate.as_str()));
        }
    }

    best.map(|(_, id)| id)
}
