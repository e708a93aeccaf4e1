//! Trigram Shannon entropy over lowercase a-z letters and space.

use std::collections::HashMap;

/// Strip everything but lowercase letters and spaces, then compute the
/// Shannon entropy of the resulting trigram distribution.
pub fn trigram_entropy(text: &str) -> f64 {
    let cleaned: Vec<char> =
        text.to_lowercase().chars().filter(|c| c.is_ascii_lowercase() || *c == ' ').collect();

    if cleaned.len() < 3 {
        return 0.0;
    }

    let mut counts: HashMap<(char, char, char), u64> = HashMap::new();
    for window in cleaned.windows(3) {
        *counts.entry((window[0], window[1], window[2])).or_insert(0) += 1;
    }

    let total: u64 = counts.values().sum();
    if total == 0 {
        return 0.0;
    }

    counts
        .values()
        .map(|&count| {
            let p = count as f64 / total as f64;
            -p * p.log2()
        })
        .sum()
}
