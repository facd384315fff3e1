//! Fuzzy comparison of package and import names.
//!
//! The ratio is the longest-matching-blocks measure: repeatedly take the
//! longest common substring, recurse into the pieces left and right of it,
//! and score `2 * matched / (len(a) + len(b))`.

use super::normalize::normalize;

/// Default minimum ratio for two names to count as similar.
///
/// Low enough to catch `pandas-datareader` vs `pandas_datareader` style drift
/// and shortened import names, high enough to keep unrelated names apart.
pub const DEFAULT_THRESHOLD: f64 = 0.6;

/// Decides whether two names plausibly refer to the same package.
///
/// Both names are normalized first. Exact matches and substring relations in
/// either direction short-circuit to `true`; otherwise the matching-blocks
/// ratio must reach `threshold`. An empty normalized name only matches
/// another empty one.
///
/// ```
/// use depscope::matching::is_similar;
///
/// assert!(is_similar("PyYAML", "yaml", 0.6));
/// assert!(is_similar("beautifulsoup4", "beautifulsoup", 0.6));
/// assert!(!is_similar("numpy", "requests", 0.6));
/// ```
pub fn is_similar(a: &str, b: &str, threshold: f64) -> bool {
    let norm_a = normalize(a);
    let norm_b = normalize(b);

    if norm_a == norm_b {
        return true;
    }
    if norm_a.is_empty() || norm_b.is_empty() {
        return false;
    }
    if norm_a.contains(norm_b.as_str()) || norm_b.contains(norm_a.as_str()) {
        return true;
    }

    similarity_ratio(&norm_a, &norm_b) >= threshold
}

/// Computes the matching-blocks similarity ratio of two strings, in `[0, 1]`.
///
/// The pair is put in a canonical order before matching, so the result does
/// not depend on argument order. Two empty strings have ratio `1.0`.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    let first: Vec<char> = first.chars().collect();
    let second: Vec<char> = second.chars().collect();

    let total = first.len() + second.len();
    if total == 0 {
        return 1.0;
    }

    let matched = matching_characters(&first, &second);
    (2.0 * matched as f64) / total as f64
}

/// Sums the sizes of all matching blocks between `a` and `b`.
fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, size) = longest_match(a, b, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }

        matched += size;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            queue.push((i + size, ahi, j + size, bhi));
        }
    }

    matched
}

/// Finds the longest common run of `a[alo..ahi]` and `b[blo..bhi]`.
///
/// Returns `(start_in_a, start_in_b, size)`. Among equally long runs the one
/// that ends first in `a`, then first in `b`, wins.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
    let width = bhi - blo;

    // run_len[j - blo] = length of the common run ending at (i, j)
    let mut prev = vec![0usize; width];
    let mut current = vec![0usize; width];

    for i in alo..ahi {
        for j in blo..bhi {
            let slot = j - blo;
            if a[i] == b[j] {
                let k = if slot > 0 { prev[slot - 1] + 1 } else { 1 };
                current[slot] = k;
                if k > best_size {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_size = k;
                }
            } else {
                current[slot] = 0;
            }
        }
        std::mem::swap(&mut prev, &mut current);
    }

    (best_i, best_j, best_size)
}
