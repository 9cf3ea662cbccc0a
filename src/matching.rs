//! String normalization and similarity scoring for fuzzy option matching.
//!
//! Targets and candidates are normalized before comparison so that
//! "1층" and " 1 층 " score as identical, while punctuation such as
//! "-" or "/" never affects the result.

/// Score for any candidate when the target is empty. Small enough to never
/// beat a real match, large enough that the first non-empty option wins
/// over ties when the user supplies no value.
pub const EMPTY_TARGET_BIAS: f64 = 0.1;

/// Added when one normalized string contains the other.
pub const SUBSTRING_BONUS: f64 = 0.2;

/// Minimum score an option must reach for a non-empty target.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.5;

/// Lowercase and strip everything that is not a word character. Whitespace
/// and punctuation disappear; letters of any script (including Hangul) and
/// digits survive.
pub fn normalize(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Similarity of two normalized strings, in [0, 1].
///
/// An empty candidate never matches; an empty target yields the flat
/// [`EMPTY_TARGET_BIAS`]. Otherwise a normalized edit-distance ratio plus
/// a substring containment bonus, clamped to 1.0.
pub fn match_score(target_norm: &str, candidate_norm: &str) -> f64 {
    if candidate_norm.is_empty() {
        return 0.0;
    }
    if target_norm.is_empty() {
        return EMPTY_TARGET_BIAS;
    }

    let mut ratio = strsim::normalized_levenshtein(target_norm, candidate_norm);

    if candidate_norm.contains(target_norm) || target_norm.contains(candidate_norm) {
        ratio += SUBSTRING_BONUS;
    }

    ratio.min(1.0)
}

#[cfg(test)]
#[path = "matching_test.rs"]
mod matching_test;
