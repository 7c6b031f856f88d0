//! Fuzzy name matching for the search flows.
//!
//! Scoring is a partial best-alignment similarity in [0, 100]: the shorter
//! of the two strings is slid over the longer one and the best windowed
//! Levenshtein similarity wins, so a short query fully contained in a
//! longer candidate scores 100. Pure functions, independent of the chat
//! layer.

use strsim::normalized_levenshtein;

/// Candidates scoring below this are dropped by default.
pub const DEFAULT_THRESHOLD: u8 = 50;

/// Substring-tolerant similarity between two strings, in [0, 100].
/// Case-insensitive; comparison is per character, so non-ASCII scripts
/// align correctly.
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let needle: String = short.iter().collect();

    let mut best = 0.0_f64;
    for window in long.windows(short.len()) {
        let hay: String = window.iter().collect();
        let score = normalized_levenshtein(&needle, &hay);
        if score > best {
            best = score;
        }
        if best >= 1.0 {
            break;
        }
    }
    (best * 100.0).round() as u8
}

/// Rank `candidates` against `query`, best first. Candidates scoring below
/// `threshold` are excluded; ties keep first-appearance order.
pub fn search<'a, I>(query: &str, candidates: I, threshold: u8) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut scored: Vec<(&str, u8)> = candidates
        .into_iter()
        .map(|candidate| (candidate, partial_ratio(query, candidate)))
        .filter(|&(_, score)| score >= threshold)
        .collect();
    // sort_by is stable, so equal scores preserve candidate order
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.into_iter().map(|(candidate, _)| candidate).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_scores_100() {
        assert_eq!(partial_ratio("щи", "Щи"), 100);
    }

    #[test]
    fn test_substring_scores_100() {
        assert_eq!(partial_ratio("кокошник", "Кокошник праздничный"), 100);
    }

    #[test]
    fn test_unrelated_scores_low() {
        assert!(partial_ratio("zzz", "Борщ") < DEFAULT_THRESHOLD);
    }

    #[test]
    fn test_empty_query_scores_zero() {
        assert_eq!(partial_ratio("", "Щи"), 0);
        assert_eq!(partial_ratio("щи", ""), 0);
    }

    #[test]
    fn test_search_ranks_best_first() {
        let results = search("щи", ["Борщ", "Щи", "Каша"], DEFAULT_THRESHOLD);
        assert_eq!(results.first().copied(), Some("Щи"));
        assert!(!results.contains(&"Каша"));
    }

    #[test]
    fn test_search_miss_returns_empty() {
        let results = search("zzz", ["Борщ", "Щи", "Каша"], DEFAULT_THRESHOLD);
        assert!(results.is_empty());
    }

    #[test]
    fn test_search_ties_keep_first_appearance() {
        let results = search("щи", ["Щи зелёные", "Щи суточные"], DEFAULT_THRESHOLD);
        assert_eq!(results, vec!["Щи зелёные", "Щи суточные"]);
    }
}
