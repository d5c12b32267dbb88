// matcher/similarity.rs

use std::collections::BTreeSet;

/// Order-independent token similarity on a 0-100 scale.
///
/// Both strings are split on whitespace into sorted sets of unique tokens.
/// When one set is a subset of the other (and they share at least one token)
/// the score is 100. Otherwise the score is the best indel ratio among the
/// intersection extended by each difference compared with each other, and the
/// bare intersection against either extension.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let sect: Vec<&str> = tokens_a.intersection(&tokens_b).copied().collect();
    let diff_ab: Vec<&str> = tokens_a.difference(&tokens_b).copied().collect();
    let diff_ba: Vec<&str> = tokens_b.difference(&tokens_a).copied().collect();

    if !sect.is_empty() && (diff_ab.is_empty() || diff_ba.is_empty()) {
        return 100.0;
    }

    let diff_ab_joined = diff_ab.join(" ");
    let diff_ba_joined = diff_ba.join(" ");
    if sect.is_empty() {
        return ratio(&diff_ab_joined, &diff_ba_joined);
    }

    // The shared prefix adds no edits but counts towards the length
    let sect_joined = sect.join(" ");
    let sect_ab = format!("{} {}", sect_joined, diff_ab_joined);
    let sect_ba = format!("{} {}", sect_joined, diff_ba_joined);
    ratio(&sect_ab, &sect_ba)
        .max(ratio(&sect_joined, &sect_ab))
        .max(ratio(&sect_joined, &sect_ba))
}

/// Normalized indel similarity on a 0-100 scale.
pub fn ratio(a: &str, b: &str) -> f64 {
    rapidfuzz::fuzz::ratio(a.chars(), b.chars()) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_side_scores_zero() {
        assert_eq!(token_set_ratio("", "panadol"), 0.0);
        assert_eq!(token_set_ratio("panadol", "   "), 0.0);
    }

    #[test]
    fn word_order_and_duplicates_do_not_matter() {
        assert_eq!(token_set_ratio("panadol extra", "extra panadol panadol"), 100.0);
    }

    #[test]
    fn subset_scores_full() {
        assert_eq!(token_set_ratio("panadol", "panadol 500mg"), 100.0);
        assert_eq!(token_set_ratio("بنادول", "بنادول اكسترا"), 100.0);
    }

    #[test]
    fn partial_overlap_is_between_bounds() {
        let score = token_set_ratio("panadol cold", "panadol night");
        assert!(score > 50.0 && score < 100.0, "{}", score);
    }

    #[test]
    fn disjoint_tokens_fall_back_to_character_similarity() {
        let close = token_set_ratio("panadoll", "panadol");
        let far = token_set_ratio("aspirin", "panadol");
        assert!(close > 90.0, "{}", close);
        assert!(far < close);
    }

    #[test]
    fn shared_tokens_weigh_into_the_difference_score() {
        let score = token_set_ratio("abc aaaaabbbbb", "abc aaaaaccccc");
        assert!((score - 64.2857).abs() < 0.01, "{}", score);

        let score = token_set_ratio("panadol cold flu", "panadol cold flue");
        assert!((score - 96.9697).abs() < 0.01, "{}", score);
    }

    #[test]
    fn symmetric() {
        let a = "augmentin 1g duo";
        let b = "augmentin duo forte";
        assert!((token_set_ratio(a, b) - token_set_ratio(b, a)).abs() < 1e-9);
    }
}
