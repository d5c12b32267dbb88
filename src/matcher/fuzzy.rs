// matcher/fuzzy.rs
//
// Best and top-N selection of candidate keys by token-set similarity.

use super::similarity::token_set_ratio;

/// The highest scoring candidate at or above `cutoff`. Ties keep the first
/// candidate. An empty query never matches.
pub fn best<S: AsRef<str>>(query: &str, candidates: &[S], cutoff: f64) -> Option<(usize, f64)> {
    if query.trim().is_empty() {
        return None;
    }
    let mut best: Option<(usize, f64)> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        let score = token_set_ratio(query, candidate.as_ref());
        if score < cutoff {
            continue;
        }
        match best {
            Some((_, top)) if score <= top => {},
            _ => best = Some((index, score)),
        }
    }
    best
}

/// Up to `limit` candidates at or above `cutoff`, best first. Equal scores
/// stay in candidate order.
pub fn top_n<S: AsRef<str>>(query: &str, candidates: &[S], limit: usize, cutoff: f64) -> Vec<(usize, f64)> {
    if limit == 0 || query.trim().is_empty() {
        return Vec::new();
    }
    let mut hits: Vec<(usize, f64)> = candidates
        .iter()
        .enumerate()
        .map(|(index, candidate)| (index, token_set_ratio(query, candidate.as_ref())))
        .filter(|&(_, score)| score >= cutoff)
        .collect();
    // sort_by is stable
    hits.sort_by(|a, b| b.1.total_cmp(&a.1));
    hits.truncate(limit);
    hits
}
