// matcher/search.rs

use serde::Serialize;
use log::{debug, warn};

use crate::config::subsystems::MatcherConfig;
use crate::parser::{NameLanguage, TextParser};
use crate::storage::ReferenceStore;
use crate::types::Record;
use super::fuzzy;

/// One live search hit: the reference record, its score and the query that
/// produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub record: Record,
    pub score: f64,
    pub query: String,
}

/// Interactive top-N search over the reference store. Safe to share across
/// threads; every call works on the store's current snapshot.
pub struct LiveSearch<'a> {
    store: &'a ReferenceStore,
    cutoff: f64,
}

impl<'a> LiveSearch<'a> {
    pub fn new(store: &'a ReferenceStore, config: &MatcherConfig) -> Self {
        Self { store, cutoff: config.live_cutoff }
    }

    /// Best `limit` records for `query`, highest score first. Store failures
    /// are logged and give no results.
    pub fn search(&self, query: &str, limit: usize) -> Vec<MatchResult> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        let reference = match self.store.load() {
            Ok(reference) => reference,
            Err(e) => {
                warn!("Live search unavailable: {}", e);
                return Vec::new();
            }
        };

        let normalized = self.store.parser().normalize(query);
        let language = NameLanguage::detect(&normalized);
        let hits = fuzzy::top_n(&normalized, reference.keys(language), limit, self.cutoff);
        debug!("Live search '{}' ({:?}): {} hits", normalized, language, hits.len());

        hits.into_iter()
            .filter_map(|(id, score)| {
                reference.record(id).map(|record| MatchResult {
                    record: record.clone(),
                    score,
                    query: query.to_string(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use serde_json::json;
    use crate::parser::DrugNameParser;
    use crate::reader::json::records_from_document;
    use crate::types::field_text;

    fn store() -> ReferenceStore {
        let records = records_from_document(json!([
            {"name_en": "Panadol Extra", "name_ar": "بنادول اكسترا", "price_retail": 25},
            {"name_en": "Panadol Cold & Flu", "name_ar": "بنادول كولد"},
            {"name_en": "Aspirin", "name_ar": "أسبرين"}
        ]))
        .unwrap();
        ReferenceStore::from_records(records, DrugNameParser::new())
    }

    #[test]
    fn blank_query_returns_nothing() {
        let store = store();
        let search = LiveSearch::new(&store, &MatcherConfig::default());
        assert!(search.search("", 10).is_empty());
        assert!(search.search("   ", 10).is_empty());
    }

    #[test]
    fn results_are_sorted_and_limited() {
        let store = store();
        let search = LiveSearch::new(&store, &MatcherConfig::default());
        let results = search.search("Panadol 500mg", 10);
        assert_eq!(results.len(), 2);
        assert_eq!(field_text(&results[0].record, "name_en"), "Panadol Extra");
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(results[0].query, "Panadol 500mg");
        assert_eq!(search.search("panadol", 1).len(), 1);
    }

    #[test]
    fn query_script_picks_the_name_index() {
        // The Arabic word sits in the English name of the first record only
        let records = records_from_document(json!([
            {"name_en": "بروفين Brufen", "name_ar": ""},
            {"name_en": "Other", "name_ar": "بروفين"}
        ]))
        .unwrap();
        let store = ReferenceStore::from_records(records, DrugNameParser::new());
        let search = LiveSearch::new(&store, &MatcherConfig::default());

        let arabic = search.search("بروفين", 5);
        assert_eq!(arabic.len(), 1);
        assert_eq!(field_text(&arabic[0].record, "name_en"), "Other");
        assert_eq!(arabic[0].score, 100.0);

        let english = search.search("brufen", 5);
        assert_eq!(english.len(), 1);
        assert_eq!(field_text(&english[0].record, "name_en"), "بروفين Brufen");
    }

    #[test]
    fn store_errors_are_swallowed() {
        let store = ReferenceStore::new("no/such/druglist.json", DrugNameParser::new());
        let search = LiveSearch::new(&store, &MatcherConfig::default());
        assert!(search.search("panadol", 10).is_empty());
    }

    #[test]
    fn concurrent_searches_agree() {
        let store = Arc::new(store());
        let expected = LiveSearch::new(&store, &MatcherConfig::default()).search("panadol", 10);
        assert!(!expected.is_empty());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    let search = LiveSearch::new(&store, &MatcherConfig::default());
                    (0..20).map(|_| search.search("panadol", 10)).collect::<Vec<_>>()
                })
            })
            .collect();
        for handle in handles {
            for results in handle.join().unwrap() {
                assert_eq!(results, expected);
            }
        }
    }
}
