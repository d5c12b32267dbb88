use std::fs;
use std::path::Path;
use serde_json::{json, Value};

use dawaa::{
    DawaaConfig, DrugNameParser, LiveSearch, MatchRequest, MatchingPipeline, NoopObserver,
    OutputFormat, ReadOptions, ReferenceStore, TabularReader,
};

const DATABASE: &str = r#"{
  "version": 3,
  "data": [
    {"name_en": "Panadol Extra 500mg Tablets", "name_ar": "بنادول اكسترا", "price_retail": 25.5, "barcode_primary": "6221000001"},
    {"name_en": "Brufen 400mg", "name_ar": "بروفين", "price_retail": 18, "barcode_primary": "6221000002"},
    {"name_en": "Augmentin 1g", "name_ar": "أوجمنتين", "price_retail": 90}
  ]
}"#;

fn write_database(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("druglist.json");
    fs::write(&path, DATABASE).unwrap();
    path
}

#[test]
fn csv_orders_to_json_output() {
    let dir = tempfile::tempdir().unwrap();
    let store = ReferenceStore::new(write_database(dir.path()), DrugNameParser::new());

    let input = dir.path().join("orders.csv");
    fs::write(&input, "Code;Item;Qty\n1;panadol extra;10\n2;بروفين 400;5\n3;;1\n").unwrap();

    let config = DawaaConfig::default();
    let mut request = MatchRequest::new(&input, "Item");
    request.keep_input_fields = vec!["Code".into(), "Qty".into()];
    request.keep_reference_fields = vec!["price_retail".into(), "barcode_primary".into()];

    let pipeline = MatchingPipeline::new(&store, TabularReader::new(config.reader.clone()), config.matcher.clone());
    let outcome = pipeline.run(&request, &NoopObserver).unwrap();

    let name = outcome.output_path.file_name().unwrap().to_str().unwrap().to_string();
    assert!(name.starts_with("matched_output_") && name.ends_with(".json"), "{}", name);

    let written: Value = serde_json::from_str(&fs::read_to_string(&outcome.output_path).unwrap()).unwrap();
    let rows = written.as_array().unwrap();
    assert_eq!(rows.len(), 3);

    assert_eq!(rows[0]["Code"], json!("1"));
    assert_eq!(rows[0]["match_found"], json!("Panadol Extra 500mg Tablets"));
    assert_eq!(rows[0]["price_retail"], json!(25.5));

    assert_eq!(rows[1]["match_found"], json!("بروفين"));
    assert_eq!(rows[1]["barcode_primary"], json!("6221000002"));

    assert_eq!(rows[2]["search_query"], json!(""));
    assert_eq!(rows[2]["match_found"], json!("Empty Query"));
    assert_eq!(rows[2]["match_score"], json!(0));
    assert_eq!(rows[2]["price_retail"], Value::Null);

    let keys: Vec<&String> = rows[0].as_object().unwrap().keys().collect();
    assert_eq!(
        keys,
        vec!["Code", "Qty", "search_query", "match_found", "match_score", "price_retail", "barcode_primary"]
    );

    // The written file reads back as the returned table
    let back = TabularReader::default().read(&outcome.output_path, None, &ReadOptions::default()).unwrap();
    assert_eq!(back, outcome.table);
}

#[test]
fn xlsx_output_next_to_input() {
    let dir = tempfile::tempdir().unwrap();
    let store = ReferenceStore::new(write_database(dir.path()), DrugNameParser::new());

    let input = dir.path().join("orders.json");
    fs::write(&input, r#"[{"drug": "Augmentin 1 gm"}, {"drug": "qwertyuiop"}]"#).unwrap();

    let mut request = MatchRequest::new(&input, "drug");
    request.output_format = OutputFormat::Xlsx;
    let pipeline = MatchingPipeline::new(&store, TabularReader::default(), Default::default());
    let outcome = pipeline.run(&request, &NoopObserver).unwrap();

    assert_eq!(outcome.output_path.extension().unwrap(), "xlsx");
    assert_eq!(outcome.output_path.parent(), Some(dir.path()));

    let back = TabularReader::default().read(&outcome.output_path, None, &ReadOptions::default()).unwrap();
    assert_eq!(back.columns, vec!["search_query", "match_found", "match_score"]);
    assert_eq!(back.rows[0].get("match_found"), Some(&json!("Augmentin 1g")));
    assert_eq!(back.rows[1].get("match_found"), Some(&json!("No Match Found")));
}

#[test]
fn live_search_and_batch_share_one_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = ReferenceStore::new(write_database(dir.path()), DrugNameParser::new());
    let config = DawaaConfig::default();

    let search = LiveSearch::new(&store, &config.matcher);
    let hits = search.search("بنادول", config.matcher.live_limit);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].record["name_en"], json!("Panadol Extra 500mg Tablets"));
    assert_eq!(hits[0].query, "بنادول");
    assert!(store.is_loaded());
    assert_eq!(store.len(), 3);
}
