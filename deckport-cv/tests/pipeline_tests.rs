//! Lookup pipeline integration tests
//!
//! Exercise the full strategy chain against an in-process card database
//! stub, so every network behavior (batching, fan-out, failures, language
//! refetch) is deterministic.

mod stub;

use deckport_cv::models::{Confidence, IdMethod, ParsedRecord};
use deckport_cv::services::{ConfidenceAssigner, LookupPipeline, ResultConsolidator};
use std::sync::Arc;
use stub::{card, StubDb};
use tokio_util::sync::CancellationToken;

fn record(name: &str, set: &str, cn: &str) -> ParsedRecord {
    let mut r = ParsedRecord::new(1);
    r.name = name.to_string();
    r.set_code = set.to_string();
    r.collector_number = cn.to_string();
    ConfidenceAssigner::new().assign(&mut r);
    r
}

#[tokio::test]
async fn test_batches_never_exceed_cap() {
    let cards: Vec<_> = (1..=160)
        .map(|i| card(&format!("Card {}", i), "blk", &i.to_string(), "en", &["nonfoil"]))
        .collect();
    let db = Arc::new(StubDb::new(cards));

    let records: Vec<_> = (1..=160)
        .map(|i| record(&format!("Card {}", i), "blk", &i.to_string()))
        .collect();

    let pipeline = LookupPipeline::new(db.clone(), 75);
    let outcomes = pipeline
        .run(records, &CancellationToken::new(), |_, _| {})
        .await
        .unwrap();

    let sizes = db.collection_sizes();
    assert_eq!(sizes, vec![75, 75, 10], "160 identifiers split at the cap");
    assert!(outcomes.iter().all(|o| o.success));
}

#[tokio::test]
async fn test_identical_identifiers_deduplicate_within_batch() {
    let db = Arc::new(StubDb::new(vec![card("Opt", "dom", "60", "en", &["nonfoil"])]));

    let records = vec![
        record("Opt", "dom", "60"),
        record("Opt", "dom", "60"),
        record("Opt", "dom", "60"),
    ];

    let pipeline = LookupPipeline::new(db.clone(), 75);
    let outcomes = pipeline
        .run(records, &CancellationToken::new(), |_, _| {})
        .await
        .unwrap();

    assert_eq!(db.collection_sizes(), vec![1], "One deduplicated identifier");
    assert_eq!(outcomes.len(), 3, "Results fan back out to every record");
    assert!(outcomes.iter().all(|o| o.success));
}

#[tokio::test]
async fn test_collector_number_search_promotes_unique_hit() {
    let db = Arc::new(StubDb::new(vec![card("Opt", "dom", "60", "en", &["nonfoil"])]));

    let mut r = ParsedRecord::new(1);
    r.name = "Opt".to_string();
    r.collector_number = "60".to_string();
    ConfidenceAssigner::new().assign(&mut r);

    let pipeline = LookupPipeline::new(db.clone(), 75);
    let outcomes = pipeline
        .run(vec![r], &CancellationToken::new(), |_, _| {})
        .await
        .unwrap();

    let outcome = &outcomes[0];
    assert!(outcome.success);
    assert_eq!(outcome.method, IdMethod::CollectorSearch);
    assert_eq!(outcome.confidence, Confidence::Medium);
    assert_eq!(outcome.export.set_code, "dom");
    assert!(outcome
        .warnings
        .iter()
        .any(|w| w.contains("found via collector-number search")));
}

#[tokio::test]
async fn test_collector_number_search_demotes_on_multiple_hits() {
    // "Opt" printed at cn 60 in two sets
    let db = Arc::new(StubDb::new(vec![
        card("Opt", "dom", "60", "en", &["nonfoil"]),
        card("Opt", "xln", "60", "en", &["nonfoil"]),
    ]));

    let mut r = ParsedRecord::new(1);
    r.name = "Opt".to_string();
    r.collector_number = "60".to_string();
    ConfidenceAssigner::new().assign(&mut r);

    let pipeline = LookupPipeline::new(db.clone(), 75);
    let outcomes = pipeline
        .run(vec![r], &CancellationToken::new(), |_, _| {})
        .await
        .unwrap();

    let outcome = &outcomes[0];
    assert!(outcome.success, "Name-only fallback should still match");
    assert_eq!(outcome.method, IdMethod::NameOnly);
    assert_eq!(outcome.confidence, Confidence::Low);
}

#[tokio::test]
async fn test_language_mismatch_downgrades_and_keeps_printing() {
    let db = Arc::new(StubDb::new(vec![card("Opt", "dom", "60", "en", &["nonfoil"])]));

    let mut r = record("Opt", "dom", "60");
    r.language = "ja".to_string();
    assert_eq!(r.confidence, Confidence::High);

    let pipeline = LookupPipeline::new(db.clone(), 75);
    let outcomes = pipeline
        .run(vec![r], &CancellationToken::new(), |_, _| {})
        .await
        .unwrap();

    let outcome = &outcomes[0];
    assert!(outcome.success);
    assert_eq!(
        outcome.confidence,
        Confidence::Medium,
        "One-tier downgrade on language fallback"
    );
    assert!(outcome.warnings.iter().any(|w| w.contains("not available")));
    assert_eq!(outcome.card.as_ref().unwrap().lang, "en", "Original printing kept");
}

#[tokio::test]
async fn test_language_refetch_finds_translation() {
    let db = Arc::new(StubDb::new(vec![
        card("Opt", "dom", "60", "en", &["nonfoil"]),
        card("Opt", "dom", "60", "ja", &["nonfoil"]),
    ]));

    let mut r = record("Opt", "dom", "60");
    r.language = "ja".to_string();

    let pipeline = LookupPipeline::new(db.clone(), 75);
    let outcomes = pipeline
        .run(vec![r], &CancellationToken::new(), |_, _| {})
        .await
        .unwrap();

    let outcome = &outcomes[0];
    assert!(outcome.success);
    assert_eq!(outcome.confidence, Confidence::High, "No downgrade on success");
    assert_eq!(outcome.card.as_ref().unwrap().lang, "ja");
}

#[tokio::test]
async fn test_misspelled_language_downgrades_with_warning() {
    let db = Arc::new(StubDb::new(vec![card("Opt", "dom", "60", "en", &["nonfoil"])]));

    let mut r = record("Opt", "dom", "60");
    r.language = "klingon".to_string();

    let pipeline = LookupPipeline::new(db.clone(), 75);
    let outcomes = pipeline
        .run(vec![r], &CancellationToken::new(), |_, _| {})
        .await
        .unwrap();

    let outcome = &outcomes[0];
    assert!(outcome.success, "Unrecognized language is a warning, not a failure");
    assert_eq!(outcome.confidence, Confidence::Medium);
    assert!(outcome
        .warnings
        .iter()
        .any(|w| w.contains("Unrecognized language")));
}

#[tokio::test]
async fn test_unusable_record_short_circuits_before_network() {
    let db = Arc::new(StubDb::new(vec![]));

    let r = ParsedRecord::new(1); // no fields at all
    let pipeline = LookupPipeline::new(db.clone(), 75);
    let outcomes = pipeline
        .run(vec![r], &CancellationToken::new(), |_, _| {})
        .await
        .unwrap();

    assert!(!outcomes[0].success);
    assert_eq!(outcomes[0].error.as_deref(), Some("No usable identifier"));
    assert_eq!(db.collection_sizes().len(), 0, "No network traffic at all");
    assert_eq!(db.search_queries().len(), 0);
}

#[tokio::test]
async fn test_batch_failure_is_isolated() {
    let cards: Vec<_> = (1..=80)
        .map(|i| card(&format!("Card {}", i), "blk", &i.to_string(), "en", &["nonfoil"]))
        .collect();
    let db = Arc::new(StubDb::new(cards).fail_first_collections(1));

    let records: Vec<_> = (1..=80)
        .map(|i| record(&format!("Card {}", i), "blk", &i.to_string()))
        .collect();

    let pipeline = LookupPipeline::new(db.clone(), 75);
    let outcomes = pipeline
        .run(records, &CancellationToken::new(), |_, _| {})
        .await
        .unwrap();

    let failed = outcomes.iter().filter(|o| !o.success).count();
    let succeeded = outcomes.iter().filter(|o| o.success).count();
    assert_eq!(failed, 75, "Every record in the failed batch fails");
    assert_eq!(succeeded, 5, "Later batches still run");
    assert!(outcomes
        .iter()
        .filter(|o| !o.success)
        .all(|o| o.error.as_deref().unwrap_or("").contains("failed")));
}

#[tokio::test]
async fn test_not_found_carries_strategy_aware_message() {
    let db = Arc::new(StubDb::new(vec![]));

    let by_set = record("Missing Card", "dom", "99");
    let mut by_name = ParsedRecord::new(2);
    by_name.name = "Another Missing Card".to_string();
    ConfidenceAssigner::new().assign(&mut by_name);

    let pipeline = LookupPipeline::new(db.clone(), 75);
    let outcomes = pipeline
        .run(vec![by_set, by_name], &CancellationToken::new(), |_, _| {})
        .await
        .unwrap();

    let set_error = outcomes[0].error.as_deref().unwrap();
    assert!(
        set_error.contains("set dom") && set_error.contains("99"),
        "Expected set+collector wording, got: {}",
        set_error
    );
    let name_error = outcomes[1].error.as_deref().unwrap();
    assert!(
        name_error.contains("name Another Missing Card"),
        "Expected name wording, got: {}",
        name_error
    );
}

#[tokio::test]
async fn test_finish_mismatch_is_hard_error() {
    let db = Arc::new(StubDb::new(vec![card("Opt", "dom", "60", "en", &["nonfoil"])]));

    let mut r = record("Opt", "dom", "60");
    r.finish = deckport_cv::models::Finish::Foil;

    let pipeline = LookupPipeline::new(db.clone(), 75);
    let outcomes = pipeline
        .run(vec![r], &CancellationToken::new(), |_, _| {})
        .await
        .unwrap();

    assert!(!outcomes[0].success);
    assert!(outcomes[0].error.as_deref().unwrap().contains("finish"));
}

#[tokio::test]
async fn test_etched_from_text_is_soft_warning() {
    let db = Arc::new(StubDb::new(vec![card(
        "Opt",
        "dom",
        "60",
        "en",
        &["nonfoil", "foil"],
    )]));

    let mut r = record("Opt", "dom", "60");
    r.finish = deckport_cv::models::Finish::Etched;
    r.etched_from_text = true;

    let pipeline = LookupPipeline::new(db.clone(), 75);
    let outcomes = pipeline
        .run(vec![r], &CancellationToken::new(), |_, _| {})
        .await
        .unwrap();

    let outcome = &outcomes[0];
    assert!(outcome.success);
    assert!(outcome.warnings.iter().any(|w| w.contains("Etched finish")));
    assert_eq!(outcome.export.finish, "foil", "Falls back to an available finish");
}

#[tokio::test]
async fn test_promo_rows_bypass_batching() {
    let mut promo = card("Opt", "pdom", "60s", "en", &["nonfoil", "foil"]);
    promo.promo_types = vec!["prerelease".to_string()];
    let db = Arc::new(StubDb::new(vec![promo]));

    let mut r = ParsedRecord::new(1);
    r.name = "Opt".to_string();
    r.set_code = "pdom".to_string();
    r.tags = "prerelease".to_string();
    ConfidenceAssigner::new().assign(&mut r);

    let pipeline = LookupPipeline::new(db.clone(), 75);
    let outcomes = pipeline
        .run(vec![r], &CancellationToken::new(), |_, _| {})
        .await
        .unwrap();

    assert!(outcomes[0].success);
    assert!(db
        .search_queries()
        .iter()
        .any(|q| q.contains("is:prerelease")));
    assert_eq!(db.collection_sizes().len(), 0, "No batch call for the promo row");
}

#[tokio::test]
async fn test_cancellation_aborts_cleanly() {
    let db = Arc::new(StubDb::new(vec![card("Opt", "dom", "60", "en", &["nonfoil"])]));

    let cancel = CancellationToken::new();
    cancel.cancel();

    let pipeline = LookupPipeline::new(db.clone(), 75);
    let result = pipeline
        .run(vec![record("Opt", "dom", "60")], &cancel, |_, _| {})
        .await;

    assert!(matches!(
        result,
        Err(deckport_cv::ConvertError::Cancelled)
    ));
}

#[tokio::test]
async fn test_consolidation_after_lookup() {
    let db = Arc::new(StubDb::new(vec![card(
        "Lightning Bolt",
        "lea",
        "161",
        "en",
        &["nonfoil"],
    )]));

    let mut a = record("Lightning Bolt", "lea", "161");
    a.count = 1;
    a.condition = "Near Mint".to_string();
    let mut b = record("Lightning Bolt", "lea", "161");
    b.count = 3;
    b.condition = "Near Mint".to_string();

    let pipeline = LookupPipeline::new(db.clone(), 75);
    let outcomes = pipeline
        .run(vec![a, b], &CancellationToken::new(), |_, _| {})
        .await
        .unwrap();

    let merged = ResultConsolidator::new().consolidate(outcomes);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].export.count, 4);
    assert_eq!(merged[0].output_row, 1);
}
