//! Output serialization
//!
//! Deliberately thin: the pipeline has already ordered and numbered the
//! outcomes; this just lays them out as destination CSV rows.

use crate::models::ConversionOutcome;

const HEADERS: [&str; 11] = [
    "Count",
    "Name",
    "Edition",
    "Collector Number",
    "Condition",
    "Language",
    "Foil",
    "Purchase Price",
    "Tags",
    "Scryfall ID",
    "Status",
];

/// Render the final outcome list as CSV text
pub fn render_csv(outcomes: &[ConversionOutcome]) -> String {
    let mut writer = csv::Writer::from_writer(Vec::new());

    // Writing to an in-memory Vec cannot fail
    let _ = writer.write_record(HEADERS);
    for outcome in outcomes {
        let status = match (&outcome.error, outcome.warnings.is_empty()) {
            (Some(error), _) => format!("failed: {}", error),
            (None, false) => format!("warning: {}", outcome.warnings.join("; ")),
            (None, true) => "ok".to_string(),
        };
        let export = &outcome.export;
        let _ = writer.write_record([
            export.count.to_string().as_str(),
            &export.name,
            &export.set_code,
            &export.collector_number,
            &export.condition,
            &export.language,
            &export.finish,
            &export.purchase_price,
            &export.tags,
            &export.scryfall_id,
            &status,
        ]);
    }

    let bytes = writer.into_inner().unwrap_or_default();
    String::from_utf8(bytes).unwrap_or_default()
}
