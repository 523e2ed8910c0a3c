//! Conversion outcomes
//!
//! One `ConversionOutcome` per resolved (or failed) record. The
//! consolidator may merge several outcomes into one before the pipeline
//! terminates.

use super::{Confidence, IdMethod, ParsedRecord, ScryfallCard};
use serde::Serialize;

/// The exported row fields
///
/// Two outcomes are identical for consolidation purposes only if every
/// field here except `count` matches exactly.
#[derive(Debug, Clone, Serialize)]
pub struct ExportRow {
    pub count: u32,
    pub name: String,
    pub set_code: String,
    pub collector_number: String,
    pub condition: String,
    pub language: String,
    pub finish: String,
    pub purchase_price: String,
    pub tags: String,
    pub scryfall_id: String,
}

impl ExportRow {
    /// Consolidation identity: every exported field except count
    pub fn consolidation_key(&self) -> String {
        format!(
            "{}\u{1f}{}\u{1f}{}\u{1f}{}\u{1f}{}\u{1f}{}\u{1f}{}\u{1f}{}\u{1f}{}",
            self.name.to_lowercase(),
            self.set_code.to_lowercase(),
            self.collector_number.to_lowercase(),
            self.condition,
            self.language,
            self.finish,
            self.purchase_price,
            self.tags,
            self.scryfall_id,
        )
    }
}

/// Final result for one record
#[derive(Debug, Clone)]
pub struct ConversionOutcome {
    /// The record this outcome resolves
    pub record: ParsedRecord,
    /// Matched printing, when resolution succeeded
    pub card: Option<ScryfallCard>,
    /// Exported row fields
    pub export: ExportRow,
    /// Whether resolution succeeded
    pub success: bool,
    /// Error message for failures
    pub error: Option<String>,
    /// Final confidence tier
    pub confidence: Confidence,
    /// Strategy that actually produced the match
    pub method: IdMethod,
    /// All warnings accumulated for this record
    pub warnings: Vec<String>,
    /// Stable output position, assigned by the consolidator
    pub output_row: usize,
}

impl ConversionOutcome {
    /// Build a successful outcome from a record and its matched card
    pub fn matched(
        record: ParsedRecord,
        card: ScryfallCard,
        method: IdMethod,
        extra_warnings: Vec<String>,
    ) -> Self {
        let mut warnings = record.warnings.clone();
        warnings.extend(extra_warnings);

        let export = ExportRow {
            count: record.count,
            name: card.name.clone(),
            set_code: card.set.clone(),
            collector_number: card.collector_number.clone(),
            condition: record.condition.clone(),
            language: record.language.clone(),
            finish: record.finish.as_str().to_string(),
            purchase_price: record.purchase_price.clone(),
            tags: record.tags.clone(),
            scryfall_id: card.id.clone(),
        };

        Self {
            confidence: record.confidence,
            record,
            card: Some(card),
            export,
            success: true,
            error: None,
            method,
            warnings,
            output_row: 0,
        }
    }

    /// Build a terminal failure outcome
    ///
    /// The exported row echoes the source data so failures remain visible
    /// in the output alongside successes.
    pub fn failed(record: ParsedRecord, error: impl Into<String>) -> Self {
        let export = ExportRow {
            count: record.count,
            name: record.name.clone(),
            set_code: record.set_code.clone(),
            collector_number: record.collector_number.clone(),
            condition: record.condition.clone(),
            language: record.language.clone(),
            finish: record.finish.as_str().to_string(),
            purchase_price: record.purchase_price.clone(),
            tags: record.tags.clone(),
            scryfall_id: record.scryfall_id.clone().unwrap_or_default(),
        };

        Self {
            warnings: record.warnings.clone(),
            confidence: Confidence::Low,
            record,
            card: None,
            export,
            success: false,
            error: Some(error.into()),
            method: IdMethod::Failed,
            output_row: 0,
        }
    }

    /// Sort priority: failures first, then warned successes, then clean
    pub fn priority(&self) -> u8 {
        if !self.success {
            0
        } else if !self.warnings.is_empty() {
            1
        } else {
            2
        }
    }

    /// Resolved name for ordering (source name for failures)
    pub fn sort_name(&self) -> &str {
        &self.export.name
    }
}

/// Aggregate counts for reporting
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversionSummary {
    pub total: usize,
    pub succeeded: usize,
    pub warned: usize,
    pub failed: usize,
}

impl ConversionSummary {
    pub fn from_outcomes(outcomes: &[ConversionOutcome]) -> Self {
        let mut summary = Self {
            total: outcomes.len(),
            ..Self::default()
        };
        for outcome in outcomes {
            match outcome.priority() {
                0 => summary.failed += 1,
                1 => summary.warned += 1,
                _ => summary.succeeded += 1,
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Finish;

    fn sample_record() -> ParsedRecord {
        let mut record = ParsedRecord::new(1);
        record.name = "Lightning Bolt".to_string();
        record.set_code = "lea".to_string();
        record.condition = "Near Mint".to_string();
        record
    }

    fn sample_card() -> ScryfallCard {
        serde_json::from_str(
            r#"{
                "id": "abc",
                "name": "Lightning Bolt",
                "set": "lea",
                "set_name": "Limited Edition Alpha",
                "collector_number": "161",
                "lang": "en",
                "finishes": ["nonfoil"]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_consolidation_key_ignores_count() {
        let a = ConversionOutcome::matched(sample_record(), sample_card(), IdMethod::NameSet, vec![]);
        let mut record_b = sample_record();
        record_b.count = 3;
        let b = ConversionOutcome::matched(record_b, sample_card(), IdMethod::NameSet, vec![]);

        assert_eq!(
            a.export.consolidation_key(),
            b.export.consolidation_key(),
            "Count must not participate in consolidation identity"
        );
    }

    #[test]
    fn test_consolidation_key_sensitive_to_condition() {
        let a = ConversionOutcome::matched(sample_record(), sample_card(), IdMethod::NameSet, vec![]);
        let mut record_b = sample_record();
        record_b.condition = "Played".to_string();
        let b = ConversionOutcome::matched(record_b, sample_card(), IdMethod::NameSet, vec![]);

        assert_ne!(a.export.consolidation_key(), b.export.consolidation_key());
    }

    #[test]
    fn test_priority_ordering() {
        let clean = ConversionOutcome::matched(sample_record(), sample_card(), IdMethod::NameSet, vec![]);
        assert_eq!(clean.priority(), 2);

        let warned = ConversionOutcome::matched(
            sample_record(),
            sample_card(),
            IdMethod::NameSet,
            vec!["set corrected".to_string()],
        );
        assert_eq!(warned.priority(), 1);

        let failed = ConversionOutcome::failed(sample_record(), "not found");
        assert_eq!(failed.priority(), 0);
    }

    #[test]
    fn test_failed_outcome_echoes_source_fields() {
        let mut record = sample_record();
        record.finish = Finish::Foil;
        let outcome = ConversionOutcome::failed(record, "not found by name alone");

        assert!(!outcome.success);
        assert_eq!(outcome.method, IdMethod::Failed);
        assert_eq!(outcome.export.name, "Lightning Bolt");
        assert_eq!(outcome.export.finish, "foil");
        assert_eq!(outcome.error.as_deref(), Some("not found by name alone"));
    }

    #[test]
    fn test_summary_counts() {
        let outcomes = vec![
            ConversionOutcome::matched(sample_record(), sample_card(), IdMethod::NameSet, vec![]),
            ConversionOutcome::matched(
                sample_record(),
                sample_card(),
                IdMethod::NameSet,
                vec!["warning".to_string()],
            ),
            ConversionOutcome::failed(sample_record(), "not found"),
        ];
        let summary = ConversionSummary::from_outcomes(&outcomes);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.warned, 1);
        assert_eq!(summary.failed, 1);
    }
}
