//! Initial confidence assignment
//!
//! Deterministic table from the identifiers a record actually carries (and
//! whether set resolution had to correct anything) to its starting
//! confidence tier. The assigned tier is a ceiling: every later stage may
//! only lower it.

use crate::models::{Confidence, ParsedRecord};

/// Confidence assigner
#[derive(Debug, Clone, Default)]
pub struct ConfidenceAssigner;

impl ConfidenceAssigner {
    pub fn new() -> Self {
        Self
    }

    /// Assign the initial tier for a record that has been through set
    /// resolution
    pub fn assign(&self, record: &mut ParsedRecord) {
        let tier = self.tier_for(record);
        record.confidence = tier;

        if tier == Confidence::Low && !record.has_usable_identifier() {
            record.warn("No usable identifier; lookup will fail for this row");
        }

        tracing::trace!(
            row = record.source_row,
            tier = record.confidence.as_str(),
            "Assigned initial confidence"
        );
    }

    fn tier_for(&self, record: &ParsedRecord) -> Confidence {
        if record.scryfall_id.is_some() {
            return Confidence::VeryHigh;
        }
        if record.multiverse_id.is_some() {
            return Confidence::High;
        }

        let has_set = !record.set_code.is_empty();
        let has_collector = !record.collector_number.is_empty();

        if has_set && has_collector {
            // Fuzzy-corrected set codes cost one tier
            return if record.set_corrected {
                Confidence::Medium
            } else {
                Confidence::High
            };
        }

        if !record.name.is_empty() && has_set {
            return Confidence::Medium;
        }

        // Name + collector number without a set: the collector-number
        // search may still promote this to set+id, so its ceiling is
        // Medium; a failed search drops it to Low
        if !record.name.is_empty() && has_collector {
            return Confidence::Medium;
        }

        Confidence::Low
    }
}
