//! Outcome consolidation and ordering
//!
//! Merges outcomes that are identical in every exported field except
//! count (summing counts), orders the final result set so problems
//! surface first, and assigns stable output row numbers.

use crate::models::{ConversionOutcome, ConversionSummary};
use std::collections::HashMap;

/// Result consolidator
#[derive(Debug, Clone, Default)]
pub struct ResultConsolidator;

impl ResultConsolidator {
    pub fn new() -> Self {
        Self
    }

    /// Merge, order, and number the outcomes
    pub fn consolidate(&self, outcomes: Vec<ConversionOutcome>) -> Vec<ConversionOutcome> {
        let merged = self.merge_duplicates(outcomes);
        self.order_and_number(merged)
    }

    /// Merge outcomes whose exported fields (except count) are identical
    ///
    /// Failures are never merged with successes: the consolidation key is
    /// scoped by success so a failed row stays visible even when a clean
    /// twin exists.
    fn merge_duplicates(&self, outcomes: Vec<ConversionOutcome>) -> Vec<ConversionOutcome> {
        let mut merged: Vec<ConversionOutcome> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for outcome in outcomes {
            let key = format!(
                "{}\u{1f}{}",
                outcome.success,
                outcome.export.consolidation_key()
            );

            match index.get(&key) {
                Some(&i) => {
                    let existing = &mut merged[i];
                    existing.export.count += outcome.export.count;
                    // The merged row keeps the lower of the two tiers and
                    // every distinct warning
                    existing.confidence = existing.confidence.min(outcome.confidence);
                    for warning in outcome.warnings {
                        if !existing.warnings.contains(&warning) {
                            existing.warnings.push(warning);
                        }
                    }
                    tracing::trace!(key = %key, "Consolidated duplicate outcome");
                }
                None => {
                    index.insert(key, merged.len());
                    merged.push(outcome);
                }
            }
        }

        merged
    }

    /// Failures first, then successes with warnings, then clean successes;
    /// alphabetical by resolved name within each tier
    fn order_and_number(&self, mut outcomes: Vec<ConversionOutcome>) -> Vec<ConversionOutcome> {
        outcomes.sort_by(|a, b| {
            a.priority()
                .cmp(&b.priority())
                .then_with(|| a.sort_name().to_lowercase().cmp(&b.sort_name().to_lowercase()))
        });

        for (i, outcome) in outcomes.iter_mut().enumerate() {
            outcome.output_row = i + 1;
        }

        outcomes
    }

    /// Aggregate counts for reporting
    pub fn summarize(&self, outcomes: &[ConversionOutcome]) -> ConversionSummary {
        ConversionSummary::from_outcomes(outcomes)
    }
}
