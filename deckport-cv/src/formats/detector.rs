//! Dialect detection
//!
//! Scores every registered dialect against the input header row and picks
//! a winner only under a double condition: an absolute score floor AND a
//! minimum lead over the runner-up. The floor rejects weak matches; the
//! margin rejects ties between structurally similar dialects.

use super::{DialectDefinition, FormatRegistry};

/// Bonus per strong-indicator header present
const STRONG_BONUS: f32 = 0.3;
/// Bonus per exact case-sensitive header match
const EXACT_BONUS: f32 = 0.02;
/// Bonus when a high-value identity column is present
const IDENTITY_BONUS: f32 = 0.1;
/// Penalty per unmatched input header beyond the tolerance
const EXTRA_PENALTY: f32 = 0.02;
/// Unmatched input headers tolerated before the penalty kicks in
const EXTRA_TOLERANCE: usize = 5;

/// Result of dialect detection
#[derive(Debug, Clone)]
pub enum DetectionOutcome {
    /// A single dialect cleared both the floor and the margin
    Detected {
        /// Winning dialect id
        dialect_id: String,
        /// Winner's score clamped to 1.0
        confidence: f32,
        /// Winner's raw score
        score: f32,
        /// Best losing dialect, for diagnostics
        runner_up: Option<(String, f32)>,
    },
    /// No dialect was a confident match
    NoMatch {
        /// Best candidate that failed the floor/margin rule
        best: Option<(String, f32)>,
    },
}

/// Scoring-based dialect classifier
#[derive(Debug, Clone)]
pub struct FormatDetector {
    /// Minimum score to accept a winner
    floor: f32,
    /// Required lead over the runner-up
    margin: f32,
}

impl FormatDetector {
    pub fn new(floor: f32, margin: f32) -> Self {
        Self { floor, margin }
    }

    /// Score one dialect against the header row
    ///
    /// base = fraction of expected columns present (case-insensitive),
    /// plus strong-indicator, exact-case, and identity-column bonuses,
    /// minus a penalty for unmatched extra headers beyond the tolerance.
    pub fn score(&self, dialect: &DialectDefinition, headers: &[String]) -> f32 {
        let expected: Vec<&str> = dialect.expected_headers().collect();
        if expected.is_empty() {
            return 0.0;
        }

        let matches_ci = |header: &str| headers.iter().any(|h| h.eq_ignore_ascii_case(header));
        let matches_exact = |header: &str| headers.iter().any(|h| h == header);

        let present = expected.iter().filter(|h| matches_ci(h)).count();
        let base = present as f32 / expected.len() as f32;

        let strong = dialect
            .strong_indicators
            .iter()
            .filter(|h| matches_ci(h))
            .count() as f32
            * STRONG_BONUS;

        let exact = expected.iter().filter(|h| matches_exact(h)).count() as f32 * EXACT_BONUS;

        let identity = match (
            dialect.header_for(super::Field::ScryfallId),
            dialect.header_for(super::Field::MultiverseId),
        ) {
            (Some(h), _) if matches_ci(h) => IDENTITY_BONUS,
            (_, Some(h)) if matches_ci(h) => IDENTITY_BONUS,
            _ => 0.0,
        };

        let unmatched = headers
            .iter()
            .filter(|h| !expected.iter().any(|e| e.eq_ignore_ascii_case(h)))
            .count();
        let penalty = unmatched.saturating_sub(EXTRA_TOLERANCE) as f32 * EXTRA_PENALTY;

        base + strong + exact + identity - penalty
    }

    /// Score every detectable dialect and select a winner under the
    /// floor + margin rule
    pub fn detect(&self, registry: &FormatRegistry, headers: &[String]) -> DetectionOutcome {
        let mut scored: Vec<(String, f32)> = registry
            .detectable()
            .map(|d| (d.id.to_string(), self.score(d, headers)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let Some((best_id, best_score)) = scored.first().cloned() else {
            return DetectionOutcome::NoMatch { best: None };
        };
        let runner_up = scored.get(1).cloned();

        tracing::debug!(
            best = %best_id,
            score = best_score,
            runner_up = ?runner_up,
            "Dialect scoring complete"
        );

        if best_score < self.floor {
            tracing::info!(best = %best_id, score = best_score, "No dialect cleared the score floor");
            return DetectionOutcome::NoMatch {
                best: Some((best_id, best_score)),
            };
        }

        if let Some((_, second_score)) = &runner_up {
            if best_score - second_score < self.margin {
                tracing::info!(
                    best = %best_id,
                    score = best_score,
                    second = second_score,
                    "Dialect scores too close to call"
                );
                return DetectionOutcome::NoMatch {
                    best: Some((best_id, best_score)),
                };
            }
        }

        tracing::info!(dialect = %best_id, score = best_score, "Detected export dialect");

        DetectionOutcome::Detected {
            dialect_id: best_id,
            confidence: best_score.min(1.0),
            score: best_score,
            runner_up,
        }
    }
}
