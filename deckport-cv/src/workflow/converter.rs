//! Conversion orchestrator
//!
//! Drives one conversion session through its phases:
//! READING → DETECTING → PARSING → RESOLVING_SETS → LOOKING_UP →
//! CONSOLIDATING → COMPLETED, emitting events at every transition and
//! after every lookup round trip. The cancellation token is honored at
//! every external request boundary.

use crate::config::Params;
use crate::error::{ConvertError, Result};
use crate::formats::{DetectionOutcome, FormatDetector, FormatRegistry};
use crate::ingest::{self, RowParser};
use crate::models::{ConversionOutcome, ConversionSummary, ParsedRecord};
use crate::services::{
    CardDatabase, ConfidenceAssigner, LookupPipeline, ResultConsolidator, SetCatalog, SetResolver,
};
use deckport_common::events::{ConvertEvent, ConvertPhase, EventBus};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Fetch the canonical set list once at startup
pub async fn load_set_catalog(client: &dyn CardDatabase) -> Result<SetCatalog> {
    let sets = client
        .sets()
        .await
        .map_err(|e| ConvertError::SetCatalog(e.to_string()))?;
    Ok(SetCatalog::new(sets))
}

/// Result of one conversion session
#[derive(Debug)]
pub struct ConversionReport {
    pub session_id: Uuid,
    /// Dialect that was used (detected or selected)
    pub dialect_id: String,
    /// Detection confidence, when detection ran
    pub detection_confidence: Option<f32>,
    /// Final ordered outcomes
    pub outcomes: Vec<ConversionOutcome>,
    pub summary: ConversionSummary,
}

/// Long-lived conversion context
///
/// Constructed once at startup (registry, set catalog, client, params) and
/// reused across sessions; nothing here mutates after construction.
pub struct Converter {
    registry: FormatRegistry,
    catalog: Arc<SetCatalog>,
    client: Arc<dyn CardDatabase>,
    params: Params,
    event_bus: EventBus,
}

impl Converter {
    pub fn new(
        catalog: Arc<SetCatalog>,
        client: Arc<dyn CardDatabase>,
        params: Params,
        event_bus: EventBus,
    ) -> Self {
        Self {
            registry: FormatRegistry::new(),
            catalog,
            client,
            params,
            event_bus,
        }
    }

    pub fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Convert one uploaded file
    ///
    /// `dialect` is a dialect id for manual selection, or `None` for
    /// auto-detection (falling back to the generic dialect when detection
    /// is not confident).
    pub async fn convert(
        &self,
        bytes: &[u8],
        dialect: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<ConversionReport> {
        let session_id = Uuid::new_v4();
        let result = self.run_session(session_id, bytes, dialect, cancel).await;

        if let Err(e) = &result {
            self.event_bus
                .emit(ConvertEvent::ConversionFailed {
                    session_id,
                    error: e.to_string(),
                    timestamp: chrono::Utc::now(),
                })
                .ok();
        }

        result
    }

    async fn run_session(
        &self,
        session_id: Uuid,
        bytes: &[u8],
        dialect: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<ConversionReport> {
        let start_time = std::time::Instant::now();
        let mut phase = ConvertPhase::Reading;

        // READING
        let content = ingest::decode_bytes(bytes);
        let delimiter = match dialect.and_then(|id| self.registry.get(id)) {
            Some(d) => d.delimiter,
            None => ingest::detect_delimiter(&content),
        };
        let table = ingest::read_table(&content, delimiter)?;

        self.event_bus
            .emit(ConvertEvent::ConversionStarted {
                session_id,
                dialect: dialect.map(|d| d.to_string()),
                total_rows: table.rows.len(),
                timestamp: chrono::Utc::now(),
            })
            .ok();

        // DETECTING
        phase = self.transition(session_id, phase, ConvertPhase::Detecting);
        let (dialect_def, detection_confidence) = match dialect {
            Some(id) => {
                let def = self
                    .registry
                    .get(id)
                    .ok_or_else(|| ConvertError::UnknownDialect(id.to_string()))?;
                (def.clone(), None)
            }
            None => {
                let detector =
                    FormatDetector::new(self.params.detection_floor, self.params.detection_margin);
                match detector.detect(&self.registry, &table.headers) {
                    DetectionOutcome::Detected {
                        dialect_id,
                        confidence,
                        ..
                    } => {
                        let def = self
                            .registry
                            .get(&dialect_id)
                            .ok_or_else(|| ConvertError::UnknownDialect(dialect_id.clone()))?;
                        (def.clone(), Some(confidence))
                    }
                    DetectionOutcome::NoMatch { best } => {
                        tracing::warn!(
                            best = ?best,
                            "No confident dialect match; using the generic fallback"
                        );
                        (self.registry.fallback().clone(), None)
                    }
                }
            }
        };
        tracing::info!(
            session = %session_id,
            dialect = dialect_def.id,
            confidence = ?detection_confidence,
            "Using dialect"
        );

        // PARSING
        phase = self.transition(session_id, phase, ConvertPhase::Parsing);
        let parser = RowParser::new(dialect_def.clone());
        let mut records: Vec<ParsedRecord> = Vec::new();
        for (i, row) in table.rows.iter().enumerate() {
            records.extend(parser.parse_row(i + 1, &table.headers, row));
        }
        tracing::info!(
            session = %session_id,
            rows = table.rows.len(),
            records = records.len(),
            "Parsed input rows"
        );

        // RESOLVING_SETS
        phase = self.transition(session_id, phase, ConvertPhase::ResolvingSets);
        let resolver = SetResolver::new(self.catalog.clone(), self.params.set_acceptance);
        let assigner = ConfidenceAssigner::new();
        for record in &mut records {
            resolver.resolve(record);
            assigner.assign(record);
        }

        // LOOKING_UP
        phase = self.transition(session_id, phase, ConvertPhase::LookingUp);
        let total = records.len();
        let pipeline = LookupPipeline::new(self.client.clone(), self.params.batch_size);
        let bus = self.event_bus.clone();
        let outcomes = pipeline
            .run(records, cancel, |settled, total_records| {
                let percent = lookup_percent(settled, total_records);
                bus.emit(ConvertEvent::ConversionProgress {
                    session_id,
                    percent,
                    processed: settled,
                    total: total_records,
                    timestamp: chrono::Utc::now(),
                })
                .ok();
            })
            .await?;

        // CONSOLIDATING
        phase = self.transition(session_id, phase, ConvertPhase::Consolidating);
        let consolidator = ResultConsolidator::new();
        let outcomes = consolidator.consolidate(outcomes);
        let summary = consolidator.summarize(&outcomes);

        self.transition(session_id, phase, ConvertPhase::Completed);
        self.event_bus
            .emit(ConvertEvent::ConversionCompleted {
                session_id,
                succeeded: summary.succeeded,
                warned: summary.warned,
                failed: summary.failed,
                timestamp: chrono::Utc::now(),
            })
            .ok();

        tracing::info!(
            session = %session_id,
            total,
            succeeded = summary.succeeded,
            warned = summary.warned,
            failed = summary.failed,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Conversion complete"
        );

        Ok(ConversionReport {
            session_id,
            dialect_id: dialect_def.id.to_string(),
            detection_confidence,
            outcomes,
            summary,
        })
    }

    fn transition(
        &self,
        session_id: Uuid,
        old_phase: ConvertPhase,
        new_phase: ConvertPhase,
    ) -> ConvertPhase {
        tracing::debug!(
            session = %session_id,
            from = old_phase.as_str(),
            to = new_phase.as_str(),
            "Phase transition"
        );
        self.event_bus
            .emit(ConvertEvent::PhaseChanged {
                session_id,
                old_phase,
                new_phase,
                timestamp: chrono::Utc::now(),
            })
            .ok();
        new_phase
    }
}

/// Lookups span 30-95% of the overall progress bar; the surrounding
/// phases are effectively instant by comparison
fn lookup_percent(settled: usize, total: usize) -> u8 {
    if total == 0 {
        return 95;
    }
    let span = 65.0 * settled as f32 / total as f32;
    (30.0 + span).round().min(95.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_percent_range() {
        assert_eq!(lookup_percent(0, 10), 30);
        assert_eq!(lookup_percent(5, 10), 63);
        assert_eq!(lookup_percent(10, 10), 95);
        assert_eq!(lookup_percent(0, 0), 95);
    }
}
