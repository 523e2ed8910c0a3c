//! Event types and EventBus for the Deckport converter
//!
//! The converter core is driven by a thin upstream collaborator (CLI or
//! embedding application). Progress is not reported through return values
//! mid-run; the collaborator subscribes to the EventBus and renders events
//! however it likes.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Conversion pipeline phase
///
/// Phases always progress in declaration order; a conversion may terminate
/// early in any phase on a fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConvertPhase {
    /// Decoding input bytes and sniffing the delimiter
    Reading,
    /// Scoring registered dialects against the header row
    Detecting,
    /// Mapping rows into normalized card records
    Parsing,
    /// Validating and correcting set codes
    ResolvingSets,
    /// Resolving records against the external card database
    LookingUp,
    /// Merging duplicates and ordering the final result set
    Consolidating,
    /// Terminal state
    Completed,
}

impl ConvertPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConvertPhase::Reading => "READING",
            ConvertPhase::Detecting => "DETECTING",
            ConvertPhase::Parsing => "PARSING",
            ConvertPhase::ResolvingSets => "RESOLVING_SETS",
            ConvertPhase::LookingUp => "LOOKING_UP",
            ConvertPhase::Consolidating => "CONSOLIDATING",
            ConvertPhase::Completed => "COMPLETED",
        }
    }
}

/// Deckport event types
///
/// Events are broadcast via EventBus and can be serialized for transmission
/// to whatever front end is attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ConvertEvent {
    /// Conversion session started
    ConversionStarted {
        /// Session UUID
        session_id: Uuid,
        /// Detected or user-selected dialect id (None until detection runs)
        dialect: Option<String>,
        /// Number of data rows in the input
        total_rows: usize,
        /// When the session started
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Pipeline moved to a new phase
    PhaseChanged {
        /// Session UUID
        session_id: Uuid,
        /// Phase before the transition
        old_phase: ConvertPhase,
        /// Phase after the transition
        new_phase: ConvertPhase,
        /// When the transition occurred
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Progress update (0-100)
    ///
    /// Emitted at phase boundaries and after every lookup round trip.
    ConversionProgress {
        /// Session UUID
        session_id: Uuid,
        /// Overall percent complete (0-100)
        percent: u8,
        /// Records settled (resolved or failed) so far
        processed: usize,
        /// Total records in flight
        total: usize,
        /// When the update was produced
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Conversion finished (successfully or with per-record failures)
    ConversionCompleted {
        /// Session UUID
        session_id: Uuid,
        /// Final outcome counts: clean successes
        succeeded: usize,
        /// Final outcome counts: successes carrying warnings
        warned: usize,
        /// Final outcome counts: failures
        failed: usize,
        /// When the session completed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Conversion aborted before producing outcomes
    ConversionFailed {
        /// Session UUID
        session_id: Uuid,
        /// Error message
        error: String,
        /// When the session failed
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl ConvertEvent {
    /// Event name for logging and routing
    pub fn event_name(&self) -> &'static str {
        match self {
            ConvertEvent::ConversionStarted { .. } => "ConversionStarted",
            ConvertEvent::PhaseChanged { .. } => "PhaseChanged",
            ConvertEvent::ConversionProgress { .. } => "ConversionProgress",
            ConvertEvent::ConversionCompleted { .. } => "ConversionCompleted",
            ConvertEvent::ConversionFailed { .. } => "ConversionFailed",
        }
    }
}

/// Central event distribution bus
///
/// Uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block the pipeline)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ConvertEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<ConvertEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns the subscriber count, or `Err` if nobody is listening.
    /// A conversion with no attached front end is legal, so callers
    /// normally `.ok()` the result.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: ConvertEvent,
    ) -> std::result::Result<usize, broadcast::error::SendError<ConvertEvent>> {
        self.tx.send(event)
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus_delivery() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        let session_id = Uuid::new_v4();
        bus.emit(ConvertEvent::ConversionStarted {
            session_id,
            dialect: Some("moxfield".to_string()),
            total_rows: 42,
            timestamp: chrono::Utc::now(),
        })
        .unwrap();

        let event = rx.recv().await.unwrap();
        match event {
            ConvertEvent::ConversionStarted {
                session_id: got,
                total_rows,
                ..
            } => {
                assert_eq!(got, session_id);
                assert_eq!(total_rows, 42);
            }
            other => panic!("Unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_emit_without_subscribers() {
        let bus = EventBus::new(16);
        let result = bus.emit(ConvertEvent::ConversionFailed {
            session_id: Uuid::new_v4(),
            error: "boom".to_string(),
            timestamp: chrono::Utc::now(),
        });
        assert!(result.is_err(), "No subscribers should yield SendError");
    }

    #[test]
    fn test_event_serialization_tag() {
        let event = ConvertEvent::ConversionProgress {
            session_id: Uuid::new_v4(),
            percent: 50,
            processed: 12,
            total: 24,
            timestamp: chrono::Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "ConversionProgress");
        assert_eq!(json["percent"], 50);
    }

    #[test]
    fn test_phase_names() {
        assert_eq!(ConvertPhase::Detecting.as_str(), "DETECTING");
        assert_eq!(ConvertPhase::LookingUp.as_str(), "LOOKING_UP");
    }
}
