//! Converter parameter resolution
//!
//! Every tuning knob resolves ENV → TOML → compiled default. The
//! detection and fuzzy-match thresholds are empirically tuned heuristics,
//! so they are deliberately parameters rather than constants.

use deckport_common::config::TomlConfig;
use std::time::Duration;

/// Hard cap the batch endpoint imposes on identifiers per request
pub const API_BATCH_CAP: usize = 75;

/// Resolved converter parameters
#[derive(Debug, Clone)]
pub struct Params {
    /// Minimum detection score to accept a dialect
    pub detection_floor: f32,
    /// Required lead over the runner-up dialect
    pub detection_margin: f32,
    /// Minimum fuzzy score to accept a set-name correction
    pub set_acceptance: f32,
    /// Minimum delay between consecutive card-database requests
    pub rate_limit_ms: u64,
    /// Identifiers per batch request (never above `API_BATCH_CAP`)
    pub batch_size: usize,
    /// Card database base URL
    pub card_api_base: String,
    /// HTTP User-Agent header
    pub user_agent: String,
    /// HTTP request timeout
    pub request_timeout: Duration,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            detection_floor: 0.6,
            detection_margin: 0.2,
            set_acceptance: 0.7,
            rate_limit_ms: 100,
            batch_size: API_BATCH_CAP,
            card_api_base: "https://api.scryfall.com".to_string(),
            user_agent: concat!("deckport/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl Params {
    /// Resolve parameters with ENV → TOML → default priority
    pub fn resolve(toml: &TomlConfig) -> Self {
        let defaults = Self::default();

        let mut params = Self {
            detection_floor: env_f32("DECKPORT_DETECTION_FLOOR")
                .or(toml.detection_floor)
                .unwrap_or(defaults.detection_floor),
            detection_margin: env_f32("DECKPORT_DETECTION_MARGIN")
                .or(toml.detection_margin)
                .unwrap_or(defaults.detection_margin),
            set_acceptance: env_f32("DECKPORT_SET_ACCEPTANCE")
                .or(toml.set_acceptance)
                .unwrap_or(defaults.set_acceptance),
            rate_limit_ms: env_u64("DECKPORT_RATE_LIMIT_MS")
                .or(toml.rate_limit_ms)
                .unwrap_or(defaults.rate_limit_ms),
            batch_size: env_u64("DECKPORT_BATCH_SIZE")
                .map(|v| v as usize)
                .or(toml.batch_size)
                .unwrap_or(defaults.batch_size),
            card_api_base: std::env::var("DECKPORT_CARD_API_BASE")
                .ok()
                .or_else(|| toml.card_api_base.clone())
                .unwrap_or(defaults.card_api_base),
            user_agent: std::env::var("DECKPORT_USER_AGENT")
                .ok()
                .or_else(|| toml.user_agent.clone())
                .unwrap_or(defaults.user_agent),
            request_timeout: env_u64("DECKPORT_REQUEST_TIMEOUT_SECS")
                .or(toml.request_timeout_secs)
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
        };

        if params.batch_size == 0 || params.batch_size > API_BATCH_CAP {
            tracing::warn!(
                configured = params.batch_size,
                cap = API_BATCH_CAP,
                "Batch size outside the API's limits; clamping"
            );
            params.batch_size = params.batch_size.clamp(1, API_BATCH_CAP);
        }

        params
    }
}

fn env_f32(name: &str) -> Option<f32> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(var = name, value = %raw, "Ignoring unparseable environment override");
            None
        }
    }
}

fn env_u64(name: &str) -> Option<u64> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(var = name, value = %raw, "Ignoring unparseable environment override");
            None
        }
    }
}
