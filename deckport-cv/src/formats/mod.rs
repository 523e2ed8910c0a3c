//! Export-dialect catalog
//!
//! Every supported inventory tool gets one immutable `DialectDefinition`:
//! the header set it emits, the mapping from logical fields to its header
//! names, the headers that are empirically unique to it, and the quirks the
//! row parser must apply. The registry is built once at startup.

mod detector;
mod dialects;

pub use detector::{DetectionOutcome, FormatDetector};
pub use dialects::all_dialects;

/// Logical record field a dialect column can map to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Count,
    Name,
    /// Set code
    Set,
    /// Set display name (fuzzy fallback)
    SetName,
    Condition,
    Language,
    Finish,
    CollectorNumber,
    Price,
    Tags,
    /// Direct card-database UUID
    ScryfallId,
    /// Numeric multiverse id
    MultiverseId,
    /// Composite status column (finish/signed/altered/proxy in one string)
    Extras,
}

/// Parser quirks a dialect opts into
#[derive(Debug, Clone, Copy, Default)]
pub struct Quirks {
    /// Composite delimited extras column carries finish/alteration/signed
    /// status
    pub composite_extras: bool,
    /// Card-database ids occasionally carry one spurious trailing
    /// character; trim to the fixed 36-char UUID length
    pub trim_long_ids: bool,
    /// "A // B Double-Sided Token" rows split into two records
    pub split_double_tokens: bool,
}

/// One recognized source export layout
#[derive(Debug, Clone)]
pub struct DialectDefinition {
    /// Stable machine id ("moxfield", "deckbox", ...)
    pub id: &'static str,
    /// Display name for logs and the CLI
    pub display_name: &'static str,
    /// Logical field → expected header, in the tool's column order
    pub columns: &'static [(Field, &'static str)],
    /// Headers the tool emits that carry no mapped field but still count
    /// toward detection
    pub extra_headers: &'static [&'static str],
    /// Headers empirically unique (or nearly so) to this tool
    pub strong_indicators: &'static [&'static str],
    /// Field delimiter
    pub delimiter: u8,
    /// Parser quirks
    pub quirks: Quirks,
    /// Fallback dialects are selectable manually but never auto-detected
    pub fallback: bool,
}

impl DialectDefinition {
    /// All headers this dialect is expected to emit
    pub fn expected_headers(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns
            .iter()
            .map(|(_, header)| *header)
            .chain(self.extra_headers.iter().copied())
    }

    /// Header mapped to the given logical field, if any
    pub fn header_for(&self, field: Field) -> Option<&'static str> {
        self.columns
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, header)| *header)
    }

}

/// Immutable catalog of dialect definitions
#[derive(Debug, Clone)]
pub struct FormatRegistry {
    dialects: Vec<DialectDefinition>,
}

impl FormatRegistry {
    /// Build the registry with every known dialect
    pub fn new() -> Self {
        Self {
            dialects: all_dialects(),
        }
    }

    /// Look up a dialect by its machine id (case-insensitive)
    pub fn get(&self, id: &str) -> Option<&DialectDefinition> {
        self.dialects
            .iter()
            .find(|d| d.id.eq_ignore_ascii_case(id))
    }

    /// The generic fallback dialect
    pub fn fallback(&self) -> &DialectDefinition {
        self.dialects
            .iter()
            .find(|d| d.fallback)
            .expect("registry always contains the generic fallback")
    }

    /// All dialects eligible for auto-detection
    pub fn detectable(&self) -> impl Iterator<Item = &DialectDefinition> {
        self.dialects.iter().filter(|d| !d.fallback)
    }

    /// All registered dialects
    pub fn iter(&self) -> impl Iterator<Item = &DialectDefinition> {
        self.dialects.iter()
    }

    pub fn len(&self) -> usize {
        self.dialects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dialects.is_empty()
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}
