//! Normalized card records produced by the row parser
//!
//! One `ParsedRecord` per input row (or per face of a split double-sided
//! token). Records are mutated in place by the set resolver and confidence
//! assigner, then consumed read-only by the lookup pipeline.

use serde::{Deserialize, Serialize};

/// Confidence tier attached to a resolved record
///
/// Ordered: VeryHigh > High > Medium > Low. The tier assigned up front is a
/// ceiling; pipeline stages may only lower it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Confidence {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::VeryHigh => "very-high",
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }

    /// One tier lower (Low stays Low)
    pub fn downgraded(&self) -> Self {
        match self {
            Confidence::VeryHigh => Confidence::High,
            Confidence::High => Confidence::Medium,
            Confidence::Medium => Confidence::Low,
            Confidence::Low => Confidence::Low,
        }
    }
}

/// How a record's identity was ultimately established
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdMethod {
    /// Direct card-database id supplied by the source row
    DirectId,
    /// Numeric secondary id (multiverse id) supplied by the source row
    NumericId,
    /// Set code + collector number, both valid as supplied
    SetCollector,
    /// Set code + collector number after a set-code correction
    SetCollectorCorrected,
    /// Name + set code, both valid as supplied
    NameSet,
    /// Name + set code after a set-code correction
    NameSetCorrected,
    /// Name + collector number resolved through an individual search
    CollectorSearch,
    /// Set discovered through fuzzy set-name resolution
    FuzzySet,
    /// Name alone
    NameOnly,
    /// No strategy produced a match
    Failed,
}

impl IdMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdMethod::DirectId => "direct-id",
            IdMethod::NumericId => "numeric-id",
            IdMethod::SetCollector => "set+collector",
            IdMethod::SetCollectorCorrected => "set+collector-corrected",
            IdMethod::NameSet => "name+set",
            IdMethod::NameSetCorrected => "name+set-corrected",
            IdMethod::CollectorSearch => "name+collector-search",
            IdMethod::FuzzySet => "fuzzy-set",
            IdMethod::NameOnly => "name-only",
            IdMethod::Failed => "failed",
        }
    }
}

/// Card finish requested by the source row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Finish {
    #[default]
    Nonfoil,
    Foil,
    Etched,
}

impl Finish {
    /// Wire/export representation ("" | "foil" | "etched")
    pub fn as_str(&self) -> &'static str {
        match self {
            Finish::Nonfoil => "",
            Finish::Foil => "foil",
            Finish::Etched => "etched",
        }
    }

    /// Finish key used by the card database's finishes array
    pub fn api_str(&self) -> &'static str {
        match self {
            Finish::Nonfoil => "nonfoil",
            Finish::Foil => "foil",
            Finish::Etched => "etched",
        }
    }
}

/// One normalized card record flowing through the pipeline
#[derive(Debug, Clone)]
pub struct ParsedRecord {
    /// Original row as ordered (header, value) pairs, for diagnostics
    pub raw_row: Vec<(String, String)>,
    /// 1-based data row number in the source file
    pub source_row: usize,

    /// Copy count (always >= 1)
    pub count: u32,
    /// Card name
    pub name: String,
    /// Set code as supplied or corrected
    pub set_code: String,
    /// Set display name, kept for fuzzy fallback
    pub set_name: String,
    /// Normalized condition string
    pub condition: String,
    /// Normalized language code ("" when unspecified)
    pub language: String,
    /// Requested finish
    pub finish: Finish,
    /// Whether the etched finish was inferred from free text rather than a
    /// dedicated finish column
    pub etched_from_text: bool,
    /// Collector number as supplied
    pub collector_number: String,
    /// Vendor purchase price, passed through verbatim
    pub purchase_price: String,
    /// Free-form tags/notes
    pub tags: String,

    /// Direct card-database id (UUID) if the source supplied one
    pub scryfall_id: Option<String>,
    /// Numeric secondary id (multiverse id) if the source supplied one
    pub multiverse_id: Option<u64>,

    /// Accumulated warnings
    pub warnings: Vec<String>,
    /// Current confidence tier
    pub confidence: Confidence,
    /// Set code was fuzzy-corrected
    pub set_corrected: bool,
}

impl ParsedRecord {
    pub fn new(source_row: usize) -> Self {
        Self {
            raw_row: Vec::new(),
            source_row,
            count: 1,
            name: String::new(),
            set_code: String::new(),
            set_name: String::new(),
            condition: String::new(),
            language: String::new(),
            finish: Finish::Nonfoil,
            etched_from_text: false,
            collector_number: String::new(),
            purchase_price: String::new(),
            tags: String::new(),
            scryfall_id: None,
            multiverse_id: None,
            warnings: Vec::new(),
            confidence: Confidence::Low,
            set_corrected: false,
        }
    }

    /// Append a warning to the record
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Set confidence, never above the current tier
    ///
    /// This is the only way confidence changes after initial assignment,
    /// keeping the tier monotonically non-increasing.
    pub fn cap_confidence(&mut self, tier: Confidence) {
        self.confidence = self.confidence.min(tier);
    }

    /// Lower confidence by exactly one tier
    pub fn downgrade_confidence(&mut self) {
        self.confidence = self.confidence.downgraded();
    }

    /// True if any lookup strategy can do something with this record
    pub fn has_usable_identifier(&self) -> bool {
        self.scryfall_id.is_some()
            || self.multiverse_id.is_some()
            || !self.name.is_empty()
            || (!self.set_code.is_empty() && !self.collector_number.is_empty())
    }

    /// True if the record can only be resolved by name
    pub fn is_name_only(&self) -> bool {
        self.scryfall_id.is_none()
            && self.multiverse_id.is_none()
            && self.set_code.is_empty()
            && self.collector_number.is_empty()
            && !self.name.is_empty()
    }
}
