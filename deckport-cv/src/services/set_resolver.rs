//! Set code validation and fuzzy set-name resolution
//!
//! Validates supplied set codes against the canonical set list and, when a
//! code is missing or invalid, recovers one from the set display name:
//! exact match first, then tokenized word-overlap scoring. Parent sets are
//! preferred over structurally recognizable child sets (tokens, promos,
//! art series) unless the record itself indicates a token or art card.

use crate::models::{ParsedRecord, ScryfallSet};
use std::collections::HashMap;
use std::sync::Arc;

/// Canonical set list, loaded once and then immutable
#[derive(Debug)]
pub struct SetCatalog {
    sets: Vec<ScryfallSet>,
    by_code: HashMap<String, usize>,
}

impl SetCatalog {
    pub fn new(sets: Vec<ScryfallSet>) -> Self {
        let by_code = sets
            .iter()
            .enumerate()
            .map(|(i, s)| (s.code.to_lowercase(), i))
            .collect();
        Self { sets, by_code }
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.by_code.contains_key(&code.to_lowercase())
    }

    pub fn get(&self, code: &str) -> Option<&ScryfallSet> {
        self.by_code
            .get(&code.to_lowercase())
            .map(|&i| &self.sets[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScryfallSet> {
        self.sets.iter()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

/// What kind of set a lookup should favor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchBias {
    /// Favor parent sets (the default)
    Parent,
    /// The record is a token; favor token sets
    Token,
    /// The record is an art card; favor art-series sets
    ArtSeries,
}

/// Outcome of set resolution for one record
#[derive(Debug, Clone, PartialEq)]
pub enum SetResolution {
    /// Supplied code is canonical
    CodeValid,
    /// Code recovered from an exact (case-insensitive) name match
    ExactName,
    /// Code corrected via fuzzy name match at the given confidence
    Corrected { confidence: f32 },
    /// No correction met the acceptance threshold; record left untouched
    Unresolved,
    /// Record carries no set information at all
    NoSetInfo,
}

/// Set resolver
pub struct SetResolver {
    catalog: Arc<SetCatalog>,
    /// Minimum fuzzy score to accept a correction
    acceptance: f32,
}

impl SetResolver {
    pub fn new(catalog: Arc<SetCatalog>, acceptance: f32) -> Self {
        Self {
            catalog,
            acceptance,
        }
    }

    /// Validate or correct the record's set code in place
    pub fn resolve(&self, record: &mut ParsedRecord) -> SetResolution {
        if !record.set_code.is_empty() && self.catalog.contains_code(&record.set_code) {
            return SetResolution::CodeValid;
        }

        let query = if !record.set_name.is_empty() {
            record.set_name.clone()
        } else if !record.set_code.is_empty() {
            // Some tools write the full set name into the code column
            record.set_code.clone()
        } else {
            return SetResolution::NoSetInfo;
        };

        let bias = bias_for(record);

        // Pass 2: exact case-insensitive name match
        if let Some(set) = self
            .catalog
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(query.trim()))
        {
            tracing::debug!(query = %query, code = %set.code, "Exact set-name match");
            record.set_code = set.code.clone();
            return SetResolution::ExactName;
        }

        // Pass 3: fuzzy name match
        let Some((set, confidence)) = self.find_set(&query, bias) else {
            record.warn(format!("Unrecognized set {:?}; left uncorrected", query));
            return SetResolution::Unresolved;
        };

        if confidence < self.acceptance {
            record.warn(format!(
                "Set {:?} matched {:?} only at confidence {:.2}; left uncorrected",
                query, set.name, confidence
            ));
            return SetResolution::Unresolved;
        }

        tracing::debug!(
            query = %query,
            code = %set.code,
            confidence,
            "Fuzzy set-name correction"
        );
        record.warn(format!(
            "Corrected set to {} ({:?}) from {:?}",
            set.code, set.name, query
        ));
        record.set_code = set.code.clone();
        record.set_corrected = true;
        SetResolution::Corrected { confidence }
    }

    /// Best-scoring set for a free-form name, with its score (capped to 1.0)
    pub fn find_set(&self, query: &str, bias: SearchBias) -> Option<(&ScryfallSet, f32)> {
        let mut best: Option<(&ScryfallSet, f32)> = None;

        for set in self.catalog.iter() {
            let score = score_set_name(query, &set.name) * bias_factor(set, bias);
            if score <= 0.0 {
                continue;
            }
            match &best {
                Some((_, best_score)) if *best_score >= score => {}
                _ => best = Some((set, score)),
            }
        }

        best.map(|(set, score)| (set, score.min(1.0)))
    }
}

/// Infer the search bias from the record's own fields
fn bias_for(record: &ParsedRecord) -> SearchBias {
    let name = record.name.to_lowercase();
    let tags = record.tags.to_lowercase();

    if name.contains("art card") || tags.contains("art series") || tags.contains("art card") {
        SearchBias::ArtSeries
    } else if name.ends_with(" token") || name == "token" || tags.contains("token") {
        SearchBias::Token
    } else {
        SearchBias::Parent
    }
}

/// Structural preference multiplier
fn bias_factor(set: &ScryfallSet, bias: SearchBias) -> f32 {
    match bias {
        SearchBias::Parent => {
            if set.is_child_set() {
                0.8
            } else {
                1.0
            }
        }
        SearchBias::Token => {
            if set.set_type == "token" {
                1.1
            } else if set.is_child_set() {
                0.9
            } else {
                1.0
            }
        }
        SearchBias::ArtSeries => {
            if set.set_type == "memorabilia" || set.name.to_lowercase().contains("art series") {
                1.1
            } else if set.is_child_set() {
                0.9
            } else {
                1.0
            }
        }
    }
}

/// Tokenized word-overlap score between a query and a canonical set name
///
/// Exact tokens count full weight, near-miss tokens (Jaro-Winkler >= 0.9)
/// count at a discount, and a length factor penalizes matches against much
/// longer names so "Parent Set" beats "Parent Set: Extras" for a short
/// query. Differently-numbered "Nth Edition" names never cross-match.
pub fn score_set_name(query: &str, candidate: &str) -> f32 {
    let query_tokens = tokenize(query);
    let candidate_tokens = tokenize(candidate);

    if query_tokens.is_empty() || candidate_tokens.is_empty() {
        return 0.0;
    }

    if ordinal_mismatch(&query_tokens, &candidate_tokens) {
        return 0.0;
    }

    let mut matched_weight = 0.0f32;
    for token in &query_tokens {
        if candidate_tokens.iter().any(|c| c == token) {
            matched_weight += 1.0;
            continue;
        }
        let best_jw = candidate_tokens
            .iter()
            .map(|c| strsim::jaro_winkler(token, c) as f32)
            .fold(0.0f32, f32::max);
        if best_jw >= 0.9 {
            matched_weight += best_jw * 0.9;
        }
    }

    let coverage = matched_weight / query_tokens.len() as f32;

    let (shorter, longer) = if query_tokens.len() <= candidate_tokens.len() {
        (query_tokens.len(), candidate_tokens.len())
    } else {
        (candidate_tokens.len(), query_tokens.len())
    };
    let length_factor = shorter as f32 / longer as f32;

    coverage * (0.7 + 0.3 * length_factor)
}

/// Lowercase word tokens with punctuation stripped and ordinals folded
/// ("4th" → "fourth") so user spellings meet canonical names
fn tokenize(name: &str) -> Vec<String> {
    name.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(fold_ordinal)
        .collect()
}

fn fold_ordinal(token: &str) -> String {
    match token {
        "1st" => "first",
        "2nd" => "second",
        "3rd" => "third",
        "4th" => "fourth",
        "5th" => "fifth",
        "6th" => "sixth",
        "7th" => "seventh",
        "8th" => "eighth",
        "9th" => "ninth",
        "10th" => "tenth",
        other => other,
    }
    .to_string()
}

const ORDINALS: &[&str] = &[
    "first", "second", "third", "fourth", "fifth", "sixth", "seventh", "eighth", "ninth", "tenth",
];

/// True when both names carry edition ordinals that disagree
/// ("Fourth Edition" must never match "Fifth Edition")
fn ordinal_mismatch(query: &[String], candidate: &[String]) -> bool {
    let q = query.iter().find(|t| ORDINALS.contains(&t.as_str()));
    let c = candidate.iter().find(|t| ORDINALS.contains(&t.as_str()));
    matches!((q, c), (Some(a), Some(b)) if a != b) || matches!((q, c), (Some(_), None) | (None, Some(_)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(code: &str, name: &str, set_type: &str, parent: Option<&str>) -> ScryfallSet {
        ScryfallSet {
            code: code.to_string(),
            name: name.to_string(),
            set_type: set_type.to_string(),
            parent_set_code: parent.map(|p| p.to_string()),
        }
    }

    fn catalog() -> Arc<SetCatalog> {
        Arc::new(SetCatalog::new(vec![
            set("lea", "Limited Edition Alpha", "core", None),
            set("4ed", "Fourth Edition", "core", None),
            set("5ed", "Fifth Edition", "core", None),
            set("khm", "Kaldheim", "expansion", None),
            set("tkhm", "Kaldheim Tokens", "token", Some("khm")),
            set("akhm", "Kaldheim Art Series", "memorabilia", Some("khm")),
            set("cmr", "Commander Legends", "draft_innovation", None),
            set("cc1", "Commander Collection: Green", "masterpiece", None),
            set("dom", "Dominaria", "expansion", None),
            set("dmu", "Dominaria United", "expansion", None),
            set("pdom", "Dominaria Promos", "promo", Some("dom")),
        ]))
    }

    fn resolver() -> SetResolver {
        SetResolver::new(catalog(), 0.7)
    }

    #[test]
    fn test_valid_code_passes_untouched() {
        let mut record = ParsedRecord::new(1);
        record.set_code = "KHM".to_string();

        assert_eq!(resolver().resolve(&mut record), SetResolution::CodeValid);
        assert!(!record.set_corrected);
        assert!(record.warnings.is_empty());
    }

    #[test]
    fn test_exact_name_scores_full_confidence() {
        let score = score_set_name("kaldheim", "Kaldheim");
        assert!((score - 1.0).abs() < 1e-6, "Exact name must score 1.0, got {}", score);
    }

    #[test]
    fn test_exact_name_resolution() {
        let mut record = ParsedRecord::new(1);
        record.set_name = "Kaldheim".to_string();

        assert_eq!(resolver().resolve(&mut record), SetResolution::ExactName);
        assert_eq!(record.set_code, "khm");
        assert!(!record.set_corrected, "Exact name match is not a correction");
    }

    #[test]
    fn test_fuzzy_correction_sets_flag_and_warning() {
        let mut record = ParsedRecord::new(1);
        record.set_name = "Commander Legend".to_string(); // dropped plural

        match resolver().resolve(&mut record) {
            SetResolution::Corrected { confidence } => {
                assert!(confidence >= 0.7);
            }
            other => panic!("Expected correction, got {:?}", other),
        }
        assert_eq!(record.set_code, "cmr");
        assert!(record.set_corrected);
        assert!(record.warnings.iter().any(|w| w.contains("Corrected set")));
    }

    #[test]
    fn test_parent_preferred_over_token_set() {
        let resolver = resolver();
        let (set, _) = resolver.find_set("Kaldheim", SearchBias::Parent).unwrap();
        assert_eq!(set.code, "khm");
    }

    #[test]
    fn test_token_bias_prefers_token_set() {
        let resolver = resolver();
        let (set, _) = resolver
            .find_set("Kaldheim Tokens", SearchBias::Token)
            .unwrap();
        assert_eq!(set.code, "tkhm");
    }

    #[test]
    fn test_token_record_gets_token_bias() {
        let mut record = ParsedRecord::new(1);
        record.name = "Elf Warrior Token".to_string();
        record.set_name = "Kaldheim Tokens".to_string();

        resolver().resolve(&mut record);
        assert_eq!(record.set_code, "tkhm");
    }

    #[test]
    fn test_edition_numbers_never_cross_match() {
        assert_eq!(score_set_name("Fourth Edition", "Fifth Edition"), 0.0);
        assert_eq!(score_set_name("4th Edition", "Fifth Edition"), 0.0);
        assert!(score_set_name("4th Edition", "Fourth Edition") > 0.99);
    }

    #[test]
    fn test_short_parent_name_beats_verbose_child() {
        // "Dominaria" should match the parent set, not "Dominaria Promos"
        // or "Dominaria United"
        let resolver = resolver();
        let (set, _) = resolver.find_set("Dominaria", SearchBias::Parent).unwrap();
        assert_eq!(set.code, "dom");
    }

    #[test]
    fn test_below_threshold_left_uncorrected() {
        let mut record = ParsedRecord::new(1);
        record.set_name = "Totally Unknown Set Name".to_string();

        assert_eq!(resolver().resolve(&mut record), SetResolution::Unresolved);
        assert!(record.set_code.is_empty());
        assert!(!record.set_corrected);
        assert!(!record.warnings.is_empty());
    }

    #[test]
    fn test_no_set_info() {
        let mut record = ParsedRecord::new(1);
        assert_eq!(resolver().resolve(&mut record), SetResolution::NoSetInfo);
    }

    #[test]
    fn test_set_name_in_code_column() {
        let mut record = ParsedRecord::new(1);
        record.set_code = "limited edition alpha".to_string();

        assert_eq!(resolver().resolve(&mut record), SetResolution::ExactName);
        assert_eq!(record.set_code, "lea");
    }
}
