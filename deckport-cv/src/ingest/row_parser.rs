//! Row parsing
//!
//! Applies a dialect's field mapping to one data row and produces one or
//! more normalized records. Header resolution degrades gracefully: exact
//! header → case-insensitive header → domain alias table, so an export
//! with renamed columns still parses. All rows survive parsing; incompleteness
//! is resolved or reported downstream, never dropped here.

use super::transforms;
use crate::formats::{DialectDefinition, Field};
use crate::models::{Finish, ParsedRecord};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Card-database UUIDs are exactly this long; some tools append a stray
/// character on export
const ID_LENGTH: usize = 36;

static ALIASES: Lazy<HashMap<Field, &'static [&'static str]>> = Lazy::new(|| {
    HashMap::from([
        (
            Field::Count,
            &["count", "qty", "quantity", "amount", "reg qty"][..],
        ),
        (
            Field::Name,
            &["name", "card", "card name", "card_name", "title"][..],
        ),
        (
            Field::Set,
            &[
                "set", "edition", "set code", "set_code", "setcode", "set id", "edition code",
            ][..],
        ),
        (
            Field::SetName,
            &["set name", "set_name", "edition name", "expansion"][..],
        ),
        (
            Field::CollectorNumber,
            &[
                "collector number",
                "collector_number",
                "cn",
                "card number",
                "card_number",
                "number",
                "collector #",
            ][..],
        ),
        (Field::Condition, &["condition", "cond"][..]),
        (Field::Language, &["language", "lang"][..]),
        (
            Field::Finish,
            &["foil", "finish", "printing", "is_foil"][..],
        ),
        (
            Field::Price,
            &[
                "price",
                "purchase price",
                "my price",
                "price each",
                "acquired price",
                "estimated_price",
            ][..],
        ),
        (Field::Tags, &["tags", "notes", "comment"][..]),
        (
            Field::ScryfallId,
            &["scryfall id", "scryfall_id", "scryfallid"][..],
        ),
        (
            Field::MultiverseId,
            &["multiverse id", "multiverse_id", "multiverseid", "mvid"][..],
        ),
        (Field::Extras, &["extras"][..]),
    ])
});

/// Per-dialect row parser
#[derive(Debug, Clone)]
pub struct RowParser {
    dialect: DialectDefinition,
}

impl RowParser {
    pub fn new(dialect: DialectDefinition) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> &DialectDefinition {
        &self.dialect
    }

    /// Resolve the column index for a logical field
    ///
    /// Exact header match first, then case-insensitive, then the alias
    /// table for exports that renamed a column.
    fn column_index(&self, field: Field, headers: &[String]) -> Option<usize> {
        if let Some(expected) = self.dialect.header_for(field) {
            if let Some(idx) = headers.iter().position(|h| h == expected) {
                return Some(idx);
            }
            if let Some(idx) = headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(expected))
            {
                return Some(idx);
            }
        }

        let aliases = ALIASES.get(&field)?;
        headers.iter().position(|h| {
            let lowered = h.trim().to_lowercase();
            aliases.iter().any(|a| *a == lowered)
        })
    }

    fn value<'a>(
        &self,
        field: Field,
        headers: &[String],
        row: &'a [String],
    ) -> Option<&'a str> {
        let idx = self.column_index(field, headers)?;
        row.get(idx).map(|v| v.trim())
    }

    /// Parse one data row into one or more records
    ///
    /// `row_number` is the 1-based data row position in the source file.
    pub fn parse_row(
        &self,
        row_number: usize,
        headers: &[String],
        row: &[String],
    ) -> Vec<ParsedRecord> {
        let mut record = ParsedRecord::new(row_number);

        record.raw_row = headers
            .iter()
            .zip(row.iter())
            .map(|(h, v)| (h.clone(), v.clone()))
            .collect();

        record.count = self
            .value(Field::Count, headers, row)
            .map(transforms::parse_count)
            .unwrap_or(1);

        record.name = self
            .value(Field::Name, headers, row)
            .unwrap_or("")
            .to_string();

        record.set_code = self
            .value(Field::Set, headers, row)
            .unwrap_or("")
            .to_lowercase();

        record.set_name = self
            .value(Field::SetName, headers, row)
            .unwrap_or("")
            .to_string();

        record.condition = transforms::normalize_condition(
            self.value(Field::Condition, headers, row).unwrap_or(""),
        );

        let raw_language = self.value(Field::Language, headers, row).unwrap_or("");
        record.language = match transforms::normalize_language(raw_language) {
            Some(code) => code.to_string(),
            None => raw_language.trim().to_lowercase(),
        };

        record.finish = self
            .value(Field::Finish, headers, row)
            .map(transforms::parse_finish)
            .unwrap_or(Finish::Nonfoil);

        record.collector_number = transforms::clean_collector_number(
            self.value(Field::CollectorNumber, headers, row)
                .unwrap_or(""),
        );

        record.purchase_price = transforms::normalize_price(
            self.value(Field::Price, headers, row).unwrap_or(""),
        );

        record.tags = self
            .value(Field::Tags, headers, row)
            .unwrap_or("")
            .to_string();

        self.apply_scryfall_id(&mut record, headers, row);
        self.apply_multiverse_id(&mut record, headers, row);

        if self.dialect.quirks.composite_extras {
            self.apply_extras(&mut record, headers, row);
        }

        // Etched finish hiding in free text rather than the finish column
        if record.finish != Finish::Etched && record.tags.to_lowercase().contains("etched") {
            record.finish = Finish::Etched;
            record.etched_from_text = true;
        }

        if !record.name.is_empty()
            && !record.collector_number.is_empty()
            && record.set_code.is_empty()
            && record.set_name.is_empty()
            && record.scryfall_id.is_none()
            && record.multiverse_id.is_none()
        {
            record.warn("No set information; will attempt collector-number search");
        }

        if self.dialect.quirks.split_double_tokens {
            if let Some(pair) = split_double_token(&record) {
                return pair;
            }
        }

        vec![record]
    }

    fn apply_scryfall_id(&self, record: &mut ParsedRecord, headers: &[String], row: &[String]) {
        let Some(raw) = self.value(Field::ScryfallId, headers, row) else {
            return;
        };
        let mut id = raw.trim().to_lowercase();
        if id.is_empty() {
            return;
        }

        if id.len() > ID_LENGTH && self.dialect.quirks.trim_long_ids {
            record.warn(format!(
                "Trimmed {} stray trailing character(s) from card id",
                id.len() - ID_LENGTH
            ));
            id.truncate(ID_LENGTH);
        }

        if looks_like_card_id(&id) {
            record.scryfall_id = Some(id);
        } else {
            record.warn(format!("Ignoring malformed card id {:?}", raw));
        }
    }

    fn apply_multiverse_id(&self, record: &mut ParsedRecord, headers: &[String], row: &[String]) {
        let Some(raw) = self.value(Field::MultiverseId, headers, row) else {
            return;
        };
        if raw.is_empty() {
            return;
        }
        match raw.parse::<u64>() {
            Ok(id) if id > 0 => record.multiverse_id = Some(id),
            _ => record.warn(format!("Ignoring malformed multiverse id {:?}", raw)),
        }
    }

    /// Composite extras column: one delimited string carrying finish and
    /// alteration status ("foil,signed" etc.)
    fn apply_extras(&self, record: &mut ParsedRecord, headers: &[String], row: &[String]) {
        let Some(raw) = self.value(Field::Extras, headers, row) else {
            return;
        };

        for token in raw.split(',').map(|t| t.trim().to_lowercase()) {
            match token.as_str() {
                "" => {}
                "foil" => record.finish = Finish::Foil,
                "etched" => {
                    record.finish = Finish::Etched;
                    record.etched_from_text = true;
                }
                other => {
                    // signed / altered / proxy / misprint travel as tags
                    if record.tags.is_empty() {
                        record.tags = other.to_string();
                    } else {
                        record.tags = format!("{},{}", record.tags, other);
                    }
                }
            }
        }
    }
}

/// UUID shape check: 8-4-4-4-12 hex groups
fn looks_like_card_id(id: &str) -> bool {
    if id.len() != ID_LENGTH {
        return false;
    }
    id.char_indices().all(|(i, c)| match i {
        8 | 13 | 18 | 23 => c == '-',
        _ => c.is_ascii_hexdigit(),
    })
}

/// Split a double-sided token row into its two faces
///
/// "Knight // Zombie Double-Sided Token" with collector number "5 // 12"
/// becomes two records sharing every other field. Returns `None` for
/// ordinary rows (including genuine multi-face cards, which the card
/// database names with " // " itself and must stay single records).
fn split_double_token(record: &ParsedRecord) -> Option<Vec<ParsedRecord>> {
    let marker = "double-sided token";
    let lowered = record.name.to_lowercase();
    if !record.name.contains(" // ") || !lowered.contains(marker) {
        return None;
    }

    let base = record.name.get(..lowered.find(marker)?)?.trim_end();
    let (first, second) = base.split_once(" // ")?;

    let numbers: Vec<&str> = record
        .collector_number
        .split("//")
        .map(|n| n.trim())
        .collect();

    let mut front = record.clone();
    front.name = format!("{} Token", first.trim());
    let mut back = record.clone();
    back.name = format!("{} Token", second.trim());

    if numbers.len() == 2 {
        front.collector_number = numbers[0].to_string();
        back.collector_number = numbers[1].to_string();
    }

    for face in [&mut front, &mut back] {
        face.warn("Split from a double-sided token row");
    }

    Some(vec![front, back])
}
