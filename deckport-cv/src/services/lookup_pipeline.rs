//! Identity resolution pipeline
//!
//! Resolves parsed records against the external card database through
//! ordered strategies, each consuming only the records the previous one
//! left unresolved:
//!
//! 1. Collector-number search for records with a name and collector number
//!    but no set information
//! 2. Batched collection lookup grouped by best available identifier, with
//!    promotional printings routed through individual search
//! 3. Match validation against the original row
//! 4. Language validation with a secondary language-filtered lookup
//!
//! Failures are isolated per record and per batch; only cancellation
//! aborts the run. Records within one batch resolve in a single round
//! trip, and a global pacing delay separates consecutive requests (inside
//! the client).

use crate::error::{ConvertError, Result};
use crate::ingest::transforms;
use crate::models::{
    CardIdentifier, Confidence, ConversionOutcome, Finish, IdMethod, ParsedRecord, ScryfallCard,
};
use crate::services::scryfall_client::CardDatabase;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Per-record resolution state
#[derive(Debug)]
enum State {
    /// Awaiting the batched lookup
    Ready,
    /// Demoted: only a name lookup is allowed
    NameOnly,
    /// A candidate printing was found, pending validation
    Matched {
        card: ScryfallCard,
        method: IdMethod,
        warnings: Vec<String>,
    },
    /// Terminal failure
    Failed { error: String },
}

struct WorkItem {
    record: ParsedRecord,
    state: State,
}

impl WorkItem {
    fn is_settled(&self) -> bool {
        matches!(self.state, State::Matched { .. } | State::Failed { .. })
    }
}

/// Lookup pipeline over an abstract card database
pub struct LookupPipeline {
    client: Arc<dyn CardDatabase>,
    batch_size: usize,
}

impl LookupPipeline {
    pub fn new(client: Arc<dyn CardDatabase>, batch_size: usize) -> Self {
        Self { client, batch_size }
    }

    /// Resolve all records; returns one outcome per record
    ///
    /// `on_progress` is called with (settled, total) after every round
    /// trip. The only fatal error is cancellation.
    pub async fn run(
        &self,
        records: Vec<ParsedRecord>,
        cancel: &CancellationToken,
        mut on_progress: impl FnMut(usize, usize),
    ) -> Result<Vec<ConversionOutcome>> {
        let total = records.len();
        let mut items: Vec<WorkItem> = records
            .into_iter()
            .map(|record| WorkItem {
                record,
                state: State::Ready,
            })
            .collect();

        // Records with nothing to look up never reach the network
        for item in &mut items {
            if !item.record.has_usable_identifier() {
                item.state = State::Failed {
                    error: "No usable identifier".to_string(),
                };
            }
        }
        on_progress(settled(&items), total);

        self.collector_number_search(&mut items, cancel, &mut on_progress, total)
            .await?;
        self.batched_lookup(&mut items, cancel, &mut on_progress, total)
            .await?;
        self.validate_matches(&mut items);
        self.validate_languages(&mut items, cancel).await?;
        on_progress(total, total);

        Ok(items.into_iter().map(finish_item).collect())
    }

    /// Strategy 1: individual disambiguating search for name + collector
    /// number rows with no set information
    async fn collector_number_search(
        &self,
        items: &mut [WorkItem],
        cancel: &CancellationToken,
        on_progress: &mut impl FnMut(usize, usize),
        total: usize,
    ) -> Result<()> {
        for idx in 0..items.len() {
            {
                let item = &items[idx];
                if !matches!(item.state, State::Ready) {
                    continue;
                }
                let record = &item.record;
                let eligible = record.scryfall_id.is_none()
                    && record.multiverse_id.is_none()
                    && record.set_code.is_empty()
                    && !record.name.is_empty()
                    && !record.collector_number.is_empty();
                if !eligible {
                    continue;
                }
            }

            if cancel.is_cancelled() {
                return Err(ConvertError::Cancelled);
            }

            let query = {
                let record = &items[idx].record;
                format!("!\"{}\" cn:\"{}\"", record.name, record.collector_number)
            };
            let result = self.client.search(&query).await;

            let item = &mut items[idx];
            let record = &mut item.record;
            match result {
                Ok(hits) if hits.len() == 1 => {
                    let card = hits.into_iter().next().expect("length checked");
                    tracing::debug!(
                        row = record.source_row,
                        set = %card.set,
                        "Collector-number search resolved the set"
                    );
                    record.set_code = card.set.clone();
                    record.cap_confidence(Confidence::Medium);
                    record.warn(format!(
                        "Set {} found via collector-number search",
                        card.set
                    ));
                    item.state = State::Matched {
                        card,
                        method: IdMethod::CollectorSearch,
                        warnings: Vec::new(),
                    };
                }
                Ok(hits) => {
                    tracing::debug!(
                        row = record.source_row,
                        hits = hits.len(),
                        "Collector-number search not unique; demoting to name-only"
                    );
                    record.cap_confidence(Confidence::Low);
                    record.warn(format!(
                        "Collector-number search returned {} results; falling back to name lookup",
                        hits.len()
                    ));
                    item.state = State::NameOnly;
                }
                Err(e) => {
                    item.state = State::Failed {
                        error: format!("Collector-number search failed: {}", e),
                    };
                }
            }
            on_progress(settled(items), total);
        }
        Ok(())
    }

    /// Strategy 2: batched collection lookup with promo special-casing
    async fn batched_lookup(
        &self,
        items: &mut [WorkItem],
        cancel: &CancellationToken,
        on_progress: &mut impl FnMut(usize, usize),
        total: usize,
    ) -> Result<()> {
        // Promotional subtypes can't be expressed as batch identifiers
        self.promo_searches(items, cancel).await?;

        // Group remaining records by identifier, deduplicating identical
        // identifiers while keeping insertion order (deterministic batches)
        let mut groups: Vec<(CardIdentifier, Vec<usize>)> = Vec::new();
        let mut group_index: HashMap<CardIdentifier, usize> = HashMap::new();
        let mut methods: Vec<IdMethod> = Vec::new();

        for (idx, item) in items.iter().enumerate() {
            let name_only = matches!(item.state, State::NameOnly);
            if !matches!(item.state, State::Ready | State::NameOnly) {
                continue;
            }
            let (identifier, method) = identifier_for(&item.record, name_only);
            match group_index.get(&identifier) {
                Some(&g) => groups[g].1.push(idx),
                None => {
                    group_index.insert(identifier.clone(), groups.len());
                    groups.push((identifier, vec![idx]));
                    methods.push(method);
                }
            }
        }

        for chunk_start in (0..groups.len()).step_by(self.batch_size) {
            if cancel.is_cancelled() {
                return Err(ConvertError::Cancelled);
            }

            let chunk_end = (chunk_start + self.batch_size).min(groups.len());
            let identifiers: Vec<CardIdentifier> = groups[chunk_start..chunk_end]
                .iter()
                .map(|(id, _)| id.clone())
                .collect();

            match self.client.collection(&identifiers).await {
                Ok(response) => {
                    for (offset, (identifier, member_indices)) in
                        groups[chunk_start..chunk_end].iter().enumerate()
                    {
                        let method = methods[chunk_start + offset];
                        let card = response
                            .data
                            .iter()
                            .find(|c| identifier_matches(identifier, c));
                        for &idx in member_indices {
                            match card {
                                Some(card) => {
                                    items[idx].state = State::Matched {
                                        card: card.clone(),
                                        method,
                                        warnings: Vec::new(),
                                    };
                                }
                                None => {
                                    items[idx].state = State::Failed {
                                        error: format!(
                                            "Card not found with {}",
                                            identifier.describe()
                                        ),
                                    };
                                }
                            }
                        }
                    }
                }
                Err(e) => {
                    // Batch failure is isolated: these records fail, later
                    // batches still run
                    tracing::warn!(error = %e, "Batch lookup failed");
                    for (identifier, member_indices) in &groups[chunk_start..chunk_end] {
                        for &idx in member_indices {
                            items[idx].state = State::Failed {
                                error: format!(
                                    "Lookup of {} failed: {}",
                                    identifier.describe(),
                                    e
                                ),
                            };
                        }
                    }
                }
            }
            on_progress(settled(items), total);
        }

        Ok(())
    }

    /// Individual searches for promotional printings the batch endpoint
    /// cannot express
    async fn promo_searches(
        &self,
        items: &mut [WorkItem],
        cancel: &CancellationToken,
    ) -> Result<()> {
        for item in items.iter_mut() {
            if !matches!(item.state, State::Ready) {
                continue;
            }
            let record = &item.record;
            // Direct ids are precise already; only identifier-poor promo
            // rows need the search path
            if record.scryfall_id.is_some() || record.multiverse_id.is_some() {
                continue;
            }
            let Some(kind) = promo_kind(record) else {
                continue;
            };
            if record.name.is_empty() {
                continue;
            }

            if cancel.is_cancelled() {
                return Err(ConvertError::Cancelled);
            }

            let query = format!("!\"{}\" is:{}", record.name, kind);
            match self.client.search(&query).await {
                Ok(hits) => {
                    let chosen = disambiguate_promo(record, hits);
                    match chosen {
                        Some(card) => {
                            item.state = State::Matched {
                                card,
                                method: if record.set_code.is_empty() {
                                    IdMethod::NameOnly
                                } else {
                                    IdMethod::NameSet
                                },
                                warnings: vec![format!("Matched via {} promo search", kind)],
                            };
                        }
                        None => {
                            item.state = State::Failed {
                                error: format!(
                                    "Promotional printing ({}) of {:?} not found",
                                    kind, record.name
                                ),
                            };
                        }
                    }
                }
                Err(e) => {
                    item.state = State::Failed {
                        error: format!("Promo search failed: {}", e),
                    };
                }
            }
        }
        Ok(())
    }

    /// Strategy 3: check every candidate against the original row
    fn validate_matches(&self, items: &mut [WorkItem]) {
        for item in items.iter_mut() {
            let failure = match &mut item.state {
                // Name-only matches established no reliable identity;
                // there is nothing to validate against
                State::Matched { method, .. } if *method == IdMethod::NameOnly => None,
                State::Matched {
                    card,
                    method,
                    warnings,
                } => validate_match(&mut item.record, card, *method, warnings),
                _ => None,
            };
            if let Some(error) = failure {
                item.state = State::Failed { error };
            }
        }
    }

    /// Strategy 4: language validation and secondary lookup
    async fn validate_languages(
        &self,
        items: &mut [WorkItem],
        cancel: &CancellationToken,
    ) -> Result<()> {
        for item in items.iter_mut() {
            let State::Matched {
                card,
                method,
                warnings,
            } = &mut item.state
            else {
                continue;
            };
            // Name-only matches pass the source language straight through
            if *method == IdMethod::NameOnly {
                continue;
            }
            let record = &mut item.record;
            if record.language.is_empty() {
                continue;
            }

            let Some(requested) = transforms::normalize_language(&record.language) else {
                warnings.push(format!(
                    "Unrecognized language {:?}; keeping {} printing",
                    record.language, card.lang
                ));
                record.downgrade_confidence();
                continue;
            };

            if card.lang == requested {
                continue;
            }

            if cancel.is_cancelled() {
                return Err(ConvertError::Cancelled);
            }

            let query = format!(
                "set:{} cn:\"{}\" lang:{}",
                card.set, card.collector_number, requested
            );
            match self.client.search(&query).await {
                Ok(hits) => match hits.into_iter().find(|c| c.lang == requested) {
                    Some(translated) => {
                        tracing::debug!(
                            row = record.source_row,
                            lang = requested,
                            "Secondary lookup found the requested language"
                        );
                        *card = translated;
                    }
                    None => {
                        warnings.push(format!(
                            "Language {} not available for {} ({} {}); keeping {} printing",
                            requested, card.name, card.set, card.collector_number, card.lang
                        ));
                        record.downgrade_confidence();
                    }
                },
                Err(e) => {
                    warnings.push(format!(
                        "Language lookup failed ({}); keeping {} printing",
                        e, card.lang
                    ));
                    record.downgrade_confidence();
                }
            }
        }
        Ok(())
    }
}

fn settled(items: &[WorkItem]) -> usize {
    items.iter().filter(|i| i.is_settled()).count()
}

/// Check a candidate printing against the original row; returns the
/// failure message for hard mismatches, mutating the record/warnings for
/// the soft etched-finish case
fn validate_match(
    record: &mut ParsedRecord,
    card: &ScryfallCard,
    method: IdMethod,
    warnings: &mut Vec<String>,
) -> Option<String> {
    if !names_match(&record.name, &card.name) {
        return Some(format!(
            "Identity mismatch with source data: row names {:?}, database returned {:?}",
            record.name, card.name
        ));
    }

    if !record.set_code.is_empty() && !card.set.eq_ignore_ascii_case(&record.set_code) {
        return Some(format!(
            "Identity mismatch with source data: row set {}, database returned {}",
            record.set_code, card.set
        ));
    }

    if !record.collector_number.is_empty()
        && uses_collector_number(method)
        && !collector_numbers_match(&record.collector_number, &card.collector_number)
    {
        return Some(format!(
            "Identity mismatch with source data: row collector number {}, database returned {}",
            record.collector_number, card.collector_number
        ));
    }

    let requested = record.finish.api_str();
    if !card.has_finish(requested) {
        if record.finish == Finish::Etched && record.etched_from_text {
            // Etched came from free text, not a dedicated column; trust
            // the database over the guess
            let fallback = if card.has_finish("foil") {
                Finish::Foil
            } else {
                Finish::Nonfoil
            };
            warnings.push(format!(
                "Etched finish (from notes) not available for {}; using {}",
                card.name,
                fallback.api_str()
            ));
            record.finish = fallback;
        } else {
            return Some(format!(
                "Requested {} finish not available for {} ({} {})",
                requested, card.name, card.set, card.collector_number
            ));
        }
    }

    None
}

/// Did this method key on the collector number?
fn uses_collector_number(method: IdMethod) -> bool {
    matches!(
        method,
        IdMethod::SetCollector
            | IdMethod::SetCollectorCorrected
            | IdMethod::CollectorSearch
            | IdMethod::FuzzySet
    )
}

/// Best identifier for a record, with the method tag a successful match
/// will carry
fn identifier_for(record: &ParsedRecord, name_only: bool) -> (CardIdentifier, IdMethod) {
    if !name_only {
        if let Some(id) = &record.scryfall_id {
            return (CardIdentifier::Id { id: id.clone() }, IdMethod::DirectId);
        }
        if let Some(mvid) = record.multiverse_id {
            return (
                CardIdentifier::Multiverse {
                    multiverse_id: mvid,
                },
                IdMethod::NumericId,
            );
        }
        if !record.set_code.is_empty() && !record.collector_number.is_empty() {
            let method = if record.set_corrected {
                if record.name.is_empty() {
                    IdMethod::FuzzySet
                } else {
                    IdMethod::SetCollectorCorrected
                }
            } else {
                IdMethod::SetCollector
            };
            return (
                CardIdentifier::SetCollector {
                    set: record.set_code.clone(),
                    collector_number: record.collector_number.clone(),
                },
                method,
            );
        }
        if !record.name.is_empty() && !record.set_code.is_empty() {
            let method = if record.set_corrected {
                IdMethod::NameSetCorrected
            } else {
                IdMethod::NameSet
            };
            return (
                CardIdentifier::NameSet {
                    name: record.name.clone(),
                    set: record.set_code.clone(),
                },
                method,
            );
        }
    }

    (
        CardIdentifier::Name {
            name: record.name.clone(),
        },
        IdMethod::NameOnly,
    )
}

/// Does this card satisfy the identifier it was requested under?
fn identifier_matches(identifier: &CardIdentifier, card: &ScryfallCard) -> bool {
    match identifier {
        CardIdentifier::Id { id } => card.id.eq_ignore_ascii_case(id),
        CardIdentifier::Multiverse { multiverse_id } => {
            card.multiverse_ids.contains(multiverse_id)
        }
        CardIdentifier::SetCollector {
            set,
            collector_number,
        } => {
            card.set.eq_ignore_ascii_case(set)
                && collector_numbers_match(collector_number, &card.collector_number)
        }
        CardIdentifier::NameSet { name, set } => {
            card.set.eq_ignore_ascii_case(set) && names_match(name, &card.name)
        }
        CardIdentifier::Name { name } => names_match(name, &card.name),
    }
}

/// Case-insensitive name comparison, face-aware
///
/// Multi-face cards come back named "Front // Back"; a source row naming
/// one face still matches. Token rows often carry a " Token" suffix the
/// database omits.
fn names_match(source: &str, card_name: &str) -> bool {
    if source.is_empty() {
        return true;
    }
    let s = source.trim().to_lowercase();
    let c = card_name.trim().to_lowercase();
    if s == c {
        return true;
    }
    if c.split(" // ").any(|face| face.trim() == s) {
        return true;
    }
    if let Some(stripped) = s.strip_suffix(" token") {
        if c == stripped || c.split(" // ").any(|face| face.trim() == stripped) {
            return true;
        }
    }
    false
}

/// Collector numbers compare without leading zeros ("060" == "60")
fn collector_numbers_match(a: &str, b: &str) -> bool {
    let trim = |s: &str| {
        let t = s.trim().to_lowercase();
        let stripped = t.trim_start_matches('0');
        if stripped.is_empty() {
            "0".to_string()
        } else {
            stripped.to_string()
        }
    };
    trim(a) == trim(b)
}

/// Promotional subtype detected from the row's free text
fn promo_kind(record: &ParsedRecord) -> Option<&'static str> {
    let tags = record.tags.to_lowercase();
    let set_name = record.set_name.to_lowercase();
    let haystack = format!("{} {}", tags, set_name);

    if haystack.contains("prerelease") {
        Some("prerelease")
    } else if haystack.contains("promo pack") || haystack.contains("promopack") {
        Some("promopack")
    } else if haystack.contains("judge") {
        Some("judgegift")
    } else {
        None
    }
}

/// Pick the single promo hit, using set/collector number to break ties
fn disambiguate_promo(record: &ParsedRecord, hits: Vec<ScryfallCard>) -> Option<ScryfallCard> {
    if hits.len() == 1 {
        return hits.into_iter().next();
    }

    let narrowed: Vec<ScryfallCard> = hits
        .into_iter()
        .filter(|c| {
            (record.set_code.is_empty() || c.set.eq_ignore_ascii_case(&record.set_code))
                && (record.collector_number.is_empty()
                    || collector_numbers_match(&record.collector_number, &c.collector_number))
        })
        .collect();

    if narrowed.len() == 1 {
        narrowed.into_iter().next()
    } else {
        None
    }
}

/// Turn a settled work item into its outcome
fn finish_item(item: WorkItem) -> ConversionOutcome {
    match item.state {
        State::Matched {
            card,
            method,
            warnings,
        } => ConversionOutcome::matched(item.record, card, method, warnings),
        State::Failed { error } => ConversionOutcome::failed(item.record, error),
        // A record the strategies never settled is a failure in its own
        // right; report which stage it stalled in
        State::Ready | State::NameOnly => {
            ConversionOutcome::failed(item.record, "Not found by name alone")
        }
    }
}
