//! In-process card database stub for integration tests
//!
//! Answers collection and search requests from a fixed card list and
//! records every request so tests can assert on batching behavior.

use async_trait::async_trait;
use deckport_cv::models::{CardIdentifier, ScryfallCard, ScryfallSet};
use deckport_cv::services::{CardDatabase, CollectionResponse, ScryfallError};
use serde_json::json;
use std::sync::Mutex;

/// Build a card fixture
pub fn card(name: &str, set: &str, cn: &str, lang: &str, finishes: &[&str]) -> ScryfallCard {
    serde_json::from_value(json!({
        "id": format!("{}-{}-{}-{}", name.to_lowercase().replace(' ', "-"), set, cn, lang),
        "name": name,
        "set": set,
        "set_name": set.to_uppercase(),
        "collector_number": cn,
        "finishes": finishes,
        "lang": lang,
        "prices": { "usd": "1.00" },
        "multiverse_ids": [],
        "promo_types": []
    }))
    .expect("valid card fixture")
}

pub struct StubDb {
    cards: Vec<ScryfallCard>,
    sets: Vec<ScryfallSet>,
    collection_sizes: Mutex<Vec<usize>>,
    search_queries: Mutex<Vec<String>>,
    fail_collections: usize,
}

impl StubDb {
    pub fn new(cards: Vec<ScryfallCard>) -> Self {
        Self {
            cards,
            sets: Vec::new(),
            collection_sizes: Mutex::new(Vec::new()),
            search_queries: Mutex::new(Vec::new()),
            fail_collections: 0,
        }
    }

    /// Fail the first `n` collection calls with an upstream error
    #[allow(dead_code)]
    pub fn fail_first_collections(mut self, n: usize) -> Self {
        self.fail_collections = n;
        self
    }

    #[allow(dead_code)]
    pub fn with_sets(mut self, sets: Vec<ScryfallSet>) -> Self {
        self.sets = sets;
        self
    }

    /// Identifier counts of every collection call made so far
    pub fn collection_sizes(&self) -> Vec<usize> {
        self.collection_sizes.lock().unwrap().clone()
    }

    /// Every search query issued so far
    #[allow(dead_code)]
    pub fn search_queries(&self) -> Vec<String> {
        self.search_queries.lock().unwrap().clone()
    }

    fn matches(identifier: &CardIdentifier, card: &ScryfallCard) -> bool {
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
                    && card.collector_number.eq_ignore_ascii_case(collector_number)
            }
            CardIdentifier::NameSet { name, set } => {
                card.set.eq_ignore_ascii_case(set) && card.name.eq_ignore_ascii_case(name)
            }
            CardIdentifier::Name { name } => card.name.eq_ignore_ascii_case(name),
        }
    }
}

/// Pull `key:"value"` or `key:value` out of a search query
fn extract(query: &str, key: &str) -> Option<String> {
    let start = query.find(key)? + key.len();
    let rest = &query[start..];
    if let Some(stripped) = rest.strip_prefix('"') {
        let end = stripped.find('"')?;
        Some(stripped[..end].to_string())
    } else {
        let end = rest.find(' ').unwrap_or(rest.len());
        Some(rest[..end].to_string())
    }
}

/// Pull the exact-name term `!"..."` out of a search query
fn extract_name(query: &str) -> Option<String> {
    let start = query.find("!\"")? + 2;
    let rest = &query[start..];
    let end = rest.find('"')?;
    Some(rest[..end].to_string())
}

#[async_trait]
impl CardDatabase for StubDb {
    async fn collection(
        &self,
        identifiers: &[CardIdentifier],
    ) -> Result<CollectionResponse, ScryfallError> {
        let mut sizes = self.collection_sizes.lock().unwrap();
        let call_index = sizes.len();
        sizes.push(identifiers.len());
        drop(sizes);

        if call_index < self.fail_collections {
            return Err(ScryfallError::Api(500, "stub batch failure".to_string()));
        }

        let mut data = Vec::new();
        let mut not_found = Vec::new();
        for identifier in identifiers {
            match self.cards.iter().find(|c| Self::matches(identifier, c)) {
                Some(card) => data.push(card.clone()),
                None => not_found.push(serde_json::to_value(identifier).unwrap()),
            }
        }

        Ok(CollectionResponse { data, not_found })
    }

    async fn search(&self, query: &str) -> Result<Vec<ScryfallCard>, ScryfallError> {
        self.search_queries
            .lock()
            .unwrap()
            .push(query.to_string());

        let name = extract_name(query);
        let cn = extract(query, "cn:");
        let set = extract(query, "set:");
        let lang = extract(query, "lang:");
        let promo = extract(query, "is:");

        let hits = self
            .cards
            .iter()
            .filter(|c| {
                name.as_deref()
                    .map(|n| c.name.eq_ignore_ascii_case(n))
                    .unwrap_or(true)
                    && cn
                        .as_deref()
                        .map(|v| c.collector_number.eq_ignore_ascii_case(v))
                        .unwrap_or(true)
                    && set
                        .as_deref()
                        .map(|v| c.set.eq_ignore_ascii_case(v))
                        .unwrap_or(true)
                    && lang.as_deref().map(|v| c.lang == v).unwrap_or(true)
                    && promo
                        .as_deref()
                        .map(|v| c.promo_types.iter().any(|p| p == v))
                        .unwrap_or(true)
            })
            .cloned()
            .collect();

        Ok(hits)
    }

    async fn sets(&self) -> Result<Vec<ScryfallSet>, ScryfallError> {
        Ok(self.sets.clone())
    }
}
