//! Pipeline services

mod confidence_assigner;
mod lookup_pipeline;
mod result_consolidator;
pub mod scryfall_client;
mod set_resolver;

pub use confidence_assigner::ConfidenceAssigner;
pub use lookup_pipeline::LookupPipeline;
pub use result_consolidator::ResultConsolidator;
pub use scryfall_client::{CardDatabase, CollectionResponse, ScryfallClient, ScryfallError};
pub use set_resolver::{score_set_name, SearchBias, SetCatalog, SetResolution, SetResolver};
