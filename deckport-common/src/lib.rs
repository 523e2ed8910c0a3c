//! # Deckport Common Library
//!
//! Shared code for the Deckport converter:
//! - Common error types
//! - Event types (ConvertEvent enum) and EventBus
//! - Configuration loading

pub mod config;
pub mod error;
pub mod events;

pub use error::{Error, Result};
