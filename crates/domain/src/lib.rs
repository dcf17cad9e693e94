//! # Wikibase Domain
//!
//! Data model and shared contracts for the Wikibase action API client.
//!
//! This crate contains:
//! - Server-assigned identifiers (entity ids, claim GUIDs, snak hashes)
//! - Typed data values, snaks, qualifiers, references and claims
//! - Entities with their labels, descriptions and aliases
//! - Request descriptors consumed by the session layer
//! - Configuration types and the credential resolver
//! - The error taxonomy shared by every layer
//!
//! ## Architecture
//! - No dependencies on other wikibase crates
//! - No I/O: everything here is pure data and validation

pub mod config;
pub mod constants;
pub mod entity;
pub mod errors;
pub mod ids;
pub mod macros;
pub mod request;
pub mod statement;
pub mod value;

// Re-export commonly used items
pub use config::{
    resolve, Credentials, EditSummary, LoginCredentials, OAuthCredentials, ResolvedConfig,
    WikibaseConfig,
};
pub use entity::{Entity, EntityContent, TermMap};
pub use errors::*;
pub use ids::{ClaimGuid, EntityId, EntityType, QualifierHash, ReferenceHash};
pub use request::{Access, Action, ApiRequest, HttpMethod};
pub use statement::{Claim, Qualifier, Rank, Reference, Snak, SnakType};
pub use value::{Datatype, GlobeCoordinate, MonolingualText, Quantity, TimeValue, Value};
