//! # Wikibase Core
//!
//! Protocol logic with no transport attached.
//!
//! This crate contains:
//! - The statement codec: request encoding and response decoding for every
//!   supported action, including id reconstruction after creation
//! - The [`ApiSession`] port the codec's requests are executed through
//! - The operation façade ([`Wikibase`]) with one handle per resource
//!
//! ## Architecture Principles
//! - Only depends on `wikibase-domain`
//! - No HTTP, authentication or retry code; that sits behind [`ApiSession`]

pub mod api;
pub mod codec;
pub mod ports;

pub use api::{
    Aliases, Claims, CreatedEntity, Entities, Qualifiers, References, Terms, Wikibase,
};
pub use codec::{
    AliasEdit, EntityLookup, EntityProp, EntityQuery, SearchHit, SearchMatch, SearchPage,
    SearchQuery, TermKind,
};
pub use ports::ApiSession;
