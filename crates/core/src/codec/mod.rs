//! Statement codec: domain model ↔ action API parameters and JSON
//!
//! Encoders produce [`ApiRequest`](wikibase_domain::ApiRequest)s, decoders
//! take the JSON body of a successful response (error objects are handled by
//! the session layer before a decoder ever sees them).

pub mod edits;
pub mod entities;
pub mod search;
pub mod statements;
pub mod values;
pub mod wire;

pub use edits::{AliasEdit, TermKind};
pub use entities::{EntityLookup, EntityProp, EntityQuery};
pub use search::{SearchHit, SearchMatch, SearchPage, SearchQuery};
