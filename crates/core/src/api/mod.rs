//! Operation façade
//!
//! [`Wikibase`] hands out one lightweight handle per resource. Each handle
//! method is one logical operation: encode with the codec, execute through
//! the session port, decode the response.

mod claim;
mod entity;
mod qualifier;
mod reference;
mod terms;

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use wikibase_domain::{ApiRequest, Datatype, Entity, EntityId, Result, Snak};

pub use claim::Claims;
pub use entity::{CreatedEntity, Entities};
pub use qualifier::Qualifiers;
pub use reference::References;
pub use terms::{Aliases, Terms};

use crate::codec::edits::{check_snak, TermKind};
use crate::ports::ApiSession;

/// Client for one Wikibase instance.
///
/// Cheap to clone; clones share the session.
#[derive(Clone)]
pub struct Wikibase {
    session: Arc<dyn ApiSession>,
    datatypes: Arc<DatatypeRegistry>,
}

impl std::fmt::Debug for Wikibase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wikibase").finish_non_exhaustive()
    }
}

impl Wikibase {
    pub fn new(session: Arc<dyn ApiSession>) -> Self {
        Self { session, datatypes: Arc::new(DatatypeRegistry::default()) }
    }

    pub fn entity(&self) -> Entities<'_> {
        Entities::new(self)
    }

    pub fn claim(&self) -> Claims<'_> {
        Claims::new(self)
    }

    pub fn qualifier(&self) -> Qualifiers<'_> {
        Qualifiers::new(self)
    }

    pub fn reference(&self) -> References<'_> {
        References::new(self)
    }

    pub fn label(&self) -> Terms<'_> {
        Terms::new(self, TermKind::Label)
    }

    pub fn description(&self) -> Terms<'_> {
        Terms::new(self, TermKind::Description)
    }

    pub fn alias(&self) -> Aliases<'_> {
        Aliases::new(self)
    }

    /// Tell the client a property's datatype so values sent for it can be
    /// checked locally. Properties fetched or created through this client are
    /// recorded automatically.
    pub fn register_datatype(&self, property: EntityId, datatype: Datatype) {
        self.datatypes.insert(property, datatype);
    }

    /// The datatype recorded for `property`, if any.
    pub fn known_datatype(&self, property: &EntityId) -> Option<Datatype> {
        self.datatypes.get(property)
    }

    pub(crate) async fn execute(&self, request: ApiRequest) -> Result<serde_json::Value> {
        self.session.execute(request).await
    }

    pub(crate) fn check_snak(&self, snak: &Snak) -> Result<()> {
        check_snak(snak, self.known_datatype(snak.property()).as_ref())
    }

    /// Record the datatype of a property entity.
    pub(crate) fn learn_from_entity(&self, entity: &Entity) {
        if let (Some(id), Some(datatype)) = (&entity.id, &entity.datatype) {
            self.datatypes.insert(id.clone(), datatype.clone());
        }
    }
}

/// Known property datatypes. A property's datatype is fixed at creation.
#[derive(Debug, Default)]
struct DatatypeRegistry {
    known: RwLock<HashMap<EntityId, Datatype>>,
}

impl DatatypeRegistry {
    fn insert(&self, property: EntityId, datatype: Datatype) {
        self.known.write().unwrap_or_else(PoisonError::into_inner).insert(property, datatype);
    }

    fn get(&self, property: &EntityId) -> Option<Datatype> {
        self.known.read().unwrap_or_else(PoisonError::into_inner).get(property).cloned()
    }
}
