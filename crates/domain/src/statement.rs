//! Statements: snaks, qualifiers, references and claims
//!
//! A claim is layered: its main snak is the property-value core, qualifiers
//! are further snaks that contextualise it, and references are groups of
//! snaks that support it. Claims are identified by GUID, qualifiers and
//! references by content hash.

use crate::ids::{ClaimGuid, EntityId, QualifierHash, ReferenceHash};
use crate::impl_wire_enum_conversions;
use crate::value::{Datatype, Value};

/// Whether a snak carries a concrete value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SnakType {
    #[default]
    Value,
    /// Some value exists but is unknown.
    SomeValue,
    /// The property has no value.
    NoValue,
}

impl_wire_enum_conversions!(SnakType {
    Value => "value",
    SomeValue => "somevalue",
    NoValue => "novalue",
});

/// Rank of a claim among the claims for the same property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rank {
    Preferred,
    #[default]
    Normal,
    Deprecated,
}

impl_wire_enum_conversions!(Rank {
    Preferred => "preferred",
    Normal => "normal",
    Deprecated => "deprecated",
});

/// Property id plus value (or the absence of one).
///
/// A payload is present exactly when the snak type is [`SnakType::Value`];
/// the constructors are the only way to build one.
#[derive(Debug, Clone, PartialEq)]
pub struct Snak {
    property: EntityId,
    snak_type: SnakType,
    value: Option<Value>,
    datatype: Option<Datatype>,
}

impl Snak {
    /// A snak with a concrete value.
    pub fn value(property: EntityId, value: Value) -> Self {
        let datatype = Some(value.datatype());
        Self { property, snak_type: SnakType::Value, value: Some(value), datatype }
    }

    /// "Some unknown value".
    pub fn some_value(property: EntityId) -> Self {
        Self { property, snak_type: SnakType::SomeValue, value: None, datatype: None }
    }

    /// "No value".
    pub fn no_value(property: EntityId) -> Self {
        Self { property, snak_type: SnakType::NoValue, value: None, datatype: None }
    }

    /// Build a snak of the given type, used where the caller passes the type
    /// explicitly. A supplied value is only kept for `value` snaks.
    pub fn with_type(property: EntityId, snak_type: SnakType, value: Option<Value>) -> Option<Self> {
        match (snak_type, value) {
            (SnakType::Value, Some(value)) => Some(Self::value(property, value)),
            (SnakType::Value, None) => None,
            (SnakType::SomeValue, _) => Some(Self::some_value(property)),
            (SnakType::NoValue, _) => Some(Self::no_value(property)),
        }
    }

    /// Record the property datatype reported by the server.
    #[must_use]
    pub fn with_datatype(mut self, datatype: Datatype) -> Self {
        self.datatype = Some(datatype);
        self
    }

    pub fn property(&self) -> &EntityId {
        &self.property
    }

    pub fn snak_type(&self) -> SnakType {
        self.snak_type
    }

    pub fn data_value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Datatype of the property, if known.
    pub fn datatype(&self) -> Option<&Datatype> {
        self.datatype.as_ref()
    }
}

/// Qualifier attached to a claim.
#[derive(Debug, Clone, PartialEq)]
pub struct Qualifier {
    /// `None` until the server has stored the qualifier.
    pub hash: Option<QualifierHash>,
    pub snak: Snak,
}

impl Qualifier {
    pub fn new(snak: Snak) -> Self {
        Self { hash: None, snak }
    }
}

/// Reference supporting a claim: one or more snaks stored together.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Reference {
    pub hash: Option<ReferenceHash>,
    pub snaks: Vec<Snak>,
}

impl Reference {
    pub fn new(snaks: Vec<Snak>) -> Self {
        Self { hash: None, snaks }
    }

    /// Properties in first-appearance order.
    pub fn property_order(&self) -> Vec<EntityId> {
        let mut order: Vec<EntityId> = Vec::new();
        for snak in &self.snaks {
            if !order.contains(snak.property()) {
                order.push(snak.property().clone());
            }
        }
        order
    }
}

/// A statement about an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Claim {
    /// `None` until the server has assigned a GUID.
    pub id: Option<ClaimGuid>,
    pub main_snak: Snak,
    pub qualifiers: Vec<Qualifier>,
    pub references: Vec<Reference>,
    pub rank: Rank,
}

impl Claim {
    /// An unsaved claim with normal rank and no qualifiers or references.
    pub fn new(main_snak: Snak) -> Self {
        Self {
            id: None,
            main_snak,
            qualifiers: Vec::new(),
            references: Vec::new(),
            rank: Rank::Normal,
        }
    }

    #[must_use]
    pub fn with_qualifier(mut self, snak: Snak) -> Self {
        self.qualifiers.push(Qualifier::new(snak));
        self
    }

    #[must_use]
    pub fn with_reference(mut self, reference: Reference) -> Self {
        self.references.push(reference);
        self
    }

    #[must_use]
    pub fn with_rank(mut self, rank: Rank) -> Self {
        self.rank = rank;
        self
    }

    pub fn property(&self) -> &EntityId {
        self.main_snak.property()
    }

    /// Find a stored qualifier by hash.
    pub fn qualifier(&self, hash: &QualifierHash) -> Option<&Qualifier> {
        self.qualifiers.iter().find(|q| q.hash.as_ref() == Some(hash))
    }

    /// Qualifier properties in first-appearance order.
    pub fn qualifier_order(&self) -> Vec<EntityId> {
        let mut order: Vec<EntityId> = Vec::new();
        for qualifier in &self.qualifiers {
            if !order.contains(qualifier.snak.property()) {
                order.push(qualifier.snak.property().clone());
            }
        }
        order
    }
}
