//! Server-assigned identifiers
//!
//! Every identifier here is assigned by the remote service and is only ever
//! compared, never used to index local state. Entity ids and claim GUIDs are
//! validated for shape; snak hashes are fully opaque.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::WikibaseError;
use crate::impl_wire_enum_conversions;

/// Kind of entity an identifier refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    Item,
    Property,
    Lexeme,
    Form,
    Sense,
}

impl_wire_enum_conversions!(EntityType {
    Item => "item",
    Property => "property",
    Lexeme => "lexeme",
    Form => "form",
    Sense => "sense",
});

/// Identifier of an entity, e.g. `Q13`, `P3`, `L7`, `L7-F1`, `L7-S2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId(String);

impl EntityId {
    /// Parse and normalise (uppercase) an entity id.
    ///
    /// # Errors
    /// Returns [`WikibaseError::InvalidInput`] if the string is not a
    /// well-formed item, property, lexeme, form or sense id.
    pub fn parse(raw: &str) -> Result<Self, WikibaseError> {
        let normalised = raw.trim().to_ascii_uppercase();
        if classify(&normalised).is_some() {
            Ok(Self(normalised))
        } else {
            Err(WikibaseError::InvalidInput(format!("not an entity id: {raw:?}")))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The kind of entity this id names.
    pub fn entity_type(&self) -> EntityType {
        // Construction guarantees the id classifies.
        classify(&self.0).unwrap_or(EntityType::Item)
    }

    /// Numeric part of an item or property id (`Q13` → 13).
    ///
    /// `None` for lexemes, forms and senses, which the API does not address
    /// by `numeric-id`.
    pub fn numeric_id(&self) -> Option<u64> {
        match self.entity_type() {
            EntityType::Item | EntityType::Property => self.0[1..].parse().ok(),
            _ => None,
        }
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn classify(id: &str) -> Option<EntityType> {
    let (head, rest) = id.split_at(id.char_indices().nth(1).map_or(id.len(), |(i, _)| i));
    match head {
        "Q" if all_digits(rest) => Some(EntityType::Item),
        "P" if all_digits(rest) => Some(EntityType::Property),
        "L" => match rest.split_once('-') {
            None if all_digits(rest) => Some(EntityType::Lexeme),
            Some((lexeme, sub)) if all_digits(lexeme) => {
                if sub.starts_with('F') && all_digits(&sub[1..]) {
                    Some(EntityType::Form)
                } else if sub.starts_with('S') && all_digits(&sub[1..]) {
                    Some(EntityType::Sense)
                } else {
                    None
                }
            }
            _ => None,
        },
        _ => None,
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntityId {
    type Err = WikibaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for EntityId {
    type Error = WikibaseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EntityId> for String {
    fn from(value: EntityId) -> Self {
        value.0
    }
}

/// GUID of a claim, `<entityId>$<UUID>`, assigned when the claim is created.
///
/// The raw string is kept verbatim since the server compares it exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClaimGuid(String);

impl ClaimGuid {
    /// # Errors
    /// Returns [`WikibaseError::InvalidInput`] when the `$` separator is
    /// missing, the entity part is not an entity id or the UUID part is empty.
    pub fn parse(raw: &str) -> Result<Self, WikibaseError> {
        let invalid = || WikibaseError::InvalidInput(format!("not a claim GUID: {raw:?}"));
        let (entity, uuid) = raw.split_once('$').ok_or_else(invalid)?;
        if uuid.is_empty() || uuid.contains('$') {
            return Err(invalid());
        }
        EntityId::parse(entity).map_err(|_| invalid())?;
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The entity owning this claim.
    pub fn entity_id(&self) -> EntityId {
        let entity = self.0.split_once('$').map_or(self.0.as_str(), |(entity, _)| entity);
        // Validated in `parse`.
        EntityId(entity.to_ascii_uppercase())
    }
}

impl fmt::Display for ClaimGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ClaimGuid {
    type Err = WikibaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ClaimGuid {
    type Error = WikibaseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ClaimGuid> for String {
    fn from(value: ClaimGuid) -> Self {
        value.0
    }
}

macro_rules! content_hash {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(hash: impl Into<String>) -> Self {
                Self(hash.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

content_hash!(
    /// Content hash of a qualifier snak. Changes whenever the qualifier's
    /// property or value changes, so it is only valid until the next edit of
    /// that qualifier.
    QualifierHash
);

content_hash!(
    /// Content hash of a reference (the whole group of reference snaks).
    ReferenceHash
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_entity_kinds() {
        assert_eq!(EntityId::parse("Q13").unwrap().entity_type(), EntityType::Item);
        assert_eq!(EntityId::parse("p3").unwrap().as_str(), "P3");
        assert_eq!(EntityId::parse("L7").unwrap().entity_type(), EntityType::Lexeme);
        assert_eq!(EntityId::parse("L7-F1").unwrap().entity_type(), EntityType::Form);
        assert_eq!(EntityId::parse("L7-S2").unwrap().entity_type(), EntityType::Sense);
    }

    #[test]
    fn rejects_malformed_entity_ids() {
        for raw in ["", "Q", "X12", "Q12a", "L7-X1", "L7-F", "Property:P34", "Qé"] {
            assert!(EntityId::parse(raw).is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn numeric_id_only_for_items_and_properties() {
        assert_eq!(EntityId::parse("Q42").unwrap().numeric_id(), Some(42));
        assert_eq!(EntityId::parse("P3").unwrap().numeric_id(), Some(3));
        assert_eq!(EntityId::parse("L1-F1").unwrap().numeric_id(), None);
    }

    #[test]
    fn claim_guid_knows_its_entity() {
        let guid = ClaimGuid::parse("Q13$4D0A82B6-7845-4C32-8645-E1E2BF7E1968").unwrap();
        assert_eq!(guid.entity_id().as_str(), "Q13");
        assert_eq!(guid.as_str(), "Q13$4D0A82B6-7845-4C32-8645-E1E2BF7E1968");
    }

    #[test]
    fn claim_guid_requires_separator_and_uuid() {
        assert!(ClaimGuid::parse("Q13").is_err());
        assert!(ClaimGuid::parse("Q13$").is_err());
        assert!(ClaimGuid::parse("nope$abc").is_err());
    }

    #[test]
    fn ids_deserialize_with_validation() {
        let id: EntityId = serde_json::from_str("\"q5\"").unwrap();
        assert_eq!(id.as_str(), "Q5");
        assert!(serde_json::from_str::<EntityId>("\"banana\"").is_err());
    }
}
