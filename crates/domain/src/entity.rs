//! Entities and their terms

use std::collections::BTreeMap;

use crate::ids::{EntityId, EntityType};
use crate::statement::Claim;
use crate::value::Datatype;

/// Language code → text.
pub type TermMap = BTreeMap<String, String>;

/// An entity as returned by the server.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Entity {
    pub id: Option<EntityId>,
    pub entity_type: Option<EntityType>,
    /// Only set for properties.
    pub datatype: Option<Datatype>,
    pub labels: TermMap,
    pub descriptions: TermMap,
    pub aliases: BTreeMap<String, Vec<String>>,
    /// Claims in server order (grouped by property).
    pub claims: Vec<Claim>,
    pub last_revision_id: Option<u64>,
}

impl Entity {
    /// Label in `language`. Removed labels are absent, never empty.
    pub fn label(&self, language: &str) -> Option<&str> {
        self.labels.get(language).map(String::as_str)
    }

    pub fn description(&self, language: &str) -> Option<&str> {
        self.descriptions.get(language).map(String::as_str)
    }

    pub fn aliases(&self, language: &str) -> &[String] {
        self.aliases.get(language).map_or(&[], Vec::as_slice)
    }

    /// Claims whose main snak uses `property`.
    pub fn claims_for<'a>(&'a self, property: &'a EntityId) -> impl Iterator<Item = &'a Claim> + 'a {
        self.claims.iter().filter(move |claim| claim.property() == property)
    }
}

/// Initial content for a new entity.
///
/// Properties must carry a datatype; items must not.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntityContent {
    pub datatype: Option<Datatype>,
    pub labels: TermMap,
    pub descriptions: TermMap,
    pub aliases: BTreeMap<String, Vec<String>>,
    pub claims: Vec<Claim>,
}

impl EntityContent {
    /// Content for a new property of `datatype`.
    pub fn property(datatype: Datatype) -> Self {
        Self { datatype: Some(datatype), ..Self::default() }
    }

    #[must_use]
    pub fn with_label(mut self, language: impl Into<String>, text: impl Into<String>) -> Self {
        self.labels.insert(language.into(), text.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, language: impl Into<String>, text: impl Into<String>) -> Self {
        self.descriptions.insert(language.into(), text.into());
        self
    }

    #[must_use]
    pub fn with_alias(mut self, language: impl Into<String>, alias: impl Into<String>) -> Self {
        self.aliases.entry(language.into()).or_default().push(alias.into());
        self
    }

    #[must_use]
    pub fn with_claim(mut self, claim: Claim) -> Self {
        self.claims.push(claim);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.datatype.is_none()
            && self.labels.is_empty()
            && self.descriptions.is_empty()
            && self.aliases.is_empty()
            && self.claims.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::Snak;
    use crate::value::Value;

    #[test]
    fn missing_label_is_absent() {
        let mut entity = Entity::default();
        entity.labels.insert("nl".into(), "Koninklijke Bibliotheek".into());
        assert_eq!(entity.label("nl"), Some("Koninklijke Bibliotheek"));
        assert_eq!(entity.label("fr"), None);
        assert!(entity.aliases("fr").is_empty());
    }

    #[test]
    fn claims_for_filters_by_property() {
        let p3 = EntityId::parse("P3").unwrap();
        let p4 = EntityId::parse("P4").unwrap();
        let entity = Entity {
            claims: vec![
                Claim::new(Snak::no_value(p3.clone())),
                Claim::new(Snak::value(p4.clone(), Value::String("x".into()))),
                Claim::new(Snak::some_value(p3.clone())),
            ],
            ..Entity::default()
        };
        assert_eq!(entity.claims_for(&p3).count(), 2);
        assert_eq!(entity.claims_for(&p4).count(), 1);
    }

    #[test]
    fn content_builder_collects_aliases() {
        let content = EntityContent::default().with_alias("fr", "a").with_alias("fr", "b");
        assert_eq!(content.aliases["fr"], vec!["a".to_string(), "b".to_string()]);
        assert!(!content.is_empty());
        assert!(EntityContent::default().is_empty());
    }
}
