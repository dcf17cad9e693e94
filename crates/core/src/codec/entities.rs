//! Entities ↔ wire JSON, plus `wbgetentities` lookups

use std::collections::BTreeMap;

use serde::Deserialize;
use wikibase_domain::{
    ApiRequest, Action, Datatype, Entity, EntityContent, EntityId, EntityType, Result,
    WikibaseError,
};

use super::statements::{decode_claim, encode_claim};
use super::wire::{WireEntity, WireTerm};

/// Parts of an entity `wbgetentities` can return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityProp {
    Info,
    Labels,
    Descriptions,
    Aliases,
    Claims,
    Datatype,
    Sitelinks,
}

impl EntityProp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Labels => "labels",
            Self::Descriptions => "descriptions",
            Self::Aliases => "aliases",
            Self::Claims => "claims",
            Self::Datatype => "datatype",
            Self::Sitelinks => "sitelinks",
        }
    }
}

/// Which entities to fetch and how much of each.
///
/// Empty `props`/`languages` mean "everything" (the server default).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntityQuery {
    pub ids: Vec<EntityId>,
    pub props: Vec<EntityProp>,
    pub languages: Vec<String>,
}

impl EntityQuery {
    pub fn ids(ids: impl IntoIterator<Item = EntityId>) -> Self {
        Self { ids: ids.into_iter().collect(), ..Self::default() }
    }

    #[must_use]
    pub fn props(mut self, props: impl IntoIterator<Item = EntityProp>) -> Self {
        self.props = props.into_iter().collect();
        self
    }

    #[must_use]
    pub fn languages<S: Into<String>>(mut self, languages: impl IntoIterator<Item = S>) -> Self {
        self.languages = languages.into_iter().map(Into::into).collect();
        self
    }

    /// # Errors
    /// Returns [`WikibaseError::InvalidInput`] if no ids are given.
    pub fn to_request(&self) -> Result<ApiRequest> {
        if self.ids.is_empty() {
            return Err(WikibaseError::InvalidInput("no entity ids requested".into()));
        }
        Ok(ApiRequest::read(Action::WbGetEntities)
            .param_list("ids", self.ids.iter().map(EntityId::as_str))
            .param_list("props", self.props.iter().map(|p| p.as_str()))
            .param_list("languages", &self.languages))
    }
}

/// Result of a lookup: found entities in request order, plus the ids the
/// server reported as missing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntityLookup {
    pub entities: Vec<Entity>,
    pub missing: Vec<EntityId>,
}

impl EntityLookup {
    pub fn get(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id.as_ref() == Some(id))
    }
}

#[derive(Deserialize)]
struct EntitiesResponse {
    #[serde(default)]
    entities: BTreeMap<String, WireEntity>,
}

#[derive(Deserialize)]
struct EditEntityResponse {
    entity: WireEntity,
}

/// # Errors
/// Returns [`WikibaseError::UnexpectedResponse`] on malformed payloads.
pub fn decode_entity(wire: &WireEntity) -> Result<Entity> {
    let id = wire.id.as_deref().map(EntityId::parse).transpose().map_err(|e| {
        WikibaseError::UnexpectedResponse(e.to_string())
    })?;
    let entity_type = match wire.kind.as_deref() {
        Some(kind) => Some(kind.parse::<EntityType>().map_err(WikibaseError::UnexpectedResponse)?),
        None => id.as_ref().map(EntityId::entity_type),
    };
    let datatype = wire.datatype.as_deref().map(|raw| match raw.parse::<Datatype>() {
        Ok(datatype) => datatype,
        Err(never) => match never {},
    });
    let claims = wire
        .claims
        .values()
        .flatten()
        .map(decode_claim)
        .collect::<Result<Vec<_>>>()?;
    Ok(Entity {
        id,
        entity_type,
        datatype,
        labels: terms(&wire.labels),
        descriptions: terms(&wire.descriptions),
        aliases: wire
            .aliases
            .iter()
            .map(|(language, values)| {
                (language.clone(), values.iter().map(|term| term.value.clone()).collect())
            })
            .collect(),
        claims,
        last_revision_id: wire.lastrevid,
    })
}

fn terms(wire: &BTreeMap<String, WireTerm>) -> BTreeMap<String, String> {
    wire.iter()
        .filter(|(_, term)| !term.value.is_empty())
        .map(|(language, term)| (language.clone(), term.value.clone()))
        .collect()
}

/// The `data` JSON of `wbeditentity` for new content.
pub fn encode_content(content: &EntityContent) -> WireEntity {
    let term = |language: &String, value: &String| WireTerm {
        language: language.clone(),
        value: value.clone(),
    };
    let mut claims: BTreeMap<String, Vec<_>> = BTreeMap::new();
    for claim in &content.claims {
        claims.entry(claim.property().to_string()).or_default().push(encode_claim(claim));
    }
    WireEntity {
        datatype: content.datatype.as_ref().map(|d| d.as_str().to_string()),
        labels: content.labels.iter().map(|(l, v)| (l.clone(), term(l, v))).collect(),
        descriptions: content.descriptions.iter().map(|(l, v)| (l.clone(), term(l, v))).collect(),
        aliases: content
            .aliases
            .iter()
            .map(|(l, values)| (l.clone(), values.iter().map(|v| term(l, v)).collect()))
            .collect(),
        claims,
        ..WireEntity::default()
    }
}

/// Build `wbeditentity` with `new=<type>`.
///
/// # Errors
/// Returns [`WikibaseError::InvalidInput`] when a property is requested
/// without a datatype (or an item with one), or the type cannot be created
/// this way.
pub fn new_entity_request(entity_type: EntityType, content: &EntityContent) -> Result<ApiRequest> {
    match (entity_type, &content.datatype) {
        (EntityType::Property, None) => {
            return Err(WikibaseError::InvalidInput("a new property needs a datatype".into()))
        }
        (EntityType::Item, Some(_)) => {
            return Err(WikibaseError::InvalidInput("items do not have a datatype".into()))
        }
        (EntityType::Form | EntityType::Sense, _) => {
            return Err(WikibaseError::InvalidInput(format!(
                "{entity_type} entities are created through their lexeme"
            )))
        }
        _ => {}
    }
    let data = serde_json::to_string(&encode_content(content))
        .map_err(|e| WikibaseError::InvalidInput(format!("cannot encode entity data: {e}")))?;
    Ok(ApiRequest::edit(Action::WbEditEntity).param("new", entity_type.as_str()).param("data", data))
}

/// Decode the entity returned by `wbeditentity`.
///
/// # Errors
/// Returns [`WikibaseError::UnexpectedResponse`] if there is no entity or it
/// has no id.
pub fn decode_edit_entity(response: serde_json::Value) -> Result<Entity> {
    let response: EditEntityResponse = serde_json::from_value(response)
        .map_err(|e| WikibaseError::UnexpectedResponse(format!("wbeditentity: {e}")))?;
    let entity = decode_entity(&response.entity)?;
    if entity.id.is_none() {
        return Err(WikibaseError::UnexpectedResponse("wbeditentity returned no entity id".into()));
    }
    Ok(entity)
}

/// Decode `wbgetentities`, keeping the order of `requested`.
///
/// # Errors
/// Returns [`WikibaseError::UnexpectedResponse`] on malformed payloads.
pub fn decode_entities(response: serde_json::Value, requested: &[EntityId]) -> Result<EntityLookup> {
    let response: EntitiesResponse = serde_json::from_value(response)
        .map_err(|e| WikibaseError::UnexpectedResponse(format!("wbgetentities: {e}")))?;
    let mut lookup = EntityLookup::default();
    for id in requested {
        let wire = response
            .entities
            .get(id.as_str())
            .or_else(|| response.entities.values().find(|e| e.id.as_deref() == Some(id.as_str())));
        match wire {
            Some(wire) if wire.missing.is_none() => lookup.entities.push(decode_entity(wire)?),
            _ => lookup.missing.push(id.clone()),
        }
    }
    Ok(lookup)
}
