use tracing::{info, instrument, warn};
use wikibase_domain::{
    Claim, ClaimGuid, Entity, EntityContent, EntityId, EntityType, Reference, Result,
    WikibaseError,
};

use super::Wikibase;
use crate::codec::edits;
use crate::codec::entities::{self, EntityLookup, EntityQuery};
use crate::codec::search::{self, SearchPage, SearchQuery};

/// Items, properties and other entities.
#[derive(Debug, Clone, Copy)]
pub struct Entities<'a> {
    client: &'a Wikibase,
}

/// Outcome of [`Entities::add_with_claims`].
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedEntity {
    pub entity: Entity,
    /// The stored claims with their GUIDs, qualifier and reference hashes.
    pub claims: Vec<Claim>,
}

impl<'a> Entities<'a> {
    pub(super) fn new(client: &'a Wikibase) -> Self {
        Self { client }
    }

    /// Create an entity in one `wbeditentity` call, claims included.
    #[instrument(skip(self, content))]
    pub async fn add(&self, entity_type: EntityType, content: &EntityContent) -> Result<Entity> {
        for claim in &content.claims {
            self.client.check_snak(&claim.main_snak)?;
        }
        let request = entities::new_entity_request(entity_type, content)?;
        let response = self.client.execute(request).await?;
        let entity = entities::decode_edit_entity(response)?;
        self.client.learn_from_entity(&entity);
        info!(id = ?entity.id, "entity created");
        Ok(entity)
    }

    /// Create an entity from `content`, then add `claims` one edit at a time:
    /// each claim, then its qualifiers, then its references.
    ///
    /// A failing step stops the sequence with [`WikibaseError::StepFailed`],
    /// which lists everything created so far. Nothing is rolled back.
    #[instrument(skip(self, content, claims), fields(claims = claims.len()))]
    pub async fn add_with_claims(
        &self,
        entity_type: EntityType,
        content: &EntityContent,
        claims: &[Claim],
    ) -> Result<CreatedEntity> {
        let mut steps = StepLog::default();

        let entity = steps.run("create entity", self.add(entity_type, content)).await?;
        let Some(id) = entity.id.clone() else {
            return Err(WikibaseError::UnexpectedResponse("created entity has no id".into()));
        };
        steps.created(id.to_string());

        let mut stored = Vec::with_capacity(claims.len());
        for claim in claims {
            stored.push(self.store_claim(&mut steps, &id, claim).await?);
        }
        Ok(CreatedEntity { entity, claims: stored })
    }

    async fn store_claim(&self, steps: &mut StepLog, entity: &EntityId, claim: &Claim) -> Result<Claim> {
        let property = claim.property().clone();
        let mut created = steps
            .run(format!("add claim for {property}"), self.client.claim().add(entity, &claim.main_snak))
            .await?;
        let guid: ClaimGuid = created
            .id
            .clone()
            .ok_or_else(|| WikibaseError::UnexpectedResponse("created claim has no GUID".into()))?;
        steps.created(guid.to_string());

        if claim.rank != created.rank {
            let mut ranked = created.clone();
            ranked.rank = claim.rank;
            created = steps.run(format!("set rank of {guid}"), self.client.claim().set(&ranked)).await?;
        }

        for qualifier in &claim.qualifiers {
            let description = format!("add qualifier {} to {guid}", qualifier.snak.property());
            let hash = steps.run(description, self.client.qualifier().add(&guid, &qualifier.snak)).await?;
            steps.created(hash.to_string());
            let mut stored = qualifier.clone();
            stored.hash = Some(hash);
            created.qualifiers.push(stored);
        }

        for reference in &claim.references {
            let stored: Reference = steps
                .run(format!("add reference to {guid}"), self.client.reference().add(&guid, reference))
                .await?;
            if let Some(hash) = &stored.hash {
                steps.created(hash.to_string());
            }
            created.references.push(stored);
        }
        Ok(created)
    }

    /// Delete an entity's page. `title` is the page title, e.g. `Q13` or
    /// `Property:P34` depending on the wiki's namespace setup.
    #[instrument(skip(self))]
    pub async fn remove(&self, title: &str, reason: Option<&str>) -> Result<()> {
        self.client.execute(edits::delete_page(title, reason)?).await?;
        Ok(())
    }

    /// Fetch entities; missing ones are reported, not treated as errors.
    #[instrument(skip(self, query), fields(ids = query.ids.len()))]
    pub async fn get(&self, query: &EntityQuery) -> Result<EntityLookup> {
        let response = self.client.execute(query.to_request()?).await?;
        let lookup = entities::decode_entities(response, &query.ids)?;
        for entity in &lookup.entities {
            self.client.learn_from_entity(entity);
        }
        Ok(lookup)
    }

    /// Fetch a single entity, `None` if it does not exist.
    pub async fn get_one(&self, id: &EntityId) -> Result<Option<Entity>> {
        let mut lookup = self.get(&EntityQuery::ids([id.clone()])).await?;
        Ok(lookup.entities.pop())
    }

    #[instrument(skip(self, query), fields(text = %query.text, language = %query.language))]
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchPage> {
        let response = self.client.execute(query.to_request()?).await?;
        search::decode_search(response, query)
    }
}

/// Bookkeeping for multi-step operations.
#[derive(Debug, Default)]
struct StepLog {
    step: usize,
    created: Vec<String>,
}

impl StepLog {
    async fn run<T, F>(&mut self, description: impl Into<String>, step: F) -> Result<T>
    where
        F: std::future::Future<Output = Result<T>>,
    {
        self.step += 1;
        let description = description.into();
        step.await.map_err(|source| {
            warn!(step = self.step, %description, error = %source, "step failed, nothing rolled back");
            WikibaseError::StepFailed {
                step: self.step,
                description,
                completed: self.created.clone(),
                source: Box::new(source),
            }
        })
    }

    fn created(&mut self, id: String) {
        self.created.push(id);
    }
}
