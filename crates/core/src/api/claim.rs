use tracing::{debug, instrument};
use wikibase_domain::{Action, Claim, ClaimGuid, EntityId, Result, Snak, SnakType, Value};

use super::Wikibase;
use crate::codec::edits::{self, missing_value};

/// Claims (statements) of an entity.
#[derive(Debug, Clone, Copy)]
pub struct Claims<'a> {
    client: &'a Wikibase,
}

impl<'a> Claims<'a> {
    pub(super) fn new(client: &'a Wikibase) -> Self {
        Self { client }
    }

    /// Create a claim on `entity` and return it with its server-assigned GUID.
    ///
    /// Not retried on transport failure: the claim may or may not exist.
    #[instrument(skip(self, snak), fields(property = %snak.property()))]
    pub async fn add(&self, entity: &EntityId, snak: &Snak) -> Result<Claim> {
        self.client.check_snak(snak)?;
        let response = self.client.execute(edits::create_claim(entity, snak)).await?;
        let claim = edits::decode_claim_response(Action::WbCreateClaim, response)?;
        debug!(guid = ?claim.id, "claim created");
        Ok(claim)
    }

    /// Shorthand for [`Claims::add`] with an explicit snak type; `value` is
    /// only used (and then required) for `value` snaks.
    pub async fn add_value(
        &self,
        entity: &EntityId,
        property: &EntityId,
        value: Option<Value>,
        snak_type: SnakType,
    ) -> Result<Claim> {
        let snak = Snak::with_type(property.clone(), snak_type, value)
            .ok_or_else(|| missing_value(property))?;
        self.add(entity, &snak).await
    }

    /// Claims of `entity`, optionally only those for `property`.
    #[instrument(skip(self))]
    pub async fn get(&self, entity: &EntityId, property: Option<&EntityId>) -> Result<Vec<Claim>> {
        let response = self.client.execute(edits::get_claims(entity, property)).await?;
        edits::decode_claims_response(response)
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, guids: &[ClaimGuid]) -> Result<()> {
        self.client.execute(edits::remove_claims(guids)?).await?;
        Ok(())
    }

    /// Replace the main snak of a claim, keeping qualifiers, references and
    /// rank.
    #[instrument(skip(self, snak))]
    pub async fn update(&self, guid: &ClaimGuid, snak: &Snak) -> Result<Claim> {
        self.client.check_snak(snak)?;
        let response = self.client.execute(edits::set_claim_value(guid, snak)).await?;
        edits::decode_claim_response(Action::WbSetClaimValue, response)
    }

    /// Store a complete claim (main snak, qualifiers, references, rank) over
    /// the stored claim with the same GUID.
    #[instrument(skip(self, claim), fields(guid = ?claim.id))]
    pub async fn set(&self, claim: &Claim) -> Result<Claim> {
        self.client.check_snak(&claim.main_snak)?;
        for qualifier in &claim.qualifiers {
            self.client.check_snak(&qualifier.snak)?;
        }
        for snak in claim.references.iter().flat_map(|r| r.snaks.iter()) {
            self.client.check_snak(snak)?;
        }
        let response = self.client.execute(edits::set_claim(claim)?).await?;
        edits::decode_claim_response(Action::WbSetClaim, response)
    }
}
