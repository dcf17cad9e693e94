use tracing::instrument;
use wikibase_domain::{Action, ClaimGuid, QualifierHash, Result, Snak};

use super::Wikibase;
use crate::codec::edits;

/// Qualifiers of a claim, addressed by content hash.
#[derive(Debug, Clone, Copy)]
pub struct Qualifiers<'a> {
    client: &'a Wikibase,
}

impl<'a> Qualifiers<'a> {
    pub(super) fn new(client: &'a Wikibase) -> Self {
        Self { client }
    }

    /// Add a qualifier and return its hash.
    #[instrument(skip(self, snak), fields(property = %snak.property()))]
    pub async fn add(&self, guid: &ClaimGuid, snak: &Snak) -> Result<QualifierHash> {
        self.set(guid, snak, None).await
    }

    /// Replace the qualifier currently hashed `current`; returns the new hash.
    ///
    /// A stale hash fails with a conflict [`RemoteApi`] error
    /// (`no-such-qualifier`) rather than adding a second qualifier.
    ///
    /// [`RemoteApi`]: wikibase_domain::WikibaseError::RemoteApi
    #[instrument(skip(self, snak), fields(property = %snak.property()))]
    pub async fn update(
        &self,
        guid: &ClaimGuid,
        current: &QualifierHash,
        snak: &Snak,
    ) -> Result<QualifierHash> {
        self.set(guid, snak, Some(current)).await
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, guid: &ClaimGuid, hashes: &[QualifierHash]) -> Result<()> {
        self.client.execute(edits::remove_qualifiers(guid, hashes)?).await?;
        Ok(())
    }

    async fn set(
        &self,
        guid: &ClaimGuid,
        snak: &Snak,
        current: Option<&QualifierHash>,
    ) -> Result<QualifierHash> {
        self.client.check_snak(snak)?;
        let response = self.client.execute(edits::set_qualifier(guid, snak, current)).await?;
        let claim = edits::decode_claim_response(Action::WbSetQualifier, response)?;
        edits::find_qualifier_hash(&claim, snak)
    }
}
