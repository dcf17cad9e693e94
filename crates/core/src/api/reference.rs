use tracing::instrument;
use wikibase_domain::{ClaimGuid, Reference, ReferenceHash, Result};

use super::Wikibase;
use crate::codec::edits;

/// References of a claim, addressed by content hash.
#[derive(Debug, Clone, Copy)]
pub struct References<'a> {
    client: &'a Wikibase,
}

impl<'a> References<'a> {
    pub(super) fn new(client: &'a Wikibase) -> Self {
        Self { client }
    }

    /// Attach a reference; the returned copy carries the assigned hash.
    #[instrument(skip(self, reference))]
    pub async fn add(&self, guid: &ClaimGuid, reference: &Reference) -> Result<Reference> {
        self.set(guid, reference, None).await
    }

    /// Replace the reference hashed `current`.
    #[instrument(skip(self, reference))]
    pub async fn update(
        &self,
        guid: &ClaimGuid,
        current: &ReferenceHash,
        reference: &Reference,
    ) -> Result<Reference> {
        self.set(guid, reference, Some(current)).await
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, guid: &ClaimGuid, hashes: &[ReferenceHash]) -> Result<()> {
        self.client.execute(edits::remove_references(guid, hashes)?).await?;
        Ok(())
    }

    async fn set(
        &self,
        guid: &ClaimGuid,
        reference: &Reference,
        current: Option<&ReferenceHash>,
    ) -> Result<Reference> {
        for snak in &reference.snaks {
            self.client.check_snak(snak)?;
        }
        let request = edits::set_reference(guid, reference, current)?;
        let response = self.client.execute(request).await?;
        edits::decode_reference_response(response)
    }
}
