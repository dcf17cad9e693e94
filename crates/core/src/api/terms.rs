use tracing::instrument;
use wikibase_domain::{EntityId, Result};

use super::Wikibase;
use crate::codec::edits::{self, AliasEdit, TermKind};

/// Labels or descriptions, one string per language.
#[derive(Debug, Clone, Copy)]
pub struct Terms<'a> {
    client: &'a Wikibase,
    kind: TermKind,
}

impl<'a> Terms<'a> {
    pub(super) fn new(client: &'a Wikibase, kind: TermKind) -> Self {
        Self { client, kind }
    }

    /// Set the term for `language`; an empty `text` removes it.
    ///
    /// Returns the stored term, `None` after a removal.
    #[instrument(skip(self, text), fields(kind = ?self.kind))]
    pub async fn set(&self, entity: &EntityId, language: &str, text: &str) -> Result<Option<String>> {
        let response = self.client.execute(edits::set_term(self.kind, entity, language, text)).await?;
        edits::decode_term_response(self.kind, response, language)
    }
}

/// Aliases, a list of strings per language.
#[derive(Debug, Clone, Copy)]
pub struct Aliases<'a> {
    client: &'a Wikibase,
}

impl<'a> Aliases<'a> {
    pub(super) fn new(client: &'a Wikibase) -> Self {
        Self { client }
    }

    /// Append aliases; returns the aliases for `language` afterwards.
    pub async fn add(&self, entity: &EntityId, language: &str, aliases: &[String]) -> Result<Vec<String>> {
        self.edit(entity, language, AliasEdit::Add(aliases.to_vec())).await
    }

    /// Replace every alias for `language` with `aliases`.
    pub async fn replace_all(
        &self,
        entity: &EntityId,
        language: &str,
        aliases: &[String],
    ) -> Result<Vec<String>> {
        self.edit(entity, language, AliasEdit::Set(aliases.to_vec())).await
    }

    /// Remove aliases matching these exact values.
    pub async fn remove(&self, entity: &EntityId, language: &str, aliases: &[String]) -> Result<Vec<String>> {
        self.edit(entity, language, AliasEdit::Remove(aliases.to_vec())).await
    }

    #[instrument(skip(self))]
    async fn edit(&self, entity: &EntityId, language: &str, edit: AliasEdit) -> Result<Vec<String>> {
        let request = edits::set_aliases(entity, language, &edit)?;
        let response = self.client.execute(request).await?;
        edits::decode_aliases_response(response, language)
    }
}
