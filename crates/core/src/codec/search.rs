//! `wbsearchentities` encoding and decoding

use wikibase_domain::{Action, ApiRequest, EntityId, EntityType, Result, WikibaseError};

use super::wire::WireSearchResponse;

/// Largest page the server accepts for regular accounts.
pub const MAX_SEARCH_LIMIT: u32 = 50;

/// A search over labels and aliases.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub text: String,
    pub language: String,
    pub entity_type: EntityType,
    pub limit: Option<u32>,
    /// Offset of the first hit (`continue` on the wire).
    pub offset: Option<u32>,
    /// Only match terms in `language`, without language fallback.
    pub strict_language: bool,
    /// Keep only hits whose label or alias equals `text` exactly.
    pub exact_match: bool,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: language.into(),
            entity_type: EntityType::Item,
            limit: None,
            offset: None,
            strict_language: false,
            exact_match: false,
        }
    }

    #[must_use]
    pub fn entity_type(mut self, entity_type: EntityType) -> Self {
        self.entity_type = entity_type;
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    #[must_use]
    pub fn strict_language(mut self, strict: bool) -> Self {
        self.strict_language = strict;
        self
    }

    #[must_use]
    pub fn exact_match(mut self, exact: bool) -> Self {
        self.exact_match = exact;
        self
    }

    /// # Errors
    /// Returns [`WikibaseError::InvalidInput`] for an empty search text or
    /// language, or a limit outside `1..=50`.
    pub fn to_request(&self) -> Result<ApiRequest> {
        if self.text.trim().is_empty() {
            return Err(WikibaseError::InvalidInput("search text is empty".into()));
        }
        if self.language.trim().is_empty() {
            return Err(WikibaseError::InvalidInput("search language is empty".into()));
        }
        if let Some(limit) = self.limit {
            if limit == 0 || limit > MAX_SEARCH_LIMIT {
                return Err(WikibaseError::InvalidInput(format!(
                    "search limit must be between 1 and {MAX_SEARCH_LIMIT}, got {limit}"
                )));
            }
        }
        Ok(ApiRequest::read(Action::WbSearchEntities)
            .param("search", self.text.clone())
            .param("language", self.language.clone())
            .param("type", self.entity_type.as_str())
            .param_opt("limit", self.limit.map(|l| l.to_string()))
            .param_opt("continue", self.offset.map(|o| o.to_string()))
            .flag("strictlanguage", self.strict_language))
    }
}

/// How a hit matched the search text.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchMatch {
    /// `label`, `alias`, `description` or `entityId`.
    pub kind: String,
    pub language: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: EntityId,
    pub label: Option<String>,
    pub description: Option<String>,
    pub aliases: Vec<String>,
    pub matched: Option<SearchMatch>,
}

/// One page of results, in the server's relevance order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchPage {
    pub hits: Vec<SearchHit>,
    /// Offset to pass for the next page, if there is one.
    pub next_offset: Option<u32>,
}

impl SearchHit {
    fn matches_exactly(&self, text: &str) -> bool {
        self.label.as_deref() == Some(text)
            || self.aliases.iter().any(|alias| alias == text)
            || self.matched.as_ref().is_some_and(|m| {
                matches!(m.kind.as_str(), "label" | "alias") && m.text == text
            })
    }
}

/// # Errors
/// Returns [`WikibaseError::UnexpectedResponse`] on malformed payloads.
pub fn decode_search(response: serde_json::Value, query: &SearchQuery) -> Result<SearchPage> {
    let response: WireSearchResponse = serde_json::from_value(response)
        .map_err(|e| WikibaseError::UnexpectedResponse(format!("wbsearchentities: {e}")))?;
    let mut hits = Vec::with_capacity(response.search.len());
    for hit in response.search {
        let id = EntityId::parse(&hit.id)
            .map_err(|e| WikibaseError::UnexpectedResponse(e.to_string()))?;
        hits.push(SearchHit {
            id,
            label: hit.label,
            description: hit.description,
            aliases: hit.aliases,
            matched: hit.matched.map(|m| SearchMatch {
                kind: m.kind,
                language: m.language,
                text: m.text,
            }),
        });
    }
    if query.exact_match {
        hits.retain(|hit| hit.matches_exactly(&query.text));
    }
    Ok(SearchPage { hits, next_offset: response.search_continue })
}
