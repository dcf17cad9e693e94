//! Request builders and response decoders for statement and term edits
//!
//! Every builder returns an [`ApiRequest`]; snak-carrying builders check the
//! value against the property datatype first when one is known.

use std::collections::BTreeMap;

use serde::Deserialize;
use wikibase_domain::{
    Action, ApiRequest, Claim, ClaimGuid, Datatype, EditSummary, EntityId, QualifierHash,
    Reference, ReferenceHash, Result, Snak, SnakType, WikibaseError,
};

use super::statements::{decode_claim, decode_reference, encode_claim, encode_reference};
use super::values::{check_datatype, encode_value, encode_value_param};
use super::wire::{WireClaim, WireReference, WireTerm};

/// Label or description; both are a single string per language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermKind {
    Label,
    Description,
}

impl TermKind {
    fn action(self) -> Action {
        match self {
            Self::Label => Action::WbSetLabel,
            Self::Description => Action::WbSetDescription,
        }
    }

    fn field(self) -> &'static str {
        match self {
            Self::Label => "labels",
            Self::Description => "descriptions",
        }
    }
}

/// An edit of one language's alias list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasEdit {
    Add(Vec<String>),
    /// Remove by exact value.
    Remove(Vec<String>),
    /// Replace the whole list; an empty list clears it.
    Set(Vec<String>),
}

/// Reject a snak whose value does not belong to its property's datatype.
///
/// The datatype recorded on the snak wins over `known`; with neither there
/// is nothing to check against.
///
/// # Errors
/// Returns [`WikibaseError::InvalidInput`] on a mismatch.
pub fn check_snak(snak: &Snak, known: Option<&Datatype>) -> Result<()> {
    let Some(value) = snak.data_value() else {
        return Ok(());
    };
    for datatype in [known, snak.datatype()].into_iter().flatten() {
        check_datatype(snak.property(), value, datatype)?;
    }
    Ok(())
}

fn snak_params(request: ApiRequest, snak: &Snak) -> ApiRequest {
    request
        .param("snaktype", snak.snak_type().as_str())
        .param_opt("value", snak.data_value().map(encode_value_param))
}

fn to_json<T: serde::Serialize>(what: &str, value: &T) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| WikibaseError::InvalidInput(format!("cannot encode {what}: {e}")))
}

fn require_some<T>(what: &str, items: &[T]) -> Result<()> {
    if items.is_empty() {
        Err(WikibaseError::InvalidInput(format!("no {what} given")))
    } else {
        Ok(())
    }
}

pub fn create_claim(entity: &EntityId, snak: &Snak) -> ApiRequest {
    let request = ApiRequest::edit(Action::WbCreateClaim)
        .param("entity", entity.as_str())
        .param("property", snak.property().as_str());
    snak_params(request, snak)
}

pub fn get_claims(entity: &EntityId, property: Option<&EntityId>) -> ApiRequest {
    ApiRequest::read(Action::WbGetClaims)
        .param("entity", entity.as_str())
        .param_opt("property", property.map(EntityId::as_str))
}

/// Replace a stored claim wholesale.
///
/// # Errors
/// Returns [`WikibaseError::InvalidInput`] if the claim has no GUID.
pub fn set_claim(claim: &Claim) -> Result<ApiRequest> {
    if claim.id.is_none() {
        return Err(WikibaseError::InvalidInput(
            "wbsetclaim needs a claim that already has a GUID".into(),
        ));
    }
    let wire = encode_claim(claim);
    Ok(ApiRequest::edit(Action::WbSetClaim).param("claim", to_json("claim", &wire)?))
}

/// Change the main snak of a stored claim. The property stays the same.
pub fn set_claim_value(guid: &ClaimGuid, snak: &Snak) -> ApiRequest {
    snak_params(ApiRequest::edit(Action::WbSetClaimValue).param("claim", guid.as_str()), snak)
}

/// # Errors
/// Returns [`WikibaseError::InvalidInput`] if `guids` is empty.
pub fn remove_claims(guids: &[ClaimGuid]) -> Result<ApiRequest> {
    require_some("claim GUIDs", guids)?;
    Ok(ApiRequest::edit(Action::WbRemoveClaims).param_list("claim", guids.iter().map(ClaimGuid::as_str)))
}

/// Add a qualifier, or replace the one identified by `current` when given.
pub fn set_qualifier(guid: &ClaimGuid, snak: &Snak, current: Option<&QualifierHash>) -> ApiRequest {
    let request = ApiRequest::edit(Action::WbSetQualifier)
        .param("claim", guid.as_str())
        .param("property", snak.property().as_str())
        .param_opt("snakhash", current.map(QualifierHash::as_str));
    snak_params(request, snak)
}

/// # Errors
/// Returns [`WikibaseError::InvalidInput`] if `hashes` is empty.
pub fn remove_qualifiers(guid: &ClaimGuid, hashes: &[QualifierHash]) -> Result<ApiRequest> {
    require_some("qualifier hashes", hashes)?;
    Ok(ApiRequest::edit(Action::WbRemoveQualifiers)
        .param("claim", guid.as_str())
        .param_list("qualifiers", hashes.iter().map(QualifierHash::as_str)))
}

/// Add a reference, or replace the one identified by `current` when given.
///
/// # Errors
/// Returns [`WikibaseError::InvalidInput`] if the reference has no snaks.
pub fn set_reference(
    guid: &ClaimGuid,
    reference: &Reference,
    current: Option<&ReferenceHash>,
) -> Result<ApiRequest> {
    require_some("reference snaks", &reference.snaks)?;
    let wire = encode_reference(reference);
    Ok(ApiRequest::edit(Action::WbSetReference)
        .param("statement", guid.as_str())
        .param("snaks", to_json("reference snaks", &wire.snaks)?)
        .param("snaks-order", to_json("snak order", &wire.snaks_order)?)
        .param_opt("reference", current.map(ReferenceHash::as_str)))
}

/// # Errors
/// Returns [`WikibaseError::InvalidInput`] if `hashes` is empty.
pub fn remove_references(guid: &ClaimGuid, hashes: &[ReferenceHash]) -> Result<ApiRequest> {
    require_some("reference hashes", hashes)?;
    Ok(ApiRequest::edit(Action::WbRemoveReferences)
        .param("statement", guid.as_str())
        .param_list("references", hashes.iter().map(ReferenceHash::as_str)))
}

/// Set a label or description. An empty `text` removes it: the `value`
/// parameter is left out entirely.
pub fn set_term(kind: TermKind, entity: &EntityId, language: &str, text: &str) -> ApiRequest {
    let value = (!text.is_empty()).then(|| text.to_string());
    ApiRequest::edit(kind.action())
        .param("id", entity.as_str())
        .param("language", language)
        .param_opt("value", value)
}

/// # Errors
/// Returns [`WikibaseError::InvalidInput`] for an add/remove without values.
pub fn set_aliases(entity: &EntityId, language: &str, edit: &AliasEdit) -> Result<ApiRequest> {
    let request =
        ApiRequest::edit(Action::WbSetAliases).param("id", entity.as_str()).param("language", language);
    Ok(match edit {
        AliasEdit::Add(values) => {
            require_some("aliases to add", values)?;
            request.param_list("add", values)
        }
        AliasEdit::Remove(values) => {
            require_some("aliases to remove", values)?;
            request.param_list("remove", values)
        }
        AliasEdit::Set(values) if values.is_empty() => request.param("set", ""),
        AliasEdit::Set(values) => request.param_list("set", values),
    })
}

/// MediaWiki page deletion; entities are removed through their page title
/// (`Q13`, `Property:P34`, ...).
///
/// # Errors
/// Returns [`WikibaseError::InvalidInput`] for an empty title.
pub fn delete_page(title: &str, reason: Option<&str>) -> Result<ApiRequest> {
    if title.trim().is_empty() {
        return Err(WikibaseError::InvalidInput("page title is empty".into()));
    }
    if let Some(reason) = reason {
        EditSummary::for_request(reason)?;
    }
    Ok(ApiRequest::edit(Action::Delete).param("title", title).param_opt("reason", reason))
}

#[derive(Deserialize)]
struct ClaimResponse {
    claim: WireClaim,
}

#[derive(Deserialize)]
struct ClaimsResponse {
    #[serde(default)]
    claims: BTreeMap<String, Vec<WireClaim>>,
}

#[derive(Deserialize)]
struct ReferenceResponse {
    reference: WireReference,
}

#[derive(Deserialize)]
struct TermEntityResponse {
    entity: TermEntity,
}

#[derive(Deserialize)]
struct TermEntity {
    #[serde(default)]
    aliases: serde_json::Value,
    #[serde(flatten)]
    rest: BTreeMap<String, serde_json::Value>,
}

fn decode<T: serde::de::DeserializeOwned>(action: Action, response: serde_json::Value) -> Result<T> {
    serde_json::from_value(response)
        .map_err(|e| WikibaseError::UnexpectedResponse(format!("{action}: {e}")))
}

/// Decode the claim echoed by `wbcreateclaim`, `wbsetclaim`,
/// `wbsetclaimvalue` and `wbsetqualifier`.
///
/// # Errors
/// Returns [`WikibaseError::UnexpectedResponse`] if there is no claim or it
/// has no GUID.
pub fn decode_claim_response(action: Action, response: serde_json::Value) -> Result<Claim> {
    let response: ClaimResponse = decode(action, response)?;
    let claim = decode_claim(&response.claim)?;
    if claim.id.is_none() {
        return Err(WikibaseError::UnexpectedResponse(format!("{action} returned a claim without id")));
    }
    Ok(claim)
}

/// # Errors
/// Returns [`WikibaseError::UnexpectedResponse`] on malformed payloads.
pub fn decode_claims_response(response: serde_json::Value) -> Result<Vec<Claim>> {
    let response: ClaimsResponse = decode(Action::WbGetClaims, response)?;
    response.claims.values().flatten().map(decode_claim).collect()
}

/// Find the hash the server gave the qualifier carrying `snak`.
///
/// The echoed qualifier is typed by the property's datatype and its value
/// normalised, so snaks are compared by their wire payload. Hashes are
/// content-derived: two qualifiers with the same content share one hash and
/// the first match is as good as any. If nothing matches but the property
/// has exactly one qualifier, that one is the qualifier just written.
///
/// # Errors
/// Returns [`WikibaseError::UnexpectedResponse`] if the claim has no such
/// qualifier.
pub fn find_qualifier_hash(claim: &Claim, snak: &Snak) -> Result<QualifierHash> {
    let sent = stored_form(snak);
    let mut candidates =
        claim.qualifiers.iter().filter(|qualifier| qualifier.snak.property() == snak.property());
    let matched = candidates
        .clone()
        .find(|qualifier| stored_form(&qualifier.snak) == sent)
        .or_else(|| match (candidates.next(), candidates.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        });
    matched.and_then(|qualifier| qualifier.hash.clone()).ok_or_else(|| {
        WikibaseError::UnexpectedResponse(format!(
            "qualifier for {} not found in the returned claim",
            snak.property()
        ))
    })
}

/// Snak type plus wire payload, with the `+` the server puts on quantity
/// numbers removed.
fn stored_form(snak: &Snak) -> (SnakType, Option<serde_json::Value>) {
    let payload = snak.data_value().map(|value| {
        let data = encode_value(value);
        let mut payload = data.value;
        if data.kind == "quantity" {
            for key in ["amount", "upperBound", "lowerBound"] {
                if let Some(serde_json::Value::String(number)) = payload.get_mut(key) {
                    if number.starts_with('+') {
                        number.remove(0);
                    }
                }
            }
        }
        payload
    });
    (snak.snak_type(), payload)
}

/// # Errors
/// Returns [`WikibaseError::UnexpectedResponse`] if there is no reference
/// or it has no hash.
pub fn decode_reference_response(response: serde_json::Value) -> Result<Reference> {
    let response: ReferenceResponse = decode(Action::WbSetReference, response)?;
    let reference = decode_reference(&response.reference)?;
    if reference.hash.is_none() {
        return Err(WikibaseError::UnexpectedResponse("wbsetreference returned no hash".into()));
    }
    Ok(reference)
}

/// Aliases for `language` after a `wbsetaliases` edit.
///
/// # Errors
/// Returns [`WikibaseError::UnexpectedResponse`] on malformed payloads.
pub fn decode_aliases_response(response: serde_json::Value, language: &str) -> Result<Vec<String>> {
    let response: TermEntityResponse = decode(Action::WbSetAliases, response)?;
    let terms = match response.entity.aliases.get(language) {
        Some(terms) => terms.clone(),
        None => return Ok(Vec::new()),
    };
    let terms: Vec<WireTerm> = decode(Action::WbSetAliases, terms)?;
    Ok(terms.into_iter().map(|term| term.value).collect())
}

/// The label or description for `language` after a term edit, `None` once
/// removed.
///
/// # Errors
/// Returns [`WikibaseError::UnexpectedResponse`] on malformed payloads.
pub fn decode_term_response(
    kind: TermKind,
    response: serde_json::Value,
    language: &str,
) -> Result<Option<String>> {
    let response: TermEntityResponse = decode(kind.action(), response)?;
    let Some(term) = response.entity.rest.get(kind.field()).and_then(|terms| terms.get(language))
    else {
        return Ok(None);
    };
    if term.get("removed").is_some() {
        return Ok(None);
    }
    let term: WireTerm = decode(kind.action(), term.clone())?;
    Ok((!term.value.is_empty()).then_some(term.value))
}

/// Turn a snak-building failure into the caller-facing error.
pub(crate) fn missing_value(property: &EntityId) -> WikibaseError {
    WikibaseError::InvalidInput(format!("a value snak for {property} needs a value"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wikibase_domain::{Quantity, Rank, TimeValue, Value};

    use super::*;

    fn id(raw: &str) -> EntityId {
        EntityId::parse(raw).unwrap()
    }

    fn guid() -> ClaimGuid {
        ClaimGuid::parse("Q13$5627445f-43cb-ed6d-3adb-760e85bd17ee").unwrap()
    }

    #[test]
    fn create_claim_defaults_to_value_snak() {
        let snak = Snak::value(id("P3"), Value::item(id("Q2")));
        let request = create_claim(&id("Q13"), &snak);
        assert_eq!(request.action, Action::WbCreateClaim);
        assert_eq!(request.get("snaktype"), Some("value"));
        assert_eq!(request.get("property"), Some("P3"));
        assert_eq!(
            request.get("value"),
            Some(r#"{"entity-type":"item","id":"Q2","numeric-id":2}"#)
        );
        assert!(request.is_edit());
    }

    #[test]
    fn novalue_claim_has_no_value_param() {
        let request = create_claim(&id("Q13"), &Snak::no_value(id("P3")));
        assert_eq!(request.get("snaktype"), Some("novalue"));
        assert_eq!(request.get("value"), None);
    }

    #[test]
    fn empty_label_is_encoded_as_removal() {
        let request = set_term(TermKind::Label, &id("Q13"), "en", "");
        assert_eq!(request.action, Action::WbSetLabel);
        assert_eq!(request.get("language"), Some("en"));
        assert_eq!(request.get("value"), None);

        let request = set_term(TermKind::Description, &id("Q13"), "nl", "een kleurboek");
        assert_eq!(request.get("value"), Some("een kleurboek"));
    }

    #[test]
    fn alias_edits_use_add_remove_and_set() {
        let add = set_aliases(&id("Q1"), "en", &AliasEdit::Add(vec!["a".into(), "b".into()])).unwrap();
        assert_eq!(add.get("add"), Some("a|b"));
        let remove = set_aliases(&id("Q1"), "en", &AliasEdit::Remove(vec!["a|b".into()])).unwrap();
        assert_eq!(remove.get("remove"), Some("\u{1f}a|b"));
        let set = set_aliases(&id("Q1"), "en", &AliasEdit::Set(vec!["c".into()])).unwrap();
        assert_eq!(set.get("set"), Some("c"));
        assert_eq!(set.get("add"), None);
        let clear = set_aliases(&id("Q1"), "en", &AliasEdit::Set(Vec::new())).unwrap();
        assert_eq!(clear.get("set"), Some(""));
        assert!(set_aliases(&id("Q1"), "en", &AliasEdit::Add(Vec::new())).is_err());
    }

    #[test]
    fn qualifier_update_carries_snakhash() {
        let snak = Snak::value(id("P20"), Value::String("De grote inkleurder".into()));
        let hash = QualifierHash::new("4dc1d1e8");
        let request = set_qualifier(&guid(), &snak, Some(&hash));
        assert_eq!(request.get("claim"), Some(guid().as_str()));
        assert_eq!(request.get("snakhash"), Some("4dc1d1e8"));
        assert_eq!(request.get("value"), Some("\"De grote inkleurder\""));
        assert_eq!(set_qualifier(&guid(), &snak, None).get("snakhash"), None);
    }

    #[test]
    fn reference_request_groups_snaks() {
        let reference = Reference::new(vec![Snak::value(id("P15"), Value::Url("https://example.org".into()))]);
        let request = set_reference(&guid(), &reference, None).unwrap();
        assert_eq!(request.get("statement"), Some(guid().as_str()));
        assert_eq!(request.get("snaks-order"), Some(r#"["P15"]"#));
        let snaks: serde_json::Value = serde_json::from_str(request.get("snaks").unwrap()).unwrap();
        assert_eq!(snaks["P15"][0]["datavalue"]["value"], json!("https://example.org"));
        assert!(set_reference(&guid(), &Reference::default(), None).is_err());
    }

    #[test]
    fn set_claim_requires_a_guid() {
        let claim = Claim::new(Snak::no_value(id("P3")));
        assert!(set_claim(&claim).is_err());
        let mut stored = claim.with_rank(Rank::Deprecated);
        stored.id = Some(guid());
        let request = set_claim(&stored).unwrap();
        let json: serde_json::Value = serde_json::from_str(request.get("claim").unwrap()).unwrap();
        assert_eq!(json["rank"], json!("deprecated"));
        assert_eq!(json["id"], json!(guid().as_str()));
    }

    #[test]
    fn removals_join_identifiers() {
        let request = remove_claims(&[guid()]).unwrap();
        assert_eq!(request.get("claim"), Some(guid().as_str()));
        let request =
            remove_qualifiers(&guid(), &[QualifierHash::new("a"), QualifierHash::new("b")]).unwrap();
        assert_eq!(request.get("qualifiers"), Some("a|b"));
        assert!(remove_references(&guid(), &[]).is_err());
    }

    #[test]
    fn datatype_mismatch_is_caught_before_sending() {
        let snak = Snak::value(id("P3"), Value::String("Q2".into()));
        assert!(matches!(
            check_snak(&snak, Some(&Datatype::WikibaseItem)),
            Err(WikibaseError::InvalidInput(_))
        ));
        assert!(check_snak(&snak, None).is_ok());
        assert!(check_snak(&Snak::no_value(id("P3")), Some(&Datatype::Time)).is_ok());
    }

    #[test]
    fn qualifier_hash_is_found_by_content() {
        let response = json!({
            "claim": {
                "id": guid().as_str(),
                "type": "statement",
                "mainsnak": {"snaktype": "novalue", "property": "P3"},
                "qualifiers": {
                    "P20": [
                        {"hash": "old", "snaktype": "value", "property": "P20", "datavalue": {"type": "string", "value": "a"}},
                        {"hash": "new", "snaktype": "value", "property": "P20", "datavalue": {"type": "string", "value": "b"}}
                    ]
                },
                "rank": "normal"
            },
            "success": 1
        });
        let claim = decode_claim_response(Action::WbSetQualifier, response).unwrap();
        let hash = find_qualifier_hash(&claim, &Snak::value(id("P20"), Value::String("b".into()))).unwrap();
        assert_eq!(hash.as_str(), "new");
        assert!(find_qualifier_hash(&claim, &Snak::no_value(id("P20"))).is_err());
    }

    fn claim_with_qualifiers(qualifiers: serde_json::Value) -> Claim {
        let response = json!({
            "claim": {
                "id": guid().as_str(),
                "type": "statement",
                "mainsnak": {"snaktype": "novalue", "property": "P3"},
                "qualifiers": qualifiers,
                "rank": "normal"
            },
            "success": 1
        });
        decode_claim_response(Action::WbSetQualifier, response).unwrap()
    }

    #[test]
    fn url_typed_echo_matches_the_string_sent() {
        let claim = claim_with_qualifiers(json!({
            "P15": [
                {"hash": "other", "snaktype": "value", "property": "P15", "datatype": "url",
                 "datavalue": {"type": "string", "value": "https://example.org/old"}},
                {"hash": "mine", "snaktype": "value", "property": "P15", "datatype": "url",
                 "datavalue": {"type": "string", "value": "https://example.org/colouring"}}
            ]
        }));
        let sent = Snak::value(id("P15"), Value::String("https://example.org/colouring".into()));
        assert_eq!(find_qualifier_hash(&claim, &sent).unwrap().as_str(), "mine");
    }

    #[test]
    fn normalised_quantity_matches_the_amount_sent() {
        let claim = claim_with_qualifiers(json!({
            "P1114": [
                {"hash": "five", "snaktype": "value", "property": "P1114",
                 "datavalue": {"type": "quantity", "value": {"amount": "+5", "unit": "1"}}},
                {"hash": "ten", "snaktype": "value", "property": "P1114",
                 "datavalue": {"type": "quantity", "value": {"amount": "+10", "unit": "1"}}}
            ]
        }));
        let amount = Quantity {
            amount: "10".into(),
            unit: "1".into(),
            upper_bound: None,
            lower_bound: None,
        };
        let sent = Snak::value(id("P1114"), Value::Quantity(amount));
        assert_eq!(find_qualifier_hash(&claim, &sent).unwrap().as_str(), "ten");
    }

    #[test]
    fn lone_qualifier_of_the_property_is_taken_when_nothing_matches() {
        let claim = claim_with_qualifiers(json!({
            "P585": [
                {"hash": "when", "snaktype": "value", "property": "P585",
                 "datavalue": {"type": "time", "value": {
                     "time": "+2019-01-01T00:00:00Z", "timezone": 0, "before": 0, "after": 0,
                     "precision": 9, "calendarmodel": "http://www.wikidata.org/entity/Q1985727"
                 }}}
            ],
            "P20": [
                {"hash": "x", "snaktype": "value", "property": "P20", "datavalue": {"type": "string", "value": "x"}}
            ]
        }));
        let sent = Snak::value(id("P585"), Value::Time(TimeValue::year(2019)));
        assert_eq!(find_qualifier_hash(&claim, &sent).unwrap().as_str(), "when");
    }

    #[test]
    fn term_responses_report_removal() {
        let removed = json!({"entity": {"labels": {"en": {"language": "en", "removed": ""}}}, "success": 1});
        assert_eq!(decode_term_response(TermKind::Label, removed, "en").unwrap(), None);
        let set = json!({"entity": {"descriptions": {"en": {"language": "en", "value": "x"}}}, "success": 1});
        assert_eq!(decode_term_response(TermKind::Description, set, "en").unwrap(), Some("x".into()));
    }

    #[test]
    fn alias_response_lists_current_aliases() {
        let response = json!({
            "entity": {"aliases": {"en": [{"language": "en", "value": "c"}]}, "lastrevid": 9},
            "success": 1
        });
        assert_eq!(decode_aliases_response(response, "en").unwrap(), vec!["c".to_string()]);
        let none = json!({"entity": {"lastrevid": 9}, "success": 1});
        assert!(decode_aliases_response(none, "en").unwrap().is_empty());
    }
}
