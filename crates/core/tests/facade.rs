mod support;

use std::sync::Arc;

use serde_json::json;
use support::session::ScriptedSession;
use wikibase_core::{EntityQuery, SearchQuery, Wikibase};
use wikibase_domain::{
    Action, Claim, ClaimGuid, Datatype, EntityContent, EntityId, EntityType, QualifierHash,
    Rank, Reference, ReferenceHash, Snak, Value, WikibaseError,
};

fn id(raw: &str) -> EntityId {
    EntityId::parse(raw).unwrap()
}

fn guid() -> ClaimGuid {
    ClaimGuid::parse("Q13$5627445f-43cb-ed6d-3adb-760e85bd17ee").unwrap()
}

fn client(session: &ScriptedSession) -> Wikibase {
    Wikibase::new(Arc::new(session.clone()))
}

fn stored_claim(qualifier_hash: &str) -> serde_json::Value {
    json!({
        "id": guid().as_str(),
        "type": "statement",
        "mainsnak": {
            "snaktype": "value",
            "property": "P3",
            "hash": "d2b3",
            "datavalue": {"type": "wikibase-entityid", "value": {"entity-type": "item", "numeric-id": 2, "id": "Q2"}},
            "datatype": "wikibase-item"
        },
        "qualifiers": {
            "P20": [{
                "hash": qualifier_hash,
                "snaktype": "value",
                "property": "P20",
                "datavalue": {"type": "string", "value": "De grote inkleurder"},
                "datatype": "string"
            }]
        },
        "qualifiers-order": ["P20"],
        "references": [{
            "hash": "9a1f",
            "snaks": {"P15": [{"snaktype": "value", "property": "P15", "datavalue": {"type": "string", "value": "https://example.org"}, "datatype": "url"}]},
            "snaks-order": ["P15"]
        }],
        "rank": "preferred"
    })
}

#[tokio::test]
async fn removed_label_reads_back_absent() {
    let session = ScriptedSession::new()
        .respond(json!({"entity": {"labels": {"en": {"language": "en", "removed": ""}}}, "success": 1}))
        .respond(json!({"entities": {"Q13": {"id": "Q13", "type": "item", "labels": {"nl": {"language": "nl", "value": "kleurboek"}}}}}));
    let wikibase = client(&session);

    let label = wikibase.label().set(&id("Q13"), "en", "").await.unwrap();
    assert_eq!(label, None);
    let entity = wikibase.entity().get_one(&id("Q13")).await.unwrap().expect("Q13 exists");
    assert_eq!(entity.label("en"), None);

    let requests = session.requests();
    assert_eq!(requests[0].action, Action::WbSetLabel);
    assert_eq!(requests[0].get("value"), None);
}

#[tokio::test]
async fn alias_replace_all_yields_exactly_the_new_list() {
    let session = ScriptedSession::new()
        .respond(json!({"entity": {"aliases": {"en": [{"language": "en", "value": "a"}, {"language": "en", "value": "b"}]}}, "success": 1}))
        .respond(json!({"entity": {"aliases": {"en": [{"language": "en", "value": "c"}]}}, "success": 1}));
    let wikibase = client(&session);

    let after_add =
        wikibase.alias().add(&id("Q13"), "en", &["a".to_string(), "b".to_string()]).await.unwrap();
    assert_eq!(after_add, vec!["a", "b"]);
    let after_replace = wikibase.alias().replace_all(&id("Q13"), "en", &["c".to_string()]).await.unwrap();
    assert_eq!(after_replace, vec!["c"]);

    let requests = session.requests();
    assert_eq!(requests[1].get("set"), Some("c"));
    assert_eq!(requests[1].get("add"), None);
}

#[tokio::test]
async fn stale_qualifier_hash_is_a_conflict() {
    let session = ScriptedSession::new().fail(WikibaseError::remote(
        "no-such-qualifier",
        "Could not find the qualifier",
    ));
    let wikibase = client(&session);

    let snak = Snak::value(id("P20"), Value::String("nieuw".into()));
    let err = wikibase
        .qualifier()
        .update(&guid(), &QualifierHash::new("superseded"), &snak)
        .await
        .unwrap_err();

    assert!(err.is_conflict());
    assert_eq!(session.requests().len(), 1);
    assert_eq!(session.requests()[0].get("snakhash"), Some("superseded"));
}

#[tokio::test]
async fn qualifier_add_returns_the_new_hash() {
    let session = ScriptedSession::new().respond(json!({"claim": stored_claim("fresh"), "success": 1}));
    let wikibase = client(&session);

    let snak = Snak::value(id("P20"), Value::String("De grote inkleurder".into()));
    let hash = wikibase.qualifier().add(&guid(), &snak).await.unwrap();
    assert_eq!(hash.as_str(), "fresh");
}

#[tokio::test]
async fn qualifier_add_finds_the_url_typed_echo() {
    let session = ScriptedSession::new().respond(json!({
        "claim": {
            "id": guid().as_str(),
            "type": "statement",
            "mainsnak": {"snaktype": "novalue", "property": "P3"},
            "qualifiers": {
                "P15": [
                    {"hash": "b71e", "snaktype": "value", "property": "P15", "datatype": "url",
                     "datavalue": {"type": "string", "value": "https://example.org/a"}},
                    {"hash": "c04d", "snaktype": "value", "property": "P15", "datatype": "url",
                     "datavalue": {"type": "string", "value": "https://example.org/b"}}
                ]
            },
            "rank": "normal"
        },
        "success": 1
    }));
    let snak = Snak::value(id("P15"), Value::String("https://example.org/b".into()));
    let hash = client(&session).qualifier().add(&guid(), &snak).await.unwrap();
    assert_eq!(hash.as_str(), "c04d");
}

fn reference_body(hash: &str, url: &str) -> serde_json::Value {
    json!({
        "reference": {
            "hash": hash,
            "snaks": {"P15": [{"snaktype": "value", "property": "P15", "datatype": "url",
                               "datavalue": {"type": "string", "value": url}}]},
            "snaks-order": ["P15"]
        },
        "success": 1
    })
}

fn url_reference(url: &str) -> Reference {
    Reference::new(vec![Snak::value(id("P15"), Value::Url(url.into()))])
}

#[tokio::test]
async fn reference_add_returns_the_new_hash() {
    let session = ScriptedSession::new().respond(reference_body("e4a0", "https://example.org"));
    let stored =
        client(&session).reference().add(&guid(), &url_reference("https://example.org")).await.unwrap();

    assert_eq!(stored.hash, Some(ReferenceHash::new("e4a0")));
    assert_eq!(stored.snaks[0].data_value(), Some(&Value::Url("https://example.org".into())));
    let request = &session.requests()[0];
    assert_eq!(request.action, Action::WbSetReference);
    assert_eq!(request.get("statement"), Some(guid().as_str()));
    assert_eq!(request.get("reference"), None);
}

#[tokio::test]
async fn reference_update_sends_the_current_hash() {
    let session = ScriptedSession::new().respond(reference_body("77b2", "https://example.org/v2"));
    let stored = client(&session)
        .reference()
        .update(&guid(), &ReferenceHash::new("9a1f"), &url_reference("https://example.org/v2"))
        .await
        .unwrap();

    assert_eq!(stored.hash, Some(ReferenceHash::new("77b2")));
    let request = &session.requests()[0];
    assert_eq!(request.get("reference"), Some("9a1f"));
    let snaks: serde_json::Value = serde_json::from_str(request.get("snaks").unwrap()).unwrap();
    assert_eq!(snaks["P15"][0]["datavalue"]["value"], json!("https://example.org/v2"));
}

#[tokio::test]
async fn reference_remove_sends_every_hash() {
    let session = ScriptedSession::new().respond(json!({"success": 1}));
    let hashes = [ReferenceHash::new("9a1f"), ReferenceHash::new("77b2")];
    client(&session).reference().remove(&guid(), &hashes).await.unwrap();

    let request = &session.requests()[0];
    assert_eq!(request.action, Action::WbRemoveReferences);
    assert_eq!(request.get("statement"), Some(guid().as_str()));
    assert_eq!(request.get("references"), Some("9a1f|77b2"));
    assert!(request.is_edit());
}

#[tokio::test]
async fn claim_with_qualifier_and_reference_round_trips() {
    let session = ScriptedSession::new()
        .respond(json!({"claims": {"P3": [stored_claim("4dc1")]}}))
        .respond(json!({"claim": stored_claim("4dc1"), "success": 1}));
    let wikibase = client(&session);

    let claims = wikibase.claim().get(&id("Q13"), Some(&id("P3"))).await.unwrap();
    assert_eq!(claims.len(), 1);
    let original = claims[0].clone();

    let stored = wikibase.claim().set(&original).await.unwrap();
    assert_eq!(stored.property(), &id("P3"));
    assert_eq!(stored.main_snak.data_value(), Some(&Value::item(id("Q2"))));
    assert_eq!(stored.main_snak.snak_type(), original.main_snak.snak_type());
    assert_eq!(stored.qualifiers[0].hash, Some(QualifierHash::new("4dc1")));
    assert_eq!(stored.rank, Rank::Preferred);
    assert_eq!(stored, original);

    let sent: serde_json::Value =
        serde_json::from_str(session.requests()[1].get("claim").unwrap()).unwrap();
    assert_eq!(sent["qualifiers"]["P20"][0]["hash"], json!("4dc1"));
    assert_eq!(sent["references"][0]["snaks-order"], json!(["P15"]));
}

#[tokio::test]
async fn datatype_mismatch_is_rejected_before_sending() {
    let session = ScriptedSession::new()
        .respond(json!({"entities": {"P3": {"id": "P3", "type": "property", "datatype": "wikibase-item"}}}));
    let wikibase = client(&session);

    wikibase.entity().get(&EntityQuery::ids([id("P3")])).await.unwrap();
    assert_eq!(wikibase.known_datatype(&id("P3")), Some(Datatype::WikibaseItem));

    let snak = Snak::value(id("P3"), Value::String("Q2".into()));
    let err = wikibase.claim().add(&id("Q13"), &snak).await.unwrap_err();
    assert!(matches!(err, WikibaseError::InvalidInput(_)));
    assert_eq!(session.requests().len(), 1);
}

#[tokio::test]
async fn failed_step_reports_what_was_created() {
    let session = ScriptedSession::new()
        .respond(json!({"entity": {"id": "Q77", "type": "item", "lastrevid": 1}, "success": 1}))
        .respond(json!({"claim": {
            "id": "Q77$0c9a5a3e-1111-2222-3333-444455556666",
            "type": "statement",
            "mainsnak": {"snaktype": "value", "property": "P3", "datavalue": {"type": "wikibase-entityid", "value": {"entity-type": "item", "numeric-id": 2, "id": "Q2"}}, "datatype": "wikibase-item"},
            "rank": "normal"
        }, "success": 1}))
        .fail(WikibaseError::remote("permissiondenied", "You do not have permission"));
    let wikibase = client(&session);

    let claim = Claim::new(Snak::value(id("P3"), Value::item(id("Q2"))))
        .with_reference(Reference::new(vec![Snak::value(id("P15"), Value::Url("https://example.org".into()))]));
    let err = wikibase
        .entity()
        .add_with_claims(EntityType::Item, &EntityContent::default().with_label("en", "Kleurboek"), &[claim])
        .await
        .unwrap_err();

    match err {
        WikibaseError::StepFailed { step, completed, source, .. } => {
            assert_eq!(step, 3);
            assert_eq!(completed, vec!["Q77".to_string(), "Q77$0c9a5a3e-1111-2222-3333-444455556666".to_string()]);
            assert!(source.remote_error().is_some_and(|e| e.is_permission_denied()));
        }
        other => panic!("expected StepFailed, got {other:?}"),
    }
    assert_eq!(session.remaining(), 0);
    assert_eq!(session.requests().len(), 3);
}

#[tokio::test]
async fn search_preserves_server_order() {
    let session = ScriptedSession::new().respond(json!({
        "search": [{"id": "Q5", "label": "b"}, {"id": "Q1", "label": "a"}],
        "success": 1
    }));
    let wikibase = client(&session);
    let page = wikibase.entity().search(&SearchQuery::new("a", "en").limit(2)).await.unwrap();
    let ids: Vec<_> = page.hits.iter().map(|hit| hit.id.clone()).collect();
    assert_eq!(ids, vec![id("Q5"), id("Q1")]);
    assert_eq!(page.next_offset, None);
}

#[tokio::test]
async fn missing_entity_reads_back_as_none() {
    let session = ScriptedSession::new().respond(json!({"entities": {"Q404": {"id": "Q404", "missing": ""}}}));
    let entity = client(&session).entity().get_one(&id("Q404")).await.unwrap();
    assert_eq!(entity, None);
}

#[tokio::test]
async fn entity_remove_deletes_the_page() {
    let session = ScriptedSession::new().respond(json!({"delete": {"title": "Property:P34", "reason": "cleanup"}}));
    client(&session).entity().remove("Property:P34", Some("cleanup")).await.unwrap();
    let request = &session.requests()[0];
    assert_eq!(request.action, Action::Delete);
    assert_eq!(request.get("title"), Some("Property:P34"));
    assert!(request.is_edit());
}

#[tokio::test]
async fn overlong_delete_reason_is_rejected_before_sending() {
    let session = ScriptedSession::new();
    let err = client(&session).entity().remove("Q13", Some(&"r".repeat(261))).await.unwrap_err();
    assert!(matches!(err, WikibaseError::InvalidInput(_)), "got {err:?}");
    assert!(session.requests().is_empty());
}
