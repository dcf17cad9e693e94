//! Data values ↔ `datavalue` objects

use serde_json::json;
use wikibase_domain::{
    Datatype, EntityId, EntityType, GlobeCoordinate, MonolingualText, Quantity, Result,
    TimeValue, Value, WikibaseError,
};

use super::wire::WireDataValue;

/// Encode a value into its `datavalue` object.
pub fn encode_value(value: &Value) -> WireDataValue {
    match value {
        Value::String(text)
        | Value::Url(text)
        | Value::ExternalId(text)
        | Value::CommonsMedia(text) => data_value("string", json!(text)),
        Value::Entity(id) => data_value("wikibase-entityid", entity_payload(id)),
        Value::MonolingualText(text) => data_value("monolingualtext", json!(text)),
        Value::Time(time) => data_value("time", json!(time)),
        Value::Quantity(quantity) => data_value("quantity", json!(quantity)),
        Value::GlobeCoordinate(coordinate) => data_value("globecoordinate", json!(coordinate)),
        Value::Raw { value, .. } => match serde_json::from_value::<WireDataValue>(value.clone()) {
            Ok(data) => data,
            Err(_) => data_value("string", value.clone()),
        },
    }
}

/// The JSON text sent as the `value` parameter of snak-level edits.
///
/// This is the inner payload only; strings end up quoted.
pub fn encode_value_param(value: &Value) -> String {
    encode_value(value).value.to_string()
}

fn data_value(kind: &str, value: serde_json::Value) -> WireDataValue {
    WireDataValue { kind: kind.to_string(), value }
}

fn entity_payload(id: &EntityId) -> serde_json::Value {
    let mut payload = json!({
        "entity-type": id.entity_type().as_str(),
        "id": id.as_str(),
    });
    if let Some(numeric) = id.numeric_id() {
        payload["numeric-id"] = json!(numeric);
    }
    payload
}

/// Decode a `datavalue`, using the snak's datatype (when the server sent
/// one) to tell string-shaped datatypes apart.
///
/// # Errors
/// Returns [`WikibaseError::UnexpectedResponse`] if the payload does not
/// match its declared type.
pub fn decode_value(data: &WireDataValue, datatype: Option<&Datatype>) -> Result<Value> {
    let value = match data.kind.as_str() {
        "string" => {
            let text = data
                .value
                .as_str()
                .ok_or_else(|| malformed("string", &data.value))?
                .to_string();
            match datatype {
                None | Some(Datatype::String) => Value::String(text),
                Some(Datatype::Url) => Value::Url(text),
                Some(Datatype::ExternalId) => Value::ExternalId(text),
                Some(Datatype::CommonsMedia) => Value::CommonsMedia(text),
                Some(other) => raw(other.clone(), data),
            }
        }
        "wikibase-entityid" => Value::Entity(decode_entity_payload(&data.value)?),
        "monolingualtext" => Value::MonolingualText(parse::<MonolingualText>(data)?),
        "time" => Value::Time(parse::<TimeValue>(data)?),
        "quantity" => Value::Quantity(parse::<Quantity>(data)?),
        "globecoordinate" => Value::GlobeCoordinate(parse::<GlobeCoordinate>(data)?),
        other => {
            let datatype = datatype.cloned().unwrap_or_else(|| Datatype::Other(other.to_string()));
            raw(datatype, data)
        }
    };
    Ok(value)
}

fn raw(datatype: Datatype, data: &WireDataValue) -> Value {
    Value::Raw { datatype, value: json!(data) }
}

fn parse<T: serde::de::DeserializeOwned>(data: &WireDataValue) -> Result<T> {
    serde_json::from_value(data.value.clone()).map_err(|e| {
        WikibaseError::UnexpectedResponse(format!("malformed {} value: {e}", data.kind))
    })
}

fn decode_entity_payload(payload: &serde_json::Value) -> Result<EntityId> {
    if let Some(id) = payload.get("id").and_then(serde_json::Value::as_str) {
        return EntityId::parse(id);
    }
    let entity_type = payload
        .get("entity-type")
        .and_then(serde_json::Value::as_str)
        .and_then(|raw| raw.parse::<EntityType>().ok());
    let numeric = payload.get("numeric-id").and_then(serde_json::Value::as_u64);
    let prefix = match entity_type {
        Some(EntityType::Item) => 'Q',
        Some(EntityType::Property) => 'P',
        _ => return Err(malformed("wikibase-entityid", payload)),
    };
    match numeric {
        Some(numeric) => EntityId::parse(&format!("{prefix}{numeric}")),
        None => Err(malformed("wikibase-entityid", payload)),
    }
}

fn malformed(kind: &str, payload: &serde_json::Value) -> WikibaseError {
    WikibaseError::UnexpectedResponse(format!("malformed {kind} value: {payload}"))
}

/// Check `value` against the datatype of the property it is sent for.
///
/// # Errors
/// Returns [`WikibaseError::InvalidInput`] on a mismatch.
pub fn check_datatype(property: &EntityId, value: &Value, datatype: &Datatype) -> Result<()> {
    if value.fits(datatype) {
        Ok(())
    } else {
        Err(WikibaseError::InvalidInput(format!(
            "{property} has datatype {datatype}, but the value is {}",
            value.datatype()
        )))
    }
}
