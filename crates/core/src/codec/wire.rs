//! Serde mirrors of the action API's JSON shapes
//!
//! These types only describe the wire format. Conversion to and from the
//! domain model lives in the sibling modules.

use std::collections::BTreeMap;

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};

/// `{"type": ..., "value": ...}` attached to `value` snaks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireDataValue {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireSnak {
    pub snaktype: String,
    pub property: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datavalue: Option<WireDataValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
}

/// Snaks grouped by property plus the order the properties appear in.
pub type SnakGroups = BTreeMap<String, Vec<WireSnak>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default, deserialize_with = "map_or_empty_list")]
    pub snaks: SnakGroups,
    #[serde(rename = "snaks-order", default, skip_serializing_if = "Vec::is_empty")]
    pub snaks_order: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireClaim {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default = "statement_type")]
    pub kind: String,
    pub mainsnak: WireSnak,
    #[serde(default, deserialize_with = "map_or_empty_list", skip_serializing_if = "BTreeMap::is_empty")]
    pub qualifiers: SnakGroups,
    #[serde(rename = "qualifiers-order", default, skip_serializing_if = "Vec::is_empty")]
    pub qualifiers_order: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<WireReference>,
    #[serde(default = "normal_rank")]
    pub rank: String,
}

fn statement_type() -> String {
    "statement".to_string()
}

fn normal_rank() -> String {
    "normal".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireTerm {
    pub language: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WireEntity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(default, deserialize_with = "map_or_empty_list", skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, WireTerm>,
    #[serde(default, deserialize_with = "map_or_empty_list", skip_serializing_if = "BTreeMap::is_empty")]
    pub descriptions: BTreeMap<String, WireTerm>,
    #[serde(default, deserialize_with = "map_or_empty_list", skip_serializing_if = "BTreeMap::is_empty")]
    pub aliases: BTreeMap<String, Vec<WireTerm>>,
    #[serde(
        default,
        alias = "statements",
        deserialize_with = "map_or_empty_list",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub claims: BTreeMap<String, Vec<WireClaim>>,
    #[serde(default, skip_serializing)]
    pub lastrevid: Option<u64>,
    /// Present (as an empty string) when the requested entity does not exist.
    #[serde(default, skip_serializing)]
    pub missing: Option<serde_json::Value>,
}

/// One hit of `wbsearchentities`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WireSearchHit {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(rename = "match", default)]
    pub matched: Option<WireSearchMatch>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WireSearchMatch {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub language: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WireSearchResponse {
    #[serde(default)]
    pub search: Vec<WireSearchHit>,
    #[serde(rename = "search-continue", default)]
    pub search_continue: Option<u32>,
}

/// The server serializes empty maps as `[]`; accept both forms.
fn map_or_empty_list<'de, D, K, V>(deserializer: D) -> Result<BTreeMap<K, V>, D::Error>
where
    D: Deserializer<'de>,
    K: Deserialize<'de> + Ord,
    V: Deserialize<'de>,
{
    struct MapOrList<K, V>(std::marker::PhantomData<(K, V)>);

    impl<'de, K, V> Visitor<'de> for MapOrList<K, V>
    where
        K: Deserialize<'de> + Ord,
        V: Deserialize<'de>,
    {
        type Value = BTreeMap<K, V>;

        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("a map or an empty list")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut map = BTreeMap::new();
            while let Some((key, value)) = access.next_entry()? {
                map.insert(key, value);
            }
            Ok(map)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            if access.next_element::<de::IgnoredAny>()?.is_some() {
                return Err(de::Error::custom("expected an empty list"));
            }
            Ok(BTreeMap::new())
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(BTreeMap::new())
        }
    }

    deserializer.deserialize_any(MapOrList(std::marker::PhantomData))
}
