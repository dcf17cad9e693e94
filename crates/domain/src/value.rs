//! Typed data values
//!
//! A value's shape is decided by the datatype of the property it is attached
//! to. Each supported datatype has its own variant so a mismatched payload
//! cannot be built in the first place; the statement codec only has to check
//! that the variant agrees with the target property.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ids::{EntityId, EntityType};

/// Gregorian calendar model used by default for time values.
pub const GREGORIAN_CALENDAR: &str = "http://www.wikidata.org/entity/Q1985727";

/// Earth, the default globe for coordinates.
pub const EARTH_GLOBE: &str = "http://www.wikidata.org/entity/Q2";

/// Datatype of a property, fixed when the property is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Datatype {
    String,
    Url,
    ExternalId,
    CommonsMedia,
    WikibaseItem,
    WikibaseProperty,
    WikibaseLexeme,
    WikibaseForm,
    WikibaseSense,
    MonolingualText,
    Time,
    Quantity,
    GlobeCoordinate,
    /// Any datatype this client has no dedicated variant for (`math`,
    /// `geo-shape`, `tabular-data`, ...), kept verbatim.
    Other(String),
}

impl Datatype {
    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Url => "url",
            Self::ExternalId => "external-id",
            Self::CommonsMedia => "commonsMedia",
            Self::WikibaseItem => "wikibase-item",
            Self::WikibaseProperty => "wikibase-property",
            Self::WikibaseLexeme => "wikibase-lexeme",
            Self::WikibaseForm => "wikibase-form",
            Self::WikibaseSense => "wikibase-sense",
            Self::MonolingualText => "monolingualtext",
            Self::Time => "time",
            Self::Quantity => "quantity",
            Self::GlobeCoordinate => "globe-coordinate",
            Self::Other(name) => name,
        }
    }

    /// Datatype of properties whose values point at entities of `entity_type`.
    pub fn for_entity_type(entity_type: EntityType) -> Self {
        match entity_type {
            EntityType::Item => Self::WikibaseItem,
            EntityType::Property => Self::WikibaseProperty,
            EntityType::Lexeme => Self::WikibaseLexeme,
            EntityType::Form => Self::WikibaseForm,
            EntityType::Sense => Self::WikibaseSense,
        }
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Datatype {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "string" => Self::String,
            "url" => Self::Url,
            "external-id" => Self::ExternalId,
            "commonsMedia" => Self::CommonsMedia,
            "wikibase-item" => Self::WikibaseItem,
            "wikibase-property" => Self::WikibaseProperty,
            "wikibase-lexeme" => Self::WikibaseLexeme,
            "wikibase-form" => Self::WikibaseForm,
            "wikibase-sense" => Self::WikibaseSense,
            "monolingualtext" => Self::MonolingualText,
            "time" => Self::Time,
            "quantity" => Self::Quantity,
            "globe-coordinate" => Self::GlobeCoordinate,
            other => Self::Other(other.to_string()),
        })
    }
}

impl Serialize for Datatype {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Datatype {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.parse::<Datatype>() {
            Ok(datatype) => Ok(datatype),
            Err(never) => match never {},
        }
    }
}

/// Point in time as the API represents it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeValue {
    /// ISO-8601-like timestamp with explicit sign, e.g. `+2001-01-15T00:00:00Z`.
    pub time: String,
    /// Offset from UTC in minutes.
    #[serde(default)]
    pub timezone: i32,
    #[serde(default)]
    pub before: u32,
    #[serde(default)]
    pub after: u32,
    /// 9 = year, 10 = month, 11 = day.
    pub precision: u8,
    #[serde(rename = "calendarmodel")]
    pub calendar_model: String,
}

impl TimeValue {
    pub const PRECISION_YEAR: u8 = 9;
    pub const PRECISION_MONTH: u8 = 10;
    pub const PRECISION_DAY: u8 = 11;

    /// A Gregorian date at day precision.
    pub fn date(year: i64, month: u8, day: u8) -> Self {
        let sign = if year < 0 { '-' } else { '+' };
        Self {
            time: format!("{sign}{:04}-{month:02}-{day:02}T00:00:00Z", year.unsigned_abs()),
            timezone: 0,
            before: 0,
            after: 0,
            precision: Self::PRECISION_DAY,
            calendar_model: GREGORIAN_CALENDAR.to_string(),
        }
    }

    /// A Gregorian year at year precision.
    pub fn year(year: i64) -> Self {
        let mut value = Self::date(year, 0, 0);
        value.precision = Self::PRECISION_YEAR;
        value
    }
}

/// Text in a specific language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonolingualText {
    pub text: String,
    pub language: String,
}

impl MonolingualText {
    pub fn new(text: impl Into<String>, language: impl Into<String>) -> Self {
        Self { text: text.into(), language: language.into() }
    }
}

/// Decimal amount with an optional unit and bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantity {
    /// Signed decimal string, e.g. `+10` or `-0.5`.
    pub amount: String,
    /// `1` for dimensionless quantities, otherwise the unit's concept URI.
    pub unit: String,
    #[serde(rename = "upperBound", default, skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<String>,
    #[serde(rename = "lowerBound", default, skip_serializing_if = "Option::is_none")]
    pub lower_bound: Option<String>,
}

impl Quantity {
    /// Dimensionless quantity without bounds.
    pub fn unitless(amount: impl fmt::Display) -> Self {
        let amount = amount.to_string();
        let amount = if amount.starts_with(['+', '-']) { amount } else { format!("+{amount}") };
        Self { amount, unit: "1".to_string(), upper_bound: None, lower_bound: None }
    }
}

/// Geographic coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobeCoordinate {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: Option<f64>,
    #[serde(default)]
    pub precision: Option<f64>,
    pub globe: String,
}

impl GlobeCoordinate {
    /// Coordinate on Earth.
    pub fn earth(latitude: f64, longitude: f64, precision: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: None,
            precision: Some(precision),
            globe: EARTH_GLOBE.to_string(),
        }
    }
}

/// Value payload of a `value` snak, one variant per datatype family.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Url(String),
    ExternalId(String),
    CommonsMedia(String),
    /// Reference to another entity; the datatype follows the id's entity type.
    Entity(EntityId),
    MonolingualText(MonolingualText),
    Time(TimeValue),
    Quantity(Quantity),
    GlobeCoordinate(GlobeCoordinate),
    /// Value of a datatype without a dedicated variant. `value` holds the
    /// whole `datavalue` object (`type` and `value`) as the server sent it.
    Raw { datatype: Datatype, value: serde_json::Value },
}

impl Value {
    /// The property datatype this value belongs to.
    pub fn datatype(&self) -> Datatype {
        match self {
            Self::String(_) => Datatype::String,
            Self::Url(_) => Datatype::Url,
            Self::ExternalId(_) => Datatype::ExternalId,
            Self::CommonsMedia(_) => Datatype::CommonsMedia,
            Self::Entity(id) => Datatype::for_entity_type(id.entity_type()),
            Self::MonolingualText(_) => Datatype::MonolingualText,
            Self::Time(_) => Datatype::Time,
            Self::Quantity(_) => Datatype::Quantity,
            Self::GlobeCoordinate(_) => Datatype::GlobeCoordinate,
            Self::Raw { datatype, .. } => datatype.clone(),
        }
    }

    /// Whether this value can be stored under a property of `datatype`.
    pub fn fits(&self, datatype: &Datatype) -> bool {
        self.datatype() == *datatype
    }

    /// Convenience constructor for item references.
    pub fn item(id: EntityId) -> Self {
        Self::Entity(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datatype_wire_names_roundtrip() {
        for name in ["string", "url", "external-id", "commonsMedia", "wikibase-item", "time"] {
            let datatype: Datatype = name.parse().unwrap();
            assert_eq!(datatype.as_str(), name);
        }
        let other: Datatype = "math".parse().unwrap();
        assert_eq!(other, Datatype::Other("math".into()));
    }

    #[test]
    fn entity_values_take_datatype_from_id() {
        let item = Value::item(EntityId::parse("Q2").unwrap());
        assert_eq!(item.datatype(), Datatype::WikibaseItem);
        let form = Value::Entity(EntityId::parse("L1-F2").unwrap());
        assert_eq!(form.datatype(), Datatype::WikibaseForm);
    }

    #[test]
    fn string_does_not_fit_url_property() {
        let value = Value::String("https://example.org".into());
        assert!(!value.fits(&Datatype::Url));
        assert!(Value::Url("https://example.org".into()).fits(&Datatype::Url));
    }

    #[test]
    fn time_value_formats_signed_year() {
        let date = TimeValue::date(2001, 1, 15);
        assert_eq!(date.time, "+2001-01-15T00:00:00Z");
        assert_eq!(date.precision, TimeValue::PRECISION_DAY);
        assert_eq!(TimeValue::year(-500).time, "-0500-00-00T00:00:00Z");
    }

    #[test]
    fn unitless_quantity_gets_explicit_sign() {
        assert_eq!(Quantity::unitless(10).amount, "+10");
        assert_eq!(Quantity::unitless("-3.5").amount, "-3.5");
    }
}
