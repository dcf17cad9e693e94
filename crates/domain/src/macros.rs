//! Macro for wire-name conversions of closed string enums
//!
//! The action API spells enum-like fields (`rank`, `snaktype`, entity types)
//! as fixed lowercase strings. This macro generates `as_str`, `Display`,
//! `FromStr` and serde impls from a single mapping so the wire spelling
//! lives in exactly one place.
//!
//! # Example
//!
//! ```rust
//! use wikibase_domain::impl_wire_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Rank {
//!     Preferred,
//!     Normal,
//!     Deprecated,
//! }
//!
//! impl_wire_enum_conversions!(Rank {
//!     Preferred => "preferred",
//!     Normal => "normal",
//!     Deprecated => "deprecated",
//! });
//!
//! assert_eq!(Rank::Normal.as_str(), "normal");
//! assert_eq!("PREFERRED".parse::<Rank>().unwrap(), Rank::Preferred);
//! ```

/// Implements `as_str`, Display, FromStr, Serialize and Deserialize for a
/// fieldless enum with a fixed wire spelling per variant.
///
/// Parsing is case-insensitive; output always uses the wire spelling.
#[macro_export]
macro_rules! impl_wire_enum_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Wire spelling of this variant.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }

        impl serde::Serialize for $enum_name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $enum_name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}
