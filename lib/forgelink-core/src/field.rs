//! Request body building blocks.
//!
//! Edit endpoints distinguish three states for a field: left untouched,
//! cleared with an explicit `null`, or set. [`Field`] carries that
//! distinction through serde. Enumerated values are sent and received under
//! their wire names, declared once with [`api_enum!`](crate::api_enum).

use derive_more::{Display, Error};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A field of a request body that may be absent, null, or set.
///
/// Pair it with `#[serde(default, skip_serializing_if = "Field::is_absent")]`
/// so an absent field is left out of the JSON entirely.
///
/// ```
/// use forgelink_core::{Field, to_json};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct EditIssue {
///     #[serde(skip_serializing_if = "Field::is_absent")]
///     title: Field<String>,
///     #[serde(skip_serializing_if = "Field::is_absent")]
///     milestone: Field<u64>,
/// }
///
/// let edit = EditIssue { title: Field::Absent, milestone: Field::Null };
/// assert_eq!(to_json(&edit).unwrap().as_ref(), br#"{"milestone":null}"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Field<T> {
    /// Not sent.
    #[default]
    Absent,
    /// Sent as `null`.
    Null,
    /// Sent as the value.
    Value(T),
}

impl<T> Field<T> {
    /// Returns `true` if the field is not sent.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Returns `true` if the field is sent as `null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The value, if set.
    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Absent | Self::Null => None,
        }
    }

    /// Convert into the value, if set.
    #[must_use]
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Absent | Self::Null => None,
        }
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Self::Value)
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(value) => value.serialize(serializer),
            Self::Absent | Self::Null => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Self::from)
    }
}

/// A string did not match any wire name of an [`api_enum!`](crate::api_enum).
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("unknown {kind} value '{value}'")]
pub struct UnknownVariant {
    kind: &'static str,
    #[error(not(source))]
    value: String,
}

impl UnknownVariant {
    /// Creates a new error for enum `kind`.
    #[must_use]
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    /// Name of the enum type.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        self.kind
    }

    /// The rejected value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Declare an enum whose variants travel under fixed wire names.
///
/// Generates `as_str`, `ALL`, `Display`, `FromStr`, `Serialize` and
/// `Deserialize` from one table.
///
/// ```
/// forgelink_core::api_enum! {
///     /// Issue state filter.
///     pub enum StateType {
///         /// Open issues.
///         Open => "open",
///         /// Closed issues.
///         Closed => "closed",
///         /// Both.
///         All => "all",
///     }
/// }
///
/// assert_eq!(StateType::Closed.as_str(), "closed");
/// assert_eq!("all".parse::<StateType>().unwrap(), StateType::All);
/// ```
#[macro_export]
macro_rules! api_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $wire:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The wire name of this variant.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::UnknownVariant;

            fn from_str(value: &str) -> ::core::result::Result<Self, Self::Err> {
                match value {
                    $($wire => ::core::result::Result::Ok(Self::$variant),)+
                    _ => ::core::result::Result::Err($crate::UnknownVariant::new(
                        ::core::stringify!($name),
                        value,
                    )),
                }
            }
        }

        impl $crate::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::core::result::Result<S::Ok, S::Error>
            where
                S: $crate::serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> $crate::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: $crate::serde::Deserializer<'de>,
            {
                let value =
                    <::std::string::String as $crate::serde::Deserialize>::deserialize(deserializer)?;
                value.parse().map_err(<D::Error as $crate::serde::de::Error>::custom)
            }
        }
    };
}
