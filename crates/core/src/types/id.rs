//! Newtype IDs for type-safe entity references.
//!
//! Identifiers are opaque strings owned by external systems (the business
//! directory, the identity provider). The `define_id!` macro creates
//! string-backed wrappers so a `UserId` can never be passed where a
//! `ClubId` is expected.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `Display`
/// - Conversion: `new()`, `as_str()`, `From<String>`, `From<&str>`
///
/// # Example
///
/// ```rust
/// # use sipclub_core::define_id;
/// define_id!(UserId);
/// define_id!(ClubId);
///
/// let user = UserId::new("u-1001");
/// let club = ClubId::new("club-sea-01");
///
/// // These are different types, so this won't compile:
/// // let _: UserId = club;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Standard entity IDs
define_id!(UserId);
define_id!(ClubId);
define_id!(BusinessId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_transparent_strings() {
        let id = ClubId::new("club-42");
        assert_eq!(id.as_str(), "club-42");
        assert_eq!(id.to_string(), "club-42");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"club-42\"");
    }

    #[test]
    fn ids_round_trip_through_serde() {
        let id: UserId = serde_json::from_str("\"u-7\"").unwrap();
        assert_eq!(id, UserId::new("u-7"));
    }
}
