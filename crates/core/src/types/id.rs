//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types. The backend issues
//! 64-bit identifiers, so every ID wraps an `i64`.

use core::fmt::{Debug, Display};
use core::hash::Hash;

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_i64()`
/// - `From<i64>`, `Into<i64>` and `FromStr` implementations
///
/// # Example
///
/// ```rust
/// # use taskmanager_core::define_id;
/// define_id!(ProjectId);
/// define_id!(CommentId);
///
/// let project_id = ProjectId::new(1);
/// let comment_id = CommentId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: ProjectId = comment_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new ID from an i64 value.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the underlying i64 value.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(UserId);
define_id!(TaskId);

/// An entity with a stable, server-assigned identity.
///
/// Client-side caches match entries only through [`Identified::id`], never by
/// position, so an id must be unique within a collection and must not change
/// for the lifetime of the entity.
pub trait Identified {
    /// The identifier type.
    type Id: Copy + Eq + Hash + Debug + Display;

    /// Returns the entity's identifier.
    fn id(&self) -> Self::Id;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip_through_i64() {
        let id = TaskId::new(42);
        assert_eq!(id.as_i64(), 42);
        assert_eq!(i64::from(id), 42);
        assert_eq!(TaskId::from(42), id);
    }

    #[test]
    fn test_id_serializes_transparently() {
        let json = serde_json::to_string(&UserId::new(7)).unwrap();
        assert_eq!(json, "7");

        let parsed: UserId = serde_json::from_str("7").unwrap();
        assert_eq!(parsed, UserId::new(7));
    }

    #[test]
    fn test_id_from_str_trims() {
        assert_eq!(" 5 ".parse::<TaskId>().unwrap(), TaskId::new(5));
        assert!("five".parse::<TaskId>().is_err());
    }

    #[test]
    fn test_id_display() {
        assert_eq!(TaskId::new(3).to_string(), "3");
    }
}
