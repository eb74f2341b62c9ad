//! Domain identifier types with validation
//!
//! Newtype wrappers over UUIDs so that an organization id can never be passed
//! where a cell id is expected. All ids are generated client-side (v4) before
//! the corresponding record is written.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a new random identifier
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing UUID
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Parses an identifier from its hyphenated string form
            pub fn new(id: impl AsRef<str>) -> Result<Self, String> {
                let id = id.as_ref().trim();
                if id.is_empty() {
                    return Err(format!("{} cannot be empty", $label));
                }
                Uuid::parse_str(id)
                    .map(Self)
                    .map_err(|e| format!("Invalid {}: '{}' ({})", $label, id, e))
            }

            /// Returns the inner UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Consumes self and returns the inner UUID
            pub fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

uuid_id!(
    /// Organization scope that owns generations, cells and leader profiles
    ///
    /// # Examples
    ///
    /// ```
    /// use cell_import::domain::ids::OrganizationId;
    /// use std::str::FromStr;
    ///
    /// let org = OrganizationId::from_str("7d44b88c-4199-4bad-97dc-d78268e01398").unwrap();
    /// assert_eq!(org.to_string(), "7d44b88c-4199-4bad-97dc-d78268e01398");
    /// ```
    OrganizationId,
    "organization ID"
);

uuid_id!(
    /// Identifier of a generation record
    GenerationId,
    "generation ID"
);

uuid_id!(
    /// Identifier of a cell record
    CellId,
    "cell ID"
);

uuid_id!(
    /// Identity id returned by the identity provider for a leader account
    ///
    /// The leader's profile row in the store shares this id.
    LeaderId,
    "leader ID"
);
