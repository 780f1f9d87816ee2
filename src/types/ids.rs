//! Stable identifier newtypes.
//!
//! Every identifier in the kernel is a 128-bit random value per §3.1
//! ("128-bit random at creation"). Wrapping `Uuid` in distinct newtypes
//! keeps an `EntityId` from being accidentally compared to a `FieldId`.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Macro to generate `Uuid`-backed id newtypes with common functionality.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a fresh random id.
            #[must_use]
            pub fn new() -> Self {
                $name(Uuid::new_v4())
            }

            /// Wraps an existing `Uuid`, e.g. one recovered from a snapshot.
            #[must_use]
            pub fn from_uuid(id: Uuid) -> Self {
                $name(id)
            }

            /// Returns the underlying `Uuid`.
            #[must_use]
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Identifies an entity. Unique within a world.
    EntityId
);

define_id!(
    /// Identifies a field (transient spatial effect).
    FieldId
);

define_id!(
    /// Identifies a memory-crystal.
    CrystalId
);

define_id!(
    /// Identifies a resource field.
    ResourceFieldId
);
