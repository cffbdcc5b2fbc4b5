//! Newtype IDs and record addressing.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_i64()`
/// - `From<i64>` and `Into<i64>` implementations
///
/// # Example
///
/// ```rust
/// # use roster_core::define_id;
/// define_id!(InvoiceId);
/// define_id!(NoteId);
///
/// let invoice_id = InvoiceId::new(1);
/// let note_id = NoteId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: InvoiceId = note_id;
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

define_id!(RecordId);
define_id!(UserAccountId);

/// How a customer record is addressed on the backend.
///
/// Backends that assign identifiers return an `id` with every row and the
/// panel addresses the row by it. Spreadsheet-style backends do not, and the
/// row is addressed by its position in the last loaded collection. A
/// positional key is only valid until the next insert or delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RecordKey {
    /// Stable identifier assigned by the backend.
    Id(RecordId),
    /// Position in the last loaded collection.
    Index(usize),
}

impl RecordKey {
    /// Returns `true` if the key survives concurrent inserts and deletes.
    #[must_use]
    pub const fn is_stable(&self) -> bool {
        matches!(self, Self::Id(_))
    }

    /// URL-safe form used in panel links (`id-12`, `row-3`).
    #[must_use]
    pub fn slug(&self) -> String {
        match self {
            Self::Id(id) => format!("id-{id}"),
            Self::Index(index) => format!("row-{index}"),
        }
    }
}

/// Renders the backend path segment.
impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Parses the slug produced by [`RecordKey::slug`].
impl FromStr for RecordKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(id) = s.strip_prefix("id-") {
            return id
                .parse::<i64>()
                .map(|id| Self::Id(RecordId::new(id)))
                .map_err(|e| format!("invalid record id {id:?}: {e}"));
        }
        if let Some(index) = s.strip_prefix("row-") {
            return index
                .parse::<usize>()
                .map(Self::Index)
                .map_err(|e| format!("invalid row index {index:?}: {e}"));
        }
        Err(format!("invalid record key: {s}"))
    }
}
