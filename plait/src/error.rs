use core::fmt;

use thiserror::Error;

use crate::{MapReport, Path};

/// Which side of a type pair a field name was looked up on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// The type values are read from
    Source,
    /// The type values are written to
    Destination,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Source => f.write_str("readable source"),
            Side::Destination => f.write_str("writable destination"),
        }
    }
}

/// Errors that abort a mapping call or a registration.
#[derive(Debug, Error)]
pub enum MapError {
    /// Objects nested deeper than [`MapOptions::max_depth`](crate::MapOptions::max_depth).
    #[error("mapping nested deeper than {max_depth} objects at `{path}`; possible circular reference")]
    DepthExceeded {
        /// the configured limit
        max_depth: usize,
        /// where the limit was hit
        path: Path,
    },

    /// A field override named a field the type does not have.
    #[error("`{type_name}` has no {side} field named `{field}`")]
    UnknownField {
        /// the type that was searched
        type_name: &'static str,
        /// which side of the pair it is
        side: Side,
        /// the name as given
        field: String,
    },

    /// Field overrides were registered for a type without named fields.
    #[error("`{type_name}` is not a struct; field overrides need named fields")]
    NotAStruct {
        /// the offending type
        type_name: &'static str,
    },

    /// Strict mode: at least one field was skipped.
    #[error("mapping incomplete: {report}")]
    Incomplete {
        /// everything that was mapped and skipped
        report: MapReport,
    },
}

/// Why a single value could not be converted.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConvertError {
    /// The source is absent and the destination is not optional.
    #[error("`{to}` can not hold a missing value")]
    Null {
        /// destination type
        to: &'static str,
    },

    /// There is no rule from one type to the other.
    #[error("no conversion from `{from}` to `{to}`")]
    Unsupported {
        /// source type
        from: &'static str,
        /// destination type
        to: &'static str,
    },

    /// A string or name did not parse as the destination type.
    #[error("`{input}` is not a valid `{to}`")]
    Parse {
        /// the offending text
        input: String,
        /// destination type
        to: &'static str,
    },

    /// The value does not fit the destination type.
    #[error("value out of range for `{to}`")]
    OutOfRange {
        /// destination type
        to: &'static str,
    },

    /// The source could not be borrowed, or a built value did not have the
    /// type its shape promised.
    #[error("value could not be accessed")]
    Access,
}
