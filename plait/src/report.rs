use core::fmt;

use crate::{ConvertError, Path};

/// Why a field was left untouched.
#[derive(Clone, Debug, PartialEq)]
pub enum SkipReason {
    /// A field or pointer could not be read or written.
    Access,
    /// No instance of the destination type could be built.
    Construction {
        /// the type that has no factory
        type_name: &'static str,
    },
    /// The value could not be converted.
    Conversion(ConvertError),
    /// The destination is a collection, the source is not.
    NotEnumerable {
        /// source type
        type_name: &'static str,
    },
    /// The two sides are different kinds of thing, e.g. a struct and a list.
    ShapeMismatch {
        /// source type
        from: &'static str,
        /// destination type
        to: &'static str,
    },
    /// Opaque values of the same type that can not be cloned.
    Unsupported {
        /// the opaque type
        type_name: &'static str,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Access => f.write_str("could not be accessed"),
            SkipReason::Construction { type_name } => {
                write!(f, "could not construct `{type_name}`")
            }
            SkipReason::Conversion(err) => write!(f, "conversion failed: {err}"),
            SkipReason::NotEnumerable { type_name } => {
                write!(f, "`{type_name}` is not a collection")
            }
            SkipReason::ShapeMismatch { from, to } => {
                write!(f, "can not map `{from}` onto `{to}`")
            }
            SkipReason::Unsupported { type_name } => {
                write!(f, "`{type_name}` can not be copied")
            }
        }
    }
}

/// A field that was skipped, and why.
#[derive(Clone, Debug, PartialEq)]
pub struct Skipped {
    /// where the field is
    pub path: Path,
    /// why it was skipped
    pub reason: SkipReason,
}

/// What a mapping call did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapReport {
    mapped: usize,
    cycles: usize,
    skipped: Vec<Skipped>,
}

impl MapReport {
    /// Number of values written: converted scalars, copied opaque values,
    /// and collections assigned or filled.
    pub fn mapped(&self) -> usize {
        self.mapped
    }

    /// Number of times an already visited source object was met again.
    pub fn cycles(&self) -> usize {
        self.cycles
    }

    /// Every skipped field, in the order they were met.
    pub fn skipped(&self) -> &[Skipped] {
        &self.skipped
    }

    /// Whether nothing was skipped.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    pub(crate) fn record_mapped(&mut self) {
        self.mapped += 1;
    }

    pub(crate) fn record_cycle(&mut self) {
        self.cycles += 1;
    }

    pub(crate) fn record_skip(&mut self, path: Path, reason: SkipReason) {
        self.skipped.push(Skipped { path, reason });
    }
}

impl fmt::Display for MapReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} mapped, {} revisited, {} skipped",
            self.mapped,
            self.cycles,
            self.skipped.len()
        )?;
        for skipped in &self.skipped {
            write!(f, "\n  {}: {}", skipped.path, skipped.reason)?;
        }
        Ok(())
    }
}
