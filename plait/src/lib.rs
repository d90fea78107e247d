#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

#[macro_use]
mod tracing_macros;

pub use plait_core::*;

mod cache;
pub use cache::{FieldMapping, TypePair, TypeShape};

mod collection;

mod convert;
pub use convert::{convert, convert_value, is_simple};

mod error;
pub use error::{ConvertError, MapError, Side};

mod factory;
pub use factory::create_instance;

mod graph;

mod mapper;
pub use mapper::Mapper;

mod options;
pub use options::{CollectionMode, MapOptions};

mod path;
pub use path::{Path, PathSegment};

mod registry;
pub use registry::FieldOverrides;

mod report;
pub use report::{MapReport, SkipReason, Skipped};

// Parsing of the text forms of dates, times, spans and UUIDs
mod temporal;
