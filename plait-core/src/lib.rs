#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

use core::any::Any;

mod macros;

mod shape;
pub use shape::*;

mod field;
pub use field::*;

mod def;
pub use def::*;

// Shapes for std, chrono, rust_decimal and uuid types
mod impls;

/// A type the mapper can look inside.
///
/// The shape is a `'static` description of the type, built at compile time.
/// Implement it with [`mappable!`] for your own structs and enums, or with
/// [`mappable_opaque!`] for types that should be copied whole.
pub trait Mappable: Any {
    /// The shape of this type.
    const SHAPE: &'static Shape;
}
