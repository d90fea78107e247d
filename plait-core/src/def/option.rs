use core::any::Any;

use crate::Shape;

/// Describes an `Option<T>`: the inner shape and a vtable to look inside.
#[derive(Clone, Copy, Debug)]
pub struct OptionDef {
    /// shape of the inner type, as a fn so recursive types can refer to themselves
    pub t: fn() -> &'static Shape,

    /// vtable for interacting with the option
    pub vtable: &'static OptionVTable,
}

impl OptionDef {
    /// Const ctor.
    pub const fn new(t: fn() -> &'static Shape, vtable: &'static OptionVTable) -> Self {
        Self { t, vtable }
    }

    /// Returns the inner type shape of the option
    #[inline]
    pub fn t(&self) -> &'static Shape {
        (self.t)()
    }
}

/// Virtual table for `Option<T>`
#[derive(Clone, Copy, Debug)]
pub struct OptionVTable {
    /// Borrows the contained value, if any.
    pub get: for<'a> fn(option: &'a dyn Any) -> Option<&'a dyn Any>,

    /// Mutably borrows the contained value, if any.
    pub get_mut: for<'a> fn(option: &'a mut dyn Any) -> Option<&'a mut dyn Any>,

    /// Builds a `None`.
    pub none: fn() -> Box<dyn Any>,

    /// Wraps a boxed `T` into a boxed `Some(T)`.
    pub some: fn(value: Box<dyn Any>) -> Option<Box<dyn Any>>,

    /// Stores `Some(value)` into the option, dropping the old content.
    pub replace: fn(option: &mut dyn Any, value: Box<dyn Any>) -> bool,
}
