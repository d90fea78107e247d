use core::any::Any;

use crate::Shape;

/// How a list-like container accepts new elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListKind {
    /// Fixed once built, e.g. `Box<[T]>`. Can only be replaced wholesale.
    Array,
    /// Ordered and growable, e.g. `Vec<T>`.
    List,
    /// Unordered and growable, duplicates collapse, e.g. `HashSet<T>`.
    Set,
}

/// Iterator over borrowed elements.
pub type ListIter<'a> = Box<dyn Iterator<Item = &'a dyn Any> + 'a>;

/// Describes a homogeneous sequence or set.
#[derive(Clone, Copy, Debug)]
pub struct ListDef {
    /// how the container grows
    pub kind: ListKind,

    /// shape of the elements
    pub t: fn() -> &'static Shape,

    /// vtable for interacting with the list
    pub vtable: &'static ListVTable,
}

impl ListDef {
    /// Const ctor.
    pub const fn new(kind: ListKind, t: fn() -> &'static Shape, vtable: &'static ListVTable) -> Self {
        Self { kind, t, vtable }
    }

    /// Returns the shape of the items in the list
    #[inline]
    pub fn t(&self) -> &'static Shape {
        (self.t)()
    }

    /// Whether elements can be added in place.
    pub fn is_growable(&self) -> bool {
        self.kind != ListKind::Array && self.vtable.push.is_some()
    }
}

/// Virtual table for a list-like container
#[derive(Clone, Copy, Debug)]
pub struct ListVTable {
    /// Number of elements.
    pub len: fn(list: &dyn Any) -> Option<usize>,

    /// Iterates over the elements in order.
    pub iter: for<'a> fn(list: &'a dyn Any) -> Option<ListIter<'a>>,

    /// Adds one element. Absent for fixed containers.
    pub push: Option<fn(list: &mut dyn Any, item: Box<dyn Any>) -> bool>,

    /// Removes every element. Absent for fixed containers.
    pub clear: Option<fn(list: &mut dyn Any) -> bool>,

    /// Builds a container holding exactly these elements.
    pub from_items: fn(items: Vec<Box<dyn Any>>) -> Option<Box<dyn Any>>,
}
