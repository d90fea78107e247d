use core::any::Any;
use core::fmt;

use crate::Shape;

/// Reads a field out of its parent struct.
pub type FieldReadFn = for<'a> fn(parent: &'a dyn Any) -> Option<FieldRef<'a>>;

/// Gives mutable access to a field of its parent struct.
pub type FieldWriteFn = for<'a> fn(parent: &'a mut dyn Any) -> Option<&'a mut dyn Any>;

/// The value of a field, as read from its parent.
pub enum FieldRef<'a> {
    /// The field lives inside the parent.
    Borrowed(&'a dyn Any),
    /// The field was computed on read and only exists for this call.
    Owned(Box<dyn Any>),
}

impl FieldRef<'_> {
    /// The value itself.
    pub fn get(&self) -> &dyn Any {
        match self {
            FieldRef::Borrowed(value) => *value,
            FieldRef::Owned(value) => value.as_ref(),
        }
    }

    /// Whether the value was computed rather than borrowed from the parent.
    pub fn is_owned(&self) -> bool {
        matches!(self, FieldRef::Owned(_))
    }
}

impl fmt::Debug for FieldRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldRef::Borrowed(_) => f.write_str("FieldRef::Borrowed(..)"),
            FieldRef::Owned(_) => f.write_str("FieldRef::Owned(..)"),
        }
    }
}

/// A named member of a struct, with optional read and write access.
#[derive(Clone, Copy)]
pub struct Field {
    /// Declared name of the field
    pub name: &'static str,

    /// Shape of the field's type
    pub shape: fn() -> &'static Shape,

    /// How to read the field, if it is readable
    pub read: Option<FieldReadFn>,

    /// How to write the field, if it is writable
    pub write: Option<FieldWriteFn>,
}

impl Field {
    /// A field that can be read and written.
    pub const fn new(
        name: &'static str,
        shape: fn() -> &'static Shape,
        read: FieldReadFn,
        write: FieldWriteFn,
    ) -> Self {
        Self {
            name,
            shape,
            read: Some(read),
            write: Some(write),
        }
    }

    /// A field that can only be read, such as a computed property.
    pub const fn read_only(
        name: &'static str,
        shape: fn() -> &'static Shape,
        read: FieldReadFn,
    ) -> Self {
        Self {
            name,
            shape,
            read: Some(read),
            write: None,
        }
    }

    /// A field that can only be written.
    pub const fn write_only(
        name: &'static str,
        shape: fn() -> &'static Shape,
        write: FieldWriteFn,
    ) -> Self {
        Self {
            name,
            shape,
            read: None,
            write: Some(write),
        }
    }

    /// The shape of the field's type.
    #[inline]
    pub fn shape(&self) -> &'static Shape {
        (self.shape)()
    }

    /// Whether the field has a reader.
    #[inline]
    pub fn is_readable(&self) -> bool {
        self.read.is_some()
    }

    /// Whether the field has a writer.
    #[inline]
    pub fn is_writable(&self) -> bool {
        self.write.is_some()
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("shape", &self.shape().type_identifier)
            .field("readable", &self.is_readable())
            .field("writable", &self.is_writable())
            .finish()
    }
}
