use core::any::{Any, TypeId};
use core::fmt;

use crate::{Def, ListKind, Mappable, PointerKind};

/// Builds a fresh, default value of a type.
///
/// Returns `None` when the type has no way to construct itself.
pub type DefaultFn = fn() -> Option<Box<dyn Any>>;

/// Clones a value of the shape's type into a new box.
pub type CloneFn = fn(value: &dyn Any) -> Option<Box<dyn Any>>;

/// Overwrites `target` with `value`. Returns `false` if either has the wrong type.
pub type AssignFn = fn(target: &mut dyn Any, value: Box<dyn Any>) -> bool;

/// Per-type operations that don't depend on the [`Def`] kind.
#[derive(Clone, Copy)]
pub struct ValueVTable {
    /// cf. [`DefaultFn`]
    pub default: Option<DefaultFn>,
    /// cf. [`CloneFn`]
    pub clone: Option<CloneFn>,
    /// cf. [`AssignFn`]
    pub assign: AssignFn,
}

impl fmt::Debug for ValueVTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueVTable")
            .field("default", &self.default.is_some())
            .field("clone", &self.clone.is_some())
            .finish_non_exhaustive()
    }
}

/// Static description of a type: its identity, what kind of thing it is,
/// and how to make, copy and overwrite values of it.
#[derive(Clone, Copy)]
pub struct Shape {
    /// Short, human-readable name of the type, without generic arguments
    pub type_identifier: &'static str,

    /// Returns the `TypeId` of the described type
    pub id: fn() -> TypeId,

    /// What kind of type this is
    pub def: Def,

    /// Kind-independent operations
    pub vtable: ValueVTable,
}

impl Shape {
    /// The `TypeId` of the described type.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        (self.id)()
    }

    /// Whether both shapes describe the same Rust type.
    #[inline]
    pub fn is(&self, other: &Shape) -> bool {
        self.type_id() == other.type_id()
    }

    /// Whether this shape describes `T`.
    #[inline]
    pub fn is_type<T: Any>(&self) -> bool {
        self.type_id() == TypeId::of::<T>()
    }

    /// Strips `Option` and pointer layers, returning the shape they wrap.
    pub fn innermost(&'static self) -> &'static Shape {
        match self.def {
            Def::Option(option) => option.t().innermost(),
            Def::Pointer(pointer) => pointer.pointee().innermost(),
            _ => self,
        }
    }

    /// Whether `value` is absent: a `None` at any of the shape's `Option` layers.
    ///
    /// Pointers are not looked through, since that needs a borrow.
    pub fn is_none(&self, value: &dyn Any) -> bool {
        match self.def {
            Def::Option(option) => match (option.vtable.get)(value) {
                Some(inner) => option.t().is_none(inner),
                None => true,
            },
            _ => false,
        }
    }
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.is(other)
    }
}

impl Eq for Shape {}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shape")
            .field("type_identifier", &self.type_identifier)
            .field("def", &self.def)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.def {
            Def::Option(option) => write!(f, "Option<{}>", option.t()),
            Def::List(list) if list.kind == ListKind::Array => {
                write!(f, "{}<[{}]>", self.type_identifier, list.t())
            }
            Def::List(list) => write!(f, "{}<{}>", self.type_identifier, list.t()),
            Def::Pointer(pointer) => match pointer.kind {
                PointerKind::Box => write!(f, "Box<{}>", pointer.pointee()),
                PointerKind::RcRefCell => write!(f, "Rc<RefCell<{}>>", pointer.pointee()),
                PointerKind::ArcMutex => write!(f, "Arc<Mutex<{}>>", pointer.pointee()),
                PointerKind::ArcRwLock => write!(f, "Arc<RwLock<{}>>", pointer.pointee()),
            },
            _ => f.write_str(self.type_identifier),
        }
    }
}

/// Const builder for [`Shape`].
pub struct ShapeBuilder {
    type_identifier: &'static str,
    id: fn() -> TypeId,
    def: Def,
    vtable: ValueVTable,
}

impl ShapeBuilder {
    /// Starts a shape for `T`, assignable but without default or clone support.
    pub const fn for_type<T: Any>(type_identifier: &'static str) -> Self {
        Self {
            type_identifier,
            id: TypeId::of::<T>,
            def: Def::Opaque,
            vtable: ValueVTable {
                default: None,
                clone: None,
                assign: assign_in_place::<T>,
            },
        }
    }

    /// Sets the kind of the type.
    pub const fn def(mut self, def: Def) -> Self {
        self.def = def;
        self
    }

    /// Sets how to build a default value.
    pub const fn default_fn(mut self, default: DefaultFn) -> Self {
        self.vtable.default = Some(default);
        self
    }

    /// Sets how to clone a value.
    pub const fn clone_fn(mut self, clone: CloneFn) -> Self {
        self.vtable.clone = Some(clone);
        self
    }

    /// Finishes the shape.
    pub const fn build(self) -> Shape {
        Shape {
            type_identifier: self.type_identifier,
            id: self.id,
            def: self.def,
            vtable: self.vtable,
        }
    }
}

/// Returns the shape of `T`.
///
/// Handy as a `fn() -> &'static Shape`, which is how fields and containers
/// refer to the shapes they hold so recursive types can describe themselves.
#[inline]
pub fn shape_of<T: Mappable>() -> &'static Shape {
    T::SHAPE
}

/// [`AssignFn`] for any `T`.
pub fn assign_in_place<T: Any>(target: &mut dyn Any, value: Box<dyn Any>) -> bool {
    match (target.downcast_mut::<T>(), value.downcast::<T>()) {
        (Some(target), Ok(value)) => {
            *target = *value;
            true
        }
        _ => false,
    }
}

/// [`DefaultFn`] for any `T: Default`.
pub fn default_boxed<T: Any + Default>() -> Option<Box<dyn Any>> {
    Some(Box::new(T::default()))
}

/// [`CloneFn`] for any `T: Clone`.
pub fn clone_boxed<T: Any + Clone>(value: &dyn Any) -> Option<Box<dyn Any>> {
    value
        .downcast_ref::<T>()
        .map(|value| Box::new(value.clone()) as Box<dyn Any>)
}
