use crate::Shape;

mod enum_;
pub use enum_::*;

mod list;
pub use list::*;

mod option;
pub use option::*;

mod pointer;
pub use pointer::*;

mod scalar;
pub use scalar::*;

mod struct_;
pub use struct_::*;

/// The semantic definition of a shape: is it a scalar, a struct, a list?
#[derive(Clone, Copy, Debug)]
#[non_exhaustive]
pub enum Def {
    /// Nothing is known about the inside of the type. It can only be copied
    /// as a whole, through the [`ValueVTable`](crate::ValueVTable).
    Opaque,

    /// Leaf value that converts to and from a [`ScalarValue`]
    ///
    /// e.g. `u32`, `String`, `Decimal`, `NaiveDateTime`
    Scalar(ScalarDef),

    /// Fieldless enum with named variants and integer discriminants
    Enum(EnumDef),

    /// Named fields, each with its own shape
    Struct(StructDef),

    /// Homogeneous sequence or set
    ///
    /// e.g. `Vec<T>`, `HashSet<T>`, `Box<[T]>`
    List(ListDef),

    /// `Option<T>`
    Option(OptionDef),

    /// Owning or shared pointer to a single value
    ///
    /// e.g. `Box<T>`, `Rc<RefCell<T>>`, `Arc<Mutex<T>>`
    Pointer(PointerDef),
}

impl Def {
    /// Short name of the kind, for diagnostics.
    pub const fn kind(&self) -> &'static str {
        match self {
            Def::Opaque => "opaque",
            Def::Scalar(_) => "scalar",
            Def::Enum(_) => "enum",
            Def::Struct(_) => "struct",
            Def::List(_) => "list",
            Def::Option(_) => "option",
            Def::Pointer(_) => "pointer",
        }
    }
}

impl Shape {
    /// The struct definition, if this is a struct.
    pub fn as_struct(&self) -> Option<&StructDef> {
        match &self.def {
            Def::Struct(def) => Some(def),
            _ => None,
        }
    }

    /// The list definition, if this is a list.
    pub fn as_list(&self) -> Option<&ListDef> {
        match &self.def {
            Def::List(def) => Some(def),
            _ => None,
        }
    }
}
