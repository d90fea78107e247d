/// Declares a struct or a fieldless enum and implements [`Mappable`](crate::Mappable) for it.
///
/// Structs must implement `Default`, and every field type must itself be
/// `Mappable`. Computed, read-only fields can follow the struct in a
/// `computed { .. }` block; each one names its type and a function from
/// `&Self` to that type.
///
/// ```
/// use plait_core::{mappable, Def, Mappable};
///
/// mappable! {
///     #[derive(Debug, Default)]
///     pub struct Person {
///         pub first: String,
///         pub last: String,
///     }
///     computed {
///         full_name: String = |person| format!("{} {}", person.first, person.last),
///     }
/// }
///
/// mappable! {
///     #[derive(Debug, Clone, Copy, PartialEq)]
///     pub enum Level {
///         Low = 1,
///         High = 10,
///     }
/// }
///
/// let Def::Struct(def) = Person::SHAPE.def else { unreachable!() };
/// assert_eq!(def.fields.len(), 3);
/// assert!(!def.field("FULL_NAME").unwrap().is_writable());
/// ```
#[macro_export]
macro_rules! mappable {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $fty:ty
            ),* $(,)?
        }
        $(
            computed {
                $( $cfield:ident : $cty:ty = $compute:expr ),* $(,)?
            }
        )?
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $fty,
            )*
        }

        impl $crate::Mappable for $name {
            const SHAPE: &'static $crate::Shape = &const {
                $crate::ShapeBuilder::for_type::<$name>(stringify!($name))
                    .def($crate::Def::Struct($crate::StructDef::new(&const {[
                        $(
                            $crate::Field::new(
                                stringify!($field),
                                $crate::shape_of::<$fty>,
                                {
                                    fn read(parent: &dyn ::core::any::Any) -> Option<$crate::FieldRef<'_>> {
                                        let parent = parent.downcast_ref::<$name>()?;
                                        Some($crate::FieldRef::Borrowed(&parent.$field))
                                    }
                                    read
                                },
                                {
                                    fn write(parent: &mut dyn ::core::any::Any) -> Option<&mut dyn ::core::any::Any> {
                                        let parent = parent.downcast_mut::<$name>()?;
                                        Some(&mut parent.$field as &mut dyn ::core::any::Any)
                                    }
                                    write
                                },
                            ),
                        )*
                        $($(
                            $crate::Field::read_only(
                                stringify!($cfield),
                                $crate::shape_of::<$cty>,
                                {
                                    fn read(parent: &dyn ::core::any::Any) -> Option<$crate::FieldRef<'_>> {
                                        let parent = parent.downcast_ref::<$name>()?;
                                        let compute: fn(&$name) -> $cty = $compute;
                                        Some($crate::FieldRef::Owned(Box::new(compute(parent))))
                                    }
                                    read
                                },
                            ),
                        )*)?
                    ]})))
                    .default_fn($crate::default_boxed::<$name>)
                    .build()
            };
        }
    };

    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident $(= $discriminant:expr)?
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant $(= $discriminant)?,
            )+
        }

        impl $crate::Mappable for $name {
            const SHAPE: &'static $crate::Shape = &const {
                $crate::ShapeBuilder::for_type::<$name>(stringify!($name))
                    .def($crate::Def::Enum($crate::EnumDef::new(
                        &const {[
                            $( $crate::Variant::new(stringify!($variant), $name::$variant as i64), )+
                        ]},
                        {
                            fn variant_index(value: &dyn ::core::any::Any) -> Option<usize> {
                                let name = match value.downcast_ref::<$name>()? {
                                    $( $name::$variant => stringify!($variant), )+
                                };
                                [$( stringify!($variant) ),+].iter().position(|variant| *variant == name)
                            }
                            variant_index
                        },
                        {
                            fn from_index(index: usize) -> Option<Box<dyn ::core::any::Any>> {
                                [$( $name::$variant ),+]
                                    .into_iter()
                                    .nth(index)
                                    .map(|value| Box::new(value) as Box<dyn ::core::any::Any>)
                            }
                            from_index
                        },
                    )))
                    .default_fn({
                        fn first_variant() -> Option<Box<dyn ::core::any::Any>> {
                            [$( $name::$variant ),+]
                                .into_iter()
                                .next()
                                .map(|value| Box::new(value) as Box<dyn ::core::any::Any>)
                        }
                        first_variant
                    })
                    .clone_fn({
                        fn clone_variant(value: &dyn ::core::any::Any) -> Option<Box<dyn ::core::any::Any>> {
                            let name = match value.downcast_ref::<$name>()? {
                                $( $name::$variant => stringify!($variant), )+
                            };
                            [$( ($name::$variant, stringify!($variant)) ),+]
                                .into_iter()
                                .find(|(_, variant)| *variant == name)
                                .map(|(value, _)| Box::new(value) as Box<dyn ::core::any::Any>)
                        }
                        clone_variant
                    })
                    .build()
            };
        }
    };
}

/// Implements [`Mappable`](crate::Mappable) for a type the mapper should copy
/// whole instead of looking inside. The type must implement `Clone`.
///
/// ```
/// use plait_core::{mappable_opaque, Def, Mappable};
///
/// #[derive(Clone, Debug, PartialEq)]
/// pub struct Rgb(pub u8, pub u8, pub u8);
///
/// mappable_opaque!(Rgb);
///
/// assert!(matches!(Rgb::SHAPE.def, Def::Opaque));
/// ```
#[macro_export]
macro_rules! mappable_opaque {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Mappable for $ty {
                const SHAPE: &'static $crate::Shape = &const {
                    $crate::ShapeBuilder::for_type::<$ty>(stringify!($ty))
                        .clone_fn($crate::clone_boxed::<$ty>)
                        .build()
                };
            }
        )+
    };
}
