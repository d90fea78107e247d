use core::any::Any;
use core::hash::Hash;
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

use crate::{
    Def, ListDef, ListIter, ListKind, ListVTable, Mappable, Shape, ShapeBuilder, default_boxed,
    shape_of,
};

fn take_items<T: Any>(items: Vec<Box<dyn Any>>) -> Option<Vec<T>> {
    items
        .into_iter()
        .map(|item| item.downcast::<T>().ok().map(|item| *item))
        .collect()
}

/// Implements [`Mappable`] for a growable container, given the bounds its
/// element needs and the method that inserts one element.
macro_rules! impl_growable {
    ($container:ident, $ident:literal, $kind:ident, $insert:ident, [$($bound:path),*]) => {
        impl<T: Mappable $(+ $bound)*> Mappable for $container<T> {
            const SHAPE: &'static Shape = &const {
                ShapeBuilder::for_type::<Self>($ident)
                    .def(Def::List(ListDef::new(
                        ListKind::$kind,
                        shape_of::<T>,
                        &const {
                            ListVTable {
                                len: {
                                    fn len<T: Mappable $(+ $bound)*>(list: &dyn Any) -> Option<usize> {
                                        list.downcast_ref::<$container<T>>().map(|list| list.len())
                                    }
                                    len::<T>
                                },
                                iter: {
                                    fn iter<T: Mappable $(+ $bound)*>(list: &dyn Any) -> Option<ListIter<'_>> {
                                        let list = list.downcast_ref::<$container<T>>()?;
                                        Some(Box::new(list.iter().map(|item| item as &dyn Any)))
                                    }
                                    iter::<T>
                                },
                                push: Some({
                                    fn push<T: Mappable $(+ $bound)*>(list: &mut dyn Any, item: Box<dyn Any>) -> bool {
                                        match (list.downcast_mut::<$container<T>>(), item.downcast::<T>()) {
                                            (Some(list), Ok(item)) => {
                                                list.$insert(*item);
                                                true
                                            }
                                            _ => false,
                                        }
                                    }
                                    push::<T>
                                }),
                                clear: Some({
                                    fn clear<T: Mappable $(+ $bound)*>(list: &mut dyn Any) -> bool {
                                        match list.downcast_mut::<$container<T>>() {
                                            Some(list) => {
                                                list.clear();
                                                true
                                            }
                                            None => false,
                                        }
                                    }
                                    clear::<T>
                                }),
                                from_items: {
                                    fn from_items<T: Mappable $(+ $bound)*>(items: Vec<Box<dyn Any>>) -> Option<Box<dyn Any>> {
                                        let items = take_items::<T>(items)?;
                                        Some(Box::new(items.into_iter().collect::<$container<T>>()))
                                    }
                                    from_items::<T>
                                },
                            }
                        },
                    )))
                    .default_fn(default_boxed::<Self>)
                    .build()
            };
        }
    };
}

impl_growable!(Vec, "Vec", List, push, []);
impl_growable!(VecDeque, "VecDeque", List, push_back, []);
impl_growable!(HashSet, "HashSet", Set, insert, [Eq, Hash]);
impl_growable!(BTreeSet, "BTreeSet", Set, insert, [Ord]);

/// Implements [`Mappable`] for a fixed slice behind a pointer. These can only
/// be rebuilt, never grown.
macro_rules! impl_fixed {
    ($pointer:ident, $ident:literal) => {
        impl<T: Mappable> Mappable for $pointer<[T]> {
            const SHAPE: &'static Shape = &const {
                ShapeBuilder::for_type::<Self>($ident)
                    .def(Def::List(ListDef::new(
                        ListKind::Array,
                        shape_of::<T>,
                        &const {
                            ListVTable {
                                len: {
                                    fn len<T: Mappable>(list: &dyn Any) -> Option<usize> {
                                        list.downcast_ref::<$pointer<[T]>>().map(|list| list.len())
                                    }
                                    len::<T>
                                },
                                iter: {
                                    fn iter<T: Mappable>(list: &dyn Any) -> Option<ListIter<'_>> {
                                        let list = list.downcast_ref::<$pointer<[T]>>()?;
                                        Some(Box::new(list.iter().map(|item| item as &dyn Any)))
                                    }
                                    iter::<T>
                                },
                                push: None,
                                clear: None,
                                from_items: {
                                    fn from_items<T: Mappable>(items: Vec<Box<dyn Any>>) -> Option<Box<dyn Any>> {
                                        let items = take_items::<T>(items)?;
                                        Some(Box::new($pointer::<[T]>::from(items)))
                                    }
                                    from_items::<T>
                                },
                            }
                        },
                    )))
                    .default_fn({
                        fn empty<T: Mappable>() -> Option<Box<dyn Any>> {
                            Some(Box::new($pointer::<[T]>::from(Vec::<T>::new())))
                        }
                        empty::<T>
                    })
                    .build()
            };
        }
    };
}

impl_fixed!(Box, "Box");
impl_fixed!(Rc, "Rc");
impl_fixed!(Arc, "Arc");
