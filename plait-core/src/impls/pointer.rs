use core::any::Any;
use core::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex, RwLock, TryLockError};

use crate::{
    Def, Mappable, PointerDef, PointerKind, PointerVTable, Shape, ShapeBuilder, shape_of,
};

// Box<T>

fn box_new<T: Mappable>(pointee: Box<dyn Any>) -> Option<Box<dyn Any>> {
    let pointee = pointee.downcast::<T>().ok()?;
    Some(Box::new(pointee))
}

fn box_borrow<T: Mappable>(pointer: &dyn Any, f: &mut dyn FnMut(&dyn Any)) -> bool {
    match pointer.downcast_ref::<Box<T>>() {
        Some(pointer) => {
            f(&**pointer);
            true
        }
        None => false,
    }
}

fn box_borrow_mut<T: Mappable>(pointer: &mut dyn Any, f: &mut dyn FnMut(&mut dyn Any)) -> bool {
    match pointer.downcast_mut::<Box<T>>() {
        Some(pointer) => {
            f(&mut **pointer);
            true
        }
        None => false,
    }
}

fn box_default<T: Mappable>() -> Option<Box<dyn Any>> {
    let pointee = T::SHAPE.vtable.default?()?;
    box_new::<T>(pointee)
}

impl<T: Mappable> Mappable for Box<T> {
    const SHAPE: &'static Shape = &const {
        ShapeBuilder::for_type::<Self>("Box")
            .def(Def::Pointer(PointerDef::new(
                PointerKind::Box,
                shape_of::<T>,
                &const {
                    PointerVTable {
                        new: box_new::<T>,
                        borrow: box_borrow::<T>,
                        borrow_mut: box_borrow_mut::<T>,
                        address: None,
                        share: None,
                    }
                },
            )))
            .default_fn(box_default::<T>)
            .build()
    };
}

/// Implements [`Mappable`] for a shared pointer to an interior-mutable cell.
///
/// `$borrow` and `$borrow_mut` turn a `&$pointer<$cell<T>>` into a guard, or
/// `None` when the cell is busy. The address of the allocation is the
/// identity of the pointee.
macro_rules! impl_shared {
    (
        $pointer:ident<$cell:ident>, $kind:ident, $ident:literal,
        borrow: |$b:ident| $borrow:expr,
        borrow_mut: |$bm:ident| $borrow_mut:expr $(,)?
    ) => {
        impl<T: Mappable> Mappable for $pointer<$cell<T>> {
            const SHAPE: &'static Shape = &const {
                ShapeBuilder::for_type::<Self>($ident)
                    .def(Def::Pointer(PointerDef::new(
                        PointerKind::$kind,
                        shape_of::<T>,
                        &const {
                            PointerVTable {
                                new: {
                                    fn new<T: Mappable>(pointee: Box<dyn Any>) -> Option<Box<dyn Any>> {
                                        let pointee = pointee.downcast::<T>().ok()?;
                                        Some(Box::new($pointer::new($cell::new(*pointee))))
                                    }
                                    new::<T>
                                },
                                borrow: {
                                    fn borrow<T: Mappable>(pointer: &dyn Any, f: &mut dyn FnMut(&dyn Any)) -> bool {
                                        let Some($b) = pointer.downcast_ref::<$pointer<$cell<T>>>() else {
                                            return false;
                                        };
                                        let Some(guard) = ($borrow) else {
                                            return false;
                                        };
                                        f(&*guard);
                                        true
                                    }
                                    borrow::<T>
                                },
                                borrow_mut: {
                                    fn borrow_mut<T: Mappable>(pointer: &mut dyn Any, f: &mut dyn FnMut(&mut dyn Any)) -> bool {
                                        let Some($bm) = pointer.downcast_ref::<$pointer<$cell<T>>>() else {
                                            return false;
                                        };
                                        let Some(mut guard) = ($borrow_mut) else {
                                            return false;
                                        };
                                        f(&mut *guard);
                                        true
                                    }
                                    borrow_mut::<T>
                                },
                                address: Some({
                                    fn address<T: Mappable>(pointer: &dyn Any) -> Option<usize> {
                                        let pointer = pointer.downcast_ref::<$pointer<$cell<T>>>()?;
                                        Some($pointer::as_ptr(pointer).cast::<()>().addr())
                                    }
                                    address::<T>
                                }),
                                share: Some({
                                    fn share<T: Mappable>(pointer: &dyn Any) -> Option<Box<dyn Any>> {
                                        let pointer = pointer.downcast_ref::<$pointer<$cell<T>>>()?;
                                        Some(Box::new($pointer::clone(pointer)))
                                    }
                                    share::<T>
                                }),
                            }
                        },
                    )))
                    .default_fn({
                        fn default<T: Mappable>() -> Option<Box<dyn Any>> {
                            let pointee = T::SHAPE.vtable.default?()?.downcast::<T>().ok()?;
                            Some(Box::new($pointer::new($cell::new(*pointee))))
                        }
                        default::<T>
                    })
                    .build()
            };
        }
    };
}

impl_shared!(
    Rc<RefCell>, RcRefCell, "Rc",
    borrow: |cell| cell.try_borrow().ok(),
    borrow_mut: |cell| cell.try_borrow_mut().ok(),
);

// A poisoned lock still holds a usable value; only contention is a failure.
impl_shared!(
    Arc<Mutex>, ArcMutex, "Arc",
    borrow: |lock| match lock.try_lock() {
        Ok(guard) => Some(guard),
        Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
        Err(TryLockError::WouldBlock) => None,
    },
    borrow_mut: |lock| match lock.try_lock() {
        Ok(guard) => Some(guard),
        Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
        Err(TryLockError::WouldBlock) => None,
    },
);

impl_shared!(
    Arc<RwLock>, ArcRwLock, "Arc",
    borrow: |lock| match lock.try_read() {
        Ok(guard) => Some(guard),
        Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
        Err(TryLockError::WouldBlock) => None,
    },
    borrow_mut: |lock| match lock.try_write() {
        Ok(guard) => Some(guard),
        Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
        Err(TryLockError::WouldBlock) => None,
    },
);
