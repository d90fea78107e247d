use core::any::Any;

use crate::Shape;

/// Which pointer a [`PointerDef`] describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerKind {
    /// `Box<T>`: owned, never shared
    Box,
    /// `Rc<RefCell<T>>`
    RcRefCell,
    /// `Arc<Mutex<T>>`
    ArcMutex,
    /// `Arc<RwLock<T>>`
    ArcRwLock,
}

/// Borrows the pointee for the duration of the callback.
///
/// Returns `false` if the pointer has the wrong type or the pointee is
/// currently borrowed elsewhere; the callback is not called then.
pub type BorrowFn = fn(pointer: &dyn Any, f: &mut dyn FnMut(&dyn Any)) -> bool;

/// Mutably borrows the pointee for the duration of the callback.
pub type BorrowMutFn = fn(pointer: &mut dyn Any, f: &mut dyn FnMut(&mut dyn Any)) -> bool;

/// Describes a pointer to a single value.
#[derive(Clone, Copy, Debug)]
pub struct PointerDef {
    /// which pointer this is
    pub kind: PointerKind,

    /// shape of the pointee
    pub pointee: fn() -> &'static Shape,

    /// vtable for interacting with the pointer
    pub vtable: &'static PointerVTable,
}

impl PointerDef {
    /// Const ctor.
    pub const fn new(
        kind: PointerKind,
        pointee: fn() -> &'static Shape,
        vtable: &'static PointerVTable,
    ) -> Self {
        Self {
            kind,
            pointee,
            vtable,
        }
    }

    /// Shape of the pointee.
    #[inline]
    pub fn pointee(&self) -> &'static Shape {
        (self.pointee)()
    }

    /// Whether several pointers can point at the same allocation.
    #[inline]
    pub fn is_shared(&self) -> bool {
        self.vtable.share.is_some()
    }
}

/// Virtual table for a pointer
#[derive(Clone, Copy, Debug)]
pub struct PointerVTable {
    /// Moves a boxed pointee into a new pointer.
    pub new: fn(pointee: Box<dyn Any>) -> Option<Box<dyn Any>>,

    /// cf. [`BorrowFn`]
    pub borrow: BorrowFn,

    /// cf. [`BorrowMutFn`]
    pub borrow_mut: BorrowMutFn,

    /// Address of the shared allocation. Two pointers with the same address
    /// point at the same value. Absent for owning pointers.
    pub address: Option<fn(pointer: &dyn Any) -> Option<usize>>,

    /// Clones the handle, not the pointee. Absent for owning pointers.
    pub share: Option<fn(pointer: &dyn Any) -> Option<Box<dyn Any>>>,
}
