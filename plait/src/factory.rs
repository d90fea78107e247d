use core::any::Any;

use plait_core::{Def, Shape};

/// Builds a fresh value of `shape` to map into.
///
/// `Option`s are built as `Some` of a fresh inner value and pointers wrap a
/// fresh pointee, so the result is always ready to be written through.
/// Collections start empty. Returns `None` when some layer has no way to
/// construct itself.
pub fn create_instance(shape: &'static Shape) -> Option<Box<dyn Any>> {
    let instance = match shape.def {
        Def::Option(option) => create_instance(option.t()).and_then(option.vtable.some),
        Def::Pointer(pointer) => create_instance(pointer.pointee()).and_then(pointer.vtable.new),
        Def::List(list) => (list.vtable.from_items)(Vec::new()),
        _ => shape.vtable.default.and_then(|default| default()),
    };
    if instance.is_none() {
        debug!(shape = %shape, "no way to construct a value");
    }
    instance
}
