use core::any::Any;

use plait_core::{Def, ListDef, ListKind, Shape};

use crate::convert::{convert, is_simple};
use crate::factory::create_instance;
use crate::graph::{MapContext, Origin};
use crate::{CollectionMode, ConvertError, MapError, PathSegment, SkipReason};

/// Builds a collection of `shape` holding `items`, wrapping it in whatever
/// `Option` and pointer layers the shape has.
fn build(shape: &'static Shape, items: Vec<Box<dyn Any>>) -> Option<Box<dyn Any>> {
    match shape.def {
        Def::List(list) => (list.vtable.from_items)(items),
        Def::Option(option) => build(option.t(), items).and_then(option.vtable.some),
        Def::Pointer(pointer) => build(pointer.pointee(), items).and_then(pointer.vtable.new),
        _ => None,
    }
}

impl MapContext<'_> {
    /// Maps a source sequence into a destination collection.
    ///
    /// All elements are mapped before the destination is touched, so a
    /// source that can't be walked leaves it as it was.
    pub(crate) fn reconcile(
        &mut self,
        value: &dyn Any,
        shape: &'static Shape,
        origin: Origin,
        slot: &mut dyn Any,
        slot_shape: &'static Shape,
        depth: usize,
    ) -> Result<(), MapError> {
        let list = match shape.def {
            Def::Option(option) => {
                return match (option.vtable.get)(value) {
                    Some(inner) => {
                        self.reconcile(inner, option.t(), origin, slot, slot_shape, depth)
                    }
                    None => Ok(()),
                };
            }
            Def::Pointer(pointer) => {
                let mut result = Ok(());
                let borrowed = (pointer.vtable.borrow)(value, &mut |inner: &dyn Any| {
                    result = self.reconcile(
                        inner,
                        pointer.pointee(),
                        origin,
                        &mut *slot,
                        slot_shape,
                        depth,
                    );
                });
                if !borrowed {
                    self.skip(SkipReason::Access);
                }
                return result;
            }
            Def::List(list) => list,
            _ => {
                self.skip(SkipReason::NotEnumerable {
                    type_name: shape.type_identifier,
                });
                return Ok(());
            }
        };

        let Some(target) = slot_shape.innermost().as_list().copied() else {
            self.skip(SkipReason::ShapeMismatch {
                from: shape.type_identifier,
                to: slot_shape.type_identifier,
            });
            return Ok(());
        };
        let Some(items) = self.collect_items(value, &list, origin, target.t(), depth)? else {
            return Ok(());
        };
        self.store(items, slot, slot_shape);
        Ok(())
    }

    /// Maps every present source element into a new destination element.
    /// Elements that fail are skipped. Returns `None` if the source can't
    /// be iterated at all.
    fn collect_items(
        &mut self,
        value: &dyn Any,
        list: &ListDef,
        origin: Origin,
        element: &'static Shape,
        depth: usize,
    ) -> Result<Option<Vec<Box<dyn Any>>>, MapError> {
        let Some(items) = (list.vtable.iter)(value) else {
            self.skip(SkipReason::Access);
            return Ok(None);
        };
        let source_element = list.t();
        let simple = is_simple(element);

        let mut mapped = Vec::new();
        for (index, item) in items.enumerate() {
            if source_element.is_none(item) {
                continue;
            }
            self.path.push(PathSegment::Index(index));
            let result = if simple {
                Ok(self.convert_element(item, source_element, element))
            } else {
                self.map_element(item, source_element, origin, element, depth)
            };
            self.path.pop();
            if let Some(item) = result? {
                mapped.push(item);
            }
        }
        Ok(Some(mapped))
    }

    fn convert_element(
        &mut self,
        item: &dyn Any,
        from: &'static Shape,
        to: &'static Shape,
    ) -> Option<Box<dyn Any>> {
        match convert(item, from, to) {
            Ok(converted) => Some(converted),
            Err(ConvertError::Null { .. }) => None,
            Err(err) => {
                self.skip(SkipReason::Conversion(err));
                None
            }
        }
    }

    fn map_element(
        &mut self,
        item: &dyn Any,
        from: &'static Shape,
        origin: Origin,
        element: &'static Shape,
        depth: usize,
    ) -> Result<Option<Box<dyn Any>>, MapError> {
        let Some(mut instance) = create_instance(element) else {
            self.skip(SkipReason::Construction {
                type_name: element.type_identifier,
            });
            return Ok(None);
        };
        self.map_value(item, from, origin, instance.as_mut(), element, depth)?;
        Ok(Some(instance))
    }

    /// Puts mapped elements into the destination, building the collection
    /// if it is absent.
    fn store(&mut self, items: Vec<Box<dyn Any>>, slot: &mut dyn Any, slot_shape: &'static Shape) {
        match slot_shape.def {
            Def::Option(option) => {
                if (option.vtable.get_mut)(slot).is_none() {
                    let Some(built) = build(option.t(), items) else {
                        return self.skip(SkipReason::Construction {
                            type_name: option.t().type_identifier,
                        });
                    };
                    if (option.vtable.replace)(slot, built) {
                        self.report.record_mapped();
                    } else {
                        self.skip(SkipReason::Access);
                    }
                    return;
                }
                if let Some(inner) = (option.vtable.get_mut)(slot) {
                    self.store(items, inner, option.t());
                }
            }
            Def::Pointer(pointer) => {
                let mut items = Some(items);
                let borrowed = (pointer.vtable.borrow_mut)(slot, &mut |inner: &mut dyn Any| {
                    if let Some(items) = items.take() {
                        self.store(items, inner, pointer.pointee());
                    }
                });
                if !borrowed {
                    self.skip(SkipReason::Access);
                }
            }
            Def::List(list) => self.fill(items, &list, slot, slot_shape),
            _ => self.skip(SkipReason::ShapeMismatch {
                from: "sequence",
                to: slot_shape.type_identifier,
            }),
        }
    }

    /// Fills an existing collection in place if it can grow, otherwise
    /// replaces it with a new one.
    fn fill(
        &mut self,
        items: Vec<Box<dyn Any>>,
        list: &ListDef,
        slot: &mut dyn Any,
        slot_shape: &'static Shape,
    ) {
        let push = match list.vtable.push {
            Some(push) if list.kind != ListKind::Array => push,
            _ => return self.replace(items, list, slot, slot_shape),
        };
        if self.options.collections == CollectionMode::Replace {
            match list.vtable.clear {
                Some(clear) if clear(slot) => {}
                Some(_) => return self.skip(SkipReason::Access),
                None => return self.replace(items, list, slot, slot_shape),
            }
        }
        trace!(
            path = %self.path,
            collection = %slot_shape,
            mode = ?self.options.collections,
            items = items.len(),
            "filling collection in place"
        );
        let rejected = items
            .into_iter()
            .map(|item| push(&mut *slot, item))
            .filter(|pushed| !pushed)
            .count();
        if rejected == 0 {
            self.report.record_mapped();
        } else {
            self.skip(SkipReason::Access);
        }
    }

    fn replace(
        &mut self,
        items: Vec<Box<dyn Any>>,
        list: &ListDef,
        slot: &mut dyn Any,
        slot_shape: &'static Shape,
    ) {
        trace!(path = %self.path, collection = %slot_shape, items = items.len(), "replacing collection");
        match (list.vtable.from_items)(items) {
            Some(built) => {
                if (slot_shape.vtable.assign)(slot, built) {
                    self.report.record_mapped();
                } else {
                    self.skip(SkipReason::Access);
                }
            }
            None => self.skip(SkipReason::Construction {
                type_name: slot_shape.type_identifier,
            }),
        }
    }
}
