use core::any::{Any, TypeId};
use std::collections::HashMap;
use std::rc::Rc;

use plait_core::{Def, Shape};

use crate::convert::convert;
use crate::factory::create_instance;
use crate::{
    ConvertError, FieldMapping, MapError, MapOptions, MapReport, Mapper, Path, PathSegment,
    SkipReason,
};

/// How a destination value is filled, judged by its shape once `Option`s
/// and pointers are looked through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Kind {
    /// converted in one go
    Simple,
    /// reconciled element by element
    Collection,
    /// mapped field by field
    Object,
    /// copied whole
    Opaque,
}

impl Kind {
    pub(crate) fn of(shape: &'static Shape) -> Self {
        match shape.innermost().def {
            Def::Scalar(_) | Def::Enum(_) => Kind::Simple,
            Def::List(_) => Kind::Collection,
            Def::Struct(_) => Kind::Object,
            _ => Kind::Opaque,
        }
    }
}

/// Where a source value came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Origin {
    /// Lives in the caller's graph for the whole call, so its address is
    /// its identity.
    Graph,
    /// Computed by a field read and dropped right after; it has no identity.
    Computed,
}

/// A source object about to be mapped.
pub(crate) struct Source<'a> {
    value: &'a dyn Any,
    shape: &'static Shape,
    origin: Origin,
    /// Address of the value itself, however it was reached.
    identity: Option<usize>,
    /// Address of the shared allocation the value was borrowed from, so a
    /// revisit can be caught without borrowing it again.
    alias: Option<usize>,
    /// A handle on the shared allocation the value lives in, so its address
    /// can't be reused while the call runs.
    pin: Option<Box<dyn Any>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct VisitKey {
    identity: usize,
    source: TypeId,
    destination: TypeId,
}

impl VisitKey {
    fn new(identity: usize, source: &'static Shape, destination: &'static Shape) -> Self {
        Self {
            identity,
            source: source.innermost().type_id(),
            destination: destination.innermost().type_id(),
        }
    }
}

struct Visit {
    /// Shared handle on the destination built for this source, if the
    /// destination is a shared pointer.
    produced: Option<Box<dyn Any>>,
    _pin: Option<Box<dyn Any>>,
}

fn address_of(value: &dyn Any) -> Option<usize> {
    if size_of_val(value) == 0 {
        return None;
    }
    Some((value as *const dyn Any).cast::<()>().addr())
}

/// Points `slot` at `handle` if the slot is a shared pointer, or an
/// `Option` of one, of the same type as the handle.
fn link(handle: &dyn Any, slot: &mut dyn Any, slot_shape: &'static Shape) -> bool {
    let linked = match slot_shape.def {
        Def::Option(option) => match option.t().def {
            Def::Pointer(pointer) => pointer
                .vtable
                .share
                .and_then(|share| share(handle))
                .and_then(option.vtable.some),
            _ => None,
        },
        Def::Pointer(pointer) => pointer.vtable.share.and_then(|share| share(handle)),
        _ => None,
    };
    linked.is_some_and(|linked| (slot_shape.vtable.assign)(slot, linked))
}

/// State of one top-level mapping call.
pub(crate) struct MapContext<'m> {
    mapper: &'m Mapper,
    pub(crate) options: &'m MapOptions,
    /// Visits by value address, and by allocation address for values
    /// borrowed from shared pointers.
    visited: HashMap<VisitKey, Rc<Visit>>,
    pub(crate) path: Path,
    pub(crate) report: MapReport,
}

impl<'m> MapContext<'m> {
    pub(crate) fn new(mapper: &'m Mapper, options: &'m MapOptions) -> Self {
        Self {
            mapper,
            options,
            visited: HashMap::new(),
            path: Path::new(),
            report: MapReport::default(),
        }
    }

    /// Ends the call. In strict mode any skip turns into an error.
    pub(crate) fn finish(self) -> Result<MapReport, MapError> {
        trace!(report = %self.report, "mapping finished");
        if self.options.strict && !self.report.is_complete() {
            return Err(MapError::Incomplete {
                report: self.report,
            });
        }
        Ok(self.report)
    }

    pub(crate) fn skip(&mut self, reason: SkipReason) {
        debug!(path = %self.path, reason = %reason, "skipped");
        self.report.record_skip(self.path.clone(), reason);
    }

    /// Maps `value` into `slot`, whatever their shapes. A missing source
    /// leaves the slot as it is.
    pub(crate) fn map_value(
        &mut self,
        value: &dyn Any,
        shape: &'static Shape,
        origin: Origin,
        slot: &mut dyn Any,
        slot_shape: &'static Shape,
        depth: usize,
    ) -> Result<(), MapError> {
        if shape.is_none(value) {
            return Ok(());
        }
        match Kind::of(slot_shape) {
            Kind::Simple => {
                self.assign_converted(value, shape, slot, slot_shape);
                Ok(())
            }
            Kind::Collection => self.reconcile(value, shape, origin, slot, slot_shape, depth),
            Kind::Object => self.map_object(value, shape, origin, slot, slot_shape, depth),
            Kind::Opaque => {
                self.copy_opaque(value, shape, slot, slot_shape);
                Ok(())
            }
        }
    }

    fn assign_converted(
        &mut self,
        value: &dyn Any,
        shape: &'static Shape,
        slot: &mut dyn Any,
        slot_shape: &'static Shape,
    ) {
        match convert(value, shape, slot_shape) {
            Ok(converted) => {
                if (slot_shape.vtable.assign)(slot, converted) {
                    self.report.record_mapped();
                } else {
                    self.skip(SkipReason::Access);
                }
            }
            // missing behind a pointer: same as missing outright
            Err(ConvertError::Null { .. }) => {}
            Err(err) => self.skip(SkipReason::Conversion(err)),
        }
    }

    fn copy_opaque(
        &mut self,
        value: &dyn Any,
        shape: &'static Shape,
        slot: &mut dyn Any,
        slot_shape: &'static Shape,
    ) {
        if let Def::Option(option) = shape.def {
            if let Some(inner) = (option.vtable.get)(value) {
                self.copy_opaque(inner, option.t(), slot, slot_shape);
            }
            return;
        }
        let (target, wrap) = match slot_shape.def {
            Def::Option(option) => (option.t(), Some(option.vtable.some)),
            _ => (slot_shape, None),
        };
        if !shape.is(target) {
            return self.skip(SkipReason::ShapeMismatch {
                from: shape.type_identifier,
                to: slot_shape.type_identifier,
            });
        }
        let Some(copy) = shape.vtable.clone.and_then(|clone| clone(value)) else {
            return self.skip(SkipReason::Unsupported {
                type_name: shape.type_identifier,
            });
        };
        let copy = match wrap {
            Some(some) => some(copy),
            None => Some(copy),
        };
        match copy {
            Some(copy) => {
                if (slot_shape.vtable.assign)(slot, copy) {
                    self.report.record_mapped();
                } else {
                    self.skip(SkipReason::Access);
                }
            }
            None => self.skip(SkipReason::Access),
        }
    }

    /// Finds the source object behind `Option`s and pointers.
    fn map_object(
        &mut self,
        value: &dyn Any,
        shape: &'static Shape,
        origin: Origin,
        slot: &mut dyn Any,
        slot_shape: &'static Shape,
        depth: usize,
    ) -> Result<(), MapError> {
        match shape.def {
            Def::Option(option) => match (option.vtable.get)(value) {
                Some(inner) => self.map_object(inner, option.t(), origin, slot, slot_shape, depth),
                None => Ok(()),
            },
            Def::Pointer(pointer) if pointer.is_shared() => {
                let pointee = pointer.pointee();
                let allocation = pointer.vtable.address.and_then(|address| address(value));
                if let Some(allocation) = allocation {
                    if self.revisit(allocation, pointee, slot, slot_shape) {
                        return Ok(());
                    }
                }
                let mut pin = pointer.vtable.share.and_then(|share| share(value));
                let mut result = Ok(());
                let borrowed = (pointer.vtable.borrow)(value, &mut |inner: &dyn Any| {
                    result = match pointee.def {
                        Def::Struct(_) => {
                            let source = Source {
                                value: inner,
                                shape: pointee,
                                origin: Origin::Graph,
                                identity: address_of(inner).or(allocation),
                                alias: allocation,
                                pin: pin.take(),
                            };
                            self.map_source(source, &mut *slot, slot_shape, depth)
                        }
                        _ => self.map_object(inner, pointee, origin, &mut *slot, slot_shape, depth),
                    };
                });
                if !borrowed {
                    self.skip(SkipReason::Access);
                }
                result
            }
            Def::Pointer(pointer) => {
                let mut result = Ok(());
                let borrowed = (pointer.vtable.borrow)(value, &mut |inner: &dyn Any| {
                    result = self.map_object(
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
                result
            }
            Def::Struct(_) => {
                let identity = match origin {
                    Origin::Graph => address_of(value),
                    Origin::Computed => None,
                };
                let source = Source {
                    value,
                    shape,
                    origin,
                    identity,
                    alias: None,
                    pin: None,
                };
                self.map_source(source, slot, slot_shape, depth)
            }
            _ => {
                self.skip(SkipReason::ShapeMismatch {
                    from: shape.type_identifier,
                    to: slot_shape.type_identifier,
                });
                Ok(())
            }
        }
    }

    /// Handles a source object that was already visited for this
    /// destination type: links shared destinations, leaves others alone.
    /// Returns `false` if the object is new.
    fn revisit(
        &mut self,
        identity: usize,
        source: &'static Shape,
        slot: &mut dyn Any,
        slot_shape: &'static Shape,
    ) -> bool {
        let key = VisitKey::new(identity, source, slot_shape);
        let Some(visit) = self.visited.get(&key) else {
            return false;
        };
        if visit
            .produced
            .as_deref()
            .is_some_and(|handle| link(handle, slot, slot_shape))
        {
            trace!(path = %self.path, source = %source, "linked to the destination built before");
        } else {
            trace!(path = %self.path, source = %source, "source object seen before, left alone");
        }
        self.report.record_cycle();
        true
    }

    /// Finds or builds the destination object behind `Option`s and
    /// pointers, then maps into it.
    fn map_source(
        &mut self,
        source: Source<'_>,
        slot: &mut dyn Any,
        slot_shape: &'static Shape,
        depth: usize,
    ) -> Result<(), MapError> {
        if let Some(identity) = source.identity {
            if self.revisit(identity, source.shape, slot, slot_shape) {
                return Ok(());
            }
        }
        match slot_shape.def {
            Def::Option(option) => {
                if (option.vtable.get_mut)(slot).is_none() {
                    let Some(instance) = create_instance(option.t()) else {
                        self.skip(SkipReason::Construction {
                            type_name: option.t().type_identifier,
                        });
                        return Ok(());
                    };
                    if !(option.vtable.replace)(slot, instance) {
                        self.skip(SkipReason::Access);
                        return Ok(());
                    }
                }
                match (option.vtable.get_mut)(slot) {
                    Some(inner) => self.map_source(source, inner, option.t(), depth),
                    None => {
                        self.skip(SkipReason::Access);
                        Ok(())
                    }
                }
            }
            Def::Pointer(pointer) => {
                let pointee = pointer.pointee();
                let mut produced = pointer.vtable.share.and_then(|share| share(&*slot));
                let mut source = Some(source);
                let mut result = Ok(());
                let borrowed = (pointer.vtable.borrow_mut)(slot, &mut |inner: &mut dyn Any| {
                    if let Some(source) = source.take() {
                        result = match pointee.def {
                            Def::Struct(_) => {
                                self.map_into(source, inner, pointee, depth, produced.take())
                            }
                            _ => self.map_source(source, inner, pointee, depth),
                        };
                    }
                });
                if !borrowed {
                    self.skip(SkipReason::Access);
                }
                result
            }
            Def::Struct(_) => self.map_into(source, slot, slot_shape, depth, None),
            _ => {
                self.skip(SkipReason::ShapeMismatch {
                    from: source.shape.type_identifier,
                    to: slot_shape.type_identifier,
                });
                Ok(())
            }
        }
    }

    /// Maps one source struct into one destination struct, field by field.
    fn map_into(
        &mut self,
        source: Source<'_>,
        destination: &mut dyn Any,
        shape: &'static Shape,
        depth: usize,
        produced: Option<Box<dyn Any>>,
    ) -> Result<(), MapError> {
        let Source {
            value,
            shape: source_shape,
            origin,
            identity,
            alias,
            pin,
        } = source;

        if depth > self.options.max_depth {
            debug!(path = %self.path, max_depth = self.options.max_depth, "mapping nested too deep");
            return Err(MapError::DepthExceeded {
                max_depth: self.options.max_depth,
                path: self.path.clone(),
            });
        }

        if let Some(identity) = identity {
            let key = VisitKey::new(identity, source_shape, shape);
            if self.visited.contains_key(&key) {
                trace!(path = %self.path, source = %source_shape, "source object seen before, left alone");
                self.report.record_cycle();
                return Ok(());
            }
            let visit = Rc::new(Visit {
                produced,
                _pin: pin,
            });
            if let Some(alias) = alias.filter(|alias| *alias != identity) {
                self.visited
                    .insert(VisitKey::new(alias, source_shape, shape), Rc::clone(&visit));
            }
            self.visited.insert(key, visit);
        }

        let type_shape = self.mapper.type_shape_for(source_shape, shape);
        for mapping in type_shape.mappings() {
            self.path.push(PathSegment::Field(mapping.name()));
            let result = self.map_field(value, origin, mapping, destination, depth);
            self.path.pop();
            result?;
        }
        Ok(())
    }

    fn map_field(
        &mut self,
        parent: &dyn Any,
        origin: Origin,
        mapping: &FieldMapping,
        destination: &mut dyn Any,
        depth: usize,
    ) -> Result<(), MapError> {
        let (Some(read), Some(write)) = (mapping.source().read, mapping.destination().write)
        else {
            self.skip(SkipReason::Access);
            return Ok(());
        };
        let Some(value) = read(parent) else {
            self.skip(SkipReason::Access);
            return Ok(());
        };
        let Some(slot) = write(destination) else {
            self.skip(SkipReason::Access);
            return Ok(());
        };
        let origin = if value.is_owned() {
            Origin::Computed
        } else {
            origin
        };
        self.map_value(
            value.get(),
            mapping.source().shape(),
            origin,
            slot,
            mapping.destination().shape(),
            depth + 1,
        )
    }
}
