use core::any::TypeId;
use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use plait_core::{Def, Field, Shape};

use crate::FieldOverrides;

/// Key of the shape cache: which type is read and which is written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypePair {
    /// the type values are read from
    pub source: TypeId,
    /// the type values are written to
    pub destination: TypeId,
}

impl TypePair {
    /// The pair for two shapes.
    pub fn new(source: &Shape, destination: &Shape) -> Self {
        Self {
            source: source.type_id(),
            destination: destination.type_id(),
        }
    }
}

/// One source field copied into one destination field.
#[derive(Clone, Copy)]
pub struct FieldMapping {
    source: &'static Field,
    destination: &'static Field,
}

impl FieldMapping {
    pub(crate) fn new(source: &'static Field, destination: &'static Field) -> Self {
        Self {
            source,
            destination,
        }
    }

    /// Name the mapped value is known by, which is the destination field's.
    pub fn name(&self) -> &'static str {
        self.destination.name
    }

    /// The field that is read.
    pub fn source(&self) -> &'static Field {
        self.source
    }

    /// The field that is written.
    pub fn destination(&self) -> &'static Field {
        self.destination
    }
}

impl fmt::Debug for FieldMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source.name, self.destination.name)
    }
}

/// The ordered field mappings between two struct types.
pub struct TypeShape {
    source: &'static Shape,
    destination: &'static Shape,
    mappings: Vec<FieldMapping>,
}

impl TypeShape {
    /// Matches the fields of `source` against those of `destination`.
    ///
    /// With overrides, exactly the overridden pairs are mapped, in the order
    /// they were registered. Otherwise every readable source field is paired
    /// with the writable destination field of the same name, ignoring case.
    pub(crate) fn build(
        source: &'static Shape,
        destination: &'static Shape,
        overrides: Option<&FieldOverrides>,
    ) -> Self {
        let mappings = match (source.def, destination.def) {
            (Def::Struct(from), Def::Struct(to)) => {
                let readable = NameIndex::readable(from.fields);
                let writable = NameIndex::writable(to.fields);
                match overrides {
                    Some(overrides) => overrides
                        .pairs()
                        .iter()
                        .filter_map(|(from, to)| {
                            Some(FieldMapping::new(readable.get(from)?, writable.get(to)?))
                        })
                        .collect(),
                    None => from
                        .fields
                        .iter()
                        .filter(|field| {
                            readable
                                .get(field.name)
                                .is_some_and(|indexed| core::ptr::eq(indexed, *field))
                        })
                        .filter_map(|field| {
                            Some(FieldMapping::new(field, writable.get(field.name)?))
                        })
                        .collect(),
                }
            }
            _ => Vec::new(),
        };
        Self {
            source,
            destination,
            mappings,
        }
    }

    /// The shape values are read from.
    pub fn source(&self) -> &'static Shape {
        self.source
    }

    /// The shape values are written to.
    pub fn destination(&self) -> &'static Shape {
        self.destination
    }

    /// Field mappings, in mapping order.
    pub fn mappings(&self) -> &[FieldMapping] {
        &self.mappings
    }

    /// Number of field mappings.
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Whether no field is mapped.
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

impl fmt::Debug for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeShape")
            .field("source", &self.source.type_identifier)
            .field("destination", &self.destination.type_identifier)
            .field("mappings", &self.mappings)
            .finish()
    }
}

/// Fields by lowercased name. The first field of a given name wins.
pub(crate) struct NameIndex {
    fields: HashMap<String, &'static Field>,
}

impl NameIndex {
    fn new(fields: impl Iterator<Item = &'static Field>) -> Self {
        let mut index = HashMap::new();
        for field in fields {
            index.entry(field.name.to_lowercase()).or_insert(field);
        }
        Self { fields: index }
    }

    pub(crate) fn readable(fields: &'static [Field]) -> Self {
        Self::new(fields.iter().filter(|field| field.is_readable()))
    }

    pub(crate) fn writable(fields: &'static [Field]) -> Self {
        Self::new(fields.iter().filter(|field| field.is_writable()))
    }

    pub(crate) fn get(&self, name: &str) -> Option<&'static Field> {
        self.fields.get(&name.to_lowercase()).copied()
    }
}

/// Built [`TypeShape`]s, shared by every call made through one mapper.
#[derive(Default)]
pub(crate) struct ShapeCache {
    shapes: RwLock<HashMap<TypePair, Arc<TypeShape>>>,
}

impl ShapeCache {
    /// Returns the cached shape for the pair, building it on a miss.
    ///
    /// The shape is built without holding the cache lock. When two threads
    /// miss at once, both build, and the first to insert wins.
    pub(crate) fn get_or_build(
        &self,
        source: &'static Shape,
        destination: &'static Shape,
        overrides: Option<&FieldOverrides>,
    ) -> Arc<TypeShape> {
        let pair = TypePair::new(source, destination);
        if let Some(shape) = self.shapes.read().get(&pair) {
            trace!(source = %source, destination = %destination, "type shape cache hit");
            return Arc::clone(shape);
        }

        let built = TypeShape::build(source, destination, overrides);
        debug!(
            source = %source,
            destination = %destination,
            fields = built.len(),
            overridden = overrides.is_some(),
            "built type shape"
        );
        Arc::clone(
            self.shapes
                .write()
                .entry(pair)
                .or_insert_with(|| Arc::new(built)),
        )
    }

    /// Forgets the shape for the pair. Returns whether one was cached.
    pub(crate) fn invalidate(&self, pair: &TypePair) -> bool {
        self.shapes.write().remove(pair).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.shapes.read().len()
    }
}
