use core::any::Any;
use core::fmt;
use std::sync::Arc;

use plait_core::{Def, Mappable, Shape};

use crate::cache::ShapeCache;
use crate::factory::create_instance;
use crate::graph::{MapContext, Origin};
use crate::registry::OverrideRegistry;
use crate::{FieldOverrides, MapError, MapOptions, MapReport, TypePair, TypeShape};

/// Maps values of one type onto values of another by matching field names.
///
/// A mapper keeps the field mappings it has worked out and any overrides
/// registered on it. It is `Send + Sync`, and meant to be built once and
/// shared.
///
/// ```
/// use plait::{Mapper, mappable};
///
/// mappable! {
///     #[derive(Default)]
///     pub struct Person {
///         pub name: String,
///         pub age: String,
///     }
/// }
///
/// mappable! {
///     #[derive(Debug, Default, PartialEq)]
///     pub struct PersonDto {
///         pub name: String,
///         pub age: u8,
///     }
/// }
///
/// let mapper = Mapper::new();
/// let person = Person { name: "Ada".into(), age: "36".into() };
/// let dto: PersonDto = mapper.map(Some(&person))?.unwrap();
/// assert_eq!(dto, PersonDto { name: "Ada".into(), age: 36 });
/// # Ok::<(), plait::MapError>(())
/// ```
#[derive(Default)]
pub struct Mapper {
    defaults: MapOptions,
    cache: ShapeCache,
    overrides: OverrideRegistry,
}

impl Mapper {
    /// A mapper using [`MapOptions::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// A mapper using `options` for calls that don't pass their own.
    pub fn with_options(options: MapOptions) -> Self {
        Self {
            defaults: options,
            ..Self::default()
        }
    }

    /// The options used by [`Mapper::map`] and [`Mapper::map_onto`].
    pub fn options(&self) -> &MapOptions {
        &self.defaults
    }

    /// Maps `source` into a new `D`.
    ///
    /// Returns `Ok(None)` when there is no source, or when `D` can't be
    /// constructed.
    pub fn map<S: Mappable, D: Mappable>(&self, source: Option<&S>) -> Result<Option<D>, MapError> {
        self.map_with(source, &self.defaults)
    }

    /// [`Mapper::map`] with per-call options.
    pub fn map_with<S: Mappable, D: Mappable>(
        &self,
        source: Option<&S>,
        options: &MapOptions,
    ) -> Result<Option<D>, MapError> {
        self.map_report(source, options)
            .map(|(destination, _)| destination)
    }

    /// [`Mapper::map_with`], also returning what was done.
    pub fn map_report<S: Mappable, D: Mappable>(
        &self,
        source: Option<&S>,
        options: &MapOptions,
    ) -> Result<(Option<D>, MapReport), MapError> {
        let Some(source) = source else {
            return Ok((None, MapReport::default()));
        };
        let Some(mut destination) = create_instance(D::SHAPE) else {
            debug!(destination = %D::SHAPE, "destination type can not be constructed");
            return Ok((None, MapReport::default()));
        };

        let mut cx = MapContext::new(self, options);
        cx.map_value(
            source,
            S::SHAPE,
            Origin::Graph,
            destination.as_mut(),
            D::SHAPE,
            0,
        )?;
        let report = cx.finish()?;
        Ok((destination.downcast::<D>().ok().map(|value| *value), report))
    }

    /// Maps `source` onto an existing `destination`, returning what was
    /// done. Fields with no counterpart in `source` keep their values.
    pub fn map_onto<S: Mappable, D: Mappable>(
        &self,
        source: &S,
        destination: &mut D,
    ) -> Result<MapReport, MapError> {
        self.map_onto_with(source, destination, &self.defaults)
    }

    /// [`Mapper::map_onto`] with per-call options.
    pub fn map_onto_with<S: Mappable, D: Mappable>(
        &self,
        source: &S,
        destination: &mut D,
        options: &MapOptions,
    ) -> Result<MapReport, MapError> {
        let mut cx = MapContext::new(self, options);
        cx.map_value(
            source,
            S::SHAPE,
            Origin::Graph,
            destination as &mut dyn Any,
            D::SHAPE,
            0,
        )?;
        cx.finish()
    }

    /// Maps exactly the given `(source field, destination field)` pairs
    /// from `S` to `D`, in the given order, instead of matching names.
    ///
    /// Names are matched ignoring case. `Option` and pointer layers around
    /// either type are looked through. Registering again for the same pair
    /// of types replaces the earlier overrides, including for field
    /// mappings already worked out.
    ///
    /// ```
    /// use plait::{MapError, Mapper, mappable};
    ///
    /// mappable! {
    ///     #[derive(Default)]
    ///     pub struct Employee { pub full_name: String }
    /// }
    /// mappable! {
    ///     #[derive(Default)]
    ///     pub struct Badge { pub name: String }
    /// }
    ///
    /// let mapper = Mapper::new();
    /// mapper.register_overrides::<Employee, Badge, _, _, _>([("FULL_NAME", "name")])?;
    ///
    /// let employee = Employee { full_name: "Ada Lovelace".into() };
    /// let badge: Badge = mapper.map(Some(&employee))?.unwrap();
    /// assert_eq!(badge.name, "Ada Lovelace");
    ///
    /// assert!(matches!(
    ///     mapper.register_overrides::<Employee, Badge, _, _, _>([("nickname", "name")]),
    ///     Err(MapError::UnknownField { .. })
    /// ));
    /// # Ok::<(), MapError>(())
    /// ```
    pub fn register_overrides<S, D, I, K, V>(&self, pairs: I) -> Result<(), MapError>
    where
        S: Mappable,
        D: Mappable,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let (source, destination) = (S::SHAPE.innermost(), D::SHAPE.innermost());
        let overrides = FieldOverrides::resolve(source, destination, pairs)?;
        let pair = TypePair::new(source, destination);

        let mut registry = self.overrides.write();
        debug!(
            source = %source,
            destination = %destination,
            pairs = ?overrides.pairs(),
            "registered field overrides"
        );
        registry.insert(pair, Arc::new(overrides));
        if self.cache.invalidate(&pair) {
            debug!(source = %source, destination = %destination, "dropped cached type shape");
        }
        Ok(())
    }

    /// The overrides registered for `S` to `D`, if any.
    pub fn overrides<S: Mappable, D: Mappable>(&self) -> Option<Arc<FieldOverrides>> {
        let pair = TypePair::new(S::SHAPE.innermost(), D::SHAPE.innermost());
        self.overrides.read().get(&pair).cloned()
    }

    /// The field mappings used from `S` to `D`, worked out and cached if
    /// needed. `None` unless both are structs, possibly wrapped.
    pub fn type_shape<S: Mappable, D: Mappable>(&self) -> Option<Arc<TypeShape>> {
        let (source, destination) = (S::SHAPE.innermost(), D::SHAPE.innermost());
        match (source.def, destination.def) {
            (Def::Struct(_), Def::Struct(_)) => Some(self.type_shape_for(source, destination)),
            _ => None,
        }
    }

    /// Number of type pairs whose field mappings are cached.
    pub fn cached_shapes(&self) -> usize {
        self.cache.len()
    }

    /// The overrides lock is held while building, so a registration can't
    /// slip in between reading the overrides and caching the result.
    pub(crate) fn type_shape_for(
        &self,
        source: &'static Shape,
        destination: &'static Shape,
    ) -> Arc<TypeShape> {
        let overrides = self.overrides.read();
        let found = overrides.get(&TypePair::new(source, destination));
        self.cache
            .get_or_build(source, destination, found.map(Arc::as_ref))
    }
}

impl fmt::Debug for Mapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapper")
            .field("defaults", &self.defaults)
            .field("cached_shapes", &self.cache.len())
            .field("overrides", &self.overrides.read().len())
            .finish()
    }
}
