use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use plait_core::{Def, Shape};

use crate::cache::NameIndex;
use crate::{MapError, Side, TypePair};

/// Field pairs that replace name matching for one pair of struct types.
///
/// Names are resolved when the overrides are registered, so every pair
/// here names a readable source field and a writable destination field by
/// their declared names.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldOverrides {
    pairs: Vec<(&'static str, &'static str)>,
}

impl FieldOverrides {
    /// Resolves `(source name, destination name)` pairs against two struct
    /// shapes, ignoring case. Fails on the first name that does not resolve.
    pub(crate) fn resolve<I, K, V>(
        source: &'static Shape,
        destination: &'static Shape,
        pairs: I,
    ) -> Result<Self, MapError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let Def::Struct(from) = source.def else {
            return Err(MapError::NotAStruct {
                type_name: source.type_identifier,
            });
        };
        let Def::Struct(to) = destination.def else {
            return Err(MapError::NotAStruct {
                type_name: destination.type_identifier,
            });
        };
        let readable = NameIndex::readable(from.fields);
        let writable = NameIndex::writable(to.fields);

        let pairs = pairs
            .into_iter()
            .map(|(from, to)| {
                let (from, to) = (from.as_ref(), to.as_ref());
                let from = readable.get(from).ok_or_else(|| MapError::UnknownField {
                    type_name: source.type_identifier,
                    side: Side::Source,
                    field: from.to_owned(),
                })?;
                let to = writable.get(to).ok_or_else(|| MapError::UnknownField {
                    type_name: destination.type_identifier,
                    side: Side::Destination,
                    field: to.to_owned(),
                })?;
                Ok((from.name, to.name))
            })
            .collect::<Result<Vec<_>, MapError>>()?;
        Ok(Self { pairs })
    }

    #[cfg(test)]
    pub(crate) fn from_pairs(pairs: Vec<(&'static str, &'static str)>) -> Self {
        Self { pairs }
    }

    /// `(source field, destination field)` pairs, in registration order.
    pub fn pairs(&self) -> &[(&'static str, &'static str)] {
        &self.pairs
    }
}

/// Registered overrides, by type pair.
pub(crate) type OverrideRegistry = RwLock<HashMap<TypePair, Arc<FieldOverrides>>>;

#[cfg(test)]
mod tests {
    use super::*;
    use plait_core::{Mappable, mappable};

    mappable! {
        #[derive(Default)]
        struct Person {
            full_name: String,
            age: u8,
        }
        computed {
            initials: String = |person| person.full_name.chars().take(1).collect(),
        }
    }

    mappable! {
        #[derive(Default)]
        struct Badge {
            name: String,
            label: String,
        }
    }

    #[test]
    fn resolves_names_to_declared_fields() {
        plait_testhelpers::setup();

        let overrides = FieldOverrides::resolve(
            Person::SHAPE,
            Badge::SHAPE,
            [("FULL_NAME", "Name"), ("initials", "label")],
        )
        .unwrap();
        assert_eq!(
            overrides.pairs(),
            [("full_name", "name"), ("initials", "label")]
        );
    }

    #[test]
    fn unknown_names_fail_fast() {
        plait_testhelpers::setup();

        let err = FieldOverrides::resolve(Person::SHAPE, Badge::SHAPE, [("nickname", "name")])
            .unwrap_err();
        insta::assert_snapshot!(err, @"`Person` has no readable source field named `nickname`");

        let err = FieldOverrides::resolve(Person::SHAPE, Badge::SHAPE, [("age", "title")])
            .unwrap_err();
        insta::assert_snapshot!(err, @"`Badge` has no writable destination field named `title`");
    }

    #[test]
    fn read_only_fields_are_not_destinations() {
        plait_testhelpers::setup();

        let err = FieldOverrides::resolve(Badge::SHAPE, Person::SHAPE, [("name", "initials")])
            .unwrap_err();
        assert!(matches!(
            err,
            MapError::UnknownField {
                side: Side::Destination,
                ..
            }
        ));
    }

    #[test]
    fn only_structs_take_overrides() {
        plait_testhelpers::setup();

        let err = FieldOverrides::resolve(
            Person::SHAPE,
            <Vec<Badge>>::SHAPE,
            Vec::<(String, String)>::new(),
        )
        .unwrap_err();
        assert!(matches!(err, MapError::NotAStruct { type_name: "Vec" }));
    }
}
