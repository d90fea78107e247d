use std::collections::{BTreeSet, HashSet, VecDeque};
use std::sync::Arc;

use plait::{
    ConvertError, MapOptions, Mapper, PathSegment, SkipReason, mappable, mappable_opaque,
};
use plait_testhelpers::IPanic;
use rust_decimal::Decimal;
use uuid::Uuid;

mappable! {
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct Person {
        pub name: String,
        pub age: u32,
        pub height: f64,
        pub active: bool,
        pub initial: char,
    }
}

mappable! {
    #[derive(Default)]
    pub struct RawPerson {
        pub name: String,
        pub age: String,
    }
}

mappable! {
    #[derive(Debug, Default, PartialEq)]
    pub struct PersonDto {
        pub name: String,
        pub age: i32,
    }
}

#[test]
fn scalar_struct_maps_to_an_equal_copy() -> Result<(), IPanic> {
    plait_testhelpers::setup();

    let mapper = Mapper::new();
    let person = Person {
        name: "Grace".into(),
        age: 85,
        height: 1.65,
        active: true,
        initial: 'G',
    };
    let copy: Person = mapper.map(Some(&person))?.unwrap();
    assert_eq!(copy, person);
    assert!(!core::ptr::eq(&copy, &person));
    Ok(())
}

#[test]
fn missing_source_maps_to_nothing() -> Result<(), IPanic> {
    plait_testhelpers::setup();

    let mapper = Mapper::new();
    let (mapped, report) =
        mapper.map_report::<Person, PersonDto>(None, &MapOptions::default())?;
    assert_eq!(mapped, None);
    assert_eq!(report.mapped(), 0);
    Ok(())
}

#[test]
fn numeric_strings_convert_to_integers() -> Result<(), IPanic> {
    plait_testhelpers::setup();

    let mapper = Mapper::new();
    let raw = RawPerson {
        name: "Alice".into(),
        age: "30".into(),
    };
    let dto: PersonDto = mapper.map(Some(&raw))?.unwrap();
    assert_eq!(
        dto,
        PersonDto {
            name: "Alice".into(),
            age: 30
        }
    );
    Ok(())
}

#[test]
fn mapping_onto_twice_is_idempotent() -> Result<(), IPanic> {
    plait_testhelpers::setup();

    let mapper = Mapper::new();
    let raw = RawPerson {
        name: "Alice".into(),
        age: "30".into(),
    };
    let mut dto = PersonDto::default();
    mapper.map_onto(&raw, &mut dto)?;
    let first = PersonDto {
        name: dto.name.clone(),
        age: dto.age,
    };
    mapper.map_onto(&raw, &mut dto)?;
    assert_eq!(dto, first);
    Ok(())
}

mappable! {
    #[derive(Default)]
    pub struct Labels {
        pub tags: Vec<String>,
    }
}

mappable! {
    #[derive(Debug, Default)]
    pub struct FrozenLabels {
        pub tags: Arc<[String]>,
    }
}

mappable! {
    #[derive(Debug, Default)]
    pub struct BoxedLabels {
        pub tags: Box<[String]>,
    }
}

#[test]
fn sequences_fill_fixed_arrays_in_order() -> Result<(), IPanic> {
    plait_testhelpers::setup();

    let mapper = Mapper::new();
    let labels = Labels {
        tags: vec!["a".into(), "b".into(), "c".into()],
    };

    let frozen: FrozenLabels = mapper.map(Some(&labels))?.unwrap();
    assert_eq!(&*frozen.tags, ["a", "b", "c"]);

    let boxed: BoxedLabels = mapper.map(Some(&labels))?.unwrap();
    assert_eq!(&*boxed.tags, ["a", "b", "c"]);

    let mut existing = FrozenLabels {
        tags: Arc::from(vec!["old".to_string()]),
    };
    let options = MapOptions::new().merge_only(true);
    mapper.map_onto_with(&labels, &mut existing, &options)?;
    assert_eq!(existing.tags.len(), 3, "fixed arrays are always replaced");
    Ok(())
}

mappable! {
    #[derive(Debug, Default)]
    pub struct Inbox {
        pub messages: Vec<u32>,
    }
}

mappable! {
    #[derive(Debug, Default)]
    pub struct Archive {
        pub messages: Vec<u32>,
    }
}

#[test]
fn collections_are_replaced_or_appended() -> Result<(), IPanic> {
    plait_testhelpers::setup();

    let mapper = Mapper::new();
    let inbox = Inbox {
        messages: vec![3, 4, 5],
    };

    let mut archive = Archive {
        messages: vec![1, 2],
    };
    mapper.map_onto(&inbox, &mut archive)?;
    assert_eq!(archive.messages, [3, 4, 5]);

    let mut archive = Archive {
        messages: vec![1, 2],
    };
    mapper.map_onto_with(&inbox, &mut archive, &MapOptions::new().merge_only(true))?;
    assert_eq!(archive.messages, [1, 2, 3, 4, 5]);
    Ok(())
}

mappable! {
    #[derive(Default)]
    pub struct Tagged {
        pub tags: Vec<Option<String>>,
        pub scores: Vec<String>,
    }
}

mappable! {
    #[derive(Debug, Default)]
    pub struct TagSets {
        pub tags: Option<BTreeSet<String>>,
        pub scores: VecDeque<u8>,
    }
}

#[test]
fn elements_are_converted_one_by_one() -> Result<(), IPanic> {
    plait_testhelpers::setup();

    let mapper = Mapper::new();
    let tagged = Tagged {
        tags: vec![Some("b".into()), None, Some("a".into()), Some("b".into())],
        scores: vec!["7".into(), "x".into(), "300".into(), "9".into()],
    };
    let (sets, report) = mapper.map_report::<Tagged, TagSets>(Some(&tagged), &MapOptions::new())?;
    let sets = sets.unwrap();

    let tags: Vec<_> = sets.tags.unwrap().into_iter().collect();
    assert_eq!(tags, ["a", "b"]);
    assert_eq!(sets.scores, [7, 9]);

    let skipped: Vec<_> = report
        .skipped()
        .iter()
        .map(|skip| skip.path.to_string())
        .collect();
    assert_eq!(skipped, ["scores[1]", "scores[2]"]);
    assert!(matches!(
        report.skipped()[1].reason,
        SkipReason::Conversion(ConvertError::OutOfRange { to: "u8" })
    ));
    Ok(())
}

mappable! {
    #[derive(Default)]
    pub struct RawAccount {
        pub id: String,
        pub balance: String,
        pub opened: String,
    }
}

mappable! {
    #[derive(Debug, Default)]
    pub struct Account {
        pub id: Uuid,
        pub balance: Decimal,
        pub opened: Option<chrono::NaiveDate>,
    }
}

#[test]
fn invalid_uuids_leave_the_field_alone() -> Result<(), IPanic> {
    plait_testhelpers::setup();

    let mapper = Mapper::new();
    let expected = Uuid::parse_str("3fa85f64-5717-4562-b3fc-2c963f66afa6").unwrap();
    let raw = RawAccount {
        id: "3fa85f64-5717-4562-b3fc-2c963f66afa6".into(),
        balance: "12.50".into(),
        opened: "2024-02-29".into(),
    };
    let account: Account = mapper.map(Some(&raw))?.unwrap();
    assert_eq!(account.id, expected);
    assert_eq!(account.balance, Decimal::new(1250, 2));
    assert_eq!(account.opened, chrono::NaiveDate::from_ymd_opt(2024, 2, 29));

    let mut account = Account {
        id: expected,
        ..Account::default()
    };
    let raw = RawAccount {
        id: "not-a-uuid".into(),
        balance: "1".into(),
        opened: "2024-02-29".into(),
    };
    let report = mapper.map_onto(&raw, &mut account)?;
    assert_eq!(account.id, expected);
    assert_eq!(account.balance, Decimal::ONE);
    assert_eq!(report.skipped().len(), 1);
    assert_eq!(
        report.skipped()[0].path.segments(),
        [PathSegment::Field("id")]
    );
    Ok(())
}

mappable! {
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub enum Priority {
        Low = 1,
        Normal = 5,
        Urgent = 10,
    }
}

mappable! {
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub enum Severity {
        Urgent,
        Low,
    }
}

mappable! {
    #[derive(Default)]
    pub struct Ticket {
        pub priority: String,
        pub severity: Option<Priority>,
        pub rank: Priority,
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

mappable! {
    #[derive(Debug, Default)]
    pub struct TicketView {
        pub priority: Option<Priority>,
        pub severity: Option<Severity>,
        pub rank: i64,
    }
}

#[test]
fn enums_match_by_name_or_discriminant() -> Result<(), IPanic> {
    plait_testhelpers::setup();

    let mapper = Mapper::new();
    let ticket = Ticket {
        priority: "urgent".into(),
        severity: Some(Priority::Low),
        rank: Priority::Normal,
    };
    let view: TicketView = mapper.map(Some(&ticket))?.unwrap();
    assert_eq!(view.priority, Some(Priority::Urgent));
    assert_eq!(view.severity, Some(Severity::Low));
    assert_eq!(view.rank, 5);
    Ok(())
}

mappable! {
    #[derive(Debug, Default, PartialEq)]
    pub struct Child {
        pub id: u32,
        pub label: String,
    }
}

mappable! {
    #[derive(Default)]
    pub struct Parent {
        pub child: Option<Child>,
    }
}

mappable! {
    #[derive(Debug, Default)]
    pub struct ParentDto {
        pub child: Option<Box<Child>>,
    }
}

#[test]
fn missing_child_keeps_the_existing_one() -> Result<(), IPanic> {
    plait_testhelpers::setup();

    let mapper = Mapper::new();
    let mut dto = ParentDto {
        child: Some(Box::new(Child {
            id: 1,
            label: String::new(),
        })),
    };
    let report = mapper.map_onto(&Parent { child: None }, &mut dto)?;
    assert_eq!(dto.child.as_deref().map(|child| child.id), Some(1));
    assert!(report.is_complete());
    assert_eq!(report.mapped(), 0);
    Ok(())
}

#[test]
fn missing_destination_objects_are_built() -> Result<(), IPanic> {
    plait_testhelpers::setup();

    let mapper = Mapper::new();
    let parent = Parent {
        child: Some(Child {
            id: 2,
            label: "two".into(),
        }),
    };
    let dto: ParentDto = mapper.map(Some(&parent))?.unwrap();
    assert_eq!(
        dto.child.as_deref(),
        Some(&Child {
            id: 2,
            label: "two".into()
        })
    );

    let mut dto = ParentDto {
        child: Some(Box::new(Child {
            id: 1,
            label: "kept".into(),
        })),
    };
    mapper.map_onto(&parent, &mut dto)?;
    assert_eq!(dto.child.map(|child| child.id), Some(2));
    Ok(())
}

mappable! {
    #[derive(Default)]
    pub struct Basket {
        pub items: Vec<Child>,
        pub owners: HashSet<String>,
    }
    computed {
        size: usize = |basket| basket.items.len(),
    }
}

mappable! {
    #[derive(Debug, Default)]
    pub struct BasketView {
        pub items: Option<Vec<ChildView>>,
        pub owners: Vec<String>,
        pub size: String,
    }
}

mappable! {
    #[derive(Debug, Default, PartialEq)]
    pub struct ChildView {
        pub label: String,
    }
}

#[test]
fn lists_of_objects_and_computed_fields() -> Result<(), IPanic> {
    plait_testhelpers::setup();

    let mapper = Mapper::new();
    let basket = Basket {
        items: vec![
            Child {
                id: 1,
                label: "apple".into(),
            },
            Child {
                id: 2,
                label: "pear".into(),
            },
        ],
        owners: HashSet::from(["sam".to_string()]),
    };
    let view: BasketView = mapper.map(Some(&basket))?.unwrap();
    assert_eq!(
        view.items.unwrap(),
        [
            ChildView {
                label: "apple".into()
            },
            ChildView {
                label: "pear".into()
            }
        ]
    );
    assert_eq!(view.owners, ["sam"]);
    assert_eq!(view.size, "", "only strings map into strings");
    Ok(())
}

mappable! {
    #[derive(Default)]
    pub struct Shipment {
        pub count: usize,
        pub tags: String,
    }
}

mappable! {
    #[derive(Debug, Default)]
    pub struct ShipmentView {
        pub count: String,
        pub tags: Vec<char>,
    }
}

#[test]
fn mismatches_are_reported_not_fatal() -> Result<(), IPanic> {
    plait_testhelpers::setup();

    let mapper = Mapper::new();
    let shipment = Shipment {
        count: 3,
        tags: "abc".into(),
    };
    let (view, report) =
        mapper.map_report::<Shipment, ShipmentView>(Some(&shipment), &MapOptions::new())?;
    let view = view.unwrap();
    assert_eq!(view.count, "");
    assert!(view.tags.is_empty());
    insta::assert_snapshot!(report, @r"
    0 mapped, 0 revisited, 2 skipped
      count: conversion failed: no conversion from `usize` to `String`
      tags: `String` is not a collection
    ");
    Ok(())
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Rgb(u8, u8, u8);

mappable_opaque!(Rgb);

mappable! {
    #[derive(Default)]
    pub struct Theme {
        pub accent: Rgb,
        pub background: Option<Rgb>,
    }
}

mappable! {
    #[derive(Debug, Default)]
    pub struct ThemeView {
        pub accent: Option<Rgb>,
        pub background: Rgb,
    }
}

#[test]
fn opaque_values_are_cloned() -> Result<(), IPanic> {
    plait_testhelpers::setup();

    let mapper = Mapper::new();
    let theme = Theme {
        accent: Rgb(255, 0, 0),
        background: Some(Rgb(0, 0, 0)),
    };
    let view: ThemeView = mapper.map(Some(&theme))?.unwrap();
    assert_eq!(view.accent, Some(Rgb(255, 0, 0)));
    assert_eq!(view.background, Rgb(0, 0, 0));
    Ok(())
}
