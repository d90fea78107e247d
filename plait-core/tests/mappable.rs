use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use plait_core::{Def, FieldRef, ListKind, Mappable, PointerKind, mappable, mappable_opaque};

mappable! {
    #[derive(Debug, Default, PartialEq)]
    pub struct Node {
        pub name: String,
        pub weight: Option<f64>,
        pub children: Vec<Node>,
        pub parent: Option<Rc<RefCell<Node>>>,
    }
    computed {
        child_count: usize = |node| node.children.len(),
    }
}

mappable! {
    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Priority {
        Low = 1,
        Normal,
        Urgent = 40,
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Rgb(u8, u8, u8);

mappable_opaque!(Rgb);

#[test]
fn struct_fields_in_declaration_order() {
    plait_testhelpers::setup();

    let def = Node::SHAPE.as_struct().unwrap();
    let names: Vec<_> = def.fields.iter().map(|field| field.name).collect();
    assert_eq!(names, ["name", "weight", "children", "parent", "child_count"]);

    assert!(def.field("Weight").unwrap().shape().is_type::<Option<f64>>());
    assert!(def.field("nope").is_none());
}

#[test]
fn recursive_shapes_resolve_lazily() {
    plait_testhelpers::setup();

    let def = Node::SHAPE.as_struct().unwrap();
    let children = def.field("children").unwrap().shape();
    let list = children.as_list().unwrap();
    assert_eq!(list.kind, ListKind::List);
    assert!(list.t().is(Node::SHAPE));

    let parent = def.field("parent").unwrap().shape();
    let Def::Option(option) = parent.def else {
        panic!("parent is optional");
    };
    let Def::Pointer(pointer) = option.t().def else {
        panic!("parent is a pointer");
    };
    assert_eq!(pointer.kind, PointerKind::RcRefCell);
    assert!(parent.innermost().is(Node::SHAPE));
}

#[test]
fn fields_read_and_write_through_any() {
    plait_testhelpers::setup();

    let def = Node::SHAPE.as_struct().unwrap();
    let mut node = Node {
        name: "root".into(),
        children: vec![Node::default(), Node::default()],
        ..Node::default()
    };

    let name = def.field("name").unwrap();
    let read = (name.read.unwrap())(&node).unwrap();
    assert!(!read.is_owned());
    assert_eq!(read.get().downcast_ref::<String>().unwrap(), "root");

    let slot = (name.write.unwrap())(&mut node).unwrap();
    *slot.downcast_mut::<String>().unwrap() = "renamed".into();
    assert_eq!(node.name, "renamed");

    let count = def.field("child_count").unwrap();
    assert!(count.is_readable() && !count.is_writable());
    let read = (count.read.unwrap())(&node).unwrap();
    assert!(matches!(read, FieldRef::Owned(_)));
    assert_eq!(read.get().downcast_ref::<usize>(), Some(&2));

    assert!((name.read.unwrap())(&"not a node").is_none());
}

#[test]
fn enum_variants_and_discriminants() {
    plait_testhelpers::setup();

    let Def::Enum(def) = Priority::SHAPE.def else {
        panic!("Priority is an enum");
    };
    let discriminants: Vec<_> = def.variants.iter().map(|v| (v.name, v.discriminant)).collect();
    assert_eq!(discriminants, [("Low", 1), ("Normal", 2), ("Urgent", 40)]);

    assert_eq!(def.variant_of(&Priority::Urgent).unwrap().name, "Urgent");
    assert_eq!(def.index_of_name("normal"), Some(1));
    assert_eq!(def.index_of_discriminant(40), Some(2));
    assert_eq!(def.index_of_discriminant(3), None);

    let made = def.make(1).unwrap();
    assert_eq!(made.downcast_ref::<Priority>(), Some(&Priority::Normal));
    assert!(def.make(3).is_none());

    let default = (Priority::SHAPE.vtable.default.unwrap())().unwrap();
    assert_eq!(default.downcast_ref::<Priority>(), Some(&Priority::Low));
}

#[test]
fn opaque_types_are_cloned_whole() {
    plait_testhelpers::setup();

    assert!(matches!(Rgb::SHAPE.def, Def::Opaque));
    assert!(Rgb::SHAPE.vtable.default.is_none());

    let clone = (Rgb::SHAPE.vtable.clone.unwrap())(&Rgb(1, 2, 3)).unwrap();
    assert_eq!(clone.downcast_ref::<Rgb>(), Some(&Rgb(1, 2, 3)));
}

#[test]
fn display_names_nested_shapes() {
    plait_testhelpers::setup();

    assert_eq!(
        <Option<Vec<Box<u8>>>>::SHAPE.to_string(),
        "Option<Vec<Box<u8>>>"
    );
    assert_eq!(<Rc<RefCell<Node>>>::SHAPE.to_string(), "Rc<RefCell<Node>>");
    assert_eq!(<Arc<[String]>>::SHAPE.to_string(), "Arc<[String]>");
    let node: &dyn Any = &Node::default();
    assert!(!Node::SHAPE.is_none(node));
}
