use core::any::Any;

use crate::{Def, Mappable, OptionDef, OptionVTable, Shape, ShapeBuilder, shape_of};

fn option_get<T: Mappable>(option: &dyn Any) -> Option<&dyn Any> {
    option
        .downcast_ref::<Option<T>>()?
        .as_ref()
        .map(|value| value as &dyn Any)
}

fn option_get_mut<T: Mappable>(option: &mut dyn Any) -> Option<&mut dyn Any> {
    option
        .downcast_mut::<Option<T>>()?
        .as_mut()
        .map(|value| value as &mut dyn Any)
}

fn option_none<T: Mappable>() -> Box<dyn Any> {
    Box::new(None::<T>)
}

fn option_some<T: Mappable>(value: Box<dyn Any>) -> Option<Box<dyn Any>> {
    let value = value.downcast::<T>().ok()?;
    Some(Box::new(Some(*value)))
}

fn option_replace<T: Mappable>(option: &mut dyn Any, value: Box<dyn Any>) -> bool {
    match (option.downcast_mut::<Option<T>>(), value.downcast::<T>()) {
        (Some(option), Ok(value)) => {
            *option = Some(*value);
            true
        }
        _ => false,
    }
}

fn option_default<T: Mappable>() -> Option<Box<dyn Any>> {
    Some(option_none::<T>())
}

impl<T: Mappable> Mappable for Option<T> {
    const SHAPE: &'static Shape = &const {
        ShapeBuilder::for_type::<Self>("Option")
            .def(Def::Option(OptionDef::new(
                shape_of::<T>,
                &const {
                    OptionVTable {
                        get: option_get::<T>,
                        get_mut: option_get_mut::<T>,
                        none: option_none::<T>,
                        some: option_some::<T>,
                        replace: option_replace::<T>,
                    }
                },
            )))
            .default_fn(option_default::<T>)
            .build()
    };
}
