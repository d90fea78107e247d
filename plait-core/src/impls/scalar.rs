use core::any::Any;
use core::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    Def, Mappable, Scalar, ScalarDef, ScalarType, ScalarValue, Shape, ShapeBuilder, clone_boxed,
    read_scalar, write_scalar,
};

macro_rules! impl_scalar {
    ($($ty:ty => $variant:ident as $ident:literal, default $default:expr;)*) => {
        $(
            impl Scalar for $ty {
                const TYPE: ScalarType = ScalarType::$variant;

                fn to_scalar(&self) -> ScalarValue {
                    ScalarValue::$variant(self.clone())
                }

                fn from_scalar(value: ScalarValue) -> Option<Self> {
                    match value {
                        ScalarValue::$variant(value) => Some(value),
                        _ => None,
                    }
                }
            }

            impl Mappable for $ty {
                const SHAPE: &'static Shape = &const {
                    ShapeBuilder::for_type::<$ty>($ident)
                        .def(Def::Scalar(ScalarDef::new(
                            ScalarType::$variant,
                            read_scalar::<$ty>,
                            write_scalar::<$ty>,
                        )))
                        .default_fn({
                            fn default_value() -> Option<Box<dyn Any>> {
                                let value: $ty = $default;
                                Some(Box::new(value))
                            }
                            default_value
                        })
                        .clone_fn(clone_boxed::<$ty>)
                        .build()
                };
            }
        )*
    };
}

impl_scalar! {
    bool => Bool as "bool", default false;
    i8 => I8 as "i8", default 0;
    i16 => I16 as "i16", default 0;
    i32 => I32 as "i32", default 0;
    i64 => I64 as "i64", default 0;
    i128 => I128 as "i128", default 0;
    isize => ISize as "isize", default 0;
    u8 => U8 as "u8", default 0;
    u16 => U16 as "u16", default 0;
    u32 => U32 as "u32", default 0;
    u64 => U64 as "u64", default 0;
    u128 => U128 as "u128", default 0;
    usize => USize as "usize", default 0;
    f32 => F32 as "f32", default 0.0;
    f64 => F64 as "f64", default 0.0;
    char => Char as "char", default '\0';
    String => String as "String", default String::new();
    Decimal => Decimal as "Decimal", default Decimal::ZERO;
    NaiveDateTime => DateTime as "NaiveDateTime", default NaiveDateTime::default();
    DateTime<Utc> => DateTimeUtc as "DateTime<Utc>", default DateTime::<Utc>::default();
    DateTime<FixedOffset> => DateTimeOffset as "DateTime<FixedOffset>", default DateTime::<FixedOffset>::default();
    NaiveDate => Date as "NaiveDate", default NaiveDate::default();
    Uuid => Uuid as "Uuid", default Uuid::nil();
    TimeDelta => TimeDelta as "TimeDelta", default TimeDelta::zero();
    Duration => Duration as "Duration", default Duration::ZERO;
}
