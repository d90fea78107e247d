use core::any::Any;
use core::str::FromStr;

use plait_core::{Def, EnumDef, Mappable, ScalarType, ScalarValue, Shape, Variant};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

use crate::ConvertError;
use crate::temporal;

/// Whether values of this shape are converted rather than mapped field by
/// field: scalars and fieldless enums, possibly behind `Option`s and pointers.
pub fn is_simple(shape: &'static Shape) -> bool {
    matches!(shape.innermost().def, Def::Scalar(_) | Def::Enum(_))
}

/// Converts `value`, of shape `from`, into a new value of shape `to`.
///
/// `Option` and pointer layers are looked through on the source and
/// rebuilt on the destination.
pub fn convert(
    value: &dyn Any,
    from: &'static Shape,
    to: &'static Shape,
) -> Result<Box<dyn Any>, ConvertError> {
    match from.def {
        Def::Option(option) => match (option.vtable.get)(value) {
            Some(inner) => convert(inner, option.t(), to),
            None => missing(to),
        },
        Def::Pointer(pointer) => {
            let mut converted = Err(ConvertError::Access);
            (pointer.vtable.borrow)(value, &mut |inner: &dyn Any| {
                converted = convert(inner, pointer.pointee(), to);
            });
            converted
        }
        _ => convert_present(value, from, to),
    }
}

/// Typed [`convert`].
///
/// ```
/// use plait::{convert_value, ConvertError};
///
/// assert_eq!(convert_value::<String, u8>(&" 42 ".to_string()), Ok(42));
/// assert_eq!(
///     convert_value::<i32, u8>(&300),
///     Err(ConvertError::OutOfRange { to: "u8" })
/// );
/// assert_eq!(convert_value::<Option<f64>, Option<i64>>(&None), Ok(None));
/// ```
pub fn convert_value<S: Mappable, D: Mappable>(value: &S) -> Result<D, ConvertError> {
    let converted = convert(value, S::SHAPE, D::SHAPE)?;
    converted
        .downcast::<D>()
        .map(|value| *value)
        .map_err(|_| ConvertError::Access)
}

fn missing(to: &'static Shape) -> Result<Box<dyn Any>, ConvertError> {
    match to.def {
        Def::Option(option) => Ok((option.vtable.none)()),
        _ => Err(ConvertError::Null {
            to: to.type_identifier,
        }),
    }
}

fn convert_present(
    value: &dyn Any,
    from: &'static Shape,
    to: &'static Shape,
) -> Result<Box<dyn Any>, ConvertError> {
    match to.def {
        Def::Option(option) => {
            let inner = convert_present(value, from, option.t())?;
            (option.vtable.some)(inner).ok_or(ConvertError::Access)
        }
        Def::Pointer(pointer) => {
            let inner = convert_present(value, from, pointer.pointee())?;
            (pointer.vtable.new)(inner).ok_or(ConvertError::Access)
        }
        Def::Scalar(scalar) => {
            let converted = match read(value, from)? {
                Simple::Scalar(source) => coerce(source, scalar.ty)?,
                Simple::Variant(variant) => from_variant(variant, from, scalar.ty)?,
            };
            (scalar.write)(converted).ok_or(ConvertError::Access)
        }
        Def::Enum(def) => {
            let index = match read(value, from)? {
                Simple::Scalar(source) => variant_for(&def, source, to)?,
                Simple::Variant(variant) if from.is(to) => def
                    .index_of_name(variant.name)
                    .ok_or(ConvertError::Access)?,
                Simple::Variant(variant) => {
                    def.index_of_name(variant.name)
                        .ok_or_else(|| ConvertError::Parse {
                            input: variant.name.to_owned(),
                            to: to.type_identifier,
                        })?
                }
            };
            def.make(index).ok_or(ConvertError::Access)
        }
        _ => Err(unsupported(from, to)),
    }
}

/// A source value read out of a scalar or enum shape.
enum Simple {
    Scalar(ScalarValue),
    Variant(&'static Variant),
}

fn read(value: &dyn Any, from: &'static Shape) -> Result<Simple, ConvertError> {
    match from.def {
        Def::Scalar(scalar) => (scalar.read)(value)
            .map(Simple::Scalar)
            .ok_or(ConvertError::Access),
        Def::Enum(def) => def
            .variant_of(value)
            .map(Simple::Variant)
            .ok_or(ConvertError::Access),
        _ => Err(ConvertError::Unsupported {
            from: from.type_identifier,
            to: "a simple value",
        }),
    }
}

fn unsupported(from: &Shape, to: &Shape) -> ConvertError {
    ConvertError::Unsupported {
        from: from.type_identifier,
        to: to.type_identifier,
    }
}

fn unsupported_scalar(from: ScalarType, to: ScalarType) -> ConvertError {
    ConvertError::Unsupported {
        from: from.name(),
        to: to.name(),
    }
}

/// Enum into scalar: numeric destinations get the discriminant.
fn from_variant(
    variant: &Variant,
    from: &'static Shape,
    to: ScalarType,
) -> Result<ScalarValue, ConvertError> {
    if to.is_numeric() || to == ScalarType::Bool {
        coerce(ScalarValue::I64(variant.discriminant), to)
    } else {
        Err(ConvertError::Unsupported {
            from: from.type_identifier,
            to: to.name(),
        })
    }
}

/// Scalar into enum: names for strings, discriminants for integers.
fn variant_for(
    def: &EnumDef,
    source: ScalarValue,
    to: &'static Shape,
) -> Result<usize, ConvertError> {
    let discriminant = match source {
        ScalarValue::String(text) => {
            let trimmed = text.trim();
            if let Some(index) = def.index_of_name(trimmed) {
                return Ok(index);
            }
            trimmed.parse::<i64>().map_err(|_| ConvertError::Parse {
                input: text.clone(),
                to: to.type_identifier,
            })?
        }
        source if source.ty().is_integer() => {
            let value = integer_of(&source, ScalarType::I64)?;
            i64::try_from(value).map_err(|_| ConvertError::OutOfRange {
                to: to.type_identifier,
            })?
        }
        source => {
            return Err(ConvertError::Unsupported {
                from: source.ty().name(),
                to: to.type_identifier,
            });
        }
    };
    def.index_of_discriminant(discriminant)
        .ok_or(ConvertError::OutOfRange {
            to: to.type_identifier,
        })
}

/// Converts a scalar into another scalar type.
pub(crate) fn coerce(value: ScalarValue, to: ScalarType) -> Result<ScalarValue, ConvertError> {
    if value.ty() == to {
        return Ok(value);
    }
    match to {
        ScalarType::String => Err(unsupported_scalar(value.ty(), to)),
        ScalarType::Bool => to_bool(value).map(ScalarValue::Bool),
        ScalarType::Char => to_char(value).map(ScalarValue::Char),
        ScalarType::F32 => to_f64(value, to).map(|float| ScalarValue::F32(float as f32)),
        ScalarType::F64 => to_f64(value, to).map(ScalarValue::F64),
        ScalarType::Decimal => to_decimal(value).map(ScalarValue::Decimal),
        ScalarType::Uuid => parse_text(value, to, temporal::parse_uuid, ScalarValue::Uuid),
        ScalarType::DateTime => {
            parse_text(value, to, temporal::parse_date_time, ScalarValue::DateTime)
        }
        ScalarType::DateTimeUtc => parse_text(
            value,
            to,
            temporal::parse_date_time_utc,
            ScalarValue::DateTimeUtc,
        ),
        ScalarType::DateTimeOffset => parse_text(
            value,
            to,
            temporal::parse_date_time_offset,
            ScalarValue::DateTimeOffset,
        ),
        ScalarType::Date => parse_text(value, to, temporal::parse_date, ScalarValue::Date),
        ScalarType::TimeDelta => {
            parse_text(value, to, temporal::parse_time_delta, ScalarValue::TimeDelta)
        }
        ScalarType::Duration => {
            parse_text(value, to, temporal::parse_duration, ScalarValue::Duration)
        }
        integer => {
            let value = integer_of(&value, integer)?;
            narrow(value, integer)
        }
    }
}

/// Strict parse of a string source. Other sources have no rule.
fn parse_text<T>(
    value: ScalarValue,
    to: ScalarType,
    parse: fn(&str) -> Option<T>,
    wrap: fn(T) -> ScalarValue,
) -> Result<ScalarValue, ConvertError> {
    match value {
        ScalarValue::String(text) => match parse(&text) {
            Some(parsed) => Ok(wrap(parsed)),
            None => Err(ConvertError::Parse {
                input: text,
                to: to.name(),
            }),
        },
        other => Err(unsupported_scalar(other.ty(), to)),
    }
}

fn parse_error(text: &str, to: ScalarType) -> ConvertError {
    ConvertError::Parse {
        input: text.to_owned(),
        to: to.name(),
    }
}

fn out_of_range(to: ScalarType) -> ConvertError {
    ConvertError::OutOfRange { to: to.name() }
}

/// Any integer, `bool`, `char`, float, decimal or numeric string as an
/// `i128`. Fractions are rounded half to even.
fn integer_of(value: &ScalarValue, to: ScalarType) -> Result<i128, ConvertError> {
    Ok(match value {
        ScalarValue::Bool(flag) => i128::from(*flag),
        ScalarValue::I8(int) => i128::from(*int),
        ScalarValue::I16(int) => i128::from(*int),
        ScalarValue::I32(int) => i128::from(*int),
        ScalarValue::I64(int) => i128::from(*int),
        ScalarValue::I128(int) => *int,
        ScalarValue::ISize(int) => *int as i128,
        ScalarValue::U8(int) => i128::from(*int),
        ScalarValue::U16(int) => i128::from(*int),
        ScalarValue::U32(int) => i128::from(*int),
        ScalarValue::U64(int) => i128::from(*int),
        ScalarValue::U128(int) => i128::try_from(*int).map_err(|_| out_of_range(to))?,
        ScalarValue::USize(int) => *int as i128,
        ScalarValue::Char(c) => i128::from(u32::from(*c)),
        ScalarValue::F32(float) => float_to_integer(f64::from(*float), to)?,
        ScalarValue::F64(float) => float_to_integer(*float, to)?,
        ScalarValue::Decimal(decimal) => decimal
            .round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointNearestEven)
            .to_i128()
            .ok_or_else(|| out_of_range(to))?,
        ScalarValue::String(text) => {
            let trimmed = text.trim();
            match trimmed.parse::<i128>() {
                Ok(int) => int,
                Err(_) => return Err(parse_error(text, to)),
            }
        }
        other => return Err(unsupported_scalar(other.ty(), to)),
    })
}

fn float_to_integer(float: f64, to: ScalarType) -> Result<i128, ConvertError> {
    let rounded = float.round_ties_even();
    // 2^127 is exactly representable; anything at or above it does not fit
    if !rounded.is_finite() || rounded < -(2f64.powi(127)) || rounded >= 2f64.powi(127) {
        return Err(out_of_range(to));
    }
    Ok(rounded as i128)
}

/// Checked narrowing into the destination integer type.
fn narrow(value: i128, to: ScalarType) -> Result<ScalarValue, ConvertError> {
    let out = || out_of_range(to);
    Ok(match to {
        ScalarType::I8 => ScalarValue::I8(i8::try_from(value).map_err(|_| out())?),
        ScalarType::I16 => ScalarValue::I16(i16::try_from(value).map_err(|_| out())?),
        ScalarType::I32 => ScalarValue::I32(i32::try_from(value).map_err(|_| out())?),
        ScalarType::I64 => ScalarValue::I64(i64::try_from(value).map_err(|_| out())?),
        ScalarType::I128 => ScalarValue::I128(value),
        ScalarType::ISize => ScalarValue::ISize(isize::try_from(value).map_err(|_| out())?),
        ScalarType::U8 => ScalarValue::U8(u8::try_from(value).map_err(|_| out())?),
        ScalarType::U16 => ScalarValue::U16(u16::try_from(value).map_err(|_| out())?),
        ScalarType::U32 => ScalarValue::U32(u32::try_from(value).map_err(|_| out())?),
        ScalarType::U64 => ScalarValue::U64(u64::try_from(value).map_err(|_| out())?),
        ScalarType::U128 => ScalarValue::U128(u128::try_from(value).map_err(|_| out())?),
        ScalarType::USize => ScalarValue::USize(usize::try_from(value).map_err(|_| out())?),
        other => return Err(unsupported_scalar(ScalarType::I128, other)),
    })
}

fn to_f64(value: ScalarValue, to: ScalarType) -> Result<f64, ConvertError> {
    match value {
        ScalarValue::F32(float) => Ok(f64::from(float)),
        ScalarValue::F64(float) => Ok(float),
        ScalarValue::Decimal(decimal) => decimal.to_f64().ok_or_else(|| out_of_range(to)),
        ScalarValue::String(text) => text.trim().parse().map_err(|_| parse_error(&text, to)),
        ScalarValue::Char(_) => Err(unsupported_scalar(ScalarType::Char, to)),
        other => Ok(integer_of(&other, to)? as f64),
    }
}

fn to_decimal(value: ScalarValue) -> Result<Decimal, ConvertError> {
    let to = ScalarType::Decimal;
    match value {
        ScalarValue::F32(float) => Decimal::from_f32(float).ok_or_else(|| out_of_range(to)),
        ScalarValue::F64(float) => Decimal::from_f64(float).ok_or_else(|| out_of_range(to)),
        ScalarValue::String(text) => {
            let trimmed = text.trim();
            Decimal::from_str(trimmed)
                .or_else(|_| Decimal::from_scientific(trimmed))
                .map_err(|_| parse_error(&text, to))
        }
        ScalarValue::Char(_) => Err(unsupported_scalar(ScalarType::Char, to)),
        other => {
            let int = integer_of(&other, to)?;
            Decimal::from_i128(int).ok_or_else(|| out_of_range(to))
        }
    }
}

fn to_bool(value: ScalarValue) -> Result<bool, ConvertError> {
    let to = ScalarType::Bool;
    match value {
        ScalarValue::F32(float) => Ok(float != 0.0),
        ScalarValue::F64(float) => Ok(float != 0.0),
        ScalarValue::Decimal(decimal) => Ok(!decimal.is_zero()),
        ScalarValue::String(text) => {
            let trimmed = text.trim();
            if trimmed.eq_ignore_ascii_case("true") {
                Ok(true)
            } else if trimmed.eq_ignore_ascii_case("false") {
                Ok(false)
            } else {
                Err(parse_error(&text, to))
            }
        }
        other if other.ty().is_integer() => Ok(integer_of(&other, to)? != 0),
        other => Err(unsupported_scalar(other.ty(), to)),
    }
}

fn to_char(value: ScalarValue) -> Result<char, ConvertError> {
    let to = ScalarType::Char;
    match value {
        ScalarValue::String(text) => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(c),
                _ => Err(parse_error(&text, to)),
            }
        }
        other if other.ty().is_integer() => {
            let code = integer_of(&other, to)?;
            u32::try_from(code)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(|| out_of_range(to))
        }
        other => Err(unsupported_scalar(other.ty(), to)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use core::time::Duration;
    use plait_core::mappable;
    use std::cell::RefCell;
    use std::rc::Rc;
    use uuid::Uuid;

    mappable! {
        #[derive(Debug, Clone, Copy, PartialEq)]
        enum Color {
            Red = 1,
            Green = 2,
            Blue = 4,
        }
    }

    mappable! {
        #[derive(Debug, Clone, Copy, PartialEq)]
        enum Paint {
            Blue,
            Red,
        }
    }

    #[test]
    fn strings_parse_into_numbers() {
        plait_testhelpers::setup();

        assert_eq!(convert_value::<String, i32>(&"30".into()), Ok(30));
        assert_eq!(convert_value::<String, u64>(&" 7\n".into()), Ok(7));
        assert_eq!(convert_value::<String, f64>(&"2.5".into()), Ok(2.5));
        assert_eq!(
            convert_value::<String, Decimal>(&"19.99".into()),
            Ok(Decimal::new(1999, 2))
        );
        assert_eq!(
            convert_value::<String, i32>(&"thirty".into()),
            Err(ConvertError::Parse {
                input: "thirty".into(),
                to: "i32"
            })
        );
        assert_eq!(
            convert_value::<String, u8>(&"256".into()),
            Err(ConvertError::OutOfRange { to: "u8" })
        );
    }

    #[test]
    fn fractions_round_half_to_even() {
        plait_testhelpers::setup();

        assert_eq!(convert_value::<f64, i32>(&2.5), Ok(2));
        assert_eq!(convert_value::<f64, i32>(&3.5), Ok(4));
        assert_eq!(convert_value::<f32, i64>(&-1.5), Ok(-2));
        assert_eq!(convert_value::<Decimal, u8>(&Decimal::new(125, 1)), Ok(12));
        assert_eq!(
            convert_value::<f64, i64>(&f64::NAN),
            Err(ConvertError::OutOfRange { to: "i64" })
        );
        assert_eq!(
            convert_value::<f64, u8>(&-0.6),
            Err(ConvertError::OutOfRange { to: "u8" })
        );
    }

    #[test]
    fn bools_and_chars() {
        plait_testhelpers::setup();

        assert_eq!(convert_value::<bool, u8>(&true), Ok(1));
        assert_eq!(convert_value::<i64, bool>(&-3), Ok(true));
        assert_eq!(convert_value::<String, bool>(&" TRUE ".into()), Ok(true));
        assert_eq!(convert_value::<u32, char>(&65), Ok('A'));
        assert_eq!(convert_value::<char, u16>(&'a'), Ok(97));
        assert_eq!(convert_value::<String, char>(&"x".into()), Ok('x'));
        assert!(convert_value::<String, char>(&"xy".into()).is_err());
        assert!(matches!(
            convert_value::<char, f64>(&'a'),
            Err(ConvertError::Unsupported { .. })
        ));
    }

    #[test]
    fn only_strings_become_strings() {
        plait_testhelpers::setup();

        assert_eq!(
            convert_value::<i32, String>(&5),
            Err(ConvertError::Unsupported {
                from: "i32",
                to: "String"
            })
        );
        assert_eq!(
            convert_value::<String, String>(&"same".into()),
            Ok(String::from("same"))
        );
    }

    #[test]
    fn enums_by_name_and_discriminant() {
        plait_testhelpers::setup();

        assert_eq!(convert_value::<String, Color>(&"green".into()), Ok(Color::Green));
        assert_eq!(convert_value::<String, Color>(&"4".into()), Ok(Color::Blue));
        assert_eq!(convert_value::<u8, Color>(&1), Ok(Color::Red));
        assert_eq!(
            convert_value::<u8, Color>(&3),
            Err(ConvertError::OutOfRange { to: "Color" })
        );
        assert!(matches!(
            convert_value::<String, Color>(&"purple".into()),
            Err(ConvertError::Parse { .. })
        ));

        assert_eq!(convert_value::<Color, i32>(&Color::Blue), Ok(4));
        assert_eq!(convert_value::<Color, Paint>(&Color::Red), Ok(Paint::Red));
        assert_eq!(
            convert_value::<Color, Paint>(&Color::Green),
            Err(ConvertError::Parse {
                input: "Green".into(),
                to: "Paint"
            })
        );
        assert!(convert_value::<Color, String>(&Color::Red).is_err());
    }

    #[test]
    fn text_into_ids_dates_and_spans() {
        plait_testhelpers::setup();

        let id = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
        assert_eq!(
            convert_value::<String, Uuid>(&id.into()),
            Ok(Uuid::parse_str(id).unwrap())
        );
        assert!(matches!(
            convert_value::<String, Uuid>(&"not-a-uuid".into()),
            Err(ConvertError::Parse { .. })
        ));
        assert_eq!(
            convert_value::<String, TimeDelta>(&"00:10".into()),
            Ok(TimeDelta::try_minutes(10).unwrap())
        );
        assert_eq!(
            convert_value::<String, Duration>(&"1".into()),
            Ok(Duration::from_secs(86_400))
        );
        let days = String::from("99999999999999999999999999999999");
        assert!(matches!(
            convert_value::<String, TimeDelta>(&days),
            Err(ConvertError::Parse { .. })
        ));
        assert!(matches!(
            convert_value::<String, Duration>(&days),
            Err(ConvertError::Parse { .. })
        ));
        assert!(matches!(
            convert_value::<u64, Uuid>(&1),
            Err(ConvertError::Unsupported { .. })
        ));
    }

    #[test]
    fn options_and_pointers_are_peeled_and_rebuilt() {
        plait_testhelpers::setup();

        assert_eq!(
            convert_value::<Option<String>, Option<u8>>(&Some("9".into())),
            Ok(Some(9))
        );
        assert_eq!(convert_value::<Option<String>, Option<u8>>(&None), Ok(None));
        assert_eq!(
            convert_value::<Option<String>, u8>(&None),
            Err(ConvertError::Null { to: "u8" })
        );
        assert_eq!(convert_value::<Box<i32>, i64>(&Box::new(-4)), Ok(-4));

        let shared = Rc::new(RefCell::new(String::from("12")));
        let converted = convert_value::<Rc<RefCell<String>>, Rc<RefCell<u32>>>(&shared).unwrap();
        assert_eq!(*converted.borrow(), 12);

        let busy = shared.borrow_mut();
        assert_eq!(
            convert_value::<Rc<RefCell<String>>, u32>(&shared),
            Err(ConvertError::Access)
        );
        drop(busy);
    }

    #[test]
    fn simple_shapes() {
        plait_testhelpers::setup();

        assert!(is_simple(<Option<Box<u8>>>::SHAPE));
        assert!(is_simple(Color::SHAPE));
        assert!(!is_simple(<Vec<u8>>::SHAPE));
    }
}
