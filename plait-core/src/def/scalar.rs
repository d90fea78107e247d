use core::any::Any;
use core::fmt;
use core::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// All scalar types the mapper knows how to convert between.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum ScalarType {
    /// `bool`
    Bool,
    /// `i8`
    I8,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64`
    I64,
    /// `i128`
    I128,
    /// `isize`
    ISize,
    /// `u8`
    U8,
    /// `u16`
    U16,
    /// `u32`
    U32,
    /// `u64`
    U64,
    /// `u128`
    U128,
    /// `usize`
    USize,
    /// `f32`
    F32,
    /// `f64`
    F64,
    /// `char`
    Char,
    /// `String`
    String,
    /// `rust_decimal::Decimal`
    Decimal,
    /// `chrono::NaiveDateTime`, a date and time without an offset
    DateTime,
    /// `chrono::DateTime<Utc>`
    DateTimeUtc,
    /// `chrono::DateTime<FixedOffset>`
    DateTimeOffset,
    /// `chrono::NaiveDate`
    Date,
    /// `uuid::Uuid`
    Uuid,
    /// `chrono::TimeDelta`, a signed span of time
    TimeDelta,
    /// `core::time::Duration`, an unsigned span of time
    Duration,
}

impl ScalarType {
    /// Whether this is one of the integer types.
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            ScalarType::I8
                | ScalarType::I16
                | ScalarType::I32
                | ScalarType::I64
                | ScalarType::I128
                | ScalarType::ISize
                | ScalarType::U8
                | ScalarType::U16
                | ScalarType::U32
                | ScalarType::U64
                | ScalarType::U128
                | ScalarType::USize
        )
    }

    /// Whether this is an integer, float or decimal type.
    pub const fn is_numeric(self) -> bool {
        self.is_integer()
            || matches!(
                self,
                ScalarType::F32 | ScalarType::F64 | ScalarType::Decimal
            )
    }

    /// Name of the Rust type.
    pub const fn name(self) -> &'static str {
        match self {
            ScalarType::Bool => "bool",
            ScalarType::I8 => "i8",
            ScalarType::I16 => "i16",
            ScalarType::I32 => "i32",
            ScalarType::I64 => "i64",
            ScalarType::I128 => "i128",
            ScalarType::ISize => "isize",
            ScalarType::U8 => "u8",
            ScalarType::U16 => "u16",
            ScalarType::U32 => "u32",
            ScalarType::U64 => "u64",
            ScalarType::U128 => "u128",
            ScalarType::USize => "usize",
            ScalarType::F32 => "f32",
            ScalarType::F64 => "f64",
            ScalarType::Char => "char",
            ScalarType::String => "String",
            ScalarType::Decimal => "Decimal",
            ScalarType::DateTime => "NaiveDateTime",
            ScalarType::DateTimeUtc => "DateTime<Utc>",
            ScalarType::DateTimeOffset => "DateTime<FixedOffset>",
            ScalarType::Date => "NaiveDate",
            ScalarType::Uuid => "Uuid",
            ScalarType::TimeDelta => "TimeDelta",
            ScalarType::Duration => "Duration",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A scalar value, detached from the type it was read from.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum ScalarValue {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    I128(i128),
    ISize(isize),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    USize(usize),
    F32(f32),
    F64(f64),
    Char(char),
    String(String),
    Decimal(Decimal),
    DateTime(NaiveDateTime),
    DateTimeUtc(DateTime<Utc>),
    DateTimeOffset(DateTime<FixedOffset>),
    Date(NaiveDate),
    Uuid(Uuid),
    TimeDelta(TimeDelta),
    Duration(Duration),
}

impl ScalarValue {
    /// The type this value belongs to.
    pub const fn ty(&self) -> ScalarType {
        match self {
            ScalarValue::Bool(_) => ScalarType::Bool,
            ScalarValue::I8(_) => ScalarType::I8,
            ScalarValue::I16(_) => ScalarType::I16,
            ScalarValue::I32(_) => ScalarType::I32,
            ScalarValue::I64(_) => ScalarType::I64,
            ScalarValue::I128(_) => ScalarType::I128,
            ScalarValue::ISize(_) => ScalarType::ISize,
            ScalarValue::U8(_) => ScalarType::U8,
            ScalarValue::U16(_) => ScalarType::U16,
            ScalarValue::U32(_) => ScalarType::U32,
            ScalarValue::U64(_) => ScalarType::U64,
            ScalarValue::U128(_) => ScalarType::U128,
            ScalarValue::USize(_) => ScalarType::USize,
            ScalarValue::F32(_) => ScalarType::F32,
            ScalarValue::F64(_) => ScalarType::F64,
            ScalarValue::Char(_) => ScalarType::Char,
            ScalarValue::String(_) => ScalarType::String,
            ScalarValue::Decimal(_) => ScalarType::Decimal,
            ScalarValue::DateTime(_) => ScalarType::DateTime,
            ScalarValue::DateTimeUtc(_) => ScalarType::DateTimeUtc,
            ScalarValue::DateTimeOffset(_) => ScalarType::DateTimeOffset,
            ScalarValue::Date(_) => ScalarType::Date,
            ScalarValue::Uuid(_) => ScalarType::Uuid,
            ScalarValue::TimeDelta(_) => ScalarType::TimeDelta,
            ScalarValue::Duration(_) => ScalarType::Duration,
        }
    }
}

/// Reads a scalar value out of a value of the shape's type.
pub type ScalarReadFn = fn(value: &dyn Any) -> Option<ScalarValue>;

/// Builds a value of the shape's type from a scalar of the matching [`ScalarType`].
pub type ScalarWriteFn = fn(value: ScalarValue) -> Option<Box<dyn Any>>;

/// Describes a scalar type.
#[derive(Clone, Copy, Debug)]
pub struct ScalarDef {
    /// which scalar this is
    pub ty: ScalarType,
    /// cf. [`ScalarReadFn`]
    pub read: ScalarReadFn,
    /// cf. [`ScalarWriteFn`]
    pub write: ScalarWriteFn,
}

impl ScalarDef {
    /// Const ctor.
    pub const fn new(ty: ScalarType, read: ScalarReadFn, write: ScalarWriteFn) -> Self {
        Self { ty, read, write }
    }
}

/// A Rust type that maps one-to-one onto a [`ScalarValue`] variant.
pub trait Scalar: Any + Sized {
    /// Which variant.
    const TYPE: ScalarType;

    /// Wraps the value.
    fn to_scalar(&self) -> ScalarValue;

    /// Unwraps the value, if it is the right variant.
    fn from_scalar(value: ScalarValue) -> Option<Self>;
}

/// [`ScalarReadFn`] for any [`Scalar`].
pub fn read_scalar<T: Scalar>(value: &dyn Any) -> Option<ScalarValue> {
    value.downcast_ref::<T>().map(T::to_scalar)
}

/// [`ScalarWriteFn`] for any [`Scalar`].
pub fn write_scalar<T: Scalar>(value: ScalarValue) -> Option<Box<dyn Any>> {
    T::from_scalar(value).map(|value| Box::new(value) as Box<dyn Any>)
}
