//! Typed parameter values.
//!
//! [`Value`] has one variant per non-`None` [`ParameterDataType`]. Null is
//! modelled as `Option::None` at every API boundary, never as a variant.

mod enum_value;
pub mod time_span;
mod version;
mod xml;

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, FixedOffset, TimeDelta};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use url::Url;
use uuid::Uuid;

pub use enum_value::{EnumDefinition, EnumMemberError, EnumValue};
pub(crate) use enum_value::parse_integer_literal;
pub use version::Version;
pub use xml::{XmlElement, XmlNode, XmlValue};

use crate::codec::primitive;
use crate::data_type::ParameterDataType;
use crate::error::ConversionError;

/// A typed parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Byte(u8),
    SignedByte(i8),
    Single(f32),
    Double(f64),
    Decimal(Decimal),
    Boolean(bool),
    DateTimeOffset(DateTime<FixedOffset>),
    TimeSpan(TimeDelta),
    Uri(Url),
    Version(Version),
    Guid(Uuid),
    Bytes(Vec<u8>),
    Enum(EnumValue),
    Xml(XmlValue),
}

/// Numeric payload used for conversions inside the numeric family.
#[derive(Debug, Clone, Copy)]
enum Number {
    Integer(i128),
    Float(f64),
    Decimal(Decimal),
}

impl Value {
    /// The data type this value carries.
    pub const fn data_type(&self) -> ParameterDataType {
        match self {
            Self::String(_) => ParameterDataType::String,
            Self::Int16(_) => ParameterDataType::Int16,
            Self::Int32(_) => ParameterDataType::Int32,
            Self::Int64(_) => ParameterDataType::Int64,
            Self::UInt16(_) => ParameterDataType::UInt16,
            Self::UInt32(_) => ParameterDataType::UInt32,
            Self::UInt64(_) => ParameterDataType::UInt64,
            Self::Byte(_) => ParameterDataType::Byte,
            Self::SignedByte(_) => ParameterDataType::SignedByte,
            Self::Single(_) => ParameterDataType::Single,
            Self::Double(_) => ParameterDataType::Double,
            Self::Decimal(_) => ParameterDataType::Decimal,
            Self::Boolean(_) => ParameterDataType::Boolean,
            Self::DateTimeOffset(_) => ParameterDataType::DateTimeOffset,
            Self::TimeSpan(_) => ParameterDataType::TimeSpan,
            Self::Uri(_) => ParameterDataType::Uri,
            Self::Version(_) => ParameterDataType::Version,
            Self::Guid(_) => ParameterDataType::Guid,
            Self::Bytes(_) => ParameterDataType::Bytes,
            Self::Enum(_) => ParameterDataType::Enum,
            Self::Xml(_) => ParameterDataType::Xml,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Converts the value to `target`.
    ///
    /// Values of the target type are returned unchanged. Inside the numeric
    /// family (integers, floats, decimal) the conversion is attempted and
    /// range-checked; floats and decimals only become integers when they
    /// have no fractional part. Other families only convert to themselves.
    pub fn convert_to(&self, target: ParameterDataType) -> Result<Self, ConversionError> {
        if target == ParameterDataType::None {
            return Err(ConversionError::NoneDataType);
        }
        if self.data_type() == target {
            return Ok(self.clone());
        }
        match self.number() {
            Some(number) if target.is_numeric() => Self::from_number(number, target),
            _ => Err(ConversionError::TypeMismatch {
                expected: target,
                actual: self.data_type(),
            }),
        }
    }

    /// Orders two values of the same variant.
    ///
    /// Returns `None` for different variants, unordered payloads (URIs,
    /// GUIDs, enums, XML) and NaN.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::String(a), Self::String(b)) => a.partial_cmp(b),
            (Self::Int16(a), Self::Int16(b)) => a.partial_cmp(b),
            (Self::Int32(a), Self::Int32(b)) => a.partial_cmp(b),
            (Self::Int64(a), Self::Int64(b)) => a.partial_cmp(b),
            (Self::UInt16(a), Self::UInt16(b)) => a.partial_cmp(b),
            (Self::UInt32(a), Self::UInt32(b)) => a.partial_cmp(b),
            (Self::UInt64(a), Self::UInt64(b)) => a.partial_cmp(b),
            (Self::Byte(a), Self::Byte(b)) => a.partial_cmp(b),
            (Self::SignedByte(a), Self::SignedByte(b)) => a.partial_cmp(b),
            (Self::Single(a), Self::Single(b)) => a.partial_cmp(b),
            (Self::Double(a), Self::Double(b)) => a.partial_cmp(b),
            (Self::Decimal(a), Self::Decimal(b)) => a.partial_cmp(b),
            (Self::Boolean(a), Self::Boolean(b)) => a.partial_cmp(b),
            (Self::DateTimeOffset(a), Self::DateTimeOffset(b)) => a.partial_cmp(b),
            (Self::TimeSpan(a), Self::TimeSpan(b)) => a.partial_cmp(b),
            (Self::Version(a), Self::Version(b)) => a.partial_cmp(b),
            _ => None,
        }
    }

    fn number(&self) -> Option<Number> {
        Some(match self {
            Self::Int16(v) => Number::Integer((*v).into()),
            Self::Int32(v) => Number::Integer((*v).into()),
            Self::Int64(v) => Number::Integer((*v).into()),
            Self::UInt16(v) => Number::Integer((*v).into()),
            Self::UInt32(v) => Number::Integer((*v).into()),
            Self::UInt64(v) => Number::Integer((*v).into()),
            Self::Byte(v) => Number::Integer((*v).into()),
            Self::SignedByte(v) => Number::Integer((*v).into()),
            Self::Single(v) => Number::Float((*v).into()),
            Self::Double(v) => Number::Float(*v),
            Self::Decimal(v) => Number::Decimal(*v),
            _ => return None,
        })
    }

    fn from_number(number: Number, target: ParameterDataType) -> Result<Self, ConversionError> {
        let out_of_range = || {
            let text = match number {
                Number::Integer(v) => v.to_string(),
                Number::Float(v) => v.to_string(),
                Number::Decimal(v) => v.to_string(),
            };
            ConversionError::out_of_range(target, text)
        };

        match target {
            ParameterDataType::Single => {
                let converted = match number {
                    Number::Integer(v) => Some(v as f32),
                    Number::Float(v) => {
                        let narrowed = v as f32;
                        (!v.is_finite() || narrowed.is_finite()).then_some(narrowed)
                    }
                    Number::Decimal(v) => v.to_f32(),
                };
                converted.map(Self::Single).ok_or_else(out_of_range)
            }
            ParameterDataType::Double => {
                let converted = match number {
                    Number::Integer(v) => Some(v as f64),
                    Number::Float(v) => Some(v),
                    Number::Decimal(v) => v.to_f64(),
                };
                converted.map(Self::Double).ok_or_else(out_of_range)
            }
            ParameterDataType::Decimal => {
                let converted = match number {
                    Number::Integer(v) => Decimal::try_from_i128_with_scale(v, 0).ok(),
                    Number::Float(v) => Decimal::from_f64(v),
                    Number::Decimal(v) => Some(v),
                };
                converted.map(Self::Decimal).ok_or_else(out_of_range)
            }
            _ => {
                let integer = match number {
                    Number::Integer(v) => Some(v),
                    // saturating cast; anything past i128 fails the range check below
                    Number::Float(v) if v.is_finite() && v.fract() == 0.0 => Some(v as i128),
                    Number::Float(_) => None,
                    Number::Decimal(v) if v.fract().is_zero() => v.to_i128(),
                    Number::Decimal(_) => None,
                };
                integer
                    .and_then(|v| Self::from_integer(v, target))
                    .ok_or_else(out_of_range)
            }
        }
    }

    fn from_integer(value: i128, target: ParameterDataType) -> Option<Self> {
        match target {
            ParameterDataType::Int16 => i16::try_from(value).ok().map(Self::Int16),
            ParameterDataType::Int32 => i32::try_from(value).ok().map(Self::Int32),
            ParameterDataType::Int64 => i64::try_from(value).ok().map(Self::Int64),
            ParameterDataType::UInt16 => u16::try_from(value).ok().map(Self::UInt16),
            ParameterDataType::UInt32 => u32::try_from(value).ok().map(Self::UInt32),
            ParameterDataType::UInt64 => u64::try_from(value).ok().map(Self::UInt64),
            ParameterDataType::Byte => u8::try_from(value).ok().map(Self::Byte),
            ParameterDataType::SignedByte => i8::try_from(value).ok().map(Self::SignedByte),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enum(v) => v.fmt(f),
            Self::Xml(v) => v.fmt(f),
            other => f.write_str(&primitive::format(other).map_err(|_| fmt::Error)?),
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Self::$variant(value)
            }
        })+
    };
}

impl_from! {
    String => String,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    u8 => Byte,
    i8 => SignedByte,
    f32 => Single,
    f64 => Double,
    Decimal => Decimal,
    bool => Boolean,
    DateTime<FixedOffset> => DateTimeOffset,
    TimeDelta => TimeSpan,
    Url => Uri,
    Version => Version,
    Uuid => Guid,
    Vec<u8> => Bytes,
    EnumValue => Enum,
    XmlValue => Xml,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(value.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[rstest]
    #[case(Value::Int32(17), ParameterDataType::Int64, Value::Int64(17))]
    #[case(Value::Int64(200), ParameterDataType::Byte, Value::Byte(200))]
    #[case(Value::Double(4.0), ParameterDataType::Int16, Value::Int16(4))]
    #[case(Value::Int32(3), ParameterDataType::Double, Value::Double(3.0))]
    #[case(Value::Byte(7), ParameterDataType::Decimal, Value::Decimal(Decimal::from(7)))]
    #[case(
        Value::Decimal(Decimal::from_str("12.00").unwrap()),
        ParameterDataType::UInt32,
        Value::UInt32(12)
    )]
    fn numeric_family_converts(
        #[case] value: Value,
        #[case] target: ParameterDataType,
        #[case] expected: Value,
    ) {
        assert_eq!(value.convert_to(target).unwrap(), expected);
    }

    #[rstest]
    #[case(Value::Int32(300), ParameterDataType::Byte)]
    #[case(Value::Int32(-1), ParameterDataType::UInt64)]
    #[case(Value::Double(1.5), ParameterDataType::Int32)]
    #[case(Value::Double(f64::NAN), ParameterDataType::Int32)]
    #[case(Value::Double(1e300), ParameterDataType::Single)]
    fn narrowing_is_checked(#[case] value: Value, #[case] target: ParameterDataType) {
        assert!(matches!(
            value.convert_to(target),
            Err(ConversionError::OutOfRange { .. })
        ));
    }

    #[test]
    fn other_families_only_convert_to_themselves() {
        let err = Value::from("17").convert_to(ParameterDataType::Int32).unwrap_err();
        assert_eq!(
            err,
            ConversionError::TypeMismatch {
                expected: ParameterDataType::Int32,
                actual: ParameterDataType::String,
            }
        );
        assert!(Value::Boolean(true).convert_to(ParameterDataType::Int32).is_err());
        assert_eq!(
            Value::Int32(1).convert_to(ParameterDataType::None),
            Err(ConversionError::NoneDataType)
        );
    }

    #[test]
    fn compare_same_variant_only() {
        assert_eq!(
            Value::Int32(1).compare(&Value::Int32(2)),
            Some(Ordering::Less)
        );
        assert_eq!(Value::Int32(1).compare(&Value::Int64(2)), None);
        assert_eq!(Value::Double(f64::NAN).compare(&Value::Double(1.0)), None);
        assert_eq!(
            Value::TimeSpan(TimeDelta::hours(2)).compare(&Value::TimeSpan(TimeDelta::hours(1))),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn display_uses_canonical_text() {
        assert_eq!(Value::Boolean(true).to_string(), "true");
        assert_eq!(Value::Bytes(vec![1, 2, 3]).to_string(), "AQID");
        assert_eq!(Value::Enum(EnumValue::new(4)).to_string(), "4");
    }
}
