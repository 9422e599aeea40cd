//! Canonical invariant text formats of the primitive data types.
//!
//! `parse` is the exact inverse of `format` for every type it accepts.
//! Enum and XML values need their describing constraints and are handled
//! by [`ValueCodec`](super::ValueCodec).

use std::num::IntErrorKind;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, SecondsFormat};
use rust_decimal::Decimal;
use url::Url;
use uuid::Uuid;

use crate::data_type::ParameterDataType;
use crate::error::ConversionError;
use crate::value::{Value, Version, time_span};

/// Canonical text of a value.
///
/// Fails only for XML trees that cannot be serialized.
pub(crate) fn format(value: &Value) -> Result<String, ConversionError> {
    let text = match value {
        Value::String(v) => v.clone(),
        Value::Int16(v) => v.to_string(),
        Value::Int32(v) => v.to_string(),
        Value::Int64(v) => v.to_string(),
        Value::UInt16(v) => v.to_string(),
        Value::UInt32(v) => v.to_string(),
        Value::UInt64(v) => v.to_string(),
        Value::Byte(v) => v.to_string(),
        Value::SignedByte(v) => v.to_string(),
        // shortest representation that parses back to the same bits
        Value::Single(v) => v.to_string(),
        Value::Double(v) => v.to_string(),
        Value::Decimal(v) => v.to_string(),
        Value::Boolean(v) => v.to_string(),
        Value::DateTimeOffset(v) => v.to_rfc3339_opts(SecondsFormat::AutoSi, false),
        Value::TimeSpan(v) => time_span::format(v),
        Value::Uri(v) => v.as_str().to_owned(),
        Value::Version(v) => v.to_string(),
        Value::Guid(v) => v.hyphenated().to_string(),
        Value::Bytes(v) => STANDARD.encode(v),
        Value::Enum(v) => v.value().to_string(),
        Value::Xml(v) => v.root().to_xml_string()?,
    };
    Ok(text)
}

/// Whether `text` is a nonzero negative integer literal, which no unsigned
/// type holds.
fn is_negative_literal(text: &str) -> bool {
    text.strip_prefix('-').is_some_and(|digits| {
        digits.bytes().all(|b| b.is_ascii_digit()) && digits.bytes().any(|b| b != b'0')
    })
}

macro_rules! parse_int {
    ($text:expr, $data_type:expr, $ty:ty, $variant:ident) => {
        $text
            .parse::<$ty>()
            .map(Value::$variant)
            .map_err(|err| match err.kind() {
                IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                    ConversionError::out_of_range($data_type, $text)
                }
                _ if <$ty>::MIN == 0 && is_negative_literal($text) => {
                    ConversionError::out_of_range($data_type, $text)
                }
                _ => ConversionError::invalid_format($data_type, $text, err),
            })
    };
}

/// Parses the canonical text of `data_type`.
pub(crate) fn parse(text: &str, data_type: ParameterDataType) -> Result<Value, ConversionError> {
    use ParameterDataType as T;

    let invalid = |reason: &dyn std::fmt::Display| ConversionError::invalid_format(data_type, text, reason);

    match data_type {
        T::None => Err(ConversionError::NoneDataType),
        T::String => Ok(Value::String(text.to_owned())),
        T::Int16 => parse_int!(text, data_type, i16, Int16),
        T::Int32 => parse_int!(text, data_type, i32, Int32),
        T::Int64 => parse_int!(text, data_type, i64, Int64),
        T::UInt16 => parse_int!(text, data_type, u16, UInt16),
        T::UInt32 => parse_int!(text, data_type, u32, UInt32),
        T::UInt64 => parse_int!(text, data_type, u64, UInt64),
        T::Byte => parse_int!(text, data_type, u8, Byte),
        T::SignedByte => parse_int!(text, data_type, i8, SignedByte),
        T::Single => text.parse::<f32>().map(Value::Single).map_err(|e| invalid(&e)),
        T::Double => text.parse::<f64>().map(Value::Double).map_err(|e| invalid(&e)),
        T::Decimal => Decimal::from_str(text)
            .map(Value::Decimal)
            .map_err(|e| invalid(&e)),
        T::Boolean => {
            if text.eq_ignore_ascii_case("true") {
                Ok(Value::Boolean(true))
            } else if text.eq_ignore_ascii_case("false") {
                Ok(Value::Boolean(false))
            } else {
                Err(invalid(&"expected `true` or `false`"))
            }
        }
        T::DateTimeOffset => DateTime::parse_from_rfc3339(text)
            .map(Value::DateTimeOffset)
            .map_err(|e| invalid(&e)),
        T::TimeSpan => time_span::parse(text)
            .map(Value::TimeSpan)
            .map_err(|e| invalid(&e)),
        T::Uri => Url::parse(text).map(Value::Uri).map_err(|e| invalid(&e)),
        T::Version => Version::from_str(text).map(Value::Version),
        T::Guid => Uuid::parse_str(text).map(Value::Guid).map_err(|e| invalid(&e)),
        T::Bytes => STANDARD.decode(text).map(Value::Bytes).map_err(|e| invalid(&e)),
        T::Enum | T::Xml => Err(ConversionError::NoTypeConstraint { data_type }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeDelta, TimeZone};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(Value::Int32(-17), "-17")]
    #[case(Value::UInt64(u64::MAX), "18446744073709551615")]
    #[case(Value::Double(0.1), "0.1")]
    #[case(Value::Single(1.5), "1.5")]
    #[case(Value::Double(f64::INFINITY), "inf")]
    #[case(Value::Decimal(Decimal::new(1050, 2)), "10.50")]
    #[case(Value::Boolean(true), "true")]
    #[case(Value::TimeSpan(TimeDelta::seconds(90_061)), "1.01:01:01")]
    #[case(Value::Version(Version::new(1, 2).with_build(3)), "1.2.3")]
    #[case(Value::Bytes(vec![0, 1, 2, 253]), "AAEC/Q==")]
    fn canonical_text(#[case] value: Value, #[case] text: &str) {
        assert_eq!(format(&value).unwrap(), text);
        assert_eq!(parse(text, value.data_type()).unwrap(), value);
    }

    #[test]
    fn date_time_keeps_offset_and_minimal_fraction() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let value = offset.with_ymd_and_hms(2024, 2, 29, 13, 5, 0).unwrap();
        let text = format(&Value::DateTimeOffset(value)).unwrap();
        assert_eq!(text, "2024-02-29T13:05:00+02:00");

        let with_millis = value + TimeDelta::milliseconds(250);
        assert_eq!(
            format(&Value::DateTimeOffset(with_millis)).unwrap(),
            "2024-02-29T13:05:00.250+02:00"
        );
        assert_eq!(
            parse(&text, ParameterDataType::DateTimeOffset).unwrap(),
            Value::DateTimeOffset(value)
        );
    }

    #[test]
    fn xml_write_failures_surface() {
        use crate::value::{XmlElement, XmlValue};
        use std::fmt::Write;

        let value = Value::Xml(XmlValue::new("Acme.Server", XmlElement::new("no spaces allowed")));
        assert!(matches!(format(&value), Err(ConversionError::Xml { .. })));

        let mut out = String::new();
        assert!(write!(out, "{value}").is_err());
    }

    #[test]
    fn guid_is_lowercase_hyphenated() {
        let parsed = parse("{67E55044-10B1-426F-9247-BB680E5FE0C8}", ParameterDataType::Guid).unwrap();
        assert_eq!(format(&parsed).unwrap(), "67e55044-10b1-426f-9247-bb680e5fe0c8");
    }

    #[test]
    fn booleans_parse_case_insensitively() {
        assert_eq!(parse("TRUE", ParameterDataType::Boolean).unwrap(), Value::Boolean(true));
        assert!(parse("yes", ParameterDataType::Boolean).is_err());
    }

    #[rstest]
    #[case("128", ParameterDataType::SignedByte)]
    #[case("-1", ParameterDataType::UInt16)]
    #[case("-5", ParameterDataType::UInt64)]
    #[case("-0300", ParameterDataType::Byte)]
    #[case("99999999999", ParameterDataType::Int32)]
    fn integer_overflow_is_out_of_range(#[case] text: &str, #[case] data_type: ParameterDataType) {
        assert!(matches!(
            parse(text, data_type),
            Err(ConversionError::OutOfRange { .. })
        ));
    }

    #[test]
    fn malformed_negatives_stay_invalid_format() {
        assert!(matches!(
            parse("-0", ParameterDataType::UInt32),
            Err(ConversionError::InvalidFormat { .. })
        ));
        assert!(matches!(
            parse("-x1", ParameterDataType::UInt32),
            Err(ConversionError::InvalidFormat { .. })
        ));
    }

    #[rstest]
    #[case("1,5", ParameterDataType::Double)]
    #[case("12a", ParameterDataType::Int32)]
    #[case("relative/path", ParameterDataType::Uri)]
    #[case("not base64!", ParameterDataType::Bytes)]
    #[case("1.2.x", ParameterDataType::Version)]
    fn malformed_text_is_invalid_format(#[case] text: &str, #[case] data_type: ParameterDataType) {
        assert!(matches!(
            parse(text, data_type),
            Err(ConversionError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn typed_kinds_need_constraints() {
        assert_eq!(
            parse("1", ParameterDataType::Enum),
            Err(ConversionError::NoTypeConstraint {
                data_type: ParameterDataType::Enum
            })
        );
        assert_eq!(parse("1", ParameterDataType::None), Err(ConversionError::NoneDataType));
    }
}
