//! The closed set of parameter data types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConversionError;

/// Data type of a parameter.
///
/// `None` means "not yet typed"; every conversion and validation path
/// rejects it. Names parse case-insensitively and render in the casing of
/// the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum ParameterDataType {
    #[default]
    None,
    String,
    Int16,
    Int32,
    Int64,
    UInt16,
    UInt32,
    UInt64,
    Byte,
    SignedByte,
    Single,
    Double,
    Decimal,
    Boolean,
    DateTimeOffset,
    TimeSpan,
    Uri,
    Version,
    Guid,
    Bytes,
    Enum,
    Xml,
}

/// Broad grouping of data types used for conversion rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataTypeFamily {
    Integer,
    Float,
    Decimal,
    DateTime,
    TimeSpan,
    Other,
}

impl ParameterDataType {
    /// Every data type, `None` first.
    pub const ALL: [Self; 22] = [
        Self::None,
        Self::String,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::UInt16,
        Self::UInt32,
        Self::UInt64,
        Self::Byte,
        Self::SignedByte,
        Self::Single,
        Self::Double,
        Self::Decimal,
        Self::Boolean,
        Self::DateTimeOffset,
        Self::TimeSpan,
        Self::Uri,
        Self::Version,
        Self::Guid,
        Self::Bytes,
        Self::Enum,
        Self::Xml,
    ];

    /// Canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::String => "String",
            Self::Int16 => "Int16",
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::UInt16 => "UInt16",
            Self::UInt32 => "UInt32",
            Self::UInt64 => "UInt64",
            Self::Byte => "Byte",
            Self::SignedByte => "SignedByte",
            Self::Single => "Single",
            Self::Double => "Double",
            Self::Decimal => "Decimal",
            Self::Boolean => "Boolean",
            Self::DateTimeOffset => "DateTimeOffset",
            Self::TimeSpan => "TimeSpan",
            Self::Uri => "Uri",
            Self::Version => "Version",
            Self::Guid => "Guid",
            Self::Bytes => "Bytes",
            Self::Enum => "Enum",
            Self::Xml => "Xml",
        }
    }

    #[must_use]
    pub const fn family(self) -> DataTypeFamily {
        match self {
            Self::Int16
            | Self::Int32
            | Self::Int64
            | Self::UInt16
            | Self::UInt32
            | Self::UInt64
            | Self::Byte
            | Self::SignedByte => DataTypeFamily::Integer,
            Self::Single | Self::Double => DataTypeFamily::Float,
            Self::Decimal => DataTypeFamily::Decimal,
            Self::DateTimeOffset => DataTypeFamily::DateTime,
            Self::TimeSpan => DataTypeFamily::TimeSpan,
            _ => DataTypeFamily::Other,
        }
    }

    /// Integers, floats and decimal.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(
            self.family(),
            DataTypeFamily::Integer | DataTypeFamily::Float | DataTypeFamily::Decimal
        )
    }

    #[must_use]
    pub const fn is_integral(self) -> bool {
        matches!(self.family(), DataTypeFamily::Integer)
    }

    /// Inclusive value range of an integral type.
    #[must_use]
    pub const fn integer_range(self) -> Option<(i128, i128)> {
        match self {
            Self::Int16 => Some((i16::MIN as i128, i16::MAX as i128)),
            Self::Int32 => Some((i32::MIN as i128, i32::MAX as i128)),
            Self::Int64 => Some((i64::MIN as i128, i64::MAX as i128)),
            Self::UInt16 => Some((0, u16::MAX as i128)),
            Self::UInt32 => Some((0, u32::MAX as i128)),
            Self::UInt64 => Some((0, u64::MAX as i128)),
            Self::Byte => Some((0, u8::MAX as i128)),
            Self::SignedByte => Some((i8::MIN as i128, i8::MAX as i128)),
            _ => None,
        }
    }

    /// Width in bits of an integral type.
    #[must_use]
    pub const fn bit_width(self) -> Option<u32> {
        match self {
            Self::Byte | Self::SignedByte => Some(8),
            Self::Int16 | Self::UInt16 => Some(16),
            Self::Int32 | Self::UInt32 => Some(32),
            Self::Int64 | Self::UInt64 => Some(64),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            Self::Int16 | Self::Int32 | Self::Int64 | Self::SignedByte
        )
    }

    /// Rust type that carries values of this data type.
    ///
    /// `None` has no host type and maps to `"()"`.
    #[must_use]
    pub const fn host_type_name(self) -> &'static str {
        match self {
            Self::None => "()",
            Self::String => "String",
            Self::Int16 => "i16",
            Self::Int32 => "i32",
            Self::Int64 => "i64",
            Self::UInt16 => "u16",
            Self::UInt32 => "u32",
            Self::UInt64 => "u64",
            Self::Byte => "u8",
            Self::SignedByte => "i8",
            Self::Single => "f32",
            Self::Double => "f64",
            Self::Decimal => "rust_decimal::Decimal",
            Self::Boolean => "bool",
            Self::DateTimeOffset => "chrono::DateTime<chrono::FixedOffset>",
            Self::TimeSpan => "chrono::TimeDelta",
            Self::Uri => "url::Url",
            Self::Version => "paramguard_core::Version",
            Self::Guid => "uuid::Uuid",
            Self::Bytes => "Vec<u8>",
            Self::Enum => "paramguard_core::EnumValue",
            Self::Xml => "paramguard_core::XmlValue",
        }
    }

    /// Maps a Rust type name back to its data type.
    ///
    /// Accepts the names returned by [`host_type_name`](Self::host_type_name)
    /// plus the fully qualified std spellings of `String` and `Vec<u8>`.
    pub fn from_host_type_name(name: &str) -> Result<Self, ConversionError> {
        let name = name.trim();
        let aliased = match name {
            "alloc::string::String" | "std::string::String" => Some(Self::String),
            "alloc::vec::Vec<u8>" | "std::vec::Vec<u8>" => Some(Self::Bytes),
            "chrono::TimeDelta" | "chrono::Duration" => Some(Self::TimeSpan),
            _ => None,
        };
        aliased
            .or_else(|| {
                Self::ALL
                    .into_iter()
                    .skip(1)
                    .find(|dt| dt.host_type_name() == name)
            })
            .ok_or_else(|| ConversionError::UnsupportedType {
                type_name: name.to_owned(),
            })
    }

    /// Data type of a host type known at compile time.
    #[must_use]
    pub fn of<T: HostType>() -> Self {
        T::DATA_TYPE
    }
}

/// Rust types that carry parameter values.
pub trait HostType {
    const DATA_TYPE: ParameterDataType;
}

macro_rules! host_types {
    ($($ty:ty => $dt:ident),+ $(,)?) => {
        $(impl HostType for $ty {
            const DATA_TYPE: ParameterDataType = ParameterDataType::$dt;
        })+
    };
}

host_types! {
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
    rust_decimal::Decimal => Decimal,
    bool => Boolean,
    chrono::DateTime<chrono::FixedOffset> => DateTimeOffset,
    chrono::TimeDelta => TimeSpan,
    url::Url => Uri,
    crate::value::Version => Version,
    uuid::Uuid => Guid,
    Vec<u8> => Bytes,
    crate::value::EnumValue => Enum,
    crate::value::XmlValue => Xml,
}

impl fmt::Display for ParameterDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a data type name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown data type `{0}`")]
pub struct UnknownDataType(pub String);

impl FromStr for ParameterDataType {
    type Err = UnknownDataType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|dt| dt.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownDataType(s.to_owned()))
    }
}

impl TryFrom<String> for ParameterDataType {
    type Error = UnknownDataType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ParameterDataType> for &'static str {
    fn from(value: ParameterDataType) -> Self {
        value.as_str()
    }
}
