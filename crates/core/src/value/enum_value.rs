use std::fmt;

use indexmap::IndexMap;

use crate::data_type::ParameterDataType;
use crate::error::ConversionError;

/// An enum member value, optionally tagged with the enum type it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumValue {
    type_name: Option<String>,
    value: i128,
}

impl EnumValue {
    /// An untagged value.
    pub fn new(value: impl Into<i128>) -> Self {
        Self {
            type_name: None,
            value: value.into(),
        }
    }

    /// A value of the named enum type.
    pub fn typed(type_name: impl Into<String>, value: impl Into<i128>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            value: value.into(),
        }
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub const fn value(&self) -> i128 {
        self.value
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Why a member could not be added to an [`EnumDefinition`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnumMemberError {
    #[error("member `{0}` is defined twice")]
    Duplicate(String),
    #[error("member name `{0}` is not a valid identifier")]
    InvalidName(String),
    #[error("value {value} of member `{name}` does not fit {underlying}")]
    OutOfRange {
        name: String,
        value: String,
        underlying: ParameterDataType,
    },
    #[error("{0} is not an integral type")]
    NotIntegral(ParameterDataType),
}

/// Members of an enum: names mapped to integer values of an underlying
/// integral type, optionally with flags semantics.
///
/// Member order is declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDefinition {
    underlying: ParameterDataType,
    flags: bool,
    members: IndexMap<String, i128>,
}

impl EnumDefinition {
    pub fn new(underlying: ParameterDataType, flags: bool) -> Result<Self, EnumMemberError> {
        if !underlying.is_integral() {
            return Err(EnumMemberError::NotIntegral(underlying));
        }
        Ok(Self {
            underlying,
            flags,
            members: IndexMap::new(),
        })
    }

    /// Adds a member whose value is checked against the underlying type.
    pub fn add_member(
        &mut self,
        name: impl Into<String>,
        value: i128,
    ) -> Result<(), EnumMemberError> {
        let name = name.into();
        if !is_member_name(&name) {
            return Err(EnumMemberError::InvalidName(name));
        }
        if self.members.contains_key(&name) {
            return Err(EnumMemberError::Duplicate(name));
        }
        if !self.fits(value) {
            return Err(EnumMemberError::OutOfRange {
                name,
                value: value.to_string(),
                underlying: self.underlying,
            });
        }
        self.members.insert(name, value);
        Ok(())
    }

    /// Adds a member from a decimal or `0x` hexadecimal literal.
    pub fn add_member_literal(
        &mut self,
        name: impl Into<String>,
        literal: &str,
    ) -> Result<(), EnumMemberError> {
        let name = name.into();
        match parse_integer_literal(literal, self.underlying) {
            Some(value) => self.add_member(name, value),
            None => Err(EnumMemberError::OutOfRange {
                name,
                value: literal.to_owned(),
                underlying: self.underlying,
            }),
        }
    }

    pub const fn underlying(&self) -> ParameterDataType {
        self.underlying
    }

    pub const fn is_flags(&self) -> bool {
        self.flags
    }

    pub fn members(&self) -> impl Iterator<Item = (&str, i128)> {
        self.members.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn value_of(&self, name: &str) -> Option<i128> {
        self.members.get(name).copied()
    }

    pub fn fits(&self, value: i128) -> bool {
        self.underlying
            .integer_range()
            .is_some_and(|(min, max)| (min..=max).contains(&value))
    }

    pub fn is_defined(&self, value: i128) -> bool {
        self.members.values().any(|member| *member == value)
    }

    /// Bits of `value` not covered by any member.
    ///
    /// Zero means the value is a valid flags combination. Values wider than
    /// the underlying type keep their high bits, so they are never covered.
    pub fn uncovered_bits(&self, value: i128) -> u128 {
        let covered = self
            .members
            .values()
            .fold(0_u128, |acc, member| acc | self.bits(*member));
        let bits = if self.fits(value) { self.bits(value) } else { value as u128 };
        bits & !covered
    }

    /// Canonical text of a value: a member name, covering member names
    /// joined by `", "` for flags, or the decimal number.
    pub fn format(&self, value: i128) -> String {
        if let Some((name, _)) = self.members.iter().find(|(_, member)| **member == value) {
            return name.clone();
        }
        if self.flags && value != 0 {
            let mut remaining = self.bits(value);
            let mut ordered: Vec<(&String, u128)> = self
                .members
                .iter()
                .map(|(name, member)| (name, self.bits(*member)))
                .filter(|(_, bits)| *bits != 0)
                .collect();
            ordered.sort_by(|a, b| b.1.cmp(&a.1));

            let mut names = Vec::new();
            for (name, bits) in ordered {
                if bits & remaining == bits {
                    remaining &= !bits;
                    names.push((bits, name.as_str()));
                }
            }
            if remaining == 0 {
                names.sort_by_key(|(bits, _)| *bits);
                return names
                    .into_iter()
                    .map(|(_, name)| name)
                    .collect::<Vec<_>>()
                    .join(", ");
            }
        }
        value.to_string()
    }

    /// Parses a member name, comma-separated flag names, or a decimal or
    /// `0x` hexadecimal number.
    pub fn parse(&self, text: &str, enum_name: &str) -> Result<i128, ConversionError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ConversionError::invalid_format(
                ParameterDataType::Enum,
                text,
                "empty enum value",
            ));
        }

        if trimmed.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '+') {
            return parse_integer_literal(trimmed, self.underlying)
                .ok_or_else(|| ConversionError::out_of_range(self.underlying, trimmed));
        }

        let names: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        if names.len() > 1 && !self.flags {
            return Err(ConversionError::invalid_format(
                ParameterDataType::Enum,
                text,
                "only flags enums combine member names",
            ));
        }

        let mut bits = 0_u128;
        for name in names {
            let value = self
                .value_of(name)
                .ok_or_else(|| ConversionError::UndefinedEnumMember {
                    name: name.to_owned(),
                    enum_name: enum_name.to_owned(),
                })?;
            bits |= self.bits(value);
        }
        Ok(self.from_bits(bits))
    }

    fn mask(&self) -> u128 {
        match self.underlying.bit_width() {
            Some(width) => (1_u128 << width) - 1,
            None => u128::MAX,
        }
    }

    fn bits(&self, value: i128) -> u128 {
        (value as u128) & self.mask()
    }

    fn from_bits(&self, bits: u128) -> i128 {
        match self.underlying.bit_width() {
            Some(width) if self.underlying.is_signed() => {
                let shift = 128 - width;
                ((bits << shift) as i128) >> shift
            }
            _ => bits as i128,
        }
    }
}

fn is_member_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Parses a decimal or `0x` hexadecimal integer that must fit `underlying`.
///
/// Hex literals are bit patterns of the type's width, so `0xFFFF` is `-1`
/// for `Int16`.
pub(crate) fn parse_integer_literal(text: &str, underlying: ParameterDataType) -> Option<i128> {
    let (min, max) = underlying.integer_range()?;
    let hex = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"));

    match hex {
        Some(digits) => {
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            let bits = u128::from_str_radix(digits, 16).ok()?;
            let width = underlying.bit_width()?;
            if bits >> width != 0 {
                return None;
            }
            let value = if underlying.is_signed() {
                let shift = 128 - width;
                ((bits << shift) as i128) >> shift
            } else {
                bits as i128
            };
            Some(value)
        }
        None => text.parse::<i128>().ok().filter(|v| (min..=max).contains(v)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn file_attributes() -> EnumDefinition {
        let mut def = EnumDefinition::new(ParameterDataType::Int32, true).unwrap();
        for (name, value) in [
            ("ReadOnly", 1),
            ("Hidden", 2),
            ("System", 4),
            ("Directory", 16),
            ("Archive", 32),
            ("Device", 64),
            ("Normal", 128),
        ] {
            def.add_member(name, value).unwrap();
        }
        def
    }

    #[test]
    fn rejects_out_of_range_members() {
        let mut def = EnumDefinition::new(ParameterDataType::Byte, false).unwrap();
        assert!(def.add_member("Big", 256).is_err());
        assert!(def.add_member_literal("Big", "0x100").is_err());
        def.add_member_literal("Max", "0xFF").unwrap();
        assert_eq!(def.value_of("Max"), Some(255));
    }

    #[test]
    fn rejects_duplicates_and_bad_names() {
        let mut def = EnumDefinition::new(ParameterDataType::Int32, false).unwrap();
        def.add_member("A", 1).unwrap();
        assert_eq!(
            def.add_member("A", 2),
            Err(EnumMemberError::Duplicate("A".into()))
        );
        assert!(def.add_member("1st", 3).is_err());
        assert!(EnumDefinition::new(ParameterDataType::Double, false).is_err());
    }

    #[test]
    fn signed_hex_literals_are_bit_patterns() {
        assert_eq!(
            parse_integer_literal("0xFFFF", ParameterDataType::Int16),
            Some(-1)
        );
        assert_eq!(
            parse_integer_literal("0x1FFFF", ParameterDataType::Int16),
            None
        );
        assert_eq!(
            parse_integer_literal("-129", ParameterDataType::SignedByte),
            None
        );
    }

    #[test]
    fn flags_format_and_parse() {
        let def = file_attributes();
        assert_eq!(def.format(1), "ReadOnly");
        assert_eq!(def.format(3), "ReadOnly, Hidden");
        assert_eq!(def.format(0), "0");
        assert_eq!(def.format(1024), "1024");

        assert_eq!(def.parse("Hidden, ReadOnly", "FileAttributes").unwrap(), 3);
        assert_eq!(def.parse("0x22", "FileAttributes").unwrap(), 34);
        assert!(matches!(
            def.parse("Hidden, Bogus", "FileAttributes"),
            Err(ConversionError::UndefinedEnumMember { .. })
        ));
    }

    #[test]
    fn flags_coverage() {
        let def = file_attributes();
        assert_eq!(def.uncovered_bits(64 | 32), 0);
        assert_eq!(def.uncovered_bits(64 | 1024), 1024);
        assert_eq!(def.uncovered_bits(0), 0);
    }

    #[test]
    fn values_wider_than_the_underlying_type_are_uncovered() {
        let def = file_attributes();
        assert_eq!(def.uncovered_bits(1_i128 << 32), 1_u128 << 32);
        assert_eq!(def.uncovered_bits((1_i128 << 32) | 1), 1_u128 << 32);
        assert_ne!(def.uncovered_bits(i128::from(i64::MIN)), 0);
        // in-range negatives still use the two's complement bits of Int32
        assert_eq!(def.uncovered_bits(-1), 0xFFFF_FF08);
    }

    #[test]
    fn plain_enum_rejects_combinations() {
        let mut def = EnumDefinition::new(ParameterDataType::Int32, false).unwrap();
        def.add_member("Red", 1).unwrap();
        def.add_member("Green", 2).unwrap();
        assert!(def.parse("Red, Green", "Color").is_err());
        assert_eq!(def.format(3), "3");
    }
}
