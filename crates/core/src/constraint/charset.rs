//! `[CharSet(name)]`: every character belongs to a named character set.

use std::fmt;
use std::str::FromStr;

use super::{ConfigureContext, Params, Rule, expect_str, string_only};
use crate::data_type::ParameterDataType;
use crate::error::{ConfigurationErrorKind, ValidationError};
use crate::message::MessageId;
use crate::validation::Violation;
use crate::value::Value;

/// Supported character sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterSet {
    /// U+0000 to U+007F.
    Ascii,
    /// The ODETTE file transfer subset: `A-Z`, `0-9`, space and a fixed set
    /// of punctuation.
    Odette,
    /// ISO 8859-1 (Latin-1): U+0000 to U+00FF.
    Iso88591,
    /// Windows code page 1252.
    Windows1252,
}

const ODETTE_PUNCTUATION: &str = " .,-()/='+:?!\"%&*;<>";

/// Characters cp1252 maps into 0x80..=0x9F.
const CP1252_EXTRA: &str = "€‚ƒ„…†‡ˆ‰Š‹ŒŽ‘’“”•–—˜™š›œžŸ";

impl CharacterSet {
    pub const ALL: [Self; 4] = [Self::Ascii, Self::Odette, Self::Iso88591, Self::Windows1252];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ascii => "Ascii",
            Self::Odette => "Odette",
            Self::Iso88591 => "Iso88591",
            Self::Windows1252 => "Windows1252",
        }
    }

    pub fn contains(self, c: char) -> bool {
        match self {
            Self::Ascii => c.is_ascii(),
            Self::Odette => {
                c.is_ascii_uppercase() || c.is_ascii_digit() || ODETTE_PUNCTUATION.contains(c)
            }
            Self::Iso88591 => u32::from(c) <= 0xFF,
            Self::Windows1252 => {
                let code = u32::from(c);
                code <= 0x7F || (0xA0..=0xFF).contains(&code) || CP1252_EXTRA.contains(c)
            }
        }
    }

    /// First character of `text` outside the set.
    pub fn first_foreign(self, text: &str) -> Option<char> {
        text.chars().find(|c| !self.contains(*c))
    }
}

impl fmt::Display for CharacterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CharacterSet {
    type Err = ConfigurationErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s.chars().filter(|c| *c != '-' && *c != '_').collect();
        Self::ALL
            .into_iter()
            .find(|set| set.as_str().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| ConfigurationErrorKind::InvalidValue {
                value: s.to_owned(),
                expected: Self::ALL.map(Self::as_str).join(", "),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CharSetConstraint {
    set: CharacterSet,
}

impl CharSetConstraint {
    pub const fn new(set: CharacterSet) -> Self {
        Self { set }
    }

    pub const fn set(&self) -> CharacterSet {
        self.set
    }
}

impl Rule for CharSetConstraint {
    const NAME: &'static str = "CharSet";

    fn supports(data_type: ParameterDataType) -> bool {
        string_only(data_type)
    }

    fn configure(params: Params<'_>, _ctx: &ConfigureContext<'_>) -> Result<Self, ConfigurationErrorKind> {
        params.expect_count(1, 1)?;
        Ok(Self::new(params.required(0)?.parse()?))
    }

    fn parameters(&self) -> Vec<String> {
        vec![self.set.to_string()]
    }

    fn check(&self, value: &Value) -> Result<Option<Violation>, ValidationError> {
        let text = expect_str(Self::NAME, value)?;
        Ok(self.set.first_foreign(text).map(|c| {
            Violation::new(
                MessageId::CharacterNotInSet,
                [c.to_string(), self.set.to_string()],
            )
        }))
    }
}
