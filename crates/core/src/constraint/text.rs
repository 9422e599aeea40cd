//! Text shape constraints: `Lowercase`, `Uppercase` and `Regex`.

use std::fmt;

use regex::{Regex, RegexBuilder};

use super::{ConfigureContext, Params, Rule, expect_str, string_only};
use crate::data_type::ParameterDataType;
use crate::error::{ConfigurationErrorKind, ValidationError};
use crate::message::MessageId;
use crate::validation::Violation;
use crate::value::Value;

/// `[Lowercase]`: the text contains no uppercase characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LowercaseConstraint;

impl Rule for LowercaseConstraint {
    const NAME: &'static str = "Lowercase";

    fn supports(data_type: ParameterDataType) -> bool {
        string_only(data_type)
    }

    fn configure(params: Params<'_>, _ctx: &ConfigureContext<'_>) -> Result<Self, ConfigurationErrorKind> {
        params.expect_none()?;
        Ok(Self)
    }

    fn parameters(&self) -> Vec<String> {
        Vec::new()
    }

    fn check(&self, value: &Value) -> Result<Option<Violation>, ValidationError> {
        let text = expect_str(Self::NAME, value)?;
        Ok(text
            .chars()
            .any(char::is_uppercase)
            .then(|| Violation::of(MessageId::NotLowercase)))
    }
}

/// `[Uppercase]`: the text contains no lowercase characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct UppercaseConstraint;

impl Rule for UppercaseConstraint {
    const NAME: &'static str = "Uppercase";

    fn supports(data_type: ParameterDataType) -> bool {
        string_only(data_type)
    }

    fn configure(params: Params<'_>, _ctx: &ConfigureContext<'_>) -> Result<Self, ConfigurationErrorKind> {
        params.expect_none()?;
        Ok(Self)
    }

    fn parameters(&self) -> Vec<String> {
        Vec::new()
    }

    fn check(&self, value: &Value) -> Result<Option<Violation>, ValidationError> {
        let text = expect_str(Self::NAME, value)?;
        Ok(text
            .chars()
            .any(char::is_lowercase)
            .then(|| Violation::of(MessageId::NotUppercase)))
    }
}

// ============================================================================
// REGEX
// ============================================================================

/// Options of a `Regex` constraint, written `IgnoreCase|Multiline`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RegexOptions {
    pub ignore_case: bool,
    pub multiline: bool,
    pub singleline: bool,
    pub ignore_whitespace: bool,
}

const OPTION_NAMES: [&str; 4] = ["IgnoreCase", "Multiline", "Singleline", "IgnorePatternWhitespace"];

impl RegexOptions {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn flags(&self) -> [bool; 4] {
        [
            self.ignore_case,
            self.multiline,
            self.singleline,
            self.ignore_whitespace,
        ]
    }

    fn parse(text: &str) -> Result<Self, ConfigurationErrorKind> {
        let mut options = Self::default();
        for name in text.split('|').map(str::trim) {
            if name.eq_ignore_ascii_case("None") {
                continue;
            }
            let flag = match OPTION_NAMES
                .iter()
                .position(|known| known.eq_ignore_ascii_case(name))
            {
                Some(0) => &mut options.ignore_case,
                Some(1) => &mut options.multiline,
                Some(2) => &mut options.singleline,
                Some(_) => &mut options.ignore_whitespace,
                None => {
                    return Err(ConfigurationErrorKind::InvalidValue {
                        value: name.to_owned(),
                        expected: OPTION_NAMES.join(", "),
                    });
                }
            };
            *flag = true;
        }
        Ok(options)
    }
}

impl fmt::Display for RegexOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = OPTION_NAMES
            .iter()
            .zip(self.flags())
            .filter_map(|(name, set)| set.then_some(*name))
            .collect();
        if names.is_empty() {
            f.write_str("None")
        } else {
            f.write_str(&names.join("|"))
        }
    }
}

/// `[Regex(pattern[,options])]`: the pattern matches somewhere in the text.
/// Anchor it with `^...$` to require a full match.
#[derive(Debug, Clone)]
pub struct RegexConstraint {
    pattern: String,
    options: RegexOptions,
    regex: Regex,
}

impl RegexConstraint {
    pub fn new(pattern: impl Into<String>, options: RegexOptions) -> Result<Self, regex::Error> {
        let pattern = pattern.into();
        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(options.ignore_case)
            .multi_line(options.multiline)
            .dot_matches_new_line(options.singleline)
            .ignore_whitespace(options.ignore_whitespace)
            .build()?;
        Ok(Self {
            pattern,
            options,
            regex,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub const fn options(&self) -> RegexOptions {
        self.options
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for RegexConstraint {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern && self.options == other.options
    }
}

impl Rule for RegexConstraint {
    const NAME: &'static str = "Regex";

    fn supports(data_type: ParameterDataType) -> bool {
        string_only(data_type)
    }

    fn configure(params: Params<'_>, _ctx: &ConfigureContext<'_>) -> Result<Self, ConfigurationErrorKind> {
        params.expect_count(1, 2)?;
        let options = match params.get(1) {
            Some(text) => RegexOptions::parse(text)?,
            None => RegexOptions::default(),
        };
        Self::new(params.required(0)?, options).map_err(|err| params.invalid(0, err.to_string()))
    }

    fn parameters(&self) -> Vec<String> {
        let mut params = vec![self.pattern.clone()];
        if !self.options.is_empty() {
            params.push(self.options.to_string());
        }
        params
    }

    fn check(&self, value: &Value) -> Result<Option<Violation>, ValidationError> {
        let text = expect_str(Self::NAME, value)?;
        Ok((!self.regex.is_match(text))
            .then(|| Violation::new(MessageId::PatternMismatch, [self.pattern.as_str()])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configure_regex(items: &[&str]) -> Result<RegexConstraint, ConfigurationErrorKind> {
        let values: Vec<String> = items.iter().map(|s| (*s).to_owned()).collect();
        RegexConstraint::configure(
            Params::new(&values),
            &ConfigureContext::unresolved(ParameterDataType::String),
        )
    }

    #[test]
    fn case_constraints() {
        assert!(LowercaseConstraint.check(&Value::from("abc 1")).unwrap().is_none());
        assert!(LowercaseConstraint.check(&Value::from("aBc")).unwrap().is_some());
        assert!(UppercaseConstraint.check(&Value::from("ÄBC")).unwrap().is_none());
        assert!(UppercaseConstraint.check(&Value::from("ÄbC")).unwrap().is_some());
    }

    #[test]
    fn regex_with_options() {
        let regex = configure_regex(&["^abc$", "IgnoreCase"]).unwrap();
        assert!(regex.check(&Value::from("ABC")).unwrap().is_none());
        assert!(regex.check(&Value::from("abcd")).unwrap().is_some());
        assert_eq!(regex.parameters(), vec!["^abc$".to_owned(), "IgnoreCase".to_owned()]);

        let plain = configure_regex(&["b"]).unwrap();
        assert_eq!(plain.parameters(), vec!["b".to_owned()]);
    }

    #[test]
    fn regex_configuration_errors() {
        assert!(matches!(
            configure_regex(&["("]),
            Err(ConfigurationErrorKind::InvalidParameterValue { index: 0, .. })
        ));
        assert!(matches!(
            configure_regex(&["a", "Sometimes"]),
            Err(ConfigurationErrorKind::InvalidValue { .. })
        ));
        assert!(matches!(
            configure_regex(&[]),
            Err(ConfigurationErrorKind::TooFewParameters { .. })
        ));
    }

    #[test]
    fn options_round_trip() {
        let options = RegexOptions::parse("multiline|IGNORECASE").unwrap();
        assert_eq!(options.to_string(), "IgnoreCase|Multiline");
        assert_eq!(RegexOptions::parse(&options.to_string()).unwrap(), options);
    }
}
