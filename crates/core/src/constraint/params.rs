//! Parameter access for constraint configuration and rendering.

use std::borrow::Cow;

use crate::codec::primitive;
use crate::data_type::ParameterDataType;
use crate::error::ConfigurationErrorKind;
use crate::resolver::{NoTypes, TypeResolver};
use crate::value::Value;

/// What a constraint may consult while configuring itself.
#[derive(Debug, Clone, Copy)]
pub struct ConfigureContext<'a> {
    pub data_type: ParameterDataType,
    pub resolver: &'a dyn TypeResolver,
}

impl<'a> ConfigureContext<'a> {
    pub fn new(data_type: ParameterDataType, resolver: &'a dyn TypeResolver) -> Self {
        Self {
            data_type,
            resolver,
        }
    }
}

impl ConfigureContext<'static> {
    /// Context without type resolution.
    pub fn unresolved(data_type: ParameterDataType) -> Self {
        Self {
            data_type,
            resolver: &NoTypes,
        }
    }
}

/// Unquoted textual parameters of one constraint.
#[derive(Debug, Clone, Copy)]
pub struct Params<'a> {
    values: &'a [String],
}

impl<'a> Params<'a> {
    pub fn new(values: &'a [String]) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.values.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.values.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &'a [String] {
        self.values
    }

    /// Checks `min <= len <= max`.
    pub fn expect_count(&self, min: usize, max: usize) -> Result<(), ConfigurationErrorKind> {
        let actual = self.len();
        if actual < min {
            return Err(ConfigurationErrorKind::TooFewParameters { min, actual });
        }
        if actual > max {
            return Err(ConfigurationErrorKind::TooManyParameters { max, actual });
        }
        Ok(())
    }

    pub fn expect_none(&self) -> Result<(), ConfigurationErrorKind> {
        self.expect_count(0, 0)
    }

    /// Parameter `index`, which must exist.
    pub fn required(&self, index: usize) -> Result<&'a str, ConfigurationErrorKind> {
        self.get(index)
            .ok_or(ConfigurationErrorKind::TooFewParameters {
                min: index + 1,
                actual: self.len(),
            })
    }

    /// A non-negative integer such as a length.
    pub fn count(&self, index: usize) -> Result<usize, ConfigurationErrorKind> {
        let raw = self.required(index)?;
        if let Ok(value) = raw.parse::<i128>() {
            if value < 0 {
                return Err(ConfigurationErrorKind::NegativeNotAllowed {
                    index,
                    value: raw.to_owned(),
                });
            }
        }
        raw.parse::<usize>()
            .map_err(|err| self.invalid(index, err.to_string()))
    }

    /// A value in the canonical text format of `data_type`.
    pub fn value(
        &self,
        index: usize,
        data_type: ParameterDataType,
    ) -> Result<Value, ConfigurationErrorKind> {
        let raw = self.required(index)?;
        primitive::parse(raw, data_type).map_err(|err| self.invalid(index, err.to_string()))
    }

    pub fn invalid(&self, index: usize, reason: impl Into<String>) -> ConfigurationErrorKind {
        ConfigurationErrorKind::InvalidParameterValue {
            index,
            value: self.get(index).unwrap_or_default().to_owned(),
            reason: reason.into(),
        }
    }
}

/// Whether a parameter must be quoted to survive a parse.
pub fn needs_quotes(parameter: &str) -> bool {
    parameter.is_empty()
        || parameter
            .chars()
            .any(|c| matches!(c, ',' | '\'' | ')') || c.is_whitespace())
}

/// Renders a parameter for the bracket notation, quoting when needed and
/// doubling embedded quotes.
pub fn quote(parameter: &str) -> Cow<'_, str> {
    if needs_quotes(parameter) {
        Cow::Owned(format!("'{}'", parameter.replace('\'', "''")))
    } else {
        Cow::Borrowed(parameter)
    }
}
