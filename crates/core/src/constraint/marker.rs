//! Marker constraints.
//!
//! Markers never produce validation results. They carry intent for other
//! layers: the codec (`Encrypted`), editors (`Password`, `ReadOnly`,
//! `DisplayHint`) or the host's data access (`Database`).

use super::{ConfigureContext, Params, Rule};
use crate::data_type::ParameterDataType;
use crate::error::ConfigurationErrorKind;

fn any_type(data_type: ParameterDataType) -> bool {
    data_type != ParameterDataType::None
}

macro_rules! unit_marker {
    ($(#[$meta:meta])* $name:ident, $keyword:literal, $supports:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name;

        impl Rule for $name {
            const NAME: &'static str = $keyword;

            fn supports(data_type: ParameterDataType) -> bool {
                $supports(data_type)
            }

            fn configure(
                params: Params<'_>,
                _ctx: &ConfigureContext<'_>,
            ) -> Result<Self, ConfigurationErrorKind> {
                params.expect_none()?;
                Ok(Self)
            }

            fn parameters(&self) -> Vec<String> {
                Vec::new()
            }
        }
    };
}

unit_marker! {
    /// `[Null]`: the parameter may be left empty.
    NullConstraint, "Null", any_type
}

unit_marker! {
    /// `[Encrypted]`: the stored form is encrypted by the codec.
    EncryptedConstraint, "Encrypted", any_type
}

unit_marker! {
    /// `[Password]`
    PasswordConstraint, "Password", |dt| dt == ParameterDataType::String
}

unit_marker! {
    /// `[ReadOnly]`
    ReadOnlyConstraint, "ReadOnly", any_type
}

/// `[DisplayHint(hint)]`: free-form presentation hint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DisplayHintConstraint {
    hint: String,
}

impl DisplayHintConstraint {
    pub fn new(hint: impl Into<String>) -> Self {
        Self { hint: hint.into() }
    }

    pub fn hint(&self) -> &str {
        &self.hint
    }
}

impl Rule for DisplayHintConstraint {
    const NAME: &'static str = "DisplayHint";

    fn supports(data_type: ParameterDataType) -> bool {
        any_type(data_type)
    }

    fn configure(params: Params<'_>, _ctx: &ConfigureContext<'_>) -> Result<Self, ConfigurationErrorKind> {
        params.expect_count(1, 1)?;
        Ok(Self::new(params.required(0)?))
    }

    fn parameters(&self) -> Vec<String> {
        vec![self.hint.clone()]
    }
}

/// `[Database]` or `[Database(lookup)]`: the value references a database
/// entity, optionally through a named lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DatabaseConstraint {
    lookup: Option<String>,
}

impl DatabaseConstraint {
    pub fn new(lookup: Option<String>) -> Self {
        Self { lookup }
    }

    pub fn lookup(&self) -> Option<&str> {
        self.lookup.as_deref()
    }
}

impl Rule for DatabaseConstraint {
    const NAME: &'static str = "Database";

    fn supports(data_type: ParameterDataType) -> bool {
        data_type == ParameterDataType::String || data_type.is_integral()
    }

    fn configure(params: Params<'_>, _ctx: &ConfigureContext<'_>) -> Result<Self, ConfigurationErrorKind> {
        params.expect_count(0, 1)?;
        Ok(Self::new(params.get(0).map(str::to_owned)))
    }

    fn parameters(&self) -> Vec<String> {
        self.lookup.iter().cloned().collect()
    }
}
