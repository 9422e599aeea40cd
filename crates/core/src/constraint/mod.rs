//! The constraint catalog.
//!
//! Every built-in rule is a plain struct implementing [`Rule`]. The
//! [`Constraint`] enum closes over them and adds a `Custom` variant for
//! rules registered by the host. Constraints are built configured and never
//! change afterwards, so a [`ConstraintList`] can be shared freely.
//!
//! ```
//! use paramguard_core::{ParameterDataType, parse};
//!
//! let list = parse("[MinLength(2)] [Regex('^[a-z]+$')]", ParameterDataType::String).unwrap();
//! assert_eq!(list.to_string(), "[MinLength(2)][Regex(^[a-z]+$)]");
//! ```

mod bound;
mod charset;
mod custom;
mod enums;
mod file;
mod length;
mod marker;
mod network;
mod params;
mod text;
mod xml_type;

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

pub use bound::{DecimalPlacesConstraint, MaxValueConstraint, MinValueConstraint, StepConstraint};
pub use charset::{CharSetConstraint, CharacterSet};
pub use custom::{ConstraintFactory, CustomConstraint, UnknownConstraintHook};
pub(crate) use custom::configure as configure_custom;
pub use enums::{EnumTypeConstraint, ValuesConstraint};
pub use file::{FileNameConstraint, PathConstraint, check_file_name, check_path};
pub use length::{LengthConstraint, MaxLengthConstraint, MinLengthConstraint};
pub use marker::{
    DatabaseConstraint, DisplayHintConstraint, EncryptedConstraint, NullConstraint,
    PasswordConstraint, ReadOnlyConstraint,
};
pub use network::{
    AllowedSchemeConstraint, EndpointConstraint, HostConstraint, check_endpoint, check_host,
};
pub use params::{ConfigureContext, Params, needs_quotes, quote};
pub use text::{LowercaseConstraint, RegexConstraint, RegexOptions, UppercaseConstraint};
pub use xml_type::XmlTypeConstraint;

use crate::data_type::ParameterDataType;
use crate::error::{ConfigurationError, ConfigurationErrorKind, ValidationError};
use crate::validation::{ParameterValidationResult, ValidationContext, Violation};
use crate::value::Value;

// ============================================================================
// RULE TRAIT
// ============================================================================

/// A built-in constraint rule.
pub trait Rule: Sized {
    /// Bracket keyword in canonical casing.
    const NAME: &'static str;

    /// Whether the rule may be attached to parameters of `data_type`.
    fn supports(data_type: ParameterDataType) -> bool;

    /// Builds the rule from its unquoted textual parameters.
    fn configure(params: Params<'_>, ctx: &ConfigureContext<'_>) -> Result<Self, ConfigurationErrorKind>;

    /// Parameters in the order they render.
    fn parameters(&self) -> Vec<String>;

    /// Checks a value already converted to the parameter's data type.
    ///
    /// Markers keep the default and never fail.
    fn check(&self, value: &Value) -> Result<Option<Violation>, ValidationError> {
        let _ = value;
        Ok(None)
    }
}

/// The text of a string value, or `UnsupportedValue`.
pub(crate) fn expect_str<'v>(constraint: &str, value: &'v Value) -> Result<&'v str, ValidationError> {
    value.as_str().ok_or_else(|| ValidationError::UnsupportedValue {
        constraint: constraint.to_owned(),
        value_type: value.data_type(),
    })
}

pub(crate) fn string_only(data_type: ParameterDataType) -> bool {
    data_type == ParameterDataType::String
}

// ============================================================================
// CATALOG
// ============================================================================

macro_rules! catalog {
    ($($(#[$meta:meta])* $variant:ident($rule:ty)),+ $(,)?) => {
        /// A configured constraint.
        #[derive(Debug, Clone)]
        pub enum Constraint {
            $($(#[$meta])* $variant($rule),)+
            /// A host-defined constraint.
            Custom(Arc<dyn CustomConstraint>),
        }

        /// The built-in constraint variants.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ConstraintKind {
            $($variant,)+
        }

        impl ConstraintKind {
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            /// Bracket keyword.
            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => <$rule as Rule>::NAME,)+
                }
            }

            pub fn supports(self, data_type: ParameterDataType) -> bool {
                match self {
                    $(Self::$variant => <$rule as Rule>::supports(data_type),)+
                }
            }

            fn build(
                self,
                params: Params<'_>,
                ctx: &ConfigureContext<'_>,
            ) -> Result<Constraint, ConfigurationErrorKind> {
                match self {
                    $(Self::$variant => <$rule as Rule>::configure(params, ctx).map(Constraint::$variant),)+
                }
            }
        }

        impl Constraint {
            /// The built-in variant, or `None` for custom constraints.
            pub fn kind(&self) -> Option<ConstraintKind> {
                match self {
                    $(Self::$variant(_) => Some(ConstraintKind::$variant),)+
                    Self::Custom(_) => None,
                }
            }

            /// Bracket keyword in canonical casing.
            pub fn name(&self) -> &str {
                match self {
                    $(Self::$variant(_) => <$rule as Rule>::NAME,)+
                    Self::Custom(custom) => custom.name(),
                }
            }

            pub fn supports(&self, data_type: ParameterDataType) -> bool {
                match self {
                    $(Self::$variant(_) => <$rule as Rule>::supports(data_type),)+
                    Self::Custom(custom) => custom.supports(data_type),
                }
            }

            /// Unquoted parameters in render order.
            pub fn parameters(&self) -> Vec<String> {
                match self {
                    $(Self::$variant(rule) => rule.parameters(),)+
                    Self::Custom(custom) => custom.parameters(),
                }
            }

            fn violations(&self, value: &Value) -> Result<Vec<Violation>, ValidationError> {
                match self {
                    $(Self::$variant(rule) => Ok(rule.check(value)?.into_iter().collect()),)+
                    Self::Custom(custom) => custom.validate(value),
                }
            }
        }

        impl PartialEq for Constraint {
            fn eq(&self, other: &Self) -> bool {
                match (self, other) {
                    $((Self::$variant(a), Self::$variant(b)) => a == b,)+
                    (Self::Custom(a), Self::Custom(b)) => {
                        a.name() == b.name() && a.parameters() == b.parameters()
                    }
                    _ => false,
                }
            }
        }

        $(
            impl From<$rule> for Constraint {
                fn from(rule: $rule) -> Self {
                    Self::$variant(rule)
                }
            }
        )+
    };
}

catalog! {
    Length(LengthConstraint),
    MinLength(MinLengthConstraint),
    MaxLength(MaxLengthConstraint),
    MinValue(MinValueConstraint),
    MaxValue(MaxValueConstraint),
    Step(StepConstraint),
    DecimalPlaces(DecimalPlacesConstraint),
    Lowercase(LowercaseConstraint),
    Uppercase(UppercaseConstraint),
    CharSet(CharSetConstraint),
    Regex(RegexConstraint),
    AllowedScheme(AllowedSchemeConstraint),
    Host(HostConstraint),
    Endpoint(EndpointConstraint),
    Path(PathConstraint),
    FileName(FileNameConstraint),
    Database(DatabaseConstraint),
    /// `Values`: an inline enum definition.
    Values(ValuesConstraint),
    /// `Type` on an enum parameter.
    EnumType(EnumTypeConstraint),
    /// `Type` on an XML parameter.
    XmlType(XmlTypeConstraint),
    Null(NullConstraint),
    Encrypted(EncryptedConstraint),
    Password(PasswordConstraint),
    ReadOnly(ReadOnlyConstraint),
    DisplayHint(DisplayHintConstraint),
}

impl ConstraintKind {
    /// Finds the variant for a bracket keyword, ignoring case.
    ///
    /// `Type` names two variants; the one supporting `data_type` wins.
    pub fn lookup(name: &str, data_type: ParameterDataType) -> Option<Self> {
        let mut candidates = Self::ALL
            .iter()
            .copied()
            .filter(|kind| kind.name().eq_ignore_ascii_case(name));
        let first = candidates.next()?;
        if first.supports(data_type) {
            return Some(first);
        }
        Some(candidates.find(|kind| kind.supports(data_type)).unwrap_or(first))
    }
}

impl Constraint {
    /// Builds a built-in constraint from unquoted textual parameters.
    pub fn configure(
        kind: ConstraintKind,
        params: &[String],
        ctx: &ConfigureContext<'_>,
    ) -> Result<Self, ConfigurationError> {
        if !kind.supports(ctx.data_type) {
            return Err(ConfigurationError::new(
                kind.name(),
                ConfigurationErrorKind::DataTypeNotSupported {
                    data_type: ctx.data_type,
                },
            ));
        }
        kind.build(Params::new(params), ctx)
            .map_err(|kind_err| ConfigurationError::new(kind.name(), kind_err))
    }

    /// Wraps a custom constraint.
    pub fn custom(constraint: Arc<dyn CustomConstraint>) -> Self {
        Self::Custom(constraint)
    }

    /// Whether this is the built-in variant `kind`.
    pub fn is(&self, kind: ConstraintKind) -> bool {
        self.kind() == Some(kind)
    }

    /// Validates `value` as a parameter of `data_type`.
    ///
    /// The value is converted to `data_type` first. Unsupported data types
    /// are an error here; [`ParameterValidator`](crate::ParameterValidator)
    /// skips such constraints instead.
    pub fn validate(
        &self,
        value: &Value,
        data_type: ParameterDataType,
        ctx: &ValidationContext<'_>,
    ) -> Result<Vec<ParameterValidationResult>, ValidationError> {
        if data_type == ParameterDataType::None {
            return Err(ValidationError::NoneDataType);
        }
        if !self.supports(data_type) {
            return Err(ValidationError::DataTypeNotSupported {
                constraint: self.name().to_owned(),
                data_type,
            });
        }
        let value = value.convert_to(data_type)?;
        self.validate_coerced(&value, ctx)
    }

    pub(crate) fn validate_coerced(
        &self,
        value: &Value,
        ctx: &ValidationContext<'_>,
    ) -> Result<Vec<ParameterValidationResult>, ValidationError> {
        Ok(self
            .violations(value)?
            .into_iter()
            .map(|violation| ctx.result(value, &violation, self))
            .collect())
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}", self.name())?;
        let params = self.parameters();
        if !params.is_empty() {
            f.write_str("(")?;
            for (index, param) in params.iter().enumerate() {
                if index > 0 {
                    f.write_str(",")?;
                }
                f.write_str(&quote(param))?;
            }
            f.write_str(")")?;
        }
        f.write_str("]")
    }
}

// ============================================================================
// CONSTRAINT LIST
// ============================================================================

/// An ordered list of constraints. Renders as the concatenation of its
/// members.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintList(Vec<Constraint>);

impl ConstraintList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, constraint: impl Into<Constraint>) {
        self.0.push(constraint.into());
    }

    /// First constraint of the built-in variant `kind`.
    pub fn find(&self, kind: ConstraintKind) -> Option<&Constraint> {
        self.0.iter().find(|c| c.is(kind))
    }

    pub fn contains(&self, kind: ConstraintKind) -> bool {
        self.find(kind).is_some()
    }

    pub fn into_vec(self) -> Vec<Constraint> {
        self.0
    }
}

impl Deref for ConstraintList {
    type Target = [Constraint];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Constraint>> for ConstraintList {
    fn from(constraints: Vec<Constraint>) -> Self {
        Self(constraints)
    }
}

impl FromIterator<Constraint> for ConstraintList {
    fn from_iter<I: IntoIterator<Item = Constraint>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ConstraintList {
    type Item = Constraint;
    type IntoIter = std::vec::IntoIter<Constraint>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ConstraintList {
    type Item = &'a Constraint;
    type IntoIter = std::slice::Iter<'a, Constraint>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for ConstraintList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|c| c.fmt(f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageId;
    use pretty_assertions::assert_eq;

    fn configure(kind: ConstraintKind, params: &[&str], dt: ParameterDataType) -> Result<Constraint, ConfigurationError> {
        let owned: Vec<String> = params.iter().map(|p| (*p).to_owned()).collect();
        Constraint::configure(kind, &owned, &ConfigureContext::unresolved(dt))
    }

    #[test]
    fn kinds_have_unique_names_except_type() {
        let mut names: Vec<&str> = ConstraintKind::ALL.iter().map(|k| k.name()).collect();
        names.sort_unstable();
        let before = names.len();
        names.dedup();
        assert_eq!(before - names.len(), 1);
    }

    #[test]
    fn lookup_is_case_insensitive_and_type_aware() {
        assert_eq!(
            ConstraintKind::lookup("minvalue", ParameterDataType::Int32),
            Some(ConstraintKind::MinValue)
        );
        assert_eq!(
            ConstraintKind::lookup("Type", ParameterDataType::Xml),
            Some(ConstraintKind::XmlType)
        );
        assert_eq!(
            ConstraintKind::lookup("TYPE", ParameterDataType::Enum),
            Some(ConstraintKind::EnumType)
        );
        assert_eq!(ConstraintKind::lookup("Nope", ParameterDataType::Int32), None);
    }

    #[test]
    fn configure_checks_data_type_first() {
        let err = configure(ConstraintKind::MaxValue, &["42"], ParameterDataType::String).unwrap_err();
        assert_eq!(err.constraint, "MaxValue");
        assert_eq!(
            err.kind,
            ConfigurationErrorKind::DataTypeNotSupported {
                data_type: ParameterDataType::String
            }
        );
    }

    #[test]
    fn renders_canonical_notation() {
        let list: ConstraintList = [
            Constraint::from(NullConstraint),
            EncryptedConstraint.into(),
            PasswordConstraint.into(),
            LengthConstraint::new(2).unwrap().into(),
        ]
        .into_iter()
        .collect();
        assert_eq!(list.to_string(), "[Null][Encrypted][Password][Length(2)]");

        let hint = Constraint::from(DisplayHintConstraint::new("it's a, b"));
        assert_eq!(hint.to_string(), "[DisplayHint('it''s a, b')]");
    }

    #[test]
    fn validate_converts_then_checks() {
        let constraint = configure(ConstraintKind::MinValue, &["18"], ParameterDataType::Int32).unwrap();
        let ctx = ValidationContext::new("age");
        let results = constraint
            .validate(&Value::Int64(17), ParameterDataType::Int32, &ctx)
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].member_name(), "age");
        assert_eq!(results[0].value(), Some(&Value::Int32(17)));
        assert_eq!(results[0].message(), "age must be at least 18.");
        assert_eq!(
            results[0].message_id(),
            Some(MessageId::ValueTooSmall)
        );

        assert!(matches!(
            constraint.validate(&Value::Int32(1), ParameterDataType::String, &ctx),
            Err(ValidationError::DataTypeNotSupported { .. })
        ));
        assert!(matches!(
            constraint.validate(&Value::Int32(1), ParameterDataType::None, &ctx),
            Err(ValidationError::NoneDataType)
        ));
    }

    #[test]
    fn list_lookup() {
        let list = ConstraintList::from(vec![Constraint::from(EncryptedConstraint)]);
        assert!(list.contains(ConstraintKind::Encrypted));
        assert!(!list.contains(ConstraintKind::Null));
    }
}
