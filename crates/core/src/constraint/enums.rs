//! Enum constraints: `Values` (an inline member table) and `Type` resolved
//! to a named enum.

use std::sync::Arc;

use super::{ConfigureContext, Params, Rule};
use crate::data_type::ParameterDataType;
use crate::error::{ConfigurationErrorKind, ValidationError};
use crate::message::MessageId;
use crate::resolver::{EnumType, ResolvedType};
use crate::validation::Violation;
use crate::value::{EnumDefinition, EnumValue, Value};

const INLINE_ENUM_NAME: &str = "the allowed values";

fn expect_enum<'v>(constraint: &str, value: &'v Value) -> Result<&'v EnumValue, ValidationError> {
    match value {
        Value::Enum(e) => Ok(e),
        other => Err(ValidationError::UnsupportedValue {
            constraint: constraint.to_owned(),
            value_type: other.data_type(),
        }),
    }
}

/// Checks a value against a definition: flags coverage or membership.
fn check_definition(definition: &EnumDefinition, value: i128, enum_name: &str) -> Option<Violation> {
    if definition.is_flags() {
        let uncovered = definition.uncovered_bits(value);
        (uncovered != 0).then(|| {
            Violation::new(
                MessageId::EnumInvalidFlag,
                [format!("0x{uncovered:X}"), enum_name.to_owned()],
            )
        })
    } else {
        (!definition.is_defined(value)).then(|| {
            Violation::new(
                MessageId::EnumNotDefined,
                [value.to_string(), enum_name.to_owned()],
            )
        })
    }
}

// ============================================================================
// VALUES
// ============================================================================

/// `[Values([type][,Flags],Name=value,...)]`: an inline enum definition.
///
/// The underlying type defaults to `Int32`. Member values are decimal or
/// `0x` hexadecimal literals that must fit the underlying type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValuesConstraint {
    definition: EnumDefinition,
}

impl ValuesConstraint {
    pub const fn new(definition: EnumDefinition) -> Self {
        Self { definition }
    }

    pub fn definition(&self) -> &EnumDefinition {
        &self.definition
    }
}

impl Rule for ValuesConstraint {
    const NAME: &'static str = "Values";

    fn supports(data_type: ParameterDataType) -> bool {
        data_type == ParameterDataType::Enum
    }

    fn configure(params: Params<'_>, _ctx: &ConfigureContext<'_>) -> Result<Self, ConfigurationErrorKind> {
        let mut index = 0;
        let mut underlying = ParameterDataType::Int32;
        let mut flags = false;

        if let Some(first) = params.get(index) {
            if let Ok(data_type) = first.parse::<ParameterDataType>() {
                if !data_type.is_integral() {
                    return Err(params.invalid(index, "underlying type must be integral"));
                }
                underlying = data_type;
                index += 1;
            }
        }
        if params.get(index).is_some_and(|p| p.eq_ignore_ascii_case("Flags")) {
            flags = true;
            index += 1;
        }
        if params.len() <= index {
            return Err(ConfigurationErrorKind::TooFewParameters {
                min: index + 1,
                actual: params.len(),
            });
        }

        let mut definition = EnumDefinition::new(underlying, flags)
            .map_err(|err| params.invalid(0, err.to_string()))?;
        for position in index..params.len() {
            let member = params.required(position)?;
            let (name, literal) = member
                .split_once('=')
                .ok_or_else(|| params.invalid(position, "expected Name=value"))?;
            definition
                .add_member_literal(name.trim(), literal.trim())
                .map_err(|err| params.invalid(position, err.to_string()))?;
        }
        Ok(Self { definition })
    }

    fn parameters(&self) -> Vec<String> {
        let mut params = vec![self.definition.underlying().to_string()];
        if self.definition.is_flags() {
            params.push("Flags".to_owned());
        }
        params.extend(
            self.definition
                .members()
                .map(|(name, value)| format!("{name}={value}")),
        );
        params
    }

    fn check(&self, value: &Value) -> Result<Option<Violation>, ValidationError> {
        let value = expect_enum(Self::NAME, value)?;
        Ok(check_definition(&self.definition, value.value(), INLINE_ENUM_NAME))
    }
}

// ============================================================================
// TYPE (ENUM)
// ============================================================================

/// `[Type(Qualified.Name)]` on an enum parameter.
///
/// The name is resolved when the constraint is configured. An unresolved
/// name is not an error: every value then passes validation, while the
/// codec fails with `TypeResolutionFailed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumTypeConstraint {
    type_name: String,
    resolved: Option<Arc<EnumType>>,
}

impl EnumTypeConstraint {
    pub fn new(type_name: impl Into<String>, resolved: Option<Arc<EnumType>>) -> Self {
        Self {
            type_name: type_name.into(),
            resolved,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn resolved(&self) -> Option<&Arc<EnumType>> {
        self.resolved.as_ref()
    }
}

impl Rule for EnumTypeConstraint {
    const NAME: &'static str = "Type";

    fn supports(data_type: ParameterDataType) -> bool {
        data_type == ParameterDataType::Enum
    }

    fn configure(params: Params<'_>, ctx: &ConfigureContext<'_>) -> Result<Self, ConfigurationErrorKind> {
        params.expect_count(1, 1)?;
        let type_name = params.required(0)?;
        let resolved = match ctx.resolver.resolve(type_name) {
            Some(ResolvedType::Enum(ty)) => Some(ty),
            Some(ResolvedType::Xml(_)) => {
                return Err(params.invalid(0, "names an XML type, not an enum"));
            }
            None => {
                paramguard_log::warn!(
                    type_name,
                    "enum type could not be resolved; values of it will not be validated"
                );
                None
            }
        };
        Ok(Self::new(type_name, resolved))
    }

    fn parameters(&self) -> Vec<String> {
        vec![self.type_name.clone()]
    }

    fn check(&self, value: &Value) -> Result<Option<Violation>, ValidationError> {
        let value = expect_enum(Self::NAME, value)?;
        let Some(ty) = &self.resolved else {
            paramguard_log::trace!(type_name = %self.type_name, "skipping unresolved enum type");
            return Ok(None);
        };

        if let Some(actual) = value.type_name() {
            if actual != ty.name() {
                return Ok(Some(Violation::new(
                    MessageId::WrongEnum,
                    [ty.name(), actual],
                )));
            }
        }
        Ok(check_definition(ty.definition(), value.value(), ty.name()))
    }
}
