//! Parameter validation.
//!
//! Rules report [`Violation`]s; the validator turns them into
//! [`ParameterValidationResult`] records with rendered messages. An empty
//! result list means the value is valid.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::constraint::Constraint;
use crate::data_type::ParameterDataType;
use crate::error::ValidationError;
use crate::message::{DefaultMessages, MessageId, MessageSource};
use crate::value::Value;

// ============================================================================
// VIOLATION
// ============================================================================

/// A broken rule, before message rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// A catalog message with its arguments, not counting the display name.
    Message {
        id: MessageId,
        args: SmallVec<[String; 3]>,
    },
    /// Ready-made text, for custom constraints without a message id.
    Text(String),
}

impl Violation {
    pub fn new<I>(id: MessageId, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::Message {
            id,
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// A message without arguments.
    pub fn of(id: MessageId) -> Self {
        Self::Message {
            id,
            args: SmallVec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn message_id(&self) -> Option<MessageId> {
        match self {
            Self::Message { id, .. } => Some(*id),
            Self::Text(_) => None,
        }
    }

    /// Renders the message with `display_name` as argument `{0}`.
    pub fn render(&self, display_name: &str, messages: &dyn MessageSource) -> String {
        match self {
            Self::Message { id, args } => {
                let mut all = Vec::with_capacity(args.len() + 1);
                all.push(display_name.to_owned());
                all.extend(args.iter().cloned());
                messages.format(*id, &all)
            }
            Self::Text(text) => text.clone(),
        }
    }
}

// ============================================================================
// RESULT
// ============================================================================

/// One validation failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterValidationResult {
    value: Option<Value>,
    message: String,
    message_id: Option<MessageId>,
    member_name: String,
    constraint: Constraint,
}

impl ParameterValidationResult {
    /// The offending value, converted to the parameter's data type.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn message_id(&self) -> Option<MessageId> {
        self.message_id
    }

    pub fn member_name(&self) -> &str {
        &self.member_name
    }

    /// The constraint that failed.
    pub fn constraint(&self) -> &Constraint {
        &self.constraint
    }
}

impl fmt::Display for ParameterValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {}", self.member_name, self.message, self.constraint)
    }
}

// ============================================================================
// CONTEXT
// ============================================================================

/// Names and messages used while validating one parameter.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    member_name: &'a str,
    display_name: &'a str,
    messages: &'a dyn MessageSource,
}

impl<'a> ValidationContext<'a> {
    /// Context using the member name as display name and the default
    /// messages.
    pub fn new(member_name: &'a str) -> Self {
        Self {
            member_name,
            display_name: member_name,
            messages: &DefaultMessages,
        }
    }

    /// Overrides the display name; `None` keeps the member name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: Option<&'a str>) -> Self {
        if let Some(display_name) = display_name {
            self.display_name = display_name;
        }
        self
    }

    #[must_use]
    pub fn with_messages(mut self, messages: &'a dyn MessageSource) -> Self {
        self.messages = messages;
        self
    }

    pub fn member_name(&self) -> &str {
        self.member_name
    }

    pub fn display_name(&self) -> &str {
        self.display_name
    }

    pub(crate) fn result(
        &self,
        value: &Value,
        violation: &Violation,
        constraint: &Constraint,
    ) -> ParameterValidationResult {
        ParameterValidationResult {
            value: Some(value.clone()),
            message: violation.render(self.display_name, self.messages),
            message_id: violation.message_id(),
            member_name: self.member_name.to_owned(),
            constraint: constraint.clone(),
        }
    }
}

// ============================================================================
// VALIDATOR
// ============================================================================

/// Applies a constraint list to parameter values.
#[derive(Debug, Clone)]
pub struct ParameterValidator {
    messages: Arc<dyn MessageSource>,
}

impl Default for ParameterValidator {
    fn default() -> Self {
        Self::new(Arc::new(DefaultMessages))
    }
}

impl ParameterValidator {
    pub fn new(messages: Arc<dyn MessageSource>) -> Self {
        Self { messages }
    }

    pub fn messages(&self) -> &dyn MessageSource {
        self.messages.as_ref()
    }

    /// Validates `value` as a parameter of `data_type`.
    ///
    /// A null value is valid. Otherwise the value is converted to
    /// `data_type` (numeric conversions included) and every constraint that
    /// supports `data_type` is applied; the others are skipped. All
    /// failures are collected.
    pub fn validate(
        &self,
        value: Option<&Value>,
        data_type: ParameterDataType,
        constraints: &[Constraint],
        name: &str,
        display_name: Option<&str>,
    ) -> Result<Vec<ParameterValidationResult>, ValidationError> {
        if data_type == ParameterDataType::None {
            return Err(ValidationError::NoneDataType);
        }
        let Some(value) = value else {
            return Ok(Vec::new());
        };
        let value = value.convert_to(data_type)?;

        let ctx = ValidationContext::new(name)
            .with_display_name(display_name)
            .with_messages(self.messages.as_ref());

        let mut results = Vec::new();
        for constraint in constraints {
            if !constraint.supports(data_type) {
                paramguard_log::trace!(
                    constraint = constraint.name(),
                    %data_type,
                    "skipping constraint for unsupported data type"
                );
                continue;
            }
            results.extend(constraint.validate_coerced(&value, &ctx)?);
        }

        if !results.is_empty() {
            paramguard_log::debug!(
                parameter = name,
                failures = results.len(),
                "parameter failed validation"
            );
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::{
        ConfigureContext, ConstraintKind, LengthConstraint, MaxLengthConstraint, NullConstraint,
    };
    use crate::message::MessageCatalog;
    use pretty_assertions::assert_eq;

    fn constraint(kind: ConstraintKind, params: &[&str], dt: ParameterDataType) -> Constraint {
        let owned: Vec<String> = params.iter().map(|p| (*p).to_owned()).collect();
        Constraint::configure(kind, &owned, &ConfigureContext::unresolved(dt)).unwrap()
    }

    #[test]
    fn violation_renders_with_display_name_first() {
        let violation = Violation::new(MessageId::TooLong, ["3", "5"]);
        assert_eq!(
            violation.render("Code", &DefaultMessages),
            "Code must be at most 3 characters long but is 5."
        );
        assert_eq!(Violation::text("custom").render("Code", &DefaultMessages), "custom");
    }

    #[test]
    fn null_and_none_type() {
        let validator = ParameterValidator::default();
        let list = [Constraint::from(LengthConstraint::new(2).unwrap())];
        assert!(validator
            .validate(None, ParameterDataType::String, &list, "code", None)
            .unwrap()
            .is_empty());
        assert_eq!(
            validator.validate(None, ParameterDataType::None, &list, "code", None),
            Err(ValidationError::NoneDataType)
        );
    }

    #[test]
    fn aggregates_every_failure() {
        let validator = ParameterValidator::default();
        let list = [
            constraint(ConstraintKind::MaxLength, &["3"], ParameterDataType::String),
            constraint(ConstraintKind::Uppercase, &[], ParameterDataType::String),
            Constraint::from(NullConstraint),
        ];
        let value = Value::from("abcd");
        let results = validator
            .validate(Some(&value), ParameterDataType::String, &list, "code", Some("Code"))
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].message(), "Code must be at most 3 characters long but is 4.");
        assert_eq!(results[0].member_name(), "code");
        assert_eq!(results[1].message_id(), Some(MessageId::NotUppercase));
    }

    #[test]
    fn skips_unsupported_constraints() {
        let validator = ParameterValidator::default();
        let list = [Constraint::from(MaxLengthConstraint::new(1).unwrap())];
        let results = validator
            .validate(Some(&Value::Int32(12345)), ParameterDataType::Int32, &list, "n", None)
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn end_to_end_range() {
        let validator = ParameterValidator::default();
        let list = crate::parse("[MinValue(18)][MaxValue(88)][Step(10)]", ParameterDataType::Int32).unwrap();

        let low = validator
            .validate(Some(&Value::Int32(17)), ParameterDataType::Int32, &list, "age", None)
            .unwrap();
        assert_eq!(low.len(), 1);
        assert!(low[0].constraint().is(ConstraintKind::MinValue));

        let ok = validator
            .validate(Some(&Value::Int32(18)), ParameterDataType::Int32, &list, "age", None)
            .unwrap();
        assert!(ok.is_empty());
    }

    #[test]
    fn unconvertible_value_is_an_error() {
        let validator = ParameterValidator::default();
        let err = validator
            .validate(Some(&Value::from("x")), ParameterDataType::Int32, &[], "n", None)
            .unwrap_err();
        assert_eq!(err.code(), "CONV:TYPE_MISMATCH");
    }

    #[test]
    fn message_overrides_apply() {
        let catalog = MessageCatalog::new().with(MessageId::TooShort, "{0}: need {1}, got {2}");
        let validator = ParameterValidator::new(Arc::new(catalog));
        let list = [constraint(ConstraintKind::MinLength, &["3"], ParameterDataType::String)];
        let results = validator
            .validate(Some(&Value::from("ab")), ParameterDataType::String, &list, "pin", None)
            .unwrap();
        assert_eq!(results[0].message(), "pin: need 3, got 2");
    }
}
