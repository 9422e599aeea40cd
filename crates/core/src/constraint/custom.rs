//! Host-defined constraints.
//!
//! A custom constraint is built by a registered factory (or by the parser's
//! unknown-name hook), configured once with its textual parameters and
//! then frozen behind an `Arc`.

use std::fmt;
use std::sync::Arc;

use crate::data_type::ParameterDataType;
use crate::error::{ConfigurationErrorKind, ValidationError};
use crate::validation::Violation;
use crate::value::Value;

/// A constraint supplied by the host application.
pub trait CustomConstraint: fmt::Debug + Send + Sync {
    /// Bracket keyword, in canonical casing. Must equal, ignoring case, the
    /// name the parser was asked for.
    fn name(&self) -> &str;

    fn supports(&self, data_type: ParameterDataType) -> bool;

    /// Configures the constraint. Called exactly once, before the
    /// constraint is shared.
    fn set_parameters(
        &mut self,
        params: &[String],
        data_type: ParameterDataType,
    ) -> Result<(), ConfigurationErrorKind>;

    /// Parameters in the order they render.
    fn parameters(&self) -> Vec<String>;

    /// Validates a value already converted to the parameter's data type.
    fn validate(&self, value: &Value) -> Result<Vec<Violation>, ValidationError> {
        let _ = value;
        Ok(Vec::new())
    }
}

/// Builds an unconfigured custom constraint.
pub type ConstraintFactory = Arc<dyn Fn() -> Box<dyn CustomConstraint> + Send + Sync>;

/// Supplies a constraint for a name nothing else recognised.
pub type UnknownConstraintHook =
    Arc<dyn Fn(&str, ParameterDataType) -> Option<Box<dyn CustomConstraint>> + Send + Sync>;

/// Configures a freshly built custom constraint and freezes it.
pub(crate) fn configure(
    mut constraint: Box<dyn CustomConstraint>,
    params: &[String],
    data_type: ParameterDataType,
) -> Result<Arc<dyn CustomConstraint>, ConfigurationErrorKind> {
    if !constraint.supports(data_type) {
        return Err(ConfigurationErrorKind::DataTypeNotSupported { data_type });
    }
    constraint.set_parameters(params, data_type)?;
    Ok(Arc::from(constraint))
}
