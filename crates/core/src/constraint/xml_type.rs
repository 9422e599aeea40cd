//! `[Type(Qualified.Name)]` on an XML parameter.

use std::sync::Arc;

use super::{ConfigureContext, Params, Rule};
use crate::data_type::ParameterDataType;
use crate::error::{ConfigurationErrorKind, ValidationError};
use crate::message::MessageId;
use crate::resolver::{ResolvedType, XmlType};
use crate::validation::Violation;
use crate::value::Value;

/// Names the concrete XML type of a parameter.
///
/// Unlike the enum form, the codec cannot work without a resolved type, so
/// an unresolved name surfaces as `TypeResolutionFailed` on conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlTypeConstraint {
    type_name: String,
    resolved: Option<Arc<XmlType>>,
}

impl XmlTypeConstraint {
    pub fn new(type_name: impl Into<String>, resolved: Option<Arc<XmlType>>) -> Self {
        Self {
            type_name: type_name.into(),
            resolved,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn resolved(&self) -> Option<&Arc<XmlType>> {
        self.resolved.as_ref()
    }
}

impl Rule for XmlTypeConstraint {
    const NAME: &'static str = "Type";

    fn supports(data_type: ParameterDataType) -> bool {
        data_type == ParameterDataType::Xml
    }

    fn configure(params: Params<'_>, ctx: &ConfigureContext<'_>) -> Result<Self, ConfigurationErrorKind> {
        params.expect_count(1, 1)?;
        let type_name = params.required(0)?;
        let resolved = match ctx.resolver.resolve(type_name) {
            Some(ResolvedType::Xml(ty)) => Some(ty),
            Some(ResolvedType::Enum(_)) => {
                return Err(params.invalid(0, "names an enum type, not an XML type"));
            }
            None => {
                paramguard_log::debug!(type_name, "xml type not resolved at configuration time");
                None
            }
        };
        Ok(Self::new(type_name, resolved))
    }

    fn parameters(&self) -> Vec<String> {
        vec![self.type_name.clone()]
    }

    fn check(&self, value: &Value) -> Result<Option<Violation>, ValidationError> {
        let Value::Xml(xml) = value else {
            return Err(ValidationError::UnsupportedValue {
                constraint: Self::NAME.to_owned(),
                value_type: value.data_type(),
            });
        };
        Ok((xml.type_name() != self.type_name)
            .then(|| Violation::new(MessageId::WrongType, [self.type_name.as_str(), xml.type_name()])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::TypeRegistry;
    use crate::value::{XmlElement, XmlValue};

    #[test]
    fn checks_type_name() {
        let registry = TypeRegistry::new();
        registry.register_xml(XmlType::new("App.Layout", "layout"));
        let owned = vec!["App.Layout".to_owned()];
        let constraint = XmlTypeConstraint::configure(
            Params::new(&owned),
            &ConfigureContext::new(ParameterDataType::Xml, &registry),
        )
        .unwrap();
        assert_eq!(constraint.resolved().map(|t| t.element()), Some("layout"));

        let ok = Value::Xml(XmlValue::new("App.Layout", XmlElement::new("layout")));
        let bad = Value::Xml(XmlValue::new("App.Theme", XmlElement::new("theme")));
        assert!(constraint.check(&ok).unwrap().is_none());
        assert!(constraint.check(&bad).unwrap().is_some());
    }
}
