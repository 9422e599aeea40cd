//! Range constraints: `MinValue`, `MaxValue`, `Step` and `DecimalPlaces`.

use std::cmp::Ordering;

use super::{ConfigureContext, Params, Rule};
use crate::data_type::{DataTypeFamily, ParameterDataType};
use crate::error::{ConfigurationErrorKind, ConversionError, ValidationError};
use crate::message::MessageId;
use crate::validation::Violation;
use crate::value::Value;

/// Types with a total order usable for bounds.
fn supports_bound(data_type: ParameterDataType) -> bool {
    data_type.is_numeric()
        || matches!(
            data_type,
            ParameterDataType::DateTimeOffset
                | ParameterDataType::TimeSpan
                | ParameterDataType::Version
        )
}

fn bound_for(
    constraint: &'static str,
    bound: Value,
    data_type: ParameterDataType,
) -> Result<Value, ConversionError> {
    if !supports_bound(data_type) {
        paramguard_log::debug!(constraint, %data_type, "bound rejected for unsupported type");
        return Err(ConversionError::TypeMismatch {
            expected: data_type,
            actual: bound.data_type(),
        });
    }
    bound.convert_to(data_type)
}

/// Orders `value` against `bound` after converting it to the bound's type.
fn order(constraint: &str, value: &Value, bound: &Value) -> Result<Option<Ordering>, ValidationError> {
    let candidate = value
        .convert_to(bound.data_type())
        .map_err(|_| ValidationError::NotConvertible {
            constraint: constraint.to_owned(),
            from: value.data_type(),
            to: bound.data_type(),
        })?;
    Ok(candidate.compare(bound))
}

// ============================================================================
// MIN VALUE / MAX VALUE
// ============================================================================

macro_rules! value_bound {
    (
        $(#[$meta:meta])*
        $name:ident, $keyword:literal, $message:ident, $fails:pat
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            bound: Value,
        }

        impl $name {
            /// Creates the constraint with `bound` converted to `data_type`.
            pub fn new(bound: Value, data_type: ParameterDataType) -> Result<Self, ConversionError> {
                bound_for($keyword, bound, data_type).map(|bound| Self { bound })
            }

            pub fn bound(&self) -> &Value {
                &self.bound
            }
        }

        impl Rule for $name {
            const NAME: &'static str = $keyword;

            fn supports(data_type: ParameterDataType) -> bool {
                supports_bound(data_type)
            }

            fn configure(
                params: Params<'_>,
                ctx: &ConfigureContext<'_>,
            ) -> Result<Self, ConfigurationErrorKind> {
                params.expect_count(1, 1)?;
                Ok(Self {
                    bound: params.value(0, ctx.data_type)?,
                })
            }

            fn parameters(&self) -> Vec<String> {
                vec![self.bound.to_string()]
            }

            fn check(&self, value: &Value) -> Result<Option<Violation>, ValidationError> {
                // unordered (NaN) candidates fail the bound
                let failed = matches!(order(Self::NAME, value, &self.bound)?, $fails);
                Ok(failed.then(|| {
                    Violation::new(MessageId::$message, [self.bound.to_string()])
                }))
            }
        }
    };
}

value_bound! {
    /// `[MinValue(v)]`: inclusive lower bound.
    MinValueConstraint, "MinValue", ValueTooSmall, None | Some(Ordering::Less)
}

value_bound! {
    /// `[MaxValue(v)]`: inclusive upper bound.
    MaxValueConstraint, "MaxValue", ValueTooLarge, None | Some(Ordering::Greater)
}

// ============================================================================
// STEP
// ============================================================================

/// `[Step(v)]`: increment used by editors. Values are not checked against
/// it.
#[derive(Debug, Clone, PartialEq)]
pub struct StepConstraint {
    step: Value,
}

impl StepConstraint {
    /// Creates the constraint; `step` must be convertible to `data_type`.
    pub fn new(step: Value, data_type: ParameterDataType) -> Result<Self, ConversionError> {
        if !Self::supports(data_type) {
            return Err(ConversionError::TypeMismatch {
                expected: data_type,
                actual: step.data_type(),
            });
        }
        step.convert_to(data_type).map(|step| Self { step })
    }

    pub fn step(&self) -> &Value {
        &self.step
    }
}

impl Rule for StepConstraint {
    const NAME: &'static str = "Step";

    fn supports(data_type: ParameterDataType) -> bool {
        data_type.is_numeric() || data_type == ParameterDataType::TimeSpan
    }

    fn configure(params: Params<'_>, ctx: &ConfigureContext<'_>) -> Result<Self, ConfigurationErrorKind> {
        params.expect_count(1, 1)?;
        Ok(Self {
            step: params.value(0, ctx.data_type)?,
        })
    }

    fn parameters(&self) -> Vec<String> {
        vec![self.step.to_string()]
    }
}

// ============================================================================
// DECIMAL PLACES
// ============================================================================

/// `[DecimalPlaces(n)]`: at most `n` fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecimalPlacesConstraint {
    places: usize,
}

impl DecimalPlacesConstraint {
    pub const fn new(places: usize) -> Self {
        Self { places }
    }

    pub const fn places(&self) -> usize {
        self.places
    }
}

/// Fractional digits of the canonical representation.
fn fractional_digits(value: &Value) -> Option<usize> {
    let text = match value {
        Value::Decimal(d) => return Some(d.normalize().scale() as usize),
        Value::Single(f) if f.is_finite() => f.to_string(),
        Value::Double(f) if f.is_finite() => f.to_string(),
        Value::Single(_) | Value::Double(_) => return Some(0),
        _ => return None,
    };
    Some(text.split_once('.').map_or(0, |(_, fraction)| fraction.len()))
}

impl Rule for DecimalPlacesConstraint {
    const NAME: &'static str = "DecimalPlaces";

    fn supports(data_type: ParameterDataType) -> bool {
        matches!(
            data_type.family(),
            DataTypeFamily::Float | DataTypeFamily::Decimal
        )
    }

    fn configure(params: Params<'_>, _ctx: &ConfigureContext<'_>) -> Result<Self, ConfigurationErrorKind> {
        params.expect_count(1, 1)?;
        Ok(Self::new(params.count(0)?))
    }

    fn parameters(&self) -> Vec<String> {
        vec![self.places.to_string()]
    }

    fn check(&self, value: &Value) -> Result<Option<Violation>, ValidationError> {
        let digits = fractional_digits(value).ok_or_else(|| ValidationError::UnsupportedValue {
            constraint: Self::NAME.to_owned(),
            value_type: value.data_type(),
        })?;
        Ok((digits > self.places).then(|| {
            Violation::new(
                MessageId::TooManyDecimalPlaces,
                [self.places.to_string(), digits.to_string()],
            )
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn ctx(data_type: ParameterDataType) -> ConfigureContext<'static> {
        ConfigureContext::unresolved(data_type)
    }

    fn params(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn min_value_compares_after_conversion() {
        let min = MinValueConstraint::new(Value::Int32(18), ParameterDataType::Int32).unwrap();
        assert!(min.check(&Value::Int32(17)).unwrap().is_some());
        assert!(min.check(&Value::Int32(18)).unwrap().is_none());
        assert!(min.check(&Value::Int64(40)).unwrap().is_none());
    }

    #[test]
    fn unconvertible_candidate_is_a_hard_error() {
        let max = MaxValueConstraint::new(Value::Byte(10), ParameterDataType::Byte).unwrap();
        assert!(matches!(
            max.check(&Value::Int32(1_000)),
            Err(ValidationError::NotConvertible { .. })
        ));
        assert!(matches!(
            max.check(&Value::from("5")),
            Err(ValidationError::NotConvertible { .. })
        ));
    }

    #[test]
    fn nan_fails_bounds() {
        let max = MaxValueConstraint::new(Value::Double(1.0), ParameterDataType::Double).unwrap();
        assert!(max.check(&Value::Double(f64::NAN)).unwrap().is_some());
    }

    #[test]
    fn bound_rejects_string_type() {
        assert!(MaxValueConstraint::new(Value::Int32(5), ParameterDataType::String).is_err());
        assert!(!MaxValueConstraint::supports(ParameterDataType::String));
    }

    #[test]
    fn configured_from_text() {
        let values = params(&["1.2.3"]);
        let min = MinValueConstraint::configure(Params::new(&values), &ctx(ParameterDataType::Version))
            .unwrap();
        assert_eq!(min.parameters(), vec!["1.2.3".to_owned()]);
        assert!(min.check(&"1.2".parse::<crate::value::Version>().unwrap().into()).unwrap().is_some());
    }

    #[test]
    fn step_requires_convertible_value() {
        assert!(StepConstraint::new(Value::Int32(5), ParameterDataType::Double).is_ok());
        assert!(StepConstraint::new(Value::from("5"), ParameterDataType::Int32).is_err());
        assert!(StepConstraint::new(Value::Int32(5), ParameterDataType::String).is_err());

        let step = StepConstraint::new(Value::Int32(10), ParameterDataType::Int32).unwrap();
        assert!(step.check(&Value::Int32(3)).unwrap().is_none());
    }

    #[test]
    fn decimal_places() {
        let places = DecimalPlacesConstraint::new(2);
        assert!(places.check(&Value::Double(1.25)).unwrap().is_none());
        assert!(places.check(&Value::Double(1.255)).unwrap().is_some());
        assert!(places
            .check(&Value::Decimal(Decimal::from_str("1.2000").unwrap()))
            .unwrap()
            .is_none());
        assert!(places.check(&Value::Double(f64::INFINITY)).unwrap().is_none());
    }
}
