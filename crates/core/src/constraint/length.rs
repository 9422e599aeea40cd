//! Length constraints
//!
//! Strings are measured in UTF-16 code units so lengths agree with hosts
//! that store text as UTF-16; byte sequences are measured in bytes.

use super::{ConfigureContext, Params, Rule};
use crate::data_type::ParameterDataType;
use crate::error::{ConfigurationError, ConfigurationErrorKind, ValidationError};
use crate::message::MessageId;
use crate::validation::Violation;
use crate::value::Value;

/// Length of a string or byte sequence.
pub fn measure(constraint: &str, value: &Value) -> Result<usize, ValidationError> {
    match value {
        Value::String(s) => Ok(s.encode_utf16().count()),
        Value::Bytes(b) => Ok(b.len()),
        other => Err(ValidationError::UnsupportedValue {
            constraint: constraint.to_owned(),
            value_type: other.data_type(),
        }),
    }
}

fn supports_length(data_type: ParameterDataType) -> bool {
    matches!(
        data_type,
        ParameterDataType::String | ParameterDataType::Bytes
    )
}

macro_rules! length_constraint {
    (
        $(#[$meta:meta])*
        $name:ident, $keyword:literal, $message:ident,
        |$len:ident, $bound:ident| $ok:expr
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name {
            length: usize,
        }

        impl $name {
            /// Creates the constraint; a negative length is rejected.
            pub fn new(length: i64) -> Result<Self, ConfigurationError> {
                usize::try_from(length)
                    .map(|length| Self { length })
                    .map_err(|_| {
                        ConfigurationError::new(
                            $keyword,
                            ConfigurationErrorKind::ArgumentOutOfRange {
                                argument: "length",
                                value: length.to_string(),
                            },
                        )
                    })
            }

            pub const fn length(&self) -> usize {
                self.length
            }
        }

        impl Rule for $name {
            const NAME: &'static str = $keyword;

            fn supports(data_type: ParameterDataType) -> bool {
                supports_length(data_type)
            }

            fn configure(
                params: Params<'_>,
                _ctx: &ConfigureContext<'_>,
            ) -> Result<Self, ConfigurationErrorKind> {
                params.expect_count(1, 1)?;
                Ok(Self {
                    length: params.count(0)?,
                })
            }

            fn parameters(&self) -> Vec<String> {
                vec![self.length.to_string()]
            }

            fn check(&self, value: &Value) -> Result<Option<Violation>, ValidationError> {
                let $len = measure(Self::NAME, value)?;
                let $bound = self.length;
                Ok((!$ok).then(|| {
                    Violation::new(
                        MessageId::$message,
                        [self.length.to_string(), $len.to_string()],
                    )
                }))
            }
        }
    };
}

length_constraint! {
    /// `[Length(n)]`: the value must be exactly `n` long.
    LengthConstraint, "Length", LengthMismatch,
    |len, bound| len == bound
}

length_constraint! {
    /// `[MinLength(n)]`
    MinLengthConstraint, "MinLength", TooShort,
    |len, bound| len >= bound
}

length_constraint! {
    /// `[MaxLength(n)]`
    MaxLengthConstraint, "MaxLength", TooLong,
    |len, bound| len <= bound
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_utf16_units() {
        // U+1F600 is a surrogate pair
        assert_eq!(measure("Length", &Value::from("a\u{1F600}")).unwrap(), 3);
        assert_eq!(measure("Length", &Value::Bytes(vec![0; 5])).unwrap(), 5);
        assert!(measure("Length", &Value::Int32(1)).is_err());
    }

    #[test]
    fn negative_length_fails_immediately() {
        let err = MinLengthConstraint::new(-1).unwrap_err();
        assert_eq!(err.constraint, "MinLength");
        assert!(matches!(
            err.kind,
            ConfigurationErrorKind::ArgumentOutOfRange { .. }
        ));
    }

    #[test]
    fn bounds() {
        let exact = LengthConstraint::new(2).unwrap();
        assert!(exact.check(&Value::from("ab")).unwrap().is_none());
        assert!(exact.check(&Value::from("abc")).unwrap().is_some());

        let min = MinLengthConstraint::new(2).unwrap();
        assert!(min.check(&Value::from("a")).unwrap().is_some());
        assert!(min.check(&Value::Bytes(vec![1, 2])).unwrap().is_none());

        let max = MaxLengthConstraint::new(2).unwrap();
        assert!(max.check(&Value::from("ab")).unwrap().is_none());
        assert_eq!(
            max.check(&Value::from("abc")).unwrap(),
            Some(Violation::new(MessageId::TooLong, ["2", "3"]))
        );
    }
}
