//! Error types for constraint configuration, parsing, value conversion
//! and validation.
//!
//! Validation *failures* are not errors: they are returned as
//! [`ParameterValidationResult`](crate::ParameterValidationResult) records.
//! The enums here cover the hard failures that stop an operation.

use crate::data_type::ParameterDataType;

/// Reason a constraint could not be configured from its parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationErrorKind {
    /// Fewer parameters than the constraint requires.
    #[error("expected at least {min} parameter(s), got {actual}")]
    TooFewParameters { min: usize, actual: usize },

    /// More parameters than the constraint accepts.
    #[error("expected at most {max} parameter(s), got {actual}")]
    TooManyParameters { max: usize, actual: usize },

    /// A parameter could not be interpreted.
    #[error("parameter {index} (`{value}`) is invalid: {reason}")]
    InvalidParameterValue {
        index: usize,
        value: String,
        reason: String,
    },

    /// A length-like parameter was negative.
    #[error("parameter {index} must not be negative, got `{value}`")]
    NegativeNotAllowed { index: usize, value: String },

    /// A programmatic constructor received an out-of-range argument.
    #[error("argument `{argument}` is out of range: {value}")]
    ArgumentOutOfRange {
        argument: &'static str,
        value: String,
    },

    /// The constraint cannot be attached to parameters of this type.
    #[error("data type {data_type} is not supported")]
    DataTypeNotSupported { data_type: ParameterDataType },

    /// A keyword parameter is not one of the accepted keywords.
    #[error("unknown value `{value}`, expected one of: {expected}")]
    InvalidValue { value: String, expected: String },

    /// A factory or hook built a constraint under a different name than
    /// the one it was asked for, so its rendering would not parse back.
    #[error("constraint was requested as `{requested}` but is named `{actual}`")]
    NameMismatch { requested: String, actual: String },
}

impl ConfigurationErrorKind {
    /// Machine-readable error code for programmatic handling.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::TooFewParameters { .. } => "CFG:TOO_FEW_PARAMETERS",
            Self::TooManyParameters { .. } => "CFG:TOO_MANY_PARAMETERS",
            Self::InvalidParameterValue { .. } => "CFG:INVALID_PARAMETER_VALUE",
            Self::NegativeNotAllowed { .. } => "CFG:NEGATIVE_NOT_ALLOWED",
            Self::ArgumentOutOfRange { .. } => "CFG:ARGUMENT_OUT_OF_RANGE",
            Self::DataTypeNotSupported { .. } => "CFG:DATA_TYPE_NOT_SUPPORTED",
            Self::InvalidValue { .. } => "CFG:INVALID_VALUE",
            Self::NameMismatch { .. } => "CFG:NAME_MISMATCH",
        }
    }
}

/// A constraint rejected its configuration.
///
/// Always names the constraint so the message is useful on its own.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid configuration for constraint `{constraint}`: {kind}")]
pub struct ConfigurationError {
    /// Canonical name of the constraint.
    pub constraint: String,
    /// What went wrong.
    pub kind: ConfigurationErrorKind,
}

impl ConfigurationError {
    /// Creates a new configuration error for the named constraint.
    pub fn new(constraint: impl Into<String>, kind: ConfigurationErrorKind) -> Self {
        Self {
            constraint: constraint.into(),
            kind,
        }
    }

    /// Machine-readable error code of the underlying kind.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

/// Error produced while scanning a constraint string.
///
/// Positions are byte offsets into the input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Non-whitespace text outside of any bracketed constraint.
    #[error("unexpected character `{character}` at position {position} outside of a constraint")]
    InvalidContent { position: usize, character: char },

    /// A character that is not allowed at this point of a constraint.
    #[error("invalid character `{character}` at position {position}")]
    InvalidCharacter { position: usize, character: char },

    /// `[]` or `[(...)]`.
    #[error("missing constraint name at position {position}")]
    EmptyName { position: usize },

    /// An unquoted parameter with no content, as in `(1,,2)`.
    #[error("empty parameter at position {position}; quote it as '' to pass an empty string")]
    EmptyParameter { position: usize },

    /// A quoted parameter that never closes.
    #[error("unterminated quoted parameter starting at position {position}")]
    UnterminatedQuote { position: usize },

    /// The input ended inside a constraint.
    #[error("constraint starting at position {position} is incomplete")]
    ConstraintIncomplete { position: usize },

    /// No built-in, registered or hooked constraint has this name.
    #[error("unknown constraint `{name}` at position {position}")]
    UnknownConstraintName { name: String, position: usize },

    /// The constraint was recognised but rejected its parameters.
    #[error("constraint `{segment}` at position {position} is misconfigured: {source}")]
    Configuration {
        segment: String,
        position: usize,
        #[source]
        source: ConfigurationError,
    },
}

impl ParseError {
    /// Byte offset the error refers to.
    #[must_use]
    pub fn position(&self) -> usize {
        match self {
            Self::InvalidContent { position, .. }
            | Self::InvalidCharacter { position, .. }
            | Self::EmptyName { position }
            | Self::EmptyParameter { position }
            | Self::UnterminatedQuote { position }
            | Self::ConstraintIncomplete { position }
            | Self::UnknownConstraintName { position, .. }
            | Self::Configuration { position, .. } => *position,
        }
    }

    /// Machine-readable error code for programmatic handling.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidContent { .. } => "PARSE:INVALID_CONTENT",
            Self::InvalidCharacter { .. } => "PARSE:INVALID_CHARACTER",
            Self::EmptyName { .. } => "PARSE:EMPTY_NAME",
            Self::EmptyParameter { .. } => "PARSE:EMPTY_PARAMETER",
            Self::UnterminatedQuote { .. } => "PARSE:UNTERMINATED_QUOTE",
            Self::ConstraintIncomplete { .. } => "PARSE:CONSTRAINT_INCOMPLETE",
            Self::UnknownConstraintName { .. } => "PARSE:UNKNOWN_CONSTRAINT",
            Self::Configuration { source, .. } => source.code(),
        }
    }
}

/// Error converting between a [`Value`](crate::Value) and its string form,
/// or between data types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// The data type is `None`.
    #[error("data type None cannot be converted")]
    NoneDataType,

    /// A host type name with no parameter data type.
    #[error("host type `{type_name}` has no parameter data type")]
    UnsupportedType { type_name: String },

    /// The value belongs to a family that cannot convert to the target.
    #[error("expected a value of type {expected}, got {actual}")]
    TypeMismatch {
        expected: ParameterDataType,
        actual: ParameterDataType,
    },

    /// The text is not in the canonical format of the data type.
    #[error("`{value}` is not a valid {data_type}: {reason}")]
    InvalidFormat {
        data_type: ParameterDataType,
        value: String,
        reason: String,
    },

    /// The value does not fit the target type.
    #[error("`{value}` is out of range for {data_type}")]
    OutOfRange {
        data_type: ParameterDataType,
        value: String,
    },

    /// Enum and XML values need a constraint describing their type.
    #[error("data type {data_type} requires a type-describing constraint")]
    NoTypeConstraint { data_type: ParameterDataType },

    /// More than one constraint describes the enum.
    #[error("more than one enum definition found in the constraint list")]
    AmbiguousEnum,

    /// A member name the enum does not define.
    #[error("`{name}` is not a member of {enum_name}")]
    UndefinedEnumMember { name: String, enum_name: String },

    /// A `Type` constraint whose type name is unknown to the resolver.
    #[error("type `{type_name}` could not be resolved")]
    TypeResolutionFailed { type_name: String },

    /// An XML value of a different type than the constraint names.
    #[error("expected XML type `{expected}`, got `{actual}`")]
    XmlTypeMismatch { expected: String, actual: String },

    /// The list carries `Encrypted` but the codec has no cipher.
    #[error("value is marked as encrypted but no cipher is configured")]
    CipherUnavailable,

    #[error("encryption failed: {reason}")]
    EncryptionFailed { reason: String },

    #[error("decryption failed: {reason}")]
    DecryptionFailed { reason: String },

    /// Malformed XML fragment.
    #[error("invalid XML: {reason}")]
    Xml { reason: String },
}

impl ConversionError {
    /// Machine-readable error code for programmatic handling.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoneDataType => "CONV:NONE_DATA_TYPE",
            Self::UnsupportedType { .. } => "CONV:UNSUPPORTED_TYPE",
            Self::TypeMismatch { .. } => "CONV:TYPE_MISMATCH",
            Self::InvalidFormat { .. } => "CONV:INVALID_FORMAT",
            Self::OutOfRange { .. } => "CONV:OUT_OF_RANGE",
            Self::NoTypeConstraint { .. } => "CONV:NO_TYPE_CONSTRAINT",
            Self::AmbiguousEnum => "CONV:AMBIGUOUS_ENUM",
            Self::UndefinedEnumMember { .. } => "CONV:UNDEFINED_ENUM_MEMBER",
            Self::TypeResolutionFailed { .. } => "CONV:TYPE_RESOLUTION_FAILED",
            Self::XmlTypeMismatch { .. } => "CONV:XML_TYPE_MISMATCH",
            Self::CipherUnavailable => "CONV:CIPHER_UNAVAILABLE",
            Self::EncryptionFailed { .. } => "CONV:ENCRYPTION_FAILED",
            Self::DecryptionFailed { .. } => "CONV:DECRYPTION_FAILED",
            Self::Xml { .. } => "CONV:XML",
        }
    }

    pub(crate) fn invalid_format(
        data_type: ParameterDataType,
        value: &str,
        reason: impl ToString,
    ) -> Self {
        Self::InvalidFormat {
            data_type,
            value: value.to_owned(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn out_of_range(data_type: ParameterDataType, value: impl ToString) -> Self {
        Self::OutOfRange {
            data_type,
            value: value.to_string(),
        }
    }
}

/// A hard validation error.
///
/// These mean the validation could not be carried out at all, as opposed to
/// a value that broke a rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The data type is `None`.
    #[error("data type None cannot be validated")]
    NoneDataType,

    /// A constraint was applied directly to a data type it does not support.
    #[error("constraint `{constraint}` does not support data type {data_type}")]
    DataTypeNotSupported {
        constraint: String,
        data_type: ParameterDataType,
    },

    /// The candidate cannot be converted to the type of a stored bound.
    #[error("constraint `{constraint}` cannot compare a {from} value with its {to} bound")]
    NotConvertible {
        constraint: String,
        from: ParameterDataType,
        to: ParameterDataType,
    },

    /// The constraint supports the data type but not this value's shape.
    #[error("constraint `{constraint}` cannot validate a {value_type} value")]
    UnsupportedValue {
        constraint: String,
        value_type: ParameterDataType,
    },

    /// The value could not be coerced to the parameter's data type.
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

impl ValidationError {
    /// Machine-readable error code for programmatic handling.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoneDataType => "VAL:NONE_DATA_TYPE",
            Self::DataTypeNotSupported { .. } => "VAL:DATA_TYPE_NOT_SUPPORTED",
            Self::NotConvertible { .. } => "VAL:NOT_CONVERTIBLE",
            Self::UnsupportedValue { .. } => "VAL:UNSUPPORTED_VALUE",
            Self::Conversion(err) => err.code(),
        }
    }
}

/// Any error raised by this crate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl Error {
    /// Broad error category for grouping in logs.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Parse(_) => "parse",
            Self::Configuration(_) => "configuration",
            Self::Conversion(_) => "conversion",
            Self::Validation(_) => "validation",
        }
    }

    /// Machine-readable error code for programmatic handling.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Parse(err) => err.code(),
            Self::Configuration(err) => err.code(),
            Self::Conversion(err) => err.code(),
            Self::Validation(err) => err.code(),
        }
    }
}

/// Result type used throughout paramguard.
pub type Result<T, E = Error> = std::result::Result<T, E>;
