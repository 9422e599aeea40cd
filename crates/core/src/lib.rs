//! # paramguard-core
//!
//! Constraint notation, validation and value conversion for typed
//! parameters.
//!
//! A parameter has a [`ParameterDataType`], a constraint string such as
//! `[MinValue(1)][MaxValue(10)]` and a value stored as text. This crate
//! parses the constraint string into a [`ConstraintList`], converts the
//! stored text to a typed [`Value`] and back with [`ValueCodec`], and checks
//! values with [`ParameterValidator`].
//!
//! ## Quick Start
//!
//! ```rust
//! use paramguard_core::prelude::*;
//!
//! let constraints = parse("[MinValue(18)][MaxValue(88)][Step(10)]", ParameterDataType::Int32)?;
//! let value = ValueCodec::new().decode("17", ParameterDataType::Int32, &constraints)?;
//!
//! let results = ParameterValidator::default().validate(
//!     Some(&value),
//!     ParameterDataType::Int32,
//!     &constraints,
//!     "age",
//!     Some("Age"),
//! )?;
//! assert_eq!(results.len(), 1);
//! assert_eq!(results[0].message(), "Age must be at least 18.");
//! # Ok::<(), paramguard_core::Error>(())
//! ```
//!
//! ## Modules
//!
//! - [`constraint`]: the catalog of built-in constraints and the
//!   [`CustomConstraint`] extension trait
//! - [`parser`]: the bracket notation
//! - [`codec`]: canonical text forms, enum and XML mapping, encryption
//! - [`validation`]: validation results and the validator
//! - [`setting`]: a stored setting with lazily synchronised value forms
//! - [`resolver`]: named enum and XML types for `Type(...)` constraints

pub mod cipher;
pub mod codec;
pub mod constraint;
pub mod context;
pub mod data_type;
pub mod error;
pub mod message;
pub mod parser;
pub mod prelude;
pub mod resolver;
pub mod setting;
pub mod validation;
pub mod value;

pub use cipher::{Cipher, CipherError};
#[cfg(feature = "crypto")]
pub use cipher::AesGcmCipher;
pub use codec::ValueCodec;
pub use constraint::{
    ConfigureContext, Constraint, ConstraintFactory, ConstraintKind, ConstraintList,
    CustomConstraint, Rule, UnknownConstraintHook,
};
pub use context::ParameterContext;
pub use data_type::{DataTypeFamily, HostType, ParameterDataType, UnknownDataType};
pub use error::{
    ConfigurationError, ConfigurationErrorKind, ConversionError, Error, ParseError, Result,
    ValidationError,
};
pub use message::{DefaultMessages, MessageCatalog, MessageId, MessageSource};
pub use parser::{ConstraintParser, concat_constraints, parse};
pub use resolver::{
    EnumType, NoTypes, ResolvedType, TypeDefinition, TypeRegistry, TypeResolver, XmlType,
};
pub use setting::{Setting, SettingRecord, SyncState};
pub use validation::{ParameterValidationResult, ParameterValidator, ValidationContext, Violation};
pub use value::{EnumDefinition, EnumValue, Value, Version, XmlElement, XmlValue};
