//! Prelude module for convenient imports.
//!
//! ```rust
//! use paramguard_core::prelude::*;
//!
//! let list = parse("[Length(4)]", ParameterDataType::String).unwrap();
//! assert_eq!(concat_constraints(Some(&list)).as_deref(), Some("[Length(4)]"));
//! ```

// ============================================================================
// PARSING AND CATALOG
// ============================================================================

pub use crate::constraint::{Constraint, ConstraintKind, ConstraintList, CustomConstraint};
pub use crate::parser::{ConstraintParser, concat_constraints, parse};

// ============================================================================
// VALUES AND CONVERSION
// ============================================================================

pub use crate::codec::ValueCodec;
pub use crate::data_type::ParameterDataType;
pub use crate::value::{EnumValue, Value, Version, XmlElement, XmlValue};

// ============================================================================
// VALIDATION
// ============================================================================

pub use crate::message::{MessageId, MessageSource};
pub use crate::validation::{ParameterValidationResult, ParameterValidator, Violation};

// ============================================================================
// SETTINGS AND ERRORS
// ============================================================================

pub use crate::context::ParameterContext;
pub use crate::error::{Error, Result};
pub use crate::setting::{Setting, SyncState};
