//! File system syntax constraints: `Path` and `FileName`.
//!
//! The character rules are portable: they reject what any mainstream file
//! system rejects, independent of the platform the validator runs on.

use super::network::syntax_constraint;
use super::{ConfigureContext, Params, Rule, expect_str, string_only};
use crate::data_type::ParameterDataType;
use crate::error::{ConfigurationErrorKind, ValidationError};
use crate::message::MessageId;
use crate::validation::Violation;
use crate::value::Value;

const INVALID_PATH_CHARS: &[char] = &['<', '>', '"', '|'];
const INVALID_NAME_CHARS: &[char] = &['<', '>', '"', '|', ':', '*', '?', '\\', '/'];

fn find_invalid(text: &str, invalid: &[char]) -> Option<char> {
    text.chars().find(|c| c.is_control() || invalid.contains(c))
}

/// Checks that `input` is syntactically a path.
pub fn check_path(input: &str) -> Result<(), String> {
    if input.is_empty() {
        return Err("path cannot be empty".into());
    }
    match find_invalid(input, INVALID_PATH_CHARS) {
        Some(c) => Err(format!("contains invalid character {c:?}")),
        None => Ok(()),
    }
}

/// Checks that `input` is a single file name: no separators, no
/// wildcards, and not `.` or `..`.
pub fn check_file_name(input: &str) -> Result<(), String> {
    if input.is_empty() {
        return Err("file name cannot be empty".into());
    }
    if input == "." || input == ".." {
        return Err(format!("'{input}' is reserved"));
    }
    match find_invalid(input, INVALID_NAME_CHARS) {
        Some(c) => Err(format!("contains invalid character {c:?}")),
        None => Ok(()),
    }
}

syntax_constraint! {
    /// `[Path]`
    PathConstraint, "Path", check_path, InvalidPath
}

syntax_constraint! {
    /// `[FileName]`
    FileNameConstraint, "FileName", check_file_name, InvalidFileName
}
