use std::fmt;
use std::str::FromStr;

use crate::data_type::ParameterDataType;
use crate::error::ConversionError;

/// A `major.minor[.build[.revision]]` version number.
///
/// Ordering compares component by component; a missing component sorts
/// before any present one, so `1.2 < 1.2.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Version {
    major: u32,
    minor: u32,
    build: Option<u32>,
    revision: Option<u32>,
}

impl Version {
    #[must_use]
    pub const fn new(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor,
            build: None,
            revision: None,
        }
    }

    #[must_use]
    pub const fn with_build(mut self, build: u32) -> Self {
        self.build = Some(build);
        self
    }

    /// Sets the revision; a missing build component becomes `0`.
    #[must_use]
    pub const fn with_revision(mut self, revision: u32) -> Self {
        if self.build.is_none() {
            self.build = Some(0);
        }
        self.revision = Some(revision);
        self
    }

    pub const fn major(&self) -> u32 {
        self.major
    }

    pub const fn minor(&self) -> u32 {
        self.minor
    }

    pub const fn build(&self) -> Option<u32> {
        self.build
    }

    pub const fn revision(&self) -> Option<u32> {
        self.revision
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if let Some(build) = self.build {
            write!(f, ".{build}")?;
        }
        if let Some(revision) = self.revision {
            write!(f, ".{revision}")?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ConversionError::invalid_format(ParameterDataType::Version, s, reason);

        let parts: Vec<&str> = s.split('.').collect();
        if !(2..=4).contains(&parts.len()) {
            return Err(invalid("expected 2 to 4 dot-separated components"));
        }

        let mut numbers = [0_u32; 4];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid("components must be unsigned decimal numbers"));
            }
            *slot = part
                .parse()
                .map_err(|_| ConversionError::out_of_range(ParameterDataType::Version, s))?;
        }

        Ok(Self {
            major: numbers[0],
            minor: numbers[1],
            build: (parts.len() > 2).then_some(numbers[2]),
            revision: (parts.len() > 3).then_some(numbers[3]),
        })
    }
}
