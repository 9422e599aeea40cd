//! Validation messages.
//!
//! Constraints never produce final text. They report a [`MessageId`] plus
//! arguments and a [`MessageSource`] turns that into a message. Argument
//! `{0}` is always the parameter's display name; constraint arguments
//! follow from `{1}`.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! message_ids {
    ($($(#[$meta:meta])* $id:ident => $template:literal),+ $(,)?) => {
        /// Identifier of a validation message.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum MessageId {
            $($(#[$meta])* $id,)+
        }

        impl MessageId {
            pub const ALL: &'static [Self] = &[$(Self::$id,)+];

            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$id => stringify!($id),)+
                }
            }

            /// English template with `{n}` placeholders.
            pub const fn default_template(self) -> &'static str {
                match self {
                    $(Self::$id => $template,)+
                }
            }
        }
    };
}

message_ids! {
    /// `{1}`: lower bound.
    ValueTooSmall => "{0} must be at least {1}.",
    /// `{1}`: upper bound.
    ValueTooLarge => "{0} must be at most {1}.",
    /// `{1}`: required length, `{2}`: actual length.
    LengthMismatch => "{0} must be exactly {1} characters long but is {2}.",
    TooShort => "{0} must be at least {1} characters long but is {2}.",
    TooLong => "{0} must be at most {1} characters long but is {2}.",
    /// `{1}`: allowed places, `{2}`: actual places.
    TooManyDecimalPlaces => "{0} may have at most {1} decimal places but has {2}.",
    NotLowercase => "{0} must not contain uppercase characters.",
    NotUppercase => "{0} must not contain lowercase characters.",
    /// `{1}`: offending character, `{2}`: character set.
    CharacterNotInSet => "{0} contains the character '{1}' which is not part of the {2} character set.",
    /// `{1}`: pattern.
    PatternMismatch => "{0} does not match the pattern {1}.",
    /// `{1}`: scheme, `{2}`: allowed schemes.
    SchemeNotAllowed => "{0} uses the scheme '{1}' but only {2} are allowed.",
    /// `{1}`: reason.
    InvalidHost => "{0} is not a valid host name: {1}.",
    InvalidEndpoint => "{0} is not a valid endpoint: {1}.",
    InvalidPath => "{0} is not a valid path: {1}.",
    InvalidFileName => "{0} is not a valid file name: {1}.",
    /// `{1}`: value, `{2}`: enum name.
    EnumNotDefined => "{0} has the value {1} which is not defined by {2}.",
    /// `{1}`: uncovered bits, `{2}`: enum name.
    EnumInvalidFlag => "{0} has the flags {1} which are not defined by {2}.",
    /// `{1}`: expected enum, `{2}`: actual enum.
    WrongEnum => "{0} must be a value of {1} but is a value of {2}.",
    /// `{1}`: expected type, `{2}`: actual type.
    WrongType => "{0} must be of type {1} but is of type {2}.",
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a message id is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown message id `{0}`")]
pub struct UnknownMessageId(pub String);

impl FromStr for MessageId {
    type Err = UnknownMessageId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownMessageId(s.to_owned()))
    }
}

/// Replaces `{n}` placeholders with `args[n]`.
///
/// `{{` and `}}` are literal braces; placeholders without an argument are
/// left as they are.
pub fn format_template(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;

    while let Some(open) = rest.find(['{', '}']) {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];

        if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push_str(&tail[..1]);
            rest = &tail[2..];
            continue;
        }
        if tail.starts_with('{') {
            if let Some(close) = tail.find('}') {
                if let Ok(index) = tail[1..close].parse::<usize>() {
                    match args.get(index) {
                        Some(arg) => out.push_str(arg),
                        None => out.push_str(&tail[..=close]),
                    }
                    rest = &tail[close + 1..];
                    continue;
                }
            }
        }
        out.push_str(&tail[..1]);
        rest = &tail[1..];
    }
    out.push_str(rest);
    out
}

/// Turns message ids and arguments into text.
pub trait MessageSource: fmt::Debug + Send + Sync {
    fn template(&self, id: MessageId) -> Cow<'_, str>;

    fn format(&self, id: MessageId, args: &[String]) -> String {
        format_template(&self.template(id), args)
    }
}

/// Built-in English messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMessages;

impl MessageSource for DefaultMessages {
    fn template(&self, id: MessageId) -> Cow<'_, str> {
        Cow::Borrowed(id.default_template())
    }
}

/// Message overrides on top of [`DefaultMessages`].
///
/// Deserializes from a map of message id to template, e.g. from the
/// `[messages]` table of a config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "HashMap<String, String>", into = "HashMap<String, String>")]
pub struct MessageCatalog {
    overrides: HashMap<MessageId, String>,
}

impl MessageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, id: MessageId, template: impl Into<String>) -> Self {
        self.overrides.insert(id, template.into());
        self
    }

    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

impl TryFrom<HashMap<String, String>> for MessageCatalog {
    type Error = UnknownMessageId;

    fn try_from(map: HashMap<String, String>) -> Result<Self, Self::Error> {
        let overrides = map
            .into_iter()
            .map(|(id, template)| Ok((id.parse()?, template)))
            .collect::<Result<_, UnknownMessageId>>()?;
        Ok(Self { overrides })
    }
}

impl From<MessageCatalog> for HashMap<String, String> {
    fn from(catalog: MessageCatalog) -> Self {
        catalog
            .overrides
            .into_iter()
            .map(|(id, template)| (id.as_str().to_owned(), template))
            .collect()
    }
}

impl MessageSource for MessageCatalog {
    fn template(&self, id: MessageId) -> Cow<'_, str> {
        match self.overrides.get(&id) {
            Some(template) => Cow::Borrowed(template),
            None => Cow::Borrowed(id.default_template()),
        }
    }
}
