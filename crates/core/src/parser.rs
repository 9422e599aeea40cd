//! Parser for the bracket notation.
//!
//! ```text
//! constraints := (ws* constraint)* ws*
//! constraint  := '[' name ('(' params? ')')? ']'
//! params      := param (',' param)*
//! param       := quoted | bare
//! ```
//!
//! A quoted parameter is wrapped in `'` with `''` standing for a literal
//! quote. A bare parameter cannot contain `,`, `)`, `'` or whitespace.
//! Whitespace around parameters is ignored. The input is scanned once,
//! left to right.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::constraint::{
    ConfigureContext, Constraint, ConstraintFactory, ConstraintKind, ConstraintList,
    CustomConstraint, UnknownConstraintHook, configure_custom,
};
use crate::data_type::ParameterDataType;
use crate::error::{ConfigurationError, ConfigurationErrorKind, ParseError};
use crate::resolver::{NoTypes, TypeResolver};

// ============================================================================
// SCANNER
// ============================================================================

/// One bracketed segment before name resolution.
#[derive(Debug)]
struct Segment<'a> {
    name: &'a str,
    params: Vec<String>,
    start: usize,
    text: &'a str,
}

impl Segment<'_> {
    fn configuration_error(&self, source: ConfigurationError) -> ParseError {
        ParseError::Configuration {
            segment: self.text.to_owned(),
            position: self.start,
            source,
        }
    }
}

struct Scanner<'a> {
    input: &'a str,
    position: usize,
}

fn ends_name(ch: char) -> bool {
    matches!(ch, '[' | ']' | '(' | ')' | ',') || ch.is_whitespace()
}

fn ends_bare(ch: char) -> bool {
    matches!(ch, ',' | ')' | '\'') || ch.is_whitespace()
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    fn next_segment(&mut self) -> Result<Option<Segment<'a>>, ParseError> {
        self.skip_whitespace();
        let start = self.position;
        let Some(ch) = self.current_char() else {
            return Ok(None);
        };
        if ch != '[' {
            return Err(ParseError::InvalidContent {
                position: start,
                character: ch,
            });
        }
        self.advance();
        self.skip_whitespace();

        let name = self.read_while(|c| !ends_name(c));
        if name.is_empty() {
            return match self.current_char() {
                None => Err(ParseError::ConstraintIncomplete { position: start }),
                Some(_) => Err(ParseError::EmptyName {
                    position: self.position,
                }),
            };
        }

        let gap = self.position;
        self.skip_whitespace();
        let params = match self.current_char() {
            None => return Err(ParseError::ConstraintIncomplete { position: start }),
            Some('(') => {
                self.advance();
                let params = self.read_params(start)?;
                self.skip_whitespace();
                params
            }
            Some(']') => Vec::new(),
            Some(other) => return Err(self.invalid_at(gap, other)),
        };

        match self.current_char() {
            None => Err(ParseError::ConstraintIncomplete { position: start }),
            Some(']') => {
                self.advance();
                Ok(Some(Segment {
                    name,
                    params,
                    start,
                    text: &self.input[start..self.position],
                }))
            }
            Some(other) => Err(ParseError::InvalidCharacter {
                position: self.position,
                character: other,
            }),
        }
    }

    /// Reads parameters after `(` up to and including `)`.
    fn read_params(&mut self, start: usize) -> Result<Vec<String>, ParseError> {
        let mut params = Vec::new();

        self.skip_whitespace();
        if self.current_char() == Some(')') {
            self.advance();
            return Ok(params);
        }

        loop {
            self.skip_whitespace();
            let param = match self.current_char() {
                None => return Err(ParseError::ConstraintIncomplete { position: start }),
                Some('\'') => self.read_quoted()?,
                Some(_) => self.read_bare()?,
            };
            params.push(param);

            let gap = self.position;
            self.skip_whitespace();
            match self.current_char() {
                None => return Err(ParseError::ConstraintIncomplete { position: start }),
                Some(',') => self.advance(),
                Some(')') => {
                    self.advance();
                    return Ok(params);
                }
                Some(other) => return Err(self.invalid_at(gap, other)),
            }
        }
    }

    fn read_bare(&mut self) -> Result<String, ParseError> {
        let position = self.position;
        let param = self.read_while(|c| !ends_bare(c));
        if param.is_empty() {
            return Err(ParseError::EmptyParameter { position });
        }
        Ok(param.to_owned())
    }

    fn read_quoted(&mut self) -> Result<String, ParseError> {
        let position = self.position;
        self.advance();

        let mut param = String::new();
        loop {
            match self.current_char() {
                None => return Err(ParseError::UnterminatedQuote { position }),
                Some('\'') => {
                    self.advance();
                    if self.current_char() == Some('\'') {
                        param.push('\'');
                        self.advance();
                    } else {
                        return Ok(param);
                    }
                }
                Some(ch) => {
                    param.push(ch);
                    self.advance();
                }
            }
        }
    }

    /// `InvalidCharacter` for `found`, pointing at the whitespace before it
    /// when there was any.
    fn invalid_at(&self, gap: usize, found: char) -> ParseError {
        if gap < self.position {
            ParseError::InvalidCharacter {
                position: gap,
                character: self.input[gap..].chars().next().unwrap_or(found),
            }
        } else {
            ParseError::InvalidCharacter {
                position: self.position,
                character: found,
            }
        }
    }

    fn read_while(&mut self, keep: impl Fn(char) -> bool) -> &'a str {
        let start = self.position;
        while let Some(ch) = self.current_char() {
            if !keep(ch) {
                break;
            }
            self.advance();
        }
        &self.input[start..self.position]
    }

    fn current_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.position += ch.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }
}

// ============================================================================
// PARSER
// ============================================================================

/// Turns constraint strings into configured [`ConstraintList`]s.
///
/// Names are looked up among the built-in constraints first, then among
/// registered factories, and finally passed to the `on_unknown` hook.
#[derive(Clone)]
pub struct ConstraintParser {
    resolver: Arc<dyn TypeResolver>,
    factories: HashMap<String, ConstraintFactory>,
    on_unknown: Option<UnknownConstraintHook>,
}

impl Default for ConstraintParser {
    fn default() -> Self {
        Self {
            resolver: Arc::new(NoTypes),
            factories: HashMap::new(),
            on_unknown: None,
        }
    }
}

impl fmt::Debug for ConstraintParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut factories: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        factories.sort_unstable();
        f.debug_struct("ConstraintParser")
            .field("resolver", &self.resolver)
            .field("factories", &factories)
            .field("on_unknown", &self.on_unknown.is_some())
            .finish()
    }
}

impl ConstraintParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves `Type(...)` names.
    #[must_use]
    pub fn with_type_resolver(mut self, resolver: Arc<dyn TypeResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Registers a custom constraint under `name`, matched
    /// case-insensitively. Built-in names cannot be shadowed.
    ///
    /// The factory's constraints must report `name` (in any case) from
    /// [`CustomConstraint::name`]; anything else fails to parse with
    /// [`ConfigurationErrorKind::NameMismatch`].
    #[must_use]
    pub fn register<F>(mut self, name: &str, factory: F) -> Self
    where
        F: Fn() -> Box<dyn CustomConstraint> + Send + Sync + 'static,
    {
        self.factories
            .insert(name.to_ascii_lowercase(), Arc::new(factory));
        self
    }

    /// Called with names nothing else recognised.
    ///
    /// As with [`register`](Self::register), the supplied constraint must
    /// be named after the requested name so the list renders back to text
    /// the same parser accepts.
    #[must_use]
    pub fn on_unknown<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str, ParameterDataType) -> Option<Box<dyn CustomConstraint>> + Send + Sync + 'static,
    {
        self.on_unknown = Some(Arc::new(hook));
        self
    }

    pub fn resolver(&self) -> &dyn TypeResolver {
        self.resolver.as_ref()
    }

    /// Parses a constraint string for a parameter of `data_type`.
    ///
    /// `None` and the empty string give an empty list.
    pub fn parse<'a>(
        &self,
        text: impl Into<Option<&'a str>>,
        data_type: ParameterDataType,
    ) -> Result<ConstraintList, ParseError> {
        let Some(text) = text.into() else {
            return Ok(ConstraintList::new());
        };

        let mut scanner = Scanner::new(text);
        let mut list = ConstraintList::new();
        while let Some(segment) = scanner.next_segment()? {
            list.push(self.build(&segment, data_type)?);
        }
        paramguard_log::trace!(input = text, constraints = list.len(), "parsed constraint string");
        Ok(list)
    }

    fn build(&self, segment: &Segment<'_>, data_type: ParameterDataType) -> Result<Constraint, ParseError> {
        if let Some(kind) = ConstraintKind::lookup(segment.name, data_type) {
            let ctx = ConfigureContext::new(data_type, self.resolver.as_ref());
            return Constraint::configure(kind, &segment.params, &ctx)
                .map_err(|source| segment.configuration_error(source));
        }

        let custom = match self.factories.get(&segment.name.to_ascii_lowercase()) {
            Some(factory) => Some(factory()),
            None => self
                .on_unknown
                .as_ref()
                .and_then(|hook| hook(segment.name, data_type)),
        };
        let Some(custom) = custom else {
            return Err(ParseError::UnknownConstraintName {
                name: segment.name.to_owned(),
                position: segment.start,
            });
        };

        let name = custom.name().to_owned();
        if !name.eq_ignore_ascii_case(segment.name) {
            return Err(segment.configuration_error(ConfigurationError::new(
                segment.name,
                ConfigurationErrorKind::NameMismatch {
                    requested: segment.name.to_owned(),
                    actual: name,
                },
            )));
        }
        configure_custom(custom, &segment.params, data_type)
            .map(Constraint::Custom)
            .map_err(|kind| segment.configuration_error(ConfigurationError::new(name, kind)))
    }
}

/// Parses with the default parser: built-in constraints only, no type
/// resolution.
pub fn parse<'a>(
    text: impl Into<Option<&'a str>>,
    data_type: ParameterDataType,
) -> Result<ConstraintList, ParseError> {
    ConstraintParser::default().parse(text, data_type)
}

/// Renders constraints back to their notation; `None` stays `None`.
pub fn concat_constraints(constraints: Option<&[Constraint]>) -> Option<String> {
    constraints.map(|list| list.iter().map(ToString::to_string).collect())
}
