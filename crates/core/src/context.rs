//! The services a setting needs: parser, codec and validator.

use crate::codec::ValueCodec;
use crate::parser::ConstraintParser;
use crate::validation::ParameterValidator;

/// Parser, codec and validator used together by [`Setting`](crate::Setting).
#[derive(Debug, Clone, Default)]
pub struct ParameterContext {
    parser: ConstraintParser,
    codec: ValueCodec,
    validator: ParameterValidator,
}

impl ParameterContext {
    pub fn new(parser: ConstraintParser, codec: ValueCodec, validator: ParameterValidator) -> Self {
        Self {
            parser,
            codec,
            validator,
        }
    }

    #[must_use]
    pub fn with_parser(mut self, parser: ConstraintParser) -> Self {
        self.parser = parser;
        self
    }

    #[must_use]
    pub fn with_codec(mut self, codec: ValueCodec) -> Self {
        self.codec = codec;
        self
    }

    #[must_use]
    pub fn with_validator(mut self, validator: ParameterValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn parser(&self) -> &ConstraintParser {
        &self.parser
    }

    pub fn codec(&self) -> &ValueCodec {
        &self.codec
    }

    pub fn validator(&self) -> &ParameterValidator {
        &self.validator
    }
}
