use std::collections::HashSet;

use crate::ast::{Dialect, Value};
use crate::error::{ErrorCode, ParseError, ParseFailure};
use crate::module::{Module, SourceId};
use crate::source::{Operator, Source};

mod attributes;
mod module;
mod value;

#[cfg(test)]
mod tests;

/// Recording cap. Errors past this are still counted so callers can report
/// the true total.
const MAX_ERRORS: usize = 25;

/// Marker for "a diagnostic has already been recorded"; lets `?` thread
/// failures without duplicating them.
pub(crate) struct Failed;

pub(crate) type Parse<T> = Result<T, Failed>;

pub(crate) struct Parser<'a> {
    src: Source<'a>,
    errors: Vec<ParseError>,
    total_errors: usize,
    has_shebang: bool,
    seen_keys: HashSet<String>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Parser {
            src: Source::new(text),
            errors: Vec::new(),
            total_errors: 0,
            has_shebang: false,
            seen_keys: HashSet::new(),
        }
    }

    pub(crate) fn error(&mut self, code: ErrorCode, line: usize, column: usize) {
        self.total_errors += 1;
        if self.errors.len() < MAX_ERRORS {
            self.errors.push(ParseError::new(line, column, code));
        }
    }

    /// Records an error at the current cursor position.
    pub(crate) fn error_here(&mut self, code: ErrorCode) {
        let (line, column) = (self.src.line(), self.src.column());
        self.error(code, line, column);
    }

    /// Top-level recovery: advance to the next newline or `;`. A `;`
    /// boundary is consumed so recovery always makes forward progress; a
    /// newline is left for the layout skip.
    pub(crate) fn recover(&mut self) {
        while !self.src.is_eof() && self.src.peek() != '\n' && self.src.peek() != ';' {
            self.src.consume();
        }
        if self.src.peek() == ';' {
            self.src.consume();
        }
    }

    /// Container recovery: advance past the closer matching an already
    /// consumed opener, counting nested openers seen along the way.
    pub(crate) fn recover_to(&mut self, open: Operator, close: Operator) {
        let mut depth: usize = 1;
        while !self.src.is_eof() && depth > 0 {
            if self.src.is_operator(open) {
                depth += 1;
            } else if self.src.is_operator(close) {
                depth -= 1;
            }
            self.src.consume();
        }
    }

    /// Reads a plain identifier; `None` leaves the cursor untouched.
    pub(crate) fn read_identifier(&mut self) -> Option<String> {
        let id = self.src.identifier()?;
        self.src.consume_str(id);
        Some(id.to_string())
    }

    fn into_failure(self) -> ParseFailure {
        ParseFailure {
            errors: self.errors,
            total: self.total_errors,
        }
    }
}

/// Parses a complete source into a [`Module`], or every diagnostic the
/// bounded recovery could collect.
pub fn parse_module(
    text: &str,
    source: SourceId,
    hint: Option<Dialect>,
) -> Result<Module, ParseFailure> {
    let mut parser = Parser::new(text);
    let parsed = module::parse_source(&mut parser, hint);

    if parser.total_errors > 0 {
        return Err(parser.into_failure());
    }

    Module::build(source, parsed.dialect, parsed.attributes, parsed.statements).map_err(|errors| {
        let total = errors.len();
        ParseFailure { errors, total }
    })
}

/// Parses a single standalone value, e.g. a captured composite span.
pub fn parse_value_str(text: &str) -> Result<Value, ParseFailure> {
    let mut parser = Parser::new(text);
    parser.src.skip_whitespace();
    let parsed = value::parse_value(&mut parser).ok();
    parser.src.skip_whitespace();
    if !parser.src.is_eof() {
        parser.error_here(ErrorCode::UnexpectedToken);
    }
    match parsed {
        Some(value) if parser.total_errors == 0 => Ok(value),
        _ => Err(parser.into_failure()),
    }
}
