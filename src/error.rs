use std::fmt;

/// Stable error identifiers surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // --- lexical ---
    UnexpectedToken,
    InvalidNumber,
    InvalidExponent,
    UnterminatedString,
    UnterminatedFreeform,
    ExpectedBacktick,

    // --- structural ---
    ExpectedAssign,
    ExpectedIdentifier,
    ExpectedObjectField,
    ExpectedObjectClose,
    ExpectedArrayClose,
    ExpectedTupleClose,
    MissingCommaInArray,
    MissingCommaInAttributes,
    ExpectedCommaInTuple,
    TrailingCommaInArray,
    EmptyObjectNotAllowed,
    EmptyTupleElement,
    TupleTooShort,
    AssignmentNotAllowedHere,
    RocketOpNotValid,

    // --- semantic ---
    IdentifierIsKeyword,
    InvalidKeyInObject,
    AttributeIsKeyword,
    DuplicateFieldInObject,
    DuplicateAttributeKey,
    DuplicateTopLevelKey,
    InvalidValueInAttribute,

    // --- meta ---
    MultipleShebang,
    ShebangAfterStatements,
    IoError,
    ParsingFailed,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A single recorded parse diagnostic. Line and column are 1-based and point
/// at the offending character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub code: ErrorCode,
}

impl ParseError {
    pub fn new(line: usize, column: usize, code: ErrorCode) -> Self {
        ParseError { line, column, code }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}:{}", self.code, self.line, self.column)
    }
}

/// A failed parse: the recorded errors plus the total count, which may
/// exceed the recording cap.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseFailure {
    pub errors: Vec<ParseError>,
    pub total: usize,
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.first() {
            Some(first) => write!(f, "{} error(s), first: {}", self.total, first),
            None => write!(f, "{} error(s)", self.total),
        }
    }
}

/// The main error type for ANVIL parsing and lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum AnvilError {
    /// The source failed to parse; carries every recorded diagnostic.
    Parse {
        errors: Vec<ParseError>,
        total: usize,
    },
    FileError {
        message: String,
        path: String,
        hint: Option<String>,
    },
    /// Raised by `get` when a key is absent from a module or object.
    NoSuchKey {
        module: String,
        key: String,
    },
    /// Raised by strict accessors when the receiver is the wrong variant.
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
        hint: Option<String>,
    },
}

impl AnvilError {
    pub fn file_error(message: String, path: String) -> Self {
        AnvilError::FileError {
            message,
            path,
            hint: Some("Check file path and permissions".into()),
        }
    }

    /// The taxonomy code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            AnvilError::Parse { .. } => ErrorCode::ParsingFailed,
            AnvilError::FileError { .. } => ErrorCode::IoError,
            // accessor-level errors have no parser code; report them under
            // the wrapper
            AnvilError::NoSuchKey { .. } | AnvilError::TypeMismatch { .. } => {
                ErrorCode::ParsingFailed
            }
        }
    }
}

impl fmt::Display for AnvilError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnvilError::Parse { errors, total } => {
                write!(f, "[ANVIL] Parse failed: {} error(s)", total)?;
                if let Some(first) = errors.first() {
                    write!(f, ", first: {}", first)?;
                }
                Ok(())
            }
            AnvilError::FileError { message, path, hint } => write!(
                f,
                "[ANVIL] File Error '{}': {}{}",
                path,
                message,
                hint.as_ref()
                    .map_or(String::new(), |h| format!(" Hint: {}", h))
            ),
            AnvilError::NoSuchKey { module, key } => {
                write!(f, "[ANVIL] No such key [{}.{}]", module, key)
            }
            AnvilError::TypeMismatch { expected, actual, hint } => write!(
                f,
                "[ANVIL] Type Error: expected {}, got {}{}",
                expected,
                actual,
                hint.as_ref()
                    .map_or(String::new(), |h| format!(" Hint: {}", h))
            ),
        }
    }
}

impl std::error::Error for AnvilError {}
