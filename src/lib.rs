pub mod ast;
pub mod config;
pub mod error;
pub mod export;
pub mod module;
pub mod parser;
mod source;

pub use ast::{
    ArrayValue, Assignment, Attribute, Blob, Dialect, Field, Numeric, ObjectValue, TupleValue,
    Value,
};
pub use config::{AnvilConfig, Lookup};
pub use error::{AnvilError, ErrorCode, ParseError, ParseFailure};
pub use module::{Module, SourceId};
pub use parser::{parse_module, parse_value_str};
