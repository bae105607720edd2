use std::collections::HashSet;
use std::fmt;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use indexmap::IndexMap;

use crate::ast::{Assignment, Attribute, Dialect, Value};
use crate::error::{ErrorCode, ParseError};

/// Where a module's text came from: a file, or an in-memory string
/// identified by the `<string>` sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceId {
    File(PathBuf),
    Text,
}

impl SourceId {
    pub fn path(&self) -> Option<&Path> {
        match self {
            SourceId::File(path) => Some(path),
            SourceId::Text => None,
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceId::File(path) => write!(f, "{}", path.display()),
            SourceId::Text => write!(f, "<string>"),
        }
    }
}

static NAMESPACE_COUNTER: AtomicUsize = AtomicUsize::new(1);

/// Namespace from the file stem, or a generated one for string sources.
fn derive_namespace(source: &SourceId) -> String {
    match source {
        SourceId::File(path) => path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_string)
            .unwrap_or_else(generated_namespace),
        SourceId::Text => generated_namespace(),
    }
}

fn generated_namespace() -> String {
    format!("mod_{}", NAMESPACE_COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// The root artifact of a successful parse. Deeply immutable; safe to share
/// across threads behind an `Arc` and replace wholesale for hot reload.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    namespace: String,
    source: SourceId,
    dialect: Dialect,
    attributes: Vec<Attribute>,
    statements: Vec<Assignment>,
    index: IndexMap<String, usize>,
}

impl Module {
    /// Assembles and validates the module. The parser has already rejected
    /// duplicates and short tuples with positions; this walk is the
    /// authoritative structural check on the finished tree.
    pub(crate) fn build(
        source: SourceId,
        dialect: Dialect,
        attributes: Vec<Attribute>,
        statements: Vec<Assignment>,
    ) -> Result<Module, Vec<ParseError>> {
        let mut errors = Vec::new();
        let mut index = IndexMap::new();

        for (i, stmt) in statements.iter().enumerate() {
            if index.contains_key(&stmt.key) {
                errors.push(ParseError::new(0, 0, ErrorCode::DuplicateTopLevelKey));
            } else {
                index.insert(stmt.key.clone(), i);
            }
            validate_attributes(&stmt.attributes, &mut errors);
            validate_value(&stmt.value, &mut errors);
        }
        validate_attributes(&attributes, &mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Module {
            namespace: derive_namespace(&source),
            source,
            dialect,
            attributes,
            statements,
            index,
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn source(&self) -> &SourceId {
        &self.source
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Module-level attributes, concatenated in source order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn statements(&self) -> &[Assignment] {
        &self.statements
    }

    pub(crate) fn lookup(&self, key: &str) -> Option<&Value> {
        self.index.get(key).map(|&i| &self.statements[i].value)
    }

    pub(crate) fn key_names(&self) -> Vec<&str> {
        self.index.keys().map(String::as_str).collect()
    }

    /// Canonical source rendering of the whole module, for debugging.
    pub fn as_formatted_string(&self) -> String {
        let mut out = String::new();
        if !self.attributes.is_empty() {
            out.push_str("@[");
            for (i, attr) in self.attributes.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                let _ = write!(out, "{}", attr);
            }
            out.push_str("]\n");
        }
        for stmt in &self.statements {
            let _ = writeln!(out, "{}", stmt);
        }
        out
    }
}

fn validate_value(value: &Value, errors: &mut Vec<ParseError>) {
    match value {
        Value::Object(object) => {
            let mut seen = HashSet::new();
            for field in object.fields() {
                if !seen.insert(field.key.as_str()) {
                    errors.push(ParseError::new(0, 0, ErrorCode::DuplicateFieldInObject));
                }
                validate_attributes(&field.attributes, errors);
                validate_value(&field.value, errors);
            }
        }
        Value::Array(array) => {
            for element in array.iter() {
                validate_value(element, errors);
            }
        }
        Value::Tuple(tuple) => {
            if tuple.len() < 2 {
                errors.push(ParseError::new(0, 0, ErrorCode::TupleTooShort));
            }
            for element in tuple.iter() {
                validate_value(element, errors);
            }
        }
        _ => {}
    }
}

fn validate_attributes(attributes: &[Attribute], errors: &mut Vec<ParseError>) {
    for attr in attributes {
        if let Some(value) = &attr.value {
            if matches!(
                value,
                Value::Object(_) | Value::Array(_) | Value::Tuple(_) | Value::Blob(_)
            ) {
                errors.push(ParseError::new(0, 0, ErrorCode::InvalidValueInAttribute));
            }
        }
    }
}
