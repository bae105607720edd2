use std::fmt;

use crate::error::AnvilError;

/// A number parsed from source. Integer and float are one variant family so
/// consumers coerce through `as_long`/`as_double` rather than matching twice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Int(i64),
    Float(f64),
}

impl Numeric {
    /// Truncates a float toward zero; returns an integer unchanged.
    pub fn as_long(self) -> i64 {
        match self {
            Numeric::Int(v) => v,
            Numeric::Float(f) => f as i64,
        }
    }

    /// Widens an integer; returns a float unchanged.
    pub fn as_double(self) -> f64 {
        match self {
            Numeric::Int(v) => v as f64,
            Numeric::Float(f) => f,
        }
    }
}

/// Backtick-delimited freeform payload with an optional `@tag` prefix,
/// e.g. ``@md`**bold**` ``.
#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    pub content: String,
    pub tag: Option<String>,
}

/// A `key` or `key=literal` entry from an `@[ ... ]` block. Literals are
/// scalar only; the parser rejects composites.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub key: String,
    pub value: Option<Value>,
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(v) => write!(f, "{}={}", self.key, v),
            None => write!(f, "{}", self.key),
        }
    }
}

/// One member of an object: `key @[attrs]? := value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: String,
    pub attributes: Vec<Attribute>,
    pub value: Value,
}

/// Ordered sequence of values, captured with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayValue {
    pub(crate) elements: Vec<Value>,
    pub(crate) span: String,
}

impl ArrayValue {
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.elements.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.elements.iter()
    }

    pub fn elements(&self) -> &[Value] {
        &self.elements
    }

    /// The exact source text this array was parsed from.
    pub fn span(&self) -> &str {
        &self.span
    }
}

/// Fixed-arity, position-indexed sequence of at least two values.
#[derive(Debug, Clone, PartialEq)]
pub struct TupleValue {
    pub(crate) elements: Vec<Value>,
    pub(crate) span: String,
}

impl TupleValue {
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.elements.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.elements.iter()
    }

    pub fn elements(&self) -> &[Value] {
        &self.elements
    }

    pub fn span(&self) -> &str {
        &self.span
    }
}

/// Ordered mapping of unique identifiers to values. Lookup behaves like the
/// module façade; see the `Lookup` trait.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectValue {
    pub(crate) fields: Vec<Field>,
    pub(crate) span: String,
}

impl ObjectValue {
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn span(&self) -> &str {
        &self.span
    }
}

/// The closed value universe. Every parsed tree is built from these
/// variants and is immutable after construction.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Numeric(Numeric),
    String(String),
    Bare(String),
    Blob(Blob),
    Array(ArrayValue),
    Tuple(TupleValue),
    Object(ObjectValue),
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Numeric(_) => "numeric",
            Value::String(_) => "string",
            Value::Bare(_) => "bare",
            Value::Blob(_) => "blob",
            Value::Array(_) => "array",
            Value::Tuple(_) => "tuple",
            Value::Object(_) => "object",
        }
    }

    fn mismatch(&self, expected: &'static str) -> AnvilError {
        AnvilError::TypeMismatch {
            expected,
            actual: self.kind(),
            hint: None,
        }
    }

    // === type predicates ===

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Value::Boolean(_))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Numeric(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_bare(&self) -> bool {
        matches!(self, Value::Bare(_))
    }

    pub fn is_blob(&self) -> bool {
        matches!(self, Value::Blob(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn is_tuple(&self) -> bool {
        matches!(self, Value::Tuple(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    // === strict accessors ===

    /// The decoded string. `Null` yields the literal `"null"` and a bare
    /// identifier yields its raw text; only `is_string` tells them apart
    /// from a true string.
    pub fn as_string(&self) -> Result<&str, AnvilError> {
        match self {
            Value::String(s) => Ok(s),
            Value::Bare(id) => Ok(id),
            Value::Null => Ok("null"),
            other => Err(other.mismatch("string")),
        }
    }

    pub fn as_long(&self) -> Result<i64, AnvilError> {
        match self {
            Value::Numeric(n) => Ok(n.as_long()),
            other => Err(other.mismatch("numeric")),
        }
    }

    pub fn as_double(&self) -> Result<f64, AnvilError> {
        match self {
            Value::Numeric(n) => Ok(n.as_double()),
            other => Err(other.mismatch("numeric")),
        }
    }

    pub fn as_boolean(&self) -> Result<bool, AnvilError> {
        match self {
            Value::Boolean(b) => Ok(*b),
            other => Err(other.mismatch("boolean")),
        }
    }

    pub fn as_array(&self) -> Result<&ArrayValue, AnvilError> {
        match self {
            Value::Array(a) => Ok(a),
            other => Err(other.mismatch("array")),
        }
    }

    pub fn as_tuple(&self) -> Result<&TupleValue, AnvilError> {
        match self {
            Value::Tuple(t) => Ok(t),
            other => Err(other.mismatch("tuple")),
        }
    }

    pub fn as_object(&self) -> Result<&ObjectValue, AnvilError> {
        match self {
            Value::Object(o) => Ok(o),
            other => Err(other.mismatch("object")),
        }
    }

    pub fn as_blob(&self) -> Result<&Blob, AnvilError> {
        match self {
            Value::Blob(b) => Ok(b),
            other => Err(other.mismatch("blob")),
        }
    }

    /// The raw identifier text of a bare value.
    pub fn as_bare(&self) -> Result<&str, AnvilError> {
        match self {
            Value::Bare(id) => Ok(id),
            other => Err(other.mismatch("bare")),
        }
    }

    // === lenient accessors: never fail, fall back to the default ===

    pub fn as_string_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.as_string().unwrap_or(default)
    }

    pub fn as_long_or(&self, default: i64) -> i64 {
        self.as_long().unwrap_or(default)
    }

    pub fn as_double_or(&self, default: f64) -> f64 {
        self.as_double().unwrap_or(default)
    }

    pub fn as_boolean_or(&self, default: bool) -> bool {
        self.as_boolean().unwrap_or(default)
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    for c in s.chars() {
        match c {
            '\n' => write!(f, "\\n")?,
            '\t' => write!(f, "\\t")?,
            '\r' => write!(f, "\\r")?,
            '\\' => write!(f, "\\\\")?,
            '"' => write!(f, "\\\"")?,
            other => write!(f, "{}", other)?,
        }
    }
    Ok(())
}

fn write_list(f: &mut fmt::Formatter<'_>, elements: &[Value]) -> fmt::Result {
    for (i, v) in elements.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", v)?;
    }
    Ok(())
}

/// Renders the canonical, re-parseable source form of the value.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Numeric(Numeric::Int(v)) => write!(f, "{}", v),
            // {:?} keeps the dot or exponent, so the text re-parses as a float
            Value::Numeric(Numeric::Float(v)) => write!(f, "{:?}", v),
            Value::String(s) => {
                write!(f, "\"")?;
                write_escaped(f, s)?;
                write!(f, "\"")
            }
            Value::Bare(id) => write!(f, "{}", id),
            Value::Blob(blob) => {
                match &blob.tag {
                    Some(tag) => write!(f, "@{}`{}`", tag, blob.content),
                    None => write!(f, "`{}`", blob.content),
                }
            }
            Value::Array(a) => {
                write!(f, "[")?;
                write_list(f, &a.elements)?;
                write!(f, "]")
            }
            Value::Tuple(t) => {
                write!(f, "(")?;
                write_list(f, &t.elements)?;
                write!(f, ")")
            }
            Value::Object(o) => {
                write!(f, "{{ ")?;
                for (i, field) in o.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", field.key)?;
                    write_attribute_block(f, &field.attributes)?;
                    write!(f, " := {}", field.value)?;
                }
                write!(f, " }}")
            }
        }
    }
}

pub(crate) fn write_attribute_block(
    f: &mut fmt::Formatter<'_>,
    attributes: &[Attribute],
) -> fmt::Result {
    if attributes.is_empty() {
        return Ok(());
    }
    write!(f, " @[")?;
    for (i, attr) in attributes.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", attr)?;
    }
    write!(f, "]")
}

/// A top-level assignment: `key (: parent)? @[attrs]? := value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub key: String,
    pub attributes: Vec<Attribute>,
    pub value: Value,
    pub parent: Option<String>,
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)?;
        if let Some(parent) = &self.parent {
            write!(f, " : {}", parent)?;
        }
        write_attribute_block(f, &self.attributes)?;
        write!(f, " := {}", self.value)
    }
}

/// Parse-mode tag: strict `.aml` or permissive `.asl`. Currently metadata
/// only; the grammar is shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    Aml,
    #[default]
    Asl,
}

impl Dialect {
    pub fn from_shebang(token: &str) -> Option<Dialect> {
        match token {
            "#!aml" => Some(Dialect::Aml),
            "#!asl" => Some(Dialect::Asl),
            _ => None,
        }
    }

    pub fn from_extension(ext: &str) -> Option<Dialect> {
        match ext {
            "aml" => Some(Dialect::Aml),
            "asl" => Some(Dialect::Asl),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Aml => "aml",
            Dialect::Asl => "asl",
        }
    }
}
