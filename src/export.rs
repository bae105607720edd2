use serde_json::json;

use crate::ast::{Attribute, Numeric, Value};
use crate::module::Module;

/// Export a parsed module to pretty-printed JSON.
///
/// Conversions:
/// - scalars map directly; integers stay integers, floats stay floats
/// - a bare identifier becomes its text
/// - a blob becomes `{"blob": content, "tag": tag}`
/// - tuples and arrays both become JSON arrays
/// - objects become JSON objects in field order
/// - module attributes land under `"attributes"`; tag-form attributes map
///   to JSON null
pub fn module_to_json(module: &Module) -> String {
    let mut top = serde_json::Map::new();

    if !module.attributes().is_empty() {
        top.insert("attributes".into(), attributes_to_json(module.attributes()));
    }

    let mut statements = serde_json::Map::new();
    for stmt in module.statements() {
        statements.insert(stmt.key.clone(), value_to_json(&stmt.value));
    }
    top.insert("statements".into(), serde_json::Value::Object(statements));

    serde_json::to_string_pretty(&serde_json::Value::Object(top))
        .expect("module trees always serialize")
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => json!(b),
        Value::Numeric(Numeric::Int(v)) => json!(v),
        Value::Numeric(Numeric::Float(v)) => json!(v),
        Value::String(s) => json!(s),
        Value::Bare(id) => json!(id),
        Value::Blob(blob) => json!({ "blob": blob.content, "tag": blob.tag }),
        Value::Array(array) => {
            json!(array.iter().map(value_to_json).collect::<Vec<_>>())
        }
        Value::Tuple(tuple) => {
            json!(tuple.iter().map(value_to_json).collect::<Vec<_>>())
        }
        Value::Object(object) => {
            let mut fields = serde_json::Map::new();
            for field in object.fields() {
                fields.insert(field.key.clone(), value_to_json(&field.value));
            }
            serde_json::Value::Object(fields)
        }
    }
}

fn attributes_to_json(attributes: &[Attribute]) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for attr in attributes {
        let value = attr
            .value
            .as_ref()
            .map(value_to_json)
            .unwrap_or(serde_json::Value::Null);
        map.insert(attr.key.clone(), value);
    }
    serde_json::Value::Object(map)
}
