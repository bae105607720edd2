use crate::ast::{ArrayValue, Blob, ObjectValue, TupleValue, Value};
use crate::error::AnvilError;
use crate::module::Module;

/// Read-only keyed lookup over a parsed tree.
///
/// Implemented by [`Module`] (top-level statements) and [`ObjectValue`]
/// (object fields), so nested navigation chains:
///
/// ```no_run
/// # use anvil_cfg::{AnvilConfig, Lookup};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let config = AnvilConfig::from_file("config.aml")?;
/// let token = config.module().get_object("auth")?.get_string("token")?;
/// # Ok(())
/// # }
/// ```
pub trait Lookup {
    /// Name used in `NoSuchKey` diagnostics.
    fn label(&self) -> &str;

    /// Raw keyed access; `None` when absent.
    fn value_of(&self, key: &str) -> Option<&Value>;

    /// Keys in insertion order.
    fn keys(&self) -> Vec<&str>;

    fn contains(&self, key: &str) -> bool {
        self.value_of(key).is_some()
    }

    /// The value for `key`, or `NoSuchKey`.
    fn get(&self, key: &str) -> Result<&Value, AnvilError> {
        self.value_of(key).ok_or_else(|| AnvilError::NoSuchKey {
            module: self.label().to_string(),
            key: key.to_string(),
        })
    }

    /// The value for `key`, or `None`. Never fails.
    fn try_get(&self, key: &str) -> Option<&Value> {
        self.value_of(key)
    }

    // === typed helpers: `get` composed with the strict accessor ===

    fn get_string(&self, key: &str) -> Result<&str, AnvilError> {
        self.get(key)?.as_string()
    }

    fn get_long(&self, key: &str) -> Result<i64, AnvilError> {
        self.get(key)?.as_long()
    }

    fn get_double(&self, key: &str) -> Result<f64, AnvilError> {
        self.get(key)?.as_double()
    }

    fn get_boolean(&self, key: &str) -> Result<bool, AnvilError> {
        self.get(key)?.as_boolean()
    }

    fn get_array(&self, key: &str) -> Result<&ArrayValue, AnvilError> {
        self.get(key)?.as_array()
    }

    fn get_object(&self, key: &str) -> Result<&ObjectValue, AnvilError> {
        self.get(key)?.as_object()
    }

    fn get_tuple(&self, key: &str) -> Result<&TupleValue, AnvilError> {
        self.get(key)?.as_tuple()
    }

    fn get_blob(&self, key: &str) -> Result<&Blob, AnvilError> {
        self.get(key)?.as_blob()
    }

    fn get_bare(&self, key: &str) -> Result<&str, AnvilError> {
        self.get(key)?.as_bare()
    }

    /// Typed access through the `TryFrom<Value>` conversions.
    ///
    /// ```no_run
    /// # use anvil_cfg::{AnvilConfig, Lookup};
    /// # let config = AnvilConfig::from_str("port := 8080").unwrap();
    /// let port: u16 = config.get_as("port")?;
    /// # Ok::<(), anvil_cfg::AnvilError>(())
    /// ```
    fn get_as<T>(&self, key: &str) -> Result<T, AnvilError>
    where
        T: TryFrom<Value, Error = AnvilError>,
    {
        T::try_from(self.get(key)?.clone())
    }

    /// Typed access with a fallback default; never fails.
    fn get_or<T>(&self, key: &str, default: T) -> T
    where
        T: TryFrom<Value, Error = AnvilError>,
    {
        self.get_as(key).unwrap_or(default)
    }
}

impl Lookup for Module {
    fn label(&self) -> &str {
        self.namespace()
    }

    fn value_of(&self, key: &str) -> Option<&Value> {
        self.lookup(key)
    }

    fn keys(&self) -> Vec<&str> {
        self.key_names()
    }
}

impl Lookup for ObjectValue {
    fn label(&self) -> &str {
        "object"
    }

    fn value_of(&self, key: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|field| field.key == key)
            .map(|field| &field.value)
    }

    fn keys(&self) -> Vec<&str> {
        self.fields.iter().map(|field| field.key.as_str()).collect()
    }
}
