use crate::ast::{Numeric, Value};
use crate::error::AnvilError;

fn mismatch(expected: &'static str, value: &Value, hint: &str) -> AnvilError {
    AnvilError::TypeMismatch {
        expected,
        actual: value.kind(),
        hint: Some(hint.to_string()),
    }
}

fn out_of_range(expected: &'static str, hint: String) -> AnvilError {
    AnvilError::TypeMismatch {
        expected,
        actual: "numeric",
        hint: Some(hint),
    }
}

impl TryFrom<Value> for String {
    type Error = AnvilError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Ok(s),
            Value::Bare(id) => Ok(id),
            Value::Null => Ok("null".to_string()),
            other => Err(mismatch("string", &other, "Use a string value in your config")),
        }
    }
}

impl TryFrom<Value> for bool {
    type Error = AnvilError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Boolean(b) => Ok(b),
            Value::Bare(ref id)
                if id.to_lowercase().starts_with("tru") || id.to_lowercase().starts_with("fal") =>
            {
                Err(AnvilError::TypeMismatch {
                    expected: "boolean",
                    actual: "bare",
                    hint: Some(format!(
                        "Invalid boolean value '{}'. Did you mean 'true' or 'false'?",
                        id
                    )),
                })
            }
            other => Err(mismatch("boolean", &other, "Use true or false in your config")),
        }
    }
}

impl TryFrom<Value> for i64 {
    type Error = AnvilError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Numeric(n) => Ok(n.as_long()),
            other => Err(mismatch("numeric", &other, "Use a number value in your config")),
        }
    }
}

impl TryFrom<Value> for f64 {
    type Error = AnvilError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Numeric(n) => Ok(n.as_double()),
            other => Err(mismatch("numeric", &other, "Use a number value in your config")),
        }
    }
}

impl TryFrom<Value> for f32 {
    type Error = AnvilError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        f64::try_from(value).map(|n| n as f32)
    }
}

macro_rules! int_conversion {
    ($ty:ty, $name:literal, $range:literal) => {
        impl TryFrom<Value> for $ty {
            type Error = AnvilError;

            fn try_from(value: Value) -> Result<Self, Self::Error> {
                match value {
                    Value::Numeric(n) => {
                        let long = n.as_long();
                        <$ty>::try_from(long).map_err(|_| {
                            out_of_range(
                                $name,
                                format!("Number {} out of range for {} ({})", long, $name, $range),
                            )
                        })
                    }
                    other => Err(mismatch(
                        $name,
                        &other,
                        "Use a number value in your config",
                    )),
                }
            }
        }
    };
}

int_conversion!(i32, "i32", "-2147483648 to 2147483647");
int_conversion!(u8, "u8", "0 to 255");
int_conversion!(u16, "u16", "0 to 65535");
int_conversion!(u32, "u32", "0 to 4294967295");
int_conversion!(u64, "u64", "0 to i64::MAX");
int_conversion!(usize, "usize", "0 to i64::MAX");

impl<T> TryFrom<Value> for Vec<T>
where
    T: TryFrom<Value, Error = AnvilError>,
{
    type Error = AnvilError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Array(array) => {
                let mut result = Vec::with_capacity(array.len());
                for element in array.elements {
                    result.push(T::try_from(element)?);
                }
                Ok(result)
            }
            other => Err(mismatch("array", &other, "Use an array [...] in your config")),
        }
    }
}

impl<T> TryFrom<Value> for Option<T>
where
    T: TryFrom<Value, Error = AnvilError>,
{
    type Error = AnvilError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(None),
            v => Ok(Some(T::try_from(v)?)),
        }
    }
}

impl TryFrom<Value> for (Value, Value) {
    type Error = AnvilError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Tuple(tuple) => match <[Value; 2]>::try_from(tuple.elements) {
                Ok([first, second]) => Ok((first, second)),
                Err(_) => Err(AnvilError::TypeMismatch {
                    expected: "tuple",
                    actual: "tuple",
                    hint: Some("Use a two-element tuple (a, b) in your config".into()),
                }),
            },
            other => Err(mismatch(
                "tuple",
                &other,
                "Use a two-element tuple (a, b) in your config",
            )),
        }
    }
}

impl TryFrom<Value> for Numeric {
    type Error = AnvilError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Numeric(n) => Ok(n),
            other => Err(mismatch("numeric", &other, "Use a number value in your config")),
        }
    }
}
