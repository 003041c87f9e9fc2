//! Conversion from handler arguments to Rust types.
//!
//! Handlers receive `&[Value]`. Implement `FromValue` to pull typed
//! arguments out of that slice with [`arg`]; the error converts into
//! `anyhow::Error`, so handlers can use `?` directly.
//!
//! # Example
//!
//! ```ignore
//! use protean_sdk::{arg, handler, Value};
//!
//! let add = handler(|args| {
//!     let a: i64 = arg(args, 0)?;
//!     let b: i64 = arg(args, 1)?;
//!     Ok(Value::from(a + b))
//! });
//! ```

use std::any::Any;
use std::sync::Arc;

use crate::error::{SdkError, SdkResult};
use crate::value::Value;

/// Convert from a `Value` to a Rust type.
pub trait FromValue: Sized {
    /// Convert, returning an error if the type doesn't match.
    fn from_value(value: &Value) -> SdkResult<Self>;
}

fn mismatch(expected: &str, got: &Value) -> SdkError {
    SdkError::TypeMismatch {
        expected: expected.to_string(),
        got: got.type_name().to_string(),
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> SdkResult<Self> {
        Ok(value.clone())
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> SdkResult<Self> {
        value.as_bool().ok_or_else(|| mismatch("bool", value))
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> SdkResult<Self> {
        value.as_int().ok_or_else(|| mismatch("int", value))
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> SdkResult<Self> {
        let wide = value.as_int().ok_or_else(|| mismatch("int", value))?;
        i32::try_from(wide).map_err(|_| SdkError::TypeMismatch {
            expected: "i32".to_string(),
            got: format!("int {}", wide),
        })
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> SdkResult<Self> {
        value.as_float().ok_or_else(|| mismatch("float", value))
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> SdkResult<Self> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| mismatch("str", value))
    }
}

impl FromValue for Vec<Value> {
    fn from_value(value: &Value) -> SdkResult<Self> {
        value
            .as_list()
            .map(<[Value]>::to_vec)
            .ok_or_else(|| mismatch("list", value))
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> SdkResult<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

/// Get a shared object payload of type `T`.
pub fn object_arg<T: Any + Send + Sync>(args: &[Value], index: usize) -> SdkResult<Arc<T>> {
    let value = args.get(index).ok_or(SdkError::MissingArgument {
        index,
        count: args.len(),
    })?;
    value
        .downcast_arc::<T>()
        .ok_or_else(|| mismatch(std::any::type_name::<T>(), value))
}

/// Extract argument `index` as `T`.
pub fn arg<T: FromValue>(args: &[Value], index: usize) -> SdkResult<T> {
    let value = args.get(index).ok_or(SdkError::MissingArgument {
        index,
        count: args.len(),
    })?;
    T::from_value(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arg_extraction() {
        let args = vec![Value::from(2), Value::from("two"), Value::Null];
        assert_eq!(arg::<i64>(&args, 0), Ok(2));
        assert_eq!(arg::<String>(&args, 1), Ok("two".to_string()));
        assert_eq!(arg::<Option<i64>>(&args, 2), Ok(None));
    }

    #[test]
    fn test_arg_missing() {
        let args = vec![Value::from(1)];
        assert_eq!(
            arg::<i64>(&args, 3),
            Err(SdkError::MissingArgument { index: 3, count: 1 })
        );
    }

    #[test]
    fn test_arg_mismatch() {
        let args = vec![Value::from("nope")];
        let err = arg::<bool>(&args, 0).unwrap_err();
        assert_eq!(
            err,
            SdkError::TypeMismatch {
                expected: "bool".to_string(),
                got: "str".to_string(),
            }
        );
    }

    #[test]
    fn test_i32_range() {
        let args = vec![Value::from(i64::MAX)];
        assert!(arg::<i32>(&args, 0).is_err());
    }

    #[test]
    fn test_object_arg() {
        let args = vec![Value::object(vec![1u8, 2, 3])];
        let bytes = object_arg::<Vec<u8>>(&args, 0).unwrap();
        assert_eq!(bytes.len(), 3);
        assert!(object_arg::<String>(&args, 0).is_err());
    }
}
