//! Value - arguments and results passed through proxy handlers
//!
//! Primitive values are stored inline. Anything else travels as an opaque,
//! reference-counted object that handlers downcast on the other side.
//!
//! ```text
//! Value::Null        ↔ ValueKind::Void
//! Value::Bool(_)     ↔ ValueKind::Bool
//! Value::Int(_)      ↔ ValueKind::Int
//! Value::Float(_)    ↔ ValueKind::Float
//! Value::Str(_)      ↔ ValueKind::Str
//! Value::List(_)     ↔ ValueKind::List
//! Value::Object(_)   ↔ ValueKind::Object
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Kind of a value as it appears in a method signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// No value (return type of a procedure)
    Void,
    /// Boolean
    Bool,
    /// 64-bit signed integer
    Int,
    /// 64-bit float
    Float,
    /// String
    Str,
    /// List of values
    List,
    /// Opaque object reference
    Object,
}

impl ValueKind {
    /// Short name used in signatures and error messages
    pub const fn name(self) -> &'static str {
        match self {
            ValueKind::Void => "void",
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Str => "str",
            ValueKind::List => "list",
            ValueKind::Object => "object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value passed to or returned from a handler.
///
/// # Thread Safety
///
/// Value is Send + Sync. Object payloads must be Send + Sync themselves.
#[derive(Clone, Default)]
pub enum Value {
    /// Null / no result
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Float
    Float(f64),
    /// String
    Str(String),
    /// List of values
    List(Vec<Value>),
    /// Opaque object (compared by identity)
    Object(Arc<dyn Any + Send + Sync>),
}

impl Value {
    /// Create a null value
    #[inline]
    pub const fn null() -> Self {
        Value::Null
    }

    /// Wrap an arbitrary object
    pub fn object<T: Any + Send + Sync>(object: T) -> Self {
        Value::Object(Arc::new(object))
    }

    /// Wrap an already shared object without re-allocating
    pub fn shared<T: Any + Send + Sync>(object: Arc<T>) -> Self {
        Value::Object(object)
    }

    /// Kind of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Void,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Str(_) => ValueKind::Str,
            Value::List(_) => ValueKind::List,
            Value::Object(_) => ValueKind::Object,
        }
    }

    /// Get type name for debugging
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            other => other.kind().name(),
        }
    }

    /// Check if value is null
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Extract boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract integer value
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Extract float value (integers widen)
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Borrow string contents
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow list elements
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Downcast an object payload to a concrete type
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Object(obj) => obj.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Get a shared handle to an object payload of a concrete type
    pub fn downcast_arc<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        match self {
            Value::Object(obj) => Arc::clone(obj).downcast::<T>().ok(),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Value::Null"),
            Value::Bool(b) => write!(f, "Value::Bool({})", b),
            Value::Int(i) => write!(f, "Value::Int({})", i),
            Value::Float(x) => write!(f, "Value::Float({})", x),
            Value::Str(s) => write!(f, "Value::Str({:?})", s),
            Value::List(items) => f.debug_tuple("Value::List").field(items).finish(),
            Value::Object(obj) => write!(f, "Value::Object({:p})", Arc::as_ptr(obj)),
        }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(Value::Null.kind(), ValueKind::Void);
        assert_eq!(Value::from(true).kind(), ValueKind::Bool);
        assert_eq!(Value::from(3).kind(), ValueKind::Int);
        assert_eq!(Value::from(1.5).kind(), ValueKind::Float);
        assert_eq!(Value::from("hi").kind(), ValueKind::Str);
        assert_eq!(Value::from(vec![1, 2]).kind(), ValueKind::List);
        assert_eq!(Value::object(7u8).kind(), ValueKind::Object);
    }

    #[test]
    fn test_type_name() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::from(3).type_name(), "int");
        assert_eq!(Value::object(()).type_name(), "object");
    }

    #[test]
    fn test_extractors() {
        assert_eq!(Value::from(42).as_int(), Some(42));
        assert_eq!(Value::from(42).as_float(), Some(42.0));
        assert_eq!(Value::from("x").as_str(), Some("x"));
        assert_eq!(Value::from(false).as_bool(), Some(false));
        assert_eq!(Value::from("x").as_int(), None);
        assert_eq!(Value::from(vec!["a"]).as_list().map(|l| l.len()), Some(1));
    }

    #[test]
    fn test_object_identity() {
        let shared = Arc::new(String::from("payload"));
        let a = Value::shared(shared.clone());
        let b = Value::shared(shared);
        let c = Value::object(String::from("payload"));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.downcast_ref::<String>().map(String::as_str), Some("payload"));
        assert!(a.downcast_ref::<i64>().is_none());
        assert!(c.downcast_arc::<String>().is_some());
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(5)), Value::Int(5));
    }
}
