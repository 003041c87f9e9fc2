//! Handler - the closure type bound to one protocol method
//!
//! A handler receives the call's arguments and returns either a value or
//! its own failure. Proxies never inspect or rewrap that failure.

use std::sync::Arc;

use crate::value::Value;

/// A method implementation supplied by the caller
pub type Handler = Arc<dyn Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync>;

/// Wrap a closure as a [`Handler`]
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A handler that ignores its arguments and returns a fixed value
pub fn constant(value: impl Into<Value>) -> Handler {
    let value = value.into();
    Arc::new(move |_args: &[Value]| Ok(value.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_call() {
        let double = handler(|args| {
            let n = args.first().and_then(Value::as_int).unwrap_or_default();
            Ok(Value::from(n * 2))
        });
        assert_eq!(double(&[Value::from(21)]).unwrap(), Value::from(42));
    }

    #[test]
    fn test_constant() {
        let hi = constant("hi");
        assert_eq!(hi(&[]).unwrap(), Value::from("hi"));
        assert_eq!(hi(&[Value::from(1)]).unwrap(), Value::from("hi"));
    }

    #[test]
    fn test_handler_failure() {
        let fails = handler(|_| anyhow::bail!("boom"));
        assert_eq!(fails(&[]).unwrap_err().to_string(), "boom");
    }
}
