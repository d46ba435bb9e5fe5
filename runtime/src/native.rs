//! Native function utilities and helpers
//!
//! Extraction helpers shared by the builtin library. Each one names the
//! calling builtin in its TypeError so messages read `count: expected ...`.

use std::cell::RefCell;
use std::rc::Rc;

use im::Vector as ImVector;

use tramp::{Error, MapValue, Result, Value};

// ============================================================================
// Value Extraction Helpers
// ============================================================================

pub fn type_mismatch(name: &str, expected: &str, got: &Value) -> Error {
    Error::type_error(format!(
        "{name}: expected {expected}, got {}",
        got.type_name()
    ))
}

/// Extract an integer from a Value
pub fn extract_int(name: &str, value: &Value) -> Result<i64> {
    match value {
        Value::Int(n) => Ok(*n),
        other => Err(type_mismatch(name, "integer", other)),
    }
}

/// Extract a string (not a keyword) from a Value
pub fn extract_str<'a>(name: &str, value: &'a Value) -> Result<&'a str> {
    match value {
        Value::Str(s) if !value.is_keyword() => Ok(&**s),
        other => Err(type_mismatch(name, "string", other)),
    }
}

/// Extract the elements of a list or vector
pub fn extract_seq<'a>(name: &str, value: &'a Value) -> Result<&'a ImVector<Value>> {
    value
        .as_seq()
        .ok_or_else(|| type_mismatch(name, "list or vector", value))
}

/// Like `extract_seq`, but `nil` reads as the empty sequence
pub fn extract_seq_or_nil(name: &str, value: &Value) -> Result<ImVector<Value>> {
    match value {
        Value::Nil => Ok(ImVector::new()),
        other => extract_seq(name, other).cloned(),
    }
}

pub fn extract_map<'a>(name: &str, value: &'a Value) -> Result<&'a MapValue> {
    match value {
        Value::Map(map) => Ok(map),
        other => Err(type_mismatch(name, "map", other)),
    }
}

pub fn extract_atom<'a>(name: &str, value: &'a Value) -> Result<&'a Rc<RefCell<Value>>> {
    match value {
        Value::Atom(cell) => Ok(cell),
        other => Err(type_mismatch(name, "atom", other)),
    }
}

// ============================================================================
// Value Construction Helpers
// ============================================================================

/// Join the renderings of `args` with `separator`
pub fn join_rendered(args: &[Value], readably: bool, separator: &str) -> String {
    args.iter()
        .map(|arg| tramp::pr_str(arg, readably))
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_str_rejects_keywords() {
        assert_eq!(extract_str("f", &Value::string("a")).unwrap(), "a");
        let err = extract_str("f", &Value::keyword("a")).unwrap_err();
        assert_eq!(err.to_string(), "f: expected string, got keyword");
    }

    #[test]
    fn test_extract_seq_or_nil() {
        assert!(extract_seq_or_nil("f", &Value::Nil).unwrap().is_empty());
        let list = Value::list(vec![Value::Int(1)]);
        assert_eq!(extract_seq_or_nil("f", &list).unwrap().len(), 1);
        assert!(extract_seq_or_nil("f", &Value::Int(1)).is_err());
    }

    #[test]
    fn test_join_rendered() {
        let args = vec![Value::string("a"), Value::Int(1)];
        assert_eq!(join_rendered(&args, true, " "), "\"a\" 1");
        assert_eq!(join_rendered(&args, false, ""), "a1");
    }
}
