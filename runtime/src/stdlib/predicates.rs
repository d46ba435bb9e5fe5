use tramp::{Environment, KEYWORD_PREFIX, Result, Value, check_arity_exact};

use crate::native::{extract_str, type_mismatch};

// ============================================================================
// Type Predicates
// ============================================================================

fn predicate(name: &str, args: &[Value], test: fn(&Value) -> bool) -> Result<Value> {
    check_arity_exact(name, args, 1)?;
    Ok(Value::Bool(test(&args[0])))
}

pub fn is_nil(args: &[Value]) -> Result<Value> {
    predicate("nil?", args, |v| matches!(v, Value::Nil))
}

pub fn is_true(args: &[Value]) -> Result<Value> {
    predicate("true?", args, |v| matches!(v, Value::Bool(true)))
}

pub fn is_false(args: &[Value]) -> Result<Value> {
    predicate("false?", args, |v| matches!(v, Value::Bool(false)))
}

pub fn is_symbol(args: &[Value]) -> Result<Value> {
    predicate("symbol?", args, |v| matches!(v, Value::Symbol(_)))
}

pub fn is_keyword(args: &[Value]) -> Result<Value> {
    predicate("keyword?", args, Value::is_keyword)
}

pub fn is_string(args: &[Value]) -> Result<Value> {
    predicate("string?", args, |v| matches!(v, Value::Str(_)) && !v.is_keyword())
}

pub fn is_number(args: &[Value]) -> Result<Value> {
    predicate("number?", args, |v| matches!(v, Value::Int(_)))
}

// ============================================================================
// Constructors
// ============================================================================

pub fn symbol(args: &[Value]) -> Result<Value> {
    check_arity_exact("symbol", args, 1)?;
    Ok(Value::symbol(extract_str("symbol", &args[0])?))
}

/// Keyword from a string; a keyword is returned unchanged
pub fn keyword(args: &[Value]) -> Result<Value> {
    check_arity_exact("keyword", args, 1)?;
    match &args[0] {
        Value::Str(s) if s.starts_with(KEYWORD_PREFIX) => Ok(args[0].clone()),
        Value::Str(s) => Ok(Value::keyword(s)),
        other => Err(type_mismatch("keyword", "string", other)),
    }
}

// ============================================================================
// Metadata
// ============================================================================

pub fn meta(args: &[Value]) -> Result<Value> {
    check_arity_exact("meta", args, 1)?;
    Ok(args[0].meta())
}

pub fn with_meta(args: &[Value]) -> Result<Value> {
    check_arity_exact("with-meta", args, 2)?;
    args[0].with_meta(args[1].clone())
}

pub fn register(env: &Environment) {
    env.define_str("nil?", Value::builtin("nil?", is_nil));
    env.define_str("true?", Value::builtin("true?", is_true));
    env.define_str("false?", Value::builtin("false?", is_false));
    env.define_str("symbol?", Value::builtin("symbol?", is_symbol));
    env.define_str("symbol", Value::builtin("symbol", symbol));
    env.define_str("keyword?", Value::builtin("keyword?", is_keyword));
    env.define_str("keyword", Value::builtin("keyword", keyword));
    env.define_str("string?", Value::builtin("string?", is_string));
    env.define_str("number?", Value::builtin("number?", is_number));
    env.define_str("meta", Value::builtin("meta", meta));
    env.define_str("with-meta", Value::builtin("with-meta", with_meta));
}
