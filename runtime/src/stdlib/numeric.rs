use tramp::{Environment, Error, Result, Value, check_arity_exact, equals};

use crate::native::extract_int;

// ============================================================================
// Arithmetic Operations
// ============================================================================

/// Apply a checked integer operation to exactly two integer arguments
fn arithmetic(
    name: &str,
    args: &[Value],
    op: fn(i64, i64) -> Option<i64>,
) -> Result<Value> {
    check_arity_exact(name, args, 2)?;
    let a = extract_int(name, &args[0])?;
    let b = extract_int(name, &args[1])?;
    op(a, b)
        .map(Value::Int)
        .ok_or_else(|| Error::type_error(format!("{name}: integer overflow")))
}

pub fn add(args: &[Value]) -> Result<Value> {
    arithmetic("+", args, i64::checked_add)
}

pub fn sub(args: &[Value]) -> Result<Value> {
    arithmetic("-", args, i64::checked_sub)
}

pub fn mul(args: &[Value]) -> Result<Value> {
    arithmetic("*", args, i64::checked_mul)
}

/// Integer division, truncating toward zero
pub fn div(args: &[Value]) -> Result<Value> {
    check_arity_exact("/", args, 2)?;
    if matches!(args[1], Value::Int(0)) {
        return Err(Error::type_error("/: division by zero"));
    }
    arithmetic("/", args, i64::checked_div)
}

// ============================================================================
// Comparison Operations
// ============================================================================

fn comparison(name: &str, args: &[Value], op: fn(&i64, &i64) -> bool) -> Result<Value> {
    check_arity_exact(name, args, 2)?;
    let a = extract_int(name, &args[0])?;
    let b = extract_int(name, &args[1])?;
    Ok(Value::Bool(op(&a, &b)))
}

pub fn lt(args: &[Value]) -> Result<Value> {
    comparison("<", args, i64::lt)
}

pub fn lte(args: &[Value]) -> Result<Value> {
    comparison("<=", args, i64::le)
}

pub fn gt(args: &[Value]) -> Result<Value> {
    comparison(">", args, i64::gt)
}

pub fn gte(args: &[Value]) -> Result<Value> {
    comparison(">=", args, i64::ge)
}

/// Structural equality of any two values
pub fn eq(args: &[Value]) -> Result<Value> {
    check_arity_exact("=", args, 2)?;
    Ok(Value::Bool(equals(&args[0], &args[1])?))
}

pub fn register(env: &Environment) {
    env.define_str("+", Value::builtin("+", add));
    env.define_str("-", Value::builtin("-", sub));
    env.define_str("*", Value::builtin("*", mul));
    env.define_str("/", Value::builtin("/", div));
    env.define_str("<", Value::builtin("<", lt));
    env.define_str("<=", Value::builtin("<=", lte));
    env.define_str(">", Value::builtin(">", gt));
    env.define_str(">=", Value::builtin(">=", gte));
    env.define_str("=", Value::builtin("=", eq));
}
