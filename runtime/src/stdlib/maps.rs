use tramp::{
    Environment, Error, MapValue, Result, Value, check_arity_exact, check_arity_min,
};

use crate::native::extract_map;

// ============================================================================
// Map Operations
// ============================================================================

/// Build a map from alternating keys and values
pub fn hash_map(args: &[Value]) -> Result<Value> {
    Ok(Value::map(MapValue::from_values(args.to_vec())?))
}

pub fn is_map(args: &[Value]) -> Result<Value> {
    check_arity_exact("map?", args, 1)?;
    Ok(Value::Bool(matches!(args[0], Value::Map(_))))
}

/// New map with the given key/value pairs added or replaced
pub fn assoc(args: &[Value]) -> Result<Value> {
    check_arity_min("assoc", args, 1)?;
    let mut map = extract_map("assoc", &args[0])?.clone();
    let pairs = &args[1..];
    if pairs.len() % 2 != 0 {
        return Err(Error::type_error(
            "assoc: expected an even number of key/value forms",
        ));
    }
    for pair in pairs.chunks(2) {
        map.insert(pair[0].clone(), pair[1].clone())?;
    }
    Ok(Value::map(map))
}

/// New map without the given keys
pub fn dissoc(args: &[Value]) -> Result<Value> {
    check_arity_min("dissoc", args, 1)?;
    let mut map = extract_map("dissoc", &args[0])?.clone();
    for key in &args[1..] {
        map.remove(key)?;
    }
    Ok(Value::map(map))
}

/// Value for a key, or nil. Looking up in nil yields nil.
pub fn get(args: &[Value]) -> Result<Value> {
    check_arity_exact("get", args, 2)?;
    match &args[0] {
        Value::Nil => Ok(Value::Nil),
        other => Ok(extract_map("get", other)?
            .get(&args[1])?
            .unwrap_or_default()),
    }
}

pub fn contains(args: &[Value]) -> Result<Value> {
    check_arity_exact("contains?", args, 2)?;
    match &args[0] {
        Value::Nil => Ok(Value::Bool(false)),
        other => Ok(Value::Bool(extract_map("contains?", other)?.contains(&args[1])?)),
    }
}

pub fn keys(args: &[Value]) -> Result<Value> {
    check_arity_exact("keys", args, 1)?;
    let map = extract_map("keys", &args[0])?;
    Ok(Value::list(map.iter().map(|(k, _)| k.clone())))
}

pub fn vals(args: &[Value]) -> Result<Value> {
    check_arity_exact("vals", args, 1)?;
    let map = extract_map("vals", &args[0])?;
    Ok(Value::list(map.iter().map(|(_, v)| v.clone())))
}

pub fn register(env: &Environment) {
    env.define_str("hash-map", Value::builtin("hash-map", hash_map));
    env.define_str("map?", Value::builtin("map?", is_map));
    env.define_str("assoc", Value::builtin("assoc", assoc));
    env.define_str("dissoc", Value::builtin("dissoc", dissoc));
    env.define_str("get", Value::builtin("get", get));
    env.define_str("contains?", Value::builtin("contains?", contains));
    env.define_str("keys", Value::builtin("keys", keys));
    env.define_str("vals", Value::builtin("vals", vals));
}
