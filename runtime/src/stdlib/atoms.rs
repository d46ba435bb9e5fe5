use tramp::{Environment, Result, Value, check_arity_exact, check_arity_min};

use crate::interpreter::apply;
use crate::native::extract_atom;

// ============================================================================
// Atoms
// ============================================================================

pub fn atom(args: &[Value]) -> Result<Value> {
    check_arity_exact("atom", args, 1)?;
    Ok(Value::atom(args[0].clone()))
}

pub fn is_atom(args: &[Value]) -> Result<Value> {
    check_arity_exact("atom?", args, 1)?;
    Ok(Value::Bool(matches!(args[0], Value::Atom(_))))
}

pub fn deref(args: &[Value]) -> Result<Value> {
    check_arity_exact("deref", args, 1)?;
    let cell = extract_atom("deref", &args[0])?;
    Ok(cell.borrow().clone())
}

pub fn reset(args: &[Value]) -> Result<Value> {
    check_arity_exact("reset!", args, 2)?;
    let cell = extract_atom("reset!", &args[0])?;
    *cell.borrow_mut() = args[1].clone();
    Ok(args[1].clone())
}

/// `(swap! a f x y)` stores `(f @a x y)` and returns it. The cell is not
/// borrowed while `f` runs, so `f` may read the atom itself.
pub fn swap(args: &[Value]) -> Result<Value> {
    check_arity_min("swap!", args, 2)?;
    let cell = extract_atom("swap!", &args[0])?;

    let current = cell.borrow().clone();
    let mut call_args = Vec::with_capacity(args.len() - 1);
    call_args.push(current);
    call_args.extend(args[2..].iter().cloned());

    let updated = apply(&args[1], call_args)?;
    *cell.borrow_mut() = updated.clone();
    Ok(updated)
}

pub fn register(env: &Environment) {
    env.define_str("atom", Value::builtin("atom", atom));
    env.define_str("atom?", Value::builtin("atom?", is_atom));
    env.define_str("deref", Value::builtin("deref", deref));
    env.define_str("reset!", Value::builtin("reset!", reset));
    env.define_str("swap!", Value::builtin("swap!", swap));
}
