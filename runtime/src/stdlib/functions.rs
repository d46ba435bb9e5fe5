use tramp::{Environment, Error, Result, Value, check_arity_exact, check_arity_min};

use crate::interpreter::apply;
use crate::native::{extract_seq, extract_seq_or_nil};

// ============================================================================
// Exceptions
// ============================================================================

/// Raise any value as a user exception
pub fn throw(args: &[Value]) -> Result<Value> {
    check_arity_exact("throw", args, 1)?;
    Err(Error::Thrown(args[0].clone()))
}

// ============================================================================
// Higher-Order Functions
// ============================================================================

/// `(apply f a b [c d])` calls `(f a b c d)`
pub fn apply_fn(args: &[Value]) -> Result<Value> {
    check_arity_min("apply", args, 2)?;
    let (last, init) = args[1..]
        .split_last()
        .ok_or_else(|| Error::type_error("apply: missing argument list"))?;

    let mut call_args: Vec<Value> = init.to_vec();
    call_args.extend(extract_seq("apply", last)?.iter().cloned());
    apply(&args[0], call_args)
}

/// Apply `f` to each element, collecting the results into a list
pub fn map(args: &[Value]) -> Result<Value> {
    check_arity_exact("map", args, 2)?;
    let items = extract_seq_or_nil("map", &args[1])?;
    let mapped = items
        .into_iter()
        .map(|item| apply(&args[0], vec![item]))
        .collect::<Result<Vec<_>>>()?;
    Ok(Value::list(mapped))
}

pub fn is_fn(args: &[Value]) -> Result<Value> {
    check_arity_exact("fn?", args, 1)?;
    let callable = match &args[0] {
        Value::Builtin(_) => true,
        Value::Closure(closure) => !closure.is_macro,
        _ => false,
    };
    Ok(Value::Bool(callable))
}

pub fn is_macro(args: &[Value]) -> Result<Value> {
    check_arity_exact("macro?", args, 1)?;
    Ok(Value::Bool(args[0].is_macro()))
}

pub fn register(env: &Environment) {
    env.define_str("throw", Value::builtin("throw", throw));
    env.define_str("apply", Value::builtin("apply", apply_fn));
    env.define_str("map", Value::builtin("map", map));
    env.define_str("fn?", Value::builtin("fn?", is_fn));
    env.define_str("macro?", Value::builtin("macro?", is_macro));
}

#[cfg(test)]
mod tests {
    use crate::stdlib::test_support::{create_test_env, eval_str, run};
    use tramp::Error;

    #[test]
    fn test_throw_carries_value() {
        let env = create_test_env();
        let err = eval_str(&env, "(throw {:code 1})").unwrap_err();
        match err {
            Error::Thrown(value) => assert_eq!(value.to_string(), "{:code 1}"),
            other => panic!("expected thrown value, got {other:?}"),
        }
    }

    #[test]
    fn test_apply() {
        assert_eq!(run("(apply + 1 [2])"), "3");
        assert_eq!(run("(apply + (list 1 2))"), "3");
        assert_eq!(run("(apply list 1 2 [3 4])"), "(1 2 3 4)");
        assert_eq!(run("(apply (fn* (& xs) xs) [])"), "()");
    }

    #[test]
    fn test_map() {
        assert_eq!(run("(map (fn* (x) (* x x)) [1 2 3])"), "(1 4 9)");
        assert_eq!(run("(map list nil)"), "()");
    }

    #[test]
    fn test_map_propagates_errors() {
        let env = create_test_env();
        let err = eval_str(&env, "(map (fn* (x) (throw x)) [5 6])").unwrap_err();
        assert!(matches!(err, Error::Thrown(tramp::Value::Int(5))));
    }

    #[test]
    fn test_fn_and_macro_predicates() {
        assert_eq!(run("(fn? +)"), "true");
        assert_eq!(run("(fn? (fn* () 1))"), "true");
        assert_eq!(run("(fn? :a)"), "false");
        let env = create_test_env();
        eval_str(&env, "(defmacro! m (fn* () 1))").unwrap();
        assert_eq!(eval_str(&env, "(fn? m)").unwrap().to_string(), "false");
        assert_eq!(eval_str(&env, "(macro? m)").unwrap().to_string(), "true");
    }
}
