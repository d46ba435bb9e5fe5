use im::Vector as ImVector;
use unicode_segmentation::UnicodeSegmentation;

use tramp::{
    Environment, Error, ListKind, Result, Value, check_arity_exact, check_arity_min,
};

use crate::native::{extract_int, extract_seq, extract_seq_or_nil, type_mismatch};

// ============================================================================
// Constructors and Type Checks
// ============================================================================

pub fn list(args: &[Value]) -> Result<Value> {
    Ok(Value::list(args.iter().cloned()))
}

pub fn vector(args: &[Value]) -> Result<Value> {
    Ok(Value::vector(args.iter().cloned()))
}

fn is_kind(name: &str, args: &[Value], kind: ListKind) -> Result<Value> {
    check_arity_exact(name, args, 1)?;
    Ok(Value::Bool(
        matches!(&args[0], Value::List(list) if list.kind == kind),
    ))
}

pub fn is_list(args: &[Value]) -> Result<Value> {
    is_kind("list?", args, ListKind::List)
}

pub fn is_vector(args: &[Value]) -> Result<Value> {
    is_kind("vector?", args, ListKind::Vector)
}

pub fn is_sequential(args: &[Value]) -> Result<Value> {
    check_arity_exact("sequential?", args, 1)?;
    Ok(Value::Bool(matches!(args[0], Value::List(_))))
}

// ============================================================================
// Size
// ============================================================================

pub fn is_empty(args: &[Value]) -> Result<Value> {
    check_arity_exact("empty?", args, 1)?;
    let empty = match &args[0] {
        Value::Nil => true,
        Value::List(list) => list.items.is_empty(),
        Value::Map(map) => map.is_empty(),
        other => return Err(type_mismatch("empty?", "list, vector or map", other)),
    };
    Ok(Value::Bool(empty))
}

/// Element count; `nil` counts as empty
pub fn count(args: &[Value]) -> Result<Value> {
    check_arity_exact("count", args, 1)?;
    let len = match &args[0] {
        Value::Nil => 0,
        Value::List(list) => list.items.len(),
        Value::Map(map) => map.len(),
        other => return Err(type_mismatch("count", "list, vector or map", other)),
    };
    i64::try_from(len)
        .map(Value::Int)
        .map_err(|_| Error::type_error("count: length out of range"))
}

// ============================================================================
// Building Lists
// ============================================================================

/// Prepend to a list or vector, always yielding a list
pub fn cons(args: &[Value]) -> Result<Value> {
    check_arity_exact("cons", args, 2)?;
    let mut items = extract_seq_or_nil("cons", &args[1])?;
    items.push_front(args[0].clone());
    Ok(Value::sequence(items, ListKind::List))
}

/// Concatenate any number of lists or vectors into a new list
pub fn concat(args: &[Value]) -> Result<Value> {
    let mut items = ImVector::new();
    for arg in args {
        items.append(extract_seq_or_nil("concat", arg)?);
    }
    Ok(Value::sequence(items, ListKind::List))
}

pub fn vec(args: &[Value]) -> Result<Value> {
    check_arity_exact("vec", args, 1)?;
    let items = extract_seq_or_nil("vec", &args[0])?;
    Ok(Value::sequence(items, ListKind::Vector))
}

/// Add elements the natural way for the collection: lists grow at the
/// front, vectors at the back.
pub fn conj(args: &[Value]) -> Result<Value> {
    check_arity_min("conj", args, 1)?;
    let Value::List(list) = &args[0] else {
        return Err(type_mismatch("conj", "list or vector", &args[0]));
    };
    let mut items = list.items.clone();
    for arg in &args[1..] {
        match list.kind {
            ListKind::List => items.push_front(arg.clone()),
            ListKind::Vector => items.push_back(arg.clone()),
        }
    }
    Ok(Value::sequence(items, list.kind))
}

// ============================================================================
// Access
// ============================================================================

pub fn nth(args: &[Value]) -> Result<Value> {
    check_arity_exact("nth", args, 2)?;
    let items = extract_seq("nth", &args[0])?;
    let index = extract_int("nth", &args[1])?;
    usize::try_from(index)
        .ok()
        .and_then(|i| items.get(i))
        .cloned()
        .ok_or_else(|| {
            Error::type_error(format!(
                "nth: index {index} out of range for length {}",
                items.len()
            ))
        })
}

/// First element; `nil` for `nil` or an empty sequence
pub fn first(args: &[Value]) -> Result<Value> {
    check_arity_exact("first", args, 1)?;
    let items = extract_seq_or_nil("first", &args[0])?;
    Ok(items.front().cloned().unwrap_or_default())
}

/// Everything after the first element, as a list; `()` for `nil`
pub fn rest(args: &[Value]) -> Result<Value> {
    check_arity_exact("rest", args, 1)?;
    let items = extract_seq_or_nil("rest", &args[0])?;
    let tail = if items.is_empty() {
        ImVector::new()
    } else {
        items.skip(1)
    };
    Ok(Value::sequence(tail, ListKind::List))
}

/// Coerce to a list, or `nil` when empty. Strings split into grapheme
/// clusters.
pub fn seq(args: &[Value]) -> Result<Value> {
    check_arity_exact("seq", args, 1)?;
    match &args[0] {
        Value::Nil => Ok(Value::Nil),
        Value::List(list) if list.items.is_empty() => Ok(Value::Nil),
        Value::List(list) => Ok(Value::sequence(list.items.clone(), ListKind::List)),
        Value::Str(s) if !args[0].is_keyword() => {
            if s.is_empty() {
                return Ok(Value::Nil);
            }
            Ok(Value::list(s.graphemes(true).map(Value::string)))
        }
        other => Err(type_mismatch("seq", "list, vector, string or nil", other)),
    }
}

pub fn register(env: &Environment) {
    env.define_str("list", Value::builtin("list", list));
    env.define_str("list?", Value::builtin("list?", is_list));
    env.define_str("vector", Value::builtin("vector", vector));
    env.define_str("vector?", Value::builtin("vector?", is_vector));
    env.define_str("sequential?", Value::builtin("sequential?", is_sequential));
    env.define_str("empty?", Value::builtin("empty?", is_empty));
    env.define_str("count", Value::builtin("count", count));
    env.define_str("cons", Value::builtin("cons", cons));
    env.define_str("concat", Value::builtin("concat", concat));
    env.define_str("vec", Value::builtin("vec", vec));
    env.define_str("conj", Value::builtin("conj", conj));
    env.define_str("nth", Value::builtin("nth", nth));
    env.define_str("first", Value::builtin("first", first));
    env.define_str("rest", Value::builtin("rest", rest));
    env.define_str("seq", Value::builtin("seq", seq));
}

#[cfg(test)]
mod tests {
    use crate::stdlib::test_support::{create_test_env, eval_str, run};
    use tramp::Error;

    #[test]
    fn test_list_and_vector_predicates() {
        assert_eq!(run("(list 1 2)"), "(1 2)");
        assert_eq!(run("(list? (list))"), "true");
        assert_eq!(run("(list? [1])"), "false");
        assert_eq!(run("(vector? [1])"), "true");
        assert_eq!(run("(sequential? [1])"), "true");
        assert_eq!(run("(sequential? \"abc\")"), "false");
    }

    #[test]
    fn test_count_and_empty() {
        assert_eq!(run("(count nil)"), "0");
        assert_eq!(run("(count [1 2 3])"), "3");
        assert_eq!(run("(count {:a 1})"), "1");
        assert_eq!(run("(empty? ())"), "true");
        assert_eq!(run("(empty? [1])"), "false");
    }

    #[test]
    fn test_cons_and_concat_return_lists() {
        assert_eq!(run("(cons 1 [2 3])"), "(1 2 3)");
        assert_eq!(run("(cons 1 nil)"), "(1)");
        assert_eq!(run("(concat [1] (list 2) [])"), "(1 2)");
        assert_eq!(run("(concat)"), "()");
    }

    #[test]
    fn test_cons_does_not_touch_original() {
        let env = create_test_env();
        eval_str(&env, "(def! xs (list 2 3))").unwrap();
        eval_str(&env, "(cons 1 xs)").unwrap();
        assert_eq!(eval_str(&env, "xs").unwrap().to_string(), "(2 3)");
    }

    #[test]
    fn test_conj() {
        assert_eq!(run("(conj (list 1) 2 3)"), "(3 2 1)");
        assert_eq!(run("(conj [1] 2 3)"), "[1 2 3]");
    }

    #[test]
    fn test_first_rest_nth() {
        assert_eq!(run("(first nil)"), "nil");
        assert_eq!(run("(first [])"), "nil");
        assert_eq!(run("(first [7 8])"), "7");
        assert_eq!(run("(rest nil)"), "()");
        assert_eq!(run("(rest [7 8])"), "(8)");
        assert_eq!(run("(nth (list 7 8) 1)"), "8");
        let env = create_test_env();
        assert!(matches!(eval_str(&env, "(nth [1] 1)"), Err(Error::Type(_))));
        assert!(matches!(eval_str(&env, "(nth [1] -1)"), Err(Error::Type(_))));
    }

    #[test]
    fn test_vec_and_seq() {
        assert_eq!(run("(vec (list 1 2))"), "[1 2]");
        assert_eq!(run("(seq [1 2])"), "(1 2)");
        assert_eq!(run("(seq [])"), "nil");
        assert_eq!(run("(seq \"ab\")"), "(\"a\" \"b\")");
        assert_eq!(run("(seq \"\")"), "nil");
    }
}
