//! Trampolined evaluator
//!
//! `eval` runs as a loop over `(ast, env)`. Forms in tail position (the
//! chosen branch of `if`, the last form of `do`, the body of `let*`, a
//! closure body, the expansion of `quasiquote`, the handler of `catch*`, the
//! result of `eval`) replace the current pair and loop instead of recursing,
//! so tail recursion runs in constant host stack.
//!
//! Every other evaluation recurses through [`eval`], which grows the host
//! stack on demand and fails with `DepthExceeded` past the nesting limit.

use std::rc::Rc;

use im::Vector as ImVector;
use tracing::{debug, trace};

use tramp::{
    Arity, ClosureCell, Environment, Error, InternedSymbol, ListKind, MapValue, Params,
    Result, Value, check_arity_exact, check_arity_range, guarded, known,
};

use crate::quasiquote::quasiquote;

// ============================================================================
// Special Forms
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpecialForm {
    Def,
    DefMacro,
    Let,
    Do,
    If,
    Fn,
    Quote,
    Quasiquote,
    QuasiquoteExpand,
    MacroExpand,
    Try,
    Eval,
}

impl SpecialForm {
    fn from_symbol(sym: InternedSymbol) -> Option<Self> {
        let k = known();
        let table = [
            (k.def, SpecialForm::Def),
            (k.defmacro, SpecialForm::DefMacro),
            (k.let_star, SpecialForm::Let),
            (k.do_, SpecialForm::Do),
            (k.if_, SpecialForm::If),
            (k.fn_star, SpecialForm::Fn),
            (k.quote, SpecialForm::Quote),
            (k.quasiquote, SpecialForm::Quasiquote),
            (k.quasiquoteexpand, SpecialForm::QuasiquoteExpand),
            (k.macroexpand, SpecialForm::MacroExpand),
            (k.try_star, SpecialForm::Try),
            (k.eval, SpecialForm::Eval),
        ];
        table
            .into_iter()
            .find_map(|(name, form)| (name == sym).then_some(form))
    }
}

/// Outcome of one trampoline step
enum Step {
    Done(Value),
    Continue(Value, Environment),
}

// ============================================================================
// Evaluator
// ============================================================================

/// Evaluate `ast` in `env`
pub fn eval(ast: Value, env: &Environment) -> Result<Value> {
    guarded(|| run_trampoline(ast, env))
}

fn run_trampoline(ast: Value, env: &Environment) -> Result<Value> {
    let mut ast = ast;
    let mut env = env.clone();

    loop {
        if !is_call(&ast) {
            return eval_ast(&ast, &env);
        }

        ast = macroexpand(ast, &env)?;
        let list = match &ast {
            Value::List(list) if is_call(&ast) => Rc::clone(list),
            _ => return eval_ast(&ast, &env),
        };

        let head = &list.items[0];
        let args: Vec<Value> = list.items.iter().skip(1).cloned().collect();

        let special = head.as_symbol().and_then(SpecialForm::from_symbol);
        let step = match special {
            Some(form) => eval_special(form, args, &env)?,
            None => {
                let callee = eval(head.clone(), &env)?;
                let args = args
                    .into_iter()
                    .map(|arg| eval(arg, &env))
                    .collect::<Result<Vec<_>>>()?;
                call_step(&callee, args)?
            }
        };

        match step {
            Step::Done(value) => return Ok(value),
            Step::Continue(next_ast, next_env) => {
                ast = next_ast;
                env = next_env;
            }
        }
    }
}

/// A non-empty parenthesised list: the only shape that is applied
fn is_call(ast: &Value) -> bool {
    matches!(ast, Value::List(list) if list.kind == ListKind::List && !list.items.is_empty())
}

/// Evaluate anything that is not a call: symbols are looked up, collections
/// evaluate their elements, everything else is returned as is.
fn eval_ast(ast: &Value, env: &Environment) -> Result<Value> {
    match ast {
        Value::Symbol(sym) => env.get(*sym),
        Value::List(list) if list.kind == ListKind::Vector => {
            let items = list
                .items
                .iter()
                .map(|item| eval(item.clone(), env))
                .collect::<Result<ImVector<_>>>()?;
            Ok(Value::sequence(items, ListKind::Vector))
        }
        Value::Map(map) => {
            let mut evaluated = MapValue::new();
            for (key, value) in map.iter() {
                evaluated.insert(key.clone(), eval(value.clone(), env)?)?;
            }
            Ok(Value::map(evaluated))
        }
        _ => Ok(ast.clone()),
    }
}

/// Invoke an already-evaluated callee. Closure bodies come back as a
/// continuation so the trampoline can run them in place.
fn call_step(callee: &Value, args: Vec<Value>) -> Result<Step> {
    match callee {
        Value::Builtin(builtin) => Ok(Step::Done((builtin.func)(&args)?)),
        Value::Closure(closure) => {
            let env = closure.env.bind(&closure.params, args)?;
            trace!(body = %closure.body, "tail call");
            Ok(Step::Continue(closure.body.clone(), env))
        }
        other => Err(not_callable(other)),
    }
}

fn not_callable(value: &Value) -> Error {
    Error::type_error(format!(
        "{} is not callable ({})",
        value,
        value.type_name()
    ))
}

/// Call `f` with `args` from outside the trampoline; used by builtins such as
/// `apply`, `map` and `swap!`, and by macro expansion.
pub fn apply(f: &Value, args: Vec<Value>) -> Result<Value> {
    match f {
        Value::Builtin(builtin) => (builtin.func)(&args),
        Value::Closure(closure) => {
            let env = closure.env.bind(&closure.params, args)?;
            eval(closure.body.clone(), &env)
        }
        other => Err(not_callable(other)),
    }
}

// ============================================================================
// Macro Expansion
// ============================================================================

/// The macro named by the head of `ast`, if `ast` is a call to one
fn macro_for(ast: &Value, env: &Environment) -> Option<Rc<ClosureCell>> {
    let Value::List(list) = ast else {
        return None;
    };
    if list.kind != ListKind::List {
        return None;
    }
    let sym = list.items.front()?.as_symbol()?;
    match env.lookup(sym)? {
        Value::Closure(closure) if closure.is_macro => Some(closure),
        _ => None,
    }
}

/// Expand `ast` while its head names a macro. Returns `ast` unchanged when it
/// is not a macro call.
pub fn macroexpand(ast: Value, env: &Environment) -> Result<Value> {
    let mut ast = ast;
    while let Some(mac) = macro_for(&ast, env) {
        let args = match &ast {
            Value::List(list) => list.items.iter().skip(1).cloned().collect(),
            _ => Vec::new(),
        };
        let expanded = apply(&Value::Closure(mac), args)?;
        debug!(from = %ast, to = %expanded, "macro expansion");
        ast = expanded;
    }
    Ok(ast)
}

// ============================================================================
// Special Form Evaluation
// ============================================================================

fn eval_special(form: SpecialForm, args: Vec<Value>, env: &Environment) -> Result<Step> {
    match form {
        SpecialForm::Def => {
            check_arity_exact("def!", &args, 2)?;
            let name = expect_symbol("def!", &args[0])?;
            let value = eval(args[1].clone(), env)?;
            env.define(name, value.clone());
            Ok(Step::Done(value))
        }
        SpecialForm::DefMacro => {
            check_arity_exact("defmacro!", &args, 2)?;
            let name = expect_symbol("defmacro!", &args[0])?;
            let value = eval(args[1].clone(), env)?;
            let closure = match value {
                Value::Closure(closure) => closure,
                other => {
                    return Err(Error::type_error(format!(
                        "defmacro!: expected a function, got {}",
                        other.type_name()
                    )));
                }
            };
            let mac = Value::Closure(Rc::new(ClosureCell {
                is_macro: true,
                ..(*closure).clone()
            }));
            env.define(name, mac.clone());
            Ok(Step::Done(mac))
        }
        SpecialForm::Let => {
            check_arity_exact("let*", &args, 2)?;
            let bindings = args[0].as_seq().ok_or_else(|| {
                Error::type_error(format!(
                    "let*: bindings must be a list or vector, got {}",
                    args[0].type_name()
                ))
            })?;
            if bindings.len() % 2 != 0 {
                return Err(Error::syntax(
                    "let*: bindings require an even number of forms",
                ));
            }

            let let_env = env.child();
            let mut iter = bindings.iter();
            while let (Some(name), Some(expr)) = (iter.next(), iter.next()) {
                let name = expect_symbol("let*", name)?;
                let value = eval(expr.clone(), &let_env)?;
                let_env.define(name, value);
            }
            Ok(Step::Continue(args[1].clone(), let_env))
        }
        SpecialForm::Do => {
            let Some((last, init)) = args.split_last() else {
                return Err(Error::arity("do", Arity::AtLeast(1), 0));
            };
            for form in init {
                eval(form.clone(), env)?;
            }
            Ok(Step::Continue(last.clone(), env.clone()))
        }
        SpecialForm::If => {
            check_arity_range("if", &args, 2, 3)?;
            let mut args = args.into_iter();
            let cond = args.next().unwrap_or_default();
            let then_branch = args.next().unwrap_or_default();
            let else_branch = args.next();

            if eval(cond, env)?.is_truthy() {
                Ok(Step::Continue(then_branch, env.clone()))
            } else {
                match else_branch {
                    Some(branch) => Ok(Step::Continue(branch, env.clone())),
                    None => Ok(Step::Done(Value::Nil)),
                }
            }
        }
        SpecialForm::Fn => {
            check_arity_exact("fn*", &args, 2)?;
            let forms = args[0].as_seq().ok_or_else(|| {
                Error::type_error(format!(
                    "fn*: parameters must be a list or vector, got {}",
                    args[0].type_name()
                ))
            })?;
            let params = Params::parse(forms)?;
            Ok(Step::Done(Value::Closure(Rc::new(ClosureCell {
                params,
                body: args[1].clone(),
                env: env.clone(),
                is_macro: false,
                meta: Value::Nil,
            }))))
        }
        SpecialForm::Quote => {
            check_arity_exact("quote", &args, 1)?;
            Ok(Step::Done(args[0].clone()))
        }
        SpecialForm::Quasiquote => {
            check_arity_exact("quasiquote", &args, 1)?;
            Ok(Step::Continue(quasiquote(&args[0])?, env.clone()))
        }
        SpecialForm::QuasiquoteExpand => {
            check_arity_exact("quasiquoteexpand", &args, 1)?;
            Ok(Step::Done(quasiquote(&args[0])?))
        }
        SpecialForm::MacroExpand => {
            check_arity_exact("macroexpand", &args, 1)?;
            Ok(Step::Done(macroexpand(args[0].clone(), env)?))
        }
        SpecialForm::Try => eval_try(args, env),
        SpecialForm::Eval => {
            check_arity_exact("eval", &args, 1)?;
            let form = eval(args[0].clone(), env)?;
            debug!(form = %form, "eval in global environment");
            Ok(Step::Continue(form, env.root()))
        }
    }
}

/// `(try* body)` or `(try* body (catch* name handler))`
fn eval_try(args: Vec<Value>, env: &Environment) -> Result<Step> {
    check_arity_range("try*", &args, 1, 2)?;
    let body = args[0].clone();
    let Some(clause) = args.get(1) else {
        return Ok(Step::Continue(body, env.clone()));
    };
    let (name, handler) = parse_catch(clause)?;

    match eval(body, env) {
        Ok(value) => Ok(Step::Done(value)),
        Err(err) => {
            debug!(error = %err, thrown = err.is_thrown(), "caught exception");
            let catch_env = env.child();
            catch_env.define(name, err.payload());
            Ok(Step::Continue(handler, catch_env))
        }
    }
}

fn parse_catch(clause: &Value) -> Result<(InternedSymbol, Value)> {
    let items = match clause {
        Value::List(list) if clause.is_form(known().catch_star) => &list.items,
        _ => {
            return Err(Error::syntax(format!(
                "try*: expected (catch* name handler), got {clause}"
            )));
        }
    };
    if items.len() != 3 {
        return Err(Error::syntax(
            "catch*: expected exactly a name and a handler",
        ));
    }
    let name = expect_symbol("catch*", &items[1])?;
    Ok((name, items[2].clone()))
}

fn expect_symbol(form: &str, value: &Value) -> Result<InternedSymbol> {
    value.as_symbol().ok_or_else(|| {
        Error::type_error(format!(
            "{form}: expected a symbol, got {}",
            value.type_name()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tramp::read_str;

    fn eval_in(env: &Environment, input: &str) -> Result<Value> {
        eval(read_str(input)?, env)
    }

    fn run(input: &str) -> String {
        let env = Environment::new();
        eval_in(&env, input).unwrap().to_string()
    }

    #[test]
    fn test_self_evaluating() {
        assert_eq!(run("42"), "42");
        assert_eq!(run("\"s\""), "\"s\"");
        assert_eq!(run(":k"), ":k");
        assert_eq!(run("nil"), "nil");
        assert_eq!(run("()"), "()");
    }

    #[test]
    fn test_def_and_lookup() {
        let env = Environment::new();
        eval_in(&env, "(def! x 3)").unwrap();
        assert_eq!(eval_in(&env, "x").unwrap().to_string(), "3");
        assert_eq!(eval_in(&env, "[x {:a x}]").unwrap().to_string(), "[3 {:a 3}]");
    }

    #[test]
    fn test_unbound_symbol() {
        let env = Environment::new();
        let err = eval_in(&env, "nope").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_if_and_do() {
        assert_eq!(run("(if nil 1 2)"), "2");
        assert_eq!(run("(if 0 1 2)"), "1");
        assert_eq!(run("(if false 1)"), "nil");
        assert_eq!(run("(do 1 2 3)"), "3");
    }

    #[test]
    fn test_special_form_arity() {
        let env = Environment::new();
        assert!(matches!(eval_in(&env, "(if)"), Err(Error::Arity { .. })));
        assert!(matches!(eval_in(&env, "(quote)"), Err(Error::Arity { .. })));
        assert!(matches!(eval_in(&env, "(do)"), Err(Error::Arity { .. })));
        assert!(matches!(eval_in(&env, "(def! 1 2)"), Err(Error::Type(_))));
    }

    #[test]
    fn test_let_scoping() {
        let env = Environment::new();
        eval_in(&env, "(def! a 1)").unwrap();
        assert_eq!(eval_in(&env, "(let* (a 2 b a) b)").unwrap().to_string(), "2");
        assert_eq!(eval_in(&env, "a").unwrap().to_string(), "1");
        assert!(eval_in(&env, "(let* (a) a)").is_err());
    }

    #[test]
    fn test_closures_and_rest_params() {
        assert_eq!(run("((fn* (a b) b) 1 2)"), "2");
        assert_eq!(run("((fn* (& xs) xs) 1 2 3)"), "(1 2 3)");
        assert_eq!(run("((fn* [a & xs] xs) 1)"), "()");
        let env = Environment::new();
        assert!(matches!(eval_in(&env, "((fn* (a) a))"), Err(Error::Arity { .. })));
    }

    #[test]
    fn test_not_callable() {
        let env = Environment::new();
        assert!(matches!(eval_in(&env, "(1 2)"), Err(Error::Type(_))));
    }

    #[test]
    fn test_try_catch_structural_error() {
        assert_eq!(run("(try* undefined (catch* e e))"), "\"'undefined' not found\"");
        assert_eq!(run("(try* 7)"), "7");
        assert_eq!(run("(try* 7 (catch* e 8))"), "7");
    }

    #[test]
    fn test_malformed_catch() {
        let env = Environment::new();
        assert!(matches!(eval_in(&env, "(try* 1 (foo e 2))"), Err(Error::Syntax(_))));
        assert!(matches!(eval_in(&env, "(try* 1 (catch* e))"), Err(Error::Syntax(_))));
    }

    #[test]
    fn test_macroexpand_without_macro_is_identity() {
        assert_eq!(run("(macroexpand (a b c))"), "(a b c)");
    }

    #[test]
    fn test_eval_uses_root_environment() {
        let env = Environment::new();
        eval_in(&env, "(def! x 1)").unwrap();
        let result = eval_in(&env, "(let* (x 2) (eval (quote x)))").unwrap();
        assert_eq!(result.to_string(), "1");
    }
}
