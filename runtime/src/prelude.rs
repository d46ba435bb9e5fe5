//! Definitions written in the language itself, evaluated into every new
//! session after the builtins are registered.

use tracing::error;

use tramp::{Environment, Result, Value, read_str};

use crate::interpreter::eval;

pub const PRELUDE: &[&str] = &[
    "(def! not (fn* (a) (if a false true)))",
    r#"(def! load-file (fn* (f) (eval (read-string (str "(do " (slurp f) "\nnil)")))))"#,
    r#"(defmacro! cond (fn* (& xs) (if (> (count xs) 0) (list 'if (first xs) (if (> (count xs) 1) (nth xs 1) (throw "odd number of forms to cond")) (cons 'cond (rest (rest xs)))))))"#,
    r#"(def! *host-language* "rust")"#,
    "(def! *ARGV* (list))",
];

fn eval_source(env: &Environment, source: &str) -> Result<Value> {
    eval(read_str(source)?, env)
}

/// Evaluate every prelude form in `env`, stopping at the first failure.
pub fn load_prelude(env: &Environment) -> Result<()> {
    for source in PRELUDE {
        eval_source(env, source).inspect_err(|err| {
            error!(%err, source, "prelude form failed");
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stdlib::register_stdlib;

    fn prelude_env() -> Environment {
        let env = Environment::new();
        register_stdlib(&env);
        load_prelude(&env).unwrap();
        env
    }

    fn run(env: &Environment, input: &str) -> String {
        eval_source(env, input).unwrap().to_string()
    }

    #[test]
    fn test_every_prelude_form_loads() {
        let env = Environment::new();
        register_stdlib(&env);
        for source in PRELUDE {
            assert!(eval_source(&env, source).is_ok(), "failed: {source}");
        }
    }

    #[test]
    fn test_missing_builtin_fails_load() {
        let env = Environment::new();
        assert!(matches!(load_prelude(&env), Err(tramp::Error::NotFound(_))));
    }

    #[test]
    fn test_not() {
        let env = prelude_env();
        assert_eq!(run(&env, "(not nil)"), "true");
        assert_eq!(run(&env, "(not 0)"), "false");
    }

    #[test]
    fn test_cond() {
        let env = prelude_env();
        assert_eq!(run(&env, "(cond false 1 true 2)"), "2");
        assert_eq!(run(&env, "(cond false 1)"), "nil");
        assert_eq!(run(&env, "(cond)"), "nil");
        assert!(eval_source(&env, "(cond true)").is_err());
    }

    #[test]
    fn test_host_language_and_argv() {
        let env = prelude_env();
        assert_eq!(run(&env, "*host-language*"), "\"rust\"");
        assert_eq!(run(&env, "*ARGV*"), "()");
    }
}
