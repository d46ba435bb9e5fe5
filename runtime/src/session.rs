use tracing::error;

use tramp::{Environment, Error, Result, Value, pr_str, read_all};

use crate::interpreter::eval;
use crate::prelude::load_prelude;
use crate::stdlib::register_stdlib;

/// One interpreter instance: a global environment holding the builtins and
/// the prelude, plus everything the user defines.
#[derive(Debug, Clone)]
pub struct Session {
    global: Environment,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A session with the builtins and the prelude loaded.
    ///
    /// The prelude is fixed source, so failure here is a bug in this crate;
    /// it is logged and the session keeps whatever loaded. Use
    /// [`Session::try_new`] to observe the error instead.
    pub fn new() -> Self {
        let global = Environment::new();
        register_stdlib(&global);
        if let Err(err) = load_prelude(&global) {
            error!(%err, "session started without a complete prelude");
        }
        Session { global }
    }

    /// Like [`Session::new`], but a failing prelude form is returned
    pub fn try_new() -> Result<Self> {
        let global = Environment::new();
        register_stdlib(&global);
        load_prelude(&global)?;
        Ok(Session { global })
    }

    /// The root environment of this session
    pub fn global(&self) -> &Environment {
        &self.global
    }

    /// Bind `*ARGV*` to `args` as a list of strings
    pub fn set_argv(&self, args: &[String]) {
        let argv = Value::list(args.iter().map(|arg| Value::string(arg.as_str())));
        self.global.define_str("*ARGV*", argv);
    }

    /// Read every form of `input` and evaluate them in order, returning the
    /// last value. Stops at the first failure.
    pub fn eval_str(&self, input: &str) -> Result<Value> {
        let forms = read_all(input)?;
        if forms.is_empty() {
            return Err(Error::EmptyInput);
        }
        let mut last = Value::Nil;
        for form in forms {
            last = eval(form, &self.global)?;
        }
        Ok(last)
    }

    /// Read, evaluate and print: the readable rendering of the last value
    pub fn rep(&self, input: &str) -> Result<String> {
        self.eval_str(input).map(|value| pr_str(&value, true))
    }

    /// Evaluate a file the way `load-file` does
    pub fn load_file(&self, path: &str) -> Result<Value> {
        let call = Value::list([Value::symbol("load-file"), Value::string(path)]);
        eval(call, &self.global)
    }
}
