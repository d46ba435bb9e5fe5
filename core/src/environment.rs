//! Environment for variable bindings
//!
//! The Environment is a lexical scope that holds variable bindings.
//! It forms a chain of scopes, with child environments referencing their
//! parents. Closures keep their defining environment alive through the
//! shared `Rc`; since frames only ever point outward, no cycles form.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use im::Vector as ImVector;
use rustc_hash::FxHashMap;

use crate::error::{Arity, Error, Result};
use crate::interner::{InternedSymbol, known};
use crate::language::Value;

// ============================================================================
// Parameter Lists
// ============================================================================

/// Parameter list of a closure: fixed names plus an optional rest name
/// introduced by `&`.
#[derive(Debug, Clone, Default)]
pub struct Params {
    pub fixed: Vec<InternedSymbol>,
    pub rest: Option<InternedSymbol>,
}

impl Params {
    /// Parse `(a b & more)` style parameter forms.
    pub fn parse(forms: &ImVector<Value>) -> Result<Self> {
        let mut params = Params::default();
        let mut iter = forms.iter();

        while let Some(form) = iter.next() {
            let sym = form.as_symbol().ok_or_else(|| {
                Error::type_error(format!(
                    "fn*: parameter must be a symbol, got {}",
                    form.type_name()
                ))
            })?;

            if sym != known().ampersand {
                params.fixed.push(sym);
                continue;
            }

            let rest = iter
                .next()
                .and_then(Value::as_symbol)
                .ok_or_else(|| Error::syntax("fn*: '&' must be followed by a symbol"))?;
            if iter.next().is_some() {
                return Err(Error::syntax(
                    "fn*: only one parameter may follow '&'",
                ));
            }
            params.rest = Some(rest);
        }

        Ok(params)
    }

    pub fn arity(&self) -> Arity {
        match self.rest {
            Some(_) => Arity::AtLeast(self.fixed.len()),
            None => Arity::Exact(self.fixed.len()),
        }
    }
}

// ============================================================================
// Environment
// ============================================================================

// Internal state holding the frame and parent pointer
struct EnvironmentState {
    data: RefCell<FxHashMap<InternedSymbol, Value>>,
    parent: Option<Environment>,
}

/// Environment for variable bindings.
///
/// Cheap to clone (an `Rc` increment). `define` only touches this frame, so
/// sharing one parent between many closures and children is safe.
#[derive(Clone)]
pub struct Environment {
    state: Rc<EnvironmentState>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<environment>")
    }
}

impl Environment {
    /// Create a new, empty global environment
    pub fn new() -> Self {
        Self::with_parent(None)
    }

    fn with_parent(parent: Option<Environment>) -> Self {
        Environment {
            state: Rc::new(EnvironmentState {
                data: RefCell::new(FxHashMap::default()),
                parent,
            }),
        }
    }

    /// Create an empty child scope, as `let*` and `catch*` do
    pub fn child(&self) -> Self {
        Self::with_parent(Some(self.clone()))
    }

    /// Create a child scope binding `params` to `args`.
    ///
    /// Arity is exact unless a rest parameter is present, in which case the
    /// surplus arguments are collected into a list.
    pub fn bind(&self, params: &Params, args: Vec<Value>) -> Result<Self> {
        let fixed = params.fixed.len();
        let arity_ok = match params.rest {
            Some(_) => args.len() >= fixed,
            None => args.len() == fixed,
        };
        if !arity_ok {
            return Err(Error::arity("closure", params.arity(), args.len()));
        }

        let env = self.child();
        let mut args = args.into_iter();
        for (param, arg) in params.fixed.iter().zip(args.by_ref()) {
            env.define(*param, arg);
        }
        if let Some(rest) = params.rest {
            env.define(rest, Value::list(args));
        }
        Ok(env)
    }

    /// Define a variable in the CURRENT scope, never in a parent
    pub fn define(&self, name: InternedSymbol, value: Value) {
        self.state.data.borrow_mut().insert(name, value);
    }

    pub fn define_str(&self, name: &str, value: Value) {
        self.define(InternedSymbol::new(name), value);
    }

    /// Look up a variable, walking up the parent chain
    pub fn lookup(&self, name: InternedSymbol) -> Option<Value> {
        let mut current = self;
        loop {
            if let Some(val) = current.state.data.borrow().get(&name) {
                return Some(val.clone());
            }
            current = current.state.parent.as_ref()?;
        }
    }

    /// Like `lookup`, failing with NotFound when the chain is exhausted
    pub fn get(&self, name: InternedSymbol) -> Result<Value> {
        self.lookup(name)
            .ok_or_else(|| Error::NotFound(name.resolve()))
    }

    /// The outermost environment of this chain
    pub fn root(&self) -> Environment {
        let mut current = self;
        while let Some(parent) = &current.state.parent {
            current = parent;
        }
        current.clone()
    }

    pub fn ptr_eq(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}
