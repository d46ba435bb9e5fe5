//! Symbol interning.
//!
//! Symbol names live once in a process-wide table and values carry a `Copy`
//! handle. The names the evaluator dispatches on are interned up front in
//! [`KnownSymbols`], so recognising a special form compares handles instead
//! of strings.

use std::fmt;
use std::sync::{PoisonError, RwLock};

use once_cell::sync::Lazy;
use string_interner::{DefaultBackend, DefaultSymbol, StringInterner};

type Table = StringInterner<DefaultBackend>;

static TABLE: Lazy<RwLock<Table>> = Lazy::new(|| RwLock::new(Table::default()));

static KNOWN: Lazy<KnownSymbols> = Lazy::new(KnownSymbols::intern);

/// Handle to an interned symbol name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InternedSymbol(DefaultSymbol);

impl InternedSymbol {
    pub fn new(name: &str) -> Self {
        let mut table = TABLE.write().unwrap_or_else(PoisonError::into_inner);
        InternedSymbol(table.get_or_intern(name))
    }

    /// Owned copy of the name
    pub fn resolve(&self) -> String {
        self.with_str(str::to_owned)
    }

    /// Borrow the name for the duration of `f`
    pub fn with_str<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&str) -> R,
    {
        let table = TABLE.read().unwrap_or_else(PoisonError::into_inner);
        // Handles only come from `new`, so the lookup always succeeds.
        f(table.resolve(self.0).unwrap_or_default())
    }
}

impl fmt::Display for InternedSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_str(|s| write!(f, "{s}"))
    }
}

/// Symbols with fixed meaning to the reader and the evaluator
#[derive(Debug)]
pub struct KnownSymbols {
    pub def: InternedSymbol,
    pub defmacro: InternedSymbol,
    pub let_star: InternedSymbol,
    pub do_: InternedSymbol,
    pub if_: InternedSymbol,
    pub fn_star: InternedSymbol,
    pub quote: InternedSymbol,
    pub quasiquote: InternedSymbol,
    pub quasiquoteexpand: InternedSymbol,
    pub unquote: InternedSymbol,
    pub splice_unquote: InternedSymbol,
    pub macroexpand: InternedSymbol,
    pub try_star: InternedSymbol,
    pub catch_star: InternedSymbol,
    pub eval: InternedSymbol,
    pub ampersand: InternedSymbol,
}

impl KnownSymbols {
    fn intern() -> Self {
        KnownSymbols {
            def: InternedSymbol::new("def!"),
            defmacro: InternedSymbol::new("defmacro!"),
            let_star: InternedSymbol::new("let*"),
            do_: InternedSymbol::new("do"),
            if_: InternedSymbol::new("if"),
            fn_star: InternedSymbol::new("fn*"),
            quote: InternedSymbol::new("quote"),
            quasiquote: InternedSymbol::new("quasiquote"),
            quasiquoteexpand: InternedSymbol::new("quasiquoteexpand"),
            unquote: InternedSymbol::new("unquote"),
            splice_unquote: InternedSymbol::new("splice-unquote"),
            macroexpand: InternedSymbol::new("macroexpand"),
            try_star: InternedSymbol::new("try*"),
            catch_star: InternedSymbol::new("catch*"),
            eval: InternedSymbol::new("eval"),
            ampersand: InternedSymbol::new("&"),
        }
    }
}

/// The shared table of [`KnownSymbols`]
pub fn known() -> &'static KnownSymbols {
    &KNOWN
}
