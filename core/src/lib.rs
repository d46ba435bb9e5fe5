//! Core language definition for tramp
//!
//! This crate contains the value model, the reader and the environment
//! chain. It does not evaluate anything; the trampolined evaluator and the
//! builtin library live in the `tramp-runtime` crate.

pub mod environment;
pub mod error;
pub mod interner;
pub mod language;
pub mod lexer;
pub mod parser;
pub mod stack;

// Re-export commonly used items for convenience
pub use environment::{Environment, Params};
pub use error::{Arity, Error, Result, check_arity_exact, check_arity_min, check_arity_range};
pub use interner::{InternedSymbol, KnownSymbols, known};
pub use language::{
    BuiltinFn, ClosureCell, KEYWORD_PREFIX, ListKind, ListValue, MapValue, NativeFn, Printer,
    Value, equals, pr_str,
};
pub use parser::{read_all, read_str};
pub use stack::{DepthGuard, ensure_sufficient_stack, guarded};
