//! Builtin library
//!
//! Every builtin is a plain `fn(&[Value]) -> Result<Value>`. Builtins that
//! call back into the language (`apply`, `map`, `swap!`) go through
//! `interpreter::apply`.

use tramp::Environment;

mod atoms;
mod functions;
mod maps;
mod numeric;
mod predicates;
mod sequences;
mod strings;

// ============================================================================
// Registration
// ============================================================================

/// Register all builtin functions in the given environment
pub fn register_stdlib(env: &Environment) {
    // Arithmetic, comparison and equality
    numeric::register(env);

    // Printing, reading and host I/O
    strings::register(env);

    // Lists and vectors
    sequences::register(env);

    // Maps
    maps::register(env);

    // Atoms
    atoms::register(env);

    // Exceptions and higher-order functions
    functions::register(env);

    // Type predicates, constructors and metadata
    predicates::register(env);
}
