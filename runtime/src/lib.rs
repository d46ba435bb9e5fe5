//! tramp runtime - evaluator, builtin library and REPL support
//!
//! This crate provides the execution side of tramp:
//! - Trampolined evaluator with macros, quasiquote and try*/catch*
//! - Builtin library registered into the global environment
//! - Bootstrap prelude and the read/eval/print session
//! - REPL configuration and logging setup for the `tramp` binary

pub mod config;
pub mod interpreter;
pub mod native;
pub mod prelude;
pub mod quasiquote;
pub mod session;
pub mod stdlib;

use std::sync::Once;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

// Re-export interpreter entry points
pub use interpreter::{apply, eval, macroexpand};

// Re-export stdlib registration
pub use stdlib::register_stdlib;

pub use config::ReplConfig;
pub use quasiquote::quasiquote;
pub use session::Session;

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing unless `RUST_LOG` is set, so the REPL stays quiet by default.
/// Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let _ = tracing_subscriber::registry()
            .with(EnvFilter::from_default_env())
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init();
    });
}
