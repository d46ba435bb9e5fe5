use std::fs;
use std::io::{self, BufRead, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use tramp::{Environment, Error, Result, Value, check_arity_exact, read_str};

use crate::native::{extract_str, join_rendered};

// ============================================================================
// Printing
// ============================================================================

/// Readable renderings joined by spaces
/// Usage: (pr-str "a" 1) => "\"a\" 1"
pub fn pr_str(args: &[Value]) -> Result<Value> {
    Ok(Value::string(join_rendered(args, true, " ")))
}

/// Display renderings concatenated
/// Usage: (str "a" 1) => "a1"
pub fn str_fn(args: &[Value]) -> Result<Value> {
    Ok(Value::string(join_rendered(args, false, "")))
}

fn print_line(line: &str) -> Result<Value> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{line}").map_err(|e| Error::Io(format!("print: I/O error: {e}")))?;
    handle
        .flush()
        .map_err(|e| Error::Io(format!("print: I/O error: {e}")))?;
    Ok(Value::Nil)
}

/// Print readable renderings joined by spaces, returns nil
pub fn prn(args: &[Value]) -> Result<Value> {
    print_line(&join_rendered(args, true, " "))
}

/// Print display renderings joined by spaces, returns nil
pub fn println(args: &[Value]) -> Result<Value> {
    print_line(&join_rendered(args, false, " "))
}

// ============================================================================
// Reading and Host I/O
// ============================================================================

/// Parse the first form of a string without evaluating it
pub fn read_string(args: &[Value]) -> Result<Value> {
    check_arity_exact("read-string", args, 1)?;
    read_str(extract_str("read-string", &args[0])?)
}

/// Read an entire file as a string
/// Usage: (slurp "path/to/file.txt") => "file contents"
pub fn slurp(args: &[Value]) -> Result<Value> {
    check_arity_exact("slurp", args, 1)?;
    let path = extract_str("slurp", &args[0])?;
    debug!(path, "slurp");
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Io(format!("slurp: failed to read '{path}': {e}")))?;
    Ok(Value::string(content))
}

/// Print a prompt and read one line from stdin; nil at end of input
pub fn readline(args: &[Value]) -> Result<Value> {
    check_arity_exact("readline", args, 1)?;
    let prompt = extract_str("readline", &args[0])?;

    let mut stdout = io::stdout();
    write!(stdout, "{prompt}")
        .and_then(|_| stdout.flush())
        .map_err(|e| Error::Io(format!("readline: I/O error: {e}")))?;

    let mut line = String::new();
    let read = io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| Error::Io(format!("readline: I/O error: {e}")))?;
    if read == 0 {
        return Ok(Value::Nil);
    }
    let trimmed = line.trim_end_matches(['\n', '\r']);
    Ok(Value::string(trimmed))
}

/// Milliseconds since the Unix epoch
pub fn time_ms(args: &[Value]) -> Result<Value> {
    check_arity_exact("time-ms", args, 0)?;
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| Error::Io(format!("time-ms: clock error: {e}")))?;
    i64::try_from(elapsed.as_millis())
        .map(Value::Int)
        .map_err(|_| Error::type_error("time-ms: timestamp out of range"))
}

pub fn register(env: &Environment) {
    env.define_str("pr-str", Value::builtin("pr-str", pr_str));
    env.define_str("str", Value::builtin("str", str_fn));
    env.define_str("prn", Value::builtin("prn", prn));
    env.define_str("println", Value::builtin("println", println));
    env.define_str("read-string", Value::builtin("read-string", read_string));
    env.define_str("slurp", Value::builtin("slurp", slurp));
    env.define_str("readline", Value::builtin("readline", readline));
    env.define_str("time-ms", Value::builtin("time-ms", time_ms));
}
