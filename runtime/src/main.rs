use std::env;
use std::fs;
use std::process;

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{debug, warn};

use tramp::Error;
use tramp_runtime::{ReplConfig, Session, init_tracing};

fn repl(session: &Session, config: &ReplConfig) -> Result<(), ReadlineError> {
    let mut rl = DefaultEditor::new()?;

    if let Some(path) = &config.history_path {
        if let Err(err) = rl.load_history(path) {
            debug!(%err, path = %path.display(), "no history loaded");
        }
    }

    loop {
        match rl.readline(&config.prompt) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                if let Err(err) = rl.add_history_entry(line.as_str()) {
                    debug!(%err, "history entry not recorded");
                }

                match session.rep(&line) {
                    Ok(output) => println!("{output}"),
                    Err(Error::EmptyInput) => {}
                    Err(e) => eprintln!("Error: {e}"),
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err),
        }
    }

    if let Some(path) = &config.history_path {
        if let Some(dir) = path.parent() {
            if let Err(err) = fs::create_dir_all(dir) {
                debug!(%err, dir = %dir.display(), "history directory not created");
            }
        }
        if let Err(err) = rl.save_history(path) {
            warn!(%err, path = %path.display(), "failed to save history");
        }
    }

    Ok(())
}

fn run_file(session: &Session, filename: &str, args: &[String]) -> Result<(), Error> {
    session.set_argv(args);
    session.load_file(filename)?;
    Ok(())
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  tramp                      Start interactive REPL");
    eprintln!("  tramp <file> [args...]     Run a file with *ARGV* bound to args");
    eprintln!("  tramp --help               Show this help message");
}

fn main() {
    init_tracing();
    let args: Vec<String> = env::args().collect();

    let session = match args.get(1).map(String::as_str) {
        Some("--help" | "-h") => {
            print_usage();
            return;
        }
        _ => match Session::try_new() {
            Ok(session) => session,
            Err(e) => {
                eprintln!("Error: failed to load prelude: {e}");
                process::exit(1);
            }
        },
    };

    match args.get(1) {
        None => {
            if let Err(e) = repl(&session, &ReplConfig::from_env()) {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
        Some(filename) => {
            if let Err(e) = run_file(&session, filename, &args[2..]) {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
    }
}
