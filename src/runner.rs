//! Script runner
//!
//! Reads a script, parses it and executes it in one interpreter session.
//! Diagnostics go to the interpreter's console, exactly as the user sees
//! them; `--verbose` adds host status lines on stderr.

use crate::error::EppError;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::settings::Settings;
use crate::parser::parse_source;
use std::fs;
use std::path::Path;

/// Process status for success
pub const EXIT_OK: i32 = 0;
/// Process status for any reported failure
pub const EXIT_FAILURE: i32 = 1;

/// Parse and (unless `check_only`) execute `source`, reporting any failure
/// on the interpreter's console.
pub fn execute_source(source: &str, interpreter: &mut Interpreter, check_only: bool) -> i32 {
    match try_execute(source, interpreter, check_only) {
        Ok(()) => EXIT_OK,
        Err(err) => {
            interpreter.console_mut().write_line(&err.to_string());
            EXIT_FAILURE
        }
    }
}

fn try_execute(source: &str, interpreter: &mut Interpreter, check_only: bool) -> Result<(), EppError> {
    let verbose = interpreter.settings().verbose;
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);

    let program = parse_source(source)?;
    if verbose {
        eprintln!(
            "Parsed successfully. Found {} top-level statements.",
            program.statements.len()
        );
    }
    if check_only {
        return Ok(());
    }

    if verbose {
        eprintln!("Executing program...");
    }
    interpreter.execute(&program)?;
    Ok(())
}

/// Run a script file in a fresh interpreter on the standard streams
pub fn run_file(path: &Path, settings: &Settings, check_only: bool) -> i32 {
    let mut interpreter = Interpreter::new(settings.clone());
    run_path(path, &mut interpreter, check_only)
}

/// Run a script file in an existing session
pub fn run_path(path: &Path, interpreter: &mut Interpreter, check_only: bool) -> i32 {
    if !path.exists() {
        let message = format!("Oops! I can't find '{}'.", path.display());
        interpreter.console_mut().write_line(&message);
        return EXIT_FAILURE;
    }
    if !path.is_file() {
        let message = format!("Oops! '{}' is not a file.", path.display());
        interpreter.console_mut().write_line(&message);
        return EXIT_FAILURE;
    }

    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            let message = format!("Oops! I couldn't read '{}': {}", path.display(), e);
            interpreter.console_mut().write_line(&message);
            return EXIT_FAILURE;
        }
    };

    if interpreter.settings().verbose {
        eprintln!("Parsing {}...", path.display());
    }
    let status = execute_source(&source, interpreter, check_only);
    if status == EXIT_OK && check_only {
        let message = format!("Looks good! '{}' has no syntax errors.", path.display());
        interpreter.console_mut().write_line(&message);
    }
    status
}
