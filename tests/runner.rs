// Script runner tests against real files

use epp::console::MockTerminal;
use epp::interpreter::settings::{DisplayMode, Settings};
use epp::runner::{run_path, EXIT_FAILURE, EXIT_OK};
use epp::Interpreter;
use std::fs;
use std::path::Path;

fn interpreter(terminal: &MockTerminal) -> Interpreter {
    let settings = Settings::default().with_display(DisplayMode::Headless);
    Interpreter::with_console(settings, Box::new(terminal.clone()))
}

#[test]
fn test_runs_a_script_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hello.epp");
    fs::write(&path, "\u{feff}set name to \"world\"\nsay \"Hello, \" + name").unwrap();

    let terminal = MockTerminal::new();
    let status = run_path(&path, &mut interpreter(&terminal), false);
    assert_eq!(status, EXIT_OK);
    assert_eq!(terminal.output(), vec!["Hello, world"]);
}

#[test]
fn test_check_mode_reports_success_without_running() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ok.epp");
    fs::write(&path, "say \"should not print\"").unwrap();

    let terminal = MockTerminal::new();
    let status = run_path(&path, &mut interpreter(&terminal), true);
    assert_eq!(status, EXIT_OK);
    assert_eq!(
        terminal.output(),
        vec![format!("Looks good! '{}' has no syntax errors.", path.display())]
    );
}

#[test]
fn test_check_mode_reports_syntax_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.epp");
    fs::write(&path, "if x is greater than 1 then\n  say x\n").unwrap();

    let terminal = MockTerminal::new();
    let status = run_path(&path, &mut interpreter(&terminal), true);
    assert_eq!(status, EXIT_FAILURE);
    let output = terminal.output();
    assert_eq!(output.len(), 1);
    assert!(output[0].contains("end if"), "got {:?}", output);
}

#[test]
fn test_missing_file_and_directory() {
    let terminal = MockTerminal::new();
    let mut interp = interpreter(&terminal);

    let missing = Path::new("/no/such/script.epp");
    assert_eq!(run_path(missing, &mut interp, false), EXIT_FAILURE);

    let dir = tempfile::tempdir().unwrap();
    assert_eq!(run_path(dir.path(), &mut interp, false), EXIT_FAILURE);

    assert_eq!(
        terminal.output(),
        vec![
            "Oops! I can't find '/no/such/script.epp'.".to_string(),
            format!("Oops! '{}' is not a file.", dir.path().display()),
        ]
    );
}

#[test]
fn test_runtime_failure_sets_exit_status() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("boom.epp");
    fs::write(&path, "say \"start\"\nsay ghost").unwrap();

    let terminal = MockTerminal::new();
    let status = run_path(&path, &mut interpreter(&terminal), false);
    assert_eq!(status, EXIT_FAILURE);
    assert_eq!(
        terminal.output(),
        vec![
            "start",
            "Oops! On line 2, I can't find 'ghost'. Try setting it first.",
        ]
    );
}
