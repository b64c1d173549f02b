// Integration tests for the E++ language

use epp::console::MockTerminal;
use epp::interpreter::builtins::Builtin;
use epp::interpreter::settings::{DisplayMode, Settings};
use epp::{parse_source, runner, Interpreter, RuntimeError};

fn interpreter_with(terminal: &MockTerminal, settings: Settings) -> Interpreter {
    Interpreter::with_console(settings.with_display(DisplayMode::Headless), Box::new(terminal.clone()))
}

/// Run a script and return its status plus everything the console saw
fn run_source(source: &str) -> (i32, Vec<String>) {
    run_with_inputs(source, Vec::<String>::new())
}

fn run_with_inputs(source: &str, inputs: Vec<impl Into<String>>) -> (i32, Vec<String>) {
    let terminal = MockTerminal::with_inputs(inputs);
    let mut interpreter = interpreter_with(&terminal, Settings::default());
    let status = runner::execute_source(source, &mut interpreter, false);
    (status, terminal.output())
}

#[test]
fn test_readable_aliases_for_variables_math_and_output() {
    let source = "\
let total be 10
increase total by 5
decrease total by 3
show total";
    assert_eq!(run_source(source), (0, vec!["12".to_string()]));
}

#[test]
fn test_readable_aliases_for_blocks_functions_and_calls() {
    let source = r#"
function grade with score
  when score is bigger than 89 then
    give back "A"
  or if score is greater than or equal to 80 then
    give back "B"
  else
    give back "C"
  finish if
finish function

make list nums
add 1 to nums
add 2 to nums
for every item in nums
  print item
finish for

set letter to run grade with 82
say letter
do 1 times
  say "once"
finish repeat
"#;
    let (status, output) = run_source(source);
    assert_eq!(status, 0, "output: {:?}", output);
    assert_eq!(output, vec!["1", "2", "B", "once"]);
}

#[test]
fn test_input_and_put_into() {
    let source = r#"
ask "Name? " and save as name
put "Hi " + name into message
print message
"#;
    let (status, output) = run_with_inputs(source, vec!["Sam"]);
    assert_eq!(status, 0);
    assert_eq!(output, vec!["Name? ", "Hi Sam"]);
}

#[test]
fn test_input_is_always_text() {
    let source = r#"
ask "Age? " and store in age
say age + 1
"#;
    let (status, output) = run_with_inputs(source, vec!["41"]);
    assert_eq!(status, 1);
    assert_eq!(output[0], "Age? ");
    assert!(output[1].starts_with("Oops! On line 3,"), "got {:?}", output);
}

#[test]
fn test_end_function_alias() {
    let source = "\
function identity with x
  give back x
end function
say run identity with 4";
    assert_eq!(run_source(source), (0, vec!["4".to_string()]));
}

#[test]
fn test_otherwise_if_preserves_case_in_string_literals() {
    let source = r#"
set mode_name to "Normal"
if mode_name equals "Easy" then
  say "easy"
otherwise if mode_name equals "Normal" then
  say "normal"
otherwise
  say "other"
end if
"#;
    assert_eq!(run_source(source), (0, vec!["normal".to_string()]));
}

#[test]
fn test_only_first_true_branch_runs() {
    let source = r#"
set score to 95
if score is at least 90 then
  say "A"
otherwise if score is at least 80 then
  say "B"
end if
"#;
    assert_eq!(run_source(source), (0, vec!["A".to_string()]));
}

#[test]
fn test_break_and_continue() {
    let source = "\
set total to 0
repeat 10 times
  add 1 to total
  if total equals 3 then
    skip repeat
  end if
  if total equals 6 then
    stop repeat
  end if
end repeat
say total";
    assert_eq!(run_source(source), (0, vec!["6".to_string()]));
}

#[test]
fn test_call_expression_and_return_value() {
    let source = "\
define add_two with a and b
  return a + b
end define
set value to call add_two with 3, 4
say value";
    assert_eq!(run_source(source), (0, vec!["7".to_string()]));
}

#[test]
fn test_contains_condition() {
    let source = r#"
create list items
add 2 to items
add 5 to items
if items contains 5 then
  say "found"
otherwise
  say "missing"
end if
if items does not contain 7 then
  say "no seven"
end if
"#;
    assert_eq!(
        run_source(source),
        (0, vec!["found".to_string(), "no seven".to_string()])
    );
}

#[test]
fn test_lists_and_maps() {
    let source = r#"
create list pets
add "cat" to pets
add "dog" to pets
add "fish" to pets
remove "dog" from pets
say pets
say len(pets)
set ages to {"ada": 36, "alan": 41}
say ages["alan"]
say sorted([3, 1, 2])
"#;
    let (status, output) = run_source(source);
    assert_eq!(status, 0, "output: {:?}", output);
    assert_eq!(output, vec!["[\"cat\", \"fish\"]", "2", "41", "[1, 2, 3]"]);
}

#[test]
fn test_arithmetic_mutations() {
    let source = "\
set n to 10
multiply n by 3
subtract 4 from n
divide n by 2
say n
set f to 7
divide f by 2
say f";
    let (status, output) = run_source(source);
    assert_eq!(status, 0, "output: {:?}", output);
    assert_eq!(output, vec!["13", "3.5"]);
}

#[test]
fn test_random_support_in_expressions_and_plain_english_forms() {
    let source = r#"
set r1 to call random with 1, 6
if r1 < 1 or r1 > 6 then
  say "bad1"
otherwise
  say "ok1"
end if

set r2 to random between 10 and 20
if r2 < 10 or r2 > 20 then
  say "bad2"
otherwise
  say "ok2"
end if

set r3 to random
if r3 >= 0 and r3 <= 1 then
  say "ok3"
otherwise
  say "bad3"
end if

create list pool
add "A" to pool
add "B" to pool
set picked to random choice from pool
if pool contains picked then
  say "ok4"
otherwise
  say "bad4"
end if
"#;
    let (status, output) = run_source(source);
    assert_eq!(status, 0, "output: {:?}", output);
    assert_eq!(output, vec!["ok1", "ok2", "ok3", "ok4"]);
}

#[test]
fn test_loop_safety_limit() {
    let source = "\
set x to 1
repeat while x equals 1
  say \"loop\"
end repeat";
    let program = parse_source(source).unwrap();
    let terminal = MockTerminal::new();
    let mut interpreter = interpreter_with(&terminal, Settings::default().with_max_loop_iterations(10));

    let err = interpreter.execute(&program).unwrap_err();
    assert_eq!(err, RuntimeError::RunawayLoop { line: 2 });
    assert!(err.to_string().contains("running forever"));
    assert_eq!(terminal.output().len(), 10);
}

#[test]
fn test_runtime_errors_stop_the_program() {
    let source = "\
say \"before\"
say 1 / 0
say \"after\"";
    let (status, output) = run_source(source);
    assert_eq!(status, 1);
    assert_eq!(output[0], "before");
    assert_eq!(output.len(), 2);
    assert!(output[1].starts_with("Oops! On line 2,"), "got {:?}", output);
}

#[test]
fn test_syntax_errors_run_nothing() {
    let source = "\
say \"hello\"
repeat 3 times
  say \"unclosed\"";
    let (status, output) = run_source(source);
    assert_eq!(status, 1);
    assert_eq!(output.len(), 1, "got {:?}", output);
    assert!(output[0].contains("end repeat"), "got {:?}", output);
}

#[test]
fn test_unknown_statement_suggests_a_command() {
    let (status, output) = run_source("sya \"hi\"");
    assert_eq!(status, 1);
    assert!(output[0].contains("sya"), "got {:?}", output);
}

#[test]
fn test_check_only_does_not_execute() {
    let terminal = MockTerminal::new();
    let mut interpreter = interpreter_with(&terminal, Settings::default());
    let status = runner::execute_source("say \"hi\"", &mut interpreter, true);
    assert_eq!(status, 0);
    assert!(terminal.output().is_empty());
}

#[test]
fn test_web_and_window_builtins_are_available() {
    let expected = [
        "random",
        "flask_app",
        "flask_get",
        "flask_post",
        "flask_run",
        "flask_test_request",
        "flask_html",
        "flask_fetch",
        "flask_fetch_json",
        "create_web_app",
        "when_someone_visits",
        "when_someone_posts",
        "start_web_server",
        "test_web_request",
        "make_html_page",
        "fetch_from_api",
        "fetch_json_from_api",
        "open_window",
        "close_window",
        "window_is_open",
        "window_open",
        "poll_window",
        "present",
        "clear_screen",
        "draw_pixel",
        "draw_rect",
        "draw_text",
        "key_down",
        "key_pressed",
        "set_window_title",
    ];
    for name in expected {
        assert!(Builtin::lookup(name).is_some(), "missing builtin {}", name);
    }
}

#[test]
fn test_window_drawing_headless() {
    let source = r#"
call open_window with 32, 16, "Game"
call clear_screen with "blue"
call draw_rect with 1, 1, 4, 4, "red"
call draw_text with 2, 2, "Score"
set showing to call window_is_open
say showing
call poll_window
call present
call close_window
say window_is_open()
"#;
    let (status, output) = run_source(source);
    assert_eq!(status, 0, "output: {:?}", output);
    assert_eq!(output, vec!["true", "false"]);
}

#[test]
fn test_nested_loops_share_one_budget() {
    let source = "\
repeat 3 times
  say \"outer\"
  repeat 4 times
    say \"inner\"
  end repeat
end repeat";
    let program = parse_source(source).unwrap();
    let terminal = MockTerminal::new();
    let mut interpreter = interpreter_with(&terminal, Settings::default().with_max_loop_iterations(8));

    // outer, 4 inner, outer, then the budget runs out on the third inner pass
    let err = interpreter.execute(&program).unwrap_err();
    assert_eq!(err, RuntimeError::RunawayLoop { line: 3 });
    let output = terminal.output();
    assert_eq!(output.len(), 8);
    assert_eq!(output.iter().filter(|line| *line == "outer").count(), 2);
    assert_eq!(output.last().map(String::as_str), Some("inner"));
}

#[test]
fn test_list_that_contains_itself() {
    let source = "\
create list a
add a to a
say a
create list b
add b to b
say a == b
say len(a)";
    let (status, output) = run_source(source);
    assert_eq!(status, 0, "output: {:?}", output);
    assert_eq!(output, vec!["[[...]]", "true", "1"]);
}

#[test]
fn test_integer_edges_in_division_and_repeat() {
    let source = "\
set m to -9223372036854775807 - 1
say m / -1
say m % -1
say \"ab\" * 9223372036854775807";
    let (status, output) = run_source(source);
    assert_eq!(status, 1);
    assert_eq!(output[..2], ["9.223372036854776e+18", "0"]);
    assert!(output[2].starts_with("Oops! On line 4,"), "got {:?}", output);
    assert!(output[2].contains("too big"), "got {:?}", output);
}

#[test]
fn test_huge_window_is_refused() {
    let (status, output) = run_source("call open_window with 4294967296, 4294967296");
    assert_eq!(status, 1);
    assert!(output[0].starts_with("Oops! On line 1,"), "got {:?}", output);
    assert!(output[0].contains("too big"), "got {:?}", output);
}

#[test]
fn test_stop_inside_function_ends_the_calling_loop() {
    let source = r#"
define halt
  stop repeat
end define
repeat 5 times
  say "tick"
  call halt
  say "unreachable"
end repeat
say "after"
"#;
    let (status, output) = run_source(source);
    assert_eq!(status, 0, "output: {:?}", output);
    assert_eq!(output, vec!["tick", "after"]);
}
