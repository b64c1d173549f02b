// E++: plain-English scripting language interpreter

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{error::ErrorKind, CommandFactory, Parser};

use epp::interpreter::settings::{DisplayMode, Settings, DEFAULT_MAX_LOOP_ITERATIONS};
use epp::{runner, Interpreter, Repl, VERSION};

/// Run E++ scripts or launch the E++ REPL.
#[derive(Parser)]
#[command(name = "epp", about, disable_version_flag = true)]
struct Cli {
    /// Validate syntax without executing the script
    #[arg(long)]
    check: bool,

    /// Safety limit for total loop iterations before stopping runaway loops
    #[arg(long, env = "EPP_MAX_LOOP_ITERATIONS", default_value_t = DEFAULT_MAX_LOOP_ITERATIONS)]
    max_loop_iterations: usize,

    /// Keep the pixel window in memory instead of drawing it in the terminal
    #[arg(long)]
    headless: bool,

    /// Print host status lines to stderr
    #[arg(long, short)]
    verbose: bool,

    /// Print the version and exit
    #[arg(long, short = 'V')]
    version: bool,

    /// Path to a .epp file; starts the REPL when omitted
    script: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.version {
        println!("E++ {}", VERSION);
        return ExitCode::SUCCESS;
    }
    if cli.max_loop_iterations == 0 {
        Cli::command()
            .error(
                ErrorKind::ValueValidation,
                "--max-loop-iterations must be greater than 0",
            )
            .exit();
    }
    if cli.check && cli.script.is_none() {
        Cli::command()
            .error(
                ErrorKind::MissingRequiredArgument,
                "--check requires a script path",
            )
            .exit();
    }

    let display = if cli.headless {
        DisplayMode::Headless
    } else {
        DisplayMode::Terminal
    };
    let settings = Settings::default()
        .with_max_loop_iterations(cli.max_loop_iterations)
        .with_display(display)
        .with_verbose(cli.verbose);

    if let Some(script) = cli.script {
        let status = runner::run_file(&script, &settings, cli.check);
        return ExitCode::from(status as u8);
    }

    let mut repl = Repl::new(Interpreter::new(settings));
    match repl.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
