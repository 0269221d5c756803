use bf_engine::commands::{check, run};
use bf_engine::logging::init_logging;
use clap::{Parser, Subcommand};
use std::env;
use std::io::{self, Write};

fn print_top_usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run   [OPTIONS] "<code>"       # Run Brainfuck code (args are concatenated)
  {0} run   [OPTIONS] --file <PATH>  # Run Brainfuck code loaded from a .bf/.b file
  {0} check [--pairs] "<code>"       # Match brackets without running

Run "{0} <subcommand> --help" for more info.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}

#[derive(Parser, Debug)]
#[command(name = "bf", disable_help_flag = true, disable_help_subcommand = true)]
struct Cli {
    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    help: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    Run(run::RunArgs),
    Check(check::CheckArgs),
}

fn main() {
    init_logging();

    // We still pull the program name for help rendering consistency
    let program = env::args().next().unwrap_or_else(|| String::from("bf"));

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        print_top_usage_and_exit(&program, if cli.help { 0 } else { 2 });
    };
    if cli.help {
        print_top_usage_and_exit(&program, 0);
    }

    let code = match command {
        Command::Run(args) => run::run(&program, args),
        Command::Check(args) => check::run(&program, args),
    };

    std::process::exit(code);
}
