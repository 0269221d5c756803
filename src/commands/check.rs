use std::io::{self, Write};

use clap::Args;

use crate::cli_util::print_exec_error;
use crate::commands::{SourceError, load_source};
use crate::loop_index::LoopMap;
use crate::program::Program;

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct CheckArgs {
    /// Read Brainfuck code from PATH (.bf or .b) instead of positional "<code>"
    #[arg(short = 'f', long = "file")]
    pub file: Option<String>,

    /// List every matched loop as "open close" instruction indices
    #[arg(long = "pairs")]
    pub pairs: bool,

    /// Concatenated Brainfuck code parts (put parts starting with `-` after `--`)
    #[arg(value_name = "code")]
    pub code: Vec<String>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

pub fn run(program: &str, args: CheckArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let code_str = match load_source(args.file.as_deref(), &args.code) {
        Ok(code) => code,
        Err(SourceError::Config(e)) => {
            eprintln!("{program}: {e}");
            usage_and_exit(program, 2);
        }
        Err(e @ SourceError::Read { .. }) => {
            eprintln!("{program}: {e}");
            let _ = io::stderr().flush();
            return 1;
        }
    };

    let program_text = Program::from_source(&code_str);
    let loops = match LoopMap::build(&program_text) {
        Ok(loops) => loops,
        Err(err) => {
            print_exec_error(Some(program), &program_text.to_string(), &err);
            return 1;
        }
    };

    println!(
        "ok: {} instructions, {} loops",
        program_text.len(),
        loops.loop_count()
    );
    if args.pairs {
        for (open, close) in loops.pairs() {
            println!("{open} {close}");
        }
    }
    let _ = io::stdout().flush();
    0
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} check [--pairs] "<code>"
  {0} check [--pairs] --file <PATH>

Options:
  --file,  -f <PATH>  Read Brainfuck code from PATH (.bf or .b) instead of positional "<code>"
  --pairs             List every matched loop as "open close" instruction indices
  --help,  -h         Show this help

Description:
  Filters the program and matches its brackets without running it.
  Instruction indices count only Brainfuck characters.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
