use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

use clap::Args;

use crate::cli_util::{TraceTable, print_exec_error, print_notice};
use crate::commands::{SourceError, env_u64, load_source};
use crate::config::{self, DEFAULT_STEP_WARNING_THRESHOLD, ExecConfig};
use crate::error::ExecError;
use crate::interpreter::{ExecutionResult, Interpreter};
use crate::io::LineInput;
use crate::program::Program;
use crate::tape::TapeConfig;

/// How long to wait for the interpreter to notice a timeout cancellation.
const CANCEL_GRACE: Duration = Duration::from_millis(250);

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct RunArgs {
    /// Read Brainfuck code from PATH (.bf or .b) instead of positional "<code>"
    #[arg(short = 'f', long = "file")]
    pub file: Option<String>,

    /// Number of tape cells, or `unbounded` (default: unbounded in both directions)
    #[arg(long = "tape-size", value_name = "CELLS", value_parser = parse_tape_size)]
    pub tape_size: Option<TapeSize>,

    /// Wrap the pointer at the tape edges (requires --tape-size)
    #[arg(long = "wrap", overrides_with = "no_wrap")]
    pub wrap: bool,

    /// Fail at the tape edges even if the settings file enables wrapping
    #[arg(long = "no-wrap", overrides_with = "wrap")]
    pub no_wrap: bool,

    /// Print a step-by-step table to stderr while executing
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Warn once after N steps without halting (0 disables)
    #[arg(long = "step-warning", value_name = "N")]
    pub step_warning: Option<u64>,

    /// Maximum interpreter steps before abort (fallback BF_MAX_STEPS; default unlimited)
    #[arg(long = "max-steps", value_name = "N")]
    pub max_steps: Option<u64>,

    /// Wall-clock timeout in milliseconds (fallback BF_TIMEOUT_MS; default none)
    #[arg(long = "timeout", value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// `,` reads a line and keeps only its first character
    #[arg(long = "line-input")]
    pub line_input: bool,

    /// Concatenated Brainfuck code parts (put parts starting with `-` after `--`)
    #[arg(value_name = "code")]
    pub code: Vec<String>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

/// Value of `--tape-size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapeSize {
    Cells(usize),
    Unbounded,
}

fn parse_tape_size(s: &str) -> Result<TapeSize, String> {
    if s.eq_ignore_ascii_case("unbounded") {
        return Ok(TapeSize::Unbounded);
    }
    s.parse::<usize>()
        .map(TapeSize::Cells)
        .map_err(|e| format!("expected a cell count or `unbounded`: {e}"))
}

impl RunArgs {
    /// Layer flags over environment, settings file and defaults.
    fn exec_config(&self, settings: &config::Settings) -> ExecConfig {
        let size = match self.tape_size {
            Some(TapeSize::Cells(n)) => Some(n),
            Some(TapeSize::Unbounded) => None,
            None => settings.tape_size.flatten(),
        };
        let wrap = if self.wrap || self.no_wrap {
            self.wrap
        } else {
            settings.tape_wrap.unwrap_or(false)
        };
        let threshold = self
            .step_warning
            .or(settings.step_warning_threshold)
            .unwrap_or(DEFAULT_STEP_WARNING_THRESHOLD);

        ExecConfig {
            tape: TapeConfig { size, wrap },
            debug: self.debug || settings.debug.unwrap_or(false),
            step_warning_threshold: Some(threshold).filter(|&n| n > 0),
            max_steps: self
                .max_steps
                .or_else(|| env_u64("BF_MAX_STEPS"))
                .or(settings.max_steps),
        }
    }

    fn timeout_ms(&self, settings: &config::Settings) -> Option<u64> {
        self.timeout_ms
            .or_else(|| env_u64("BF_TIMEOUT_MS"))
            .or(settings.timeout_ms)
    }
}

pub fn run(program: &str, args: RunArgs) -> i32 {
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

    let settings = config::settings();
    let exec_config = args.exec_config(settings);
    let debug = exec_config.debug;
    let timeout_ms = args.timeout_ms(settings);

    // Error positions index into the filtered program, so show that text.
    let program_text = Program::from_source(&code_str);
    let filtered = program_text.to_string();

    let mut bf = match Interpreter::new(program_text, exec_config) {
        Ok(bf) => bf,
        Err(ExecError::Config(e)) => {
            eprintln!("{program}: {e}");
            let _ = io::stderr().flush();
            return 2;
        }
        Err(err) => {
            print_exec_error(Some(program), &filtered, &err);
            return 1;
        }
    };

    if args.line_input {
        bf.set_input(LineInput::stdin());
    }
    bf.set_output_sink(|byte| {
        let mut out = io::stdout().lock();
        let _ = write!(out, "{}", byte as char);
        let _ = out.flush();
    });
    if debug {
        let mut table = TraceTable::new();
        bf.set_trace_observer(move |snapshot| table.record(snapshot));
    }

    // Ctrl+C cancels the run; a second Ctrl+C exits even if blocked on input.
    let cancel = bf.cancel_token();
    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let cancel = cancel.clone();
        let interrupted = interrupted.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            if interrupted.swap(true, Ordering::Relaxed) {
                let _ = io::stdout().flush();
                let _ = io::stderr().flush();
                std::process::exit(0);
            }
            cancel.cancel();
        }) {
            eprintln!("{program}: failed to set ctrl+c handler: {e}");
            let _ = io::stderr().flush();
            return 1;
        }
    }

    // Execute on a worker thread with cooperative cancellation
    let (tx, rx) = mpsc::channel::<ExecutionResult>();
    thread::spawn(move || {
        let _ = tx.send(bf.run());
    });

    let mut timed_out = false;
    let received = match timeout_ms {
        Some(ms) => match rx.recv_timeout(Duration::from_millis(ms)) {
            Ok(result) => Some(result),
            Err(mpsc::RecvTimeoutError::Timeout) => {
                timed_out = true;
                cancel.cancel();
                rx.recv_timeout(CANCEL_GRACE).ok()
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => None,
        },
        None => rx.recv().ok(),
    };

    let exit_code = match received {
        Some(ExecutionResult::Completed { .. }) => 0,
        Some(ExecutionResult::Cancelled { .. }) | None if timed_out => {
            let ms = timeout_ms.unwrap_or_default();
            print_notice(&format!(
                "Execution aborted: wall-clock timeout exceeded ({ms} ms)"
            ));
            1
        }
        Some(ExecutionResult::Cancelled { output }) => {
            print_notice(&format!(
                "Execution cancelled after {} output byte(s)",
                output.len()
            ));
            0
        }
        Some(ExecutionResult::Failed { error, .. }) => {
            print_exec_error(Some(program), &filtered, &error);
            1
        }
        None => {
            eprintln!("{program}: interpreter thread exited without a result");
            let _ = io::stderr().flush();
            1
        }
    };

    // For readability, ensure output ends with a newline
    println!();
    let _ = io::stdout().flush();
    exit_code
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run [OPTIONS] "<code>"
  {0} run [OPTIONS] --file <PATH>

Options:
  --file,  -f <PATH>   Read Brainfuck code from PATH (.bf or .b) instead of positional "<code>"
  --tape-size <CELLS>  Use a fixed-size tape, or `unbounded` (the default)
  --wrap               Wrap the pointer at the tape edges (requires --tape-size)
  --no-wrap            Fail at the tape edges (overrides the settings file)
  --debug, -d          Print a step-by-step table to stderr while executing
  --step-warning <N>   Warn once after N steps without halting (default 10000000, 0 disables)
  --max-steps <N>      Abort after N steps (fallback BF_MAX_STEPS)
  --timeout <MS>       Abort after MS milliseconds of wall-clock time (fallback BF_TIMEOUT_MS)
  --line-input         `,` reads a whole line and keeps its first character
  --help,  -h          Show this help

Notes:
- Characters outside of Brainfuck's ><+-.,[] are ignored.
- Options may come before or after the code. Code starting with `-` goes
  after `--`, e.g. {0} run -- "-."
- Input (`,`) reads a single byte from stdin; on EOF the current cell is set to 0.
- Ctrl+C stops the program, keeps its output so far and exits with status 0.
- Defaults can be set in the [interpreter] section of $XDG_CONFIG_HOME/bf.toml
  (or the file named by BF_CONFIG).

Examples:
- Load Brainfuck code from a file:
    {0} run --file ./program.bf
- Read bytes from a file as stdin (`,` will consume file input):
    {0} run ",[.,]" < input.txt
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    fn args(extra: &[&str]) -> RunArgs {
        use clap::Parser;

        #[derive(Parser)]
        #[command(disable_help_flag = true)]
        struct Harness {
            #[command(flatten)]
            run: RunArgs,
        }

        let argv = std::iter::once("bf").chain(extra.iter().copied());
        Harness::parse_from(argv).run
    }

    #[test]
    fn flags_override_settings() {
        let settings = Settings {
            tape_size: Some(Some(100)),
            step_warning_threshold: Some(5),
            max_steps: Some(7),
            ..Settings::default()
        };
        let config = args(&["--tape-size", "8", "--wrap", "--max-steps", "9", "+"])
            .exec_config(&settings);
        assert_eq!(config.tape, TapeConfig::bounded(8, true));
        assert_eq!(config.step_warning_threshold, Some(5));
        assert_eq!(config.max_steps, Some(9));
    }

    #[test]
    fn zero_step_warning_disables_the_advisory() {
        let config = args(&["--step-warning", "0", "+"]).exec_config(&Settings::default());
        assert_eq!(config.step_warning_threshold, None);
    }

    #[test]
    fn settings_fill_in_missing_flags() {
        let settings = Settings {
            tape_size: Some(None),
            tape_wrap: Some(false),
            debug: Some(true),
            ..Settings::default()
        };
        let config = args(&["+"]).exec_config(&settings);
        assert_eq!(config.tape, TapeConfig::unbounded());
        assert!(config.debug);
    }

    #[test]
    fn positional_code_is_collected() {
        let parsed = args(&["--debug", "+", "--", "-."]);
        assert!(parsed.debug);
        assert_eq!(parsed.code, vec!["+".to_string(), "-.".to_string()]);
    }

    #[test]
    fn flags_after_code_are_still_options() {
        let parsed = args(&["+.", "--tape-size", "1", "--debug", "--max-steps", "2"]);
        assert_eq!(parsed.code, vec!["+.".to_string()]);
        let config = parsed.exec_config(&Settings::default());
        assert_eq!(config.tape, TapeConfig::bounded(1, false));
        assert!(config.debug);
        assert_eq!(config.max_steps, Some(2));
    }

    #[test]
    fn flags_can_undo_settings_file_tape() {
        let settings = Settings {
            tape_size: Some(Some(16)),
            tape_wrap: Some(true),
            ..Settings::default()
        };
        let config = args(&["--tape-size", "unbounded", "--no-wrap", "+"]).exec_config(&settings);
        assert_eq!(config.tape, TapeConfig::unbounded());

        let config = args(&["--no-wrap", "+"]).exec_config(&settings);
        assert_eq!(config.tape, TapeConfig::bounded(16, false));

        let config = args(&["--no-wrap", "--wrap", "+"]).exec_config(&settings);
        assert!(config.tape.wrap);
    }

    #[test]
    fn tape_size_values() {
        assert_eq!(parse_tape_size("30000"), Ok(TapeSize::Cells(30_000)));
        assert_eq!(parse_tape_size("Unbounded"), Ok(TapeSize::Unbounded));
        assert!(parse_tape_size("-1").is_err());
        assert!(parse_tape_size("lots").is_err());
    }
}
