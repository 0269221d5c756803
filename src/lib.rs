//! A Brainfuck execution engine.
//!
//! Programs are filtered down to the eight commands `><+-.,[]`, their loops
//! are matched once up front, and an [`Interpreter`] steps through them on a
//! byte tape with a single pointer.
//!
//! Features and behaviors:
//! - Cells are bytes; `+` and `-` wrap modulo 256.
//! - The tape is unbounded in both directions by default. A fixed size can be
//!   configured, with the pointer either wrapping at the edges or failing.
//! - Input `,` reads one character; on EOF the current cell is set to 0.
//! - Output `.` is buffered and optionally streamed to a sink.
//! - Unmatched brackets are reported before anything runs.
//! - Runs can be cancelled from another thread and keep their partial output.
//!
//! Quick start:
//!
//! ```
//! use bf_engine::{ExecConfig, Interpreter, NoInput};
//!
//! let code = "++++++++[>++++++++<-]>+.";
//! let mut bf = Interpreter::from_source(code, ExecConfig::default()).expect("balanced program");
//! bf.set_input(NoInput);
//! let result = bf.run();
//! assert!(result.is_completed());
//! assert_eq!(result.output_text(), "A");
//! ```

pub mod cli_util;
pub mod commands;
pub mod config;
pub mod error;
pub mod interpreter;
pub mod io;
pub mod logging;
pub mod loop_index;
pub mod program;
pub mod tape;
mod theme;

pub use config::{ConfigError, ExecConfig, Settings};
pub use error::{Bound, ExecError, UnmatchedBracketKind};
pub use interpreter::{
    CancelToken, ExecState, ExecutionResult, Interpreter, Snapshot, execute, render_output,
};
pub use io::{ByteInput, InputSource, LineInput, NoInput};
pub use loop_index::LoopMap;
pub use program::{Op, Program, filter_source};
pub use tape::{Tape, TapeConfig};
