use std::io::{self, Write};

use crate::error::ExecError;
use crate::interpreter::{Snapshot, render_output};
use crate::theme::Palette;

/// Pretty-print a structured [`ExecError`] with caret positioning.
/// If `program` is `Some("bf")`, prefix messages with "bf: ...".
pub fn print_exec_error(program: Option<&str>, code: &str, err: &ExecError) {
    let palette = Palette::for_stderr();
    let prefix_program = |msg: &str| {
        let msg = palette.error.paint(msg).to_string();
        if let Some(p) = program {
            format!("{p}: {msg}")
        } else {
            msg
        }
    };

    match err {
        ExecError::UnmatchedBracket { kind, positions } => {
            let msg = prefix_program(&format!("Parse error: unmatched bracket {kind}"));
            for &pos in positions {
                print_error_with_context(&msg, code, pos);
            }
        }
        ExecError::PointerOutOfBounds { ip, address, bound } => {
            let msg = prefix_program(&format!(
                "Runtime error: pointer out of bounds (address={address}, bound={bound})"
            ));
            print_error_with_context(&msg, code, *ip);
        }
        ExecError::Io { ip, source } => {
            let msg = prefix_program(&format!("I/O error: {source}"));
            print_error_with_context(&msg, code, *ip);
        }
        ExecError::StepLimitExceeded { .. } | ExecError::Config(_) => {
            eprintln!("{}", prefix_program(&err.to_string()));
            let _ = io::stderr().flush();
        }
    }
}

/// Print a concise error with instruction index and a caret context window,
/// working with UTF-8 by slicing using char indices.
pub fn print_error_with_context(prefix: &str, code: &str, pos: usize) {
    let palette = Palette::for_stderr();
    eprintln!("{prefix} at instruction {pos}");

    // Show a short window around the position for context
    const WINDOW_CHARS: usize = 32;

    let total_chars = code.chars().count();
    let start_char = pos.saturating_sub(WINDOW_CHARS);
    let end_char = (pos + WINDOW_CHARS + 1).min(total_chars);

    let start_byte = char_to_byte_index(code, start_char);
    let end_byte = char_to_byte_index(code, end_char);
    let slice = &code[start_byte..end_byte];

    eprintln!("  {}", slice);

    let caret_offset_chars = pos.saturating_sub(start_char);
    let underline = format!("{}^", " ".repeat(caret_offset_chars));
    eprintln!("  {}", palette.caret.paint(underline));
    let _ = io::stderr().flush();
}

/// Convert a char index into a byte index in the given UTF-8 string.
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(byte_idx, _)| byte_idx)
        .unwrap_or(s.len())
}

/// Print a highlighted one-line notice to stderr.
pub fn print_notice(msg: &str) {
    let palette = Palette::for_stderr();
    eprintln!("{}", palette.notice.paint(msg));
    let _ = io::stderr().flush();
}

/// Writes the debug step table to stderr.
pub struct TraceTable {
    palette: Palette,
    header_written: bool,
}

impl TraceTable {
    /// Trailing output characters shown per row.
    const OUTPUT_TAIL: usize = 16;

    pub fn new() -> Self {
        Self {
            palette: Palette::for_stderr(),
            header_written: false,
        }
    }

    pub fn format_row(snapshot: &Snapshot<'_>) -> String {
        let skip = snapshot.output.len().saturating_sub(Self::OUTPUT_TAIL);
        let tail = render_output(&snapshot.output[skip..]);
        format!(
            "{:<4} | {:<4} | {:<4} | {:<4} |  {}  | {:?}",
            snapshot.step, snapshot.pc, snapshot.pointer, snapshot.cell, snapshot.op, tail
        )
    }

    pub fn record(&mut self, snapshot: &Snapshot<'_>) {
        let mut err = io::stderr().lock();
        if !self.header_written {
            self.header_written = true;
            let _ = writeln!(
                err,
                "{}",
                self.palette.header.paint("STEP | IP   | PTR  | CELL | OP | OUTPUT")
            );
            let _ = writeln!(
                err,
                "{}",
                self.palette.dim.paint("-----+------+------+------+----+----------------")
            );
        }
        let _ = writeln!(err, "{}", Self::format_row(snapshot));
    }
}

impl Default for TraceTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::Op;

    #[test]
    fn char_index_maps_to_byte_index() {
        assert_eq!(char_to_byte_index("a\u{e9}b", 0), 0);
        assert_eq!(char_to_byte_index("a\u{e9}b", 2), 3);
        assert_eq!(char_to_byte_index("ab", 5), 2);
    }

    #[test]
    fn trace_row_shows_output_tail() {
        let output = b"ABCDEFGHIJKLMNOPQR".to_vec();
        let snapshot = Snapshot {
            step: 7,
            pc: 3,
            op: Op::Output,
            pointer: -1,
            cell: 82,
            output: &output,
        };
        let row = TraceTable::format_row(&snapshot);
        assert!(row.starts_with("7    | 3    | -1   | 82   |  .  |"));
        assert!(row.ends_with("\"CDEFGHIJKLMNOPQR\""));
    }
}
