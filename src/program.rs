//! Command alphabet and filtered program text.
//!
//! Raw source is reduced to the subsequence of recognized commands before it
//! reaches the engine; every other character is a comment. Instruction
//! positions reported anywhere in this crate index into the filtered program.

use std::fmt;

/// One of the eight Brainfuck commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// `>`: move the pointer one cell right.
    Right,
    /// `<`: move the pointer one cell left.
    Left,
    /// `+`: increment the current cell (mod 256).
    Inc,
    /// `-`: decrement the current cell (mod 256).
    Dec,
    /// `.`: append the current cell to the output.
    Output,
    /// `,`: read one character into the current cell.
    Input,
    /// `[`: jump to the matching `]` when the current cell is zero.
    LoopStart,
    /// `]`: jump back to the matching `[` when the current cell is non-zero.
    LoopEnd,
}

impl Op {
    pub fn from_char(c: char) -> Option<Op> {
        match c {
            '>' => Some(Op::Right),
            '<' => Some(Op::Left),
            '+' => Some(Op::Inc),
            '-' => Some(Op::Dec),
            '.' => Some(Op::Output),
            ',' => Some(Op::Input),
            '[' => Some(Op::LoopStart),
            ']' => Some(Op::LoopEnd),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Op::Right => '>',
            Op::Left => '<',
            Op::Inc => '+',
            Op::Dec => '-',
            Op::Output => '.',
            Op::Input => ',',
            Op::LoopStart => '[',
            Op::LoopEnd => ']',
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// An immutable, filtered sequence of commands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    ops: Vec<Op>,
}

impl Program {
    /// Build a program from raw text, discarding every non-command character.
    pub fn from_source(source: &str) -> Self {
        Self {
            ops: source.chars().filter_map(Op::from_char).collect(),
        }
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn get(&self, index: usize) -> Option<Op> {
        self.ops.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl From<Vec<Op>> for Program {
    fn from(ops: Vec<Op>) -> Self {
        Self { ops }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for op in &self.ops {
            write!(f, "{}", op.as_char())?;
        }
        Ok(())
    }
}

/// Keep only Brainfuck instruction characters.
pub fn filter_source(source: &str) -> String {
    Program::from_source(source).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_drops_comments_and_whitespace() {
        let program = Program::from_source("+ hello [ - ] world.\n");
        assert_eq!(program.to_string(), "+[-].");
        assert_eq!(program.len(), 5);
    }

    #[test]
    fn every_command_round_trips_through_char() {
        for c in "><+-.,[]".chars() {
            let op = Op::from_char(c).expect("command character");
            assert_eq!(op.as_char(), c);
        }
        assert_eq!(Op::from_char('a'), None);
    }

    #[test]
    fn empty_source_is_empty_program() {
        assert!(Program::from_source("no commands here").is_empty());
        assert_eq!(filter_source(""), "");
    }
}
