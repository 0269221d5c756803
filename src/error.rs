use std::fmt;

use crate::config::ConfigError;

/// Errors that stop a Brainfuck run.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// Loops were not balanced; a matching `[` or `]` was not found.
    ///
    /// For a stray `]` this holds the single offending position. For dangling
    /// `[` it holds every position still open at the end of the program.
    #[error("Unmatched bracket {kind} at instruction {}", join_positions(.positions))]
    UnmatchedBracket {
        kind: UnmatchedBracketKind,
        positions: Vec<usize>,
    },

    /// The pointer tried to leave a fixed-size tape with wrapping disabled.
    #[error("Pointer out of bounds at instruction {ip} (address={address}, bound={bound})")]
    PointerOutOfBounds { ip: usize, address: isize, bound: Bound },

    /// An underlying I/O error occurred while reading input.
    #[error("I/O error at instruction {ip}: {source}")]
    Io {
        ip: usize,
        #[source]
        source: std::io::Error,
    },

    /// Execution aborted due to step limit.
    #[error("Execution aborted: step limit exceeded ({limit})")]
    StepLimitExceeded { limit: u64 },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ExecError {
    /// The instruction index the error points at, when it has one.
    pub fn position(&self) -> Option<usize> {
        match self {
            ExecError::UnmatchedBracket { positions, .. } => positions.first().copied(),
            ExecError::PointerOutOfBounds { ip, .. } | ExecError::Io { ip, .. } => Some(*ip),
            ExecError::StepLimitExceeded { .. } | ExecError::Config(_) => None,
        }
    }
}

/// Which side of the loop was unmatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmatchedBracketKind {
    Open,
    Close,
}

impl fmt::Display for UnmatchedBracketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmatchedBracketKind::Open => write!(f, "'['"),
            UnmatchedBracketKind::Close => write!(f, "']'"),
        }
    }
}

/// The tape edge a pointer move violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Address 0.
    Low,
    /// The last cell, `size - 1`.
    High(usize),
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Low => write!(f, "0"),
            Bound::High(last) => write!(f, "{last}"),
        }
    }
}

fn join_positions(positions: &[usize]) -> String {
    positions
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmatched_open_lists_every_position() {
        let err = ExecError::UnmatchedBracket {
            kind: UnmatchedBracketKind::Open,
            positions: vec![0, 3],
        };
        assert_eq!(err.to_string(), "Unmatched bracket '[' at instruction 0, 3");
        assert_eq!(err.position(), Some(0));
    }

    #[test]
    fn out_of_bounds_names_the_bound() {
        let err = ExecError::PointerOutOfBounds {
            ip: 2,
            address: 3,
            bound: Bound::High(2),
        };
        assert_eq!(
            err.to_string(),
            "Pointer out of bounds at instruction 2 (address=3, bound=2)"
        );
    }
}
