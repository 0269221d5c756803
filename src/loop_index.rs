//! Bracket matching, computed once before execution.

use crate::error::{ExecError, UnmatchedBracketKind};
use crate::program::{Op, Program};

/// Bidirectional map between each `[` and its matching `]`.
///
/// `partner(i)` is `Some` exactly for the bracket positions of the program the
/// map was built from, and `partner(partner(i)) == i`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopMap {
    jumps: Vec<Option<usize>>,
    pairs: usize,
}

impl LoopMap {
    /// Scan `program` once, matching brackets with a stack of open positions.
    pub fn build(program: &Program) -> Result<Self, ExecError> {
        let mut jumps: Vec<Option<usize>> = vec![None; program.len()];
        let mut stack: Vec<usize> = Vec::new();
        let mut pairs = 0;

        for (i, op) in program.ops().iter().enumerate() {
            match op {
                Op::LoopStart => stack.push(i),
                Op::LoopEnd => {
                    let Some(open_index) = stack.pop() else {
                        return Err(ExecError::UnmatchedBracket {
                            kind: UnmatchedBracketKind::Close,
                            positions: vec![i],
                        });
                    };
                    jumps[open_index] = Some(i);
                    jumps[i] = Some(open_index);
                    pairs += 1;
                }
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(ExecError::UnmatchedBracket {
                kind: UnmatchedBracketKind::Open,
                positions: stack,
            });
        }

        Ok(Self { jumps, pairs })
    }

    /// The matching bracket of the bracket at `index`.
    pub fn partner(&self, index: usize) -> Option<usize> {
        self.jumps.get(index).copied().flatten()
    }

    /// Number of matched `[`/`]` pairs.
    pub fn loop_count(&self) -> usize {
        self.pairs
    }

    /// Iterate `(open, close)` pairs in order of their opening bracket.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.jumps
            .iter()
            .enumerate()
            .filter_map(|(i, j)| j.filter(|&j| j > i).map(|j| (i, j)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(src: &str) -> Result<LoopMap, ExecError> {
        LoopMap::build(&Program::from_source(src))
    }

    #[test]
    fn nested_loops_match_inside_out() {
        let map = build("+[>[-]<]").expect("balanced");
        assert_eq!(map.partner(1), Some(7));
        assert_eq!(map.partner(7), Some(1));
        assert_eq!(map.partner(3), Some(5));
        assert_eq!(map.partner(5), Some(3));
        assert_eq!(map.partner(0), None);
        assert_eq!(map.loop_count(), 2);
        assert_eq!(map.pairs().collect::<Vec<_>>(), vec![(1, 7), (3, 5)]);
    }

    #[test]
    fn partner_is_an_involution() {
        let program = Program::from_source("[[][[]]]+[-[>]<]");
        let map = LoopMap::build(&program).expect("balanced");
        for (i, op) in program.ops().iter().enumerate() {
            if matches!(op, Op::LoopStart | Op::LoopEnd) {
                let j = map.partner(i).expect("every bracket has a partner");
                assert_eq!(map.partner(j), Some(i));
            }
        }
    }

    #[test]
    fn stray_close_reports_its_position() {
        let err = build("+[]]").unwrap_err();
        assert!(matches!(
            err,
            ExecError::UnmatchedBracket { kind: UnmatchedBracketKind::Close, ref positions } if positions == &vec![3]
        ));
    }

    #[test]
    fn dangling_opens_report_every_position() {
        let err = build("[+[[-]").unwrap_err();
        assert!(matches!(
            err,
            ExecError::UnmatchedBracket { kind: UnmatchedBracketKind::Open, ref positions } if positions == &vec![0, 2]
        ));
    }

    #[test]
    fn close_before_open_is_unmatched() {
        let err = build("][").unwrap_err();
        assert!(matches!(
            err,
            ExecError::UnmatchedBracket { kind: UnmatchedBracketKind::Close, ref positions } if positions == &vec![0]
        ));
    }

    #[test]
    fn empty_program_has_no_loops() {
        let map = build("").expect("empty is balanced");
        assert_eq!(map.loop_count(), 0);
        assert_eq!(map.partner(0), None);
    }
}
