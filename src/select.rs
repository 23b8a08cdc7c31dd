use crate::action::{Action, BranchTag, JointKey, Side};
use crate::error::SearchError;
use crate::matrix::PayoffMatrix;
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Decision {
    pub key: JointKey,
    pub payoff: f64,
}

impl Decision {
    pub fn action(&self) -> &Action {
        &self.key.mine
    }

    pub fn worst_reply(&self) -> &Action {
        &self.key.theirs
    }
}

/// Maximin over the rows of `matrix`.
///
/// Ties resolve to the earliest row, and within a row to the earliest column,
/// so repeated calls on the same matrix agree.
pub fn select(matrix: &PayoffMatrix, perspective: Side) -> Result<Decision, SearchError> {
    if matrix.perspective() != perspective {
        return Err(SearchError::PerspectiveMismatch {
            expected: perspective,
            found: matrix.perspective(),
        });
    }
    if matrix.rows().is_empty() {
        return Err(SearchError::EmptyMatrix);
    }

    let mut best: Option<Decision> = None;
    for mine in matrix.rows() {
        let cells = matrix.row_cells(mine);
        if cells.is_empty() {
            return Err(SearchError::IncompleteRow {
                action: mine.clone(),
                missing: matrix.reply_count(),
                expected: matrix.reply_count(),
            });
        }
        // Pruned rows are partial by construction; their partial minimum is
        // already below a complete row's worst case. Bot rows span every
        // column, opponent rows only the branches they are legal in.
        if !matrix.is_pruned(mine) {
            let expected = match perspective {
                Side::Bot => matrix.reply_count(),
                Side::Opponent => {
                    let branches: BTreeSet<BranchTag> =
                        cells.iter().map(|(reply, _)| reply.branch).collect();
                    branches
                        .iter()
                        .map(|branch| matrix.columns_in_branch(*branch))
                        .sum()
                }
            };
            if cells.len() < expected {
                return Err(SearchError::IncompleteRow {
                    action: mine.clone(),
                    missing: expected - cells.len(),
                    expected,
                });
            }
        }

        let mut worst = &cells[0];
        for cell in &cells[1..] {
            if cell.1 < worst.1 {
                worst = cell;
            }
        }
        let improves = match &best {
            None => true,
            Some(current) => worst.1 > current.payoff,
        };
        if improves {
            best = Some(Decision {
                key: JointKey::in_branch(mine.clone(), worst.0.action.clone(), worst.0.branch),
                payoff: worst.1,
            });
        }
    }
    best.ok_or(SearchError::EmptyMatrix)
}

pub fn pick_safest(matrix: &PayoffMatrix) -> Result<Decision, SearchError> {
    select(matrix, Side::Bot)
}

pub fn pick_opponent_safest(matrix: &PayoffMatrix) -> Result<Decision, SearchError> {
    select(matrix, Side::Opponent)
}
