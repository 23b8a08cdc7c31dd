//! Error types for the search core.

use crate::action::{Action, BranchTag, JointKey, Side};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SearchError {
    #[error("{side} has no legal actions to search over")]
    InvalidActionSet { side: Side },

    #[error("payoff matrix has no rows to select from")]
    EmptyMatrix,

    #[error("row {action} is missing {missing} of {expected} replies")]
    IncompleteRow {
        action: Action,
        missing: usize,
        expected: usize,
    },

    #[error("merged key {key} was produced by more than one source entry")]
    BranchKeyCollision { key: JointKey },

    #[error("expected a {expected}-perspective matrix, got {found}")]
    PerspectiveMismatch { expected: Side, found: Side },

    #[error("branch {branch} has pruned rows and cannot be merged with other branches")]
    PrunedSource { branch: BranchTag },

    #[error("no candidate states to search")]
    NoBranches,
}

#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum OracleError {
    #[error("unknown move '{0}'")]
    UnknownMove(String),

    #[error("cannot switch to '{0}'")]
    IllegalSwitch(String),

    #[error("{action} is not legal for the {side}")]
    IllegalAction { side: Side, action: Action },

    #[error("{0}")]
    Other(String),
}
