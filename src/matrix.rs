use crate::action::{Action, BranchTag, JointKey, Reply, Side};
use crate::error::OracleError;
use anyhow::Context;
use std::collections::{HashMap, HashSet};

/// Payoff assigned to a pair the oracle could not resolve. Finite so that
/// probability-weighted sums stay well defined.
pub const FAILED_PAIR_PAYOFF: f64 = -1.0e6;

#[derive(Clone, Debug, PartialEq)]
pub struct PairFailure {
    pub key: JointKey,
    pub error: OracleError,
}

/// Sparse payoff table keyed by joint decisions, scored from one side's
/// perspective.
///
/// Row and column order is the order in which actions were first seen and is
/// what the selector uses to break ties.
#[derive(Clone, Debug)]
pub struct PayoffMatrix {
    perspective: Side,
    rows: Vec<Action>,
    row_index: HashMap<Action, usize>,
    columns: Vec<Reply>,
    column_index: HashMap<Reply, usize>,
    cells: HashMap<JointKey, f64>,
    pruned: HashSet<Action>,
    failures: Vec<PairFailure>,
}

impl PayoffMatrix {
    pub fn new(perspective: Side) -> Self {
        PayoffMatrix {
            perspective,
            rows: Vec::new(),
            row_index: HashMap::new(),
            columns: Vec::new(),
            column_index: HashMap::new(),
            cells: HashMap::new(),
            pruned: HashSet::new(),
            failures: Vec::new(),
        }
    }

    pub fn perspective(&self) -> Side {
        self.perspective
    }

    pub fn declare_row(&mut self, mine: Action) {
        if !self.row_index.contains_key(&mine) {
            self.row_index.insert(mine.clone(), self.rows.len());
            self.rows.push(mine);
        }
    }

    pub fn declare_reply(&mut self, theirs: Action, branch: BranchTag) {
        let reply = Reply {
            action: theirs,
            branch,
        };
        if !self.column_index.contains_key(&reply) {
            self.column_index.insert(reply.clone(), self.columns.len());
            self.columns.push(reply);
        }
    }

    pub fn insert(&mut self, key: JointKey, payoff: f64) -> Option<f64> {
        self.declare_row(key.mine.clone());
        self.declare_reply(key.theirs.clone(), key.branch);
        self.cells.insert(key, payoff)
    }

    pub fn payoff(&self, key: &JointKey) -> Option<f64> {
        self.cells.get(key).copied()
    }

    pub fn get(&self, mine: &Action, theirs: &Action) -> Option<f64> {
        self.payoff(&JointKey::new(mine.clone(), theirs.clone()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn rows(&self) -> &[Action] {
        &self.rows
    }

    pub fn replies(&self) -> impl Iterator<Item = (&Action, BranchTag)> + '_ {
        self.columns.iter().map(|reply| (&reply.action, reply.branch))
    }

    pub fn reply_count(&self) -> usize {
        self.columns.len()
    }

    pub fn mark_pruned(&mut self, mine: &Action) {
        self.pruned.insert(mine.clone());
    }

    pub fn is_pruned(&self, mine: &Action) -> bool {
        self.pruned.contains(mine)
    }

    pub fn failures(&self) -> &[PairFailure] {
        &self.failures
    }

    pub(crate) fn record_failure(&mut self, key: JointKey, error: OracleError) {
        self.failures.push(PairFailure { key, error });
    }

    pub fn iter(&self) -> impl Iterator<Item = (JointKey, f64)> + '_ {
        self.rows.iter().flat_map(move |mine| {
            self.columns.iter().filter_map(move |reply| {
                let key = JointKey::in_branch(mine.clone(), reply.action.clone(), reply.branch);
                self.cells.get(&key).map(|payoff| (key, *payoff))
            })
        })
    }

    pub(crate) fn row_cells(&self, mine: &Action) -> Vec<(&Reply, f64)> {
        self.columns
            .iter()
            .filter_map(|reply| {
                let key = JointKey::in_branch(mine.clone(), reply.action.clone(), reply.branch);
                self.cells.get(&key).map(|payoff| (reply, *payoff))
            })
            .collect()
    }

    pub(crate) fn columns_in_branch(&self, branch: BranchTag) -> usize {
        self.columns
            .iter()
            .filter(|reply| reply.branch == branch)
            .count()
    }

    pub(crate) fn into_parts(self) -> MatrixParts {
        MatrixParts {
            perspective: self.perspective,
            rows: self.rows,
            columns: self.columns,
            cells: self.cells,
            pruned: self.pruned,
            failures: self.failures,
        }
    }
}

pub(crate) struct MatrixParts {
    pub perspective: Side,
    pub rows: Vec<Action>,
    pub columns: Vec<Reply>,
    pub cells: HashMap<JointKey, f64>,
    pub pruned: HashSet<Action>,
    pub failures: Vec<PairFailure>,
}

pub fn write_csv(matrix: &PayoffMatrix, path: &std::path::Path) -> anyhow::Result<()> {
    let mut out = String::from(match matrix.perspective() {
        Side::Bot => "bot\\opponent",
        Side::Opponent => "opponent\\bot",
    });
    for (theirs, branch) in matrix.replies() {
        out.push(',');
        out.push_str(&format!("{theirs}{branch}"));
    }
    for mine in matrix.rows() {
        out.push('\n');
        out.push_str(&mine.to_string());
        for (theirs, branch) in matrix.replies() {
            out.push(',');
            let key = JointKey::in_branch(mine.clone(), theirs.clone(), branch);
            if let Some(value) = matrix.payoff(&key) {
                out.push_str(&format!("{value:.4}"));
            }
        }
    }
    std::fs::write(path, out)
        .with_context(|| format!("Failed to write matrix to {}", path.display()))?;
    Ok(())
}
