use crate::action::{Action, BranchTag, Side};
use crate::aggregate::merge;
use crate::builder::build_matrix;
use crate::error::SearchError;
use crate::matrix::PayoffMatrix;
use crate::oracle::Oracle;
use crate::punish::{iterate, MatrixSource, PunishLine};
use crate::select::{pick_opponent_safest, pick_safest, Decision};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Turns searched past the immediate one for the bot's own passes.
    /// 0 scores each pair by its immediate result only.
    pub depth: usize,
    pub reply_depth: usize,
    pub prune: bool,
    pub win_bonus: f64,
    pub parallel: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: 1,
            reply_depth: 1,
            prune: true,
            win_bonus: 1.0,
            parallel: true,
        }
    }
}

impl SearchConfig {
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_reply_depth(mut self, depth: usize) -> Self {
        self.reply_depth = depth;
        self
    }

    pub fn with_prune(mut self, prune: bool) -> Self {
        self.prune = prune;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Builds one matrix per candidate state and merges them.
///
/// Rows are the `perspective` side's actions; for the bot these are the
/// actions legal in every candidate state. Columns are the other side's
/// actions in each state, or just `fixed_reply` where it is legal. Root rows
/// are only pruned when there is a single candidate state: a row beaten in
/// one state may still be safest across all of them.
pub fn search_matrix<O: Oracle>(
    oracle: &O,
    branches: &[O::State],
    perspective: Side,
    fixed_reply: Option<&Action>,
    depth: usize,
    config: &SearchConfig,
) -> Result<PayoffMatrix, SearchError> {
    if branches.is_empty() {
        return Err(SearchError::NoBranches);
    }
    let shared_rows = match perspective {
        Side::Bot => Some(shared_actions(oracle, branches, Side::Bot)),
        Side::Opponent => None,
    };
    let prune = config.prune && branches.len() == 1;

    let build_branch = |(idx, state): (usize, &O::State)| -> Result<(BranchTag, PayoffMatrix), SearchError> {
        let rows = match &shared_rows {
            Some(rows) => rows.clone(),
            None => oracle.legal_actions(state, perspective),
        };
        let mut columns = oracle.legal_actions(state, perspective.opponent());
        if let Some(fixed) = fixed_reply {
            if columns.contains(fixed) {
                columns = vec![fixed.clone()];
            } else {
                log::debug!("{fixed} not legal in branch {idx}; keeping all {} replies", columns.len());
            }
        }
        let matrix = build_matrix(oracle, state, &rows, &columns, depth, perspective, config, prune)?;
        Ok((BranchTag(idx as u32), matrix))
    };

    let built: Vec<Result<(BranchTag, PayoffMatrix), SearchError>> = if config.parallel && branches.len() > 1 {
        branches.par_iter().enumerate().map(build_branch).collect()
    } else {
        branches.iter().enumerate().map(build_branch).collect()
    };
    let sources = built.into_iter().collect::<Result<Vec<_>, _>>()?;
    merge(sources)
}

fn shared_actions<O: Oracle>(oracle: &O, branches: &[O::State], side: Side) -> Vec<Action> {
    let mut actions = oracle.legal_actions(&branches[0], side);
    for state in &branches[1..] {
        let legal = oracle.legal_actions(state, side);
        actions.retain(|action| legal.contains(action));
    }
    actions
}

pub fn safest_action<O: Oracle>(
    oracle: &O,
    branches: &[O::State],
    config: &SearchConfig,
) -> Result<Decision, SearchError> {
    let matrix = search_matrix(oracle, branches, Side::Bot, None, config.depth, config)?;
    let decision = pick_safest(&matrix)?;
    log::debug!("safest: {} ({:.4})", decision.action(), decision.payoff);
    Ok(decision)
}

pub fn opponent_safest_action<O: Oracle>(
    oracle: &O,
    branches: &[O::State],
    fixed_bot: Option<&Action>,
    config: &SearchConfig,
) -> Result<Decision, SearchError> {
    let matrix = search_matrix(
        oracle,
        branches,
        Side::Opponent,
        fixed_bot,
        config.reply_depth,
        config,
    )?;
    let decision = pick_opponent_safest(&matrix)?;
    log::debug!("opponent safest: {} ({:.4})", decision.action(), decision.payoff);
    Ok(decision)
}

pub fn punishing_action<O: Oracle>(
    oracle: &O,
    branches: &[O::State],
    config: &SearchConfig,
) -> Result<PunishLine, SearchError> {
    iterate(&SearchSource {
        oracle,
        branches,
        config,
    })
}

pub struct SearchSource<'a, O: Oracle> {
    pub oracle: &'a O,
    pub branches: &'a [O::State],
    pub config: &'a SearchConfig,
}

impl<O: Oracle> MatrixSource for SearchSource<'_, O> {
    fn bot_matrix(&self, reply: Option<&Action>) -> Result<PayoffMatrix, SearchError> {
        search_matrix(
            self.oracle,
            self.branches,
            Side::Bot,
            reply,
            self.config.depth,
            self.config,
        )
    }

    fn opponent_matrix(&self, fixed_bot: &Action) -> Result<PayoffMatrix, SearchError> {
        search_matrix(
            self.oracle,
            self.branches,
            Side::Opponent,
            Some(fixed_bot),
            self.config.reply_depth,
            self.config,
        )
    }
}
