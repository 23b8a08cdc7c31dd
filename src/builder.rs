use crate::action::{Action, BranchTag, JointKey, Side};
use crate::error::{OracleError, SearchError};
use crate::matrix::{PayoffMatrix, FAILED_PAIR_PAYOFF};
use crate::oracle::{Oracle, Outcome};
use crate::prune::RowPruner;
use crate::search::SearchConfig;
use crate::select::select;

/// Scores every pair of `mine` x `theirs` from `perspective`, looking `depth`
/// turns past the immediate one.
///
/// Rows may be left partial (and flagged) when `config.prune` is set.
pub fn build<O: Oracle>(
    oracle: &O,
    state: &O::State,
    mine: &[Action],
    theirs: &[Action],
    depth: usize,
    perspective: Side,
    config: &SearchConfig,
) -> Result<PayoffMatrix, SearchError> {
    build_matrix(oracle, state, mine, theirs, depth, perspective, config, config.prune)
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn build_matrix<O: Oracle>(
    oracle: &O,
    state: &O::State,
    mine: &[Action],
    theirs: &[Action],
    depth: usize,
    perspective: Side,
    config: &SearchConfig,
    prune: bool,
) -> Result<PayoffMatrix, SearchError> {
    if mine.is_empty() {
        return Err(SearchError::InvalidActionSet { side: perspective });
    }
    if theirs.is_empty() {
        return Err(SearchError::InvalidActionSet {
            side: perspective.opponent(),
        });
    }

    let mut matrix = PayoffMatrix::new(perspective);
    for action in mine {
        matrix.declare_row(action.clone());
    }
    for reply in theirs {
        matrix.declare_reply(reply.clone(), BranchTag::default());
    }

    let mut pruner = RowPruner::new(prune, theirs.len());
    for action in mine {
        let mut row_worst = f64::INFINITY;
        let mut cut = false;
        let order = pruner.probe_order().to_vec();
        for idx in order {
            let reply = &theirs[idx];
            let key = JointKey::new(action.clone(), reply.clone());
            let payoff = match resolve(oracle, state, action, reply, perspective) {
                Ok(outcomes) => expected_value(oracle, &outcomes, depth, perspective, config)?,
                Err(err) => {
                    log::warn!("oracle failed for {key}: {err}");
                    matrix.record_failure(key.clone(), err);
                    FAILED_PAIR_PAYOFF
                }
            };
            matrix.insert(key, payoff);
            row_worst = row_worst.min(payoff);
            if !pruner.keep(row_worst) {
                log::trace!("pruned {action} after {reply} ({row_worst:.4} < {:.4})", pruner.alpha());
                pruner.cut_by(idx);
                cut = true;
                break;
            }
        }
        if cut {
            matrix.mark_pruned(action);
        } else {
            pruner.finish_row(row_worst);
        }
    }
    Ok(matrix)
}

fn resolve<O: Oracle>(
    oracle: &O,
    state: &O::State,
    mine: &Action,
    theirs: &Action,
    perspective: Side,
) -> Result<Vec<Outcome<O::State>>, OracleError> {
    match perspective {
        Side::Bot => oracle.apply(state, mine, theirs),
        Side::Opponent => oracle.apply(state, theirs, mine),
    }
}

fn expected_value<O: Oracle>(
    oracle: &O,
    outcomes: &[Outcome<O::State>],
    depth: usize,
    perspective: Side,
    config: &SearchConfig,
) -> Result<f64, SearchError> {
    let mut total = 0.0;
    for outcome in outcomes {
        total += outcome.probability * state_value(oracle, &outcome.state, depth, perspective, config)?;
    }
    Ok(total)
}

/// Value of a resulting state: its score at depth 0, otherwise the safest
/// continuation found by searching `depth - 1` further.
pub(crate) fn state_value<O: Oracle>(
    oracle: &O,
    state: &O::State,
    depth: usize,
    perspective: Side,
    config: &SearchConfig,
) -> Result<f64, SearchError> {
    let score = oracle.score(state, perspective);
    if let Some(winner) = oracle.winner(state) {
        // Wins found with more depth left are closer to the root.
        let bonus = config.win_bonus * (depth as f64 + 1.0);
        return Ok(if winner == perspective {
            score + bonus
        } else {
            score - bonus
        });
    }
    if depth == 0 {
        return Ok(score);
    }
    let mine = oracle.legal_actions(state, perspective);
    let theirs = oracle.legal_actions(state, perspective.opponent());
    if mine.is_empty() || theirs.is_empty() {
        return Ok(score);
    }
    let sub = build_matrix(
        oracle,
        state,
        &mine,
        &theirs,
        depth - 1,
        perspective,
        config,
        config.prune,
    )?;
    Ok(select(&sub, perspective)?.payoff)
}
