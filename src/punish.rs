use crate::action::Action;
use crate::error::SearchError;
use crate::matrix::PayoffMatrix;
use crate::select::{pick_opponent_safest, pick_safest, Decision};
use serde::Serialize;

/// Supplies the matrices the punish iteration selects from.
pub trait MatrixSource {
    /// Bot-perspective matrix; restricted to the single column `reply` when
    /// given.
    fn bot_matrix(&self, reply: Option<&Action>) -> Result<PayoffMatrix, SearchError>;

    fn opponent_matrix(&self, fixed_bot: &Action) -> Result<PayoffMatrix, SearchError>;
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PunishLine {
    pub safest: Decision,
    pub predicted_reply: Decision,
    pub punish: Decision,
}

impl PunishLine {
    pub fn action(&self) -> &Action {
        self.punish.action()
    }
}

/// Safest action, the opponent's safest answer to it, then the bot's best
/// answer to that prediction. One best-response step, not an equilibrium.
pub fn iterate<S: MatrixSource + ?Sized>(source: &S) -> Result<PunishLine, SearchError> {
    let safest = pick_safest(&source.bot_matrix(None)?)?;
    log::debug!("safest: {} ({:.4})", safest.action(), safest.payoff);

    let predicted_reply = pick_opponent_safest(&source.opponent_matrix(safest.action())?)?;
    log::debug!(
        "opponent safest vs {}: {} ({:.4})",
        safest.action(),
        predicted_reply.action(),
        predicted_reply.payoff
    );

    let punish = pick_safest(&source.bot_matrix(Some(predicted_reply.action()))?)?;
    log::debug!(
        "punish {}: {} ({:.4})",
        predicted_reply.action(),
        punish.action(),
        punish.payoff
    );

    Ok(PunishLine {
        safest,
        predicted_reply,
        punish,
    })
}
