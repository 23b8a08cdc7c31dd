use crate::action::{Action, Side};
use crate::error::OracleError;

#[derive(Clone, Debug)]
pub struct Outcome<S> {
    pub probability: f64,
    pub state: S,
}

impl<S> Outcome<S> {
    pub fn certain(state: S) -> Self {
        Outcome {
            probability: 1.0,
            state,
        }
    }
}

/// Game rules as seen by the search.
///
/// States are treated as immutable: `apply` must return fresh descendants and
/// never touch its input. Scores are zero-sum from the requested perspective.
pub trait Oracle: Sync {
    type State: Clone + Send + Sync;

    /// Legal actions for `side` in a stable order. Empty once the side can no
    /// longer act.
    fn legal_actions(&self, state: &Self::State, side: Side) -> Vec<Action>;

    /// Resolve one turn. Probabilities of the returned outcomes sum to 1.
    fn apply(
        &self,
        state: &Self::State,
        bot: &Action,
        opponent: &Action,
    ) -> Result<Vec<Outcome<Self::State>>, OracleError>;

    /// Leaf evaluation, higher is better for `perspective`.
    fn score(&self, state: &Self::State, perspective: Side) -> f64;

    fn winner(&self, _state: &Self::State) -> Option<Side> {
        None
    }
}
