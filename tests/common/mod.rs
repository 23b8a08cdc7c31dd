#![allow(dead_code)]

use pokemon_battle_search::model::{
    Hazard, Move, MoveCategory, Pokemon, SideState, StatBoosts, Stats, StatusCondition,
};
use pokemon_battle_search::{Action, Oracle, OracleError, Outcome, Side};
use std::collections::HashMap;

pub fn mv(id: &str) -> Action {
    Action::Move(id.to_string())
}

/// State of the fixture game: which candidate world we are in and the pairs
/// played so far.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Line {
    pub world: u32,
    pub plies: Vec<(Action, Action)>,
}

impl Line {
    pub fn world(world: u32) -> Self {
        Line {
            world,
            plies: Vec::new(),
        }
    }
}

type ScoreFn = Box<dyn Fn(&Line) -> f64 + Send + Sync>;

/// Oracle with fixed action sets whose score is an arbitrary function of the
/// line played. Transitions are deterministic.
pub struct TableOracle {
    bot: Vec<Action>,
    opponent: Vec<Action>,
    opponent_by_world: HashMap<u32, Vec<Action>>,
    score: ScoreFn,
    broken: Vec<(Action, Action)>,
}

impl TableOracle {
    pub fn new(
        bot: &[&str],
        opponent: &[&str],
        score: impl Fn(&Line) -> f64 + Send + Sync + 'static,
    ) -> Self {
        TableOracle {
            bot: bot.iter().map(|id| mv(id)).collect(),
            opponent: opponent.iter().map(|id| mv(id)).collect(),
            opponent_by_world: HashMap::new(),
            score: Box::new(score),
            broken: Vec::new(),
        }
    }

    /// Score is the sum over plies of the table value of each pair (missing
    /// pairs count 0).
    pub fn from_table(bot: &[&str], opponent: &[&str], table: &[(&str, &str, f64)]) -> Self {
        let values: HashMap<(Action, Action), f64> = table
            .iter()
            .map(|(b, o, v)| ((mv(b), mv(o)), *v))
            .collect();
        Self::new(bot, opponent, move |line| {
            line.plies
                .iter()
                .map(|pair| values.get(pair).copied().unwrap_or(0.0))
                .sum()
        })
    }

    pub fn with_world_replies(mut self, world: u32, replies: &[&str]) -> Self {
        self.opponent_by_world
            .insert(world, replies.iter().map(|id| mv(id)).collect());
        self
    }

    pub fn failing_on(mut self, bot: &str, opponent: &str) -> Self {
        self.broken.push((mv(bot), mv(opponent)));
        self
    }
}

impl Oracle for TableOracle {
    type State = Line;

    fn legal_actions(&self, state: &Line, side: Side) -> Vec<Action> {
        match side {
            Side::Bot => self.bot.clone(),
            Side::Opponent => self
                .opponent_by_world
                .get(&state.world)
                .cloned()
                .unwrap_or_else(|| self.opponent.clone()),
        }
    }

    fn apply(
        &self,
        state: &Line,
        bot: &Action,
        opponent: &Action,
    ) -> Result<Vec<Outcome<Line>>, OracleError> {
        let pair = (bot.clone(), opponent.clone());
        if self.broken.contains(&pair) {
            return Err(OracleError::Other(format!("no data for {bot} vs {opponent}")));
        }
        let mut next = state.clone();
        next.plies.push(pair);
        Ok(vec![Outcome::certain(next)])
    }

    fn score(&self, state: &Line, perspective: Side) -> f64 {
        let value = (self.score)(state);
        match perspective {
            Side::Bot => value,
            Side::Opponent => -value,
        }
    }
}

pub fn make_move(
    name: &str,
    move_type: &str,
    category: MoveCategory,
    power: u32,
    accuracy: f32,
    priority: i32,
) -> Move {
    Move {
        name: name.to_string(),
        move_type: move_type.to_string(),
        category,
        power,
        accuracy,
        priority,
        boosts: None,
        status: None,
        hazard: None,
    }
}

pub fn status_move(name: &str, status: Option<StatusCondition>) -> Move {
    let mut m = make_move(name, "normal", MoveCategory::Status, 0, 100.0, 0);
    m.status = status;
    m
}

pub fn boost_move(name: &str, boosts: StatBoosts) -> Move {
    let mut m = make_move(name, "normal", MoveCategory::Status, 0, 100.0, 0);
    m.boosts = Some(boosts);
    m
}

pub fn hazard_move(name: &str) -> Move {
    let mut m = make_move(name, "rock", MoveCategory::Status, 0, 100.0, 0);
    m.hazard = Some(Hazard::Stealthrock);
    m
}

pub fn default_stats(hp: u32, spe: u32) -> Stats {
    Stats {
        hp,
        atk: 120,
        def: 80,
        spa: 120,
        spd: 80,
        spe,
    }
}

pub fn make_mon(name: &str, types: &[&str], stats: Stats, moves: Vec<Move>) -> Pokemon {
    Pokemon {
        name: name.to_string(),
        types: types.iter().map(|t| t.to_string()).collect(),
        stats,
        moves,
        ability: None,
        hp: None,
        status: None,
    }
}

pub fn side(team: Vec<Pokemon>) -> SideState {
    SideState {
        team,
        active: 0,
        hazards: Vec::new(),
    }
}
