use crate::action::Side;
use crate::battle::{Battle, BattleOracle};
use crate::oracle::{Oracle, Outcome};
use crate::policy::{decide, Roster};
use crate::search::SearchConfig;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug)]
pub struct PlayoutOptions {
    pub max_turns: u32,
    pub bot_roster: Roster,
    pub opponent_roster: Roster,
    pub config: SearchConfig,
}

impl Default for PlayoutOptions {
    fn default() -> Self {
        Self {
            max_turns: 200,
            bot_roster: Roster::new(),
            opponent_roster: Roster::new(),
            config: SearchConfig::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayoutResult {
    BotWins,
    OpponentWins,
    Draw,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PlayoutSummary {
    pub games: usize,
    pub bot_wins: usize,
    pub opponent_wins: usize,
    pub draws: usize,
    pub mean_turns: f64,
}

/// Plays `battle` to the end with both sides running the policy, sampling
/// one outcome per turn. Returns the result and the number of turns played.
pub fn play(battle: &Battle, options: &PlayoutOptions, seed: u64) -> (PlayoutResult, u32) {
    let oracle = BattleOracle;
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut state = battle.clone();
    let mut turns = 0u32;

    while turns < options.max_turns {
        match oracle.winner(&state) {
            Some(Side::Bot) => return (PlayoutResult::BotWins, turns),
            Some(Side::Opponent) => return (PlayoutResult::OpponentWins, turns),
            None if state.is_finished() => return (PlayoutResult::Draw, turns),
            None => {}
        }
        let bot = decide(std::slice::from_ref(&state), &options.bot_roster, &options.config).action;
        let mirrored = state.mirrored();
        let opponent = decide(
            std::slice::from_ref(&mirrored),
            &options.opponent_roster,
            &options.config,
        )
        .action;

        let outcomes = match oracle.apply(&state, &bot, &opponent) {
            Ok(outcomes) => outcomes,
            Err(err) => {
                log::warn!("turn {turns}: {bot} vs {opponent} rejected ({err}); ending as draw");
                return (PlayoutResult::Draw, turns);
            }
        };
        let Some(next) = sample(outcomes, &mut rng) else {
            log::warn!("turn {turns}: no outcomes for {bot} vs {opponent}; ending as draw");
            return (PlayoutResult::Draw, turns);
        };
        state = next;
        turns += 1;
    }
    (PlayoutResult::Draw, turns)
}

fn sample(outcomes: Vec<Outcome<Battle>>, rng: &mut SmallRng) -> Option<Battle> {
    let roll: f64 = rng.gen();
    let mut cumulative = 0.0;
    let mut last = None;
    for outcome in outcomes {
        cumulative += outcome.probability;
        if roll < cumulative {
            return Some(outcome.state);
        }
        last = Some(outcome.state);
    }
    // Rounding can leave the roll just above the final cumulative weight.
    last
}

pub fn run_playouts(
    battle: &Battle,
    options: &PlayoutOptions,
    games: usize,
    seed: u64,
) -> PlayoutSummary {
    let results: Vec<(PlayoutResult, u32)> = (0..games)
        .into_par_iter()
        .map(|game| play(battle, options, mix_seed(seed, game as u64, 0)))
        .collect();

    let mut summary = PlayoutSummary {
        games,
        ..PlayoutSummary::default()
    };
    let mut total_turns = 0u64;
    for (result, turns) in results {
        total_turns += turns as u64;
        match result {
            PlayoutResult::BotWins => summary.bot_wins += 1,
            PlayoutResult::OpponentWins => summary.opponent_wins += 1,
            PlayoutResult::Draw => summary.draws += 1,
        }
    }
    if games > 0 {
        summary.mean_turns = total_turns as f64 / games as f64;
    }
    summary
}

fn mix_seed(base: u64, a: u64, b: u64) -> u64 {
    let mut x = base ^ a.wrapping_mul(0x9E3779B97F4A7C15);
    x ^= b.wrapping_mul(0xC2B2AE3D27D4EB4F);
    x ^= x >> 33;
    x = x.wrapping_mul(0xff51afd7ed558ccd);
    x ^= x >> 33;
    x = x.wrapping_mul(0xc4ceb9fe1a85ec53);
    x ^ (x >> 33)
}
