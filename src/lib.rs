pub mod action;
pub mod aggregate;
pub mod battle;
pub mod builder;
pub mod error;
pub mod matrix;
pub mod model;
pub mod oracle;
pub mod playout;
pub mod policy;
pub mod prune;
pub mod punish;
pub mod search;
pub mod select;
pub mod types;

pub use crate::action::{Action, BranchTag, JointKey, Side};
pub use crate::error::{OracleError, SearchError};
pub use crate::oracle::{Oracle, Outcome};
pub use crate::search::{
    opponent_safest_action, punishing_action, safest_action, search_matrix, SearchConfig,
};
pub use crate::select::Decision;

use crate::battle::{candidate_battles, BattleOracle};
use crate::model::Scenario;
use crate::playout::{run_playouts, PlayoutOptions};
use crate::policy::{decide, Roster};
use anyhow::Context;
use serde_json::json;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Safest,
    Opponent,
    Punish,
    Policy,
}

#[derive(Debug, Clone)]
pub struct CliOptions {
    pub scenario_path: PathBuf,
    pub mode: Mode,
    pub config: SearchConfig,
    pub roster_path: Option<PathBuf>,
    pub matrix_out: Option<PathBuf>,
    pub playouts: usize,
    pub seed: u64,
}

pub fn load_scenario(path: &Path) -> anyhow::Result<Scenario> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file at {}", path.display()))?;
    let parsed: Scenario = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse JSON from {}", path.display()))?;
    validate_scenario(&parsed)?;
    Ok(parsed)
}

pub fn validate_scenario(scenario: &Scenario) -> anyhow::Result<()> {
    if scenario.opponent_branches.is_empty() {
        anyhow::bail!("Scenario needs at least one opponent branch");
    }
    let sides = std::iter::once(("bot", &scenario.bot))
        .chain(scenario.opponent_branches.iter().map(|side| ("opponent", side)));
    for (label, side) in sides {
        if side.team.is_empty() {
            anyhow::bail!("The {label} team is empty");
        }
        if side.active >= side.team.len() {
            anyhow::bail!(
                "The {label} active index {} is out of range for a team of {}",
                side.active,
                side.team.len()
            );
        }
    }
    Ok(())
}

pub fn load_roster(path: &Path) -> anyhow::Result<Roster> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read roster file at {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse roster from {}", path.display()))
}

pub fn load_config(path: &Path) -> anyhow::Result<SearchConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse config from {}", path.display()))
}

pub fn run(opts: CliOptions) -> anyhow::Result<()> {
    let scenario = load_scenario(&opts.scenario_path)?;
    let roster = match &opts.roster_path {
        Some(path) => load_roster(path)?,
        None => Roster::new(),
    };
    let branches = candidate_battles(&scenario);
    let oracle = BattleOracle;
    log::info!(
        "searching {} candidate state(s) at depth {}",
        branches.len(),
        opts.config.depth
    );

    let decision = match opts.mode {
        Mode::Safest => serde_json::to_value(safest_action(&oracle, &branches, &opts.config)?)?,
        Mode::Opponent => serde_json::to_value(opponent_safest_action(
            &oracle,
            &branches,
            None,
            &opts.config,
        )?)?,
        Mode::Punish => serde_json::to_value(punishing_action(&oracle, &branches, &opts.config)?)?,
        Mode::Policy => serde_json::to_value(decide(&branches, &roster, &opts.config))?,
    };

    if let Some(path) = &opts.matrix_out {
        let merged = search_matrix(
            &oracle,
            &branches,
            Side::Bot,
            None,
            opts.config.depth,
            &opts.config,
        )?;
        matrix::write_csv(&merged, path)?;
        log::info!(
            "Wrote {}x{} matrix to {}",
            merged.rows().len(),
            merged.reply_count(),
            path.display()
        );
    }

    let playouts = if opts.playouts > 0 {
        let options = PlayoutOptions {
            bot_roster: roster,
            config: opts.config.clone(),
            ..PlayoutOptions::default()
        };
        Some(run_playouts(&branches[0], &options, opts.playouts, opts.seed))
    } else {
        None
    };

    let output = json!({
        "decision": decision,
        "playouts": playouts,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
