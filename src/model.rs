use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveCategory {
    Physical,
    Special,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusCondition {
    Burn,
    Paralysis,
    Sleep,
    Poison,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hazard {
    Stealthrock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub struct StatBoosts {
    #[serde(default)]
    pub atk: i8,
    #[serde(default)]
    pub spa: i8,
    #[serde(default)]
    pub spe: i8,
}

impl StatBoosts {
    pub fn is_empty(&self) -> bool {
        self.atk == 0 && self.spa == 0 && self.spe == 0
    }

    pub fn total(&self) -> i32 {
        self.atk as i32 + self.spa as i32 + self.spe as i32
    }
}

fn default_accuracy() -> f32 {
    100.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct Move {
    pub name: String,
    #[serde(rename = "type")]
    pub move_type: String,
    pub category: MoveCategory,
    #[serde(default)]
    pub power: u32,
    #[serde(default = "default_accuracy")]
    pub accuracy: f32,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub boosts: Option<StatBoosts>,
    #[serde(default)]
    pub status: Option<StatusCondition>,
    #[serde(default)]
    pub hazard: Option<Hazard>,
}

impl Move {
    pub fn id(&self) -> String {
        normalize_name(&self.name)
    }

    pub fn is_status(&self) -> bool {
        matches!(self.category, MoveCategory::Status)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Stats {
    pub hp: u32,
    pub atk: u32,
    pub def: u32,
    pub spa: u32,
    pub spd: u32,
    pub spe: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pokemon {
    pub name: String,
    #[serde(default)]
    pub types: Vec<String>,
    pub stats: Stats,
    #[serde(default)]
    pub moves: Vec<Move>,
    #[serde(default)]
    pub ability: Option<String>,
    /// Current HP; full when absent.
    #[serde(default)]
    pub hp: Option<u32>,
    #[serde(default)]
    pub status: Option<StatusCondition>,
}

impl Pokemon {
    pub fn id(&self) -> String {
        normalize_name(&self.name)
    }

    pub fn initial_hp(&self) -> f64 {
        self.hp.unwrap_or(self.stats.hp).min(self.stats.hp) as f64
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SideState {
    pub team: Vec<Pokemon>,
    #[serde(default)]
    pub active: usize,
    #[serde(default)]
    pub hazards: Vec<Hazard>,
}

/// A decision point: the bot's known side and one or more candidate states
/// for the partially hidden opponent.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub bot: SideState,
    pub opponent_branches: Vec<SideState>,
    #[serde(default)]
    pub turn: u32,
}

pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
