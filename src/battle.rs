use crate::action::{Action, Side};
use crate::error::OracleError;
use crate::model::{
    normalize_name, Hazard, Move, MoveCategory, Pokemon, Scenario, SideState, StatBoosts, Stats,
    StatusCondition,
};
use crate::oracle::{Oracle, Outcome};
use crate::types::{effectiveness_against, type_effectiveness};

const LEVEL: f64 = 50.0;
/// Mean of the 85..=100 damage roll.
const AVERAGE_ROLL: f64 = 0.925;
const STAB: f64 = 1.5;
const MAX_STAGE: i8 = 6;

const ALIVE_WEIGHT: f64 = 0.5;
const HP_WEIGHT: f64 = 0.5;
const STATUS_PENALTY: f64 = 0.05;
const BOOST_WEIGHT: f64 = 0.02;
const HAZARD_PENALTY: f64 = 0.05;

#[derive(Clone, Debug)]
pub struct Battler {
    pub id: String,
    pub types: Vec<String>,
    pub stats: Stats,
    pub moves: Vec<Move>,
    pub ability: Option<String>,
    pub hp: f64,
    pub status: Option<StatusCondition>,
    pub boosts: StatBoosts,
}

impl Battler {
    pub fn from_pokemon(pokemon: &Pokemon) -> Self {
        Battler {
            id: pokemon.id(),
            types: pokemon.types.iter().map(|t| t.to_ascii_lowercase()).collect(),
            stats: pokemon.stats.clone(),
            moves: pokemon.moves.clone(),
            ability: pokemon.ability.as_deref().map(normalize_name),
            hp: pokemon.initial_hp(),
            status: pokemon.status,
            boosts: StatBoosts::default(),
        }
    }

    pub fn is_fainted(&self) -> bool {
        self.hp <= 0.0
    }

    pub fn max_hp(&self) -> f64 {
        self.stats.hp as f64
    }

    pub fn hp_fraction(&self) -> f64 {
        if self.stats.hp == 0 {
            return 0.0;
        }
        (self.hp / self.max_hp()).clamp(0.0, 1.0)
    }

    pub fn find_move(&self, id: &str) -> Option<&Move> {
        self.moves.iter().find(|m| m.id() == id)
    }

    pub fn has_type(&self, t: &str) -> bool {
        self.types.iter().any(|own| own.eq_ignore_ascii_case(t))
    }

    pub fn effective_speed(&self) -> f64 {
        let speed = self.stats.spe as f64 * stage_multiplier(self.boosts.spe);
        if self.status == Some(StatusCondition::Paralysis) {
            speed * 0.5
        } else {
            speed
        }
    }

    fn attack_stat(&self, category: MoveCategory) -> f64 {
        match category {
            MoveCategory::Physical => self.stats.atk as f64 * stage_multiplier(self.boosts.atk),
            MoveCategory::Special => self.stats.spa as f64 * stage_multiplier(self.boosts.spa),
            MoveCategory::Status => 0.0,
        }
    }

    fn defense_stat(&self, category: MoveCategory) -> f64 {
        match category {
            MoveCategory::Physical => self.stats.def as f64,
            MoveCategory::Special => self.stats.spd as f64,
            MoveCategory::Status => 0.0,
        }
    }

    fn take_damage(&mut self, amount: f64) {
        self.hp = (self.hp - amount).max(0.0);
    }

    fn raise(&mut self, boosts: &StatBoosts) {
        let clamp = |stage: i8, delta: i8| (stage + delta).clamp(-MAX_STAGE, MAX_STAGE);
        self.boosts.atk = clamp(self.boosts.atk, boosts.atk);
        self.boosts.spa = clamp(self.boosts.spa, boosts.spa);
        self.boosts.spe = clamp(self.boosts.spe, boosts.spe);
    }

    fn can_receive(&self, status: StatusCondition) -> bool {
        if self.is_fainted() || self.status.is_some() {
            return false;
        }
        match status {
            StatusCondition::Burn => !self.has_type("fire"),
            StatusCondition::Paralysis => !self.has_type("electric"),
            StatusCondition::Poison => !self.has_type("poison") && !self.has_type("steel"),
            StatusCondition::Sleep => true,
        }
    }
}

fn stage_multiplier(stage: i8) -> f64 {
    if stage >= 0 {
        (2.0 + stage as f64) / 2.0
    } else {
        2.0 / (2.0 - stage as f64)
    }
}

#[derive(Clone, Debug)]
pub struct Team {
    pub members: Vec<Battler>,
    pub active: usize,
    pub stealth_rock: bool,
}

impl Team {
    pub fn from_side(side: &SideState) -> Self {
        let members: Vec<Battler> = side.team.iter().map(Battler::from_pokemon).collect();
        let active = side.active.min(members.len().saturating_sub(1));
        Team {
            members,
            active,
            stealth_rock: side.hazards.contains(&Hazard::Stealthrock),
        }
    }

    pub fn active(&self) -> &Battler {
        &self.members[self.active]
    }

    fn active_mut(&mut self) -> &mut Battler {
        &mut self.members[self.active]
    }

    pub fn alive_count(&self) -> usize {
        self.members.iter().filter(|m| !m.is_fainted()).count()
    }

    pub fn is_wiped(&self) -> bool {
        self.alive_count() == 0
    }

    pub fn reserves(&self) -> impl Iterator<Item = &Battler> + '_ {
        self.members
            .iter()
            .enumerate()
            .filter(move |(idx, m)| *idx != self.active && !m.is_fainted())
            .map(|(_, m)| m)
    }

    fn switch_target(&self, id: &str) -> Option<usize> {
        self.members
            .iter()
            .enumerate()
            .find(|(idx, m)| *idx != self.active && !m.is_fainted() && m.id == id)
            .map(|(idx, _)| idx)
    }

    fn switch_in(&mut self, idx: usize) {
        self.active_mut().boosts = StatBoosts::default();
        self.active = idx;
        if self.stealth_rock {
            let incoming = self.active_mut();
            let damage = incoming.max_hp() * 0.125 * type_effectiveness("rock", &incoming.types);
            incoming.take_damage(damage);
        }
    }

    fn value(&self) -> f64 {
        let size = self.members.len().max(1) as f64;
        let mut value = 0.0;
        for member in self.members.iter().filter(|m| !m.is_fainted()) {
            value += ALIVE_WEIGHT + HP_WEIGHT * member.hp_fraction();
            if member.status.is_some() {
                value -= STATUS_PENALTY;
            }
        }
        value /= size;
        if !self.active().is_fainted() {
            value += BOOST_WEIGHT * self.active().boosts.total() as f64;
        }
        if self.stealth_rock {
            value -= HAZARD_PENALTY;
        }
        value
    }
}

/// Snapshot of a singles battle. Transitions always produce new values.
#[derive(Clone, Debug)]
pub struct Battle {
    pub bot: Team,
    pub opponent: Team,
    pub turn: u32,
}

impl Battle {
    pub fn from_sides(bot: &SideState, opponent: &SideState, turn: u32) -> Self {
        Battle {
            bot: Team::from_side(bot),
            opponent: Team::from_side(opponent),
            turn,
        }
    }

    pub fn team(&self, side: Side) -> &Team {
        match side {
            Side::Bot => &self.bot,
            Side::Opponent => &self.opponent,
        }
    }

    fn team_mut(&mut self, side: Side) -> &mut Team {
        match side {
            Side::Bot => &mut self.bot,
            Side::Opponent => &mut self.opponent,
        }
    }

    pub fn active(&self, side: Side) -> &Battler {
        self.team(side).active()
    }

    pub fn mirrored(&self) -> Battle {
        Battle {
            bot: self.opponent.clone(),
            opponent: self.bot.clone(),
            turn: self.turn,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.bot.is_wiped() || self.opponent.is_wiped()
    }

    pub fn needs_switch(&self, side: Side) -> bool {
        let team = self.team(side);
        team.active().is_fainted() && team.reserves().next().is_some()
    }

    pub fn expected_damage(&self, side: Side, move_id: &str) -> f64 {
        let attacker = self.active(side);
        let defender = self.active(side.opponent());
        attacker
            .find_move(move_id)
            .map(|mv| expected_damage(attacker, defender, mv))
            .unwrap_or(0.0)
    }

    pub fn most_damaging_move(&self, side: Side) -> Option<Action> {
        let mut best: Option<(f64, &Move)> = None;
        for mv in &self.active(side).moves {
            let damage = self.expected_damage(side, &mv.id());
            if best.map_or(true, |(most, _)| damage > most) {
                best = Some((damage, mv));
            }
        }
        best.map(|(_, mv)| Action::Move(mv.id()))
    }

    pub fn side_can_ko(&self, side: Side) -> bool {
        let target_hp = self.active(side.opponent()).hp;
        self.active(side)
            .moves
            .iter()
            .any(|mv| !mv.is_status() && self.expected_damage(side, &mv.id()) >= target_hp)
    }

    pub fn outspeeds(&self, side: Side) -> bool {
        self.active(side).effective_speed() > self.active(side.opponent()).effective_speed()
    }
}

pub fn candidate_battles(scenario: &Scenario) -> Vec<Battle> {
    scenario
        .opponent_branches
        .iter()
        .map(|opponent| Battle::from_sides(&scenario.bot, opponent, scenario.turn))
        .collect()
}

// Simplified from pokemon-showdown's getDamage: level 50, average roll, no crits.
pub fn expected_damage(attacker: &Battler, defender: &Battler, mv: &Move) -> f64 {
    if mv.power == 0 || mv.is_status() {
        return 0.0;
    }
    let def = defender.defense_stat(mv.category);
    if def <= 0.0 {
        return 0.0;
    }
    let atk = attacker.attack_stat(mv.category);
    let base = ((2.0 * LEVEL / 5.0 + 2.0) * mv.power as f64 * atk / def) / 50.0 + 2.0;
    let stab = if attacker.has_type(&mv.move_type) { STAB } else { 1.0 };
    let type_mod = effectiveness_against(&mv.move_type, &defender.types, defender.ability.as_deref());
    let burn = if attacker.status == Some(StatusCondition::Burn)
        && mv.category == MoveCategory::Physical
    {
        0.5
    } else {
        1.0
    };
    base * stab * type_mod * burn * AVERAGE_ROLL
}

/// Deterministic-average transition model for [`Battle`].
///
/// Damage is collapsed to its expected value; speed ties and accuracy checks
/// are kept as separate weighted outcomes.
#[derive(Clone, Copy, Debug, Default)]
pub struct BattleOracle;

struct PlannedMove {
    side: Side,
    move_id: String,
    priority: i32,
    speed: f64,
}

impl BattleOracle {
    fn validate(&self, state: &Battle, side: Side, action: &Action) -> Result<(), OracleError> {
        let team = state.team(side);
        match action {
            Action::Move(id) if team.active().find_move(id).is_none() => {
                return Err(OracleError::UnknownMove(id.clone()));
            }
            Action::Switch(id) if team.switch_target(id).is_none() => {
                return Err(OracleError::IllegalSwitch(id.clone()));
            }
            _ => {}
        }
        if !self.legal_actions(state, side).contains(action) {
            return Err(OracleError::IllegalAction {
                side,
                action: action.clone(),
            });
        }
        Ok(())
    }

    fn plan(&self, state: &Battle, side: Side, action: &Action) -> Option<PlannedMove> {
        let move_id = action.move_id()?;
        let battler = state.active(side);
        let mv = battler.find_move(move_id)?;
        Some(PlannedMove {
            side,
            move_id: move_id.to_string(),
            priority: mv.priority,
            speed: battler.effective_speed(),
        })
    }
}

impl Oracle for BattleOracle {
    type State = Battle;

    fn legal_actions(&self, state: &Battle, side: Side) -> Vec<Action> {
        if state.is_finished() {
            return Vec::new();
        }
        let team = state.team(side);
        let switches = team.reserves().map(|m| Action::Switch(m.id.clone()));
        if team.active().is_fainted() {
            return switches.collect();
        }
        if state.needs_switch(side.opponent()) {
            return vec![Action::Pass];
        }
        team.active()
            .moves
            .iter()
            .map(|mv| Action::Move(mv.id()))
            .chain(switches)
            .collect()
    }

    fn apply(
        &self,
        state: &Battle,
        bot: &Action,
        opponent: &Action,
    ) -> Result<Vec<Outcome<Battle>>, OracleError> {
        self.validate(state, Side::Bot, bot)?;
        self.validate(state, Side::Opponent, opponent)?;

        let mut next = state.clone();
        next.turn += 1;
        for (side, action) in [(Side::Bot, bot), (Side::Opponent, opponent)] {
            if let Action::Switch(id) = action {
                let team = next.team_mut(side);
                if let Some(idx) = team.switch_target(id) {
                    team.switch_in(idx);
                }
            }
        }

        let mut planned: Vec<PlannedMove> = [(Side::Bot, bot), (Side::Opponent, opponent)]
            .into_iter()
            .filter_map(|(side, action)| self.plan(&next, side, action))
            .collect();
        planned.sort_by(|lhs, rhs| {
            rhs.priority
                .cmp(&lhs.priority)
                .then_with(|| rhs.speed.total_cmp(&lhs.speed))
        });
        let orders: Vec<(f64, Vec<&PlannedMove>)> = match planned.as_slice() {
            [first, second] if first.priority == second.priority && first.speed == second.speed => {
                vec![(0.5, vec![first, second]), (0.5, vec![second, first])]
            }
            moves => vec![(1.0, moves.iter().collect())],
        };

        let mut outcomes = Vec::new();
        for (probability, order) in orders {
            let mut branch = vec![Outcome {
                probability,
                state: next.clone(),
            }];
            for planned in order {
                branch = branch
                    .into_iter()
                    .flat_map(|outcome| execute_move(outcome, planned.side, &planned.move_id))
                    .collect();
            }
            outcomes.extend(branch);
        }
        for outcome in &mut outcomes {
            apply_residuals(&mut outcome.state);
        }
        Ok(outcomes)
    }

    fn score(&self, state: &Battle, perspective: Side) -> f64 {
        state.team(perspective).value() - state.team(perspective.opponent()).value()
    }

    fn winner(&self, state: &Battle) -> Option<Side> {
        match (state.bot.is_wiped(), state.opponent.is_wiped()) {
            (false, true) => Some(Side::Bot),
            (true, false) => Some(Side::Opponent),
            _ => None,
        }
    }
}

fn execute_move(outcome: Outcome<Battle>, side: Side, move_id: &str) -> Vec<Outcome<Battle>> {
    let user = outcome.state.active(side);
    if user.is_fainted() {
        return vec![outcome];
    }
    let Some(mv) = user.find_move(move_id).cloned() else {
        return vec![outcome];
    };
    let target_down = outcome.state.active(side.opponent()).is_fainted();
    if target_down && !mv.is_status() {
        return vec![outcome];
    }

    let hit_chance = (mv.accuracy as f64 / 100.0).clamp(0.0, 1.0);
    let mut hit = outcome.state.clone();
    resolve_hit(&mut hit, side, &mv);
    if hit_chance >= 1.0 {
        return vec![Outcome {
            probability: outcome.probability,
            state: hit,
        }];
    }
    vec![
        Outcome {
            probability: outcome.probability * hit_chance,
            state: hit,
        },
        Outcome {
            probability: outcome.probability * (1.0 - hit_chance),
            state: outcome.state,
        },
    ]
}

fn resolve_hit(state: &mut Battle, side: Side, mv: &Move) {
    let damage = expected_damage(state.active(side), state.active(side.opponent()), mv);
    if damage > 0.0 {
        state.team_mut(side.opponent()).active_mut().take_damage(damage);
    }
    if let Some(status) = mv.status {
        let target = state.team_mut(side.opponent()).active_mut();
        if target.can_receive(status) {
            target.status = Some(status);
        }
    }
    if let Some(boosts) = &mv.boosts {
        state.team_mut(side).active_mut().raise(boosts);
    }
    if mv.hazard == Some(Hazard::Stealthrock) {
        state.team_mut(side.opponent()).stealth_rock = true;
    }
}

fn apply_residuals(state: &mut Battle) {
    for side in [Side::Bot, Side::Opponent] {
        let active = state.team_mut(side).active_mut();
        if active.is_fainted() {
            continue;
        }
        let fraction = match active.status {
            Some(StatusCondition::Burn) => 1.0 / 16.0,
            Some(StatusCondition::Poison) => 1.0 / 8.0,
            _ => continue,
        };
        let damage = active.max_hp() * fraction;
        active.take_damage(damage);
    }
}
