//! Per-unit decision policy layered over the search.
//!
//! Each unit on the bot's team is assigned a [`Role`] through a [`Roster`].
//! Roles are cheap rule chains that decide when to spend a search and which
//! one (safest, punish) versus when a scripted or greedy move is enough.

use crate::action::{Action, Side};
use crate::battle::{Battle, BattleOracle};
use crate::error::SearchError;
use crate::model::normalize_name;
use crate::oracle::Oracle;
use crate::search::{opponent_safest_action, punishing_action, safest_action, SearchConfig};
use crate::types::effectiveness_against;
use phf::phf_set;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Status moves that make setting up unsafe when they are the predicted reply.
static DANGEROUS_STATUS_MOVES: phf::Set<&'static str> = phf_set! {
    "willowisp",
    "thunderwave",
    "spore",
    "haze",
    "roar",
    "whirlwind",
};

static DEFAULT_ROLE: Role = Role::Safest;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "role", rename_all = "camelCase")]
pub enum Role {
    /// Lay the hazard once, then hit as hard as possible.
    HazardLead { hazard: String },
    /// Keep momentum with a pivot move when the opponent can't punish it.
    Pivot { pivot: String },
    /// Best response to the opponent's predicted safest reply.
    Punisher,
    /// Boost when the predicted reply can't punish it, taunt status users.
    SetupSweeper {
        setup: String,
        #[serde(default)]
        taunt: Option<String>,
    },
    /// Revenge killer: greedy unless it loses the KO race.
    Cleaner,
    Safest,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(from = "HashMap<String, Role>")]
pub struct Roster {
    roles: HashMap<String, Role>,
}

impl From<HashMap<String, Role>> for Roster {
    fn from(raw: HashMap<String, Role>) -> Self {
        Roster {
            roles: raw
                .into_iter()
                .map(|(name, role)| (normalize_name(&name), role))
                .collect(),
        }
    }
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, unit: &str, role: Role) {
        self.roles.insert(normalize_name(unit), role);
    }

    pub fn role_for(&self, unit: &str) -> &Role {
        self.roles.get(unit).unwrap_or(&DEFAULT_ROLE)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    Scripted,
    Safest,
    Punish,
    MostDamage,
    Fallback,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PolicyDecision {
    pub action: Action,
    pub reason: Reason,
}

impl PolicyDecision {
    fn new(action: Action, reason: Reason) -> Self {
        PolicyDecision { action, reason }
    }
}

/// Picks the bot's action for this turn.
///
/// `branches[0]` is the view used by the scripted checks; every search runs
/// over all branches. Never fails: a search error is logged and replaced by
/// the first legal action.
pub fn decide(branches: &[Battle], roster: &Roster, config: &SearchConfig) -> PolicyDecision {
    let oracle = BattleOracle;
    let Some(view) = branches.first() else {
        log::warn!("no candidate states; passing");
        return PolicyDecision::new(Action::Pass, Reason::Fallback);
    };
    match TurnContext::new(&oracle, view, branches, config).and_then(|ctx| ctx.decide(roster)) {
        Ok(decision) => decision,
        Err(err) => {
            let legal = oracle.legal_actions(view, Side::Bot);
            let action = legal.into_iter().next().unwrap_or(Action::Pass);
            log::warn!("search failed ({err}); falling back to {action}");
            PolicyDecision::new(action, Reason::Fallback)
        }
    }
}

struct TurnContext<'a> {
    oracle: &'a BattleOracle,
    view: &'a Battle,
    branches: &'a [Battle],
    config: &'a SearchConfig,
    legal: Vec<Action>,
}

impl<'a> TurnContext<'a> {
    fn new(
        oracle: &'a BattleOracle,
        view: &'a Battle,
        branches: &'a [Battle],
        config: &'a SearchConfig,
    ) -> Result<Self, SearchError> {
        let legal = oracle.legal_actions(view, Side::Bot);
        if legal.is_empty() {
            return Err(SearchError::InvalidActionSet { side: Side::Bot });
        }
        Ok(TurnContext {
            oracle,
            view,
            branches,
            config,
            legal,
        })
    }

    fn decide(&self, roster: &Roster) -> Result<PolicyDecision, SearchError> {
        if self.legal.len() == 1 {
            return Ok(PolicyDecision::new(self.legal[0].clone(), Reason::Scripted));
        }
        if self.legal.iter().all(|a| a.move_id().is_none()) {
            return self.forced_switch();
        }

        let unit = &self.view.active(Side::Bot).id;
        let role = roster.role_for(unit);
        log::debug!("{unit} acting as {role:?}");
        match role {
            Role::HazardLead { hazard } => self.hazard_lead(hazard),
            Role::Pivot { pivot } => self.pivot(pivot),
            Role::Punisher => self.punish(),
            Role::SetupSweeper { setup, taunt } => self.setup_sweeper(setup, taunt.as_deref()),
            Role::Cleaner => self.cleaner(),
            Role::Safest => self.safest(),
        }
    }

    fn forced_switch(&self) -> Result<PolicyDecision, SearchError> {
        if self.view.turn == 0 {
            // Lead order is the team order.
            return Ok(PolicyDecision::new(self.legal[0].clone(), Reason::Scripted));
        }
        self.safest()
    }

    fn hazard_lead(&self, hazard: &str) -> Result<PolicyDecision, SearchError> {
        match self.available(hazard) {
            Some(action) if !self.view.opponent.stealth_rock => {
                Ok(PolicyDecision::new(action, Reason::Scripted))
            }
            _ => self.most_damaging(),
        }
    }

    fn pivot(&self, pivot: &str) -> Result<PolicyDecision, SearchError> {
        if self.view.side_can_ko(Side::Opponent) {
            return self.safest();
        }
        if !self.pivot_is_safe(pivot) || self.view.side_can_ko(Side::Bot) {
            return self.most_damaging();
        }
        match self.available(pivot) {
            Some(action) => Ok(PolicyDecision::new(action, Reason::Scripted)),
            None => self.safest(),
        }
    }

    fn setup_sweeper(&self, setup: &str, taunt: Option<&str>) -> Result<PolicyDecision, SearchError> {
        let predicted = opponent_safest_action(self.oracle, self.branches, None, self.config)?;
        let reply = predicted.action();

        if let Some(action) = taunt.and_then(|t| self.available(t)) {
            if self.is_opponent_status_move(reply) {
                return Ok(PolicyDecision::new(action, Reason::Scripted));
            }
        }
        if let Some(action) = self.available(setup) {
            if self.safe_to_setup(reply) {
                return Ok(PolicyDecision::new(action, Reason::Scripted));
            }
        }
        self.cleaner()
    }

    fn cleaner(&self) -> Result<PolicyDecision, SearchError> {
        if self.loses_ko_trade() {
            self.safest()
        } else {
            self.most_damaging()
        }
    }

    fn safest(&self) -> Result<PolicyDecision, SearchError> {
        let decision = safest_action(self.oracle, self.branches, self.config)?;
        Ok(PolicyDecision::new(decision.action().clone(), Reason::Safest))
    }

    fn punish(&self) -> Result<PolicyDecision, SearchError> {
        let line = punishing_action(self.oracle, self.branches, self.config)?;
        Ok(PolicyDecision::new(line.action().clone(), Reason::Punish))
    }

    fn most_damaging(&self) -> Result<PolicyDecision, SearchError> {
        match self.view.most_damaging_move(Side::Bot) {
            Some(action) if self.legal.contains(&action) => {
                Ok(PolicyDecision::new(action, Reason::MostDamage))
            }
            _ => self.safest(),
        }
    }

    fn available(&self, name: &str) -> Option<Action> {
        let action = Action::Move(normalize_name(name));
        self.legal.contains(&action).then_some(action)
    }

    /// Unsafe when the opponent's active or any living reserve is immune to
    /// the pivot move's type.
    fn pivot_is_safe(&self, pivot: &str) -> bool {
        let Some(mv) = self.view.active(Side::Bot).find_move(&normalize_name(pivot)) else {
            return false;
        };
        let opponent = &self.view.opponent;
        std::iter::once(opponent.active())
            .chain(opponent.reserves())
            .all(|unit| effectiveness_against(&mv.move_type, &unit.types, unit.ability.as_deref()) > 0.0)
    }

    fn is_opponent_status_move(&self, reply: &Action) -> bool {
        reply
            .move_id()
            .and_then(|id| self.view.active(Side::Opponent).find_move(id))
            .is_some_and(|mv| mv.is_status())
    }

    fn safe_to_setup(&self, reply: &Action) -> bool {
        if reply.is_switch() {
            return true;
        }
        let dangerous = reply
            .move_id()
            .is_some_and(|id| DANGEROUS_STATUS_MOVES.contains(id));
        !dangerous && !self.view.side_can_ko(Side::Opponent)
    }

    /// The opponent KOs first and we can't KO back. Speed ties count as a win
    /// for the bot.
    fn loses_ko_trade(&self) -> bool {
        self.view.side_can_ko(Side::Opponent)
            && !self.view.side_can_ko(Side::Bot)
            && self.view.outspeeds(Side::Opponent)
    }
}
