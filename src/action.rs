use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Bot,
    Opponent,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Bot => Side::Opponent,
            Side::Opponent => Side::Bot,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Bot => f.write_str("bot"),
            Side::Opponent => f.write_str("opponent"),
        }
    }
}

/// One side's choice for a turn.
///
/// `Pass` is what a side submits while the other side is making a forced
/// switch after a faint.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Move(String),
    Switch(String),
    Pass,
}

impl Action {
    pub fn is_switch(&self) -> bool {
        matches!(self, Action::Switch(_))
    }

    pub fn move_id(&self) -> Option<&str> {
        match self {
            Action::Move(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Move(id) => f.write_str(id),
            Action::Switch(unit) => write!(f, "switch {unit}"),
            Action::Pass => f.write_str("pass"),
        }
    }
}

/// Discriminates the `theirs` half of a key when matrices from several
/// candidate states are merged.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize)]
pub struct BranchTag(pub u32);

impl fmt::Display for BranchTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Joint decision a payoff is defined over.
///
/// `mine` belongs to the side whose perspective the owning matrix represents,
/// `theirs` to the other side. `branch` tags which candidate state the reply
/// was scored in.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub struct JointKey {
    pub mine: Action,
    pub theirs: Action,
    pub branch: BranchTag,
}

impl JointKey {
    pub fn new(mine: Action, theirs: Action) -> Self {
        JointKey {
            mine,
            theirs,
            branch: BranchTag::default(),
        }
    }

    pub fn in_branch(mine: Action, theirs: Action, branch: BranchTag) -> Self {
        JointKey {
            mine,
            theirs,
            branch,
        }
    }
}

impl fmt::Display for JointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}{})", self.mine, self.theirs, self.branch)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) struct Reply {
    pub action: Action,
    pub branch: BranchTag,
}
