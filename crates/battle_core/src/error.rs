use thiserror::Error;

use crate::combatant::{CombatantError, Side};

/// Why an action was refused. A refused action never changes battle state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionRejected {
    #[error("no battle is in progress")]
    Uninitialized,
    #[error("it is the {active:?} side's turn")]
    NotYourTurn { active: Side },
    #[error("{ability} is cooling down for {remaining} more turn(s)")]
    OnCooldown { ability: String, remaining: u32 },
    #[error("the battle is already over")]
    GameOver,
    #[error("no ability at index {index}")]
    UnknownAbility { index: usize },
    #[error("every ability is cooling down")]
    NoUsableAbility,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleError {
    #[error("invalid player: {0}")]
    InvalidPlayer(#[source] CombatantError),
    #[error("invalid enemy: {0}")]
    InvalidEnemy(#[source] CombatantError),
}
