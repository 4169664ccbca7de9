//! Turn-based duel between a player and an enemy.
//!
//! The rules live in plain types ([`BattleState`], [`apply_ability`]) that
//! own their data and take an injected RNG. [`BattleSession`] adds the timed
//! enemy reply, and [`BattlePlugin`] drives a session from a Bevy app.

pub mod combatant;
pub mod effect;
pub mod engine;
pub mod error;
pub mod narration;
pub mod plugin;
pub mod schedule;
pub mod session;
pub mod settings;

pub use combatant::{Ability, AbilityKind, Combatant, CombatantError, Side, StatusEffect};
pub use effect::{apply_ability, AbilityOutcome, Effect, EffectKind};
pub use engine::{BattleState, TurnReport};
pub use error::{ActionRejected, BattleError};
pub use narration::Locale;
pub use plugin::{ActiveBattle, BattlePlugin, PlayerAbility, StartBattle, TurnResolved};
pub use schedule::{ScheduledEnemyTurn, SessionId};
pub use session::BattleSession;
pub use settings::{BattleRng, BattleSettings};
