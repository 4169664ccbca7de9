//! Helpers for deterministic regression tests.

use battle_config::{Difficulty, Outcome, Roster};
use battle_core::{BattleError, BattleState, Combatant, Locale, Side};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use serde::Serialize;

pub const DEFAULT_SEED: u64 = 42;
const TURN_LIMIT: u32 = 1_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BattleTrace {
    pub log: Vec<String>,
    pub outcome: Outcome,
}

/// Plays `player` against `enemy` with both sides choosing uniformly among
/// ready abilities. Stops on game over, a stall or the turn limit.
pub fn play_out<R: RngCore>(
    player: &Combatant,
    enemy: &Combatant,
    rng: &mut R,
) -> Result<BattleTrace, BattleError> {
    let mut state = BattleState::new(player, enemy, Locale::En)?;
    while !state.game_over && state.turn < TURN_LIMIT {
        let progressed = match state.active_side() {
            Side::Player => {
                let ready = state.player.ready_abilities();
                if ready.is_empty() {
                    false
                } else {
                    let pick = ready[rng.gen_range(0..ready.len())];
                    state.use_ability(pick).is_ok()
                }
            }
            Side::Enemy => state.enemy_turn(rng).is_ok(),
        };
        if !progressed {
            break;
        }
    }
    Ok(BattleTrace {
        outcome: Outcome::from_state(&state),
        log: state.log,
    })
}

/// Seeded battle between a built-in character and a built-in enemy tier.
pub fn simulate_builtin(
    seed: u64,
    character: &str,
    difficulty: Difficulty,
) -> Result<BattleTrace, Box<dyn std::error::Error + Send + Sync>> {
    let roster = Roster::builtin()?;
    let player = roster.character(character)?;
    let enemy = roster.enemy(difficulty)?;
    let mut rng = StdRng::seed_from_u64(seed);
    Ok(play_out(&player, &enemy, &mut rng)?)
}
