use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use battle_core::{BattleState, Side, TurnReport};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::roster::Difficulty;

/// Saved record of one finished (or abandoned) battle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleTranscript {
    pub id: String,
    pub timestamp: String,
    pub seed: u64,
    pub character: String,
    pub enemy: String,
    pub difficulty: Difficulty,
    pub turns: Vec<TurnReport>,
    pub log: Vec<String>,
    pub outcome: Outcome,
}

impl BattleTranscript {
    pub fn new(
        id: impl Into<String>,
        seed: u64,
        difficulty: Difficulty,
        state: &BattleState,
        turns: Vec<TurnReport>,
    ) -> Self {
        Self {
            id: id.into(),
            timestamp: Utc::now().to_rfc3339(),
            seed,
            character: state.player.name.clone(),
            enemy: state.enemy.name.clone(),
            difficulty,
            turns,
            log: state.log.clone(),
            outcome: Outcome::from_state(state),
        }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read transcript {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("{} is not a battle transcript", path.display()))
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("failed to write transcript {}", path.display()))
    }

    pub fn summary_line(&self) -> String {
        format!(
            "Battle {}: {} vs {} ({}) -> {:?} after {} turns, HP {}/{}",
            self.id,
            self.character,
            self.enemy,
            self.difficulty,
            self.outcome.status,
            self.outcome.turns,
            self.outcome.player_hp,
            self.outcome.enemy_hp
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Outcome {
    pub status: OutcomeStatus,
    pub winner: Option<Side>,
    pub turns: u32,
    pub player_hp: u32,
    pub enemy_hp: u32,
}

impl Outcome {
    pub fn from_state(state: &BattleState) -> Self {
        let winner = state.winner();
        let status = match winner {
            Some(Side::Player) => OutcomeStatus::Victory,
            Some(Side::Enemy) => OutcomeStatus::Defeat,
            None if state.enemy_stalled() => OutcomeStatus::Stalled,
            None => OutcomeStatus::Abandoned,
        };
        Self {
            status,
            winner,
            turns: state.turn,
            player_hp: state.player.current_hp,
            enemy_hp: state.enemy.current_hp,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Victory,
    Defeat,
    Stalled,
    Abandoned,
}
