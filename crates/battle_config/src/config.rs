use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use battle_core::{BattleSettings, Locale};
use serde::Deserialize;

use crate::roster::Roster;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GameConfig {
    #[serde(default)]
    pub battle: BattleSection,
    #[serde(default)]
    pub roster: Option<PathBuf>,
    #[serde(default)]
    pub transcript: Option<TranscriptConfig>,
}

impl GameConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut cfg: GameConfig = toml::from_str(&data)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        // Relative roster paths are resolved against the config file.
        if let (Some(roster), Some(parent)) = (cfg.roster.as_mut(), path.parent()) {
            if roster.is_relative() {
                *roster = parent.join(&*roster);
            }
        }
        Ok(cfg)
    }

    /// Values present in the file replace those in `settings`.
    pub fn apply_to(&self, settings: &mut BattleSettings) {
        if let Some(seed) = self.battle.seed {
            settings.seed = seed;
        }
        if let Some(delay) = self.battle.enemy_delay_ms {
            settings.enemy_delay = Duration::from_millis(delay);
        }
        if let Some(locale) = self.battle.locale {
            settings.locale = locale;
        }
    }

    pub fn load_roster(&self) -> Result<Roster> {
        match &self.roster {
            Some(path) => Roster::from_path(path)
                .with_context(|| format!("failed to load roster from {}", path.display())),
            None => Ok(Roster::builtin()?),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct BattleSection {
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub enemy_delay_ms: Option<u64>,
    #[serde(default)]
    pub locale: Option<Locale>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TranscriptConfig {
    pub path: PathBuf,
}
