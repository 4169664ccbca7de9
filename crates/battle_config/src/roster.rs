use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use battle_core::{Ability, AbilityKind, Combatant, CombatantError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

const BUILTIN_ROSTER: &str = include_str!("../roster/default.toml");

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" | "medium" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            other => Err(RosterError::UnknownTier(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("failed to read roster file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse roster {origin}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to walk roster directory")]
    Walk(#[from] walkdir::Error),
    #[error("roster entry {name} is invalid")]
    InvalidCombatant {
        name: String,
        #[source]
        source: CombatantError,
    },
    #[error("character {0} is defined more than once")]
    DuplicateCharacter(String),
    #[error("enemy for difficulty {0} is defined more than once")]
    DuplicateTier(Difficulty),
    #[error("unknown difficulty {0:?} (expected easy, normal or hard)")]
    UnknownTier(String),
    #[error("no enemy defined for difficulty {0}")]
    MissingTier(Difficulty),
    #[error("roster defines no characters")]
    NoCharacters,
    #[error("no character named {0:?}")]
    UnknownCharacter(String),
}

#[derive(Debug, Default, Deserialize)]
struct RosterFile {
    #[serde(default)]
    characters: Vec<CombatantTemplate>,
    #[serde(default)]
    enemies: BTreeMap<String, CombatantTemplate>,
}

#[derive(Debug, Clone, Deserialize)]
struct CombatantTemplate {
    name: String,
    #[serde(default)]
    image: String,
    #[serde(default)]
    quote: String,
    max_hp: u32,
    #[serde(default)]
    current_hp: Option<u32>,
    abilities: Vec<AbilityTemplate>,
}

#[derive(Debug, Clone, Deserialize)]
struct AbilityTemplate {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "type")]
    kind: AbilityKind,
    power: u32,
    #[serde(default)]
    cooldown: u32,
}

impl CombatantTemplate {
    fn build(self) -> Result<Combatant, RosterError> {
        let mut combatant = Combatant::new(self.name, self.max_hp);
        combatant.image = self.image;
        combatant.quote = self.quote;
        if let Some(hp) = self.current_hp {
            combatant.current_hp = hp;
        }
        combatant.abilities = self
            .abilities
            .into_iter()
            .map(|a| Ability::new(a.name, a.kind, a.power, a.cooldown).with_description(a.description))
            .collect();
        combatant
            .validate()
            .map_err(|source| RosterError::InvalidCombatant {
                name: combatant.name.clone(),
                source,
            })?;
        Ok(combatant)
    }
}

/// Selectable characters plus one enemy per difficulty.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    characters: Vec<Combatant>,
    enemies: BTreeMap<Difficulty, Combatant>,
}

impl Roster {
    pub fn builtin() -> Result<Self, RosterError> {
        Self::parse(BUILTIN_ROSTER, "<builtin>")
    }

    pub fn from_path(path: &Path) -> Result<Self, RosterError> {
        if path.is_dir() {
            return Self::from_dir(path);
        }
        let data = fs::read_to_string(path).map_err(|source| RosterError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&data, &path.display().to_string())
    }

    /// Merges every `*.toml` file under `root`, visited in file-name order.
    pub fn from_dir(root: &Path) -> Result<Self, RosterError> {
        let mut roster = Roster::default();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file() || !path.extension().is_some_and(|ext| ext == "toml") {
                continue;
            }
            debug!(target: "battle_config.roster", path = %path.display(), "loading roster file");
            let data = fs::read_to_string(path).map_err(|source| RosterError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            roster.merge(parse_file(&data, &path.display().to_string())?)?;
        }
        roster.ensure_complete()?;
        Ok(roster)
    }

    fn parse(data: &str, origin: &str) -> Result<Self, RosterError> {
        let mut roster = Roster::default();
        roster.merge(parse_file(data, origin)?)?;
        roster.ensure_complete()?;
        info!(
            target: "battle_config.roster",
            origin,
            characters = roster.characters.len(),
            "roster loaded"
        );
        Ok(roster)
    }

    fn merge(&mut self, file: RosterFile) -> Result<(), RosterError> {
        for template in file.characters {
            let character = template.build()?;
            if self.find_character(&character.name).is_some() {
                return Err(RosterError::DuplicateCharacter(character.name));
            }
            self.characters.push(character);
        }
        for (tier, template) in file.enemies {
            let tier: Difficulty = tier.parse()?;
            if self.enemies.contains_key(&tier) {
                return Err(RosterError::DuplicateTier(tier));
            }
            self.enemies.insert(tier, template.build()?);
        }
        Ok(())
    }

    fn ensure_complete(&self) -> Result<(), RosterError> {
        if self.characters.is_empty() {
            return Err(RosterError::NoCharacters);
        }
        for tier in Difficulty::ALL {
            if !self.enemies.contains_key(&tier) {
                return Err(RosterError::MissingTier(tier));
            }
        }
        Ok(())
    }

    fn find_character(&self, name: &str) -> Option<&Combatant> {
        self.characters
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn characters(&self) -> &[Combatant] {
        &self.characters
    }

    /// Case-insensitive lookup by name.
    pub fn character(&self, name: &str) -> Result<Combatant, RosterError> {
        self.find_character(name)
            .cloned()
            .ok_or_else(|| RosterError::UnknownCharacter(name.to_string()))
    }

    pub fn enemy(&self, tier: Difficulty) -> Result<Combatant, RosterError> {
        self.enemies
            .get(&tier)
            .cloned()
            .ok_or(RosterError::MissingTier(tier))
    }

    pub fn enemies(&self) -> impl Iterator<Item = (Difficulty, &Combatant)> {
        self.enemies.iter().map(|(tier, enemy)| (*tier, enemy))
    }
}

fn parse_file(data: &str, origin: &str) -> Result<RosterFile, RosterError> {
    toml::from_str(data).map_err(|source| RosterError::Parse {
        origin: origin.to_string(),
        source,
    })
}
