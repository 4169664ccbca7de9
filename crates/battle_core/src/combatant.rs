use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which side of the duel a combatant occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::Player => Side::Enemy,
            Side::Enemy => Side::Player,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbilityKind {
    Attack,
    Heal,
    Shield,
    /// Declared by content formats but has no effect rule. Rejected by
    /// [`Combatant::validate`].
    Buff,
}

impl AbilityKind {
    pub fn is_supported(self) -> bool {
        !matches!(self, AbilityKind::Buff)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AbilityKind::Attack => "attack",
            AbilityKind::Heal => "heal",
            AbilityKind::Shield => "shield",
            AbilityKind::Buff => "buff",
        }
    }
}

impl fmt::Display for AbilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ability {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: AbilityKind,
    pub power: u32,
    #[serde(default)]
    pub cooldown: u32,
    #[serde(default)]
    pub current_cooldown: u32,
}

impl Ability {
    pub fn new(name: impl Into<String>, kind: AbilityKind, power: u32, cooldown: u32) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            kind,
            power,
            cooldown,
            current_cooldown: 0,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn is_ready(&self) -> bool {
        self.current_cooldown == 0
    }
}

/// Reserved for timed effects. Nothing reads or writes these yet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub name: String,
    pub turns_remaining: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub quote: String,
    pub max_hp: u32,
    pub current_hp: u32,
    #[serde(default)]
    pub shield: u32,
    pub abilities: Vec<Ability>,
    #[serde(default)]
    pub status_effects: Vec<StatusEffect>,
}

impl Combatant {
    /// A combatant at full health with no abilities yet.
    pub fn new(name: impl Into<String>, max_hp: u32) -> Self {
        Self {
            name: name.into(),
            image: String::new(),
            quote: String::new(),
            max_hp,
            current_hp: max_hp,
            shield: 0,
            abilities: Vec::new(),
            status_effects: Vec::new(),
        }
    }

    pub fn with_ability(mut self, ability: Ability) -> Self {
        self.abilities.push(ability);
        self
    }

    pub fn is_defeated(&self) -> bool {
        self.current_hp == 0
    }

    /// Indices of abilities that can be cast right now, in declaration order.
    pub fn ready_abilities(&self) -> Vec<usize> {
        self.abilities
            .iter()
            .enumerate()
            .filter(|(_, ability)| ability.is_ready())
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Copy used at the start of a battle: no shield, no status effects and
    /// every cooldown cleared. HP is kept as supplied.
    pub fn for_battle(&self) -> Self {
        let mut fresh = self.clone();
        fresh.shield = 0;
        fresh.status_effects.clear();
        for ability in &mut fresh.abilities {
            ability.current_cooldown = 0;
        }
        fresh
    }

    pub fn validate(&self) -> Result<(), CombatantError> {
        if self.max_hp == 0 {
            return Err(CombatantError::ZeroMaxHp {
                name: self.name.clone(),
            });
        }
        if self.current_hp > self.max_hp {
            return Err(CombatantError::HpAboveMax {
                name: self.name.clone(),
                current: self.current_hp,
                max: self.max_hp,
            });
        }
        if self.abilities.is_empty() {
            return Err(CombatantError::NoAbilities {
                name: self.name.clone(),
            });
        }
        for ability in &self.abilities {
            if !ability.kind.is_supported() {
                return Err(CombatantError::UnsupportedAbility {
                    name: self.name.clone(),
                    ability: ability.name.clone(),
                    kind: ability.kind,
                });
            }
            if ability.current_cooldown > ability.cooldown {
                return Err(CombatantError::CooldownOutOfRange {
                    ability: ability.name.clone(),
                    current: ability.current_cooldown,
                    cooldown: ability.cooldown,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombatantError {
    #[error("{name} has a max HP of zero")]
    ZeroMaxHp { name: String },
    #[error("{name} has {current} HP but a maximum of {max}")]
    HpAboveMax { name: String, current: u32, max: u32 },
    #[error("{name} has no abilities")]
    NoAbilities { name: String },
    #[error("{name} declares ability {ability} of unsupported type {kind}")]
    UnsupportedAbility {
        name: String,
        ability: String,
        kind: AbilityKind,
    },
    #[error("ability {ability} has cooldown {current} above its maximum {cooldown}")]
    CooldownOutOfRange {
        ability: String,
        current: u32,
        cooldown: u32,
    },
}
