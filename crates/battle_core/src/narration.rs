//! Log lines shown to the player, one per resolved action.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Zh,
}

impl Locale {
    pub fn as_str(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Zh => "zh",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown locale {0:?} (expected en or zh)")]
pub struct UnknownLocale(pub String);

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" | "english" => Ok(Locale::En),
            "zh" | "zh-cn" | "chinese" => Ok(Locale::Zh),
            other => Err(UnknownLocale(other.to_string())),
        }
    }
}

/// The numeric part of a resolved ability, as it should be narrated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Clause {
    Damage { dealt: u32, absorbed: u32 },
    Heal { restored: u32 },
    Shield { gained: u32 },
    NoEffect,
}

pub fn battle_started(locale: Locale) -> String {
    match locale {
        Locale::En => "Battle started".to_string(),
        Locale::Zh => "战斗开始".to_string(),
    }
}

pub fn ability_used(locale: Locale, source: &str, ability: &str, clause: Clause) -> String {
    let mut line = match locale {
        Locale::En => format!("{source} used {ability}"),
        Locale::Zh => format!("{source}使用了{ability}"),
    };
    match (locale, clause) {
        (Locale::En, Clause::Damage { dealt, absorbed }) => {
            line.push_str(&format!(", dealing {dealt} damage"));
            if absorbed > 0 {
                line.push_str(&format!(" ({absorbed} absorbed by shield)"));
            }
        }
        (Locale::En, Clause::Heal { restored }) => {
            line.push_str(&format!(", restoring {restored} HP"));
        }
        (Locale::En, Clause::Shield { gained }) => {
            line.push_str(&format!(", gaining {gained} shield"));
        }
        (Locale::En, Clause::NoEffect) => line.push_str(", but nothing happened"),
        (Locale::Zh, Clause::Damage { dealt, absorbed }) => {
            line.push_str(&format!("，造成{dealt}点伤害"));
            if absorbed > 0 {
                line.push_str(&format!("（护盾吸收{absorbed}点）"));
            }
        }
        (Locale::Zh, Clause::Heal { restored }) => {
            line.push_str(&format!("，恢复{restored}点生命"));
        }
        (Locale::Zh, Clause::Shield { gained }) => {
            line.push_str(&format!("，获得{gained}点护盾"));
        }
        (Locale::Zh, Clause::NoEffect) => line.push_str("，但什么也没有发生"),
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_lines() {
        assert_eq!(battle_started(Locale::En), "Battle started");
        assert_eq!(
            ability_used(
                Locale::En,
                "Merlin",
                "Fireball",
                Clause::Damage {
                    dealt: 5,
                    absorbed: 15
                }
            ),
            "Merlin used Fireball, dealing 5 damage (15 absorbed by shield)"
        );
        assert_eq!(
            ability_used(Locale::En, "Merlin", "Mend", Clause::Heal { restored: 10 }),
            "Merlin used Mend, restoring 10 HP"
        );
    }

    #[test]
    fn locale_parses_loosely() {
        assert_eq!("EN".parse::<Locale>(), Ok(Locale::En));
        assert_eq!(" zh-CN ".parse::<Locale>(), Ok(Locale::Zh));
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn chinese_lines() {
        assert_eq!(
            ability_used(Locale::Zh, "梅林", "火球", Clause::Shield { gained: 8 }),
            "梅林使用了火球，获得8点护盾"
        );
    }
}
