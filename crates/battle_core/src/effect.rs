//! Resolution of a single ability cast.
//!
//! [`apply_ability`] is pure: it borrows both combatants and returns updated
//! copies, leaving turn bookkeeping to [`crate::engine::BattleState`].

use serde::{Deserialize, Serialize};

use crate::combatant::{AbilityKind, Combatant, Side};
use crate::error::ActionRejected;
use crate::narration::{self, Clause, Locale};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectKind {
    Damage,
    Heal,
    Shield,
}

/// What the most recent action did, for presentation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effect {
    #[serde(rename = "type")]
    pub kind: EffectKind,
    pub target: Side,
    pub value: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AbilityOutcome {
    pub source: Combatant,
    pub target: Combatant,
    pub effect: Option<Effect>,
    pub log_entry: String,
}

pub fn apply_ability(
    source: &Combatant,
    target: &Combatant,
    ability_index: usize,
    source_side: Side,
    locale: Locale,
) -> Result<AbilityOutcome, ActionRejected> {
    let ability = source
        .abilities
        .get(ability_index)
        .cloned()
        .ok_or(ActionRejected::UnknownAbility {
            index: ability_index,
        })?;

    let mut source = source.clone();
    let mut target = target.clone();

    let (effect, clause) = match ability.kind {
        AbilityKind::Attack => {
            let absorbed = ability.power.min(target.shield);
            target.shield -= absorbed;
            let dealt = ability.power - absorbed;
            target.current_hp = target.current_hp.saturating_sub(dealt);
            (
                Some(Effect {
                    kind: EffectKind::Damage,
                    target: source_side.opponent(),
                    value: dealt,
                }),
                Clause::Damage { dealt, absorbed },
            )
        }
        AbilityKind::Heal => {
            let missing = source.max_hp.saturating_sub(source.current_hp);
            let restored = ability.power.min(missing);
            source.current_hp += restored;
            (
                Some(Effect {
                    kind: EffectKind::Heal,
                    target: source_side,
                    value: restored,
                }),
                Clause::Heal { restored },
            )
        }
        AbilityKind::Shield => {
            source.shield = source.shield.saturating_add(ability.power);
            (
                Some(Effect {
                    kind: EffectKind::Shield,
                    target: source_side,
                    value: ability.power,
                }),
                Clause::Shield {
                    gained: ability.power,
                },
            )
        }
        AbilityKind::Buff => (None, Clause::NoEffect),
    };

    tick_cooldowns(&mut source, ability_index);

    let log_entry = narration::ability_used(locale, &source.name, &ability.name, clause);
    Ok(AbilityOutcome {
        source,
        target,
        effect,
        log_entry,
    })
}

/// The cast ability restarts its cooldown; every other cooling ability
/// moves one step closer to ready.
fn tick_cooldowns(source: &mut Combatant, used: usize) {
    for (idx, ability) in source.abilities.iter_mut().enumerate() {
        if idx == used {
            ability.current_cooldown = ability.cooldown;
        } else if ability.current_cooldown > 0 {
            ability.current_cooldown -= 1;
        }
    }
}
