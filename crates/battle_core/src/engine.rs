use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::combatant::{Combatant, Side};
use crate::effect::{apply_ability, AbilityOutcome, Effect};
use crate::error::{ActionRejected, BattleError};
use crate::narration::{self, Locale};

/// Everything the presentation layer needs after an action resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnReport {
    pub actor: Side,
    pub ability: String,
    pub effect: Option<Effect>,
    pub log_entry: String,
    /// Turn counter after the action.
    pub turn: u32,
    pub game_over: bool,
}

/// One battle between a player and an enemy.
///
/// Even turns belong to the player and odd turns to the enemy. Operations
/// that are refused leave every field untouched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleState {
    pub player: Combatant,
    pub enemy: Combatant,
    pub turn: u32,
    pub log: Vec<String>,
    pub last_attacker: Option<Side>,
    pub last_effect: Option<Effect>,
    pub game_over: bool,
    pub locale: Locale,
}

impl BattleState {
    pub fn new(player: &Combatant, enemy: &Combatant, locale: Locale) -> Result<Self, BattleError> {
        player.validate().map_err(BattleError::InvalidPlayer)?;
        enemy.validate().map_err(BattleError::InvalidEnemy)?;

        info!(
            target: "battle_core.engine",
            player = %player.name,
            enemy = %enemy.name,
            "battle started"
        );
        Ok(Self {
            player: player.for_battle(),
            enemy: enemy.for_battle(),
            turn: 0,
            log: vec![narration::battle_started(locale)],
            last_attacker: None,
            last_effect: None,
            game_over: false,
            locale,
        })
    }

    pub fn active_side(&self) -> Side {
        if self.turn % 2 == 0 {
            Side::Player
        } else {
            Side::Enemy
        }
    }

    pub fn combatant(&self, side: Side) -> &Combatant {
        match side {
            Side::Player => &self.player,
            Side::Enemy => &self.enemy,
        }
    }

    pub fn winner(&self) -> Option<Side> {
        if self.enemy.is_defeated() {
            Some(Side::Player)
        } else if self.player.is_defeated() {
            Some(Side::Enemy)
        } else {
            None
        }
    }

    /// True when it is the enemy's move and it has nothing off cooldown.
    pub fn enemy_stalled(&self) -> bool {
        !self.game_over
            && self.active_side() == Side::Enemy
            && self.enemy.ready_abilities().is_empty()
    }

    /// Player casts the ability at `index` in their ability list.
    pub fn use_ability(&mut self, index: usize) -> Result<TurnReport, ActionRejected> {
        self.guard(Side::Player)?;
        let ability = self
            .player
            .abilities
            .get(index)
            .ok_or(ActionRejected::UnknownAbility { index })?;
        if !ability.is_ready() {
            let rejection = ActionRejected::OnCooldown {
                ability: ability.name.clone(),
                remaining: ability.current_cooldown,
            };
            debug!(target: "battle_core.engine", %rejection, "player action refused");
            return Err(rejection);
        }

        let outcome = apply_ability(&self.player, &self.enemy, index, Side::Player, self.locale)?;
        Ok(self.commit(Side::Player, index, outcome))
    }

    /// Enemy picks uniformly among its ready abilities using `rng`.
    ///
    /// With nothing ready the enemy forfeits: no log entry is written and the
    /// turn counter stays put, so the battle does not progress.
    pub fn enemy_turn<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<TurnReport, ActionRejected> {
        self.guard(Side::Enemy)?;
        let ready = self.enemy.ready_abilities();
        if ready.is_empty() {
            debug!(
                target: "battle_core.engine",
                enemy = %self.enemy.name,
                turn = self.turn,
                "enemy has no ready ability"
            );
            return Err(ActionRejected::NoUsableAbility);
        }

        let index = ready[rng.gen_range(0..ready.len())];
        let outcome = apply_ability(&self.enemy, &self.player, index, Side::Enemy, self.locale)?;
        Ok(self.commit(Side::Enemy, index, outcome))
    }

    fn guard(&self, side: Side) -> Result<(), ActionRejected> {
        if self.game_over {
            return Err(ActionRejected::GameOver);
        }
        let active = self.active_side();
        if active != side {
            return Err(ActionRejected::NotYourTurn { active });
        }
        Ok(())
    }

    fn commit(&mut self, actor: Side, index: usize, outcome: AbilityOutcome) -> TurnReport {
        let ability = outcome.source.abilities[index].name.clone();
        let AbilityOutcome {
            source,
            target,
            effect,
            log_entry,
        } = outcome;

        match actor {
            Side::Player => {
                self.player = source;
                self.enemy = target;
            }
            Side::Enemy => {
                self.enemy = source;
                self.player = target;
            }
        }
        self.log.push(log_entry.clone());
        self.last_attacker = Some(actor);
        self.last_effect = effect;
        self.game_over = self.combatant(actor.opponent()).is_defeated();
        self.turn += 1;

        info!(
            target: "battle_core.turn",
            turn = self.turn,
            actor = ?actor,
            %ability,
            player_hp = self.player.current_hp,
            enemy_hp = self.enemy.current_hp,
            game_over = self.game_over,
            "{log_entry}"
        );
        TurnReport {
            actor,
            ability,
            effect,
            log_entry,
            turn: self.turn,
            game_over: self.game_over,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::{Ability, AbilityKind};
    use crate::effect::EffectKind;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn player() -> Combatant {
        Combatant::new("Merlin", 100)
            .with_ability(Ability::new("Strike", AbilityKind::Attack, 20, 0))
            .with_ability(Ability::new("Meteor", AbilityKind::Attack, 40, 3))
            .with_ability(Ability::new("Mend", AbilityKind::Heal, 25, 2))
    }

    fn enemy() -> Combatant {
        Combatant::new("Goblin", 60)
            .with_ability(Ability::new("Stab", AbilityKind::Attack, 10, 0))
            .with_ability(Ability::new("Cower", AbilityKind::Shield, 15, 2))
    }

    fn first() -> StepRng {
        StepRng::new(0, 0)
    }

    fn battle() -> BattleState {
        BattleState::new(&player(), &enemy(), Locale::En).unwrap()
    }

    #[test]
    fn new_battle_starts_on_player_turn() {
        let mut worn = enemy();
        worn.shield = 30;
        let state = BattleState::new(&player(), &worn, Locale::En).unwrap();
        assert_eq!(state.turn, 0);
        assert_eq!(state.active_side(), Side::Player);
        assert_eq!(state.log, vec!["Battle started".to_string()]);
        assert_eq!(state.last_attacker, None);
        assert_eq!(state.last_effect, None);
        assert!(!state.game_over);
        assert_eq!(state.enemy.shield, 0);
    }

    #[test]
    fn invalid_combatants_are_refused() {
        let buffer = enemy().with_ability(Ability::new("Rally", AbilityKind::Buff, 3, 1));
        assert!(matches!(
            BattleState::new(&player(), &buffer, Locale::En),
            Err(BattleError::InvalidEnemy(_))
        ));
    }

    #[test]
    fn player_action_advances_turn() {
        let mut state = battle();
        let report = state.use_ability(0).unwrap();
        assert_eq!(report.turn, 1);
        assert_eq!(report.actor, Side::Player);
        assert_eq!(state.enemy.current_hp, 40);
        assert_eq!(state.last_attacker, Some(Side::Player));
        assert_eq!(
            state.last_effect,
            Some(Effect {
                kind: EffectKind::Damage,
                target: Side::Enemy,
                value: 20
            })
        );
        assert_eq!(state.log.len(), 2);
        assert_eq!(state.log[1], "Merlin used Strike, dealing 20 damage");
    }

    #[test]
    fn out_of_turn_actions_change_nothing() {
        let mut state = battle();
        let before = state.clone();
        assert_eq!(
            state.enemy_turn(&mut first()),
            Err(ActionRejected::NotYourTurn {
                active: Side::Player
            })
        );
        assert_eq!(state, before);

        state.use_ability(0).unwrap();
        let before = state.clone();
        assert_eq!(
            state.use_ability(0),
            Err(ActionRejected::NotYourTurn {
                active: Side::Enemy
            })
        );
        assert_eq!(state, before);
    }

    #[test]
    fn cooldown_blocks_reuse_until_ready() {
        let mut tank = enemy();
        tank.max_hp = 300;
        tank.current_hp = 300;
        let mut state = BattleState::new(&player(), &tank, Locale::En).unwrap();
        state.use_ability(1).unwrap();
        assert_eq!(state.player.abilities[1].current_cooldown, 3);

        state.enemy_turn(&mut first()).unwrap();
        let before = state.clone();
        assert_eq!(
            state.use_ability(1),
            Err(ActionRejected::OnCooldown {
                ability: "Meteor".into(),
                remaining: 3
            })
        );
        assert_eq!(state, before);

        state.use_ability(0).unwrap();
        assert_eq!(state.player.abilities[1].current_cooldown, 2);
        state.enemy_turn(&mut first()).unwrap();
        assert!(state.use_ability(1).is_err(), "turn 4 still cooling");

        state.use_ability(0).unwrap();
        state.enemy_turn(&mut first()).unwrap();
        state.use_ability(0).unwrap();
        assert_eq!(state.player.abilities[1].current_cooldown, 0);
    }

    #[test]
    fn game_over_is_terminal() {
        let mut weak = enemy();
        weak.current_hp = 15;
        let mut state = BattleState::new(&player(), &weak, Locale::En).unwrap();
        let report = state.use_ability(0).unwrap();
        assert!(report.game_over);
        assert!(state.game_over);
        assert_eq!(state.winner(), Some(Side::Player));

        let before = state.clone();
        assert_eq!(
            state.enemy_turn(&mut first()),
            Err(ActionRejected::GameOver)
        );
        assert_eq!(state.use_ability(0), Err(ActionRejected::GameOver));
        assert_eq!(state, before);
    }

    #[test]
    fn enemy_picks_among_ready_abilities() {
        let mut state = battle();
        state.use_ability(0).unwrap();
        let report = state.enemy_turn(&mut first()).unwrap();
        assert_eq!(report.ability, "Stab");
        assert_eq!(state.player.current_hp, 90);
        assert_eq!(state.turn, 2);
        assert_eq!(state.last_attacker, Some(Side::Enemy));
    }

    #[test]
    fn seeded_enemy_only_casts_ready_abilities() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut sturdy = player();
        sturdy.abilities = vec![Ability::new("Shield", AbilityKind::Shield, 5, 0)];
        let mut state = BattleState::new(&sturdy, &enemy(), Locale::En).unwrap();
        for _ in 0..10 {
            state.use_ability(0).unwrap();
            let cower_ready = state.enemy.abilities[1].is_ready();
            let report = state.enemy_turn(&mut rng).unwrap();
            if !cower_ready {
                assert_eq!(report.ability, "Stab");
            }
        }
        assert_eq!(state.turn, 20);
    }

    #[test]
    fn enemy_with_nothing_ready_stalls() {
        let mut state = battle();
        state.use_ability(0).unwrap();
        for ability in &mut state.enemy.abilities {
            ability.cooldown = 2;
            ability.current_cooldown = 2;
        }
        assert!(state.enemy_stalled());
        let before = state.clone();
        assert_eq!(
            state.enemy_turn(&mut first()),
            Err(ActionRejected::NoUsableAbility)
        );
        assert_eq!(state, before);
        assert_eq!(state.turn % 2, 1);
    }

    #[test]
    fn enemy_heal_does_not_end_battle() {
        let healer = Combatant::new("Troll", 80)
            .with_ability(Ability::new("Regrow", AbilityKind::Heal, 30, 0));
        let mut hurt = player();
        hurt.current_hp = 1;
        let mut state = BattleState::new(&hurt, &healer, Locale::En).unwrap();
        state.use_ability(0).unwrap();
        let report = state.enemy_turn(&mut first()).unwrap();
        assert!(!report.game_over);
        assert_eq!(state.enemy.current_hp, 80);
        assert_eq!(
            state.last_effect,
            Some(Effect {
                kind: EffectKind::Heal,
                target: Side::Enemy,
                value: 20
            })
        );
    }
}
