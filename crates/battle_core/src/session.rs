use std::time::Duration;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::combatant::{Combatant, Side};
use crate::engine::{BattleState, TurnReport};
use crate::error::{ActionRejected, BattleError};
use crate::narration::Locale;
use crate::schedule::{ScheduledEnemyTurn, SessionId};

/// Owns the current battle (if any) and the enemy's pending reply.
///
/// The enemy never acts on request. After a successful player action that
/// hands the turn over, a reply is scheduled `enemy_delay` ahead and runs from
/// [`BattleSession::tick`]. A frontend with its own clock can instead detach
/// the reply with [`BattleSession::take_pending`] and hand it back to
/// [`BattleSession::run_scheduled`] once it has waited. Starting another battle
/// or ending this one drops the pending reply and invalidates detached ones.
#[derive(Debug, Clone)]
pub struct BattleSession {
    state: Option<BattleState>,
    session: SessionId,
    pending: Option<ScheduledEnemyTurn>,
    enemy_delay: Duration,
    locale: Locale,
}

impl BattleSession {
    pub fn new(enemy_delay: Duration, locale: Locale) -> Self {
        Self {
            state: None,
            session: SessionId::default(),
            pending: None,
            enemy_delay,
            locale,
        }
    }

    pub fn state(&self) -> Option<&BattleState> {
        self.state.as_ref()
    }

    pub fn session_id(&self) -> SessionId {
        self.session
    }

    pub fn enemy_delay(&self) -> Duration {
        self.enemy_delay
    }

    pub fn pending(&self) -> Option<&ScheduledEnemyTurn> {
        self.pending.as_ref()
    }

    pub fn time_until_enemy_turn(&self) -> Option<Duration> {
        self.pending.as_ref().map(ScheduledEnemyTurn::remaining)
    }

    /// Replaces whatever battle was running with a fresh one.
    pub fn start(&mut self, player: &Combatant, enemy: &Combatant) -> Result<SessionId, BattleError> {
        let state = BattleState::new(player, enemy, self.locale)?;
        self.cancel_pending();
        self.session = self.session.next();
        self.state = Some(state);
        info!(target: "battle_core.session", session = self.session.0, "session started");
        Ok(self.session)
    }

    /// Drops the battle and anything scheduled for it.
    pub fn end(&mut self) -> Option<BattleState> {
        self.cancel_pending();
        let state = self.state.take();
        if state.is_some() {
            self.session = self.session.next();
        }
        state
    }

    pub fn cancel_pending(&mut self) -> Option<ScheduledEnemyTurn> {
        let cancelled = self.pending.take();
        if let Some(pending) = &cancelled {
            debug!(
                target: "battle_core.session",
                session = pending.session().0,
                "pending enemy turn cancelled"
            );
        }
        cancelled
    }

    /// Detaches the pending enemy turn so the caller can wait out its delay.
    pub fn take_pending(&mut self) -> Option<ScheduledEnemyTurn> {
        self.pending.take()
    }

    pub fn use_ability(&mut self, index: usize) -> Result<TurnReport, ActionRejected> {
        let state = self.state.as_mut().ok_or(ActionRejected::Uninitialized)?;
        let report = state.use_ability(index)?;
        if !state.game_over && state.active_side() == Side::Enemy {
            self.pending = Some(ScheduledEnemyTurn::new(self.session, self.enemy_delay));
        }
        Ok(report)
    }

    /// Advances the pending enemy turn by `delta` and runs it when due.
    ///
    /// Returns `None` while nothing fired. A stalled enemy consumes the
    /// pending turn without being rescheduled.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        delta: Duration,
        rng: &mut R,
    ) -> Option<Result<TurnReport, ActionRejected>> {
        let pending = self.pending.as_mut()?;
        if !pending.tick(delta) {
            return None;
        }
        let fired = self.pending.take()?;
        self.run_scheduled(fired, rng)
    }

    /// Runs the pending enemy turn now, regardless of the remaining delay.
    pub fn flush<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Result<TurnReport, ActionRejected>> {
        let fired = self.pending.take()?;
        self.run_scheduled(fired, rng)
    }

    /// Runs an enemy turn that was scheduled earlier. Turns scheduled for a
    /// battle that has since been restarted or ended are dropped.
    pub fn run_scheduled<R: Rng + ?Sized>(
        &mut self,
        turn: ScheduledEnemyTurn,
        rng: &mut R,
    ) -> Option<Result<TurnReport, ActionRejected>> {
        if turn.session() != self.session {
            debug!(
                target: "battle_core.session",
                stale = turn.session().0,
                current = self.session.0,
                "discarding stale enemy turn"
            );
            return None;
        }

        let Some(state) = self.state.as_mut() else {
            return Some(Err(ActionRejected::Uninitialized));
        };
        let result = state.enemy_turn(rng);
        if let Err(ActionRejected::NoUsableAbility) = &result {
            warn!(
                target: "battle_core.session",
                enemy = %state.enemy.name,
                turn = state.turn,
                "enemy has nothing ready, battle is stalled"
            );
        }
        Some(result)
    }
}

impl Default for BattleSession {
    fn default() -> Self {
        Self::new(crate::settings::DEFAULT_ENEMY_DELAY, Locale::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::{Ability, AbilityKind};
    use rand::rngs::mock::StepRng;

    const DELAY: Duration = Duration::from_millis(800);

    fn merlin() -> Combatant {
        Combatant::new("Merlin", 100)
            .with_ability(Ability::new("Strike", AbilityKind::Attack, 20, 0))
    }

    fn goblin() -> Combatant {
        Combatant::new("Goblin", 100).with_ability(Ability::new("Stab", AbilityKind::Attack, 10, 0))
    }

    fn rng() -> StepRng {
        StepRng::new(0, 0)
    }

    #[test]
    fn actions_before_start_are_rejected() {
        let mut session = BattleSession::new(DELAY, Locale::En);
        assert_eq!(session.use_ability(0), Err(ActionRejected::Uninitialized));
        assert!(session.tick(DELAY, &mut rng()).is_none());
        assert!(session.state().is_none());
    }

    #[test]
    fn enemy_replies_after_delay() {
        let mut session = BattleSession::new(DELAY, Locale::En);
        session.start(&merlin(), &goblin()).unwrap();
        session.use_ability(0).unwrap();
        assert_eq!(session.time_until_enemy_turn(), Some(DELAY));

        assert!(session.tick(Duration::from_millis(500), &mut rng()).is_none());
        assert_eq!(session.state().unwrap().turn, 1);

        let report = session
            .tick(Duration::from_millis(300), &mut rng())
            .expect("enemy turn fires")
            .unwrap();
        assert_eq!(report.actor, Side::Enemy);
        assert_eq!(session.state().unwrap().turn, 2);
        assert_eq!(session.state().unwrap().player.current_hp, 90);
        assert!(session.pending().is_none());
    }

    #[test]
    fn restart_cancels_pending_enemy_turn() {
        let mut session = BattleSession::new(DELAY, Locale::En);
        let first = session.start(&merlin(), &goblin()).unwrap();
        session.use_ability(0).unwrap();
        let second = session.start(&merlin(), &goblin()).unwrap();
        assert_ne!(first, second);
        assert!(session.pending().is_none());
        assert!(session.tick(DELAY, &mut rng()).is_none());
        assert_eq!(session.state().unwrap().turn, 0);
    }

    #[test]
    fn detached_turn_runs_when_handed_back() {
        let mut session = BattleSession::new(DELAY, Locale::En);
        session.start(&merlin(), &goblin()).unwrap();
        session.use_ability(0).unwrap();

        let turn = session.take_pending().unwrap();
        assert_eq!(turn.remaining(), DELAY);
        assert!(session.pending().is_none());
        assert!(session.tick(DELAY, &mut rng()).is_none());

        let report = session.run_scheduled(turn, &mut rng()).unwrap().unwrap();
        assert_eq!(report.actor, Side::Enemy);
        assert_eq!(session.state().unwrap().turn, 2);
    }

    #[test]
    fn detached_turn_from_previous_battle_is_discarded() {
        let mut session = BattleSession::new(DELAY, Locale::En);
        session.start(&merlin(), &goblin()).unwrap();
        session.use_ability(0).unwrap();
        let stale = session.take_pending().unwrap();

        session.start(&merlin(), &goblin()).unwrap();
        assert_ne!(stale.session(), session.session_id());
        assert!(session.run_scheduled(stale, &mut rng()).is_none());
        let state = session.state().unwrap();
        assert_eq!(state.turn, 0);
        assert_eq!(state.player.current_hp, 100);
        assert_eq!(state.log.len(), 1);
    }

    #[test]
    fn detached_turn_after_end_is_discarded() {
        let mut session = BattleSession::new(DELAY, Locale::En);
        session.start(&merlin(), &goblin()).unwrap();
        session.use_ability(0).unwrap();
        let stale = session.take_pending().unwrap();

        assert!(session.end().is_some());
        assert!(session.run_scheduled(stale, &mut rng()).is_none());
    }

    #[test]
    fn failed_start_keeps_current_battle() {
        let mut session = BattleSession::new(DELAY, Locale::En);
        session.start(&merlin(), &goblin()).unwrap();
        session.use_ability(0).unwrap();
        assert!(session.start(&merlin(), &Combatant::new("Empty", 5)).is_err());
        assert!(session.pending().is_some());
        assert_eq!(session.state().unwrap().turn, 1);
    }

    #[test]
    fn winning_blow_schedules_nothing() {
        let mut frail = goblin();
        frail.current_hp = 5;
        let mut session = BattleSession::new(DELAY, Locale::En);
        session.start(&merlin(), &frail).unwrap();
        let report = session.use_ability(0).unwrap();
        assert!(report.game_over);
        assert!(session.pending().is_none());
    }

    #[test]
    fn stalled_enemy_is_not_rescheduled() {
        let locked = Combatant::new("Golem", 100)
            .with_ability(Ability::new("Slam", AbilityKind::Attack, 30, 1));
        let mut session = BattleSession::new(Duration::ZERO, Locale::En);
        session.start(&merlin(), &locked).unwrap();

        session.use_ability(0).unwrap();
        session.flush(&mut rng()).unwrap().unwrap();
        session.use_ability(0).unwrap();
        assert_eq!(
            session.flush(&mut rng()),
            Some(Err(ActionRejected::NoUsableAbility))
        );
        assert!(session.pending().is_none());
        let state = session.state().unwrap();
        assert_eq!(state.turn, 3);
        assert_eq!(state.log.len(), 4);
    }

    #[test]
    fn end_drops_state_and_schedule() {
        let mut session = BattleSession::new(DELAY, Locale::En);
        session.start(&merlin(), &goblin()).unwrap();
        session.use_ability(0).unwrap();
        assert!(session.end().is_some());
        assert!(session.pending().is_none());
        assert_eq!(session.use_ability(0), Err(ActionRejected::Uninitialized));
    }
}
