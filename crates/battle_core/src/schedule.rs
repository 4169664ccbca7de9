use std::time::Duration;

use bevy::time::{Timer, TimerMode};
use serde::{Deserialize, Serialize};

/// Identifies one battle within a [`crate::session::BattleSession`]. Starting
/// a new battle issues a new id, which invalidates anything scheduled for the
/// previous one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl SessionId {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// An enemy turn waiting for its delay to elapse, tagged with the battle it
/// was scheduled for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduledEnemyTurn {
    session: SessionId,
    timer: Timer,
}

impl ScheduledEnemyTurn {
    pub fn new(session: SessionId, delay: Duration) -> Self {
        Self {
            session,
            timer: Timer::new(delay, TimerMode::Once),
        }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn remaining(&self) -> Duration {
        self.timer.remaining()
    }

    /// Returns true once the delay has fully elapsed.
    pub fn tick(&mut self, delta: Duration) -> bool {
        self.timer.tick(delta).finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_delay_elapses() {
        let mut pending = ScheduledEnemyTurn::new(SessionId(3), Duration::from_millis(500));
        assert!(!pending.tick(Duration::from_millis(200)));
        assert_eq!(pending.remaining(), Duration::from_millis(300));
        assert!(pending.tick(Duration::from_millis(400)));
        assert_eq!(pending.remaining(), Duration::ZERO);
    }

    #[test]
    fn stays_finished_after_firing() {
        let mut pending = ScheduledEnemyTurn::new(SessionId(1), Duration::from_millis(100));
        assert!(pending.tick(Duration::from_millis(250)));
        assert!(pending.tick(Duration::ZERO));
        assert_eq!(pending.session(), SessionId(1));
    }

    #[test]
    fn zero_delay_fires_immediately() {
        let mut pending = ScheduledEnemyTurn::new(SessionId::default(), Duration::ZERO);
        assert!(pending.tick(Duration::ZERO));
    }
}
