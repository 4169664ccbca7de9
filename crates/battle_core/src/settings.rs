use std::time::Duration;

use bevy::prelude::{FromWorld, Resource, World};
use rand::{rngs::StdRng, RngCore, SeedableRng};

use crate::narration::Locale;

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_ENEMY_DELAY: Duration = Duration::from_millis(1000);

#[derive(Resource, Clone, Debug, PartialEq)]
pub struct BattleSettings {
    pub seed: u64,
    pub enemy_delay: Duration,
    pub locale: Locale,
}

impl BattleSettings {
    pub fn from_env() -> Self {
        let seed = std::env::var("BATTLE_SEED")
            .ok()
            .and_then(|val| val.parse().ok())
            .unwrap_or(DEFAULT_SEED);
        let enemy_delay = std::env::var("BATTLE_ENEMY_DELAY_MS")
            .ok()
            .and_then(|val| val.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_ENEMY_DELAY);
        let locale = std::env::var("BATTLE_LOCALE")
            .ok()
            .and_then(|val| val.parse().ok())
            .unwrap_or_default();
        Self {
            seed,
            enemy_delay,
            locale,
        }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }
}

impl Default for BattleSettings {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            enemy_delay: DEFAULT_ENEMY_DELAY,
            locale: Locale::default(),
        }
    }
}

/// Seeded source for every random choice in a battle.
#[derive(Resource, Debug)]
pub struct BattleRng {
    seed: u64,
    rng: StdRng,
}

impl BattleRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RngCore for BattleRng {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

impl FromWorld for BattleRng {
    fn from_world(world: &mut World) -> Self {
        let seed = world
            .get_resource::<BattleSettings>()
            .cloned()
            .unwrap_or_default()
            .seed;
        Self::new(seed)
    }
}
