use bevy::prelude::*;

use crate::combatant::Combatant;
use crate::engine::TurnReport;
use crate::session::BattleSession;
use crate::settings::{BattleRng, BattleSettings};

/// Runs battles inside a Bevy app. Frontends send [`StartBattle`] and
/// [`PlayerAbility`] events and read [`TurnResolved`]; the enemy replies on
/// its own once the configured delay has passed in `Time`.
pub struct BattlePlugin;

impl Plugin for BattlePlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<BattleSettings>() {
            app.insert_resource(BattleSettings::from_env());
        }

        app.init_resource::<BattleRng>()
            .init_resource::<ActiveBattle>()
            .add_event::<StartBattle>()
            .add_event::<PlayerAbility>()
            .add_event::<TurnResolved>()
            .add_systems(
                Update,
                (start_battles, resolve_player_abilities, run_enemy_turns).chain(),
            );
    }
}

#[derive(Event, Clone, Debug)]
pub struct StartBattle {
    pub player: Combatant,
    pub enemy: Combatant,
}

#[derive(Event, Clone, Copy, Debug)]
pub struct PlayerAbility {
    pub index: usize,
}

#[derive(Event, Clone, Debug)]
pub struct TurnResolved(pub TurnReport);

#[derive(Resource, Debug, Deref, DerefMut)]
pub struct ActiveBattle(pub BattleSession);

impl FromWorld for ActiveBattle {
    fn from_world(world: &mut World) -> Self {
        let settings = world
            .get_resource::<BattleSettings>()
            .cloned()
            .unwrap_or_default();
        Self(BattleSession::new(settings.enemy_delay, settings.locale))
    }
}

fn start_battles(mut requests: EventReader<StartBattle>, mut battle: ResMut<ActiveBattle>) {
    // Only the most recent request in a frame matters.
    let Some(request) = requests.read().last() else {
        return;
    };
    if let Err(err) = battle.start(&request.player, &request.enemy) {
        warn!(target: "battle_core.plugin", "battle not started: {err}");
    }
}

fn resolve_player_abilities(
    mut requests: EventReader<PlayerAbility>,
    mut battle: ResMut<ActiveBattle>,
    mut resolved: EventWriter<TurnResolved>,
) {
    for request in requests.read() {
        match battle.use_ability(request.index) {
            Ok(report) => {
                resolved.send(TurnResolved(report));
            }
            Err(rejection) => {
                debug!(target: "battle_core.plugin", index = request.index, "ignored: {rejection}");
            }
        }
    }
}

fn run_enemy_turns(
    time: Res<Time>,
    mut rng: ResMut<BattleRng>,
    mut battle: ResMut<ActiveBattle>,
    mut resolved: EventWriter<TurnResolved>,
) {
    match battle.tick(time.delta(), &mut *rng) {
        Some(Ok(report)) => {
            resolved.send(TurnResolved(report));
        }
        Some(Err(rejection)) => {
            debug!(target: "battle_core.plugin", "enemy turn skipped: {rejection}");
        }
        None => {}
    }
}
