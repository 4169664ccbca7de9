use std::fs;

use battle_config::{Difficulty, Roster, RosterError};
use battle_core::{BattleState, Locale, Side};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

const HEROES: &str = r#"
[[characters]]
name = "Apprentice"
max_hp = 40
[[characters.abilities]]
name = "Spark"
type = "attack"
power = 6
[[characters.abilities]]
name = "Patch Up"
type = "heal"
power = 5
cooldown = 2
"#;

const FOES: &str = r#"
[enemies.easy]
name = "Rat"
max_hp = 12
[[enemies.easy.abilities]]
name = "Bite"
type = "attack"
power = 2

[enemies.normal]
name = "Wolf"
max_hp = 24
[[enemies.normal.abilities]]
name = "Maul"
type = "attack"
power = 4

[enemies.hard]
name = "Bear"
max_hp = 48
[[enemies.hard.abilities]]
name = "Swipe"
type = "attack"
power = 8
"#;

fn roster_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("enemies")).unwrap();
    dir
}

#[test]
fn directory_rosters_are_merged() {
    let dir = roster_dir();
    fs::write(dir.path().join("heroes.toml"), HEROES).unwrap();
    fs::write(dir.path().join("enemies").join("tiers.toml"), FOES).unwrap();
    fs::write(dir.path().join("notes.txt"), "not a roster").unwrap();

    let roster = Roster::from_path(dir.path()).unwrap();
    assert_eq!(roster.characters().len(), 1);
    assert_eq!(roster.enemy(Difficulty::Normal).unwrap().name, "Wolf");

    let player = roster.character("apprentice").unwrap();
    let enemy = roster.enemy(Difficulty::Easy).unwrap();
    let mut state = BattleState::new(&player, &enemy, Locale::En).unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    while !state.game_over {
        let choice = state.player.ready_abilities()[0];
        state.use_ability(choice).unwrap();
        if !state.game_over {
            state.enemy_turn(&mut rng).unwrap();
        }
    }
    assert_eq!(state.winner(), Some(Side::Player));
}

#[test]
fn tier_defined_twice_across_files_is_rejected() {
    let dir = roster_dir();
    fs::write(dir.path().join("a.toml"), format!("{HEROES}\n{FOES}")).unwrap();
    fs::write(dir.path().join("enemies").join("b.toml"), FOES).unwrap();

    let err = Roster::from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, RosterError::DuplicateTier(Difficulty::Easy)));
}
