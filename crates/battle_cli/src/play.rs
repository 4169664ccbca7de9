use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use battle_config::{BattleTranscript, GameConfig, Roster};
use battle_core::{
    ActionRejected, BattleRng, BattleSession, BattleSettings, BattleState, Side, TurnReport,
};
use chrono::Utc;
use rand::Rng;
use tracing::info;

use crate::PlayArgs;

enum PlayerChoice {
    Ability(usize),
    Quit,
}

pub fn handle_play<R: BufRead, W: Write>(args: &PlayArgs, mut input: R, mut out: W) -> Result<()> {
    let config = match &args.config {
        Some(path) => GameConfig::from_path(path)?,
        None => GameConfig::default(),
    };
    let mut settings = BattleSettings::from_env();
    config.apply_to(&mut settings);
    if let Some(seed) = args.seed {
        settings.seed = seed;
    }
    if let Some(delay) = args.delay_ms {
        settings.enemy_delay = Duration::from_millis(delay);
    }
    if let Some(locale) = args.locale {
        settings.locale = locale;
    }

    let roster = match &args.roster {
        Some(path) => Roster::from_path(path)
            .with_context(|| format!("failed to load roster from {}", path.display()))?,
        None => config.load_roster()?,
    };
    let player = roster.character(&args.character)?;
    let enemy = roster.enemy(args.difficulty)?;

    let mut rng = BattleRng::new(settings.seed);
    let mut session = BattleSession::new(settings.enemy_delay, settings.locale);
    session.start(&player, &enemy)?;
    info!(target: "battle_cli", seed = settings.seed, difficulty = %args.difficulty, "battle begins");

    writeln!(out, "{} vs {} ({})", player.name, enemy.name, args.difficulty)?;
    if let Some(state) = session.state() {
        for line in &state.log {
            writeln!(out, "{line}")?;
        }
    }

    let mut turns: Vec<TurnReport> = Vec::new();
    loop {
        let Some(state) = session.state() else {
            break;
        };
        if state.game_over || state.turn >= args.max_turns {
            break;
        }

        match state.active_side() {
            Side::Player => {
                if state.player.ready_abilities().is_empty() {
                    writeln!(out, "{} has nothing ready. The battle is stuck.", state.player.name)?;
                    break;
                }
                write_status(&mut out, state)?;
                let choice = if args.auto {
                    let ready = state.player.ready_abilities();
                    PlayerChoice::Ability(ready[rng.gen_range(0..ready.len())])
                } else {
                    prompt_choice(&mut input, &mut out, state)?
                };
                let PlayerChoice::Ability(index) = choice else {
                    writeln!(out, "You fled the battle.")?;
                    break;
                };
                match session.use_ability(index) {
                    Ok(report) => {
                        writeln!(out, "{}", report.log_entry)?;
                        turns.push(report);
                    }
                    Err(rejection) => writeln!(out, "Cannot do that: {rejection}")?,
                }
            }
            Side::Enemy => {
                let Some(scheduled) = session.take_pending() else {
                    break;
                };
                let wait = scheduled.remaining();
                if !wait.is_zero() {
                    out.flush()?;
                    thread::sleep(wait);
                }
                match session.run_scheduled(scheduled, &mut rng) {
                    Some(Ok(report)) => {
                        writeln!(out, "{}", report.log_entry)?;
                        turns.push(report);
                    }
                    Some(Err(ActionRejected::NoUsableAbility)) => {
                        writeln!(out, "{} has nothing ready. The battle is stuck.", enemy.name)?;
                        break;
                    }
                    Some(Err(rejection)) => {
                        writeln!(out, "Enemy turn skipped: {rejection}")?;
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    let Some(state) = session.end() else {
        return Ok(());
    };
    let run_id = format!("battle-{}", Utc::now().format("%Y%m%dT%H%M%S"));
    let transcript = BattleTranscript::new(run_id, settings.seed, args.difficulty, &state, turns);
    writeln!(out, "{}", transcript.summary_line())?;

    let target: Option<PathBuf> = args
        .transcript
        .clone()
        .or_else(|| config.transcript.as_ref().map(|t| t.path.clone()));
    if let Some(path) = target {
        transcript.write(&path)?;
        writeln!(out, "Transcript written to {}", path.display())?;
    }
    Ok(())
}

fn write_status<W: Write>(out: &mut W, state: &BattleState) -> Result<()> {
    writeln!(
        out,
        "-- turn {} | {} {}/{} HP, {} shield | {} {}/{} HP, {} shield",
        state.turn,
        state.player.name,
        state.player.current_hp,
        state.player.max_hp,
        state.player.shield,
        state.enemy.name,
        state.enemy.current_hp,
        state.enemy.max_hp,
        state.enemy.shield,
    )?;
    Ok(())
}

fn prompt_choice<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    state: &BattleState,
) -> Result<PlayerChoice> {
    loop {
        for (idx, ability) in state.player.abilities.iter().enumerate() {
            let status = if ability.is_ready() {
                "ready".to_string()
            } else {
                format!("{} turn(s)", ability.current_cooldown)
            };
            writeln!(
                out,
                "  {}. {} ({} {}) [{status}]",
                idx + 1,
                ability.name,
                ability.kind,
                ability.power
            )?;
        }
        write!(out, "Choose an ability (q to flee): ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(PlayerChoice::Quit);
        }
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Ok(PlayerChoice::Quit);
        }
        match line.parse::<usize>() {
            Ok(n) if (1..=state.player.abilities.len()).contains(&n) => {
                return Ok(PlayerChoice::Ability(n - 1));
            }
            _ => writeln!(out, "Pick a number between 1 and {}.", state.player.abilities.len())?,
        }
    }
}
