mod play;

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use battle_config::{BattleTranscript, Difficulty, Roster};
use battle_core::{Combatant, Locale};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Turn-based wizard duels in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List playable characters and the enemy fielded at each difficulty.
    Roster(RosterArgs),
    /// Fight a battle against the enemy of the chosen difficulty.
    Play(PlayArgs),
    /// Pretty-print a saved battle transcript.
    Report(ReportArgs),
}

#[derive(Args)]
struct RosterArgs {
    /// Roster file or directory of roster files. Defaults to the built-in roster.
    #[arg(long)]
    roster: Option<PathBuf>,
    /// Print the roster as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
pub struct PlayArgs {
    #[arg(long)]
    pub character: String,
    #[arg(long, default_value = "normal")]
    pub difficulty: Difficulty,
    #[arg(long)]
    pub seed: Option<u64>,
    /// Milliseconds the enemy waits before replying.
    #[arg(long)]
    pub delay_ms: Option<u64>,
    #[arg(long)]
    pub locale: Option<Locale>,
    /// Let the player side pick random ready abilities.
    #[arg(long)]
    pub auto: bool,
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub roster: Option<PathBuf>,
    /// Where to write the JSON transcript once the battle ends.
    #[arg(long)]
    pub transcript: Option<PathBuf>,
    #[arg(long, default_value_t = 200)]
    pub max_turns: u32,
}

#[derive(Args)]
struct ReportArgs {
    #[arg(long)]
    input: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .try_init()
        .ok();
    let cli = Cli::parse();
    match cli.command {
        Commands::Roster(args) => handle_roster(args),
        Commands::Play(args) => {
            let stdin = io::stdin();
            play::handle_play(&args, stdin.lock(), io::stdout())
        }
        Commands::Report(args) => handle_report(args),
    }
}

fn handle_roster(args: RosterArgs) -> Result<()> {
    let roster = match &args.roster {
        Some(path) => Roster::from_path(path)
            .with_context(|| format!("failed to load roster from {}", path.display()))?,
        None => Roster::builtin()?,
    };

    if args.json {
        let enemies: serde_json::Map<String, serde_json::Value> = roster
            .enemies()
            .map(|(tier, enemy)| serde_json::to_value(enemy).map(|value| (tier.to_string(), value)))
            .collect::<Result<_, _>>()?;
        let value = serde_json::json!({
            "characters": roster.characters(),
            "enemies": enemies,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Characters:");
    for character in roster.characters() {
        print_combatant(character);
    }
    println!("Enemies:");
    for (tier, enemy) in roster.enemies() {
        println!("[{tier}]");
        print_combatant(enemy);
    }
    Ok(())
}

fn print_combatant(combatant: &Combatant) {
    println!("  {} ({} HP)", combatant.name, combatant.max_hp);
    if !combatant.quote.is_empty() {
        println!("    \"{}\"", combatant.quote);
    }
    for (idx, ability) in combatant.abilities.iter().enumerate() {
        println!(
            "    {}. {} [{} {}, cooldown {}] {}",
            idx + 1,
            ability.name,
            ability.kind,
            ability.power,
            ability.cooldown,
            ability.description
        );
    }
}

fn handle_report(args: ReportArgs) -> Result<()> {
    let transcript = BattleTranscript::read(&args.input)?;
    println!("{}", transcript.summary_line());
    for line in &transcript.log {
        println!("  {line}");
    }
    Ok(())
}
