pub mod config;
pub mod roster;
pub mod transcript;

pub use config::{BattleSection, GameConfig, TranscriptConfig};
pub use roster::{Difficulty, Roster, RosterError};
pub use transcript::{BattleTranscript, Outcome, OutcomeStatus};
