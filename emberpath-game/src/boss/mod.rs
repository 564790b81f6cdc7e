//! Boss roster, scaling, and the campaign progression engine.
use thiserror::Error;

pub mod engine;
pub mod record;
pub mod roster;
pub mod scaling;

pub use engine::{BossProgressEntry, BossProgressionEngine, OutcomeRecord};
pub use record::{BossRecord, BossStats, MechanicKind};
pub use roster::{BossDefinition, BossRoster, RosterError};
pub use scaling::{
    BossCombatant, BossEncounter, CombatStatProvider, ProgressionConfig, ProgressionConfigError,
    Rewards, Scaling,
};

/// Recoverable progression failures. None of them change engine state.
#[derive(Debug, Error, PartialEq)]
pub enum ProgressionError {
    #[error("no boss with id {0}")]
    BossNotFound(String),
    #[error("the final gate needs {required} champion keys but only {held} are held")]
    InsufficientKeys { held: u32, required: u32 },
    #[error("only {removed} of {required} champion keys could be consumed")]
    KeyConsumptionShortfall { removed: u32, required: u32 },
    #[error(transparent)]
    Roster(#[from] RosterError),
    #[error(transparent)]
    Config(#[from] ProgressionConfigError),
}
