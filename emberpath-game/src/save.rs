//! Flat persisted campaign record and the reload path.
//!
//! Only counters and positions are stored. The world is regenerated from
//! its seed, so a save stays valid as long as generation is deterministic.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::boss::{BossProgressEntry, BossProgressionEngine, ProgressionError};
use crate::campaign::Campaign;
use crate::constants::{LOG_WORLD_RESTORED, SAVE_VERSION, STREAM_LOOT};
use crate::rng::RandomSource;
use crate::world::{WorldError, WorldGraph};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignSave {
    #[serde(default = "CampaignSave::default_version")]
    pub version: u32,
    pub seed: u64,
    pub current_node: u32,
    pub bosses: Vec<BossProgressEntry>,
    pub distinct_defeated: u32,
    pub final_gate_unlocked: bool,
    /// ChaCha word position of the loot stream.
    #[serde(default)]
    pub loot_position: u128,
    #[serde(default)]
    pub loot_draws: u64,
}

#[derive(Debug, Error, PartialEq)]
pub enum RestoreError {
    #[error(transparent)]
    World(#[from] WorldError),
    #[error(transparent)]
    Progression(#[from] ProgressionError),
    #[error("save version {found} is not supported (expected {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[error("save is not valid JSON: {0}")]
    Parse(String),
}

impl CampaignSave {
    const fn default_version() -> u32 {
        SAVE_VERSION
    }

    /// Record everything a reload needs from `campaign`.
    #[must_use]
    pub fn capture(campaign: &Campaign) -> Self {
        let engine = campaign.engine();
        let loot = campaign.loot_rng();
        Self {
            version: SAVE_VERSION,
            seed: campaign.seed(),
            current_node: campaign.world().current_node_id(),
            bosses: engine.progress_entries(),
            distinct_defeated: engine.bosses_defeated_count(),
            final_gate_unlocked: engine.is_final_gate_unlocked(),
            loot_position: loot.stream_position(),
            loot_draws: loot.draws(),
        }
    }

    /// Rebuild the campaign: regenerate the world, then restore the position,
    /// then restore boss counters verbatim. `engine` supplies roster and
    /// tuning and should be fresh.
    ///
    /// # Errors
    ///
    /// Returns `RestoreError` for unknown versions, nodes, or bosses.
    pub fn restore(&self, mut engine: BossProgressionEngine) -> Result<Campaign, RestoreError> {
        if self.version != SAVE_VERSION {
            return Err(RestoreError::UnsupportedVersion {
                found: self.version,
                supported: SAVE_VERSION,
            });
        }
        let mut world = WorldGraph::generate(self.seed);
        world.restore_position(self.current_node)?;
        engine.restore_progress(&self.bosses, self.distinct_defeated, self.final_gate_unlocked)?;

        let mut loot_rng = RandomSource::for_stream(self.seed, STREAM_LOOT);
        loot_rng.seek(self.loot_position, self.loot_draws);

        log::debug!(
            "campaign restored | seed {:#x} node {} distinct {}",
            self.seed,
            self.current_node,
            self.distinct_defeated
        );
        let mut campaign = Campaign::from_parts(world, engine, loot_rng);
        campaign.note(LOG_WORLD_RESTORED);
        Ok(campaign)
    }

    /// Serialize to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a save written by [`CampaignSave::to_json`].
    ///
    /// # Errors
    ///
    /// Returns `RestoreError::Parse` for malformed JSON.
    pub fn from_json(json: &str) -> Result<Self, RestoreError> {
        serde_json::from_str(json).map_err(|err| RestoreError::Parse(err.to_string()))
    }
}
