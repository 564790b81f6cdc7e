//! Emberpath Game Engine
//!
//! Platform-agnostic progression core for the Emberpath role-playing game:
//! a seeded world graph and a boss-progression engine.
//! This crate provides no combat, UI, or storage implementations of its own.

pub mod boss;
pub mod campaign;
pub mod constants;
pub mod encounter;
pub mod inventory;
pub mod loot;
pub mod numbers;
pub mod rng;
pub mod save;
pub mod seed;
pub mod world;

// Re-export commonly used types
pub use boss::{
    BossCombatant, BossDefinition, BossEncounter, BossProgressEntry, BossProgressionEngine,
    BossRecord, BossRoster, BossStats, CombatStatProvider, MechanicKind, OutcomeRecord,
    ProgressionConfig, ProgressionConfigError, ProgressionError, Rewards, RosterError, Scaling,
};
pub use campaign::Campaign;
pub use encounter::{
    CombatOutcome, CombatResolver, EncounterError, EncounterOrchestrator, EncounterPhase,
    EncounterReport, StatSink,
};
pub use inventory::{Item, KeyInventory, Satchel};
pub use loot::{EncounterTier, Rarity, drop_chance, key_drop_chance, roll_loot};
pub use rng::RandomSource;
pub use save::{CampaignSave, RestoreError};
pub use seed::{decode_world_code, encode_world_code, world_code_from_entropy};
pub use world::{EventTag, EventTagSet, LocationKind, WorldError, WorldGraph, WorldNode};

/// Trait for abstracting roster and tuning loads
/// Platform-specific implementations should provide this
pub trait RosterLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the boss roster
    ///
    /// # Errors
    ///
    /// Returns an error if the roster cannot be loaded or fails validation.
    fn load_roster(&self) -> Result<BossRoster, Self::Error>;

    /// Load progression tuning
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_config(&self) -> Result<ProgressionConfig, Self::Error>;
}

/// Roster and tuning compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedRoster;

impl RosterLoader for EmbeddedRoster {
    type Error = RosterError;

    fn load_roster(&self) -> Result<BossRoster, Self::Error> {
        BossRoster::default_roster()
    }

    fn load_config(&self) -> Result<ProgressionConfig, Self::Error> {
        Ok(ProgressionConfig::default())
    }
}

/// Trait for abstracting save/load operations
/// Platform-specific implementations should provide this
pub trait CampaignStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save a campaign record
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be saved.
    fn save_campaign(&self, save_name: &str, save: &CampaignSave) -> Result<(), Self::Error>;

    /// Load a campaign record
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be loaded.
    fn load_campaign(&self, save_name: &str) -> Result<Option<CampaignSave>, Self::Error>;

    /// Delete a saved campaign
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    fn delete_save(&self, save_name: &str) -> Result<(), Self::Error>;
}

/// Main game engine for managing campaigns
pub struct GameEngine<L, S>
where
    L: RosterLoader,
    S: CampaignStorage,
{
    roster_loader: L,
    storage: S,
}

impl<L, S> GameEngine<L, S>
where
    L: RosterLoader,
    S: CampaignStorage,
{
    /// Create a new game engine with the provided roster loader and storage
    pub const fn new(roster_loader: L, storage: S) -> Self {
        Self {
            roster_loader,
            storage,
        }
    }

    /// Build a progression engine with every counter at zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the roster or tuning cannot be loaded or fails
    /// validation.
    pub fn progression_engine(&self) -> anyhow::Result<BossProgressionEngine> {
        let roster = self.roster_loader.load_roster()?;
        let cfg = self.roster_loader.load_config()?;
        Ok(BossProgressionEngine::new(&roster, cfg)?)
    }

    /// Start a campaign on the world for `seed`.
    ///
    /// # Errors
    ///
    /// Returns an error if the roster cannot be loaded.
    pub fn create_campaign(&self, seed: u64) -> anyhow::Result<Campaign> {
        Ok(Campaign::new(seed, self.progression_engine()?))
    }

    /// Start a campaign from a world share code.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed codes or if the roster cannot be loaded.
    pub fn create_campaign_from_code(&self, code: &str) -> anyhow::Result<Campaign> {
        let seed = decode_world_code(code)
            .ok_or_else(|| anyhow::anyhow!("{code:?} is not a world code"))?;
        self.create_campaign(seed)
    }

    /// Save a campaign
    ///
    /// # Errors
    ///
    /// Returns an error if the campaign cannot be saved.
    pub fn save_campaign(&self, save_name: &str, campaign: &Campaign) -> Result<(), S::Error> {
        self.storage
            .save_campaign(save_name, &CampaignSave::capture(campaign))
    }

    /// Load a campaign
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be loaded or restored.
    pub fn load_campaign(&self, save_name: &str) -> anyhow::Result<Option<Campaign>> {
        if let Some(save) = self.storage.load_campaign(save_name)? {
            // Rehydrate against a fresh roster
            let campaign = save.restore(self.progression_engine()?)?;
            Ok(Some(campaign))
        } else {
            Ok(None)
        }
    }

    /// Delete a saved campaign
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    pub fn delete_campaign(&self, save_name: &str) -> Result<(), S::Error> {
        self.storage.delete_save(save_name)
    }
}
