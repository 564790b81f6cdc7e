//! Centralized balance and tuning constants for Emberpath progression logic.
//!
//! These values define the deterministic math for world generation and boss
//! progression. `ProgressionConfig` takes its defaults from here, so a
//! rebalance starts in this file.

// Logging keys -------------------------------------------------------------
pub(crate) const LOG_WORLD_GENERATED: &str = "log.world.generated";
pub(crate) const LOG_WORLD_RESTORED: &str = "log.world.restored";
pub(crate) const LOG_TRAVEL_ARRIVED: &str = "log.travel.arrived";
pub(crate) const LOG_TRAVEL_BLOCKED: &str = "log.travel.blocked";
pub(crate) const LOG_BOSS_VICTORY: &str = "log.boss.victory";
pub(crate) const LOG_BOSS_DEFEAT: &str = "log.boss.defeat";
pub(crate) const LOG_BOSS_FLED: &str = "log.boss.fled";
pub(crate) const LOG_BOSS_WITHDRAWN: &str = "log.boss.withdrawn";
pub(crate) const LOG_BOSS_KEY_DROP: &str = "log.boss.key-drop";
pub(crate) const LOG_BOSS_LOOT: &str = "log.boss.loot";
pub(crate) const LOG_GATE_UNLOCKED: &str = "log.gate.unlocked";
pub(crate) const LOG_GATE_REFUSED: &str = "log.gate.refused";

// Progression scaling --------------------------------------------------------
pub(crate) const PROGRESSION_COMBAT_STEP: f64 = 0.15;
pub(crate) const REPEAT_COMBAT_STEP: f64 = 0.50;
pub(crate) const PROGRESSION_REWARD_STEP: f64 = 0.05;
pub(crate) const REPEAT_REWARD_STEP: f64 = 0.10;

/// Number of distinct champion keys consumed by the final gate.
pub const REQUIRED_KEYS: u32 = 10;

// Key drop decay, indexed by times defeated before the win (last entry repeats)
pub(crate) const KEY_DROP_DECAY_PCT: [u32; 4] = [100, 50, 25, 10];

// Loot tables ------------------------------------------------------------------
pub(crate) const LOOT_COMMON_PCT: u32 = 50;
pub(crate) const LOOT_UNCOMMON_PCT: u32 = 25;
pub(crate) const LOOT_RARE_PCT: u32 = 10;
pub(crate) const LOOT_EPIC_PCT: u32 = 5;
pub(crate) const LOOT_LEGENDARY_PCT: u32 = 2;
pub(crate) const LOOT_MYTHIC_PCT: u32 = 1;
pub(crate) const LOOT_UNKNOWN_PCT: u32 = 20;
pub(crate) const LOOT_ELITE_FACTOR: u32 = 2;
pub(crate) const LOOT_BOSS_FACTOR: u32 = 3;
pub(crate) const PERCENT_CAP: u32 = 100;

// World generation -------------------------------------------------------------
pub(crate) const WILDS_LOOT_CHANCE_PCT: u32 = 30;
pub(crate) const WILDS_MAX_LINKS: i32 = 2;

// Stream domain for the campaign loot RNG
pub(crate) const STREAM_LOOT: &[u8] = b"loot";

/// Current save format revision.
pub const SAVE_VERSION: u32 = 1;
