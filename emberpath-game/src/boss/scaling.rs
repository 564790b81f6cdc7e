//! Per-attempt difficulty and reward scaling.
//!
//! Two axes stack multiplicatively: campaign progression (distinct bosses
//! defeated) and repetition (times this boss has fallen). Scaled values are
//! recomputed from base stats for every attempt and never stored.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    PROGRESSION_COMBAT_STEP, PROGRESSION_REWARD_STEP, REPEAT_COMBAT_STEP, REPEAT_REWARD_STEP,
    REQUIRED_KEYS,
};
use crate::numbers::scale_u32;

use super::record::{BossRecord, MechanicKind};

/// Balance knobs for boss scaling and the final gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionConfig {
    #[serde(default = "ProgressionConfig::default_progression_step")]
    pub progression_step: f64,
    #[serde(default = "ProgressionConfig::default_repeat_step")]
    pub repeat_step: f64,
    #[serde(default = "ProgressionConfig::default_progression_reward_step")]
    pub progression_reward_step: f64,
    #[serde(default = "ProgressionConfig::default_repeat_reward_step")]
    pub repeat_reward_step: f64,
    #[serde(default = "ProgressionConfig::default_required_keys")]
    pub required_keys: u32,
}

impl ProgressionConfig {
    const fn default_progression_step() -> f64 {
        PROGRESSION_COMBAT_STEP
    }

    const fn default_repeat_step() -> f64 {
        REPEAT_COMBAT_STEP
    }

    const fn default_progression_reward_step() -> f64 {
        PROGRESSION_REWARD_STEP
    }

    const fn default_repeat_reward_step() -> f64 {
        REPEAT_REWARD_STEP
    }

    const fn default_required_keys() -> u32 {
        REQUIRED_KEYS
    }

    /// Parse a config from JSON, filling omitted fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when the JSON is malformed or a value is out of range.
    pub fn from_json(json: &str) -> Result<Self, ProgressionConfigError> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|err| ProgressionConfigError::Parse(err.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionConfigError` when a step is negative or not finite,
    /// or when the gate requires no keys.
    pub fn validate(&self) -> Result<(), ProgressionConfigError> {
        for (field, value) in [
            ("progression_step", self.progression_step),
            ("repeat_step", self.repeat_step),
            ("progression_reward_step", self.progression_reward_step),
            ("repeat_reward_step", self.repeat_reward_step),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ProgressionConfigError::InvalidStep { field, value });
            }
        }
        if self.required_keys == 0 {
            return Err(ProgressionConfigError::NoKeysRequired);
        }
        Ok(())
    }
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            progression_step: Self::default_progression_step(),
            repeat_step: Self::default_repeat_step(),
            progression_reward_step: Self::default_progression_reward_step(),
            repeat_reward_step: Self::default_repeat_reward_step(),
            required_keys: Self::default_required_keys(),
        }
    }
}

/// Errors raised when progression configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum ProgressionConfigError {
    #[error("{field} must be a finite, non-negative number (got {value})")]
    InvalidStep { field: &'static str, value: f64 },
    #[error("the final gate must require at least one key")]
    NoKeysRequired,
    #[error("progression config is not valid JSON: {0}")]
    Parse(String),
}

/// Multipliers for one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scaling {
    pub progression: f64,
    pub repeat: f64,
    pub combat: f64,
    pub reward: f64,
}

impl Scaling {
    #[must_use]
    pub fn compute(cfg: &ProgressionConfig, distinct_defeated: u32, times_defeated: u32) -> Self {
        let distinct = f64::from(distinct_defeated);
        let times = f64::from(times_defeated);
        let progression = 1.0 + cfg.progression_step * distinct;
        let repeat = 1.0 + cfg.repeat_step * times;
        let reward = (1.0 + cfg.progression_reward_step * distinct)
            * (1.0 + cfg.repeat_reward_step * times);
        Self {
            progression,
            repeat,
            combat: progression * repeat,
            reward,
        }
    }
}

/// Derived stat block handed to the combat resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossCombatant {
    pub boss_id: String,
    pub name: String,
    pub max_health: u32,
    pub current_health: u32,
    pub min_damage: u32,
    pub max_damage: u32,
    pub defense: u32,
    pub accuracy: u32,
    pub crit_chance: u32,
    pub speed: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rewards {
    pub gold: u32,
    pub xp: u32,
}

/// Anything that can derive combat numbers from its base stats.
pub trait CombatStatProvider {
    fn scaled_combatant(&self, scaling: &Scaling) -> BossCombatant;
    fn scaled_rewards(&self, scaling: &Scaling) -> Rewards;
}

impl CombatStatProvider for BossRecord {
    fn scaled_combatant(&self, scaling: &Scaling) -> BossCombatant {
        let base = self.base_stats();
        let max_health = scale_u32(base.health, scaling.combat);
        BossCombatant {
            boss_id: self.id().to_string(),
            name: self.name().to_string(),
            max_health,
            current_health: max_health,
            min_damage: scale_u32(base.min_damage, scaling.combat),
            max_damage: scale_u32(base.max_damage, scaling.combat),
            defense: scale_u32(base.defense, scaling.combat),
            accuracy: base.accuracy,
            crit_chance: base.crit_chance,
            speed: base.speed,
        }
    }

    fn scaled_rewards(&self, scaling: &Scaling) -> Rewards {
        let base = self.base_stats();
        Rewards {
            gold: scale_u32(base.gold_reward, scaling.reward),
            xp: scale_u32(base.xp_reward, scaling.reward),
        }
    }
}

/// Everything the briefing screen shows for one attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossEncounter {
    pub boss_id: String,
    pub title: String,
    pub mechanic: MechanicKind,
    pub flavor: String,
    pub is_final: bool,
    pub times_defeated: u32,
    pub distinct_defeated: u32,
    pub scaling: Scaling,
    pub combatant: BossCombatant,
    pub rewards: Rewards,
    pub key_drop_chance: u32,
}
