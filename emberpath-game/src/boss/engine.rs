use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::encounter::CombatOutcome;
use crate::inventory::{Item, KeyInventory};
use crate::loot::{EncounterTier, key_drop_chance, roll_chance, roll_loot};
use crate::rng::RandomSource;

use super::roster::BossRoster;
use super::scaling::{BossEncounter, CombatStatProvider, ProgressionConfig, Rewards, Scaling};
use super::{BossRecord, ProgressionError};

/// Persisted counters for one boss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossProgressEntry {
    pub id: String,
    pub times_defeated: u32,
    pub defeated: bool,
    #[serde(default)]
    pub sequence: Option<u32>,
}

/// What one concluded attempt changed and produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub boss_id: String,
    pub outcome: CombatOutcome,
    pub first_defeat: bool,
    pub sequence: Option<u32>,
    pub times_defeated: u32,
    pub rewards: Option<Rewards>,
    pub key_drop_chance: Option<u32>,
    pub key_dropped: Option<Item>,
    pub loot: Vec<Item>,
}

/// Owns the boss roster and every campaign-wide progression counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossProgressionEngine {
    bosses: BTreeMap<String, BossRecord>,
    final_boss: String,
    distinct_defeated: u32,
    final_gate_unlocked: bool,
    cfg: ProgressionConfig,
}

impl BossProgressionEngine {
    /// Build a fresh engine with every counter at zero.
    ///
    /// # Errors
    ///
    /// Returns an error when the roster or config fails validation.
    pub fn new(roster: &BossRoster, cfg: ProgressionConfig) -> Result<Self, ProgressionError> {
        roster.validate()?;
        cfg.validate()?;
        let bosses = roster
            .bosses
            .iter()
            .map(|def| (def.id.clone(), def.to_record()))
            .collect();
        Ok(Self {
            bosses,
            final_boss: roster.final_boss.clone(),
            distinct_defeated: 0,
            final_gate_unlocked: false,
            cfg,
        })
    }

    /// Engine over the embedded roster with default tuning.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded roster fails validation.
    pub fn with_default_roster() -> Result<Self, ProgressionError> {
        Self::new(&BossRoster::default_roster()?, ProgressionConfig::default())
    }

    /// Look up a boss record.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionError::BossNotFound` for unknown ids.
    pub fn boss(&self, id: &str) -> Result<&BossRecord, ProgressionError> {
        self.bosses
            .get(id)
            .ok_or_else(|| ProgressionError::BossNotFound(id.to_string()))
    }

    pub fn bosses(&self) -> impl Iterator<Item = &BossRecord> {
        self.bosses.values()
    }

    #[must_use]
    pub fn final_boss_id(&self) -> &str {
        &self.final_boss
    }

    #[must_use]
    pub fn is_final_boss(&self, id: &str) -> bool {
        self.final_boss == id
    }

    #[must_use]
    pub const fn bosses_defeated_count(&self) -> u32 {
        self.distinct_defeated
    }

    #[must_use]
    pub const fn is_final_gate_unlocked(&self) -> bool {
        self.final_gate_unlocked
    }

    #[must_use]
    pub const fn config(&self) -> &ProgressionConfig {
        &self.cfg
    }

    #[must_use]
    pub const fn required_keys(&self) -> u32 {
        self.cfg.required_keys
    }

    /// Key ids granted by the champions, in boss-id order.
    #[must_use]
    pub fn champion_key_ids(&self) -> Vec<&str> {
        self.bosses
            .values()
            .filter_map(BossRecord::key_item_id)
            .collect()
    }

    /// Champions that have never been defeated.
    #[must_use]
    pub fn remaining_champions(&self) -> Vec<&BossRecord> {
        self.bosses
            .values()
            .filter(|boss| boss.id() != self.final_boss && !boss.is_defeated())
            .collect()
    }

    /// Multipliers for the next attempt against `id`.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionError::BossNotFound` for unknown ids.
    pub fn scaling_for(&self, id: &str) -> Result<Scaling, ProgressionError> {
        let boss = self.boss(id)?;
        Ok(Scaling::compute(
            &self.cfg,
            self.distinct_defeated,
            boss.times_defeated(),
        ))
    }

    /// Scaled stats, rewards, and drop odds for the next attempt. Read-only.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionError::BossNotFound` for unknown ids.
    pub fn scaled_encounter(&self, id: &str) -> Result<BossEncounter, ProgressionError> {
        let boss = self.boss(id)?;
        let scaling = self.scaling_for(id)?;
        Ok(BossEncounter {
            boss_id: boss.id().to_string(),
            title: format!("{}, {}", boss.name(), boss.title()),
            mechanic: boss.mechanic(),
            flavor: boss.mechanic().description().to_string(),
            is_final: self.is_final_boss(id),
            times_defeated: boss.times_defeated(),
            distinct_defeated: self.distinct_defeated,
            scaling,
            combatant: boss.scaled_combatant(&scaling),
            rewards: boss.scaled_rewards(&scaling),
            key_drop_chance: boss
                .key_item_id()
                .map_or(0, |_| key_drop_chance(boss.times_defeated())),
        })
    }

    /// Record one concluded attempt. Only victories change counters or roll
    /// drops; a defeat or retreat leaves the next attempt scaled identically.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionError::BossNotFound` for unknown ids.
    pub fn record_outcome(
        &mut self,
        id: &str,
        outcome: CombatOutcome,
        rng: &mut RandomSource,
    ) -> Result<OutcomeRecord, ProgressionError> {
        let scaling = self.scaling_for(id)?;
        let is_final = self.is_final_boss(id);
        let next_sequence = self.next_sequence();
        let record = self
            .bosses
            .get_mut(id)
            .ok_or_else(|| ProgressionError::BossNotFound(id.to_string()))?;

        if outcome != CombatOutcome::Victory {
            log::debug!("boss {id} not defeated ({outcome:?}); counters unchanged");
            return Ok(OutcomeRecord {
                boss_id: id.to_string(),
                outcome,
                first_defeat: false,
                sequence: record.sequence(),
                times_defeated: record.times_defeated(),
                rewards: None,
                key_drop_chance: None,
                key_dropped: None,
                loot: Vec::new(),
            });
        }

        let before = record.times_defeated();
        let rewards = record.scaled_rewards(&scaling);
        let first_defeat = record.record_victory(next_sequence);
        if first_defeat && !is_final {
            self.distinct_defeated = self.distinct_defeated.saturating_add(1);
        }

        let (chance, key_dropped) = match record.key_item_id() {
            Some(key_id) => {
                let chance = key_drop_chance(before);
                let dropped = roll_chance(chance, rng)
                    .then(|| Item::champion_key(key_id, record.title()));
                (Some(chance), dropped)
            }
            None => (None, None),
        };
        let loot = roll_loot(record.loot(), EncounterTier::Boss, rng);

        log::debug!(
            "boss {id} defeated | times {} distinct {} key {:?} loot {}",
            record.times_defeated(),
            self.distinct_defeated,
            key_dropped.as_ref().map(|item| item.id.as_str()),
            loot.len()
        );

        Ok(OutcomeRecord {
            boss_id: id.to_string(),
            outcome,
            first_defeat,
            sequence: record.sequence(),
            times_defeated: record.times_defeated(),
            rewards: Some(rewards),
            key_drop_chance: chance,
            key_dropped,
            loot,
        })
    }

    fn next_sequence(&self) -> u32 {
        let assigned = self
            .bosses
            .values()
            .filter(|boss| boss.sequence().is_some())
            .count();
        u32::try_from(assigned).unwrap_or(u32::MAX).saturating_add(1)
    }

    fn held_key_ids<I: KeyInventory + ?Sized>(&self, inventory: &I) -> Vec<String> {
        self.champion_key_ids()
            .into_iter()
            .filter(|key| inventory.count_matching(&|item: &Item| item.tag == *key) > 0)
            .map(str::to_string)
            .collect()
    }

    /// Number of distinct champion keys currently held.
    #[must_use]
    pub fn held_key_count<I: KeyInventory + ?Sized>(&self, inventory: &I) -> u32 {
        u32::try_from(self.held_key_ids(inventory).len()).unwrap_or(u32::MAX)
    }

    /// Whether the final encounter may be attempted: enough distinct keys are
    /// held, or the gate is already open. Once opened the gate stays open, so
    /// retries need no keys at all.
    #[must_use]
    pub fn can_access_final_boss<I: KeyInventory + ?Sized>(&self, inventory: &I) -> bool {
        self.final_gate_unlocked || self.held_key_count(inventory) >= self.cfg.required_keys
    }

    /// Consume the required keys and open the final gate.
    ///
    /// Either exactly `required_keys` keys are removed and the gate opens, or
    /// nothing is removed and the gate stays shut. An already open gate
    /// consumes nothing.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionError::InsufficientKeys` when too few distinct keys
    /// are held, or `ProgressionError::KeyConsumptionShortfall` when the
    /// inventory could not hand over every key it reported.
    pub fn unlock_final_gate<I: KeyInventory + ?Sized>(
        &mut self,
        inventory: &mut I,
    ) -> Result<Vec<Item>, ProgressionError> {
        if self.final_gate_unlocked {
            return Ok(Vec::new());
        }
        let required = self.cfg.required_keys;
        let held = self.held_key_ids(&*inventory);
        let held_count = u32::try_from(held.len()).unwrap_or(u32::MAX);
        if held_count < required {
            return Err(ProgressionError::InsufficientKeys {
                held: held_count,
                required,
            });
        }

        let mut consumed = Vec::new();
        for key in held.iter().take(usize::try_from(required).unwrap_or(usize::MAX)) {
            match inventory.remove_one_matching(&|item: &Item| item.tag == *key) {
                Some(item) => consumed.push(item),
                None => {
                    let removed = u32::try_from(consumed.len()).unwrap_or(u32::MAX);
                    for item in consumed {
                        inventory.insert(item);
                    }
                    log::warn!("final gate aborted: {removed} of {required} keys removable");
                    return Err(ProgressionError::KeyConsumptionShortfall { removed, required });
                }
            }
        }

        self.final_gate_unlocked = true;
        log::info!("final gate unlocked with {} keys", consumed.len());
        Ok(consumed)
    }

    /// Counters for every boss, in id order.
    #[must_use]
    pub fn progress_entries(&self) -> Vec<BossProgressEntry> {
        self.bosses
            .values()
            .map(|boss| BossProgressEntry {
                id: boss.id().to_string(),
                times_defeated: boss.times_defeated(),
                defeated: boss.is_defeated(),
                sequence: boss.sequence(),
            })
            .collect()
    }

    /// Restore saved counters verbatim. Nothing is applied unless every entry
    /// names a known boss.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionError::BossNotFound` for the first unknown id.
    pub fn restore_progress(
        &mut self,
        entries: &[BossProgressEntry],
        distinct_defeated: u32,
        final_gate_unlocked: bool,
    ) -> Result<(), ProgressionError> {
        if let Some(unknown) = entries
            .iter()
            .find(|entry| !self.bosses.contains_key(&entry.id))
        {
            return Err(ProgressionError::BossNotFound(unknown.id.clone()));
        }
        for entry in entries {
            if let Some(record) = self.bosses.get_mut(&entry.id) {
                record.restore(entry.times_defeated, entry.defeated, entry.sequence);
            }
        }
        self.distinct_defeated = distinct_defeated;
        self.final_gate_unlocked = final_gate_unlocked;

        let counted = self
            .bosses
            .values()
            .filter(|boss| boss.id() != self.final_boss && boss.is_defeated())
            .count();
        if usize::try_from(distinct_defeated).ok() != Some(counted) {
            log::warn!(
                "restored distinct count {distinct_defeated} disagrees with {counted} defeated records"
            );
        }
        Ok(())
    }
}
