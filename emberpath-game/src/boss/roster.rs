//! Boss roster data, embedded as JSON and validated on load.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::inventory::Item;

use super::record::{BossRecord, BossStats, MechanicKind};

const DEFAULT_ROSTER_DATA: &str = include_str!("../../data/bosses.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossDefinition {
    pub id: String,
    pub name: String,
    pub title: String,
    pub mechanic: MechanicKind,
    #[serde(default)]
    pub key_item_id: Option<String>,
    pub stats: BossStats,
    #[serde(default)]
    pub loot: Vec<Item>,
}

impl BossDefinition {
    #[must_use]
    pub fn to_record(&self) -> BossRecord {
        BossRecord::new(
            &self.id,
            &self.name,
            &self.title,
            self.stats,
            self.mechanic,
            self.key_item_id.as_deref(),
        )
        .with_loot(self.loot.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossRoster {
    pub final_boss: String,
    pub bosses: Vec<BossDefinition>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RosterError {
    #[error("boss roster is not valid JSON: {0}")]
    Parse(String),
    #[error("boss id {0} appears more than once")]
    DuplicateBoss(String),
    #[error("key item {0} is granted by more than one boss")]
    DuplicateKey(String),
    #[error("final boss {0} is not part of the roster")]
    MissingFinalBoss(String),
    #[error("boss {0} has min damage above max damage")]
    DamageRange(String),
}

impl BossRoster {
    /// Parse and validate a roster.
    ///
    /// # Errors
    ///
    /// Returns `RosterError` when the JSON is malformed or the roster is
    /// inconsistent.
    pub fn from_json(json: &str) -> Result<Self, RosterError> {
        let roster: Self =
            serde_json::from_str(json).map_err(|err| RosterError::Parse(err.to_string()))?;
        roster.validate()?;
        Ok(roster)
    }

    /// The roster shipped with the game.
    ///
    /// # Errors
    ///
    /// Returns `RosterError` if the embedded data fails validation.
    pub fn default_roster() -> Result<Self, RosterError> {
        Self::from_json(DEFAULT_ROSTER_DATA)
    }

    /// Check unique boss ids and key ids, the final boss entry, and damage
    /// ranges.
    ///
    /// # Errors
    ///
    /// Returns the first `RosterError` found.
    pub fn validate(&self) -> Result<(), RosterError> {
        let mut ids = HashSet::new();
        let mut keys = HashSet::new();
        for boss in &self.bosses {
            if !ids.insert(boss.id.as_str()) {
                return Err(RosterError::DuplicateBoss(boss.id.clone()));
            }
            if let Some(key) = boss.key_item_id.as_deref()
                && !keys.insert(key)
            {
                return Err(RosterError::DuplicateKey(key.to_string()));
            }
            if boss.stats.min_damage > boss.stats.max_damage {
                return Err(RosterError::DamageRange(boss.id.clone()));
            }
        }
        if !ids.contains(self.final_boss.as_str()) {
            return Err(RosterError::MissingFinalBoss(self.final_boss.clone()));
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&BossDefinition> {
        self.bosses.iter().find(|boss| boss.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_roster_has_ten_champions_and_a_final_boss() {
        let roster = BossRoster::default_roster().unwrap();
        assert_eq!(roster.final_boss, "hollow_king");
        let champions: Vec<_> = roster
            .bosses
            .iter()
            .filter(|boss| boss.id != roster.final_boss)
            .collect();
        assert_eq!(champions.len(), 10);
        assert!(champions.iter().all(|boss| boss.key_item_id.is_some()));
        assert!(roster.get("hollow_king").unwrap().key_item_id.is_none());
        assert_eq!(roster.get("flame_warden").unwrap().stats.health, 400);
        let loot: Vec<_> = roster.bosses.iter().flat_map(|boss| &boss.loot).collect();
        assert!(!loot.is_empty());
        assert!(loot.iter().all(|item| item.tag == item.id));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut roster = BossRoster::default_roster().unwrap();
        let copy = roster.bosses[0].clone();
        roster.bosses.push(copy);
        assert_eq!(
            roster.validate(),
            Err(RosterError::DuplicateBoss(String::from("flame_warden")))
        );
    }

    #[test]
    fn shared_keys_are_rejected() {
        let mut roster = BossRoster::default_roster().unwrap();
        roster.bosses[1].key_item_id = roster.bosses[0].key_item_id.clone();
        assert_eq!(
            roster.validate(),
            Err(RosterError::DuplicateKey(String::from("key_flame_warden")))
        );
    }

    #[test]
    fn missing_final_boss_is_rejected() {
        let json = r#"{"final_boss":"nobody","bosses":[]}"#;
        assert_eq!(
            BossRoster::from_json(json),
            Err(RosterError::MissingFinalBoss(String::from("nobody")))
        );
    }
}
