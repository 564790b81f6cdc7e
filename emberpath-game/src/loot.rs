//! Drop-table evaluation shared by every encounter tier.
use serde::{Deserialize, Serialize};

use crate::constants::{
    KEY_DROP_DECAY_PCT, LOOT_BOSS_FACTOR, LOOT_COMMON_PCT, LOOT_ELITE_FACTOR, LOOT_EPIC_PCT,
    LOOT_LEGENDARY_PCT, LOOT_MYTHIC_PCT, LOOT_RARE_PCT, LOOT_UNCOMMON_PCT, LOOT_UNKNOWN_PCT,
    PERCENT_CAP,
};
use crate::inventory::Item;
use crate::rng::RandomSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    Mythic,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Rarity {
    /// Base drop chance in percent.
    #[must_use]
    pub const fn base_chance(self) -> u32 {
        match self {
            Rarity::Common => LOOT_COMMON_PCT,
            Rarity::Uncommon => LOOT_UNCOMMON_PCT,
            Rarity::Rare => LOOT_RARE_PCT,
            Rarity::Epic => LOOT_EPIC_PCT,
            Rarity::Legendary => LOOT_LEGENDARY_PCT,
            Rarity::Mythic => LOOT_MYTHIC_PCT,
            Rarity::Unknown => LOOT_UNKNOWN_PCT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncounterTier {
    Normal,
    Elite,
    Miniboss,
    Boss,
}

impl EncounterTier {
    #[must_use]
    pub const fn chance_factor(self) -> u32 {
        match self {
            EncounterTier::Normal => 1,
            EncounterTier::Elite | EncounterTier::Miniboss => LOOT_ELITE_FACTOR,
            EncounterTier::Boss => LOOT_BOSS_FACTOR,
        }
    }
}

/// Per-item drop chance in percent, capped at 100.
#[must_use]
pub fn drop_chance(rarity: Rarity, tier: EncounterTier) -> u32 {
    rarity
        .base_chance()
        .saturating_mul(tier.chance_factor())
        .min(PERCENT_CAP)
}

/// Champion key drop chance for a win, keyed by defeats recorded before it.
#[must_use]
pub fn key_drop_chance(times_defeated: u32) -> u32 {
    let idx = usize::try_from(times_defeated)
        .unwrap_or(usize::MAX)
        .min(KEY_DROP_DECAY_PCT.len() - 1);
    KEY_DROP_DECAY_PCT[idx]
}

/// Roll against a percentage. A certain chance draws nothing from the stream.
pub fn roll_chance(chance: u32, rng: &mut RandomSource) -> bool {
    if chance >= PERCENT_CAP {
        return true;
    }
    if chance == 0 {
        return false;
    }
    rng.roll_percent() <= chance
}

/// Roll every entry of a loot table independently.
pub fn roll_loot(table: &[Item], tier: EncounterTier, rng: &mut RandomSource) -> Vec<Item> {
    table
        .iter()
        .filter(|item| roll_chance(drop_chance(item.rarity, tier), rng))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rarity_table_matches_tuning() {
        let expected = [
            (Rarity::Common, 50),
            (Rarity::Uncommon, 25),
            (Rarity::Rare, 10),
            (Rarity::Epic, 5),
            (Rarity::Legendary, 2),
            (Rarity::Mythic, 1),
            (Rarity::Unknown, 20),
        ];
        for (rarity, chance) in expected {
            assert_eq!(drop_chance(rarity, EncounterTier::Normal), chance);
        }
    }

    #[test]
    fn tier_multipliers_are_capped() {
        assert_eq!(drop_chance(Rarity::Common, EncounterTier::Boss), 100);
        assert_eq!(drop_chance(Rarity::Uncommon, EncounterTier::Boss), 75);
        assert_eq!(drop_chance(Rarity::Common, EncounterTier::Elite), 100);
        assert_eq!(drop_chance(Rarity::Rare, EncounterTier::Miniboss), 20);
        assert_eq!(drop_chance(Rarity::Mythic, EncounterTier::Boss), 3);
    }

    #[test]
    fn key_drop_decays_by_step() {
        assert_eq!(key_drop_chance(0), 100);
        assert_eq!(key_drop_chance(1), 50);
        assert_eq!(key_drop_chance(2), 25);
        assert_eq!(key_drop_chance(3), 10);
        assert_eq!(key_drop_chance(u32::MAX), 10);
        let chances: Vec<u32> = (0..10).map(key_drop_chance).collect();
        assert!(chances.windows(2).all(|pair| pair[0] >= pair[1]));
    }

    #[test]
    fn certain_chance_skips_the_roll() {
        let mut rng = RandomSource::from_seed(3);
        assert!(roll_chance(100, &mut rng));
        assert!(!roll_chance(0, &mut rng));
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn loot_entries_roll_independently() {
        let table = vec![
            Item::new("ember_shard", "Ember Shard", Rarity::Common),
            Item::new("ash_cloak", "Ash Cloak", Rarity::Rare),
            Item::new("phoenix_plume", "Phoenix Plume", Rarity::Mythic),
        ];
        let mut rng = RandomSource::from_seed(12);
        let mut counts = [0u32; 3];
        for _ in 0..1_000 {
            let drops = roll_loot(&table, EncounterTier::Boss, &mut rng);
            for (idx, item) in table.iter().enumerate() {
                if drops.contains(item) {
                    counts[idx] += 1;
                }
            }
        }
        assert_eq!(counts[0], 1_000, "common boss loot is certain");
        assert!((200..=400).contains(&counts[1]), "rare at 30%: {}", counts[1]);
        assert!(counts[2] < 80, "mythic at 3%: {}", counts[2]);
    }

    #[test]
    fn unknown_rarity_parses_from_unrecognized_label() {
        let item: Item =
            serde_json::from_str(r#"{"id":"odd","name":"Odd Trinket","rarity":"cursed"}"#).unwrap();
        assert_eq!(item.rarity, Rarity::Unknown);
        assert_eq!(drop_chance(item.rarity, EncounterTier::Normal), 20);
    }
}
