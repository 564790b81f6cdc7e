use serde::{Deserialize, Serialize};

use crate::inventory::Item;

/// Unscaled stat block as authored in the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossStats {
    pub health: u32,
    pub min_damage: u32,
    pub max_damage: u32,
    pub defense: u32,
    /// Hit chance in percent.
    pub accuracy: u32,
    /// Critical hit chance in percent.
    pub crit_chance: u32,
    pub speed: u32,
    pub gold_reward: u32,
    pub xp_reward: u32,
}

/// Boss mechanic family. Only selects flavor text here; the combat resolver
/// owns what the mechanic actually does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MechanicKind {
    Inferno,
    Frost,
    Venom,
    Shadow,
    Storm,
    Earthshaker,
    Bloodbound,
    Arcane,
    Summoner,
    Berserker,
    Sovereign,
}

impl MechanicKind {
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            MechanicKind::Inferno => "Wreathed in flame; burns linger after every strike.",
            MechanicKind::Frost => "Chills the air; slowed foes act last.",
            MechanicKind::Venom => "Each wound festers with poison.",
            MechanicKind::Shadow => "Slips between shadows and strikes unseen.",
            MechanicKind::Storm => "Calls lightning that arcs across the party.",
            MechanicKind::Earthshaker => "Shatters the ground, staggering everyone nearby.",
            MechanicKind::Bloodbound => "Heals from the blood it spills.",
            MechanicKind::Arcane => "Bends spells back upon their casters.",
            MechanicKind::Summoner => "Never fights alone; minions answer its call.",
            MechanicKind::Berserker => "Grows more savage as its wounds deepen.",
            MechanicKind::Sovereign => "Commands the power of every fallen champion.",
        }
    }
}

/// One boss and its campaign history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossRecord {
    id: String,
    name: String,
    title: String,
    base: BossStats,
    mechanic: MechanicKind,
    key_item_id: Option<String>,
    loot: Vec<Item>,
    sequence: Option<u32>,
    times_defeated: u32,
    defeated: bool,
}

impl BossRecord {
    #[must_use]
    pub fn new(
        id: &str,
        name: &str,
        title: &str,
        base: BossStats,
        mechanic: MechanicKind,
        key_item_id: Option<&str>,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            title: title.to_string(),
            base,
            mechanic,
            key_item_id: key_item_id.map(str::to_string),
            loot: Vec::new(),
            sequence: None,
            times_defeated: 0,
            defeated: false,
        }
    }

    #[must_use]
    pub fn with_loot(mut self, loot: Vec<Item>) -> Self {
        self.loot = loot;
        self
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub const fn base_stats(&self) -> &BossStats {
        &self.base
    }

    #[must_use]
    pub const fn mechanic(&self) -> MechanicKind {
        self.mechanic
    }

    #[must_use]
    pub fn key_item_id(&self) -> Option<&str> {
        self.key_item_id.as_deref()
    }

    #[must_use]
    pub fn loot(&self) -> &[Item] {
        &self.loot
    }

    /// Order in which this boss was first defeated, starting at 1.
    #[must_use]
    pub const fn sequence(&self) -> Option<u32> {
        self.sequence
    }

    #[must_use]
    pub const fn times_defeated(&self) -> u32 {
        self.times_defeated
    }

    #[must_use]
    pub const fn is_defeated(&self) -> bool {
        self.defeated
    }

    /// Record a win. Returns true when this was the first defeat.
    pub(crate) fn record_victory(&mut self, next_sequence: u32) -> bool {
        let first = !self.defeated;
        if first {
            self.sequence = Some(next_sequence);
        }
        self.times_defeated = self.times_defeated.saturating_add(1);
        self.defeated = true;
        first
    }

    pub(crate) fn restore(&mut self, times_defeated: u32, defeated: bool, sequence: Option<u32>) {
        self.times_defeated = times_defeated;
        self.defeated = defeated;
        self.sequence = sequence;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> BossStats {
        BossStats {
            health: 400,
            min_damage: 20,
            max_damage: 32,
            defense: 12,
            accuracy: 85,
            crit_chance: 10,
            speed: 14,
            gold_reward: 250,
            xp_reward: 400,
        }
    }

    #[test]
    fn victory_assigns_sequence_once() {
        let mut record = BossRecord::new(
            "flame_warden",
            "Ignar",
            "the Flame Warden",
            stats(),
            MechanicKind::Inferno,
            Some("key_flame_warden"),
        );
        assert!(record.record_victory(3));
        assert!(!record.record_victory(7));
        assert_eq!(record.sequence(), Some(3));
        assert_eq!(record.times_defeated(), 2);
        assert!(record.is_defeated());
        assert_eq!(record.base_stats(), &stats());
    }

    #[test]
    fn every_mechanic_has_flavor() {
        let kinds = [
            MechanicKind::Inferno,
            MechanicKind::Frost,
            MechanicKind::Venom,
            MechanicKind::Shadow,
            MechanicKind::Storm,
            MechanicKind::Earthshaker,
            MechanicKind::Bloodbound,
            MechanicKind::Arcane,
            MechanicKind::Summoner,
            MechanicKind::Berserker,
            MechanicKind::Sovereign,
        ];
        for kind in kinds {
            assert!(!kind.description().is_empty());
        }
    }
}
