use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeSet;

/// Event tags a node can offer; most nodes carry one or two inline.
pub type EventTagSet = SmallVec<[EventTag; 3]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    Town,
    Forest,
    Cave,
    Ruins,
    Mountain,
    Crossroads,
    BossRoom,
    TreasureRoom,
    RestSite,
}

impl LocationKind {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            LocationKind::Town => "town",
            LocationKind::Forest => "forest",
            LocationKind::Cave => "cave",
            LocationKind::Ruins => "ruins",
            LocationKind::Mountain => "mountain",
            LocationKind::Crossroads => "crossroads",
            LocationKind::BossRoom => "boss_room",
            LocationKind::TreasureRoom => "treasure_room",
            LocationKind::RestSite => "rest_site",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventTag {
    Combat,
    Shop,
    Rest,
    Loot,
    BossCombat,
}

/// A single location in the world graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldNode {
    id: u32,
    name: String,
    kind: LocationKind,
    danger: u32,
    connections: BTreeSet<u32>,
    events: EventTagSet,
    visited: bool,
    discovered: bool,
    locked: bool,
}

impl WorldNode {
    #[must_use]
    pub fn new(id: u32, name: &str, kind: LocationKind, danger: u32) -> Self {
        Self {
            id,
            name: name.to_string(),
            kind,
            danger,
            connections: BTreeSet::new(),
            events: EventTagSet::new(),
            visited: false,
            discovered: false,
            locked: false,
        }
    }

    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn kind(&self) -> LocationKind {
        self.kind
    }

    #[must_use]
    pub const fn danger(&self) -> u32 {
        self.danger
    }

    #[must_use]
    pub const fn connections(&self) -> &BTreeSet<u32> {
        &self.connections
    }

    #[must_use]
    pub fn is_connected_to(&self, other: u32) -> bool {
        self.connections.contains(&other)
    }

    #[must_use]
    pub fn events(&self) -> &[EventTag] {
        &self.events
    }

    #[must_use]
    pub fn offers(&self, tag: EventTag) -> bool {
        self.events.contains(&tag)
    }

    #[must_use]
    pub const fn is_visited(&self) -> bool {
        self.visited
    }

    #[must_use]
    pub const fn is_discovered(&self) -> bool {
        self.discovered
    }

    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.locked
    }

    /// Mark the node as entered. Visiting always discovers.
    pub fn visit(&mut self) {
        self.visited = true;
        self.discovered = true;
    }

    pub fn discover(&mut self) {
        self.discovered = true;
    }

    pub(crate) fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub(crate) fn add_connection(&mut self, other: u32) {
        if other != self.id {
            self.connections.insert(other);
        }
    }

    /// Adds a tag if it is not already present.
    pub(crate) fn push_event(&mut self, tag: EventTag) {
        if !self.events.contains(&tag) {
            self.events.push(tag);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visit_implies_discovered() {
        let mut node = WorldNode::new(4, "Gloam Hollow", LocationKind::Cave, 1);
        assert!(!node.is_discovered());
        node.visit();
        assert!(node.is_visited());
        assert!(node.is_discovered());
        node.discover();
        assert!(node.is_visited(), "discover never clears visited");
    }

    #[test]
    fn connections_ignore_self_and_duplicates() {
        let mut node = WorldNode::new(1, "Emberhold", LocationKind::Town, 0);
        node.add_connection(1);
        node.add_connection(2);
        node.add_connection(2);
        assert_eq!(node.connections().len(), 1);
        assert!(node.is_connected_to(2));
    }

    #[test]
    fn events_are_deduplicated() {
        let mut node = WorldNode::new(9, "Warden's Keep", LocationKind::BossRoom, 8);
        node.push_event(EventTag::BossCombat);
        node.push_event(EventTag::BossCombat);
        assert_eq!(node.events(), &[EventTag::BossCombat]);
        assert!(node.offers(EventTag::BossCombat));
        assert!(!node.offers(EventTag::Shop));
    }
}
