//! Layered world layout.
//!
//! The topology is hand-authored: a town, a ring of outskirts, a band of
//! wilds, one rest site, and the champion gate. Only the links from the wilds
//! back to the outskirts, the wilds' danger bonus, and their loot offers come
//! from the seed, so every layout can reach the boss room.
use std::collections::BTreeMap;

use crate::constants::{WILDS_LOOT_CHANCE_PCT, WILDS_MAX_LINKS};
use crate::rng::RandomSource;

use super::node::{EventTag, LocationKind, WorldNode};

struct NodeSpec {
    name: &'static str,
    kind: LocationKind,
    danger: u32,
}

const fn spec(name: &'static str, kind: LocationKind, danger: u32) -> NodeSpec {
    NodeSpec { name, kind, danger }
}

const START: NodeSpec = spec("Emberhold", LocationKind::Town, 0);

const OUTSKIRTS: [NodeSpec; 3] = [
    spec("Whisperwood", LocationKind::Forest, 1),
    spec("Gloam Hollow", LocationKind::Cave, 1),
    spec("Old Watch", LocationKind::Ruins, 2),
];

const WILDS: [NodeSpec; 5] = [
    spec("Cinder Peaks", LocationKind::Mountain, 3),
    spec("Drowned Grotto", LocationKind::Cave, 3),
    spec("Sunken Bastion", LocationKind::Ruins, 4),
    spec("Hollow Fork", LocationKind::Crossroads, 3),
    spec("Gilded Vault", LocationKind::TreasureRoom, 4),
];

const WAYSTATION: NodeSpec = spec("Lantern Camp", LocationKind::RestSite, 2);

const GATE: NodeSpec = spec("Champion's Gate", LocationKind::BossRoom, 6);

/// Nodes keyed by id plus the id of the starting town.
pub(crate) struct Layout {
    pub nodes: BTreeMap<u32, WorldNode>,
    pub start: u32,
}

struct LayoutBuilder {
    nodes: BTreeMap<u32, WorldNode>,
    next_id: u32,
}

impl LayoutBuilder {
    fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            next_id: 1,
        }
    }

    fn add(&mut self, spec: &NodeSpec, danger_bonus: u32) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        let mut node = WorldNode::new(id, spec.name, spec.kind, spec.danger + danger_bonus);
        for tag in base_events(spec.kind) {
            node.push_event(*tag);
        }
        self.nodes.insert(id, node);
        id
    }

    fn link(&mut self, a: u32, b: u32) {
        if let Some(node) = self.nodes.get_mut(&a) {
            node.add_connection(b);
        }
        if let Some(node) = self.nodes.get_mut(&b) {
            node.add_connection(a);
        }
    }

    fn offer(&mut self, id: u32, tag: EventTag) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.push_event(tag);
        }
    }
}

const fn base_events(kind: LocationKind) -> &'static [EventTag] {
    match kind {
        LocationKind::Town => &[EventTag::Shop, EventTag::Rest],
        LocationKind::RestSite => &[EventTag::Rest, EventTag::Shop],
        LocationKind::BossRoom => &[EventTag::BossCombat],
        LocationKind::TreasureRoom => &[EventTag::Combat, EventTag::Loot],
        LocationKind::Forest
        | LocationKind::Cave
        | LocationKind::Ruins
        | LocationKind::Mountain
        | LocationKind::Crossroads => &[EventTag::Combat],
    }
}

/// Build the five-layer layout. Rolls are drawn in a fixed order so the same
/// seed always produces the same links and event tags.
pub(crate) fn build_layout(rng: &mut RandomSource) -> Layout {
    let mut builder = LayoutBuilder::new();

    let start = builder.add(&START, 0);

    let outskirts: Vec<u32> = OUTSKIRTS
        .iter()
        .map(|spec| {
            let id = builder.add(spec, 0);
            builder.link(start, id);
            id
        })
        .collect();

    let mut wilds = Vec::with_capacity(WILDS.len());
    for spec in &WILDS {
        let bonus = rng.roll(0, 1).unsigned_abs();
        let id = builder.add(spec, bonus);

        let link_count = rng.roll(1, WILDS_MAX_LINKS);
        let mut candidates = outskirts.clone();
        for _ in 0..link_count {
            let last = i32::try_from(candidates.len() - 1).unwrap_or(0);
            let pick = usize::try_from(rng.roll(0, last)).unwrap_or(0);
            let target = candidates.remove(pick);
            builder.link(id, target);
        }

        if spec.kind != LocationKind::TreasureRoom && rng.roll_percent() <= WILDS_LOOT_CHANCE_PCT {
            builder.offer(id, EventTag::Loot);
        }
        wilds.push(id);
    }

    let waystation = builder.add(&WAYSTATION, 0);
    for id in &wilds {
        builder.link(*id, waystation);
    }

    let gate = builder.add(&GATE, 0);
    builder.link(waystation, gate);

    Layout {
        nodes: builder.nodes,
        start,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(seed: u64) -> Layout {
        build_layout(&mut RandomSource::from_seed(seed))
    }

    #[test]
    fn layer_sizes_are_fixed() {
        let layout = layout(3);
        assert_eq!(layout.nodes.len(), 1 + OUTSKIRTS.len() + WILDS.len() + 2);
        assert_eq!(layout.start, 1);
        let bosses = layout
            .nodes
            .values()
            .filter(|node| node.kind() == LocationKind::BossRoom)
            .count();
        assert_eq!(bosses, 1);
    }

    #[test]
    fn wilds_link_to_one_or_two_outskirts() {
        for seed in 0..64 {
            let layout = layout(seed);
            let outskirt_ids: Vec<u32> = (2..=4).collect();
            for id in 5..=9 {
                let node = &layout.nodes[&id];
                let back_links = node
                    .connections()
                    .iter()
                    .filter(|other| outskirt_ids.contains(other))
                    .count();
                assert!((1..=2).contains(&back_links), "seed {seed} node {id}");
                assert!(node.is_connected_to(10), "wilds reach the rest site");
            }
        }
    }

    #[test]
    fn connections_are_symmetric() {
        let layout = layout(0xBEEF);
        for node in layout.nodes.values() {
            for other in node.connections() {
                assert!(layout.nodes[other].is_connected_to(node.id()));
            }
        }
    }

    #[test]
    fn treasure_room_always_offers_loot() {
        for seed in 0..32 {
            let layout = layout(seed);
            let vault = &layout.nodes[&9];
            assert_eq!(vault.kind(), LocationKind::TreasureRoom);
            assert!(vault.offers(EventTag::Loot));
        }
    }

    #[test]
    fn loot_offers_vary_with_seed() {
        let loot_counts: Vec<usize> = (0..64)
            .map(|seed| {
                layout(seed)
                    .nodes
                    .values()
                    .filter(|node| {
                        node.kind() != LocationKind::TreasureRoom && node.offers(EventTag::Loot)
                    })
                    .count()
            })
            .collect();
        assert!(loot_counts.iter().any(|count| *count == 0));
        assert!(loot_counts.iter().any(|count| *count > 0));
    }
}
