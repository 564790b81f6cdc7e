//! World graph: seeded generation, traversal, and fog-of-war discovery.
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use thiserror::Error;

use crate::rng::RandomSource;

mod generate;
pub mod node;

pub use node::{EventTag, EventTagSet, LocationKind, WorldNode};

/// Recoverable traversal failures. None of them change the graph.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum WorldError {
    #[error("node {target} is not connected to node {from}")]
    NotReachable { from: u32, target: u32 },
    #[error("node {target} is locked")]
    Locked { target: u32 },
    #[error("node {id} does not exist in this world")]
    UnknownNode { id: u32 },
}

/// Serialize only; graphs are rebuilt from their seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorldGraph {
    seed: u64,
    nodes: BTreeMap<u32, WorldNode>,
    current: u32,
}

impl WorldGraph {
    /// Generate the world for `seed`. Identical seeds produce identical
    /// graphs, node for node and connection for connection.
    #[must_use]
    pub fn generate(seed: u64) -> Self {
        let mut rng = RandomSource::from_seed(seed);
        let layout = generate::build_layout(&mut rng);
        let mut world = Self {
            seed,
            nodes: layout.nodes,
            current: layout.start,
        };
        world.arrive(layout.start);
        log::debug!(
            "world generated | seed {seed:#x} nodes {} rolls {}",
            world.nodes.len(),
            rng.draws()
        );
        world
    }

    /// Generate a world from a freshly drawn seed.
    #[must_use]
    pub fn new_random() -> Self {
        Self::generate(RandomSource::from_entropy().next_seed())
    }

    /// Move to a neighbour of the current node.
    ///
    /// # Errors
    ///
    /// Returns `WorldError::NotReachable` when the target is not connected to
    /// the current node, or `WorldError::Locked` when it is gated.
    pub fn travel(&mut self, target: u32) -> Result<&WorldNode, WorldError> {
        if !self.current_node().is_connected_to(target) {
            return Err(WorldError::NotReachable {
                from: self.current,
                target,
            });
        }
        let destination = self
            .nodes
            .get(&target)
            .ok_or(WorldError::NotReachable {
                from: self.current,
                target,
            })?;
        if destination.is_locked() {
            return Err(WorldError::Locked { target });
        }
        log::debug!("travel | {} -> {target}", self.current);
        self.arrive(target);
        Ok(&self.nodes[&target])
    }

    /// Put the player back on a saved node after regenerating from the seed.
    ///
    /// # Errors
    ///
    /// Returns `WorldError::UnknownNode` for ids outside this world and
    /// `WorldError::Locked` for gated nodes.
    pub fn restore_position(&mut self, id: u32) -> Result<(), WorldError> {
        let node = self.nodes.get(&id).ok_or(WorldError::UnknownNode { id })?;
        if node.is_locked() {
            return Err(WorldError::Locked { target: id });
        }
        self.arrive(id);
        Ok(())
    }

    /// Gate or ungate a node. The current node can never be locked.
    ///
    /// # Errors
    ///
    /// Returns `WorldError::UnknownNode` for unknown ids and
    /// `WorldError::Locked` when asked to lock the current node.
    pub fn set_locked(&mut self, id: u32, locked: bool) -> Result<(), WorldError> {
        if locked && id == self.current {
            return Err(WorldError::Locked { target: id });
        }
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(WorldError::UnknownNode { id })?;
        node.set_locked(locked);
        Ok(())
    }

    /// Add a passage from `from` to `to` without the return leg. A visitor
    /// standing on `from` discovers `to` immediately.
    ///
    /// # Errors
    ///
    /// Returns `WorldError::UnknownNode` when either end is missing.
    pub fn connect_one_way(&mut self, from: u32, to: u32) -> Result<(), WorldError> {
        if !self.nodes.contains_key(&to) {
            return Err(WorldError::UnknownNode { id: to });
        }
        let origin = self
            .nodes
            .get_mut(&from)
            .ok_or(WorldError::UnknownNode { id: from })?;
        origin.add_connection(to);
        if from == self.current
            && let Some(node) = self.nodes.get_mut(&to)
        {
            node.discover();
        }
        Ok(())
    }

    fn arrive(&mut self, id: u32) {
        let neighbours: Vec<u32> = match self.nodes.get_mut(&id) {
            Some(node) => {
                node.visit();
                node.connections().iter().copied().collect()
            }
            None => return,
        };
        for neighbour in neighbours {
            if let Some(node) = self.nodes.get_mut(&neighbour) {
                node.discover();
            }
        }
        self.current = id;
    }

    #[must_use]
    pub fn current_node(&self) -> &WorldNode {
        &self.nodes[&self.current]
    }

    #[must_use]
    pub const fn current_node_id(&self) -> u32 {
        self.current
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub fn node(&self, id: u32) -> Option<&WorldNode> {
        self.nodes.get(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &WorldNode> {
        self.nodes.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Unlocked neighbours of the current node, ordered by id.
    #[must_use]
    pub fn reachable_destinations(&self) -> Vec<&WorldNode> {
        self.current_node()
            .connections()
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .filter(|node| !node.is_locked())
            .collect()
    }

    /// Every discovered node, ordered by id.
    #[must_use]
    pub fn discovered_nodes(&self) -> Vec<&WorldNode> {
        self.nodes
            .values()
            .filter(|node| node.is_discovered())
            .collect()
    }

    /// Ids of nodes that host a boss fight.
    #[must_use]
    pub fn boss_rooms(&self) -> Vec<u32> {
        self.nodes
            .values()
            .filter(|node| node.offers(EventTag::BossCombat))
            .map(WorldNode::id)
            .collect()
    }

    /// Breadth-first check over connections, ignoring locks.
    #[must_use]
    pub fn path_exists(&self, from: u32, to: u32) -> bool {
        if !self.nodes.contains_key(&from) || !self.nodes.contains_key(&to) {
            return false;
        }
        let mut seen = BTreeSet::from([from]);
        let mut queue = VecDeque::from([from]);
        while let Some(id) = queue.pop_front() {
            if id == to {
                return true;
            }
            for next in self.nodes[&id].connections() {
                if seen.insert(*next) {
                    queue.push_back(*next);
                }
            }
        }
        false
    }

    /// Shortest chain of unlocked hops from the current node to `to`,
    /// excluding the current node. Empty when already there.
    #[must_use]
    pub fn route_to(&self, to: u32) -> Option<Vec<u32>> {
        let target = self.nodes.get(&to)?;
        if target.is_locked() {
            return None;
        }
        let mut parent = BTreeMap::from([(self.current, self.current)]);
        let mut queue = VecDeque::from([self.current]);
        while let Some(id) = queue.pop_front() {
            if id == to {
                let mut route = Vec::new();
                let mut step = id;
                while step != self.current {
                    route.push(step);
                    step = parent[&step];
                }
                route.reverse();
                return Some(route);
            }
            for next in self.nodes[&id].connections() {
                let open = self.nodes.get(next).is_some_and(|node| !node.is_locked());
                if open && !parent.contains_key(next) {
                    parent.insert(*next, id);
                    queue.push_back(*next);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(world: &WorldGraph) -> Vec<(u32, bool, bool)> {
        world
            .nodes()
            .map(|node| (node.id(), node.is_discovered(), node.is_visited()))
            .collect()
    }

    #[test]
    fn generation_is_deterministic() {
        for seed in [0, 1, 42, 0xDEAD_BEEF, u64::MAX] {
            assert_eq!(WorldGraph::generate(seed), WorldGraph::generate(seed));
        }
    }

    #[test]
    fn different_seeds_vary_branching() {
        let layouts: BTreeSet<Vec<Vec<u32>>> = (0..32)
            .map(|seed| {
                WorldGraph::generate(seed)
                    .nodes()
                    .map(|node| node.connections().iter().copied().collect())
                    .collect()
            })
            .collect();
        assert!(layouts.len() > 1);
    }

    #[test]
    fn start_is_visited_and_neighbours_discovered() {
        let world = WorldGraph::generate(11);
        let start = world.current_node();
        assert_eq!(start.kind(), LocationKind::Town);
        assert!(start.is_visited());
        for id in start.connections() {
            let node = world.node(*id).unwrap();
            assert!(node.is_discovered());
            assert!(!node.is_visited());
        }
        assert_eq!(world.discovered_nodes().len(), 1 + start.connections().len());
    }

    #[test]
    fn every_node_reachable_from_start() {
        for seed in 0..128 {
            let world = WorldGraph::generate(seed);
            let start = world.current_node_id();
            for node in world.nodes() {
                assert!(world.path_exists(start, node.id()), "seed {seed}");
            }
        }
    }

    #[test]
    fn travel_to_unconnected_node_is_rejected() {
        let mut world = WorldGraph::generate(5);
        let before = world.clone();
        let boss = world.boss_rooms()[0];
        let err = world.travel(boss).unwrap_err();
        assert_eq!(
            err,
            WorldError::NotReachable {
                from: before.current_node_id(),
                target: boss
            }
        );
        assert_eq!(world, before);

        let err = world.travel(999).unwrap_err();
        assert!(matches!(err, WorldError::NotReachable { target: 999, .. }));
        assert_eq!(world, before);
    }

    #[test]
    fn travel_to_locked_node_is_rejected() {
        let mut world = WorldGraph::generate(5);
        let target = world.reachable_destinations()[0].id();
        world.set_locked(target, true).unwrap();
        let before = world.clone();
        assert_eq!(world.travel(target).unwrap_err(), WorldError::Locked { target });
        assert_eq!(world, before);
        assert!(world.reachable_destinations().iter().all(|n| n.id() != target));
    }

    #[test]
    fn travel_reveals_one_hop_ahead() {
        let mut world = WorldGraph::generate(8);
        let target = world.reachable_destinations()[0].id();
        let arrived = world.travel(target).unwrap();
        assert!(arrived.is_visited());
        let neighbours: Vec<u32> = arrived.connections().iter().copied().collect();
        assert_eq!(world.current_node_id(), target);
        for id in neighbours {
            assert!(world.node(id).unwrap().is_discovered());
        }
    }

    #[test]
    fn fog_of_war_never_recedes() {
        let mut world = WorldGraph::generate(21);
        let mut previous = snapshot(&world);
        let mut rng = RandomSource::from_seed(21);
        for _ in 0..40 {
            let options: Vec<u32> = world.reachable_destinations().iter().map(|n| n.id()).collect();
            let last = i32::try_from(options.len() - 1).unwrap();
            let pick = options[usize::try_from(rng.roll(0, last)).unwrap()];
            world.travel(pick).unwrap();
            let current = snapshot(&world);
            for (before, after) in previous.iter().zip(&current) {
                assert!(!before.1 || after.1, "discovered flag cleared");
                assert!(!before.2 || after.2, "visited flag cleared");
            }
            previous = current;
        }
    }

    #[test]
    fn current_node_cannot_be_locked() {
        let mut world = WorldGraph::generate(2);
        let here = world.current_node_id();
        assert_eq!(
            world.set_locked(here, true),
            Err(WorldError::Locked { target: here })
        );
        assert_eq!(
            world.set_locked(404, true),
            Err(WorldError::UnknownNode { id: 404 })
        );
    }

    #[test]
    fn route_to_boss_room_walks_through_camp() {
        for seed in 0..16 {
            let mut world = WorldGraph::generate(seed);
            let boss = world.boss_rooms()[0];
            let route = world.route_to(boss).unwrap();
            assert_eq!(route.len(), 4, "town, outskirts, wilds, camp, boss");
            for hop in route {
                world.travel(hop).unwrap();
            }
            assert_eq!(world.current_node_id(), boss);
            assert_eq!(world.route_to(boss), Some(Vec::new()));
        }
    }

    #[test]
    fn one_way_passages_do_not_return() {
        let mut world = WorldGraph::generate(3);
        let start = world.current_node_id();
        let boss = world.boss_rooms()[0];
        world.connect_one_way(start, boss).unwrap();
        assert!(world.current_node().is_connected_to(boss));
        assert!(world.node(boss).unwrap().is_discovered());
        world.travel(boss).unwrap();
        assert!(!world.current_node().is_connected_to(start));
        assert_eq!(
            world.connect_one_way(start, 500),
            Err(WorldError::UnknownNode { id: 500 })
        );
    }

    #[test]
    fn restore_position_rejects_unknown_nodes() {
        let mut world = WorldGraph::generate(2);
        assert_eq!(
            world.restore_position(77),
            Err(WorldError::UnknownNode { id: 77 })
        );
        let boss = world.boss_rooms()[0];
        world.restore_position(boss).unwrap();
        assert_eq!(world.current_node_id(), boss);
        assert!(world.current_node().is_visited());
    }

    #[test]
    fn exported_snapshot_names_an_existing_current_node() {
        let mut world = WorldGraph::generate(12);
        let next = world.reachable_destinations()[0].id();
        world.travel(next).unwrap();

        let value = serde_json::to_value(&world).unwrap();
        let current = value["current"].as_u64().unwrap();
        assert_eq!(current, u64::from(next));
        assert!(value["nodes"].get(current.to_string()).is_some());

        let mut rebuilt = WorldGraph::generate(world.seed());
        rebuilt.restore_position(next).unwrap();
        assert_eq!(rebuilt.current_node(), world.current_node());
    }
}
