//! Campaign session binding the world, the progression engine, and the loot
//! stream.
use crate::boss::{BossEncounter, BossProgressionEngine, ProgressionError};
use crate::constants::{
    LOG_BOSS_DEFEAT, LOG_BOSS_FLED, LOG_BOSS_KEY_DROP, LOG_BOSS_LOOT, LOG_BOSS_VICTORY,
    LOG_BOSS_WITHDRAWN, LOG_GATE_REFUSED, LOG_GATE_UNLOCKED, LOG_TRAVEL_ARRIVED, LOG_TRAVEL_BLOCKED,
    LOG_WORLD_GENERATED, STREAM_LOOT,
};
use crate::encounter::{
    CombatOutcome, CombatResolver, EncounterError, EncounterOrchestrator, EncounterReport,
};
use crate::inventory::KeyInventory;
use crate::rng::RandomSource;
use crate::world::{EventTag, WorldError, WorldGraph, WorldNode};

/// One playthrough. Inventory stays with the caller and is lent per call.
#[derive(Debug, Clone)]
pub struct Campaign {
    world: WorldGraph,
    engine: BossProgressionEngine,
    loot_rng: RandomSource,
    orchestrator: EncounterOrchestrator,
    journal: Vec<String>,
}

impl Campaign {
    /// Start a fresh campaign on the world for `seed`.
    #[must_use]
    pub fn new(seed: u64, engine: BossProgressionEngine) -> Self {
        let mut campaign = Self::from_parts(
            WorldGraph::generate(seed),
            engine,
            RandomSource::for_stream(seed, STREAM_LOOT),
        );
        campaign.journal.push(String::from(LOG_WORLD_GENERATED));
        campaign
    }

    /// Fresh campaign over the embedded roster.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded roster fails validation.
    pub fn with_default_roster(seed: u64) -> Result<Self, ProgressionError> {
        Ok(Self::new(seed, BossProgressionEngine::with_default_roster()?))
    }

    pub(crate) fn from_parts(
        world: WorldGraph,
        engine: BossProgressionEngine,
        loot_rng: RandomSource,
    ) -> Self {
        Self {
            world,
            engine,
            loot_rng,
            orchestrator: EncounterOrchestrator::new(),
            journal: Vec::new(),
        }
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.world.seed()
    }

    #[must_use]
    pub const fn world(&self) -> &WorldGraph {
        &self.world
    }

    #[must_use]
    pub const fn engine(&self) -> &BossProgressionEngine {
        &self.engine
    }

    #[must_use]
    pub const fn loot_rng(&self) -> &RandomSource {
        &self.loot_rng
    }

    #[must_use]
    pub const fn orchestrator(&self) -> &EncounterOrchestrator {
        &self.orchestrator
    }

    /// Stable log keys in the order they happened.
    #[must_use]
    pub fn journal(&self) -> &[String] {
        &self.journal
    }

    pub(crate) fn note(&mut self, key: &str) {
        self.journal.push(key.to_string());
    }

    /// Move the party one hop. Leaving withdraws from a briefed fight.
    ///
    /// # Errors
    ///
    /// Propagates `WorldError` from the graph; nothing moves on failure.
    pub fn travel(&mut self, target: u32) -> Result<&WorldNode, WorldError> {
        if let Err(err) = self.world.travel(target).map(|_| ()) {
            log::debug!("travel refused: {err}");
            self.note(LOG_TRAVEL_BLOCKED);
            return Err(err);
        }
        if self.orchestrator.cancel().is_ok() {
            self.note(LOG_BOSS_WITHDRAWN);
        }
        self.note(LOG_TRAVEL_ARRIVED);
        Ok(self.world.current_node())
    }

    /// Whether the party stands where bosses can be challenged.
    #[must_use]
    pub fn at_boss_room(&self) -> bool {
        self.world.current_node().offers(EventTag::BossCombat)
    }

    /// Bosses that can be challenged from the current node: every champion
    /// in id order, then the final boss. Empty away from boss rooms.
    #[must_use]
    pub fn bosses_here(&self) -> Vec<&str> {
        if !self.at_boss_room() {
            return Vec::new();
        }
        let final_boss = self.engine.final_boss_id();
        self.engine
            .bosses()
            .map(|boss| boss.id())
            .filter(|id| *id != final_boss)
            .chain(std::iter::once(final_boss))
            .collect()
    }

    fn require_boss_room(&self) -> Result<(), EncounterError> {
        if self.at_boss_room() {
            Ok(())
        } else {
            Err(EncounterError::NotAtBossRoom {
                node: self.world.current_node_id(),
            })
        }
    }

    /// Brief a fight and wait for the player's decision.
    ///
    /// # Errors
    ///
    /// Fails away from boss rooms, while another fight is pending, for
    /// unknown bosses, and for the final boss without enough keys.
    pub fn brief_boss<I: KeyInventory + ?Sized>(
        &mut self,
        boss_id: &str,
        inventory: &I,
    ) -> Result<&BossEncounter, EncounterError> {
        self.require_boss_room()?;
        let briefed = self
            .orchestrator
            .brief(&self.engine, boss_id, inventory)
            .map(|_| ());
        if let Err(err) = briefed {
            if gate_refused(&err) {
                self.note(LOG_GATE_REFUSED);
            }
            return Err(err);
        }
        self.orchestrator.await_confirmation()?;
        self.orchestrator
            .briefing()
            .ok_or(EncounterError::InvalidTransition {
                phase: self.orchestrator.phase(),
                action: "brief",
            })
    }

    /// Back out of a briefed fight.
    ///
    /// # Errors
    ///
    /// Fails when no fight is awaiting confirmation.
    pub fn cancel_boss(&mut self) -> Result<(), EncounterError> {
        self.orchestrator.cancel()
    }

    /// Fight the briefed boss and record the outcome.
    ///
    /// # Errors
    ///
    /// Fails when no fight is awaiting confirmation, or when the final gate
    /// cannot be opened.
    pub fn confirm_boss<R, I>(
        &mut self,
        resolver: &mut R,
        party: &R::Party,
        inventory: &mut I,
    ) -> Result<EncounterReport, EncounterError>
    where
        R: CombatResolver,
        I: KeyInventory + ?Sized,
    {
        let confirmed = self
            .orchestrator
            .confirm(
                &mut self.engine,
                resolver,
                party,
                inventory,
                &mut self.loot_rng,
            )
            .map(|_| ());
        if let Err(err) = confirmed {
            if gate_refused(&err) {
                self.note(LOG_GATE_REFUSED);
            }
            return Err(err);
        }
        let report = self.orchestrator.finish()?;

        if !report.keys_consumed.is_empty() {
            self.note(LOG_GATE_UNLOCKED);
        }
        self.note(match report.outcome.outcome {
            CombatOutcome::Victory => LOG_BOSS_VICTORY,
            CombatOutcome::Defeat => LOG_BOSS_DEFEAT,
            CombatOutcome::Fled => LOG_BOSS_FLED,
        });
        if report.outcome.key_dropped.is_some() {
            self.note(LOG_BOSS_KEY_DROP);
        }
        if !report.outcome.loot.is_empty() {
            self.note(LOG_BOSS_LOOT);
        }
        Ok(report)
    }

    /// Brief and immediately confirm a fight.
    ///
    /// # Errors
    ///
    /// See [`Campaign::brief_boss`] and [`Campaign::confirm_boss`].
    pub fn fight_boss<R, I>(
        &mut self,
        boss_id: &str,
        resolver: &mut R,
        party: &R::Party,
        inventory: &mut I,
    ) -> Result<EncounterReport, EncounterError>
    where
        R: CombatResolver,
        I: KeyInventory + ?Sized,
    {
        self.brief_boss(boss_id, &*inventory)?;
        self.confirm_boss(resolver, party, inventory)
    }

    /// Walk the shortest open route to the boss room.
    ///
    /// # Errors
    ///
    /// Returns `WorldError::NotReachable` when no open route exists.
    pub fn travel_to_boss_room(&mut self) -> Result<&WorldNode, WorldError> {
        let from = self.world.current_node_id();
        let target = self
            .world
            .boss_rooms()
            .into_iter()
            .find_map(|id| self.world.route_to(id).map(|route| (id, route)));
        let Some((target, route)) = target else {
            return Err(WorldError::NotReachable { from, target: from });
        };
        for hop in route {
            self.travel(hop)?;
        }
        debug_assert_eq!(self.world.current_node_id(), target);
        Ok(self.world.current_node())
    }
}

const fn gate_refused(err: &EncounterError) -> bool {
    matches!(
        err,
        EncounterError::Progression(
            ProgressionError::InsufficientKeys { .. }
                | ProgressionError::KeyConsumptionShortfall { .. }
        )
    )
}
