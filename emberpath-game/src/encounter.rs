//! Boss encounter flow.
//!
//! `Idle → Briefing → AwaitingConfirmation → Resolving → Concluded`. The
//! orchestrator never performs I/O; it stops at `AwaitingConfirmation` and is
//! re-entered with the player's decision.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::boss::{
    BossCombatant, BossEncounter, BossProgressionEngine, OutcomeRecord, ProgressionError,
};
use crate::inventory::{Item, KeyInventory};
use crate::rng::RandomSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatOutcome {
    Victory,
    Defeat,
    Fled,
}

/// External combat system.
pub trait CombatResolver {
    type Party: ?Sized;

    fn resolve(&mut self, party: &Self::Party, defender: &BossCombatant) -> CombatOutcome;
}

/// Receives derived boss numbers in whatever shape the combat side uses.
pub trait StatSink {
    fn apply(&mut self, combatant: &BossCombatant);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncounterPhase {
    Idle,
    Briefing,
    AwaitingConfirmation,
    Resolving,
    Concluded,
}

#[derive(Debug, Error, PartialEq)]
pub enum EncounterError {
    #[error(transparent)]
    Progression(#[from] ProgressionError),
    #[error("cannot {action} while the encounter is {phase:?}")]
    InvalidTransition {
        phase: EncounterPhase,
        action: &'static str,
    },
    #[error("node {node} hosts no boss fight")]
    NotAtBossRoom { node: u32 },
}

/// Result of one concluded fight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterReport {
    pub encounter: BossEncounter,
    pub outcome: OutcomeRecord,
    /// Champion keys spent opening the final gate for this attempt.
    pub keys_consumed: Vec<Item>,
}

impl EncounterReport {
    /// Every item granted to the inventory by this fight.
    pub fn drops(&self) -> impl Iterator<Item = &Item> {
        self.outcome
            .key_dropped
            .iter()
            .chain(self.outcome.loot.iter())
    }
}

#[derive(Debug, Clone)]
pub struct EncounterOrchestrator {
    phase: EncounterPhase,
    briefing: Option<BossEncounter>,
    report: Option<EncounterReport>,
}

impl Default for EncounterOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl EncounterOrchestrator {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: EncounterPhase::Idle,
            briefing: None,
            report: None,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> EncounterPhase {
        self.phase
    }

    /// Scaled numbers for the pending fight, if one is being briefed.
    #[must_use]
    pub const fn briefing(&self) -> Option<&BossEncounter> {
        self.briefing.as_ref()
    }

    fn expect_phase(
        &self,
        expected: EncounterPhase,
        action: &'static str,
    ) -> Result<(), EncounterError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(EncounterError::InvalidTransition {
                phase: self.phase,
                action,
            })
        }
    }

    /// Check eligibility and compute this attempt's scaling. Does not touch
    /// engine counters.
    ///
    /// # Errors
    ///
    /// Fails outside `Idle`, for unknown bosses, and for the final boss while
    /// too few champion keys are held.
    pub fn brief<I: KeyInventory + ?Sized>(
        &mut self,
        engine: &BossProgressionEngine,
        boss_id: &str,
        inventory: &I,
    ) -> Result<&BossEncounter, EncounterError> {
        self.expect_phase(EncounterPhase::Idle, "brief")?;
        let encounter = engine.scaled_encounter(boss_id)?;
        if encounter.is_final && !engine.can_access_final_boss(inventory) {
            return Err(ProgressionError::InsufficientKeys {
                held: engine.held_key_count(inventory),
                required: engine.required_keys(),
            }
            .into());
        }
        self.phase = EncounterPhase::Briefing;
        Ok(&*self.briefing.insert(encounter))
    }

    /// Push the briefed numbers into the combat side's stat block.
    ///
    /// # Errors
    ///
    /// Fails when no briefing is pending.
    pub fn apply_stats<S: StatSink + ?Sized>(&self, sink: &mut S) -> Result<(), EncounterError> {
        let briefing = self
            .briefing
            .as_ref()
            .ok_or(EncounterError::InvalidTransition {
                phase: self.phase,
                action: "apply stats",
            })?;
        sink.apply(&briefing.combatant);
        Ok(())
    }

    /// Hand control back to the caller until the player decides.
    ///
    /// # Errors
    ///
    /// Fails outside `Briefing`.
    pub fn await_confirmation(&mut self) -> Result<(), EncounterError> {
        self.expect_phase(EncounterPhase::Briefing, "await confirmation")?;
        self.phase = EncounterPhase::AwaitingConfirmation;
        Ok(())
    }

    /// Back out before the fight. Nothing anywhere changes.
    ///
    /// # Errors
    ///
    /// Fails outside `AwaitingConfirmation`.
    pub fn cancel(&mut self) -> Result<(), EncounterError> {
        self.expect_phase(EncounterPhase::AwaitingConfirmation, "cancel")?;
        self.briefing = None;
        self.phase = EncounterPhase::Idle;
        Ok(())
    }

    /// Run the fight: open the final gate when needed, delegate to the
    /// resolver, record exactly one outcome, and grant the drops.
    ///
    /// # Errors
    ///
    /// Fails outside `AwaitingConfirmation`. A failed gate unlock returns the
    /// orchestrator to `Idle` with the engine and inventory untouched.
    pub fn confirm<R, I>(
        &mut self,
        engine: &mut BossProgressionEngine,
        resolver: &mut R,
        party: &R::Party,
        inventory: &mut I,
        rng: &mut RandomSource,
    ) -> Result<&EncounterReport, EncounterError>
    where
        R: CombatResolver,
        I: KeyInventory + ?Sized,
    {
        self.expect_phase(EncounterPhase::AwaitingConfirmation, "confirm")?;
        let Some(encounter) = self.briefing.take() else {
            return Err(EncounterError::InvalidTransition {
                phase: self.phase,
                action: "confirm",
            });
        };

        let keys_consumed = if encounter.is_final {
            match engine.unlock_final_gate(inventory) {
                Ok(keys) => keys,
                Err(err) => {
                    self.phase = EncounterPhase::Idle;
                    return Err(err.into());
                }
            }
        } else {
            Vec::new()
        };

        self.phase = EncounterPhase::Resolving;
        let outcome = resolver.resolve(party, &encounter.combatant);

        let record = match engine.record_outcome(&encounter.boss_id, outcome, rng) {
            Ok(record) => record,
            Err(err) => {
                self.phase = EncounterPhase::Idle;
                return Err(err.into());
            }
        };
        self.phase = EncounterPhase::Concluded;
        let report = EncounterReport {
            encounter,
            outcome: record,
            keys_consumed,
        };
        for item in report.drops() {
            inventory.insert(item.clone());
        }
        Ok(&*self.report.insert(report))
    }

    /// Leave `Concluded` and hand back the report.
    ///
    /// # Errors
    ///
    /// Fails outside `Concluded`.
    pub fn finish(&mut self) -> Result<EncounterReport, EncounterError> {
        self.expect_phase(EncounterPhase::Concluded, "finish")?;
        let report = self.report.take().ok_or(EncounterError::InvalidTransition {
            phase: self.phase,
            action: "finish",
        })?;
        self.phase = EncounterPhase::Idle;
        Ok(report)
    }
}
