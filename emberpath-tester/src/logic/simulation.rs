use anyhow::{Context, Result};
use emberpath_game::{
    BossCombatant, BossProgressionEngine, Campaign, CampaignSave, CombatOutcome, CombatResolver,
    EncounterReport, Item, KeyInventory, RandomSource, Satchel, StatSink, WorldGraph,
    decode_world_code, encode_world_code,
};
use serde::Serialize;

use super::seeds::SeedInfo;

const STREAM_DICE: &[u8] = b"dice";
const MAX_ROUNDS: u32 = 60;

/// Simulated adventuring party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Party {
    pub level: u32,
    pub health: u32,
    pub attack: u32,
    pub defense: u32,
}

impl Party {
    /// Starting party; later campaign slots start slightly stronger.
    #[must_use]
    pub fn starting(campaign_index: usize) -> Self {
        let bonus = u32::try_from(campaign_index % 4).unwrap_or(0);
        Self {
            level: 1,
            health: 600 + 50 * bonus,
            attack: 45 + 5 * bonus,
            defense: 10,
        }
    }

    fn grow(&mut self) {
        self.level += 1;
        self.health += 60;
        self.attack += 6;
        self.defense += 2;
    }
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Alternating-swing dice combat. Deterministic for a given stream.
#[derive(Debug, Clone)]
pub struct DiceResolver {
    rng: RandomSource,
}

impl DiceResolver {
    #[must_use]
    pub fn new(seed: u64, campaign_index: usize) -> Self {
        let salt = u64::try_from(campaign_index).unwrap_or(0);
        Self {
            rng: RandomSource::for_stream(seed.wrapping_add(salt), STREAM_DICE),
        }
    }
}

impl CombatResolver for DiceResolver {
    type Party = Party;

    fn resolve(&mut self, party: &Party, defender: &BossCombatant) -> CombatOutcome {
        let mut party_hp = i64::from(party.health);
        let mut boss_hp = i64::from(defender.current_health);
        let attack = to_i32(party.attack);

        for _ in 0..MAX_ROUNDS {
            let swing = i64::from(self.rng.roll(attack, attack.saturating_add(attack / 2)));
            boss_hp -= (swing - i64::from(defender.defense / 2)).max(1);
            if boss_hp <= 0 {
                return CombatOutcome::Victory;
            }

            if self.rng.roll_percent() <= defender.accuracy {
                let low = to_i32(defender.min_damage);
                let high = to_i32(defender.max_damage).max(low);
                let mut hit = i64::from(self.rng.roll(low, high));
                if self.rng.roll_percent() <= defender.crit_chance {
                    hit *= 2;
                }
                party_hp -= (hit - i64::from(party.defense / 2)).max(1);
                if party_hp <= 0 {
                    return CombatOutcome::Defeat;
                }
            }
        }
        CombatOutcome::Fled
    }
}

/// Captures the boss stat block the way a combat screen would.
#[derive(Debug, Clone, Default)]
pub struct BossHealthBar {
    pub boss_id: String,
    pub max: u32,
    pub current: u32,
}

impl StatSink for BossHealthBar {
    fn apply(&mut self, combatant: &BossCombatant) {
        self.boss_id.clone_from(&combatant.boss_id);
        self.max = combatant.max_health;
        self.current = combatant.current_health;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FightTally {
    pub fights: u32,
    pub victories: u32,
    pub defeats: u32,
    pub fled: u32,
    pub keys_consumed: u32,
    pub loot_items: u32,
    pub peak_boss_health: u32,
}

/// One simulated campaign in progress.
#[derive(Debug, Clone)]
pub struct CampaignRun {
    pub campaign: Campaign,
    pub satchel: Satchel,
    pub party: Party,
    pub tally: FightTally,
    resolver: DiceResolver,
}

impl CampaignRun {
    /// Start a campaign and walk it to the boss room.
    pub fn start(seed: u64, campaign_index: usize) -> Result<Self> {
        let mut campaign = Campaign::with_default_roster(seed)?;
        campaign
            .travel_to_boss_room()
            .with_context(|| format!("seed {seed} has no open route to the boss room"))?;
        Ok(Self {
            campaign,
            satchel: Satchel::new(),
            party: Party::starting(campaign_index),
            tally: FightTally::default(),
            resolver: DiceResolver::new(seed, campaign_index),
        })
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        let engine = self.campaign.engine();
        engine
            .boss(engine.final_boss_id())
            .is_ok_and(|boss| boss.is_defeated())
    }

    /// Final boss once the gate is passable, else the first champion whose
    /// key is missing.
    fn next_target(&self) -> String {
        let engine = self.campaign.engine();
        if engine.can_access_final_boss(&self.satchel) {
            return engine.final_boss_id().to_string();
        }
        engine
            .bosses()
            .find(|boss| {
                boss.key_item_id().is_some_and(|key| {
                    self.satchel.count_matching(&|item: &Item| item.tag == key) == 0
                })
            })
            .map_or_else(
                || engine.final_boss_id().to_string(),
                |boss| boss.id().to_string(),
            )
    }

    /// Fight one boss.
    pub fn step(&mut self) -> Result<EncounterReport> {
        let target = self.next_target();
        self.campaign.brief_boss(&target, &self.satchel)?;
        let mut bar = BossHealthBar::default();
        self.campaign.orchestrator().apply_stats(&mut bar)?;
        self.tally.peak_boss_health = self.tally.peak_boss_health.max(bar.max);

        let report = self
            .campaign
            .confirm_boss(&mut self.resolver, &self.party, &mut self.satchel)?;
        self.tally.fights += 1;
        match report.outcome.outcome {
            CombatOutcome::Victory => self.tally.victories += 1,
            CombatOutcome::Defeat => self.tally.defeats += 1,
            CombatOutcome::Fled => self.tally.fled += 1,
        }
        self.tally.keys_consumed += u32::try_from(report.keys_consumed.len()).unwrap_or(0);
        self.tally.loot_items += u32::try_from(report.outcome.loot.len()).unwrap_or(0);
        // Win or lose, the party learns something.
        self.party.grow();

        log::debug!(
            "fight {} | {} ({}/{} hp) -> {:?}",
            self.tally.fights,
            bar.boss_id,
            bar.current,
            bar.max,
            report.outcome.outcome
        );
        Ok(report)
    }

    /// Fight until the final boss falls or `fight_limit` fights have run.
    pub fn run_until(&mut self, fight_limit: u32) -> Result<()> {
        while !self.is_complete() && self.tally.fights < fight_limit {
            self.step()?;
        }
        Ok(())
    }

    /// Save, serialize, parse, and restore the campaign; everything else
    /// carries over unchanged.
    pub fn resumed(&self) -> Result<Self> {
        let json = CampaignSave::capture(&self.campaign).to_json()?;
        let save = CampaignSave::from_json(&json)?;
        let campaign = save.restore(BossProgressionEngine::with_default_roster()?)?;
        Ok(Self {
            campaign,
            satchel: self.satchel.clone(),
            party: self.party.clone(),
            tally: self.tally.clone(),
            resolver: self.resolver.clone(),
        })
    }

    /// Whether two runs ended in the same observable state.
    #[must_use]
    pub fn same_outcome(&self, other: &Self) -> bool {
        CampaignSave::capture(&self.campaign) == CampaignSave::capture(&other.campaign)
            && self.satchel == other.satchel
            && self.party == other.party
            && self.tally == other.tally
    }

    #[must_use]
    pub fn summary(&self, campaign_index: usize) -> CampaignSummary {
        let engine = self.campaign.engine();
        CampaignSummary {
            campaign: campaign_index,
            tally: self.tally.clone(),
            distinct_defeated: engine.bosses_defeated_count(),
            keys_held: engine.held_key_count(&self.satchel),
            final_gate_unlocked: engine.is_final_gate_unlocked(),
            final_boss_defeated: self.is_complete(),
            party_level: self.party.level,
            journal_entries: self.campaign.journal().len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CampaignSummary {
    pub campaign: usize,
    #[serde(flatten)]
    pub tally: FightTally,
    pub distinct_defeated: u32,
    pub keys_held: u32,
    pub final_gate_unlocked: bool,
    pub final_boss_defeated: bool,
    pub party_level: u32,
    pub journal_entries: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
}

impl CheckResult {
    fn new(name: impl Into<String>, passed: bool) -> Self {
        Self {
            name: name.into(),
            passed,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SeedReport {
    pub seed: SeedInfo,
    pub checks: Vec<CheckResult>,
    pub campaigns: Vec<CampaignSummary>,
    pub passed: bool,
}

/// Simulate `campaigns` campaigns on one world and run the reproducibility
/// checks: stable generation, stable share code, identical replays, and
/// identical results across a mid-campaign save and reload.
pub fn simulate_seed(info: &SeedInfo, campaigns: usize, max_fights: u32) -> Result<SeedReport> {
    let mut checks = vec![
        CheckResult::new(
            "world-stable",
            WorldGraph::generate(info.seed) == WorldGraph::generate(info.seed),
        ),
        CheckResult::new(
            "code-round-trip",
            decode_world_code(&info.code).is_some_and(|seed| encode_world_code(seed) == info.code),
        ),
    ];

    let mut summaries = Vec::with_capacity(campaigns);
    for index in 0..campaigns {
        let mut full = CampaignRun::start(info.seed, index)?;
        full.run_until(max_fights)?;

        let mut replay = CampaignRun::start(info.seed, index)?;
        replay.run_until(max_fights)?;
        checks.push(CheckResult::new(
            format!("campaign-{index}-replay"),
            full.same_outcome(&replay),
        ));

        let mut first_half = CampaignRun::start(info.seed, index)?;
        first_half.run_until(max_fights / 2)?;
        let mut resumed = first_half.resumed()?;
        resumed.run_until(max_fights)?;
        checks.push(CheckResult::new(
            format!("campaign-{index}-resume"),
            full.same_outcome(&resumed),
        ));

        summaries.push(full.summary(index));
    }

    let passed = checks.iter().all(|check| check.passed);
    Ok(SeedReport {
        seed: info.clone(),
        checks,
        campaigns: summaries,
        passed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dice_resolver_is_deterministic() {
        let engine = BossProgressionEngine::with_default_roster().unwrap();
        let boss = engine.scaled_encounter("stone_colossus").unwrap().combatant;
        let party = Party::starting(0);
        let outcomes = |mut resolver: DiceResolver| -> Vec<CombatOutcome> {
            (0..8).map(|_| resolver.resolve(&party, &boss)).collect()
        };
        assert_eq!(
            outcomes(DiceResolver::new(3, 0)),
            outcomes(DiceResolver::new(3, 0))
        );
    }

    #[test]
    fn first_fight_drops_a_key() {
        let mut run = CampaignRun::start(77, 0).unwrap();
        assert_eq!(run.campaign.engine().held_key_count(&run.satchel), 0);
        while run.tally.victories == 0 && run.tally.fights < 20 {
            run.step().unwrap();
        }
        assert_eq!(run.tally.victories, 1);
        assert_eq!(run.campaign.engine().held_key_count(&run.satchel), 1);
    }

    #[test]
    fn seed_report_passes_every_check() {
        let info = SeedInfo::from_numeric(1337);
        let report = simulate_seed(&info, 2, 40).unwrap();
        assert!(report.passed, "{:?}", report.checks);
        assert_eq!(report.checks.len(), 2 + 2 * 2);
        assert_eq!(report.campaigns.len(), 2);
        assert!(report.campaigns.iter().all(|c| c.tally.fights <= 40));
    }
}
