use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::time::Duration;

use super::SeedReport;

pub fn generate_console_report(
    out: &mut dyn Write,
    reports: &[SeedReport],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Campaign Simulation Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "==============================".cyan())?;

    let total = reports.len();
    let passed = reports.iter().filter(|r| r.passed).count();
    writeln!(out, "Seeds: {total}")?;
    writeln!(out, "Passed: {}", passed.to_string().green())?;
    writeln!(out, "Failed: {}", (total - passed).to_string().red())?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for report in reports {
        let status = if report.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(
            out,
            "{} seed {} ({})",
            status,
            report.seed.seed,
            report.seed.code.bold()
        )?;
        for campaign in &report.campaigns {
            let ending = if campaign.final_boss_defeated {
                "crown taken".green()
            } else if campaign.final_gate_unlocked {
                "gate open".yellow()
            } else {
                "gate shut".red()
            };
            writeln!(
                out,
                "   Campaign {}: {} fights, {}W/{}L/{}F, {} champions, {} keys spent, {} loot, level {} - {}",
                campaign.campaign,
                campaign.tally.fights,
                campaign.tally.victories,
                campaign.tally.defeats,
                campaign.tally.fled,
                campaign.distinct_defeated,
                campaign.tally.keys_consumed,
                campaign.tally.loot_items,
                campaign.party_level,
                ending
            )?;
        }
        for check in report.checks.iter().filter(|c| !c.passed) {
            writeln!(out, "     • {}", check.name.red())?;
        }
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, reports: &[SeedReport]) -> Result<()> {
    let json_output = serde_json::to_string_pretty(reports)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}
