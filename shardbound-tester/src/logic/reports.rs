use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use shardbound_game::Tier;
use std::collections::BTreeMap;
use std::io::Write;
use std::time::Duration;

use super::RunStats;

/// Totals across every simulated seed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SweepSummary {
    pub runs: usize,
    pub passed: usize,
    pub moves: u32,
    pub ambushes: u32,
    pub victories: u32,
    pub defeats: u32,
    pub ambush_rate: f64,
    pub win_rate: f64,
    pub loot_by_tier: BTreeMap<Tier, u32>,
    pub items_lost: u32,
    pub slice_entries: u32,
    pub rejected: BTreeMap<String, u32>,
}

#[must_use]
pub fn summarize(runs: &[RunStats]) -> SweepSummary {
    let mut summary = SweepSummary {
        runs: runs.len(),
        ..SweepSummary::default()
    };
    for run in runs {
        if run.passed() {
            summary.passed += 1;
        }
        summary.moves += run.moves;
        summary.ambushes += run.ambushes;
        summary.victories += run.victories;
        summary.defeats += run.defeats;
        summary.items_lost += run.items_lost;
        summary.slice_entries += run.slice_entries;
        for (tier, count) in &run.loot_by_tier {
            *summary.loot_by_tier.entry(*tier).or_default() += count;
        }
        for (reason, count) in &run.rejected {
            *summary.rejected.entry(reason.clone()).or_default() += count;
        }
    }
    summary.ambush_rate = ratio(summary.ambushes, summary.moves);
    summary.win_rate = ratio(summary.victories, summary.ambushes);
    summary
}

fn ratio(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        0.0
    } else {
        f64::from(part) / f64::from(whole)
    }
}

pub fn generate_console_report(
    out: &mut dyn Write,
    runs: &[RunStats],
    total_duration: Duration,
) -> Result<()> {
    let summary = summarize(runs);
    writeln!(out)?;
    writeln!(out, "{}", "📊 Encounter Sweep Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "==========================".cyan())?;
    writeln!(out, "Seeds: {}", summary.runs)?;
    writeln!(out, "Passed: {}", summary.passed.to_string().green())?;
    writeln!(
        out,
        "Failed: {}",
        (summary.runs - summary.passed).to_string().red()
    )?;
    writeln!(out, "Moves: {}", summary.moves)?;
    writeln!(
        out,
        "Ambushes: {} ({:.1}% of moves)",
        summary.ambushes,
        summary.ambush_rate * 100.0
    )?;
    writeln!(
        out,
        "Victories / defeats: {} / {} ({:.1}% won)",
        summary.victories,
        summary.defeats,
        summary.win_rate * 100.0
    )?;
    writeln!(out, "Items lost: {}", summary.items_lost)?;
    writeln!(out, "Slice entries: {}", summary.slice_entries)?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    writeln!(out, "{}", "💰 Loot by tier".bright_yellow().bold())?;
    for tier in Tier::ORDER {
        let count = summary.loot_by_tier.get(&tier).copied().unwrap_or(0);
        writeln!(out, "   {tier:?}: {count}")?;
    }
    if !summary.rejected.is_empty() {
        writeln!(out, "{}", "🚫 Rejected moves".bright_yellow().bold())?;
        for (reason, count) in &summary.rejected {
            writeln!(out, "   {reason}: {count}")?;
        }
    }
    writeln!(out)?;

    for run in runs {
        let status = if run.passed() {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(out, "{} seed {} ({})", status, run.seed, run.shard_id.bold())?;
        writeln!(
            out,
            "   {} moves, {} ambushes, max danger {}, mean chance {:.3}",
            run.moves, run.ambushes, run.max_danger_level, run.mean_chance
        )?;
        for violation in &run.violations {
            writeln!(out, "     • {}", violation.red())?;
        }
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, runs: &[RunStats]) -> Result<()> {
    #[derive(Serialize)]
    struct JsonReport<'a> {
        summary: SweepSummary,
        runs: &'a [RunStats],
    }

    let report = JsonReport {
        summary: summarize(runs),
        runs,
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, runs: &[RunStats]) -> Result<()> {
    let summary = summarize(runs);
    writeln!(out, "# Shardbound Encounter Sweep\n")?;
    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Seeds**: {}", summary.runs)?;
    writeln!(out, "- **Passed**: {}", summary.passed)?;
    writeln!(
        out,
        "- **Ambush rate**: {:.1}%",
        summary.ambush_rate * 100.0
    )?;
    writeln!(out, "- **Win rate**: {:.1}%", summary.win_rate * 100.0)?;
    writeln!(out, "- **Items lost**: {}\n", summary.items_lost)?;

    writeln!(out, "## Runs\n")?;
    writeln!(
        out,
        "| Seed | Moves | Ambushes | Victories | Defeats | Slices | Status |"
    )?;
    writeln!(out, "|---|---|---|---|---|---|---|")?;
    for run in runs {
        let status = if run.passed() { "✅" } else { "❌" };
        writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} | {} |",
            run.seed, run.moves, run.ambushes, run.victories, run.defeats, run.slice_entries, status
        )?;
    }

    let failing: Vec<&RunStats> = runs.iter().filter(|r| !r.passed()).collect();
    if !failing.is_empty() {
        writeln!(out, "\n## Violations\n")?;
        for run in failing {
            for violation in &run.violations {
                writeln!(out, "- seed {}: {violation}", run.seed)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(seed: u32, violations: Vec<String>) -> RunStats {
        let mut loot_by_tier = BTreeMap::new();
        loot_by_tier.insert(Tier::T1, 2);
        RunStats {
            seed,
            shard_id: format!("sim-{seed}"),
            moves: 10,
            ambushes: 4,
            victories: 3,
            defeats: 1,
            loot_by_tier,
            violations,
            ..RunStats::default()
        }
    }

    #[test]
    fn summary_totals_runs() {
        let summary = summarize(&[sample(1, Vec::new()), sample(2, vec!["bad".to_string()])]);
        assert_eq!(summary.runs, 2);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.ambushes, 8);
        assert_eq!(summary.loot_by_tier.get(&Tier::T1), Some(&4));
        assert!((summary.ambush_rate - 0.4).abs() < f64::EPSILON);
        assert!((summary.win_rate - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_summary_has_zero_rates() {
        let summary = summarize(&[]);
        assert_eq!(summary.ambush_rate, 0.0);
        assert_eq!(summary.win_rate, 0.0);
    }

    #[test]
    fn json_report_contains_summary_and_runs() {
        let mut buffer = Vec::new();
        generate_json_report(&mut buffer, &[sample(5, Vec::new())]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value["summary"]["runs"], 1);
        assert_eq!(value["runs"][0]["seed"], 5);
    }

    #[test]
    fn markdown_lists_violations() {
        let mut buffer = Vec::new();
        generate_markdown_report(&mut buffer, &[sample(6, vec!["lost track".to_string()])])
            .unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("# Shardbound Encounter Sweep"));
        assert!(text.contains("seed 6: lost track"));
    }

    #[test]
    fn console_report_shows_tiers() {
        colored::control::set_override(false);
        let mut buffer = Vec::new();
        generate_console_report(&mut buffer, &[sample(7, Vec::new())], Duration::ZERO).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("T1: 2"));
        assert!(text.contains("seed 7"));
    }
}
