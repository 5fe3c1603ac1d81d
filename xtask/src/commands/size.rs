use crate::workspace::Workspace;
use anyhow::Result;
use std::path::Path;

/// Budgeted share of the core pipeline's line count, keyed by crate name.
/// Doesn't cover every workspace member: `core` and `broker` are ambient
/// infrastructure the budget doesn't itemize, and `xtask` itself is excluded
/// entirely from the count it's performing.
const BUDGET_SHARE: &[(&str, f64)] = &[
    ("pipeline-mdg", 0.10),
    ("pipeline-se", 0.20),
    ("pipeline-oeg", 0.15),
    ("pipeline-dgw", 0.25),
    ("pipeline-supervisor", 0.15),
    ("pipeline-transport", 0.10),
    ("pipeline-model", 0.05),
];

const BUDGET_MIN: u64 = 9_000;
const BUDGET_MAX: u64 = 12_000;

pub fn show_size_report(root: &Path) -> Result<()> {
    let workspace = Workspace::load(root)?;
    let total = workspace.total_lines();

    println!("crate line counts:");
    println!("{:<24} {:>10} {:>12} {:>12}", "crate", "lines", "% of total", "budget %");
    for crate_info in &workspace.crates {
        let percent = percent_of(crate_info.source_lines, total);
        let budgeted = BUDGET_SHARE
            .iter()
            .find(|(name, _)| *name == crate_info.name)
            .map(|(_, share)| format!("{:.0}%", share * 100.0))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "{:<24} {:>10} {:>11.1}% {:>12}",
            crate_info.name, crate_info.source_lines, percent, budgeted
        );
    }

    println!();
    println!("total: {total} lines (budget: {BUDGET_MIN}-{BUDGET_MAX})");
    if total < BUDGET_MIN {
        println!("under budget by {} lines", BUDGET_MIN - total);
    } else if total > BUDGET_MAX {
        println!("over budget by {} lines", total - BUDGET_MAX);
    } else {
        println!("within budget");
    }

    Ok(())
}

fn percent_of(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}
