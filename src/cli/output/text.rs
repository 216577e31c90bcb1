use owo_colors::OwoColorize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::fxcop::FxCopOutcome;
use crate::types::Severity;

pub fn render(outcome: &FxCopOutcome, project_root: &Path) {
    println!();
    println!("  {}", "\u{2501}".repeat(50).dimmed());
    if outcome.diagnostics.is_empty() {
        if outcome.success {
            println!("  {}", "no issues found".green());
        } else {
            println!("  {}", "code analysis failed".red().bold());
        }
        println!();
        return;
    }

    let mut parts = Vec::new();
    if outcome.errors > 0 {
        parts.push(format!("{} errors", outcome.errors).red().bold().to_string());
    }
    if outcome.warnings > 0 {
        parts.push(
            format!("{} warnings", outcome.warnings)
                .yellow()
                .bold()
                .to_string(),
        );
    }
    println!("  {}", parts.join(", "));
    println!("  {}", "\u{2501}".repeat(50).dimmed());

    let mut by_check: BTreeMap<_, Vec<_>> = BTreeMap::new();
    for d in &outcome.diagnostics {
        by_check.entry(d.label()).or_default().push(d);
    }

    // errors first, then by check id
    let mut checks: Vec<_> = by_check.iter().collect();
    checks.sort_by_key(|(label, diags)| {
        let worst = diags.iter().map(|d| d.severity).max();
        (std::cmp::Reverse(worst), **label)
    });

    for (label, diags) in checks {
        let severity = diags
            .iter()
            .map(|d| d.severity)
            .max()
            .unwrap_or(Severity::Warning);
        let (icon, title) = match severity {
            Severity::Error => ("\u{2717}".red().to_string(), label.red().bold().to_string()),
            Severity::Warning => (
                "\u{26a0}".yellow().to_string(),
                label.yellow().bold().to_string(),
            ),
        };
        let category = diags
            .iter()
            .find_map(|d| d.subcategory.as_deref())
            .map(|c| format!(" {}", c.dimmed()))
            .unwrap_or_default();

        println!();
        println!(
            "  {icon} {title}{category} {}",
            format!("({})", diags.len()).dimmed()
        );

        let mut by_file: BTreeMap<_, Vec<_>> = BTreeMap::new();
        for d in diags {
            by_file
                .entry(super::relative_path(d, project_root))
                .or_default()
                .push(d);
        }
        for (file, file_diags) in &by_file {
            match file {
                Some(file) => {
                    println!("    {}", file.dimmed());
                    for d in file_diags {
                        println!("      L{:<4} {}", d.line, d.message);
                    }
                }
                None => {
                    for d in file_diags {
                        println!("    {}", d.message);
                    }
                }
            }
        }
    }

    println!();
}
