//! Human-readable run summaries.

use std::fmt::Write;

use fkprune_core::{DeletionStats, PruneReport};

/// Render a report as indented text.
pub fn format_report(report: &PruneReport) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "pruned {} row(s) in {} ms",
        report.rows_deleted(),
        report.duration.as_millis()
    );
    if report.pre_queries_run > 0 {
        let _ = writeln!(out, "  pre-queries: {}", report.pre_queries_run);
    }
    write_phase(&mut out, "seed criteria", &report.seed);
    if !report.truncated_tables.is_empty() {
        let _ = writeln!(out, "  emptied: {}", report.truncated_tables.join(", "));
    }
    write_phase(&mut out, "orphans", &report.orphans);
    match report.constraints_verified {
        Some(n) => {
            let _ = writeln!(out, "  sanity check: {} constraint(s) verified", n);
        }
        None => {
            let _ = writeln!(out, "  sanity check: skipped");
        }
    }
    let _ = write!(out, "  constraints restored: {}", report.constraints_restored);

    out
}

fn write_phase(out: &mut String, label: &str, stats: &DeletionStats) {
    let _ = writeln!(
        out,
        "  {}: {} row(s) in {} pass(es)",
        label,
        stats.total(),
        stats.iterations
    );
    for (table, rows) in &stats.rows_deleted {
        let _ = writeln!(out, "    {}: {}", table, rows);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_format_report() {
        let mut report = PruneReport::default();
        report.seed.iterations = 1;
        report.seed.rows_deleted.insert("parents".to_string(), 2);
        report.orphans.iterations = 2;
        report.orphans.rows_deleted.insert("children".to_string(), 3);
        report.truncated_tables = vec!["sessions".to_string()];
        report.constraints_verified = Some(4);
        report.duration = Duration::from_millis(12);

        let text = format_report(&report);
        assert!(text.starts_with("pruned 5 row(s) in 12 ms"));
        assert!(text.contains("  seed criteria: 2 row(s) in 1 pass(es)\n    parents: 2"));
        assert!(text.contains("  emptied: sessions"));
        assert!(text.contains("    children: 3"));
        assert!(text.contains("sanity check: 4 constraint(s) verified"));
        assert!(!text.contains("pre-queries"));
    }

    #[test]
    fn test_skipped_sanity_check() {
        let text = format_report(&PruneReport::default());
        assert!(text.contains("sanity check: skipped"));
        assert!(text.ends_with("constraints restored: 0"));
    }
}
