//! Colored terminal rendering for run summaries.

use owo_colors::OwoColorize;
use traincal_core::sync::RunSummary;

pub fn render_summary(summary: &RunSummary, dry_run: bool) -> String {
    let (created, deleted) = if dry_run {
        ("Would create", "Would delete")
    } else {
        ("Created", "Deleted")
    };

    let mut lines = vec![
        format!("{created}:            {}", summary.created.green()),
        format!("{deleted}:            {}", summary.deleted.red()),
    ];
    if summary.duplicates > 0 {
        lines.push(format!(
            "Skipped duplicates: {}",
            summary.duplicates.yellow()
        ));
    }
    if summary.not_found > 0 {
        lines.push(format!("Not found:          {}", summary.not_found.yellow()));
    }
    if summary.errors > 0 {
        lines.push(format!("Errors:             {}", summary.errors.red()));
    }
    lines.join("\n")
}
