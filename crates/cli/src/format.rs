//! Report → human/json string formatting.
//!
//! Two modes:
//! - **Human** (default): one block per run, comparison table for `compare`
//! - **JSON** (`--json`): `serde_json::to_string_pretty`

use counterbench_concurrency::StrategyKind;
use counterbench_core::Error;
use counterbench_engine::{render_comparison, RunReport};

/// Output formatting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

/// Format a single run.
pub fn format_report(report: &RunReport, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => report.to_json(),
        OutputMode::Human => report.to_string(),
    }
}

/// Format the reports of a `compare` run.
pub fn format_comparison(reports: &[RunReport], mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::to_string_pretty(reports)
            .unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e)),
        OutputMode::Human => {
            let blocks: Vec<String> = reports.iter().map(|r| r.to_string()).collect();
            format!("{}\n\n{}", blocks.join("\n\n"), render_comparison(reports))
        }
    }
}

/// Format an error.
pub fn format_error(err: &Error, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::to_string_pretty(&serde_json::json!({
            "error": format!("{}", err)
        }))
        .unwrap_or_else(|_| format!("{{\"error\": \"{}\"}}", err)),
        OutputMode::Human => format!("(error) {}", err),
    }
}

/// Format the error of one strategy that could not run.
pub fn format_run_failure(kind: StrategyKind, err: &Error, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::to_string_pretty(&serde_json::json!({
            "strategy": kind,
            "error": err.to_string(),
        }))
        .unwrap_or_else(|_| format!("{{\"error\": \"{}\"}}", err)),
        OutputMode::Human => format!("(error) {}: {}", kind.name(), err),
    }
}
