//! Derived metrics and rendering of run results
//!
//! `RunReport` turns a raw `RunResult` into the numbers a reader compares
//! across strategies: how many updates were lost, throughput, and how much
//! optimistic retrying it took. A mismatch between observed and expected is
//! a verdict here, never an error.

use crate::result::RunResult;
use counterbench_concurrency::StrategyKind;
use serde::Serialize;
use std::fmt;

/// Correctness classification of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    /// Observed value equals expected value
    Exact,
    /// The unsafe strategy lost updates, as it is expected to
    ExpectedLoss,
    /// A strategy claiming correctness did not reach the expected value
    CorrectnessDeviation,
    /// At least one worker failed, so the expected value was not attainable
    Incomplete,
    /// The final value could not be read
    Unobserved,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Exact => "exact",
            Verdict::ExpectedLoss => "lost updates (expected)",
            Verdict::CorrectnessDeviation => "CORRECTNESS DEVIATION",
            Verdict::Incomplete => "incomplete (worker failures)",
            Verdict::Unobserved => "unobserved (final read failed)",
        };
        f.write_str(s)
    }
}

/// Metrics derived from one `RunResult`
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Strategy under test
    pub strategy: StrategyKind,
    /// Concurrent workers
    pub worker_count: usize,
    /// Increments per worker
    pub iterations_per_worker: u64,
    /// Wall-clock duration in seconds
    pub elapsed_secs: f64,
    /// `initial + N * M`
    pub expected_value: i64,
    /// Final counter value, if it could be read
    pub observed_value: Option<i64>,
    /// `observed - expected`, if the final value could be read
    pub delta: Option<i64>,
    /// Error of the final read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_read_error: Option<String>,
    /// Increments missing from the final value (0 if none)
    pub lost_updates: u64,
    /// Successful increments per second
    pub throughput: f64,
    /// Write attempts across all workers
    pub total_attempts: u64,
    /// Optimistic conflicts across all workers
    pub total_conflicts: u64,
    /// Conflicts per attempt
    pub conflict_rate: f64,
    /// Ids of workers that ended with an error
    pub failed_workers: Vec<usize>,
    /// Correctness classification
    pub verdict: Verdict,
}

impl RunReport {
    /// Derive the report for `result`
    pub fn from_result(result: &RunResult) -> Self {
        let totals = result.total_stats();
        let delta = result
            .observed_value
            .map(|observed| observed.saturating_sub(result.expected_value));
        let elapsed_secs = result.elapsed.as_secs_f64();
        let throughput = if elapsed_secs > 0.0 {
            totals.increments as f64 / elapsed_secs
        } else {
            0.0
        };
        let failed_workers: Vec<usize> = result.failed_workers().map(|w| w.worker_id).collect();

        let verdict = if result.observed_value.is_none() {
            Verdict::Unobserved
        } else if !failed_workers.is_empty() {
            Verdict::Incomplete
        } else if result.is_exact() {
            Verdict::Exact
        } else if !result.strategy.guarantees_correctness() {
            Verdict::ExpectedLoss
        } else {
            Verdict::CorrectnessDeviation
        };

        if verdict == Verdict::CorrectnessDeviation {
            tracing::error!(
                strategy = %result.strategy,
                observed = ?result.observed_value,
                expected = result.expected_value,
                "correctness deviation"
            );
        }

        Self {
            strategy: result.strategy,
            worker_count: result.worker_count,
            iterations_per_worker: result.iterations_per_worker,
            elapsed_secs,
            expected_value: result.expected_value,
            observed_value: result.observed_value,
            delta,
            final_read_error: result.final_read_error.clone(),
            lost_updates: match delta {
                Some(d) if d < 0 => d.unsigned_abs(),
                _ => 0,
            },
            throughput,
            total_attempts: totals.attempts,
            total_conflicts: totals.conflicts,
            conflict_rate: totals.conflict_rate(),
            failed_workers,
            verdict,
        }
    }

    /// Render the report as pretty JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.strategy.title(), self.strategy)?;
        writeln!(
            f,
            "  workers:      {} x {} increments",
            self.worker_count, self.iterations_per_worker
        )?;
        writeln!(f, "  elapsed:      {:.2} seconds", self.elapsed_secs)?;
        match (self.observed_value, &self.final_read_error) {
            (Some(observed), _) => writeln!(f, "  final value:  {}", observed)?,
            (None, Some(e)) => writeln!(f, "  final value:  unavailable ({})", e)?,
            (None, None) => writeln!(f, "  final value:  unavailable")?,
        }
        writeln!(f, "  expected:     {}", self.expected_value)?;
        if self.lost_updates > 0 {
            writeln!(f, "  lost updates: {}", self.lost_updates)?;
        }
        writeln!(f, "  throughput:   {:.0} increments/s", self.throughput)?;
        if self.strategy == StrategyKind::OptimisticCas {
            writeln!(
                f,
                "  cas attempts: {} ({} conflicts, {:.1}%)",
                self.total_attempts,
                self.total_conflicts,
                self.conflict_rate * 100.0
            )?;
        }
        if !self.failed_workers.is_empty() {
            writeln!(f, "  failed:       workers {:?}", self.failed_workers)?;
        }
        write!(f, "  verdict:      {}", self.verdict)
    }
}

/// Render several reports as one aligned comparison table
pub fn render_comparison(reports: &[RunReport]) -> String {
    let mut out = format!(
        "{:<18} {:>10} {:>12} {:>12} {:>10} {:>14} {:>10}  {}\n",
        "strategy", "elapsed_s", "observed", "expected", "lost", "ops/s", "conflicts", "verdict"
    );
    for r in reports {
        let observed = r
            .observed_value
            .map_or_else(|| "-".to_string(), |v| v.to_string());
        out.push_str(&format!(
            "{:<18} {:>10.2} {:>12} {:>12} {:>10} {:>14.0} {:>10}  {}\n",
            r.strategy.name(),
            r.elapsed_secs,
            observed,
            r.expected_value,
            r.lost_updates,
            r.throughput,
            r.total_conflicts,
            r.verdict
        ));
    }
    out
}
