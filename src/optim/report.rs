use std::fmt::{self, Display};

use log::info;
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use super::candidate::Candidate;
use super::metrics::ideal_point;

/// Snapshot of the swarm after one iteration
///
/// Passed to observers after every completed iteration and collected into the
/// history of a [`RunResult`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IterationSummary {
    /// One-based number of the completed iteration
    pub iteration: usize,
    /// Number of archive members after the iteration
    pub archive_size: usize,
    /// Whether the archive holds feasible members
    pub feasible_archive: bool,
    /// Per-objective minimum over the archive
    pub best_objectives: Vec<f64>,
    /// Smallest aggregate violation in the archive
    pub min_violation: f64,
    /// Evaluations that failed during this iteration
    pub evaluation_failures: usize,
}

/// Outcome of a finalized swarm run
///
/// The final Pareto set is the archive content at finalization, in insertion
/// order. If no feasible candidate was ever observed the set holds the
/// least-infeasible candidates and `feasible_found` is `false`.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    /// Archive members at finalization
    pub final_pareto_set: Vec<Candidate>,
    /// Current position and fitness of every particle, in index order
    pub final_population: Vec<Candidate>,
    /// Whether the final Pareto set is feasible
    pub feasible_found: bool,
    /// Number of completed iterations
    pub iterations: usize,
    /// Master seed the run was driven by
    pub seed: u64,
    /// Evaluations that failed over the whole run, including initialization
    pub evaluation_failures: usize,
    /// One summary per completed iteration
    pub history: Vec<IterationSummary>,
}

impl RunResult {
    /// Per-objective minimum over the final Pareto set.
    pub fn best_objectives(&self) -> Vec<f64> {
        ideal_point(&self.final_pareto_set)
    }

    /// Alias of [`RunResult::best_objectives`] under its usual name.
    pub fn ideal_point(&self) -> Vec<f64> {
        self.best_objectives()
    }

    /// Serializes the result as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn format_values(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format!("{v:.4}"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = Builder::default();
        builder.push_record(vec!["Swarm Run Summary".to_string()]);
        builder.push_record(vec![format!("Seed: {}", self.seed)]);
        builder.push_record(vec![format!("Iterations: {}", self.iterations)]);
        builder.push_record(vec![format!(
            "Evaluation failures: {}",
            self.evaluation_failures
        )]);
        builder.push_record(vec![format!("Feasible: {}", self.feasible_found)]);
        builder.push_record(vec![format!(
            "Pareto set size: {}",
            self.final_pareto_set.len()
        )]);
        builder.push_record(vec![format!(
            "Ideal point: [{}]",
            format_values(&self.best_objectives())
        )]);

        let mut table = builder.build();
        table.with(Style::rounded());
        writeln!(f, "{table}")?;

        if self.final_pareto_set.is_empty() {
            return Ok(());
        }

        let mut members = Builder::default();
        members.push_record(vec![
            "#".to_string(),
            "Objectives".to_string(),
            "Violation".to_string(),
        ]);
        for (i, member) in self.final_pareto_set.iter().enumerate() {
            members.push_record(vec![
                i.to_string(),
                format_values(&member.objectives),
                format!("{:.4}", member.violation),
            ]);
        }

        let mut table = members.build();
        table.with(Style::rounded());
        write!(f, "{table}")
    }
}

/// Destination for a finished run.
///
/// Sinks are handed the final result once, after the swarm is finalized.
pub trait ReportSink {
    fn emit(&mut self, result: &RunResult);
}

/// Writes a one-line summary per run through the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn emit(&mut self, result: &RunResult) {
        info!(
            "Run finished after {} iterations (seed {}): {} Pareto members, feasible: {}, ideal point [{}]",
            result.iterations,
            result.seed,
            result.final_pareto_set.len(),
            result.feasible_found,
            format_values(&result.best_objectives()),
        );
    }
}

impl<F> ReportSink for F
where
    F: FnMut(&RunResult),
{
    fn emit(&mut self, result: &RunResult) {
        self(result)
    }
}
