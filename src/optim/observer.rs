#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};

use super::report::{IterationSummary, RunResult};

/// Hook into the lifecycle of a swarm run.
///
/// All methods default to doing nothing, so an observer only implements the
/// events it cares about. Observers are called on the driving thread, after the
/// serial archive merge of each iteration.
pub trait Observer: Send {
    /// Called once after the swarm has been initialized.
    ///
    /// # Arguments
    /// * `nparts` - Number of particles
    /// * `max_iterations` - Iteration budget
    /// * `summary` - State of the archive after the initial evaluation
    fn observe_init(
        &mut self,
        _nparts: usize,
        _max_iterations: usize,
        _summary: &IterationSummary,
    ) {
    }

    /// Called after every completed iteration.
    fn observe_iter(&mut self, _summary: &IterationSummary) {}

    /// Called once when the swarm is finalized.
    fn observe_final(&mut self, _result: &RunResult) {}
}

/// A custom observer that allows passing a callback function to monitor the run.
///
/// The callback is called after each iteration with the iteration summary.
pub struct CallbackObserver {
    /// The callback function to be executed after each iteration.
    pub callback: Box<dyn FnMut(&IterationSummary) + Send>,
}

impl CallbackObserver {
    pub fn new(callback: impl FnMut(&IterationSummary) + Send + 'static) -> Self {
        Self {
            callback: Box::new(callback),
        }
    }
}

impl Observer for CallbackObserver {
    fn observe_iter(&mut self, summary: &IterationSummary) {
        (self.callback)(summary);
    }
}

/// Terminal progress bar advancing once per iteration.
#[cfg(feature = "progress")]
pub struct ProgressObserver {
    bar: ProgressBar,
}

#[cfg(feature = "progress")]
impl ProgressObserver {
    pub fn new() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    fn message(summary: &IterationSummary) -> String {
        let best = summary
            .best_objectives
            .iter()
            .map(|v| format!("{v:.3e}"))
            .collect::<Vec<_>>()
            .join(", ");

        if summary.feasible_archive {
            format!("archive {} | best [{best}]", summary.archive_size)
        } else {
            format!(
                "archive {} | infeasible, violation {:.3e}",
                summary.archive_size, summary.min_violation
            )
        }
    }
}

#[cfg(feature = "progress")]
impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "progress")]
impl Observer for ProgressObserver {
    fn observe_init(&mut self, nparts: usize, max_iterations: usize, summary: &IterationSummary) {
        let style = ProgressStyle::default_bar()
            .template(&format!(
                "Swarm ({nparts} particles): {{spinner:.green}} [{{bar:40.cyan/blue}}] {{pos}}/{{len}} | {{elapsed}}/{{eta}} | {{msg}}"
            ))
            .map(|style| style.progress_chars("█▉▊▋▌▍▎▏ "))
            .unwrap_or_else(|_| ProgressStyle::default_bar());

        self.bar = ProgressBar::new(max_iterations as u64);
        self.bar.set_style(style);
        self.bar.set_message(Self::message(summary));
    }

    fn observe_iter(&mut self, summary: &IterationSummary) {
        self.bar.set_message(Self::message(summary));
        self.bar.set_position(summary.iteration as u64);
    }

    fn observe_final(&mut self, result: &RunResult) {
        self.bar.finish_with_message(format!(
            "done | {} Pareto members",
            result.final_pareto_set.len()
        ));
    }
}
