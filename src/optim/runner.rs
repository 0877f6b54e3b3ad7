#[cfg(not(feature = "progress"))]
use log::warn;

#[cfg(feature = "progress")]
use super::observer::ProgressObserver;
use super::{
    config::PsoConfig,
    error::OptimizeError,
    observer::CallbackObserver,
    problem::Problem,
    report::{ReportSink, RunResult},
    swarm::Swarm,
};

/// Runs a full swarm optimization on the given problem
///
/// This function:
/// 1. Validates the configuration against the problem and creates the swarm
/// 2. Attaches the callback and progress observers, if requested
/// 3. Initializes the swarm and runs all iterations
/// 4. Hands the result to the report sink, if one is given
///
/// # Arguments
/// * `problem` - The problem to minimize
/// * `config` - Swarm hyperparameters
/// * `callback` - Optional observer called after every iteration
/// * `show_progress` - Whether to draw a progress bar on the terminal (`progress` feature)
/// * `sink` - Optional destination for the finished result
///
/// # Returns
/// * `Result<RunResult, OptimizeError>` - The final Pareto set, population and history
///
/// # Errors
/// Returns OptimizeError if the configuration is invalid or does not match the
/// problem. Failed evaluations never abort the run.
///
/// # Examples
///
/// ```
/// use bmpswarm::optim::{optimize, Evaluation, EvaluationError, Problem, PsoConfigBuilder};
/// use ndarray::Array1;
///
/// struct Sphere;
///
/// impl Problem for Sphere {
///     fn dimension(&self) -> usize { 2 }
///     fn n_objectives(&self) -> usize { 1 }
///     fn evaluate(&self, x: &Array1<f64>) -> Result<Evaluation, EvaluationError> {
///         Ok(Evaluation::unconstrained(vec![x.mapv(|v| v * v).sum()]))
///     }
/// }
///
/// let config = PsoConfigBuilder::default()
///     .nparts(15)
///     .nobjs(1)
///     .dimension(2)
///     .max_iterations(30)
///     .lower_bound(-1.0)
///     .seed(Some(9))
///     .build()
///     .unwrap();
///
/// let result = optimize().problem(Sphere).config(config).call().unwrap();
/// assert_eq!(result.final_pareto_set.len(), 1);
/// ```
#[bon::builder]
pub fn optimize<P: Problem>(
    problem: P,
    config: PsoConfig,
    callback: Option<CallbackObserver>,
    #[builder(default)] show_progress: bool,
    sink: Option<Box<dyn ReportSink>>,
) -> Result<RunResult, OptimizeError> {
    let mut swarm = Swarm::new(config, problem)?;

    if let Some(observer) = callback {
        swarm = swarm.add_observer(observer);
    }

    if show_progress {
        #[cfg(feature = "progress")]
        {
            swarm = swarm.add_observer(ProgressObserver::new());
        }
        #[cfg(not(feature = "progress"))]
        warn!("Progress bars need the `progress` feature, running without one");
    }

    let result = swarm.run()?;

    if let Some(mut sink) = sink {
        sink.emit(&result);
    }

    Ok(result)
}
