//! The swarm and its iteration loop.
//!
//! A [`Swarm`] owns the particles, the Pareto archive and the hyperparameters of
//! a run, and moves through the states
//!
//! `Created -> Initialized -> Iterating(k) -> Finalized`
//!
//! Every iteration runs in two phases:
//!
//! 1. Each particle picks a guidance position from the archive as it stood at the
//!    start of the iteration, moves, evaluates its new position and updates its
//!    personal best. Particles only touch their own state here, so this phase
//!    runs on the rayon pool when `parallel` is set.
//! 2. The evaluated candidates are offered to the archive one by one, in
//!    particle-index order.
//!
//! Since every particle draws from its own random stream and the merge order is
//! fixed, a run is fully determined by its master seed, with or without
//! parallelism.

use log::{debug, info, warn};
use ndarray::Array1;
use rayon::prelude::*;
use serde::Serialize;

use super::archive::ParetoArchive;
use super::candidate::Candidate;
use super::config::{GuidanceStrategy, PsoConfig};
use super::error::{EvaluationError, OptimizeError};
use super::observer::Observer;
use super::particle::{Bounds, Coefficients, Particle};
use super::problem::Problem;
use super::report::{IterationSummary, RunResult};
use super::rng::{particle_stream, resolve_seed};

/// Lifecycle state of a [`Swarm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SwarmState {
    /// Configuration accepted, no particles yet
    Created,
    /// Particles created and evaluated once
    Initialized,
    /// The given number of iterations has completed
    Iterating(usize),
    /// All iterations completed; the swarm is read-only
    Finalized,
}

/// Result of evaluating one particle in the parallel phase.
struct Outcome {
    index: usize,
    candidate: Candidate,
    error: Option<EvaluationError>,
}

/// Multi-objective particle swarm
///
/// # Examples
///
/// ```
/// use bmpswarm::optim::{Evaluation, EvaluationError, Problem, PsoConfigBuilder, Swarm};
/// use ndarray::Array1;
///
/// struct Schaffer;
///
/// impl Problem for Schaffer {
///     fn dimension(&self) -> usize { 1 }
///     fn n_objectives(&self) -> usize { 2 }
///     fn evaluate(&self, x: &Array1<f64>) -> Result<Evaluation, EvaluationError> {
///         Ok(Evaluation::unconstrained(vec![x[0].powi(2), (x[0] - 2.0).powi(2)]))
///     }
/// }
///
/// let config = PsoConfigBuilder::default()
///     .nparts(10)
///     .max_iterations(20)
///     .lower_bound(-5.0)
///     .upper_bound(5.0)
///     .seed(Some(1))
///     .build()
///     .unwrap();
///
/// let mut swarm = Swarm::new(config, Schaffer).unwrap();
/// let result = swarm.run().unwrap();
///
/// assert!(result.feasible_found);
/// assert_eq!(result.iterations, 20);
/// ```
pub struct Swarm<P: Problem> {
    config: PsoConfig,
    problem: P,
    seed: u64,
    state: SwarmState,
    particles: Vec<Particle>,
    archive: ParetoArchive,
    evaluation_failures: usize,
    history: Vec<IterationSummary>,
    observers: Vec<Box<dyn Observer>>,
}

impl<P: Problem> Swarm<P> {
    /// Creates a swarm for the given problem.
    ///
    /// The configuration is validated and checked against the problem's shape
    /// before anything else happens. When no seed is configured, a master seed is
    /// drawn here and can be read back through [`Swarm::seed`].
    ///
    /// # Errors
    ///
    /// Returns an [`OptimizeError`] if the configuration is invalid or its
    /// dimension or number of objectives disagree with the problem.
    pub fn new(config: PsoConfig, problem: P) -> Result<Self, OptimizeError> {
        config.validate()?;

        if config.dimension != problem.dimension() {
            return Err(OptimizeError::DimensionMismatch {
                expected: config.dimension,
                found: problem.dimension(),
            });
        }

        if config.nobjs != problem.n_objectives() {
            return Err(OptimizeError::ObjectiveMismatch {
                expected: config.nobjs,
                found: problem.n_objectives(),
            });
        }

        let seed = resolve_seed(config.seed);
        if config.seed.is_none() {
            info!("No seed configured, drew master seed {seed}");
        }

        debug!(
            "Created swarm: {} particles, dimension {}, {} objectives, {} iterations",
            config.nparts, config.dimension, config.nobjs, config.max_iterations
        );

        Ok(Self {
            config,
            problem,
            seed,
            state: SwarmState::Created,
            particles: Vec::new(),
            archive: ParetoArchive::new(),
            evaluation_failures: 0,
            history: Vec::new(),
            observers: Vec::new(),
        })
    }

    /// Attaches an observer. Observers are notified in the order they were added.
    pub fn add_observer(mut self, observer: impl Observer + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    /// Attaches a boxed observer in place.
    pub fn push_observer(&mut self, observer: Box<dyn Observer>) {
        self.observers.push(observer);
    }

    /// Creates and evaluates all particles and seeds the archive.
    ///
    /// # Errors
    ///
    /// Returns [`OptimizeError::AlreadyInitialized`] unless the swarm is in the
    /// `Created` state.
    pub fn initialize(&mut self) -> Result<(), OptimizeError> {
        if self.state != SwarmState::Created {
            return Err(OptimizeError::AlreadyInitialized);
        }

        let bounds = self.bounds();
        let mut particles = Vec::with_capacity(self.config.nparts);
        for index in 0..self.config.nparts {
            let mut rng = particle_stream(self.seed, index);
            let start = self.problem.initial_position(&mut rng);
            particles.push(Particle::initialize(
                index,
                self.config.dimension,
                self.config.nobjs,
                bounds,
                self.config.initial_velocity_scale,
                start,
                rng,
            ));
        }
        self.particles = particles;

        let problem = &self.problem;
        let nobjs = self.config.nobjs;
        let outcomes = map_particles(&mut self.particles, self.config.parallel, |particle| {
            evaluate_particle(particle, problem, nobjs)
        });
        let failures = self.merge(outcomes);

        self.state = SwarmState::Initialized;

        let summary = self.summarize(0, failures);
        debug!(
            "Initialized swarm (seed {}): archive {}, feasible {}",
            self.seed, summary.archive_size, summary.feasible_archive
        );
        for observer in self.observers.iter_mut() {
            observer.observe_init(self.config.nparts, self.config.max_iterations, &summary);
        }

        Ok(())
    }

    /// Runs one iteration.
    ///
    /// After the last iteration the swarm is finalized and observers receive the
    /// final result.
    ///
    /// # Errors
    ///
    /// Returns [`OptimizeError::NotInitialized`] before [`Swarm::initialize`] and
    /// [`OptimizeError::AlreadyFinalized`] once all iterations have run.
    pub fn step(&mut self) -> Result<IterationSummary, OptimizeError> {
        let completed = match self.state {
            SwarmState::Created => return Err(OptimizeError::NotInitialized),
            SwarmState::Finalized => {
                return Err(OptimizeError::AlreadyFinalized {
                    iterations: self.config.max_iterations,
                })
            }
            SwarmState::Initialized => 0,
            SwarmState::Iterating(k) => k,
        };

        let archive = &self.archive;
        let problem = &self.problem;
        let nobjs = self.config.nobjs;
        let guidance = self.config.guidance;
        let bounds = self.bounds();
        let coefficients = Coefficients {
            w: self.config.w,
            c1: self.config.c1,
            c2: self.config.c2,
        };

        let outcomes = map_particles(&mut self.particles, self.config.parallel, |particle| {
            let guide = select_guide(archive, guidance, particle);
            particle.update_velocity_and_position(&guide, coefficients, bounds);
            evaluate_particle(particle, problem, nobjs)
        });
        let failures = self.merge(outcomes);

        let iteration = completed + 1;
        let summary = self.summarize(iteration, failures);
        debug!(
            "Iteration {iteration}: archive {}, feasible {}, best {:?}, min violation {}, failures {}",
            summary.archive_size,
            summary.feasible_archive,
            summary.best_objectives,
            summary.min_violation,
            summary.evaluation_failures
        );

        self.history.push(summary.clone());
        for observer in self.observers.iter_mut() {
            observer.observe_iter(&summary);
        }

        if iteration == self.config.max_iterations {
            self.finalize();
        } else {
            self.state = SwarmState::Iterating(iteration);
        }

        Ok(summary)
    }

    /// Initializes the swarm if needed and iterates until it is finalized.
    pub fn run(&mut self) -> Result<RunResult, OptimizeError> {
        if self.state == SwarmState::Created {
            self.initialize()?;
        }
        while self.state != SwarmState::Finalized {
            self.step()?;
        }
        self.result()
    }

    /// Result of a finalized run.
    ///
    /// # Errors
    ///
    /// Returns [`OptimizeError::NotFinalized`] while iterations remain.
    pub fn result(&self) -> Result<RunResult, OptimizeError> {
        match self.state {
            SwarmState::Finalized => Ok(self.build_result()),
            _ => Err(OptimizeError::NotFinalized {
                iterations: self.iterations(),
                max_iterations: self.config.max_iterations,
            }),
        }
    }

    /// Current position and fitness of every particle, in index order.
    pub fn final_population(&self) -> Vec<Candidate> {
        self.particles.iter().map(Particle::candidate).collect()
    }

    /// Archive members in insertion order.
    pub fn final_pareto_set(&self) -> &[Candidate] {
        self.archive.members()
    }

    /// Number of completed iterations.
    pub fn iterations(&self) -> usize {
        match self.state {
            SwarmState::Created | SwarmState::Initialized => 0,
            SwarmState::Iterating(k) => k,
            SwarmState::Finalized => self.config.max_iterations,
        }
    }

    pub fn state(&self) -> SwarmState {
        self.state
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &PsoConfig {
        &self.config
    }

    pub fn problem(&self) -> &P {
        &self.problem
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn archive(&self) -> &ParetoArchive {
        &self.archive
    }

    pub fn evaluation_failures(&self) -> usize {
        self.evaluation_failures
    }

    pub fn history(&self) -> &[IterationSummary] {
        &self.history
    }

    fn bounds(&self) -> Bounds {
        Bounds {
            lower: self.config.lower_bound,
            upper: self.config.upper_bound,
        }
    }

    /// Offers the outcomes to the archive in particle-index order.
    ///
    /// Returns the number of failed evaluations among them.
    fn merge(&mut self, outcomes: Vec<Outcome>) -> usize {
        let mut failures = 0;
        for outcome in outcomes {
            if let Some(error) = outcome.error {
                warn!(
                    "Evaluation of particle {} failed, treating it as infeasible: {error}",
                    outcome.index
                );
                failures += 1;
            }
            self.archive.offer(&outcome.candidate);
        }
        self.evaluation_failures += failures;
        failures
    }

    fn summarize(&self, iteration: usize, failures: usize) -> IterationSummary {
        IterationSummary {
            iteration,
            archive_size: self.archive.len(),
            feasible_archive: self.archive.has_feasible(),
            best_objectives: self.archive.best_objectives(),
            min_violation: self.archive.min_violation().unwrap_or(f64::INFINITY),
            evaluation_failures: failures,
        }
    }

    fn build_result(&self) -> RunResult {
        RunResult {
            final_pareto_set: self.archive.members().to_vec(),
            final_population: self.final_population(),
            feasible_found: self.archive.has_feasible(),
            iterations: self.iterations(),
            seed: self.seed,
            evaluation_failures: self.evaluation_failures,
            history: self.history.clone(),
        }
    }

    fn finalize(&mut self) {
        self.state = SwarmState::Finalized;
        let result = self.build_result();

        if result.feasible_found {
            info!(
                "Swarm finalized after {} iterations with {} Pareto members",
                result.iterations,
                result.final_pareto_set.len()
            );
        } else {
            warn!(
                "Swarm finalized after {} iterations without a feasible candidate, least violation {}",
                result.iterations,
                self.archive.min_violation().unwrap_or(f64::INFINITY)
            );
        }

        for observer in self.observers.iter_mut() {
            observer.observe_final(&result);
        }
    }
}

/// Applies `f` to every particle, on the rayon pool if `parallel` is set.
///
/// The outcomes are returned in particle-index order either way.
fn map_particles<F>(particles: &mut [Particle], parallel: bool, f: F) -> Vec<Outcome>
where
    F: Fn(&mut Particle) -> Outcome + Sync + Send,
{
    if parallel {
        particles.par_iter_mut().map(f).collect()
    } else {
        particles.iter_mut().map(f).collect()
    }
}

fn select_guide(
    archive: &ParetoArchive,
    strategy: GuidanceStrategy,
    particle: &mut Particle,
) -> Array1<f64> {
    let member = match strategy {
        GuidanceStrategy::Random => archive.random_member(particle.rng_mut()),
        GuidanceStrategy::LeastAggregate => archive.least_aggregate(),
    };

    match member {
        Some(member) => member.position.clone(),
        None => particle.personal_best_position().clone(),
    }
}

/// Scores a position, rejecting objective vectors of the wrong shape and
/// non-finite objectives or margins.
fn evaluate<P: Problem>(
    problem: &P,
    position: &Array1<f64>,
    nobjs: usize,
) -> Result<Candidate, EvaluationError> {
    let evaluation = problem.evaluate(position)?;

    if evaluation.objectives.len() != nobjs {
        return Err(EvaluationError::Custom(format!(
            "expected {nobjs} objectives, got {}",
            evaluation.objectives.len()
        )));
    }

    if let Some(index) = evaluation.objectives.iter().position(|v| !v.is_finite()) {
        return Err(EvaluationError::NonFiniteObjective { index });
    }

    if let Some(index) = evaluation.margins.iter().position(|m| !m.is_finite()) {
        return Err(EvaluationError::NonFiniteMargin { index });
    }

    Ok(Candidate::from_evaluation(position.clone(), &evaluation))
}

fn evaluate_particle<P: Problem>(particle: &mut Particle, problem: &P, nobjs: usize) -> Outcome {
    let (candidate, error) = match evaluate(problem, particle.position(), nobjs) {
        Ok(candidate) => (candidate, None),
        Err(error) => (
            Candidate::failed(particle.position().clone(), nobjs),
            Some(error),
        ),
    };

    particle.record(&candidate);
    particle.update_personal_best();

    Outcome {
        index: particle.index(),
        candidate,
        error,
    }
}
