//! The evaluation seam between the swarm and a concrete model.
//!
//! A [`Problem`] maps a position vector to an [`Evaluation`]: the objective values
//! (all minimized) and one feasibility margin per constraint. A margin is the
//! signed distance from satisfying its constraint; non-negative means satisfied.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::error::EvaluationError;
use super::rng::ParticleRng;

/// Objective values and constraint margins of one position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Objective values, all minimized
    pub objectives: Vec<f64>,
    /// Feasibility margin per constraint
    pub margins: Vec<f64>,
}

impl Evaluation {
    /// An evaluation without constraints, always feasible.
    pub fn unconstrained(objectives: Vec<f64>) -> Self {
        Self {
            objectives,
            margins: Vec::new(),
        }
    }

    pub fn new(objectives: Vec<f64>, margins: Vec<f64>) -> Self {
        Self {
            objectives,
            margins,
        }
    }

    /// True iff every margin is non-negative.
    pub fn is_feasible(&self) -> bool {
        self.margins.iter().all(|m| *m >= 0.0)
    }

    /// Sum of the magnitudes of the negative margins.
    pub fn violation(&self) -> f64 {
        self.margins
            .iter()
            .filter(|m| **m < 0.0)
            .fold(0.0, |total, m| total - m)
    }
}

/// Trait defining a multi-objective minimization problem.
///
/// Implementations must be pure with respect to the position: evaluating the same
/// position twice yields the same result. Lookup tables are expected to be loaded
/// before the swarm starts and are only read during the run.
pub trait Problem: Send + Sync {
    /// Number of decision variables.
    fn dimension(&self) -> usize;

    /// Number of objectives produced by [`Problem::evaluate`].
    fn n_objectives(&self) -> usize;

    /// Evaluates a position.
    ///
    /// # Errors
    ///
    /// Returns an [`EvaluationError`] when the position cannot be scored, for
    /// instance because a lookup table has no entry for the implied allocation.
    fn evaluate(&self, position: &Array1<f64>) -> Result<Evaluation, EvaluationError>;

    /// Optional problem-specific starting position for a particle.
    ///
    /// The swarm clamps the returned vector into its bounds. Returning `None`
    /// falls back to a uniform draw inside the bounds.
    fn initial_position(&self, _rng: &mut ParticleRng) -> Option<Array1<f64>> {
        None
    }
}

impl<P: Problem + ?Sized> Problem for &P {
    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn n_objectives(&self) -> usize {
        (**self).n_objectives()
    }

    fn evaluate(&self, position: &Array1<f64>) -> Result<Evaluation, EvaluationError> {
        (**self).evaluate(position)
    }

    fn initial_position(&self, rng: &mut ParticleRng) -> Option<Array1<f64>> {
        (**self).initial_position(rng)
    }
}
