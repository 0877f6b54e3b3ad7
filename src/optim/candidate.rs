//! Candidate solutions and the constrained dominance rule.
//!
//! A [`Candidate`] pairs a position with its evaluated objectives, its feasibility
//! and its aggregate constraint violation. Candidates are plain values: cloning
//! one copies its position, and no candidate is shared between particles.
//!
//! Candidate A dominates candidate B iff
//! - A is feasible and B is not, or
//! - both are feasible and A's objectives are component-wise `<=` B's with at
//!   least one strict `<`, or
//! - both are infeasible and A's aggregate violation is strictly less than B's.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::problem::Evaluation;

/// A position together with its fitness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Decision vector
    pub position: Array1<f64>,
    /// Objective values, all minimized
    pub objectives: Vec<f64>,
    /// Whether every constraint margin is non-negative
    pub feasible: bool,
    /// Sum of the magnitudes of the negative margins
    pub violation: f64,
}

impl Candidate {
    pub fn new(position: Array1<f64>, objectives: Vec<f64>, feasible: bool, violation: f64) -> Self {
        Self {
            position,
            objectives,
            feasible,
            violation,
        }
    }

    /// Builds a candidate from a successful evaluation.
    pub fn from_evaluation(position: Array1<f64>, evaluation: &Evaluation) -> Self {
        Self {
            position,
            feasible: evaluation.is_feasible(),
            violation: evaluation.violation(),
            objectives: evaluation.objectives.clone(),
        }
    }

    /// Candidate for a position that could not be evaluated.
    ///
    /// It is infeasible with infinite violation and infinite objectives, so every
    /// evaluated candidate dominates it.
    pub fn failed(position: Array1<f64>, nobjs: usize) -> Self {
        Self {
            position,
            objectives: vec![f64::INFINITY; nobjs],
            feasible: false,
            violation: f64::INFINITY,
        }
    }

    /// Sum of the objective values.
    pub fn aggregate(&self) -> f64 {
        self.objectives.iter().sum()
    }

    /// Shorthand for [`dominates`]`(self, other)`.
    #[inline]
    pub fn dominates(&self, other: &Candidate) -> bool {
        dominates(self, other)
    }

    /// True if both candidates have the same feasibility, violation and objectives.
    pub fn same_fitness(&self, other: &Candidate) -> bool {
        self.feasible == other.feasible
            && self.violation == other.violation
            && self.objectives == other.objectives
    }
}

/// Returns true if the objective vector `a` Pareto-dominates `b` (minimization).
#[inline]
pub fn pareto_dominates(a: &[f64], b: &[f64]) -> bool {
    let mut strictly_better = false;
    for (x, y) in a.iter().zip(b) {
        if x > y {
            return false;
        }
        if x < y {
            strictly_better = true;
        }
    }
    strictly_better
}

/// Three-tier constrained dominance. See the module documentation.
pub fn dominates(a: &Candidate, b: &Candidate) -> bool {
    match (a.feasible, b.feasible) {
        (true, false) => true,
        (false, true) => false,
        (true, true) => pareto_dominates(&a.objectives, &b.objectives),
        (false, false) => a.violation < b.violation,
    }
}

/// True if neither candidate dominates the other.
pub fn mutually_non_dominated(a: &Candidate, b: &Candidate) -> bool {
    !dominates(a, b) && !dominates(b, a)
}
