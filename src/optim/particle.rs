//! A single particle of the swarm.
//!
//! Each particle owns its position, velocity, last evaluated fitness, personal best
//! and its own random stream. The velocity update follows the canonical rule
//!
//! v_i(t+1) = w * v_i(t) + c1 * r1 * (p_i - x_i(t)) + c2 * r2 * (g_i - x_i(t))
//! x_i(t+1) = x_i(t) + v_i(t+1)
//!
//! where:
//! - p_i is the particle's personal best position
//! - g_i is the guidance position picked from the swarm's archive
//! - r1 and r2 are fresh uniform draws in [0, 1) for every dimension
//!
//! After the move the position is clamped into the bounds. A clamped dimension
//! also has its velocity reset to zero, so the particle does not keep pushing
//! against the wall on the next step.

use itertools::izip;
use ndarray::Array1;
use rand::Rng;
use serde::Serialize;

use super::candidate::{dominates, mutually_non_dominated, Candidate};
use super::rng::{uniform, ParticleRng};

/// Coefficients of the velocity update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    /// Inertia weight
    pub w: f64,
    /// Cognitive coefficient
    pub c1: f64,
    /// Social coefficient
    pub c2: f64,
}

/// Box bounds shared by all dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    pub fn span(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Particle {
    index: usize,
    position: Array1<f64>,
    velocity: Array1<f64>,
    current_objectives: Vec<f64>,
    feasible: bool,
    violation: f64,
    best: Candidate,
    #[serde(skip)]
    rng: ParticleRng,
}

impl Particle {
    /// Creates a particle with a randomized position and velocity.
    ///
    /// The position is `start` clamped into the bounds when given, or a uniform
    /// draw inside the bounds otherwise. Velocities are uniform in
    /// `±velocity_scale * span`. The personal best starts at the initial position
    /// with objectives and violation set to `+inf`, which any evaluated candidate
    /// improves upon.
    ///
    /// # Arguments
    ///
    /// * `index` - Position of the particle in the swarm
    /// * `dimension` - Number of decision variables
    /// * `nobjs` - Number of objectives
    /// * `bounds` - Box bounds of the search space
    /// * `velocity_scale` - Fraction of the span used for initial velocities
    /// * `start` - Optional problem-supplied starting position
    /// * `rng` - The particle's own random stream
    pub fn initialize(
        index: usize,
        dimension: usize,
        nobjs: usize,
        bounds: Bounds,
        velocity_scale: f64,
        start: Option<Array1<f64>>,
        mut rng: ParticleRng,
    ) -> Self {
        let position = match start {
            Some(start) if start.len() == dimension => {
                start.mapv(|x| x.clamp(bounds.lower, bounds.upper))
            }
            _ => Array1::from_shape_fn(dimension, |_| {
                uniform(&mut rng, bounds.lower, bounds.upper)
            }),
        };

        let v_max = velocity_scale * bounds.span().abs();
        let velocity = Array1::from_shape_fn(dimension, |_| uniform(&mut rng, -v_max, v_max));

        let best = Candidate::new(
            position.clone(),
            vec![f64::INFINITY; nobjs],
            false,
            f64::INFINITY,
        );

        Self {
            index,
            position,
            velocity,
            current_objectives: vec![f64::INFINITY; nobjs],
            feasible: false,
            violation: f64::INFINITY,
            best,
            rng,
        }
    }

    /// Moves the particle towards its personal best and the guidance position.
    ///
    /// # Arguments
    ///
    /// * `guide` - Guidance position picked from the archive
    /// * `coefficients` - Inertia, cognitive and social coefficients
    /// * `bounds` - Box bounds to clamp into
    pub fn update_velocity_and_position(
        &mut self,
        guide: &Array1<f64>,
        coefficients: Coefficients,
        bounds: Bounds,
    ) {
        let Coefficients { w, c1, c2 } = coefficients;

        for (x, v, p, g) in izip!(
            self.position.iter_mut(),
            self.velocity.iter_mut(),
            self.best.position.iter(),
            guide.iter()
        ) {
            let r1: f64 = self.rng.gen();
            let r2: f64 = self.rng.gen();

            *v = w * *v + c1 * r1 * (p - *x) + c2 * r2 * (g - *x);
            *x += *v;

            if *x < bounds.lower {
                *x = bounds.lower;
                *v = 0.0;
            } else if *x > bounds.upper {
                *x = bounds.upper;
                *v = 0.0;
            }
        }
    }

    /// Stores the fitness of the current position.
    pub fn record(&mut self, candidate: &Candidate) {
        self.current_objectives.clone_from(&candidate.objectives);
        self.feasible = candidate.feasible;
        self.violation = candidate.violation;
    }

    /// Replaces the personal best with the current candidate if it is better.
    ///
    /// The current candidate wins when it dominates the stored best, or when
    /// neither dominates the other and the current candidate is feasible.
    ///
    /// # Returns
    /// * `true` if the personal best was replaced
    pub fn update_personal_best(&mut self) -> bool {
        let current = self.candidate();
        let replace = dominates(&current, &self.best)
            || (current.feasible && mutually_non_dominated(&current, &self.best));

        if replace {
            self.best = current;
        }
        replace
    }

    /// Current position with its last recorded fitness.
    pub fn candidate(&self) -> Candidate {
        Candidate::new(
            self.position.clone(),
            self.current_objectives.clone(),
            self.feasible,
            self.violation,
        )
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn position(&self) -> &Array1<f64> {
        &self.position
    }

    pub fn velocity(&self) -> &Array1<f64> {
        &self.velocity
    }

    pub fn current_objectives(&self) -> &[f64] {
        &self.current_objectives
    }

    pub fn is_feasible(&self) -> bool {
        self.feasible
    }

    pub fn violation(&self) -> f64 {
        self.violation
    }

    pub fn personal_best(&self) -> &Candidate {
        &self.best
    }

    pub fn personal_best_position(&self) -> &Array1<f64> {
        &self.best.position
    }

    pub fn personal_best_objectives(&self) -> &[f64] {
        &self.best.objectives
    }

    pub(crate) fn rng_mut(&mut self) -> &mut ParticleRng {
        &mut self.rng
    }

    #[cfg(test)]
    pub(crate) fn set_state(&mut self, position: Array1<f64>, velocity: Array1<f64>) {
        self.position = position;
        self.velocity = velocity;
    }
}
