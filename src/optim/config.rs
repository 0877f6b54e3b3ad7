//! Configuration of the particle swarm.
//!
//! This module provides the [`PsoConfig`] struct and its builder. A configuration
//! carries the swarm size, the problem shape (dimension and number of objectives),
//! the iteration budget, the velocity update coefficients and the box bounds of
//! the search space. It can be created programmatically or read from JSON.
//!
//! A configuration is only checked when [`PsoConfig::validate`] is called, which
//! the swarm does before any particle is created.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use super::error::OptimizeError;

/// Rule used to pick the archive member that guides a particle's social term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuidanceStrategy {
    /// Draw an archive member uniformly, per particle and per iteration, from
    /// the particle's own random stream.
    #[default]
    Random,
    /// Use the member with the least aggregate violation, then the least sum of
    /// objectives. Ties go to the earliest inserted member.
    LeastAggregate,
}

/// Hyperparameters and problem shape of a swarm run
///
/// # Fields
///
/// * `nparts` - Number of particles (default: 50)
/// * `nobjs` - Number of objectives (default: 2)
/// * `dimension` - Number of decision variables (default: 1)
/// * `max_iterations` - Number of iterations to run (default: 100)
/// * `w` - Inertia weight (default: 0.7)
/// * `c1` - Cognitive coefficient (default: 1.4)
/// * `c2` - Social coefficient (default: 1.4)
/// * `lower_bound` - Lower bound of every decision variable (default: 0.0)
/// * `upper_bound` - Upper bound of every decision variable (default: 1.0)
/// * `seed` - Master seed; drawn at random when absent (default: None)
/// * `initial_velocity_scale` - Initial velocities are drawn from
///   `±scale * (upper_bound - lower_bound)` (default: 0.1)
/// * `guidance` - Guidance selection rule (default: [`GuidanceStrategy::Random`])
/// * `parallel` - Evaluate particles on the rayon thread pool (default: false)
///
/// # Examples
///
/// ```
/// use bmpswarm::optim::PsoConfigBuilder;
///
/// let config = PsoConfigBuilder::default()
///     .nparts(20)
///     .dimension(4)
///     .max_iterations(50)
///     .seed(Some(42))
///     .build()
///     .unwrap();
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(build_fn(error = "OptimizeError"))]
#[serde(default)]
pub struct PsoConfig {
    #[builder(default = "50")]
    pub nparts: usize,
    #[builder(default = "2")]
    pub nobjs: usize,
    #[builder(default = "1")]
    pub dimension: usize,
    #[builder(default = "100")]
    pub max_iterations: usize,
    #[builder(default = "0.7")]
    pub w: f64,
    #[builder(default = "1.4")]
    pub c1: f64,
    #[builder(default = "1.4")]
    pub c2: f64,
    #[builder(default = "0.0")]
    pub lower_bound: f64,
    #[builder(default = "1.0")]
    pub upper_bound: f64,
    #[builder(default)]
    pub seed: Option<u64>,
    #[builder(default = "0.1")]
    pub initial_velocity_scale: f64,
    #[builder(default)]
    pub guidance: GuidanceStrategy,
    #[builder(default)]
    pub parallel: bool,
}

impl From<derive_builder::UninitializedFieldError> for OptimizeError {
    fn from(err: derive_builder::UninitializedFieldError) -> Self {
        OptimizeError::ConfigBuild(err.to_string())
    }
}

impl Default for PsoConfig {
    fn default() -> Self {
        Self {
            nparts: 50,
            nobjs: 2,
            dimension: 1,
            max_iterations: 100,
            w: 0.7,
            c1: 1.4,
            c2: 1.4,
            lower_bound: 0.0,
            upper_bound: 1.0,
            seed: None,
            initial_velocity_scale: 0.1,
            guidance: GuidanceStrategy::default(),
            parallel: false,
        }
    }
}

impl PsoConfig {
    /// Parses a configuration from a JSON document.
    ///
    /// Missing fields fall back to their defaults. The result is not validated.
    pub fn from_json_str(json: &str) -> Result<Self, OptimizeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Width of the search box.
    pub fn span(&self) -> f64 {
        self.upper_bound - self.lower_bound
    }

    /// Checks counts, bounds and coefficients.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule:
    /// - `nparts`, `nobjs`, `dimension` and `max_iterations` must be positive
    /// - `w`, `c1`, `c2`, the bounds and the velocity scale must be finite
    /// - `c1`, `c2` and the velocity scale must be non-negative
    /// - `lower_bound` must be strictly less than `upper_bound`
    pub fn validate(&self) -> Result<(), OptimizeError> {
        for (field, value) in [
            ("nparts", self.nparts),
            ("nobjs", self.nobjs),
            ("dimension", self.dimension),
            ("max_iterations", self.max_iterations),
        ] {
            if value == 0 {
                return Err(OptimizeError::NonPositiveCount { field, value });
            }
        }

        for (field, value) in [
            ("w", self.w),
            ("c1", self.c1),
            ("c2", self.c2),
            ("lower_bound", self.lower_bound),
            ("upper_bound", self.upper_bound),
            ("initial_velocity_scale", self.initial_velocity_scale),
        ] {
            if !value.is_finite() {
                return Err(OptimizeError::NonFiniteParameter { field, value });
            }
        }

        for (field, value) in [
            ("c1", self.c1),
            ("c2", self.c2),
            ("initial_velocity_scale", self.initial_velocity_scale),
        ] {
            if value < 0.0 {
                return Err(OptimizeError::NegativeParameter { field, value });
            }
        }

        if self.lower_bound >= self.upper_bound {
            return Err(OptimizeError::InvalidBounds {
                lower: self.lower_bound,
                upper: self.upper_bound,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builder_defaults_match_default() {
        let built = PsoConfigBuilder::default().build().unwrap();
        assert_eq!(built, PsoConfig::default());
    }

    #[test]
    fn test_validate_rejects_zero_counts() {
        let config = PsoConfig {
            nparts: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(OptimizeError::NonPositiveCount {
                field: "nparts",
                value: 0
            })
        );

        let config = PsoConfig {
            max_iterations: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(OptimizeError::NonPositiveCount {
                field: "max_iterations",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_rejects_inverted_bounds() {
        let config = PsoConfig {
            lower_bound: 1.0,
            upper_bound: 1.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(OptimizeError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_non_finite_coefficients() {
        let config = PsoConfig {
            w: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(OptimizeError::NonFiniteParameter { field: "w", .. })
        ));

        let config = PsoConfig {
            c2: -0.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(OptimizeError::NegativeParameter { field: "c2", .. })
        ));
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = PsoConfig::from_json_str(
            r#"{"nparts": 8, "dimension": 3, "seed": 7, "guidance": "least_aggregate"}"#,
        )
        .unwrap();

        assert_eq!(config.nparts, 8);
        assert_eq!(config.dimension, 3);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.guidance, GuidanceStrategy::LeastAggregate);
        assert_eq!(config.max_iterations, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_reports_parse_errors() {
        let result = PsoConfig::from_json_str(r#"{"nparts": "many"}"#);
        assert!(matches!(result, Err(OptimizeError::ConfigParse(_))));
    }
}
