use thiserror::Error;

/// Errors raised while configuring or driving a swarm.
///
/// All of these fail fast: they are returned before any particle is created
/// or when the swarm is driven through an invalid state transition. Failures
/// of individual candidate evaluations are reported through
/// [`EvaluationError`] instead and never surface here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptimizeError {
    #[error("Invalid configuration: {field} must be positive, found {value}")]
    NonPositiveCount { field: &'static str, value: usize },
    #[error("Invalid bounds: lower bound {lower} must be less than upper bound {upper}")]
    InvalidBounds { lower: f64, upper: f64 },
    #[error("Invalid configuration: {field} must be finite, found {value}")]
    NonFiniteParameter { field: &'static str, value: f64 },
    #[error("Invalid configuration: {field} must be non-negative, found {value}")]
    NegativeParameter { field: &'static str, value: f64 },
    #[error("Dimension mismatch: configuration expects {expected}, problem provides {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("Objective mismatch: configuration expects {expected}, problem provides {found}")]
    ObjectiveMismatch { expected: usize, found: usize },
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),
    #[error("Failed to build configuration: {0}")]
    ConfigBuild(String),
    #[error("Swarm is not initialized")]
    NotInitialized,
    #[error("Swarm is already initialized")]
    AlreadyInitialized,
    #[error("Swarm is not finalized, {iterations} of {max_iterations} iterations completed")]
    NotFinalized {
        iterations: usize,
        max_iterations: usize,
    },
    #[error("Swarm is already finalized after {iterations} iterations")]
    AlreadyFinalized { iterations: usize },
}

impl From<serde_json::Error> for OptimizeError {
    fn from(err: serde_json::Error) -> Self {
        OptimizeError::ConfigParse(err.to_string())
    }
}

/// Errors raised while scoring a single candidate position.
///
/// The swarm recovers from these locally: the affected candidate is treated
/// as maximally infeasible for the current iteration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("No unit cost for BMP {bmp} on land unit {land_unit}")]
    MissingUnitCost { bmp: u32, land_unit: String },
    #[error("No geography mapping for land unit {0}")]
    MissingGeography(String),
    #[error("No acreage for land unit {0}")]
    MissingAcreage(String),
    #[error("No animal population for group {0}")]
    MissingPopulation(String),
    #[error("No scenario targets for scenario {0}")]
    MissingScenario(String),
    #[error("Position has length {found}, expected {expected}")]
    PositionLength { expected: usize, found: usize },
    #[error("Objective {index} evaluated to a non-finite value")]
    NonFiniteObjective { index: usize },
    #[error("Constraint margin {index} evaluated to a non-finite value")]
    NonFiniteMargin { index: usize },
    #[error("Evaluation failed: {0}")]
    Custom(String),
}
