//! BMP Swarm Library
//!
//! This library provides a multi-objective particle swarm optimizer and the
//! models needed to search for cost-efficient allocations of Best Management
//! Practices (BMPs), including:
//! - A generic constrained multi-objective PSO engine with a Pareto archive
//! - Deterministic, per-particle random streams and optional parallel evaluation
//! - Cost and constraint models that turn a decision vector into BMP amounts
//! - Observers, convergence metrics and run reports

#![warn(unused_imports)]

/// Commonly used types and functionality re-exported for convenience
pub mod prelude {
    pub use crate::bmp::{constraint::*, cost::*, data::*, layout::*, problem::*};
    pub use crate::optim::{
        archive::*, candidate::*, config::*, error::*, metrics::*, observer::*, particle::*,
        problem::*, report::*, runner::*, swarm::*,
    };
}

/// Multi-objective particle swarm optimization
pub mod optim {
    pub use crate::optim::archive::*;
    pub use crate::optim::candidate::*;
    pub use crate::optim::config::*;
    pub use crate::optim::error::*;
    pub use crate::optim::metrics::*;
    pub use crate::optim::observer::*;
    pub use crate::optim::particle::*;
    pub use crate::optim::problem::*;
    pub use crate::optim::report::*;
    pub use crate::optim::runner::*;
    pub use crate::optim::swarm::*;

    /// Pareto archive of non-dominated candidates
    pub mod archive;
    /// Candidate solutions and constrained dominance
    pub mod candidate;
    /// Swarm hyperparameters
    pub mod config;
    pub mod error;
    /// Quality metrics of Pareto fronts
    pub mod metrics;
    pub mod observer;
    pub mod particle;
    pub mod problem;
    pub mod report;
    /// Per-particle random streams
    pub mod rng;
    pub mod runner;
    pub mod swarm;
}

/// Cost and constraint models of BMP allocations
pub mod bmp {
    pub use crate::bmp::constraint::*;
    pub use crate::bmp::cost::*;
    pub use crate::bmp::data::*;
    pub use crate::bmp::layout::*;
    pub use crate::bmp::problem::*;

    pub mod constraint;
    pub mod cost;
    /// Lookup tables and the data source seam
    pub mod data;
    /// Decision vector layout
    pub mod layout;
    pub mod problem;
}
