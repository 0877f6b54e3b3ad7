//! BMP allocation as a multi-objective problem.
//!
//! [`BmpProblem`] ties a [`DecisionLayout`], a [`CostModel`] and a
//! [`ConstraintModel`] to a [`DataSource`] and exposes them through the generic
//! [`Problem`] trait. The first objective is always the total cost. With two
//! objectives, the second is the load left after the BMPs are applied, summed
//! over the tracked pollutants.

use log::debug;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::constraint::ConstraintModel;
use super::cost::{Allocation, CostModel};
use super::data::DataSource;
use super::layout::{DecisionGroup, DecisionLayout};
use crate::optim::error::EvaluationError;
use crate::optim::problem::{Evaluation, Problem};
use crate::optim::rng::ParticleRng;

/// Objectives minimized by a [`BmpProblem`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmpObjectives {
    /// `[total_cost]`
    Cost,
    /// `[total_cost, residual_load]`
    #[default]
    CostAndLoad,
}

impl BmpObjectives {
    pub fn count(&self) -> usize {
        match self {
            BmpObjectives::Cost => 1,
            BmpObjectives::CostAndLoad => 2,
        }
    }
}

pub struct BmpProblem<D: DataSource> {
    data: D,
    layout: DecisionLayout,
    cost_model: CostModel,
    constraints: ConstraintModel,
    objectives: BmpObjectives,
    pollutants: Vec<String>,
    baseline_load: f64,
}

impl<D: DataSource> BmpProblem<D> {
    /// Builds the problem for one scenario.
    ///
    /// The tracked pollutants are those with a reduction target in the scenario.
    /// Their total baseline load over all groups is computed here once.
    ///
    /// # Errors
    ///
    /// Returns an [`EvaluationError`] if the scenario or the base (acreage or
    /// population) of a group is missing.
    pub fn new(
        data: D,
        layout: DecisionLayout,
        scenario: &str,
        objectives: BmpObjectives,
    ) -> Result<Self, EvaluationError> {
        let constraints = ConstraintModel::from_scenario(&data, scenario)?;
        let pollutants: Vec<String> = constraints.pollutants().map(str::to_string).collect();

        let mut problem = Self {
            data,
            layout,
            cost_model: CostModel::default(),
            constraints,
            objectives,
            pollutants,
            baseline_load: 0.0,
        };
        problem.baseline_load = problem.total_baseline_load()?;

        debug!(
            "BMP problem for scenario {scenario}: {} groups, dimension {}, {} targets, baseline load {}",
            problem.layout.groups().len(),
            problem.layout.dimension(),
            problem.constraints.len(),
            problem.baseline_load
        );

        Ok(problem)
    }

    pub fn with_cost_model(mut self, cost_model: CostModel) -> Self {
        self.cost_model = cost_model;
        self
    }

    pub fn layout(&self) -> &DecisionLayout {
        &self.layout
    }

    pub fn constraints(&self) -> &ConstraintModel {
        &self.constraints
    }

    pub fn data(&self) -> &D {
        &self.data
    }

    /// Total load of the tracked pollutants before any BMP is applied.
    pub fn baseline_load(&self) -> f64 {
        self.baseline_load
    }

    /// Decodes a position into its allocation, e.g. to report a Pareto member.
    pub fn allocation(&self, position: &Array1<f64>) -> Result<Allocation, EvaluationError> {
        self.cost_model.allocate(&self.layout, &self.data, position)
    }

    fn total_baseline_load(&self) -> Result<f64, EvaluationError> {
        let mut total = 0.0;
        for group in self.layout.groups() {
            let base = match group {
                DecisionGroup::Land { land_unit, .. } => self.data.acreage(land_unit)?,
                DecisionGroup::Animal { group, .. } => self.data.animal_population(group)?,
            };
            for pollutant in &self.pollutants {
                total += base * self.data.baseline_load(group.source(), pollutant);
            }
        }
        Ok(total)
    }
}

impl<D: DataSource> Problem for BmpProblem<D> {
    fn dimension(&self) -> usize {
        self.layout.dimension()
    }

    fn n_objectives(&self) -> usize {
        self.objectives.count()
    }

    fn evaluate(&self, position: &Array1<f64>) -> Result<Evaluation, EvaluationError> {
        let allocation = self.allocation(position)?;
        let margins = self.constraints.margins(&allocation, &self.data);

        let objectives = match self.objectives {
            BmpObjectives::Cost => vec![allocation.total_cost],
            BmpObjectives::CostAndLoad => {
                let reduced: f64 = self
                    .pollutants
                    .iter()
                    .map(|p| ConstraintModel::reduction(&allocation, &self.data, p))
                    .sum();
                vec![allocation.total_cost, self.baseline_load - reduced]
            }
        };

        Ok(Evaluation::new(objectives, margins))
    }

    fn initial_position(&self, rng: &mut ParticleRng) -> Option<Array1<f64>> {
        Some(self.layout.initial_position(rng))
    }
}
