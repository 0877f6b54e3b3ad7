use serde::{Deserialize, Serialize};

use super::cost::Allocation;
use super::data::DataSource;
use crate::optim::error::EvaluationError;

/// Name of the scenario target that caps the total cost.
pub const BUDGET: &str = "budget";

/// A single scenario target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Target {
    /// Total cost must not exceed the budget
    Budget { limit: f64 },
    /// The load of `pollutant` must drop by at least `amount`
    Reduction { pollutant: String, amount: f64 },
}

impl Target {
    pub fn name(&self) -> &str {
        match self {
            Target::Budget { .. } => BUDGET,
            Target::Reduction { pollutant, .. } => pollutant,
        }
    }
}

/// Turns an allocation into feasibility margins, one per target.
///
/// A margin is non-negative iff its target is met:
/// - budget: `limit - total_cost`
/// - pollutant: `reduction(pollutant) - amount`
///
/// with `reduction(p) = Σ amount_e * efficiency(bmp_e, p) * baseline_load(source_e, p)`
/// over the allocation entries `e`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintModel {
    targets: Vec<Target>,
}

impl ConstraintModel {
    pub fn new(targets: Vec<Target>) -> Self {
        Self { targets }
    }

    /// Reads the targets of `scenario`. A target named [`BUDGET`] caps the cost,
    /// every other name is a pollutant. Targets are ordered by name.
    pub fn from_scenario<D: DataSource + ?Sized>(
        data: &D,
        scenario: &str,
    ) -> Result<Self, EvaluationError> {
        let targets = data
            .scenario_targets(scenario)?
            .into_iter()
            .map(|(name, value)| {
                if name == BUDGET {
                    Target::Budget { limit: value }
                } else {
                    Target::Reduction {
                        pollutant: name,
                        amount: value,
                    }
                }
            })
            .collect();

        Ok(Self { targets })
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Pollutants with a reduction target.
    pub fn pollutants(&self) -> impl Iterator<Item = &str> {
        self.targets.iter().filter_map(|t| match t {
            Target::Reduction { pollutant, .. } => Some(pollutant.as_str()),
            Target::Budget { .. } => None,
        })
    }

    /// Load of `pollutant` removed by the allocation.
    pub fn reduction<D: DataSource + ?Sized>(
        allocation: &Allocation,
        data: &D,
        pollutant: &str,
    ) -> f64 {
        allocation
            .entries
            .iter()
            .map(|e| {
                e.amount * data.efficiency(e.bmp, pollutant) * data.baseline_load(&e.source, pollutant)
            })
            .sum()
    }

    /// One margin per target, in target order.
    pub fn margins<D: DataSource + ?Sized>(&self, allocation: &Allocation, data: &D) -> Vec<f64> {
        self.targets
            .iter()
            .map(|target| match target {
                Target::Budget { limit } => limit - allocation.total_cost,
                Target::Reduction { pollutant, amount } => {
                    Self::reduction(allocation, data, pollutant) - amount
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bmp::cost::AllocationEntry;
    use crate::bmp::data::ScenarioData;
    use approx::assert_relative_eq;

    fn data() -> ScenarioData {
        ScenarioData::new()
            .with_efficiency(1, "N", 0.5)
            .with_baseline_load("lu-1", "N", 4.0)
            .with_target("s", "budget", 100.0)
            .with_target("s", "N", 30.0)
    }

    fn allocation() -> Allocation {
        Allocation {
            entries: vec![AllocationEntry {
                group: 0,
                source: "lu-1".to_string(),
                land_unit: "lu-1".to_string(),
                bmp: 1,
                amount: 20.0,
                unit_cost: 6.0,
                cost: 120.0,
            }],
            total_cost: 120.0,
        }
    }

    #[test]
    fn test_from_scenario_orders_targets_by_name() {
        let model = ConstraintModel::from_scenario(&data(), "s").unwrap();
        let names: Vec<&str> = model.targets().iter().map(Target::name).collect();
        assert_eq!(names, vec!["N", "budget"]);
        assert_eq!(model.pollutants().collect::<Vec<_>>(), vec!["N"]);
    }

    #[test]
    fn test_margins() {
        let data = data();
        let model = ConstraintModel::from_scenario(&data, "s").unwrap();
        let margins = model.margins(&allocation(), &data);

        // N: 20 * 0.5 * 4 = 40 removed against a target of 30
        assert_relative_eq!(margins[0], 10.0);
        assert_relative_eq!(margins[1], -20.0);
    }

    #[test]
    fn test_empty_allocation_reduces_nothing() {
        let data = data();
        assert_relative_eq!(
            ConstraintModel::reduction(&Allocation::default(), &data, "N"),
            0.0
        );
    }

    #[test]
    fn test_missing_scenario() {
        assert!(matches!(
            ConstraintModel::from_scenario(&data(), "nope"),
            Err(EvaluationError::MissingScenario(_))
        ));
    }
}
