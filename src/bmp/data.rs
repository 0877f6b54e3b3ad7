//! Read-only lookup tables behind the BMP cost and constraint models.
//!
//! All tables are loaded before a run starts and are only read while the swarm
//! iterates. [`DataSource`] is the seam to whatever storage holds them;
//! [`ScenarioData`] is the in-memory implementation, readable from JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::optim::error::{EvaluationError, OptimizeError};

/// Numeric identifier of a best management practice.
pub type BmpId = u32;

/// Lookups consumed by the cost and constraint models.
pub trait DataSource: Send + Sync {
    /// Cost of one unit (acre or animal unit) of `bmp` on `land_unit`.
    fn unit_cost(&self, bmp: BmpId, land_unit: &str) -> Result<f64, EvaluationError>;

    /// Constraint targets of a scenario, keyed by constraint name.
    fn scenario_targets(&self, scenario: &str) -> Result<BTreeMap<String, f64>, EvaluationError>;

    /// Number of animal units in an animal group.
    fn animal_population(&self, group: &str) -> Result<f64, EvaluationError>;

    /// Geography (state) a land unit belongs to.
    fn geography(&self, land_unit: &str) -> Result<String, EvaluationError>;

    /// Treatable acres of a land unit.
    fn acreage(&self, land_unit: &str) -> Result<f64, EvaluationError>;

    /// Fraction of the load of `pollutant` removed per unit of `bmp`.
    /// Zero when the BMP does not act on the pollutant.
    fn efficiency(&self, bmp: BmpId, pollutant: &str) -> f64;

    /// Load of `pollutant` per unit of a source (land unit or animal group).
    /// Zero when the source emits none.
    fn baseline_load(&self, source: &str, pollutant: &str) -> f64;
}

/// In-memory lookup tables
///
/// # Fields
///
/// * `geographies` - Land unit to geography (state)
/// * `unit_costs` - Geography to BMP to cost per unit
/// * `acreage` - Land unit to treatable acres
/// * `animal_populations` - Animal group to number of animal units
/// * `efficiencies` - BMP to pollutant to removed fraction
/// * `baseline_loads` - Source to pollutant to load per unit
/// * `scenarios` - Scenario to constraint name to target
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioData {
    pub geographies: BTreeMap<String, String>,
    pub unit_costs: BTreeMap<String, BTreeMap<BmpId, f64>>,
    pub acreage: BTreeMap<String, f64>,
    pub animal_populations: BTreeMap<String, f64>,
    pub efficiencies: BTreeMap<BmpId, BTreeMap<String, f64>>,
    pub baseline_loads: BTreeMap<String, BTreeMap<String, f64>>,
    pub scenarios: BTreeMap<String, BTreeMap<String, f64>>,
}

impl ScenarioData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the tables from a JSON document. Missing tables are left empty.
    pub fn from_json_str(json: &str) -> Result<Self, OptimizeError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_land_unit(mut self, land_unit: &str, geography: &str, acres: f64) -> Self {
        self.geographies
            .insert(land_unit.to_string(), geography.to_string());
        self.acreage.insert(land_unit.to_string(), acres);
        self
    }

    pub fn with_unit_cost(mut self, geography: &str, bmp: BmpId, cost: f64) -> Self {
        self.unit_costs
            .entry(geography.to_string())
            .or_default()
            .insert(bmp, cost);
        self
    }

    pub fn with_animal_population(mut self, group: &str, units: f64) -> Self {
        self.animal_populations.insert(group.to_string(), units);
        self
    }

    pub fn with_efficiency(mut self, bmp: BmpId, pollutant: &str, fraction: f64) -> Self {
        self.efficiencies
            .entry(bmp)
            .or_default()
            .insert(pollutant.to_string(), fraction);
        self
    }

    pub fn with_baseline_load(mut self, source: &str, pollutant: &str, load: f64) -> Self {
        self.baseline_loads
            .entry(source.to_string())
            .or_default()
            .insert(pollutant.to_string(), load);
        self
    }

    pub fn with_target(mut self, scenario: &str, constraint: &str, target: f64) -> Self {
        self.scenarios
            .entry(scenario.to_string())
            .or_default()
            .insert(constraint.to_string(), target);
        self
    }
}

impl DataSource for ScenarioData {
    fn unit_cost(&self, bmp: BmpId, land_unit: &str) -> Result<f64, EvaluationError> {
        let geography = self
            .geographies
            .get(land_unit)
            .ok_or_else(|| EvaluationError::MissingGeography(land_unit.to_string()))?;

        self.unit_costs
            .get(geography)
            .and_then(|costs| costs.get(&bmp))
            .copied()
            .ok_or_else(|| EvaluationError::MissingUnitCost {
                bmp,
                land_unit: land_unit.to_string(),
            })
    }

    fn scenario_targets(&self, scenario: &str) -> Result<BTreeMap<String, f64>, EvaluationError> {
        self.scenarios
            .get(scenario)
            .cloned()
            .ok_or_else(|| EvaluationError::MissingScenario(scenario.to_string()))
    }

    fn animal_population(&self, group: &str) -> Result<f64, EvaluationError> {
        self.animal_populations
            .get(group)
            .copied()
            .ok_or_else(|| EvaluationError::MissingPopulation(group.to_string()))
    }

    fn geography(&self, land_unit: &str) -> Result<String, EvaluationError> {
        self.geographies
            .get(land_unit)
            .cloned()
            .ok_or_else(|| EvaluationError::MissingGeography(land_unit.to_string()))
    }

    fn acreage(&self, land_unit: &str) -> Result<f64, EvaluationError> {
        self.acreage
            .get(land_unit)
            .copied()
            .ok_or_else(|| EvaluationError::MissingAcreage(land_unit.to_string()))
    }

    fn efficiency(&self, bmp: BmpId, pollutant: &str) -> f64 {
        self.efficiencies
            .get(&bmp)
            .and_then(|e| e.get(pollutant))
            .copied()
            .unwrap_or(0.0)
    }

    fn baseline_load(&self, source: &str, pollutant: &str) -> f64 {
        self.baseline_loads
            .get(source)
            .and_then(|l| l.get(pollutant))
            .copied()
            .unwrap_or(0.0)
    }
}
