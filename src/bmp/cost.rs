use std::collections::BTreeMap;

use derive_builder::Builder;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::data::{BmpId, DataSource};
use super::layout::{DecisionGroup, DecisionLayout};
use crate::optim::error::{EvaluationError, OptimizeError};

/// One BMP applied to part of a group's base
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationEntry {
    /// Index of the decision group
    pub group: usize,
    /// Land unit or animal group the BMP is applied to
    pub source: String,
    /// Land unit whose geography prices the BMP
    pub land_unit: String,
    pub bmp: BmpId,
    /// Acres or animal units receiving the BMP
    pub amount: f64,
    pub unit_cost: f64,
    /// `amount * unit_cost`
    pub cost: f64,
}

/// Decoded decision vector.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Allocation {
    pub entries: Vec<AllocationEntry>,
    pub total_cost: f64,
}

impl Allocation {
    /// Cost summed per land unit.
    pub fn cost_by_land_unit(&self) -> BTreeMap<String, f64> {
        let mut costs = BTreeMap::new();
        for entry in &self.entries {
            *costs.entry(entry.land_unit.clone()).or_insert(0.0) += entry.cost;
        }
        costs
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Maps a decision vector to BMP amounts and their cost
///
/// Within every group the slots are normalized by the group's sum, so the BMP
/// shares never exceed `max_adoption` of the base together. For BMP `k` of a
/// group with slots `x`:
///
/// share_k = max_adoption * x_k / Σ x
/// amount_k = share_k * base
///
/// where base is the acreage of a land group or the population of an animal
/// group. Amounts at or below `min_amount` are dropped.
///
/// # Fields
///
/// * `max_adoption` - Largest fraction of a base that can receive BMPs (default: 0.30)
/// * `min_amount` - Amounts at or below this are not allocated (default: 1.0)
#[derive(Debug, Clone, Copy, PartialEq, Builder, Serialize, Deserialize)]
#[builder(build_fn(error = "OptimizeError"))]
pub struct CostModel {
    #[builder(default = "0.30")]
    pub max_adoption: f64,
    #[builder(default = "1.0")]
    pub min_amount: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            max_adoption: 0.30,
            min_amount: 1.0,
        }
    }
}

impl CostModel {
    /// Decodes `position` into an allocation and prices it.
    ///
    /// # Errors
    ///
    /// Returns an [`EvaluationError`] if the position does not match the layout or
    /// a base or unit cost needed by a kept entry is missing. Groups whose slots
    /// sum to zero allocate nothing and need no lookups.
    pub fn allocate<D: DataSource + ?Sized>(
        &self,
        layout: &DecisionLayout,
        data: &D,
        position: &Array1<f64>,
    ) -> Result<Allocation, EvaluationError> {
        if position.len() != layout.dimension() {
            return Err(EvaluationError::PositionLength {
                expected: layout.dimension(),
                found: position.len(),
            });
        }

        let mut allocation = Allocation::default();
        for (index, group, slots) in layout.segments(position) {
            let sum = slots.sum();
            if sum <= 0.0 {
                continue;
            }

            let base = match group {
                DecisionGroup::Land { land_unit, .. } => data.acreage(land_unit)?,
                DecisionGroup::Animal { group, .. } => data.animal_population(group)?,
            };

            for (bmp, weight) in group.bmps().iter().zip(slots.iter().skip(1)) {
                let amount = self.max_adoption * weight / sum * base;
                if amount <= self.min_amount {
                    continue;
                }

                let unit_cost = data.unit_cost(*bmp, group.land_unit())?;
                let cost = amount * unit_cost;
                allocation.total_cost += cost;
                allocation.entries.push(AllocationEntry {
                    group: index,
                    source: group.source().to_string(),
                    land_unit: group.land_unit().to_string(),
                    bmp: *bmp,
                    amount,
                    unit_cost,
                    cost,
                });
            }
        }

        Ok(allocation)
    }
}
