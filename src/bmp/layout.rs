//! Segmented decision vector.
//!
//! The decision vector is split into consecutive groups, one per land unit or
//! animal group that may receive BMPs. A group with `n` candidate BMPs occupies
//! `n + 1` slots: the first is the share of the base that receives no BMP, the
//! remaining ones are the weights of the candidate BMPs in order.

use ndarray::{s, Array1, ArrayView1};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::data::BmpId;

/// One segment of the decision vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecisionGroup {
    /// Acres of a land unit, treated with land BMPs
    Land { land_unit: String, bmps: Vec<BmpId> },
    /// Animal units of an animal group housed on a land unit
    Animal {
        group: String,
        land_unit: String,
        bmps: Vec<BmpId>,
    },
}

impl DecisionGroup {
    pub fn land(land_unit: &str, bmps: Vec<BmpId>) -> Self {
        DecisionGroup::Land {
            land_unit: land_unit.to_string(),
            bmps,
        }
    }

    pub fn animal(group: &str, land_unit: &str, bmps: Vec<BmpId>) -> Self {
        DecisionGroup::Animal {
            group: group.to_string(),
            land_unit: land_unit.to_string(),
            bmps,
        }
    }

    pub fn bmps(&self) -> &[BmpId] {
        match self {
            DecisionGroup::Land { bmps, .. } | DecisionGroup::Animal { bmps, .. } => bmps,
        }
    }

    /// Land unit whose geography prices the group's BMPs.
    pub fn land_unit(&self) -> &str {
        match self {
            DecisionGroup::Land { land_unit, .. } | DecisionGroup::Animal { land_unit, .. } => {
                land_unit
            }
        }
    }

    /// Identifier the baseline loads are keyed by.
    pub fn source(&self) -> &str {
        match self {
            DecisionGroup::Land { land_unit, .. } => land_unit,
            DecisionGroup::Animal { group, .. } => group,
        }
    }

    /// Number of slots including the no-BMP slot.
    pub fn width(&self) -> usize {
        1 + self.bmps().len()
    }
}

/// Ordered list of decision groups with their slot offsets
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<DecisionGroup>", into = "Vec<DecisionGroup>")]
pub struct DecisionLayout {
    groups: Vec<DecisionGroup>,
    offsets: Vec<usize>,
    dimension: usize,
}

impl From<Vec<DecisionGroup>> for DecisionLayout {
    fn from(groups: Vec<DecisionGroup>) -> Self {
        Self::new(groups)
    }
}

impl From<DecisionLayout> for Vec<DecisionGroup> {
    fn from(layout: DecisionLayout) -> Self {
        layout.groups
    }
}

impl DecisionLayout {
    pub fn new(groups: Vec<DecisionGroup>) -> Self {
        let mut offsets = Vec::with_capacity(groups.len());
        let mut dimension = 0;
        for group in &groups {
            offsets.push(dimension);
            dimension += group.width();
        }

        Self {
            groups,
            offsets,
            dimension,
        }
    }

    /// Total number of slots.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn groups(&self) -> &[DecisionGroup] {
        &self.groups
    }

    /// Iterates over the groups together with their slice of `position`.
    ///
    /// `position` must have length [`DecisionLayout::dimension`].
    pub fn segments<'a>(
        &'a self,
        position: &'a Array1<f64>,
    ) -> impl Iterator<Item = (usize, &'a DecisionGroup, ArrayView1<'a, f64>)> + 'a {
        self.groups
            .iter()
            .zip(&self.offsets)
            .enumerate()
            .map(move |(i, (group, offset))| {
                (i, group, position.slice(s![*offset..*offset + group.width()]))
            })
    }

    /// Starting position: every no-BMP slot at 1.0 and every BMP slot uniform in
    /// `[0, 1)`.
    pub fn initial_position(&self, rng: &mut impl Rng) -> Array1<f64> {
        let mut position = Array1::zeros(self.dimension);
        for (group, offset) in self.groups.iter().zip(&self.offsets) {
            position[*offset] = 1.0;
            for slot in 1..group.width() {
                position[offset + slot] = rng.gen::<f64>();
            }
        }
        position
    }
}
