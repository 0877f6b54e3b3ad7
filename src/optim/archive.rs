//! External archive of non-dominated candidates.
//!
//! The archive keeps every candidate that no other observed candidate dominates,
//! in insertion order. Because a feasible candidate dominates every infeasible
//! one, the archive holds only feasible members as soon as one feasible
//! candidate has been offered; until then it holds the least-infeasible ones.
//! The archive is not capped in size.

use ordered_float::OrderedFloat;
use rand::Rng;
use serde::Serialize;

use super::candidate::{dominates, Candidate};

/// Pareto archive owned by the swarm.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParetoArchive {
    members: Vec<Candidate>,
}

impl ParetoArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers a candidate to the archive.
    ///
    /// Members dominated by the candidate are removed. The candidate is inserted
    /// unless a remaining member dominates it or has the same fitness.
    ///
    /// # Returns
    /// * `true` if the candidate was inserted
    pub fn offer(&mut self, candidate: &Candidate) -> bool {
        let mut rejected = false;
        self.members.retain(|member| {
            if dominates(candidate, member) {
                return false;
            }
            if dominates(member, candidate) || member.same_fitness(candidate) {
                rejected = true;
            }
            true
        });

        if !rejected {
            self.members.push(candidate.clone());
        }
        !rejected
    }

    pub fn members(&self) -> &[Candidate] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// True if the archive holds at least one feasible member.
    pub fn has_feasible(&self) -> bool {
        self.members.iter().any(|m| m.feasible)
    }

    /// Smallest value of every objective over the archive.
    ///
    /// Returns an empty vector for an empty archive.
    pub fn best_objectives(&self) -> Vec<f64> {
        let Some(first) = self.members.first() else {
            return Vec::new();
        };

        let mut best = first.objectives.clone();
        for member in &self.members[1..] {
            for (b, v) in best.iter_mut().zip(&member.objectives) {
                *b = b.min(*v);
            }
        }
        best
    }

    /// Smallest aggregate violation over the archive.
    pub fn min_violation(&self) -> Option<f64> {
        self.members
            .iter()
            .map(|m| OrderedFloat(m.violation))
            .min()
            .map(|v| v.0)
    }

    /// Member with the least violation, then the least sum of objectives.
    ///
    /// `min_by_key` keeps the first of equal elements, so ties go to the earliest
    /// inserted member.
    pub fn least_aggregate(&self) -> Option<&Candidate> {
        self.members
            .iter()
            .min_by_key(|m| (OrderedFloat(m.violation), OrderedFloat(m.aggregate())))
    }

    /// Uniformly drawn member.
    pub fn random_member(&self, rng: &mut impl Rng) -> Option<&Candidate> {
        if self.members.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.members.len());
        self.members.get(index)
    }

    /// Checks that no two members dominate each other.
    pub fn is_mutually_non_dominated(&self) -> bool {
        self.members.iter().enumerate().all(|(i, a)| {
            self.members
                .iter()
                .enumerate()
                .all(|(j, b)| i == j || !dominates(a, b))
        })
    }

    pub fn into_members(self) -> Vec<Candidate> {
        self.members
    }
}
