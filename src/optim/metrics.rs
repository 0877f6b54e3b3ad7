use ordered_float::OrderedFloat;

use super::candidate::{pareto_dominates, Candidate};

/// Calculates the ideal point of a set of candidates, the per-objective minimum.
///
/// ideal_j = min_i f_j(x_i)
///
/// # Arguments
/// * `candidates` - Candidates sharing the same number of objectives
///
/// # Returns
/// * `Vec<f64>` - Ideal point; empty for an empty set
pub fn ideal_point(candidates: &[Candidate]) -> Vec<f64> {
    let Some(first) = candidates.first() else {
        return Vec::new();
    };

    candidates[1..]
        .iter()
        .fold(first.objectives.clone(), |mut ideal, c| {
            for (best, v) in ideal.iter_mut().zip(&c.objectives) {
                *best = best.min(*v);
            }
            ideal
        })
}

/// Calculates the hypervolume of a two-objective front, the area dominated by the
/// front and bounded by the reference point. Larger values indicate a better front.
///
/// Points that do not strictly improve on the reference point in both objectives
/// contribute nothing. Dominated points are ignored.
///
/// HV = Σ (x_{i+1} - x_i) * (r_2 - y_i)
/// over the non-dominated points sorted by the first objective, with x_{n+1} = r_1.
///
/// # Arguments
/// * `front` - Two-objective vectors, all minimized
/// * `reference` - Reference point, worse than every point of interest
///
/// # Returns
/// * `f64` - Dominated area
pub fn hypervolume_2d(front: &[Vec<f64>], reference: [f64; 2]) -> f64 {
    let mut points: Vec<(f64, f64)> = front
        .iter()
        .filter(|p| p.len() >= 2 && p[0] < reference[0] && p[1] < reference[1])
        .map(|p| (p[0], p[1]))
        .collect();

    points.sort_by_key(|(x, y)| (OrderedFloat(*x), OrderedFloat(*y)));

    // Sweep left to right keeping only points that lower the second objective.
    let mut area = 0.0;
    let mut last_y = reference[1];
    let mut staircase: Vec<(f64, f64)> = Vec::with_capacity(points.len());
    for (x, y) in points {
        if y < last_y {
            staircase.push((x, y));
            last_y = y;
        }
    }

    for (i, (x, y)) in staircase.iter().enumerate() {
        let next_x = staircase.get(i + 1).map_or(reference[0], |(nx, _)| *nx);
        area += (next_x - x) * (reference[1] - y);
    }
    area
}

/// Calculates Schott's spacing of a front: the standard deviation of each
/// member's Manhattan distance to its nearest neighbour. Zero means the members
/// are evenly spread.
///
/// S = sqrt( 1/(n-1) * Σ (d̄ - d_i)² )
///
/// # Returns
/// * `f64` - Spacing; zero for fronts with fewer than two members
pub fn spacing(front: &[Vec<f64>]) -> f64 {
    let n = front.len();
    if n < 2 {
        return 0.0;
    }

    let nearest: Vec<f64> = front
        .iter()
        .enumerate()
        .map(|(i, a)| {
            front
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, b)| a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum::<f64>())
                .fold(f64::INFINITY, f64::min)
        })
        .collect();

    let mean = nearest.iter().sum::<f64>() / n as f64;
    let variance = nearest.iter().map(|d| (mean - d).powi(2)).sum::<f64>() / (n - 1) as f64;
    variance.sqrt()
}

/// Number of points in `front` dominated by some other point of `front`.
pub fn dominated_count(front: &[Vec<f64>]) -> usize {
    front
        .iter()
        .filter(|a| front.iter().any(|b| pareto_dominates(b, a)))
        .count()
}
