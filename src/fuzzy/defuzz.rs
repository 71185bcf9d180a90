//! Defuzzification of an aggregated output set into a crisp value.

use serde::{Deserialize, Serialize};

const EPSILON: f64 = 1e-12;

/// Strategy used to collapse an aggregated membership curve into one number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Defuzzification {
    /// Centre of gravity.
    #[default]
    Centroid,
    /// Point splitting the area into two equal halves.
    Bisector,
    /// Mean of the points reaching the maximum.
    Mom,
    /// Smallest point reaching the maximum.
    Som,
    /// Largest point reaching the maximum.
    Lom,
}

impl Defuzzification {
    /// Crisp value for `membership` sampled at `points`.
    ///
    /// Returns `None` when the curve is empty everywhere, i.e. no rule contributed.
    pub fn apply(self, points: &[f64], membership: &[f64]) -> Option<f64> {
        debug_assert_eq!(points.len(), membership.len());
        let peak = membership.iter().copied().fold(0.0, f64::max);
        if peak <= EPSILON {
            return None;
        }

        match self {
            Self::Centroid => {
                let (weighted, total) = points
                    .iter()
                    .zip(membership)
                    .fold((0.0, 0.0), |(weighted, total), (x, mu)| {
                        (weighted + x * mu, total + mu)
                    });
                Some(weighted / total)
            }
            Self::Bisector => {
                let half = membership.iter().sum::<f64>() / 2.0;
                let mut cumulative = 0.0;
                points.iter().zip(membership).find_map(|(x, mu)| {
                    cumulative += mu;
                    (cumulative >= half).then_some(*x)
                })
            }
            Self::Mom => {
                let maxima: Vec<f64> = maxima(points, membership, peak).collect();
                Some(maxima.iter().sum::<f64>() / maxima.len() as f64)
            }
            Self::Som => maxima(points, membership, peak).next(),
            Self::Lom => maxima(points, membership, peak).last(),
        }
    }
}

fn maxima<'a>(
    points: &'a [f64],
    membership: &'a [f64],
    peak: f64,
) -> impl Iterator<Item = f64> + 'a {
    points
        .iter()
        .zip(membership)
        .filter(move |(_, mu)| (peak - **mu).abs() <= EPSILON)
        .map(|(x, _)| *x)
}
