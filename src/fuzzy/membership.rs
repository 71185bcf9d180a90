//! Membership function shapes used by linguistic terms.

use serde::{Deserialize, Serialize};

/// Membership function describing how strongly a crisp value belongs to a term.
///
/// Every variant evaluates to a degree in `[0, 1]`. Shoulders where two parameters coincide
/// (for instance `a == b` on a triangle) are treated as vertical edges with full membership at
/// the peak, which is how left/right boundary terms are usually expressed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MembershipFunction {
    /// Triangle with feet at `a` and `c` and peak at `b`.
    Triangular {
        /// Left foot.
        a: f64,
        /// Peak.
        b: f64,
        /// Right foot.
        c: f64,
    },
    /// Trapezoid with feet at `a`/`d` and plateau between `b` and `c`.
    Trapezoidal {
        /// Left foot.
        a: f64,
        /// Start of the plateau.
        b: f64,
        /// End of the plateau.
        c: f64,
        /// Right foot.
        d: f64,
    },
    /// Gaussian bell centred on `mean`.
    Gaussian {
        /// Centre of the curve.
        mean: f64,
        /// Standard deviation; must be positive.
        sigma: f64,
    },
    /// Generalized bell `1 / (1 + |(x - c) / a|^(2b))`.
    Bell {
        /// Half width.
        a: f64,
        /// Slope control.
        b: f64,
        /// Centre.
        c: f64,
    },
    /// Logistic curve `1 / (1 + exp(-slope * (x - center)))`.
    Sigmoid {
        /// Inflection point.
        center: f64,
        /// Steepness; negative values open to the left.
        slope: f64,
    },
}

impl MembershipFunction {
    /// Degree of membership of `x`, always within `[0, 1]`.
    pub fn degree(&self, x: f64) -> f64 {
        let value = match *self {
            Self::Triangular { a, b, c } => {
                if x < a || x > c {
                    0.0
                } else if x < b {
                    (x - a) / (b - a)
                } else if x > b {
                    (c - x) / (c - b)
                } else {
                    1.0
                }
            }
            Self::Trapezoidal { a, b, c, d } => {
                if x < a || x > d {
                    0.0
                } else if x < b {
                    (x - a) / (b - a)
                } else if x > c {
                    (d - x) / (d - c)
                } else {
                    1.0
                }
            }
            Self::Gaussian { mean, sigma } => (-((x - mean).powi(2)) / (2.0 * sigma.powi(2))).exp(),
            Self::Bell { a, b, c } => 1.0 / (1.0 + ((x - c) / a).abs().powf(2.0 * b)),
            Self::Sigmoid { center, slope } => 1.0 / (1.0 + (-slope * (x - center)).exp()),
        };
        value.clamp(0.0, 1.0)
    }

    /// Check the parameters describe a well-formed curve.
    pub fn validate(&self) -> Result<(), String> {
        let params: Vec<f64> = match *self {
            Self::Triangular { a, b, c } => vec![a, b, c],
            Self::Trapezoidal { a, b, c, d } => vec![a, b, c, d],
            Self::Gaussian { mean, sigma } => vec![mean, sigma],
            Self::Bell { a, b, c } => vec![a, b, c],
            Self::Sigmoid { center, slope } => vec![center, slope],
        };
        if params.iter().any(|value| !value.is_finite()) {
            return Err("parameters must be finite".into());
        }
        match *self {
            Self::Triangular { a, b, c } if !(a <= b && b <= c) || a == c => Err(format!(
                "triangle requires a <= b <= c with a < c, got ({a}, {b}, {c})"
            )),
            Self::Trapezoidal { a, b, c, d } if !(a <= b && b <= c && c <= d) || a == d => {
                Err(format!(
                    "trapezoid requires a <= b <= c <= d with a < d, got ({a}, {b}, {c}, {d})"
                ))
            }
            Self::Gaussian { sigma, .. } if sigma <= 0.0 => {
                Err(format!("gaussian sigma must be positive, got {sigma}"))
            }
            Self::Bell { a, .. } if a == 0.0 => Err("bell width must be non-zero".into()),
            _ => Ok(()),
        }
    }
}
