//! Linguistic variables: a universe of discourse partitioned into named terms.

use super::membership::MembershipFunction;
use serde::{Deserialize, Serialize};

const MAX_UNIVERSE_POINTS: usize = 1_000_000;
const PEAK_TOLERANCE: f64 = 1e-12;

/// Sampled universe of discourse, inclusive of both bounds when `stop` lands on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Universe {
    /// Lowest value in the universe.
    pub start: f64,
    /// Highest value in the universe.
    pub stop: f64,
    /// Distance between consecutive samples.
    pub step: f64,
}

impl Universe {
    fn sample_count(&self) -> usize {
        let intervals = ((self.stop - self.start) / self.step + 1e-9).floor();
        if intervals.is_nan() || intervals < 0.0 {
            return 0;
        }
        (intervals as usize).saturating_add(1)
    }

    /// Iterate over the sample points in ascending order.
    pub fn points(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.sample_count()).map(move |index| self.start + self.step * index as f64)
    }

    /// Clamp `value` into `[start, stop]`.
    pub fn clip(&self, value: f64) -> f64 {
        value.clamp(self.start, self.stop)
    }

    /// Whether `value` lies within the universe bounds.
    pub fn contains(&self, value: f64) -> bool {
        (self.start..=self.stop).contains(&value)
    }

    fn validate(&self) -> Result<(), String> {
        if !(self.start.is_finite() && self.stop.is_finite() && self.step.is_finite()) {
            return Err("universe bounds must be finite".into());
        }
        if self.start >= self.stop {
            return Err(format!(
                "universe start {} must be below stop {}",
                self.start, self.stop
            ));
        }
        if self.step <= 0.0 {
            return Err(format!("universe step must be positive, got {}", self.step));
        }
        if self.sample_count() > MAX_UNIVERSE_POINTS {
            return Err(format!(
                "universe has {} samples; at most {MAX_UNIVERSE_POINTS} are supported",
                self.sample_count()
            ));
        }
        Ok(())
    }
}

/// Named fuzzy term of a linguistic variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    /// Term label, e.g. `"low"`.
    pub name: String,
    /// Membership function mapping crisp values to degrees.
    pub membership: MembershipFunction,
}

/// Named input or output dimension of a control system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinguisticVariable {
    /// Variable name used to address inputs and outputs.
    pub name: String,
    /// Universe of discourse.
    pub universe: Universe,
    /// Terms in declaration order.
    pub terms: Vec<Term>,
}

impl LinguisticVariable {
    /// Look up a term by name.
    pub fn term(&self, name: &str) -> Option<&Term> {
        self.terms.iter().find(|term| term.name == name)
    }

    /// Term names in declaration order.
    pub fn term_names(&self) -> Vec<&str> {
        self.terms.iter().map(|term| term.name.as_str()).collect()
    }

    /// Membership of `value` in the named term, or `None` if the term does not exist.
    pub fn membership(&self, term: &str, value: f64) -> Option<f64> {
        self.term(term).map(|term| term.membership.degree(value))
    }

    /// Crisp value that best represents the named term.
    ///
    /// This is the mean of the universe samples where the term reaches its highest degree, so a
    /// triangle yields its peak and a trapezoid the middle of its plateau.
    pub fn representative_value(&self, term: &str) -> Option<f64> {
        let term = self.term(term)?;
        let mut best = f64::NEG_INFINITY;
        let mut sum = 0.0;
        let mut count = 0usize;
        for x in self.universe.points() {
            let degree = term.membership.degree(x);
            if degree > best + PEAK_TOLERANCE {
                best = degree;
                sum = x;
                count = 1;
            } else if (degree - best).abs() <= PEAK_TOLERANCE {
                sum += x;
                count += 1;
            }
        }
        (count > 0 && best > 0.0).then(|| sum / count as f64)
    }

    /// Check the universe, term names and membership functions.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("variable name must not be empty".into());
        }
        self.universe
            .validate()
            .map_err(|err| format!("variable '{}': {err}", self.name))?;
        if self.terms.is_empty() {
            return Err(format!("variable '{}' has no terms", self.name));
        }
        for (index, term) in self.terms.iter().enumerate() {
            let earlier = &self.terms[..index];
            if earlier.iter().any(|other| other.name == term.name) {
                return Err(format!(
                    "variable '{}' declares term '{}' twice",
                    self.name, term.name
                ));
            }
            term.membership
                .validate()
                .map_err(|err| format!("term '{}' of '{}': {err}", term.name, self.name))?;
            if !self
                .universe
                .points()
                .any(|x| term.membership.degree(x) > 0.0)
            {
                return Err(format!(
                    "term '{}' of '{}' has no support inside the universe",
                    term.name, self.name
                ));
            }
        }
        Ok(())
    }
}
