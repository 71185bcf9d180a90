//! Per-call simulation state bound to a control system.

use super::{rules::Fuzzified, system::ControlSystem};
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised while assigning inputs or computing outputs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    /// Input name does not match any antecedent of the system.
    #[error("unknown input variable '{0}'")]
    UnknownInput(String),
    /// Input value was NaN or infinite.
    #[error("input '{name}' must be a finite number, got {value}")]
    NonFiniteInput {
        /// Antecedent name.
        name: String,
        /// Rejected value.
        value: f64,
    },
    /// An antecedent was never assigned before `compute`.
    #[error("input '{0}' was not provided")]
    MissingInput(String),
    /// None of the rules targeting the output fired, so no crisp value exists.
    #[error(
        "crisp output for '{0}' cannot be calculated; no rule fired for these inputs, the rule base may be too sparse"
    )]
    NoRuleFired(String),
    /// Requested output does not exist or has not been computed.
    #[error("output '{0}' is unavailable; it is unknown or compute() has not run")]
    MissingOutput(String),
}

/// Input/output state for a single evaluation of a [`ControlSystem`].
///
/// A simulation borrows the system immutably and owns its input and output maps, so each
/// request builds its own and drops it afterwards. Inputs outside a variable's universe are
/// clipped to the nearest bound before fuzzification.
#[derive(Debug)]
pub struct Simulation<'a> {
    system: &'a ControlSystem,
    inputs: HashMap<String, f64>,
    outputs: HashMap<String, f64>,
}

impl<'a> Simulation<'a> {
    /// Start an empty simulation over `system`.
    pub fn new(system: &'a ControlSystem) -> Self {
        Self {
            system,
            inputs: HashMap::new(),
            outputs: HashMap::new(),
        }
    }

    /// Assign a crisp value to the named antecedent.
    pub fn input(&mut self, name: &str, value: f64) -> Result<&mut Self, SimulationError> {
        let variable = self
            .system
            .antecedent(name)
            .ok_or_else(|| SimulationError::UnknownInput(name.to_string()))?;
        if !value.is_finite() {
            return Err(SimulationError::NonFiniteInput {
                name: name.to_string(),
                value,
            });
        }
        let clipped = variable.universe.clip(value);
        if !variable.universe.contains(value) {
            tracing::debug!(
                input = name,
                value,
                clipped,
                "Input clipped to universe bounds"
            );
        }
        self.inputs.insert(name.to_string(), clipped);
        self.outputs.clear();
        Ok(self)
    }

    /// Run fuzzification, rule evaluation, aggregation and defuzzification.
    pub fn compute(&mut self) -> Result<(), SimulationError> {
        let fuzzified = self.fuzzify()?;

        let mut activations: HashMap<&str, Vec<(&str, f64)>> = HashMap::new();
        for rule in &self.system.rules {
            let strength = rule.activation(&fuzzified);
            if strength <= 0.0 {
                continue;
            }
            for consequent in &rule.consequents {
                activations
                    .entry(consequent.variable.as_str())
                    .or_default()
                    .push((consequent.term.as_str(), strength));
            }
        }

        let mut outputs = HashMap::with_capacity(self.system.consequents.len());
        for output in &self.system.consequents {
            let variable = &output.variable;
            let fired = activations
                .get(variable.name.as_str())
                .map(Vec::as_slice)
                .unwrap_or_default();
            let points: Vec<f64> = variable.universe.points().collect();
            let aggregated: Vec<f64> = points
                .iter()
                .map(|&x| {
                    fired
                        .iter()
                        .filter_map(|(term, strength)| {
                            variable
                                .membership(term, x)
                                .map(|degree| degree.min(*strength))
                        })
                        .fold(0.0, f64::max)
                })
                .collect();
            let crisp = output
                .defuzzification
                .apply(&points, &aggregated)
                .ok_or_else(|| SimulationError::NoRuleFired(variable.name.clone()))?;
            outputs.insert(variable.name.clone(), crisp);
        }

        self.outputs = outputs;
        Ok(())
    }

    /// Computed value of the named output, if `compute` has produced it.
    pub fn output(&self, name: &str) -> Option<f64> {
        self.outputs.get(name).copied()
    }

    /// Like [`Simulation::output`] but reports a missing value as an error.
    pub fn require_output(&self, name: &str) -> Result<f64, SimulationError> {
        self.output(name)
            .ok_or_else(|| SimulationError::MissingOutput(name.to_string()))
    }

    fn fuzzify(&self) -> Result<Fuzzified, SimulationError> {
        self.system
            .antecedents
            .iter()
            .map(|variable| -> Result<(String, HashMap<String, f64>), SimulationError> {
                let value = self
                    .inputs
                    .get(&variable.name)
                    .copied()
                    .ok_or_else(|| SimulationError::MissingInput(variable.name.clone()))?;
                let degrees: HashMap<String, f64> = variable
                    .terms
                    .iter()
                    .map(|term| (term.name.clone(), term.membership.degree(value)))
                    .collect();
                Ok((variable.name.clone(), degrees))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fuzzy::rules::{Antecedent, Consequent, Rule};
    use crate::fuzzy::system::tests::lesson_system;

    fn run(system: &ControlSystem, user_level: f64, accuracy: f64) -> Result<f64, SimulationError> {
        let mut simulation = Simulation::new(system);
        simulation
            .input("user_level", user_level)?
            .input("accuracy", accuracy)?;
        simulation.compute()?;
        simulation.require_output("lesson_difficulty")
    }

    #[test]
    fn symmetric_inputs_land_in_the_middle() {
        let system = lesson_system();
        let value = run(&system, 5.0, 50.0).expect("computed");
        assert!((value - 5.0).abs() < 1e-9, "{value}");
    }

    #[test]
    fn extreme_inputs_pull_the_output_towards_the_edges() {
        let system = lesson_system();
        let easy = run(&system, 0.0, 0.0).expect("computed");
        let hard = run(&system, 10.0, 100.0).expect("computed");
        assert!(easy < 3.0, "{easy}");
        assert!(hard > 7.0, "{hard}");
    }

    #[test]
    fn repeated_runs_are_bit_identical() {
        let system = lesson_system();
        let first = run(&system, 7.3, 64.0).expect("computed");
        for _ in 0..5 {
            assert_eq!(
                run(&system, 7.3, 64.0).expect("computed").to_bits(),
                first.to_bits()
            );
        }
    }

    #[test]
    fn out_of_universe_inputs_are_clipped() {
        let system = lesson_system();
        assert_eq!(
            run(&system, 10.0, 250.0).expect("computed").to_bits(),
            run(&system, 10.0, 100.0).expect("computed").to_bits()
        );
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let system = lesson_system();
        let mut simulation = Simulation::new(&system);
        assert_eq!(
            simulation.input("mood", 1.0).unwrap_err(),
            SimulationError::UnknownInput("mood".into())
        );
        assert!(matches!(
            simulation.input("accuracy", f64::NAN).unwrap_err(),
            SimulationError::NonFiniteInput { .. }
        ));
    }

    #[test]
    fn compute_requires_every_input() {
        let system = lesson_system();
        let mut simulation = Simulation::new(&system);
        simulation.input("user_level", 3.0).expect("valid input");
        assert_eq!(
            simulation.compute().unwrap_err(),
            SimulationError::MissingInput("accuracy".into())
        );
        assert_eq!(
            simulation.require_output("lesson_difficulty").unwrap_err(),
            SimulationError::MissingOutput("lesson_difficulty".into())
        );
    }

    #[test]
    fn sparse_rule_base_reports_no_rule_fired() {
        let mut system = lesson_system();
        system.rules = vec![Rule {
            antecedent: Antecedent::Is {
                variable: "user_level".into(),
                term: "expert".into(),
            },
            consequents: vec![Consequent {
                variable: "lesson_difficulty".into(),
                term: "hard".into(),
            }],
            weight: 1.0,
        }];
        assert_eq!(
            run(&system, 0.0, 50.0).unwrap_err(),
            SimulationError::NoRuleFired("lesson_difficulty".into())
        );
    }
}
