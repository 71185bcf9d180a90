//! Control system definition: variables plus the rule base connecting them.

use super::{defuzz::Defuzzification, rules::Rule, variable::LinguisticVariable};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Output variable together with the defuzzification applied to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputVariable {
    /// Underlying linguistic variable.
    #[serde(flatten)]
    pub variable: LinguisticVariable,
    /// How the aggregated set is turned into a crisp value.
    #[serde(default)]
    pub defuzzification: Defuzzification,
}

/// Mamdani control system: inputs, outputs and rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlSystem {
    /// Input variables.
    pub antecedents: Vec<LinguisticVariable>,
    /// Output variables.
    pub consequents: Vec<OutputVariable>,
    /// Rule base.
    pub rules: Vec<Rule>,
}

impl ControlSystem {
    /// Input variable by name.
    pub fn antecedent(&self, name: &str) -> Option<&LinguisticVariable> {
        self.antecedents
            .iter()
            .find(|variable| variable.name == name)
    }

    /// Output variable by name.
    pub fn consequent(&self, name: &str) -> Option<&OutputVariable> {
        self.consequents
            .iter()
            .find(|output| output.variable.name == name)
    }

    /// Input or output variable by name.
    pub fn variable(&self, name: &str) -> Option<&LinguisticVariable> {
        self.antecedent(name)
            .or_else(|| self.consequent(name).map(|output| &output.variable))
    }

    /// Check variables and make sure every rule only references declared terms.
    pub fn validate(&self) -> Result<(), String> {
        if self.antecedents.is_empty() {
            return Err("control system declares no antecedents".into());
        }
        if self.consequents.is_empty() {
            return Err("control system declares no consequents".into());
        }
        if self.rules.is_empty() {
            return Err("control system declares no rules".into());
        }

        let mut names = HashSet::new();
        let all = self
            .antecedents
            .iter()
            .chain(self.consequents.iter().map(|output| &output.variable));
        for variable in all {
            variable.validate()?;
            if !names.insert(variable.name.as_str()) {
                return Err(format!("variable '{}' is declared twice", variable.name));
            }
        }

        for (index, rule) in self.rules.iter().enumerate() {
            let label = index + 1;
            if rule.antecedent.has_empty_group() {
                return Err(format!("rule {label} has an empty and/or group"));
            }
            for (variable, term) in rule.antecedent.clauses() {
                let input = self.antecedent(variable).ok_or_else(|| {
                    format!("rule {label} references unknown antecedent '{variable}'")
                })?;
                if input.term(term).is_none() {
                    return Err(format!(
                        "rule {label} references unknown term '{term}' of '{variable}'"
                    ));
                }
            }
            if rule.consequents.is_empty() {
                return Err(format!("rule {label} has no consequents"));
            }
            for consequent in &rule.consequents {
                let output = self.consequent(&consequent.variable).ok_or_else(|| {
                    format!(
                        "rule {label} references unknown consequent '{}'",
                        consequent.variable
                    )
                })?;
                if output.variable.term(&consequent.term).is_none() {
                    return Err(format!(
                        "rule {label} references unknown term '{}' of '{}'",
                        consequent.term, consequent.variable
                    ));
                }
            }
            if !(0.0..=1.0).contains(&rule.weight) {
                return Err(format!(
                    "rule {label} weight {} is outside [0, 1]",
                    rule.weight
                ));
            }
        }
        Ok(())
    }
}
