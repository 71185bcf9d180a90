//! Rule antecedents, consequents and their evaluation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Fuzzified inputs: variable name → term name → degree.
pub type Fuzzified = HashMap<String, HashMap<String, f64>>;

/// Logical expression over `variable is term` clauses.
///
/// Conjunction uses `min`, disjunction `max`, and negation the standard complement `1 - x`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Antecedent {
    /// `variable is term`.
    Is {
        /// Antecedent variable name.
        variable: String,
        /// Term of that variable.
        term: String,
    },
    /// All operands must hold.
    And {
        /// Sub-expressions.
        operands: Vec<Antecedent>,
    },
    /// Any operand may hold.
    Or {
        /// Sub-expressions.
        operands: Vec<Antecedent>,
    },
    /// Complement of the operand.
    Not {
        /// Negated sub-expression.
        operand: Box<Antecedent>,
    },
}

impl Antecedent {
    /// Firing strength of the expression against fuzzified inputs.
    ///
    /// Clauses whose variable or term is absent evaluate to zero; systems are validated at load
    /// time so that does not happen while serving.
    pub fn strength(&self, inputs: &Fuzzified) -> f64 {
        match self {
            Self::Is { variable, term } => inputs
                .get(variable)
                .and_then(|terms| terms.get(term))
                .copied()
                .unwrap_or(0.0),
            Self::And { operands } => operands
                .iter()
                .map(|operand| operand.strength(inputs))
                .fold(1.0, f64::min),
            Self::Or { operands } => operands
                .iter()
                .map(|operand| operand.strength(inputs))
                .fold(0.0, f64::max),
            Self::Not { operand } => 1.0 - operand.strength(inputs),
        }
    }

    /// Visit every `variable is term` clause in the expression.
    pub fn clauses(&self) -> Vec<(&str, &str)> {
        let mut clauses = Vec::new();
        self.collect_clauses(&mut clauses);
        clauses
    }

    fn collect_clauses<'a>(&'a self, out: &mut Vec<(&'a str, &'a str)>) {
        match self {
            Self::Is { variable, term } => out.push((variable.as_str(), term.as_str())),
            Self::And { operands } | Self::Or { operands } => {
                for operand in operands {
                    operand.collect_clauses(out);
                }
            }
            Self::Not { operand } => operand.collect_clauses(out),
        }
    }

    /// Whether any `and`/`or` node has no operands.
    pub(crate) fn has_empty_group(&self) -> bool {
        match self {
            Self::Is { .. } => false,
            Self::And { operands } | Self::Or { operands } => {
                operands.is_empty() || operands.iter().any(Self::has_empty_group)
            }
            Self::Not { operand } => operand.has_empty_group(),
        }
    }
}

/// `variable is term` conclusion of a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consequent {
    /// Consequent variable name.
    pub variable: String,
    /// Term activated by the rule.
    pub term: String,
}

fn default_weight() -> f64 {
    1.0
}

/// IF antecedent THEN consequents, scaled by `weight`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Condition part.
    #[serde(rename = "if")]
    pub antecedent: Antecedent,
    /// Conclusion part.
    #[serde(rename = "then")]
    pub consequents: Vec<Consequent>,
    /// Multiplier applied to the firing strength, within `[0, 1]`.
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl Rule {
    /// Weighted firing strength.
    pub fn activation(&self, inputs: &Fuzzified) -> f64 {
        self.antecedent.strength(inputs) * self.weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is(variable: &str, term: &str) -> Antecedent {
        Antecedent::Is {
            variable: variable.into(),
            term: term.into(),
        }
    }

    fn inputs() -> Fuzzified {
        let mut inputs = Fuzzified::new();
        inputs.insert(
            "soil_level".into(),
            HashMap::from([("low".into(), 0.25), ("high".into(), 0.75)]),
        );
        inputs.insert(
            "load_size".into(),
            HashMap::from([("small".into(), 0.6), ("large".into(), 0.1)]),
        );
        inputs
    }

    #[test]
    fn connectives_use_min_max_and_complement() {
        let inputs = inputs();
        let and = Antecedent::And {
            operands: vec![is("soil_level", "high"), is("load_size", "small")],
        };
        let or = Antecedent::Or {
            operands: vec![is("soil_level", "low"), is("load_size", "large")],
        };
        let not = Antecedent::Not {
            operand: Box::new(is("soil_level", "low")),
        };
        assert_eq!(and.strength(&inputs), 0.6);
        assert_eq!(or.strength(&inputs), 0.25);
        assert_eq!(not.strength(&inputs), 0.75);
    }

    #[test]
    fn weight_scales_activation() {
        let rule = Rule {
            antecedent: is("soil_level", "high"),
            consequents: vec![Consequent {
                variable: "wash_time".into(),
                term: "long".into(),
            }],
            weight: 0.5,
        };
        assert_eq!(rule.activation(&inputs()), 0.375);
    }

    #[test]
    fn clauses_walk_nested_expressions() {
        let expr = Antecedent::Or {
            operands: vec![
                is("soil_level", "high"),
                Antecedent::Not {
                    operand: Box::new(Antecedent::And {
                        operands: vec![is("load_size", "small"), is("water_temperature", "hot")],
                    }),
                },
            ],
        };
        assert_eq!(
            expr.clauses(),
            vec![
                ("soil_level", "high"),
                ("load_size", "small"),
                ("water_temperature", "hot"),
            ]
        );
        assert!(!expr.has_empty_group());
        assert!(Antecedent::And { operands: vec![] }.has_empty_group());
    }

    #[test]
    fn rules_parse_with_default_weight() {
        let rule: Rule = serde_json::from_str(
            r#"{"if":{"op":"is","variable":"soil_level","term":"low"},
                "then":[{"variable":"wash_time","term":"short"}]}"#,
        )
        .expect("rule json");
        assert_eq!(rule.weight, 1.0);
        assert_eq!(rule.consequents[0].term, "short");
    }
}
