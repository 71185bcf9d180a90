//! Lesson-difficulty prediction from a learner's level and accuracy.

use super::{PredictionError, QueryParams};
use crate::fuzzy::{ControlSystem, LinguisticVariable, Simulation};
use serde::Serialize;

/// Query parameter carrying the learner level (number or term).
pub const USER_LEVEL_PARAMETER: &str = "user_level_parameter";
/// Query parameter carrying the learner accuracy (number or term).
pub const ACCURACY_PARAMETER: &str = "accuracy_parameter";
/// Antecedent fed by [`USER_LEVEL_PARAMETER`].
pub const USER_LEVEL: &str = "user_level";
/// Antecedent fed by [`ACCURACY_PARAMETER`].
pub const ACCURACY: &str = "accuracy";
/// Output variable holding the predicted difficulty.
pub const LESSON_DIFFICULTY: &str = "lesson_difficulty";
/// Output categories reported alongside the crisp difficulty.
pub const DIFFICULTY_CATEGORIES: [&str; 3] = ["easy", "moderate", "hard"];

/// Resolved numeric inputs of a lesson-difficulty prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LessonInputs {
    /// Learner level on the `user_level` universe.
    pub user_level: f64,
    /// Learner accuracy on the `accuracy` universe.
    pub accuracy: f64,
}

/// Degree to which the predicted difficulty belongs to each category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DifficultyMemberships {
    /// Membership in `easy`.
    pub easy: f64,
    /// Membership in `moderate`.
    pub moderate: f64,
    /// Membership in `hard`.
    pub hard: f64,
}

/// Unrounded result of a lesson-difficulty prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LessonPrediction {
    /// Crisp difficulty.
    pub difficulty: f64,
    /// Category memberships of `difficulty`.
    pub memberships: DifficultyMemberships,
}

impl LessonPrediction {
    /// Copy with every value rounded to two decimal places for presentation.
    pub fn rounded(&self) -> Self {
        Self {
            difficulty: round2(self.difficulty),
            memberships: DifficultyMemberships {
                easy: round2(self.memberships.easy),
                moderate: round2(self.memberships.moderate),
                hard: round2(self.memberships.hard),
            },
        }
    }
}

/// Round to two decimal places, ties to even (`0.125` becomes `0.12`).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Control system plus the linguistic variables used to resolve terms and label the output.
#[derive(Debug, Clone)]
pub struct LessonDifficultyModel {
    system: ControlSystem,
    user_level: LinguisticVariable,
    accuracy: LinguisticVariable,
    difficulty: LinguisticVariable,
}

impl LessonDifficultyModel {
    /// Assemble the model from a control system and the bundled variable definitions.
    ///
    /// Bundled variables take precedence; any of the three that is not bundled falls back to
    /// the control system's own definition of the same name.
    pub fn new(system: ControlSystem, variables: Vec<LinguisticVariable>) -> Result<Self, String> {
        for input in [USER_LEVEL, ACCURACY] {
            if system.antecedent(input).is_none() {
                return Err(format!("lesson model is missing antecedent '{input}'"));
            }
        }
        if system.consequent(LESSON_DIFFICULTY).is_none() {
            return Err(format!(
                "lesson model is missing consequent '{LESSON_DIFFICULTY}'"
            ));
        }

        let pick = |name: &str| -> Result<LinguisticVariable, String> {
            variables
                .iter()
                .find(|variable| variable.name == name)
                .or_else(|| system.variable(name))
                .cloned()
                .ok_or_else(|| format!("lesson model has no definition for '{name}'"))
        };
        let user_level = pick(USER_LEVEL)?;
        let accuracy = pick(ACCURACY)?;
        let difficulty = pick(LESSON_DIFFICULTY)?;

        for category in DIFFICULTY_CATEGORIES {
            if difficulty.term(category).is_none() {
                return Err(format!(
                    "'{LESSON_DIFFICULTY}' must define the term '{category}'"
                ));
            }
        }

        Ok(Self {
            system,
            user_level,
            accuracy,
            difficulty,
        })
    }

    /// Underlying control system.
    pub fn system(&self) -> &ControlSystem {
        &self.system
    }

    /// Variable used to label the output.
    pub fn difficulty(&self) -> &LinguisticVariable {
        &self.difficulty
    }

    /// Resolve both parameters to numbers, accepting either numeric strings or term names.
    pub fn resolve_inputs(&self, params: QueryParams<'_>) -> Result<LessonInputs, PredictionError> {
        let mut issues = Vec::new();
        let user_level = params.number_or_term(USER_LEVEL_PARAMETER, &self.user_level, &mut issues);
        let accuracy = params.number_or_term(ACCURACY_PARAMETER, &self.accuracy, &mut issues);
        match (user_level, accuracy) {
            (Some(user_level), Some(accuracy)) if issues.is_empty() => Ok(LessonInputs {
                user_level,
                accuracy,
            }),
            _ => Err(PredictionError::InvalidParameters(issues)),
        }
    }

    /// Run a fresh simulation and grade the unrounded output against each category.
    pub fn predict(&self, inputs: LessonInputs) -> Result<LessonPrediction, PredictionError> {
        let mut simulation = Simulation::new(&self.system);
        simulation
            .input(USER_LEVEL, inputs.user_level)?
            .input(ACCURACY, inputs.accuracy)?;
        simulation.compute()?;
        let difficulty = simulation.require_output(LESSON_DIFFICULTY)?;

        let degree = |category: &str| {
            self.difficulty
                .membership(category, difficulty)
                .unwrap_or_default()
        };
        let prediction = LessonPrediction {
            difficulty,
            memberships: DifficultyMemberships {
                easy: degree("easy"),
                moderate: degree("moderate"),
                hard: degree("hard"),
            },
        };
        tracing::debug!(
            user_level = inputs.user_level,
            accuracy = inputs.accuracy,
            difficulty,
            "Lesson difficulty computed"
        );
        Ok(prediction)
    }
}
