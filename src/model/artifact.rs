//! On-disk model formats and the serving model they turn into.

use crate::fuzzy::{ControlSystem, LinguisticVariable};
use crate::inference::{LessonDifficultyModel, WashTimeModel};
use serde::{Deserialize, Serialize};

/// Control system shipped with the linguistic variables used to interpret it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBundle {
    /// Control system evaluated for each prediction.
    pub system: ControlSystem,
    /// One to three named variable definitions.
    pub variables: Vec<LinguisticVariable>,
}

/// Deserialized model artifact.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelArtifact {
    /// The artifact is a control system on its own.
    System(ControlSystem),
    /// The artifact bundles a control system with variable definitions.
    Bundle(ModelBundle),
}

impl ModelArtifact {
    /// Parse an artifact from JSON, telling the two layouts apart by the `system` key.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_slice(bytes)?;
        if value.get("system").is_some() {
            serde_json::from_value(value).map(Self::Bundle)
        } else {
            serde_json::from_value(value).map(Self::System)
        }
    }

    /// Structural validation of the control system and bundled variables.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::System(system) => system.validate(),
            Self::Bundle(bundle) => {
                bundle.system.validate()?;
                if bundle.variables.is_empty() || bundle.variables.len() > 3 {
                    return Err(format!(
                        "a model bundle carries 1 to 3 variables, found {}",
                        bundle.variables.len()
                    ));
                }
                for (index, variable) in bundle.variables.iter().enumerate() {
                    variable.validate()?;
                    if bundle.variables[..index]
                        .iter()
                        .any(|other| other.name == variable.name)
                    {
                        return Err(format!(
                            "bundled variable '{}' is declared twice",
                            variable.name
                        ));
                    }
                }
                Ok(())
            }
        }
    }

    /// Build the serving model matching this artifact's layout.
    pub fn into_serving(self) -> Result<ServingModel, String> {
        match self {
            Self::System(system) => WashTimeModel::new(system).map(ServingModel::WashTime),
            Self::Bundle(ModelBundle { system, variables }) => {
                LessonDifficultyModel::new(system, variables).map(ServingModel::LessonDifficulty)
            }
        }
    }
}

/// Which prediction endpoint a model serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    /// `GET /predict` with soil level, load size and water temperature.
    WashTime,
    /// `GET /predict` with user level and accuracy.
    LessonDifficulty,
}

impl ModelKind {
    /// Short label used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WashTime => "wash_time",
            Self::LessonDifficulty => "lesson_difficulty",
        }
    }
}

/// Model ready to answer prediction requests.
#[derive(Debug, Clone)]
pub enum ServingModel {
    /// Wash-time control system.
    WashTime(WashTimeModel),
    /// Lesson-difficulty control system with its variables.
    LessonDifficulty(LessonDifficultyModel),
}

impl ServingModel {
    /// Endpoint flavour served by this model.
    pub fn kind(&self) -> ModelKind {
        match self {
            Self::WashTime(_) => ModelKind::WashTime,
            Self::LessonDifficulty(_) => ModelKind::LessonDifficulty,
        }
    }

    /// Underlying control system.
    pub fn system(&self) -> &ControlSystem {
        match self {
            Self::WashTime(model) => model.system(),
            Self::LessonDifficulty(model) => model.system(),
        }
    }
}
