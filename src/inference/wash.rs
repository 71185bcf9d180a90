//! Wash-time prediction from soil level, load size and water temperature.

use super::{PredictionError, QueryParams};
use crate::fuzzy::{ControlSystem, Simulation};

/// Soil level in parts per million.
pub const SOIL_LEVEL: &str = "soil_level";
/// Load size in kilograms.
pub const LOAD_SIZE: &str = "load_size";
/// Water temperature in degrees Celsius.
pub const WATER_TEMPERATURE: &str = "water_temperature";
/// Output variable holding the predicted wash time.
pub const WASH_TIME: &str = "wash_time";

/// Validated inputs of a wash-time prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WashTimeInputs {
    /// Soil level in parts per million.
    pub soil_level: f64,
    /// Load size in kilograms.
    pub load_size: f64,
    /// Water temperature in degrees Celsius.
    pub water_temperature: f64,
}

impl WashTimeInputs {
    /// Parse the three required numeric parameters, reporting every problem at once.
    pub fn from_query(params: QueryParams<'_>) -> Result<Self, PredictionError> {
        let mut issues = Vec::new();
        let soil_level = params.number(SOIL_LEVEL, &mut issues);
        let load_size = params.number(LOAD_SIZE, &mut issues);
        let water_temperature = params.number(WATER_TEMPERATURE, &mut issues);
        match (soil_level, load_size, water_temperature) {
            (Some(soil_level), Some(load_size), Some(water_temperature)) if issues.is_empty() => {
                Ok(Self {
                    soil_level,
                    load_size,
                    water_temperature,
                })
            }
            _ => Err(PredictionError::InvalidParameters(issues)),
        }
    }
}

/// Control system predicting how long a wash cycle should run.
#[derive(Debug, Clone)]
pub struct WashTimeModel {
    system: ControlSystem,
}

impl WashTimeModel {
    /// Wrap a control system, checking it exposes the expected inputs and output.
    pub fn new(system: ControlSystem) -> Result<Self, String> {
        for input in [SOIL_LEVEL, LOAD_SIZE, WATER_TEMPERATURE] {
            if system.antecedent(input).is_none() {
                return Err(format!("wash-time model is missing antecedent '{input}'"));
            }
        }
        if system.consequent(WASH_TIME).is_none() {
            return Err(format!(
                "wash-time model is missing consequent '{WASH_TIME}'"
            ));
        }
        Ok(Self { system })
    }

    /// Underlying control system.
    pub fn system(&self) -> &ControlSystem {
        &self.system
    }

    /// Run a fresh simulation and return the crisp wash time.
    pub fn predict(&self, inputs: WashTimeInputs) -> Result<f64, PredictionError> {
        let mut simulation = Simulation::new(&self.system);
        simulation
            .input(SOIL_LEVEL, inputs.soil_level)?
            .input(LOAD_SIZE, inputs.load_size)?
            .input(WATER_TEMPERATURE, inputs.water_temperature)?;
        simulation.compute()?;
        let wash_time = simulation.require_output(WASH_TIME)?;
        tracing::debug!(
            soil_level = inputs.soil_level,
            load_size = inputs.load_size,
            water_temperature = inputs.water_temperature,
            wash_time,
            "Wash time computed"
        );
        Ok(wash_time)
    }
}

/// Render a crisp value the way the HTTP contract expects: shortest round-trip digits, and a
/// trailing `.0` on whole numbers.
pub fn format_wash_time(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}
