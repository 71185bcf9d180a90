//! Mamdani fuzzy inference engine.
//!
//! A [`ControlSystem`] is a read-only description of input and output linguistic variables and
//! the rules connecting them. Evaluation happens through a [`Simulation`], which borrows the
//! system, holds the inputs for one call, and produces crisp outputs:
//!
//! 1. inputs are clipped to their universe and fuzzified against every term,
//! 2. each rule fires with `min`/`max`/complement connectives scaled by its weight,
//! 3. consequent sets are clipped at the firing strength and aggregated with `max`,
//! 4. the aggregated set is defuzzified (centroid unless the output says otherwise).

pub mod defuzz;
pub mod membership;
pub mod rules;
pub mod simulation;
pub mod system;
pub mod variable;

pub use defuzz::Defuzzification;
pub use membership::MembershipFunction;
pub use rules::{Antecedent, Consequent, Rule};
pub use simulation::{Simulation, SimulationError};
pub use system::{ControlSystem, OutputVariable};
pub use variable::{LinguisticVariable, Term, Universe};
