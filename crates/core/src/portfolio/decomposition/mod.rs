//! Decomposition module - reduction of classified transactions into
//! contribution/gain aggregates.

mod decomposition_calculator;
mod decomposition_model;


pub use decomposition_calculator::decompose;
pub use decomposition_model::Decomposition;
