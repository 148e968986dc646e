//! Capacitated lot-sizing and scheduling optimizer: setups, safety stock,
//! backlog and vacation planning over a monthly horizon.
//!
//! Pipeline (strictly left to right, one build/one solve/one extract, no
//! feedback loop): [`horizon`] -> [`bigm`] -> [`variables`] -> [`objective`]
//! -> [`constraints`] -> [`solver_adapter`] -> [`result`]. [`model::solve`]
//! is the single entry point that wires the stages together.

#![allow(clippy::too_many_arguments)]

pub mod bigm;
pub mod config;
pub mod constraints;
pub mod error;
pub mod horizon;
pub mod model;
pub mod objective;
pub mod result;
pub mod sanitize;
pub mod solver_adapter;
pub mod types;
pub mod variables;

pub use config::{CapacityParams, DecisionType, EngineConfig, SolveParams, SolverBackend};
pub use error::SolveError;
pub use model::{solve, SolveInputs};
pub use result::SolveResult;
pub use types::{CostMap, DemandMap, InitialStockMap, ProductKey, ProductivityMap};

/// Prints the package banner (name, license, authors, description) the way
/// every demo binary in this crate's lineage does on startup.
pub fn init() {
    dev_utils::app_dt!(file!(), "package" => ["license", "keywords", "description", "authors"]);
}
