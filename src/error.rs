//! Eager configuration errors, raised before any model is built. Solver-
//! reported outcomes (Infeasible, Not Solved, time-limited Feasible) are
//! never represented here — they are encoded in
//! [`crate::result::SolveResult::status`] instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SolveError {
    #[error("no active machines were supplied")]
    NoActiveMachines,
}
