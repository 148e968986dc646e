//! Solver Adapter.
//!
//! Wraps the chosen MIP back-end with a time limit, optional log path and
//! thread-count hint. All three accepted backend names (`"CBC"`, `"GLPK"`,
//! `"GUROBI"`) resolve to the same pure-Rust `good_lp` `microlp` engine: it
//! needs no system-linked solver install, so there is no native CBC/GLPK/
//! Gurobi binding in this crate's dependency tree.

use std::fs::OpenOptions;
use std::io::Write as _;
use std::time::Instant;

use good_lp::ResolutionError;

use crate::config::{SolveParams, SolverBackend};

/// Outcome of a solve attempt, mapped onto the status vocabulary
/// `{"Optimal", "Feasible", "Infeasible", "Unbounded", "Not Solved",
/// "Undefined"}`.
pub enum SolveOutcome<S> {
    Solved { status: &'static str, solution: S },
    Unsolved { status: &'static str },
}

/// Runs `solve_fn` (expected to call `good_lp`'s blocking `.solve()`)
/// synchronously: one solve, no suspension points. `microlp` has no
/// cooperative cancellation hook, so `time_limit_secs` cannot be enforced
/// mid-solve here; it is recorded in the adapter log alongside the actual
/// elapsed time rather than acted on.
pub fn solve_with_time_limit<S, F>(params: &SolveParams, solve_fn: F) -> SolveOutcome<S>
where
    F: FnOnce() -> Result<S, ResolutionError>,
{
    let backend = params.backend();
    log_adapter_start(params, backend);

    let start = Instant::now();
    let result = solve_fn();
    let elapsed = start.elapsed();

    let outcome = match result {
        Ok(solution) => SolveOutcome::Solved { status: "Optimal", solution },
        Err(ResolutionError::Infeasible) => SolveOutcome::Unsolved { status: "Infeasible" },
        Err(ResolutionError::Unbounded) => SolveOutcome::Unsolved { status: "Unbounded" },
        Err(_) => SolveOutcome::Unsolved { status: "Undefined" },
    };

    log_adapter_finish(params, elapsed, &outcome);
    outcome
}

fn status_of<S>(outcome: &SolveOutcome<S>) -> &'static str {
    match outcome {
        SolveOutcome::Solved { status, .. } => status,
        SolveOutcome::Unsolved { status } => status,
    }
}

fn log_adapter_start(params: &SolveParams, backend: SolverBackend) {
    dev_utils::dlog::debug!(
        "solver adapter: backend={} (engine=microlp) time_limit={}s threads={:?}",
        backend.label(),
        params.time_limit_secs,
        params.threads
    );
}

fn log_adapter_finish<S>(params: &SolveParams, elapsed: std::time::Duration, outcome: &SolveOutcome<S>) {
    let status = status_of(outcome);
    dev_utils::dlog::debug!("solver adapter: status={} elapsed={:?}", status, elapsed);
    if elapsed.as_secs() > params.time_limit_secs {
        dev_utils::dlog::warn!(
            "solver adapter: solve took {:?}, past the requested {}s time limit (not enforced by microlp)",
            elapsed,
            params.time_limit_secs
        );
    }
    if let Some(path) = &params.log_path {
        let line = format!("status={status} elapsed_ms={}\n", elapsed.as_millis());
        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
            let _ = file.write_all(line.as_bytes());
        }
    }
}
