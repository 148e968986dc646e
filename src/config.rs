//! Process-wide constants and caller-facing solve parameters.

use std::collections::HashSet;

/// Process-wide business constants, overridable by the caller but never
/// per-solve inputs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Machines that pay the high setup time (7h instead of 3h).
    pub high_setup_machines: HashSet<String>,
    pub setup_time_high: f64,
    pub setup_time_low: f64,
    /// Fraction of unit cost charged per unit of backlog, per period carried.
    pub backlog_penalty_factor: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            high_setup_machines: ["11", "14"].into_iter().map(String::from).collect(),
            setup_time_high: 7.0,
            setup_time_low: 3.0,
            backlog_penalty_factor: 0.10,
        }
    }
}

impl EngineConfig {
    /// Setup time in hours a machine pays for any configuration change.
    pub fn setup_time(&self, machine: &str) -> f64 {
        if self.high_setup_machines.contains(machine) {
            self.setup_time_high
        } else {
            self.setup_time_low
        }
    }
}

/// How a caller's `decision_type` maps to step size and variable domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionType {
    Kg,
    Hours,
    Shifts,
    Days,
    Weeks,
}

/// Shift/day parameters used to derive `hours_per_period` and the step size
/// for `Shifts`/`Days`/`Weeks` decision types.
#[derive(Debug, Clone, Copy)]
pub struct CapacityParams {
    pub shifts_per_day: f64,
    pub hours_per_shift: f64,
    pub days_per_week: f64,
}

impl Default for CapacityParams {
    fn default() -> Self {
        CapacityParams { shifts_per_day: 3.0, hours_per_shift: 8.0, days_per_week: 7.0 }
    }
}

impl CapacityParams {
    /// `shifts * hours_per_shift * days_per_week * 4.33` (weeks per average month).
    pub fn hours_per_period(&self) -> f64 {
        self.shifts_per_day * self.hours_per_shift * self.days_per_week * 4.33
    }
}

impl DecisionType {
    /// Returns `(step_hours, integer_var)` for this decision type, given the
    /// capacity parameters and the `hours`-type bucket size.
    pub fn step_policy(self, bucket_hours: f64, capacity: &CapacityParams) -> (f64, bool) {
        match self {
            DecisionType::Kg => (1.0, false),
            DecisionType::Hours => (bucket_hours, true),
            DecisionType::Shifts => (capacity.hours_per_shift, true),
            DecisionType::Days => (capacity.hours_per_shift * capacity.shifts_per_day, true),
            DecisionType::Weeks => {
                (capacity.hours_per_shift * capacity.shifts_per_day * capacity.days_per_week, true)
            }
        }
    }
}

/// MIP back-end requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverBackend {
    #[default]
    Cbc,
    Glpk,
    Gurobi,
}

impl SolverBackend {
    /// Unknown names fall back to CBC.
    pub fn parse(name: &str) -> SolverBackend {
        match name.to_ascii_uppercase().as_str() {
            "GLPK" => SolverBackend::Glpk,
            "GUROBI" => SolverBackend::Gurobi,
            _ => SolverBackend::Cbc,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SolverBackend::Cbc => "CBC",
            SolverBackend::Glpk => "GLPK",
            SolverBackend::Gurobi => "GUROBI",
        }
    }
}

/// Caller-facing knobs for one `solve` call, with sensible defaults for a
/// monthly-bucket, kg-denominated plan.
#[derive(Debug, Clone)]
pub struct SolveParams {
    pub hours_per_period: f64,
    pub step_hours: f64,
    pub integer_var: bool,
    pub safety_stock_pct: f64,
    pub max_delay: u32,
    pub vacation_planning: bool,
    pub operators_per_machine: u32,
    pub solver_name: String,
    pub time_limit_secs: u64,
    pub threads: Option<usize>,
    pub log_path: Option<std::path::PathBuf>,
}

impl Default for SolveParams {
    fn default() -> Self {
        SolveParams {
            hours_per_period: 720.0,
            step_hours: 6.0,
            integer_var: true,
            safety_stock_pct: 0.0,
            max_delay: 0,
            vacation_planning: false,
            operators_per_machine: 2,
            solver_name: "CBC".to_string(),
            time_limit_secs: 600,
            threads: None,
            log_path: None,
        }
    }
}

impl SolveParams {
    pub fn backend(&self) -> SolverBackend {
        SolverBackend::parse(&self.solver_name)
    }
}
