//! Variable Factory.
//!
//! Declares every decision/state/accounting variable in the model exactly
//! once, with sanitized symbolic names. `H` is integer iff `integer_var`;
//! `Y`, `S`, `Delta`, `Idle` are always binary (modeled as `0..=1` integers,
//! since `good_lp`'s variable builder in this crate's configuration exposes
//! `.integer()` rather than a dedicated `.binary()` shorthand).

use std::collections::HashMap;

use good_lp::{variable, ProblemVariables, Variable};

use crate::bigm::h_upper_bound;
use crate::horizon::Horizon;
use crate::sanitize::sanitize_name;
use crate::types::{MachineId, Period, ProductKey, ProductivityMap};

pub type StepKey = (MachineId, ProductKey, usize);
pub type MachinePeriodKey = (MachineId, usize);
pub type ProductPeriodKey = (ProductKey, usize);

#[derive(Debug, Default)]
pub struct VariableSet {
    /// Step count of production. Upper-bounded by the tightened big-M.
    pub h: HashMap<StepKey, Variable>,
    /// Nonzero-production indicator.
    pub y: HashMap<StepKey, Variable>,
    /// "Configured for p at end of period t" indicator.
    pub s: HashMap<StepKey, Variable>,
    /// "Paid a setup to p during t" indicator.
    pub delta: HashMap<StepKey, Variable>,
    /// "Produces nothing in t" indicator, per machine/period.
    pub idle: HashMap<MachinePeriodKey, Variable>,
    /// End-of-period inventory, per product/period.
    pub inventory: HashMap<ProductPeriodKey, Variable>,
    /// Delivered demand, per product/period.
    pub delivered: HashMap<ProductPeriodKey, Variable>,
    /// Lost demand, per product/period.
    pub lost: HashMap<ProductPeriodKey, Variable>,
    /// Backlog carried forward, per product/period. Empty unless `max_delay > 0`.
    pub backlog: HashMap<ProductPeriodKey, Variable>,
    /// The big-M used to link `H[key] <= ub * Y[key]`, for the constraint
    /// assembler to wire up: Y is forced to 1 whenever H is positive.
    pub h_upper_bound: HashMap<StepKey, f64>,
}

#[allow(clippy::too_many_arguments)]
pub fn build_variables(
    vars: &mut ProblemVariables,
    horizon: &Horizon,
    productivity: &ProductivityMap,
    remaining_demand: &HashMap<ProductKey, Vec<f64>>,
    hours_per_period: f64,
    step_hours: f64,
    integer_var: bool,
    max_delay: u32,
) -> VariableSet {
    let mut out = VariableSet::default();

    for (machine, products) in &horizon.machine_products {
        for (t_idx, period) in horizon.periods.iter().enumerate() {
            let safe_t = sanitize_name(period);
            let idle_name = format!("Idle_{}_{}", sanitize_name(machine), safe_t);
            out.idle.insert(
                (machine.clone(), t_idx),
                vars.add(variable().min(0.0).max(1.0).integer().name(idle_name)),
            );

            for product in products {
                let safe_p = sanitize_name(&format!("{}_{}", product.0, product.1));
                let rate = productivity[product][machine];
                let remaining = remaining_demand[product][t_idx];
                let ub = h_upper_bound(hours_per_period, step_hours, rate, remaining, integer_var, max_delay);

                let key: StepKey = (machine.clone(), product.clone(), t_idx);

                let mut h_def = variable().min(0.0).max(ub);
                if integer_var {
                    h_def = h_def.integer();
                }
                let h_var = vars.add(h_def.name(format!("H_{}_{}_{}", sanitize_name(machine), safe_p, safe_t)));

                let y_var = vars.add(
                    variable().min(0.0).max(1.0).integer().name(format!(
                        "Y_{}_{}_{}",
                        sanitize_name(machine),
                        safe_p,
                        safe_t
                    )),
                );
                let s_var = vars.add(
                    variable().min(0.0).max(1.0).integer().name(format!(
                        "S_{}_{}_{}",
                        sanitize_name(machine),
                        safe_p,
                        safe_t
                    )),
                );
                let delta_var = vars.add(
                    variable().min(0.0).max(1.0).integer().name(format!(
                        "Delta_{}_{}_{}",
                        sanitize_name(machine),
                        safe_p,
                        safe_t
                    )),
                );

                out.h.insert(key.clone(), h_var);
                out.y.insert(key.clone(), y_var);
                out.s.insert(key.clone(), s_var);
                out.delta.insert(key.clone(), delta_var);
                out.h_upper_bound.insert(key, ub);
            }
        }
    }

    for product in &horizon.products {
        let safe_p = sanitize_name(&format!("{}_{}", product.0, product.1));
        for (t_idx, period) in horizon.periods.iter().enumerate() {
            let safe_t = sanitize_name(period);
            let key: ProductPeriodKey = (product.clone(), t_idx);

            out.inventory.insert(
                key.clone(),
                vars.add(variable().min(0.0).name(format!("I_{}_{}", safe_p, safe_t))),
            );
            out.delivered.insert(
                key.clone(),
                vars.add(variable().min(0.0).name(format!("Q_{}_{}", safe_p, safe_t))),
            );
            out.lost.insert(
                key.clone(),
                vars.add(variable().min(0.0).name(format!("K_{}_{}", safe_p, safe_t))),
            );

            if max_delay > 0 {
                out.backlog.insert(
                    key,
                    vars.add(variable().min(0.0).name(format!("B_{}_{}", safe_p, safe_t))),
                );
            }
        }
    }

    out
}
