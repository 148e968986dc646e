//! Assembles the scalar objective from the declared variables.
//!
//! Cost = lost sales + (backlog, if enabled) + setup, each retained as its own
//! term list so the result extractor can report a `cost_breakdown` alongside
//! the combined objective.

use good_lp::Expression;

use crate::config::EngineConfig;
use crate::horizon::Horizon;
use crate::types::{CostMap, ProductivityMap};
use crate::variables::VariableSet;

/// The three cost term groups, kept separate for the cost-breakdown report.
pub struct ObjectiveTerms {
    pub lost_sales: Expression,
    pub backlog: Expression,
    pub setup: Expression,
    pub combined: Expression,
}

pub fn build_objective(
    horizon: &Horizon,
    costs: &CostMap,
    productivity: &ProductivityMap,
    config: &EngineConfig,
    vars: &VariableSet,
    backlog_penalty_factor: f64,
) -> ObjectiveTerms {
    let mut lost_sales = Expression::from(0.0);
    for product in &horizon.products {
        let cost = costs.get(product).copied().unwrap_or(0.0);
        for t_idx in 0..horizon.periods.len() {
            let k = vars.lost[&(product.clone(), t_idx)];
            lost_sales += cost * k;
        }
    }

    let mut backlog = Expression::from(0.0);
    if !vars.backlog.is_empty() {
        for product in &horizon.products {
            let cost = costs.get(product).copied().unwrap_or(0.0);
            for t_idx in 0..horizon.periods.len() {
                if let Some(&b) = vars.backlog.get(&(product.clone(), t_idx)) {
                    backlog += cost * backlog_penalty_factor * b;
                }
            }
        }
    }

    let mut setup = Expression::from(0.0);
    for (machine, products) in &horizon.machine_products {
        let setup_time = config.setup_time(machine);
        for product in products {
            let cost = costs.get(product).copied().unwrap_or(0.0);
            let rate = productivity[product][machine];
            for t_idx in 0..horizon.periods.len() {
                let delta = vars.delta[&(machine.clone(), product.clone(), t_idx)];
                setup += cost * rate * setup_time * delta;
            }
        }
    }

    let combined = lost_sales.clone() + backlog.clone() + setup.clone();
    ObjectiveTerms { lost_sales, backlog, setup, combined }
}
