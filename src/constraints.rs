//! Builds every constraint family on top of the declared variables,
//! including the `H <= ub * Y` capacity link, which only needs the model
//! object (so it is wired here, first, rather than at variable declaration
//! time) before the rest of the constraint families.

use good_lp::{constraint, Expression, SolverModel};

use crate::config::EngineConfig;
use crate::horizon::Horizon;
use crate::sanitize::value_or_zero;
use crate::types::{DemandMap, InitialStockMap, ProductivityMap};
use crate::variables::VariableSet;

/// Adds every constraint family to `model` and returns it back (the `good_lp`
/// builder consumes and returns `self` on `.with(...)`).
#[allow(clippy::too_many_arguments)]
pub fn add_constraints<M: SolverModel>(
    mut model: M,
    horizon: &Horizon,
    demand: &DemandMap,
    initial_stock: &InitialStockMap,
    productivity: &ProductivityMap,
    vars: &VariableSet,
    config: &EngineConfig,
    hours_per_period: f64,
    step_hours: f64,
    safety_stock_pct: f64,
    max_delay: u32,
    vacation_planning: bool,
) -> M {
    let n_periods = horizon.periods.len();

    // Capacity link: H[m,p,t] <= ub * Y[m,p,t].
    for (key, &h) in &vars.h {
        let ub = vars.h_upper_bound[key];
        let y = vars.y[key];
        model = model.with(constraint!(h <= ub * y));
    }

    // 1/2/3/4: one-state, Y<=machine capacity under Idle, setup linking, Y<=>S linking.
    for (machine, products) in &horizon.machine_products {
        let setup_time = config.setup_time(machine);
        for t_idx in 0..n_periods {
            let idle = vars.idle[&(machine.clone(), t_idx)];

            let mut state_sum = Expression::from(0.0);
            let mut y_sum = Expression::from(0.0);
            let mut usage = Expression::from(0.0);

            for product in products {
                let key = (machine.clone(), product.clone(), t_idx);
                let curr_s = vars.s[&key];
                let y = vars.y[&key];
                let h = vars.h[&key];
                let delta = vars.delta[&key];

                state_sum += curr_s;
                y_sum += y;

                let prev_s: Expression = if t_idx == 0 {
                    Expression::from(0.0)
                } else {
                    let prev_key = (machine.clone(), product.clone(), t_idx - 1);
                    vars.s.get(&prev_key).copied().map(Expression::from).unwrap_or_else(|| Expression::from(0.0))
                };

                model = model.with(constraint!(delta >= curr_s - prev_s.clone()));
                model = model.with(constraint!(delta >= y - prev_s));
                model = model.with(constraint!(curr_s <= y + idle));

                usage += step_hours * h + setup_time * delta;
            }

            let machine_product_count = products.len() as f64;
            model = model.with(constraint!(state_sum == 1));
            model = model.with(constraint!(y_sum + machine_product_count * idle <= machine_product_count));
            model = model.with(constraint!(usage <= hours_per_period));
        }
    }

    // 5/6/7: mass balance, delivery identity, safety stock.
    for product in &horizon.products {
        let initial = initial_stock.get(product).copied().unwrap_or(0.0);
        let machines = horizon.product_machines.get(product).cloned().unwrap_or_default();

        for t_idx in 0..n_periods {
            let period = &horizon.periods[t_idx];
            let demand_t = demand.get(product).and_then(|d| d.get(period)).copied().unwrap_or(0.0);

            let mut produced = Expression::from(0.0);
            for machine in &machines {
                let h = vars.h[&(machine.clone(), product.clone(), t_idx)];
                let rate = productivity[product][machine];
                let coeff = step_hours * rate;
                produced += coeff * h;
            }

            let prev_inv: Expression = if t_idx == 0 {
                Expression::from(initial)
            } else {
                Expression::from(vars.inventory[&(product.clone(), t_idx - 1)])
            };
            let inv = vars.inventory[&(product.clone(), t_idx)];
            let delivered = vars.delivered[&(product.clone(), t_idx)];
            let lost = vars.lost[&(product.clone(), t_idx)];

            let backlog_now = vars.backlog.get(&(product.clone(), t_idx)).copied();
            let backlog_prev = if t_idx == 0 {
                None
            } else {
                vars.backlog.get(&(product.clone(), t_idx - 1)).copied()
            };

            match (backlog_now, backlog_prev) {
                (Some(b_now), Some(b_prev)) => {
                    model = model.with(constraint!(prev_inv.clone() + produced.clone() + b_now - b_prev == inv + demand_t - lost));
                    model = model.with(constraint!(delivered == demand_t - lost - b_now + b_prev));
                }
                (Some(b_now), None) => {
                    model = model.with(constraint!(prev_inv.clone() + produced.clone() + b_now == inv + demand_t - lost));
                    model = model.with(constraint!(delivered == demand_t - lost - b_now));
                }
                _ => {
                    model = model.with(constraint!(prev_inv.clone() + produced.clone() == inv + demand_t - lost));
                    model = model.with(constraint!(delivered == demand_t - lost));
                }
            }

            if let Some(b_now) = backlog_now {
                let window_start = t_idx.saturating_sub(max_delay as usize - 1);
                let mut window_demand = 0.0;
                for k in window_start..=t_idx {
                    window_demand += demand.get(product).and_then(|d| d.get(&horizon.periods[k])).copied().unwrap_or(0.0);
                }
                model = model.with(constraint!(b_now <= window_demand));
            }

            if safety_stock_pct > 0.0 {
                let next_demand = if t_idx + 1 < n_periods {
                    demand.get(product).and_then(|d| d.get(&horizon.periods[t_idx + 1])).copied().unwrap_or(demand_t)
                } else {
                    demand_t
                };
                model = model.with(constraint!(inv >= next_demand * safety_stock_pct));
            }
        }
    }

    // 8: vacation total.
    if vacation_planning && n_periods > 0 {
        let horizon_years = n_periods as f64 / 12.0;
        let required_idle_periods = (horizon.machine_products.len() as f64 * horizon_years).ceil();
        let mut total_idle = Expression::from(0.0);
        for machine in horizon.machine_products.keys() {
            for t_idx in 0..n_periods {
                total_idle += vars.idle[&(machine.clone(), t_idx)];
            }
        }
        model = model.with(constraint!(total_idle == required_idle_periods));
    }

    model
}

/// Rounds a solver's objective-component evaluation through the numerical
/// sanitizer. Kept here since the constraint/objective split is the natural
/// seam for cost-term evaluation helpers.
pub fn sanitize_component(raw: f64) -> f64 {
    value_or_zero(Some(raw))
}
