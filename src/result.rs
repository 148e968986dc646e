//! Reads a solved model back into the row-oriented, caller-facing report,
//! leaning on the numerical hygiene helpers in [`crate::sanitize`].

use good_lp::Solution;

use crate::config::EngineConfig;
use crate::horizon::Horizon;
use crate::objective::ObjectiveTerms;
use crate::sanitize::{is_set, value_or_zero};
use crate::types::{display_product, CostMap, DemandMap, Period, ProductKey, ProductivityMap};
use crate::variables::VariableSet;

pub const STOPPED_LABEL: &str = "Parada/Férias";
pub const INITIAL_LABEL: &str = "Início/Ocioso";

#[derive(Debug, Clone, PartialEq)]
pub struct InventoryRow {
    pub period: Period,
    pub product: String,
    pub inventory: f64,
    pub target: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DemandRow {
    pub period: Period,
    pub product: String,
    pub demand: f64,
    pub met: f64,
    pub lost: f64,
    pub backlog: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductionRow {
    pub period: Period,
    pub machine: String,
    pub product: String,
    pub quantity_kg: f64,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetupRow {
    pub period: Period,
    pub machine: String,
    pub from: String,
    pub to: String,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VacationRow {
    pub period: Period,
    pub machine: String,
    pub operators: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodSummary {
    pub period: Period,
    pub inventory: f64,
    pub utilization: f64,
    pub demand: f64,
    pub lost: f64,
    pub production: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CostBreakdown {
    pub lost_sales: f64,
    pub backlog: f64,
    pub setup: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Kpis {
    pub total_cost: f64,
    pub service_level: f64,
    pub avg_inventory: f64,
    pub cost_breakdown: CostBreakdown,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolveResult {
    pub status: String,
    pub inventory: Vec<InventoryRow>,
    pub production: Vec<ProductionRow>,
    pub setups: Vec<SetupRow>,
    pub vacations: Vec<VacationRow>,
    pub demand: Vec<DemandRow>,
    pub summary: Vec<PeriodSummary>,
    pub kpis: Kpis,
}

impl SolveResult {
    pub fn status_only(status: impl Into<String>) -> SolveResult {
        SolveResult { status: status.into(), ..Default::default() }
    }
}

/// Reads variable values after a successful solve and reconstructs the full
/// interpretable schedule. Only called for `Optimal`/`Feasible` statuses —
/// `Infeasible`/`Not Solved`/`Undefined` short-circuit with no rows.
#[allow(clippy::too_many_arguments)]
pub fn extract_results<S: Solution>(
    status: &str,
    solution: &S,
    horizon: &Horizon,
    demand: &DemandMap,
    productivity: &ProductivityMap,
    costs: &CostMap,
    vars: &VariableSet,
    objective: &ObjectiveTerms,
    config: &EngineConfig,
    hours_per_period: f64,
    step_hours: f64,
    vacation_planning: bool,
    operators_per_machine: u32,
) -> SolveResult {
    let val = |v: good_lp::Variable| value_or_zero(Some(solution.value(v)));

    let mut res_inventory = Vec::new();
    let mut res_production = Vec::new();
    let mut res_demand = Vec::new();
    let mut res_setups = Vec::new();
    let mut res_vacations = Vec::new();
    let mut summaries: Vec<PeriodSummary> = Vec::with_capacity(horizon.periods.len());

    let total_machine_hours = horizon.machine_products.len() as f64 * hours_per_period;

    for (t_idx, period) in horizon.periods.iter().enumerate() {
        let mut summary = PeriodSummary { period: period.clone(), ..Default::default() };

        for product in &horizon.products {
            let inv_val = val(vars.inventory[&(product.clone(), t_idx)]);
            let dem_val = demand.get(product).and_then(|d| d.get(period)).copied().unwrap_or(0.0);
            let met_val = val(vars.delivered[&(product.clone(), t_idx)]);
            let lost_val = val(vars.lost[&(product.clone(), t_idx)]);
            let backlog_val =
                vars.backlog.get(&(product.clone(), t_idx)).map(|&b| val(b)).unwrap_or(0.0);

            let next_demand = if t_idx + 1 < horizon.periods.len() {
                demand
                    .get(product)
                    .and_then(|d| d.get(&horizon.periods[t_idx + 1]))
                    .copied()
                    .unwrap_or(dem_val)
            } else {
                dem_val
            };

            res_inventory.push(InventoryRow {
                period: period.clone(),
                product: display_product(product),
                inventory: inv_val,
                target: next_demand,
            });
            res_demand.push(DemandRow {
                period: period.clone(),
                product: display_product(product),
                demand: dem_val,
                met: met_val,
                lost: lost_val,
                backlog: backlog_val,
            });

            summary.inventory += inv_val;
            summary.demand += dem_val;
            summary.lost += lost_val;
        }

        let mut machine_hours_used = 0.0;

        for (machine, products) in &horizon.machine_products {
            if vacation_planning {
                if let Some(&idle) = vars.idle.get(&(machine.clone(), t_idx)) {
                    if is_set(val(idle)) {
                        res_vacations.push(VacationRow {
                            period: period.clone(),
                            machine: machine.clone(),
                            operators: operators_per_machine,
                        });
                    }
                }
            }

            let from_prod = initial_from_label(vars, machine, horizon, t_idx, &val);
            let setup_time = config.setup_time(machine);

            let mut fired: Vec<&ProductKey> = Vec::new();
            let mut final_prod: Option<&ProductKey> = None;

            for product in products {
                let key = (machine.clone(), product.clone(), t_idx);
                let h_val = val(vars.h[&key]);
                let rate = productivity[product][machine];
                let prod_qty = h_val * step_hours * rate;
                let hours_used = h_val * step_hours;

                if h_val > 0.0 {
                    res_production.push(ProductionRow {
                        period: period.clone(),
                        machine: machine.clone(),
                        product: display_product(product),
                        quantity_kg: prod_qty,
                        hours: hours_used,
                    });
                    summary.production += prod_qty;
                    machine_hours_used += hours_used;
                }

                if is_set(val(vars.delta[&key])) {
                    fired.push(product);
                }
                if is_set(val(vars.s[&key])) {
                    final_prod = Some(product);
                }
            }

            // Setup-chain reconstruction: the chain is the non-final fired
            // products (alphabetic tie-break) followed by the final
            // configured product, if it itself fired.
            if !fired.is_empty() {
                let mut intermediaries: Vec<&ProductKey> =
                    fired.iter().copied().filter(|p| Some(*p) != final_prod).collect();
                intermediaries.sort();

                let mut chain: Vec<&ProductKey> = intermediaries;
                if let Some(final_p) = final_prod {
                    if fired.contains(&final_p) {
                        chain.push(final_p);
                    }
                }

                let mut curr_from = from_prod.clone();
                for to_product in chain {
                    let rate = productivity[to_product][machine];
                    let cost = costs.get(to_product).copied().unwrap_or(0.0);
                    let setup_cost = cost * rate * setup_time;
                    res_setups.push(SetupRow {
                        period: period.clone(),
                        machine: machine.clone(),
                        from: curr_from.clone(),
                        to: display_product(to_product),
                        cost: setup_cost,
                    });
                    machine_hours_used += setup_time;
                    curr_from = display_product(to_product);
                }
            }
        }

        summary.utilization =
            if total_machine_hours > 0.0 { machine_hours_used / total_machine_hours } else { 0.0 };
        summaries.push(summary);
    }

    let total_demand: f64 = res_demand.iter().map(|d| d.demand).sum();
    let total_lost: f64 = res_demand.iter().map(|d| d.lost).sum();
    let service_level = if total_demand > 0.0 { 1.0 - total_lost / total_demand } else { 1.0 };
    let avg_inventory = if !horizon.periods.is_empty() {
        summaries.iter().map(|s| s.inventory).sum::<f64>() / horizon.periods.len() as f64
    } else {
        0.0
    };

    let cost_breakdown = CostBreakdown {
        lost_sales: value_or_zero(Some(solution.eval(&objective.lost_sales))),
        backlog: value_or_zero(Some(solution.eval(&objective.backlog))),
        setup: value_or_zero(Some(solution.eval(&objective.setup))),
    };
    let total_cost = value_or_zero(Some(solution.eval(&objective.combined)));

    SolveResult {
        status: status.to_string(),
        inventory: res_inventory,
        production: res_production,
        setups: res_setups,
        vacations: res_vacations,
        demand: res_demand,
        summary: summaries,
        kpis: Kpis {
            total_cost,
            service_level,
            avg_inventory,
            cost_breakdown,
        },
    }
}

/// `from_prod` for the first transition of a period: the product configured
/// in the previous period, `"Parada/Férias"` if the machine was idle then,
/// or `"Início/Ocioso"` for the very first period.
fn initial_from_label(
    vars: &VariableSet,
    machine: &str,
    horizon: &Horizon,
    t_idx: usize,
    val: &impl Fn(good_lp::Variable) -> f64,
) -> String {
    if t_idx == 0 {
        return INITIAL_LABEL.to_string();
    }
    let prev_idx = t_idx - 1;
    if let Some(&idle) = vars.idle.get(&(machine.to_string(), prev_idx)) {
        if is_set(val(idle)) {
            return STOPPED_LABEL.to_string();
        }
    }
    for product in horizon.machine_products.get(machine).into_iter().flatten() {
        let key = (machine.to_string(), product.clone(), prev_idx);
        if let Some(&s) = vars.s.get(&key) {
            if is_set(val(s)) {
                return display_product(product);
            }
        }
    }
    INITIAL_LABEL.to_string()
}

