//! Orchestrates the pipeline: ingestion (the caller's job) -> index/horizon
//! -> big-M -> variables -> objective -> constraints -> solve -> extraction.
//! One build, one solve, one extract, with no feedback loop.

use good_lp::{default_solver, variables, SolverModel};

use crate::bigm::remaining_demand_suffix;
use crate::config::{EngineConfig, SolveParams};
use crate::constraints::add_constraints;
use crate::error::SolveError;
use crate::horizon::build_horizon;
use crate::objective::build_objective;
use crate::result::{extract_results, SolveResult};
use crate::solver_adapter::{solve_with_time_limit, SolveOutcome};
use crate::types::{CostMap, DemandMap, InitialStockMap, MachineId, ProductivityMap};
use crate::variables::build_variables;

/// The inputs to one `solve` call. `start_period` and `end_period` bound the
/// horizon; `end_period: None` means open-ended.
pub struct SolveInputs<'a> {
    pub demand: &'a DemandMap,
    pub productivity: &'a ProductivityMap,
    pub initial_stock: &'a InitialStockMap,
    pub costs: &'a CostMap,
    pub active_machines: &'a [MachineId],
    pub start_period: &'a str,
    pub end_period: Option<&'a str>,
}

/// Runs one capacitated lot-sizing solve. Returns `Err` only for the eager
/// configuration check (no active machines supplied); an empty horizon is
/// not an error — it is reported as `status: "No valid periods found"` in an
/// otherwise-empty result.
pub fn solve(inputs: SolveInputs, params: &SolveParams, config: &EngineConfig) -> Result<SolveResult, SolveError> {
    if inputs.active_machines.is_empty() {
        return Err(SolveError::NoActiveMachines);
    }

    dev_utils::dlog::debug!("index/horizon: building period set and eligibility maps");
    let horizon = build_horizon(
        inputs.demand,
        inputs.productivity,
        inputs.active_machines,
        inputs.start_period,
        inputs.end_period,
    );
    if horizon.is_empty() {
        dev_utils::dlog::warn!("index/horizon: no valid periods found, skipping model construction");
        return Ok(SolveResult::status_only("No valid periods found"));
    }

    dev_utils::dlog::debug!("big-M: tightening H upper bounds from remaining-demand suffix sums");
    let remaining = remaining_demand_suffix(inputs.demand, &horizon.products, &horizon.periods);

    let mut problem_vars = variables();
    dev_utils::dlog::debug!(
        "variables: declaring H/Y/S/Delta/Idle/I/Q/K{} for {} machine(s), {} product(s), {} period(s)",
        if params.max_delay > 0 { "/B" } else { "" },
        inputs.active_machines.len(),
        horizon.products.len(),
        horizon.periods.len()
    );
    let vars = build_variables(
        &mut problem_vars,
        &horizon,
        inputs.productivity,
        &remaining,
        params.hours_per_period,
        params.step_hours,
        params.integer_var,
        params.max_delay,
    );

    dev_utils::dlog::debug!("objective: assembling lost-sales / backlog / setup cost terms");
    let objective = build_objective(
        &horizon,
        inputs.costs,
        inputs.productivity,
        config,
        &vars,
        config.backlog_penalty_factor,
    );

    let model = problem_vars.minimise(objective.combined.clone()).using(default_solver);

    dev_utils::dlog::debug!("constraints: wiring the seven constraint families");
    let model = add_constraints(
        model,
        &horizon,
        inputs.demand,
        inputs.initial_stock,
        inputs.productivity,
        &vars,
        config,
        params.hours_per_period,
        params.step_hours,
        params.safety_stock_pct,
        params.max_delay,
        params.vacation_planning,
    );

    let outcome = solve_with_time_limit(params, move || model.solve());

    match outcome {
        SolveOutcome::Solved { status, solution } => Ok(extract_results(
            status,
            &solution,
            &horizon,
            inputs.demand,
            inputs.productivity,
            inputs.costs,
            &vars,
            &objective,
            config,
            params.hours_per_period,
            params.step_hours,
            params.vacation_planning,
            params.operators_per_machine,
        )),
        SolveOutcome::Unsolved { status } => {
            dev_utils::dlog::warn!("solve: backend reported {}, no rows extracted", status);
            Ok(SolveResult::status_only(status))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CostMap, DemandMap, InitialStockMap, ProductivityMap};
    use proptest::prelude::*;

    fn key(model: &str, variant: &str) -> (String, String) {
        (model.to_string(), variant.to_string())
    }

    fn demand_of(entries: &[(&str, &str, f64)]) -> DemandMap {
        let mut out = DemandMap::new();
        for (model, period, qty) in entries {
            out.entry(key(model, "L")).or_default().insert(period.to_string(), *qty);
        }
        out
    }

    /// Every demand row balances: delivered + lost + (backlog delta) == demand,
    /// within solver tolerance.
    fn assert_delivery_identity(result: &SolveResult) {
        use std::collections::HashMap;
        let mut prev_backlog: HashMap<String, f64> = HashMap::new();
        for row in &result.demand {
            let prev = prev_backlog.get(&row.product).copied().unwrap_or(0.0);
            let delta = row.backlog - prev;
            assert!(
                (row.met + row.lost + delta - row.demand).abs() < 1e-6,
                "delivery identity failed for {} {}: met={} lost={} delta={} demand={}",
                row.period,
                row.product,
                row.met,
                row.lost,
                delta,
                row.demand
            );
            prev_backlog.insert(row.product.clone(), row.backlog);
        }
    }

    /// `total_cost` reconstructs from the three cost-breakdown terms within
    /// a tight relative tolerance.
    fn assert_cost_identity(result: &SolveResult) {
        let sum = result.kpis.cost_breakdown.lost_sales
            + result.kpis.cost_breakdown.backlog
            + result.kpis.cost_breakdown.setup;
        if result.kpis.total_cost.abs() > 1e-9 {
            assert!(
                ((result.kpis.total_cost - sum) / result.kpis.total_cost).abs() < 1e-4,
                "cost identity failed: total={} breakdown_sum={}",
                result.kpis.total_cost,
                sum
            );
        } else {
            assert!(sum.abs() < 1e-6);
        }
    }

    #[test]
    fn scenario_1_trivial_single_machine_single_product_one_period() {
        let demand = demand_of(&[("A", "2024-01", 100.0)]);
        let mut productivity = ProductivityMap::new();
        productivity.insert(key("A", "L"), [("1".to_string(), 10.0)].into());
        let initial_stock = InitialStockMap::new();
        let mut costs = CostMap::new();
        costs.insert(key("A", "L"), 5.0);
        let active_machines = vec!["1".to_string()];

        let params = SolveParams::default();
        let config = EngineConfig::default();
        let result = solve(
            SolveInputs {
                demand: &demand,
                productivity: &productivity,
                initial_stock: &initial_stock,
                costs: &costs,
                active_machines: &active_machines,
                start_period: "2024-01",
                end_period: None,
            },
            &params,
            &config,
        )
        .unwrap();

        assert!(matches!(result.status.as_str(), "Optimal" | "Feasible"));
        assert!((result.kpis.service_level - 1.0).abs() < 1e-6);
        assert!(!result.production.is_empty());
        assert!(result.setups.iter().any(|s| s.from == crate::result::INITIAL_LABEL));
        assert_delivery_identity(&result);
        assert_cost_identity(&result);
    }

    #[test]
    fn scenario_2_capacity_shortfall_absorbed_by_lost_demand() {
        let demand = demand_of(&[("A", "2024-01", 100_000.0)]);
        let mut productivity = ProductivityMap::new();
        productivity.insert(key("A", "L"), [("1".to_string(), 10.0)].into());
        let initial_stock = InitialStockMap::new();
        let mut costs = CostMap::new();
        costs.insert(key("A", "L"), 5.0);
        let active_machines = vec!["1".to_string()];

        let result = solve(
            SolveInputs {
                demand: &demand,
                productivity: &productivity,
                initial_stock: &initial_stock,
                costs: &costs,
                active_machines: &active_machines,
                start_period: "2024-01",
                end_period: None,
            },
            &SolveParams::default(),
            &EngineConfig::default(),
        )
        .unwrap();

        assert!(matches!(result.status.as_str(), "Optimal" | "Feasible"));
        assert!(result.kpis.service_level < 1.0);
        assert_delivery_identity(&result);
        assert_cost_identity(&result);
    }

    #[test]
    fn scenario_3_two_products_one_machine_pay_two_setups_in_first_period() {
        let mut demand = DemandMap::new();
        demand.insert(key("A", "L"), [("t1".to_string(), 50.0)].into());
        demand.insert(key("B", "L"), [("t1".to_string(), 50.0)].into());
        let mut productivity = ProductivityMap::new();
        productivity.insert(key("A", "L"), [("1".to_string(), 10.0)].into());
        productivity.insert(key("B", "L"), [("1".to_string(), 10.0)].into());
        let initial_stock = InitialStockMap::new();
        let mut costs = CostMap::new();
        costs.insert(key("A", "L"), 5.0);
        costs.insert(key("B", "L"), 5.0);
        let active_machines = vec!["1".to_string()];

        let result = solve(
            SolveInputs {
                demand: &demand,
                productivity: &productivity,
                initial_stock: &initial_stock,
                costs: &costs,
                active_machines: &active_machines,
                start_period: "t1",
                end_period: None,
            },
            &SolveParams::default(),
            &EngineConfig::default(),
        )
        .unwrap();

        assert!(matches!(result.status.as_str(), "Optimal" | "Feasible"));
        let t1_setups: Vec<_> = result.setups.iter().filter(|s| s.period == "t1").collect();
        assert_eq!(t1_setups.len(), 2, "expected a two-hop chain within the single period");
        assert_eq!(t1_setups[0].from, crate::result::INITIAL_LABEL);
        assert_eq!(t1_setups[1].from, t1_setups[0].to);
        assert_delivery_identity(&result);
    }

    #[test]
    fn scenario_4_carry_over_avoids_a_second_setup() {
        let demand = demand_of(&[("A", "t1", 50.0), ("A", "t2", 50.0)]);
        let mut productivity = ProductivityMap::new();
        productivity.insert(key("A", "L"), [("1".to_string(), 10.0)].into());
        let initial_stock = InitialStockMap::new();
        let mut costs = CostMap::new();
        costs.insert(key("A", "L"), 5.0);
        let active_machines = vec!["1".to_string()];

        let result = solve(
            SolveInputs {
                demand: &demand,
                productivity: &productivity,
                initial_stock: &initial_stock,
                costs: &costs,
                active_machines: &active_machines,
                start_period: "t1",
                end_period: None,
            },
            &SolveParams::default(),
            &EngineConfig::default(),
        )
        .unwrap();

        assert!(matches!(result.status.as_str(), "Optimal" | "Feasible"));
        let t2_setups = result.setups.iter().filter(|s| s.period == "t2").count();
        assert_eq!(t2_setups, 0, "carried-over configuration should not pay a second setup");
    }

    #[test]
    fn scenario_5_vacation_planning_hits_the_required_idle_total() {
        let mut by_period = std::collections::HashMap::new();
        for month in 1..=12 {
            by_period.insert(format!("2024-{month:02}"), 50.0);
        }
        let mut demand = DemandMap::new();
        demand.insert(key("A", "L"), by_period);

        let mut productivity = ProductivityMap::new();
        productivity.insert(
            key("A", "L"),
            [("1".to_string(), 10.0), ("2".to_string(), 10.0)].into(),
        );
        let initial_stock = InitialStockMap::new();
        let mut costs = CostMap::new();
        costs.insert(key("A", "L"), 5.0);
        let active_machines = vec!["1".to_string(), "2".to_string()];

        let params = SolveParams { vacation_planning: true, ..SolveParams::default() };
        let result = solve(
            SolveInputs {
                demand: &demand,
                productivity: &productivity,
                initial_stock: &initial_stock,
                costs: &costs,
                active_machines: &active_machines,
                start_period: "2024-01",
                end_period: None,
            },
            &params,
            &EngineConfig::default(),
        )
        .unwrap();

        assert!(matches!(result.status.as_str(), "Optimal" | "Feasible"));
        assert_eq!(result.vacations.len(), 2, "2 machines * ceil(12/12 years) = 2 idle periods");
    }

    #[test]
    fn scenario_6_backlog_window_lets_demand_slip_one_period() {
        let demand = demand_of(&[("A", "t1", 100.0), ("A", "t2", 0.0)]);
        let mut productivity = ProductivityMap::new();
        // rate low enough that one period's capacity (120 steps * 6h * rate)
        // cannot cover the 100kg period-1 demand on its own, forcing the
        // model to choose between lost sales and the backlog window.
        productivity.insert(key("A", "L"), [("1".to_string(), 0.1)].into());
        let initial_stock = InitialStockMap::new();
        let mut costs = CostMap::new();
        costs.insert(key("A", "L"), 5.0);
        let active_machines = vec!["1".to_string()];

        let params = SolveParams { max_delay: 1, ..SolveParams::default() };
        let result = solve(
            SolveInputs {
                demand: &demand,
                productivity: &productivity,
                initial_stock: &initial_stock,
                costs: &costs,
                active_machines: &active_machines,
                start_period: "t1",
                end_period: None,
            },
            &params,
            &EngineConfig::default(),
        )
        .unwrap();

        assert!(matches!(result.status.as_str(), "Optimal" | "Feasible"));
        assert_delivery_identity(&result);
        assert_cost_identity(&result);

        let t1 = result.demand.iter().find(|d| d.period == "t1").unwrap();
        let t2 = result.demand.iter().find(|d| d.period == "t2").unwrap();

        // Period 1 defers part of its demand into backlog rather than writing
        // it off as lost (B[p,1] > 0, Q[p,1] + K[p,1] < 100), and the
        // one-period backlog window forces it fully repaid by period 2
        // (B[p,2] = 0). Repaying it at all requires period 2's genuine spare
        // capacity to still be usable even though period 2's own forward
        // demand is 0, the case the big-M fix above restores.
        assert!(t1.backlog > 0.0, "expected period 1 to carry backlog, got {:?}", t1);
        assert!(t1.met + t1.lost < 100.0 - 1e-6, "expected period 1 to defer some demand, got {:?}", t1);
        assert_eq!(t2.backlog, 0.0, "backlog window of 1 period must be fully repaid by period 2");
        assert!((result.kpis.service_level - 1.0).abs() < 1e-6, "deferred demand should be repaid, not permanently lost");
    }

    #[test]
    fn no_active_machines_is_an_eager_configuration_error() {
        let demand = DemandMap::new();
        let productivity = ProductivityMap::new();
        let initial_stock = InitialStockMap::new();
        let costs = CostMap::new();
        let active_machines: Vec<String> = Vec::new();

        let err = solve(
            SolveInputs {
                demand: &demand,
                productivity: &productivity,
                initial_stock: &initial_stock,
                costs: &costs,
                active_machines: &active_machines,
                start_period: "2024-01",
                end_period: None,
            },
            &SolveParams::default(),
            &EngineConfig::default(),
        )
        .unwrap_err();

        assert!(matches!(err, SolveError::NoActiveMachines));
    }

    #[test]
    fn empty_horizon_reports_status_without_building_a_model() {
        let demand = DemandMap::new();
        let productivity = ProductivityMap::new();
        let initial_stock = InitialStockMap::new();
        let costs = CostMap::new();
        let active_machines = vec!["1".to_string()];

        let result = solve(
            SolveInputs {
                demand: &demand,
                productivity: &productivity,
                initial_stock: &initial_stock,
                costs: &costs,
                active_machines: &active_machines,
                start_period: "2024-01",
                end_period: None,
            },
            &SolveParams::default(),
            &EngineConfig::default(),
        )
        .unwrap();

        assert_eq!(result.status, "No valid periods found");
        assert!(result.production.is_empty());
    }

    proptest! {
        /// The delivery and cost identities hold across randomly generated
        /// single-machine, one-or-two-product, short-horizon scenarios, not
        /// just the hand-picked literal scenarios above.
        #![proptest_config(ProptestConfig::with_cases(24))]
        #[test]
        fn invariants_hold_across_small_random_scenarios(
            demand_a1 in 0.0f64..200.0,
            demand_a2 in 0.0f64..200.0,
            demand_b1 in 0.0f64..200.0,
            rate_a in 1.0f64..20.0,
            rate_b in 1.0f64..20.0,
            cost_a in 1.0f64..10.0,
            cost_b in 1.0f64..10.0,
            initial_a in 0.0f64..50.0,
        ) {
            let demand = demand_of(&[
                ("A", "t1", demand_a1),
                ("A", "t2", demand_a2),
                ("B", "t1", demand_b1),
            ]);
            let mut productivity = ProductivityMap::new();
            productivity.insert(key("A", "L"), [("1".to_string(), rate_a)].into());
            productivity.insert(key("B", "L"), [("1".to_string(), rate_b)].into());
            let mut initial_stock = InitialStockMap::new();
            initial_stock.insert(key("A", "L"), initial_a);
            let mut costs = CostMap::new();
            costs.insert(key("A", "L"), cost_a);
            costs.insert(key("B", "L"), cost_b);
            let active_machines = vec!["1".to_string()];

            let result = solve(
                SolveInputs {
                    demand: &demand,
                    productivity: &productivity,
                    initial_stock: &initial_stock,
                    costs: &costs,
                    active_machines: &active_machines,
                    start_period: "t1",
                    end_period: None,
                },
                &SolveParams::default(),
                &EngineConfig::default(),
            )
            .unwrap();

            prop_assert!(matches!(result.status.as_str(), "Optimal" | "Feasible"));
            assert_delivery_identity(&result);
            assert_cost_identity(&result);
            prop_assert!(result.kpis.service_level >= 0.0 && result.kpis.service_level <= 1.0);
        }
    }
}
