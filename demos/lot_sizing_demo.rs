#![allow(unused)]

use std::collections::HashMap;

use balance_engine::{
    config::{EngineConfig, SolveParams},
    model::SolveInputs,
    solve,
    types::{CostMap, DemandMap, InitialStockMap, ProductivityMap},
};
use dev_utils::{
    app_dt,
    dlog::{self, Level, set_max_level},
};

fn key(model: &str, variant: &str) -> (String, String) {
    (model.to_string(), variant.to_string())
}

fn main() {
    app_dt!(file!(), "package" => ["license", "keywords", "description", "authors"]);
    set_max_level(Level::Trace);

    dlog::info!(
        "
╭───────────────────────────────────────────╮
│                                           │
│       🏭 BALANCE ENGINE OPTIMIZER 🏭       │
│                                           │
╰───────────────────────────────────────────╯"
    );

    let product_a = key("A", "L");
    let product_b = key("B", "L");

    let mut demand = DemandMap::new();
    demand.insert(
        product_a.clone(),
        [("2024-01", 500.0), ("2024-02", 600.0), ("2024-03", 550.0)]
            .into_iter()
            .map(|(p, v)| (p.to_string(), v))
            .collect(),
    );
    demand.insert(
        product_b.clone(),
        [("2024-01", 300.0), ("2024-02", 250.0), ("2024-03", 400.0)]
            .into_iter()
            .map(|(p, v)| (p.to_string(), v))
            .collect(),
    );

    let mut productivity = ProductivityMap::new();
    productivity.insert(product_a.clone(), [("1".to_string(), 12.0)].into());
    productivity.insert(product_b.clone(), [("1".to_string(), 9.0)].into());

    let mut initial_stock = InitialStockMap::new();
    initial_stock.insert(product_a.clone(), 50.0);
    initial_stock.insert(product_b.clone(), 0.0);

    let mut costs = CostMap::new();
    costs.insert(product_a.clone(), 6.0);
    costs.insert(product_b.clone(), 8.0);

    let active_machines = vec!["1".to_string()];

    dlog::debug!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    dlog::debug!("📊 HORIZON CONFIGURATION");
    dlog::debug!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    dlog::info!("Periods: 2024-01 .. 2024-03, machines: {:?}", active_machines);

    let params = SolveParams { safety_stock_pct: 0.10, ..SolveParams::default() };
    let config = EngineConfig::default();

    let inputs = SolveInputs {
        demand: &demand,
        productivity: &productivity,
        initial_stock: &initial_stock,
        costs: &costs,
        active_machines: &active_machines,
        start_period: "2024-01",
        end_period: None,
    };

    dlog::debug!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    dlog::debug!("🧮 OPTIMIZATION PROCESS");
    dlog::debug!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    match solve(inputs, &params, &config) {
        Ok(result) => {
            dlog::debug!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
            dlog::debug!("✅ OPTIMIZATION RESULTS — status: {}", result.status);
            dlog::debug!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

            for row in &result.production {
                dlog::info!(
                    "{} {} {} -> {:.1} kg ({:.1} h)",
                    row.period, row.machine, row.product, row.quantity_kg, row.hours
                );
            }
            for row in &result.setups {
                dlog::info!("{} {} setup {} -> {} (${:.2})", row.period, row.machine, row.from, row.to, row.cost);
            }

            dlog::debug!("💰 KPIs");
            dlog::info!("Total cost: ${:.2}", result.kpis.total_cost);
            dlog::info!("Service level: {:.1}%", result.kpis.service_level * 100.0);
            dlog::info!("Avg inventory: {:.1} kg", result.kpis.avg_inventory);
            dlog::trace!(
                "Breakdown: lost={:.2} backlog={:.2} setup={:.2}",
                result.kpis.cost_breakdown.lost_sales,
                result.kpis.cost_breakdown.backlog,
                result.kpis.cost_breakdown.setup
            );
        }
        Err(e) => {
            dlog::error!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
            dlog::error!("❌ OPTIMIZATION FAILED: {}", e);
            dlog::error!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        }
    }
}
