//! Builds the planning horizon and machine/product eligibility index.

use std::collections::HashMap;

use crate::types::{DemandMap, MachineId, Period, ProductKey, ProductivityMap};

/// Sorted period set plus the machine<->product eligibility maps.
#[derive(Debug, Clone, Default)]
pub struct Horizon {
    /// Lexicographically sorted periods inside `[start_period, end_period]`.
    pub periods: Vec<Period>,
    /// All products named in the demand map, in its iteration order.
    pub products: Vec<ProductKey>,
    /// `machine -> eligible products`, restricted to `active_machines`.
    pub machine_products: HashMap<MachineId, Vec<ProductKey>>,
    /// `product -> eligible machines`, the dual of `machine_products`.
    pub product_machines: HashMap<ProductKey, Vec<MachineId>>,
}

impl Horizon {
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}

/// Builds the horizon and eligibility maps from demand, productivity and the
/// active machine list. Periods are the sorted keys of any one product's
/// demand mapping, filtered to `[start_period, end_period]` (both ends
/// inclusive; `end_period: None` means open-ended).
///
/// A product with no eligible machine stays in `products` but gets no entry
/// in `product_machines` — its balance is carried entirely by `K` and `I`.
pub fn build_horizon(
    demand: &DemandMap,
    productivity: &ProductivityMap,
    active_machines: &[MachineId],
    start_period: &str,
    end_period: Option<&str>,
) -> Horizon {
    let products: Vec<ProductKey> = demand.keys().cloned().collect();

    let mut periods: Vec<Period> = match products.first() {
        Some(first) => demand[first]
            .keys()
            .filter(|p| p.as_str() >= start_period && end_period.is_none_or(|end| p.as_str() <= end))
            .cloned()
            .collect(),
        None => Vec::new(),
    };
    periods.sort();

    let mut machine_products: HashMap<MachineId, Vec<ProductKey>> =
        active_machines.iter().map(|m| (m.clone(), Vec::new())).collect();
    let mut product_machines: HashMap<ProductKey, Vec<MachineId>> = HashMap::new();

    for product in &products {
        let Some(rates) = productivity.get(product) else { continue };
        for machine in active_machines {
            if rates.contains_key(machine) {
                machine_products.get_mut(machine).unwrap().push(product.clone());
                product_machines.entry(product.clone()).or_default().push(machine.clone());
            }
        }
    }

    Horizon { periods, products, machine_products, product_machines }
}
