//! Big-M tightening for the step-count variables.
//!
//! An LP-relaxation tightening pass: it computes the suffix sum of remaining
//! demand for each `(product, period index)` and uses it to cap the
//! step-count variable `H[m,p,t]` tighter than the period's raw
//! `hours_per_period / step_hours` ceiling.
//!
//! This bound is only a valid upper bound on `H` when every unit `H` can
//! ever need to cover is still ahead of it in the demand suffix. That
//! assumption breaks once backlog is enabled (`max_delay > 0`): a period's
//! own forward remaining-demand can legitimately drop to 0 while an earlier
//! period's deferred demand is still outstanding in `B`, and that period's
//! real capacity is exactly what the model needs to repay it. Tightening `H`
//! against forward demand alone would then fix `H` at 0 in a period that has
//! genuine physical capacity to produce, pruning the true optimum and
//! forcing the backlog to be written off as lost demand instead. So when
//! backlog is enabled, the demand-based tightening is skipped entirely and
//! `H` is bounded by the period capacity alone.

use std::collections::HashMap;

use crate::types::{DemandMap, Period, ProductKey};

/// `remaining[p][period_index] = sum of demand[p, periods[j]] for j >= period_index`.
pub fn remaining_demand_suffix(
    demand: &DemandMap,
    products: &[ProductKey],
    periods: &[Period],
) -> HashMap<ProductKey, Vec<f64>> {
    let mut out = HashMap::new();
    for product in products {
        let empty = HashMap::new();
        let by_period = demand.get(product).unwrap_or(&empty);
        let mut suffix = vec![0.0; periods.len()];
        let mut running = 0.0;
        for idx in (0..periods.len()).rev() {
            running += by_period.get(&periods[idx]).copied().unwrap_or(0.0);
            suffix[idx] = running;
        }
        out.insert(product.clone(), suffix);
    }
    out
}

/// Upper bound for `H[m,p,period_index]` given the production rate `rate`
/// (kg/hour) of `p` on `m`, the remaining-demand suffix sum for `p` starting
/// at `period_index`, and whether `H` is declared integer.
///
/// `min(hours_per_period / step_hours, remaining / (rate * step_hours))`,
/// with the second term ceiling-rounded when `integer_var` is true. When
/// `max_delay > 0` the demand-based term is skipped and the bound is the
/// period capacity alone, since forward remaining-demand no longer accounts
/// for capacity needed to repay an already-deferred backlog (see module docs).
pub fn h_upper_bound(
    hours_per_period: f64,
    step_hours: f64,
    rate: f64,
    remaining: f64,
    integer_var: bool,
    max_delay: u32,
) -> f64 {
    let period_cap = (hours_per_period / step_hours).floor();
    if rate <= 0.0 {
        return 0.0;
    }
    if max_delay > 0 {
        return period_cap.max(0.0);
    }
    let demand_ratio = remaining / (rate * step_hours);
    let demand_cap = if integer_var { demand_ratio.ceil() } else { demand_ratio };
    period_cap.min(demand_cap).max(0.0)
}
