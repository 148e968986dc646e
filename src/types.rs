//! Core entity types shared by every pipeline stage.

use std::collections::HashMap;

/// Stable SKU identity: an ordered `(model, variant)` pair of upper-case strings.
///
/// Equality and ordering are derived (lexicographic on the pair), which is what
/// the result extractor uses as the deterministic tie-break for setup-chain
/// intermediaries.
pub type ProductKey = (String, String);

/// A monthly bucket. Sortable lexicographically in chronological order
/// (the caller is responsible for using a sortable string form, e.g. `"2024-01"`).
pub type Period = String;

/// A production resource, usually a small numeric string (`"11"`, `"14"`, ...).
pub type MachineId = String;

/// `product -> period -> kg`. Missing entries read as zero demand.
pub type DemandMap = HashMap<ProductKey, HashMap<Period, f64>>;

/// `product -> machine -> kg/hour`. Sparse: a missing `(product, machine)` pair
/// means the machine cannot produce that product at all.
pub type ProductivityMap = HashMap<ProductKey, HashMap<MachineId, f64>>;

/// `product -> kg` on hand at the start of the first period.
pub type InitialStockMap = HashMap<ProductKey, f64>;

/// `product -> currency/kg`, the unit penalty for lost sales (and the basis
/// for backlog and setup cost scaling).
pub type CostMap = HashMap<ProductKey, f64>;

/// Joins a `ProductKey` into the display form used throughout result rows,
/// e.g. `("A", "L")` -> `"A L"`.
pub fn display_product(product: &ProductKey) -> String {
    format!("{} {}", product.0, product.1)
}
