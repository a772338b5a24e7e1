//! Client-side price arithmetic. Everything else is computed by the backend.

/// Total of an initial-budget line.
///
/// A `discount` above 1 is a fixed amount; between 0 and 1 it is a fraction
/// of the gross total. Missing quantity or price gives 0.
pub fn budget_total(quantity: Option<f64>, unit_price: Option<f64>, discount: Option<f64>) -> f64 {
    let (Some(quantity), Some(unit_price)) = (quantity, unit_price) else {
        return 0.0;
    };
    let mut total = quantity * unit_price;
    match discount {
        Some(d) if d > 1.0 => total -= d,
        Some(d) if d > 0.0 => total *= 1.0 - d,
        _ => {}
    }
    total.max(0.0)
}

/// Total of a real expense: percentage discount first, then the fixed amount.
pub fn expense_total(
    quantity: Option<f64>,
    unit_price: Option<f64>,
    discount_percentage: Option<f64>,
    discount_amount: Option<f64>,
) -> f64 {
    let (Some(quantity), Some(unit_price)) = (quantity, unit_price) else {
        return 0.0;
    };
    let mut total = quantity * unit_price;
    if let Some(pct) = discount_percentage.filter(|p| *p > 0.0) {
        total *= 1.0 - pct / 100.0;
    }
    if let Some(amount) = discount_amount.filter(|a| *a > 0.0) {
        total -= amount;
    }
    total.max(0.0)
}

pub fn supplier_final_price(price: f64, discount_percentage: f64) -> f64 {
    price * (1.0 - discount_percentage / 100.0)
}
