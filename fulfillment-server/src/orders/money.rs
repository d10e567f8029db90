//! Money calculation utilities using rust_decimal for precision
//!
//! Line amounts are stored as `f64` but every sum or multiplication goes
//! through `Decimal`, then back to `f64` rounded to cents for
//! storage/serialization.

use rust_decimal::prelude::*;
use shared::models::OrderItem;
use shared::notify::ItemNotice;

/// Rounding for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Line total for a quantity of units at a unit price.
pub fn line_total(price: f64, quantity: i32) -> Decimal {
    (to_decimal(price) * Decimal::from(quantity))
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Sum of line totals across items, as a storable f64.
pub fn sum_line_totals<'a, I>(items: I) -> f64
where
    I: IntoIterator<Item = &'a OrderItem>,
{
    let total: Decimal = items
        .into_iter()
        .map(|item| line_total(item.price, item.quantity))
        .sum();
    to_f64(total)
}

/// Project an order line into its notification view.
pub fn item_notice(item: &OrderItem) -> ItemNotice {
    ItemNotice {
        order_item_id: item.id,
        name: item.name.clone(),
        quantity: item.quantity,
        amount: to_f64(line_total(item.price, item.quantity)),
    }
}
