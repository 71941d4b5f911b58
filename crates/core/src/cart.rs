//! Cart lines, totals and the order summary shown after checkout.
//!
//! The backend stores cart rows per user; ordering a cart only flips those
//! rows to "ordered". Totals are computed here, never by the backend.

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::checkout::BillingDetails;
use crate::types::{CartLineId, Price, ProductId};

/// Fixed sales tax rate (10%).
pub const TAX_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Image shown when a line or product has none.
pub const PLACEHOLDER_IMAGE: &str = "/static/placeholder.svg";

/// Errors raised when a cart cannot be checked out.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    #[error("Your cart is empty")]
    Empty,
    #[error("Invalid cart items")]
    InvalidItems,
}

/// Image reference nested in a cart row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineImage {
    pub url: String,
}

/// One row of `GET /cart/{userId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Cart row id (what `mark-ordered` and quantity updates address).
    pub id: CartLineId,
    #[serde(rename = "productId")]
    pub product_id: ProductId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: Price,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(rename = "ProductImages", default)]
    pub product_images: Vec<CartLineImage>,
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
}

const fn default_quantity() -> u32 {
    1
}

impl CartLine {
    /// Quantity used for arithmetic; a zero quantity counts as one.
    #[must_use]
    pub const fn effective_quantity(&self) -> u32 {
        if self.quantity == 0 { 1 } else { self.quantity }
    }

    /// `price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.effective_quantity())
    }

    /// Image URL for display.
    #[must_use]
    pub fn image(&self) -> &str {
        self.image_url
            .as_deref()
            .or_else(|| self.product_images.first().map(|img| img.url.as_str()))
            .unwrap_or(PLACEHOLDER_IMAGE)
    }

    /// Category label for display.
    #[must_use]
    pub fn category_label(&self) -> &str {
        self.category_name.as_deref().unwrap_or("Product")
    }
}

/// One row of `GET /cart/orders/{userId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: CartLineId,
    #[serde(rename = "productId")]
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: Price,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
}

impl OrderLine {
    /// `price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity.max(1))
    }

    /// Image URL for display.
    #[must_use]
    pub fn image(&self) -> &str {
        self.image_url.as_deref().unwrap_or(PLACEHOLDER_IMAGE)
    }
}

/// Subtotal, tax and total of a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartTotals {
    pub subtotal: Price,
    pub tax: Price,
    pub total: Price,
    /// Sum of quantities (badge count).
    pub item_count: u32,
}

impl CartTotals {
    /// Sum every line and apply [`TAX_RATE`]. Shipping is always free.
    #[must_use]
    pub fn compute(lines: &[CartLine]) -> Self {
        let subtotal: Price = lines.iter().map(CartLine::line_total).sum();
        let tax = subtotal * TAX_RATE;
        let item_count = lines
            .iter()
            .map(CartLine::effective_quantity)
            .fold(0_u32, u32::saturating_add);

        Self {
            subtotal,
            tax,
            total: subtotal + tax,
            item_count,
        }
    }
}

/// Cart row ids to send to `mark-ordered`.
///
/// Rows with a zero id are skipped, matching how the backend treats them as
/// absent.
///
/// # Errors
///
/// [`CartError::Empty`] for an empty cart and [`CartError::InvalidItems`]
/// when no row carries a usable id.
pub fn orderable_line_ids(lines: &[CartLine]) -> Result<Vec<CartLineId>, CartError> {
    if lines.is_empty() {
        return Err(CartError::Empty);
    }

    let ids: Vec<CartLineId> = lines
        .iter()
        .map(|line| line.id)
        .filter(|id| id.as_i64() != 0)
        .collect();

    if ids.is_empty() {
        return Err(CartError::InvalidItems);
    }
    Ok(ids)
}

/// Generate the six digit confirmation number shown on the success page.
///
/// It is presentation-only; the backend has no order entity.
pub fn generate_order_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    rng.random_range(100_000_u32..1_000_000).to_string()
}

/// Item line of an [`OrderSummary`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummaryItem {
    pub id: CartLineId,
    pub name: String,
    pub quantity: u32,
    pub price: Price,
}

/// What the success page shows after checkout. Stored in the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub order_id: String,
    pub date: DateTime<Utc>,
    pub total: Price,
    pub items: Vec<OrderSummaryItem>,
    #[serde(default)]
    pub billing: Option<BillingDetails>,
}

impl OrderSummary {
    /// Snapshot a cart at checkout time.
    #[must_use]
    pub fn from_cart(
        order_id: String,
        lines: &[CartLine],
        billing: Option<BillingDetails>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            order_id,
            date: now,
            total: CartTotals::compute(lines).total,
            items: lines
                .iter()
                .map(|line| OrderSummaryItem {
                    id: line.id,
                    name: line.name.clone(),
                    quantity: line.effective_quantity(),
                    price: line.price,
                })
                .collect(),
            billing,
        }
    }

    /// Sum of item quantities.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Order date formatted for display.
    #[must_use]
    pub fn display_date(&self) -> String {
        self.date.format("%B %-d, %Y").to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::json;

    fn lines() -> Vec<CartLine> {
        serde_json::from_value(json!([
            {"id": 11, "productId": 1, "name": "Arc Buds", "price": "$99.99", "quantity": 2,
             "ProductImages": [{"url": "/u/buds.jpg"}], "category_name": "Audio"},
            {"id": 12, "productId": 2, "name": "Arc Case", "price": 25, "quantity": 1},
            {"id": 13, "productId": 3, "name": "Mystery", "price": "call us"}
        ]))
        .unwrap()
    }

    #[test]
    fn test_tax_rate_is_ten_percent() {
        assert_eq!(TAX_RATE, Decimal::new(1, 1));
    }

    #[test]
    fn test_totals() {
        let totals = CartTotals::compute(&lines());
        assert_eq!(totals.subtotal, Price::from_cents(22_498));
        assert_eq!(totals.tax.to_string(), "$22.50");
        assert_eq!(totals.total.to_string(), "$247.48");
        assert_eq!(totals.item_count, 4);
    }

    #[test]
    fn test_totals_with_enormous_price_do_not_panic() {
        let lines: Vec<CartLine> = serde_json::from_value(json!([
            {"id": 1, "productId": 1, "price": 1e28, "quantity": 10}
        ]))
        .unwrap();
        let totals = CartTotals::compute(&lines);
        assert_eq!(totals.subtotal, Price::new(Decimal::MAX));
        assert_eq!(totals.total, Price::new(Decimal::MAX));
        assert_eq!(totals.item_count, 10);
    }

    #[test]
    fn test_totals_empty_cart() {
        let totals = CartTotals::compute(&[]);
        assert_eq!(totals, CartTotals::default());
        assert_eq!(totals.total.to_string(), "$0.00");
    }

    #[test]
    fn test_zero_quantity_counts_as_one() {
        let line: CartLine = serde_json::from_value(json!({
            "id": 1, "productId": 1, "price": "10", "quantity": 0
        }))
        .unwrap();
        assert_eq!(line.line_total(), Price::from_cents(1000));
    }

    #[test]
    fn test_line_image_fallbacks() {
        let all = lines();
        assert_eq!(all[0].image(), "/u/buds.jpg");
        assert_eq!(all[1].image(), PLACEHOLDER_IMAGE);
        assert_eq!(all[0].category_label(), "Audio");
        assert_eq!(all[1].category_label(), "Product");
    }

    #[test]
    fn test_orderable_line_ids() {
        let ids = orderable_line_ids(&lines()).unwrap();
        assert_eq!(ids.len(), 3);

        assert_eq!(orderable_line_ids(&[]), Err(CartError::Empty));

        let zero: Vec<CartLine> =
            serde_json::from_value(json!([{"id": 0, "productId": 4}])).unwrap();
        assert_eq!(orderable_line_ids(&zero), Err(CartError::InvalidItems));
    }

    #[test]
    fn test_order_id_is_six_digits() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let id = generate_order_id(&mut rng);
            assert_eq!(id.len(), 6);
            assert!(!id.starts_with('0'));
            assert!(id.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_order_summary_snapshot() {
        let now = Utc.with_ymd_and_hms(2026, 3, 4, 10, 0, 0).unwrap();
        let summary = OrderSummary::from_cart("123456".to_string(), &lines(), None, now);

        assert_eq!(summary.total.to_string(), "$247.48");
        assert_eq!(summary.items.len(), 3);
        assert_eq!(summary.item_count(), 4);
        assert_eq!(summary.display_date(), "March 4, 2026");

        let json = serde_json::to_string(&summary).unwrap();
        let restored: OrderSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.order_id, "123456");
        assert_eq!(restored.total, Price::new(summary.total.rounded()));
    }
}
