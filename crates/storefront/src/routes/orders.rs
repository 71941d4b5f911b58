//! Order history route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use arcverse_core::Price;
use arcverse_core::cart::OrderLine;

use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::PageContext;
use crate::state::AppState;

/// Ordered item display data.
#[derive(Clone, Debug)]
pub struct OrderLineView {
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

impl From<&OrderLine> for OrderLineView {
    fn from(line: &OrderLine) -> Self {
        Self {
            name: line.name.clone(),
            description: line.description.clone(),
            image_url: line.image().to_string(),
            quantity: line.quantity,
            unit_price: line.price.display(),
            line_total: line.line_total().display(),
        }
    }
}

/// Order history template. Anonymous visitors get a sign-in prompt.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersTemplate {
    pub page: PageContext,
    pub orders: Vec<OrderLineView>,
    pub total_spent: String,
}

fn total_spent(lines: &[OrderLine]) -> Price {
    lines.iter().map(OrderLine::line_total).sum()
}

/// Display order history.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> impl IntoResponse {
    let mut page = PageContext::load(&session).await;

    let lines = match &user {
        Some(user) => match state.api().get_orders(user.id).await {
            Ok(lines) => lines,
            Err(e) => {
                tracing::error!("Failed to fetch orders: {e}");
                page.fail_soft("Failed to load orders");
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    OrdersTemplate {
        page,
        total_spent: total_spent(&lines).display(),
        orders: lines.iter().map(OrderLineView::from).collect(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_order_views_and_total() {
        let lines: Vec<OrderLine> = serde_json::from_value(json!([
            {"id": 1, "productId": 3, "quantity": 2, "name": "Arc Lamp", "price": "45", "description": "Warm light"},
            {"id": 2, "productId": 4, "quantity": 1, "name": "Arc Buds", "price": 99.99, "description": ""}
        ]))
        .unwrap();

        assert_eq!(total_spent(&lines).display(), "$189.99");
        let view = OrderLineView::from(&lines[0]);
        assert_eq!(view.line_total, "$90.00");
        assert_eq!(view.image_url, arcverse_core::cart::PLACEHOLDER_IMAGE);
    }
}
