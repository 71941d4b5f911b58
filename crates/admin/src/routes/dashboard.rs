//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use arcverse_core::account::User;
use arcverse_core::catalog::{Category, Product};

use crate::api::ApiError;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::AdminPage;
use crate::state::AppState;

use super::after_failure;

/// Products at or below this stock are listed on the dashboard.
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// Dashboard counts. `None` when the backing list could not be loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardMetrics {
    pub total_users: Option<usize>,
    pub admins: Option<usize>,
    pub products: Option<usize>,
    pub categories: Option<usize>,
}

impl DashboardMetrics {
    #[must_use]
    pub fn compute(
        users: Option<&[User]>,
        products: Option<&[Product]>,
        categories: Option<&[Category]>,
    ) -> Self {
        Self {
            total_users: users.map(<[User]>::len),
            admins: users.map(|u| u.iter().filter(|u| u.is_admin()).count()),
            products: products.map(<[Product]>::len),
            categories: categories.map(<[Category]>::len),
        }
    }
}

/// A stat card.
#[derive(Debug, Clone)]
pub struct MetricCard {
    pub label: &'static str,
    pub value: String,
    pub href: &'static str,
}

fn cards(metrics: &DashboardMetrics) -> Vec<MetricCard> {
    let show = |count: Option<usize>| count.map_or_else(|| "—".to_string(), |c| c.to_string());
    vec![
        MetricCard {
            label: "Total Users",
            value: show(metrics.total_users),
            href: "/users",
        },
        MetricCard {
            label: "Admins",
            value: show(metrics.admins),
            href: "/users",
        },
        MetricCard {
            label: "Products",
            value: show(metrics.products),
            href: "/products",
        },
        MetricCard {
            label: "Categories",
            value: show(metrics.categories),
            href: "/categories",
        },
    ]
}

/// Low stock row.
#[derive(Debug, Clone)]
pub struct LowStockView {
    pub name: String,
    pub stock: i64,
}

fn low_stock(products: &[Product]) -> Vec<LowStockView> {
    let mut rows: Vec<LowStockView> = products
        .iter()
        .filter(|p| p.stock <= LOW_STOCK_THRESHOLD)
        .map(|p| LowStockView {
            name: p.name.clone(),
            stock: p.stock,
        })
        .collect();
    rows.sort_by_key(|r| r.stock);
    rows
}

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub page: AdminPage,
    pub cards: Vec<MetricCard>,
    pub low_stock: Vec<LowStockView>,
}

/// Keep the list on success; log and drop it otherwise. A rejected token is
/// passed up so the admin is sent back to login.
fn loaded<T>(what: &str, result: Result<Vec<T>, ApiError>) -> Result<Option<Vec<T>>, ApiError> {
    match result {
        Ok(items) => Ok(Some(items)),
        Err(e @ ApiError::Unauthorized(_)) => Err(e),
        Err(e) => {
            tracing::error!("Failed to fetch {what}: {e}");
            Ok(None)
        }
    }
}

/// Dashboard page handler.
#[instrument(skip(state, session, admin))]
pub async fn dashboard(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
) -> Response {
    let api = state.api();
    let (users, products, categories) = tokio::join!(
        api.list_users(&admin.token),
        api.list_products(&admin.token),
        api.list_categories(&admin.token),
    );
    let lists = loaded("users", users).and_then(|users| {
        Ok((
            users,
            loaded("products", products)?,
            loaded("categories", categories)?,
        ))
    });
    let (users, products, categories) = match lists {
        Ok(lists) => lists,
        Err(e) => {
            return after_failure(&session, &e, "Failed to load dashboard", "/")
                .await
                .into_response();
        }
    };

    let mut page = AdminPage::load(
        &session,
        &admin,
        "/",
        state.config().storefront_url.as_deref(),
    )
    .await;
    if users.is_none() || products.is_none() || categories.is_none() {
        page.fail_soft("Some dashboard data could not be loaded");
    }

    let metrics = DashboardMetrics::compute(
        users.as_deref(),
        products.as_deref(),
        categories.as_deref(),
    );

    DashboardTemplate {
        page,
        cards: cards(&metrics),
        low_stock: products.as_deref().map(low_stock).unwrap_or_default(),
    }
    .into_response()
}
