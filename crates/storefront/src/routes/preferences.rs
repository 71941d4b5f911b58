//! Category preference picker and the curated product grid.
//!
//! The picker posts one `categories` field per ticked checkbox, which the
//! `Form` extractor cannot collect into a list, so the raw body is parsed.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, RawForm, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use arcverse_core::CategoryId;
use arcverse_core::catalog::Category;
use arcverse_core::preferences::{category_query, parse_category_ids};

use super::products::{ProductCard, product_cards};
use crate::filters;
use crate::models::{Flash, PageContext, set_flash};
use crate::state::AppState;

/// Curated grid query parameters (`?categories=1,2`).
#[derive(Debug, Default, Deserialize)]
pub struct CategoriesQuery {
    pub categories: Option<String>,
}

impl CategoriesQuery {
    fn ids(&self) -> Vec<CategoryId> {
        self.categories
            .as_deref()
            .map(parse_category_ids)
            .unwrap_or_default()
    }
}

/// A category checkbox.
#[derive(Clone, Debug)]
pub struct CategoryOption {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub checked: bool,
}

/// Preference picker template.
#[derive(Template, WebTemplate)]
#[template(path = "products/preferences.html")]
pub struct PreferencesTemplate {
    pub page: PageContext,
    pub options: Vec<CategoryOption>,
}

/// Curated product grid template.
#[derive(Template, WebTemplate)]
#[template(path = "products/curated.html")]
pub struct CuratedTemplate {
    pub page: PageContext,
    pub selected: Vec<String>,
    pub query: String,
    pub products: Vec<ProductCard>,
}

/// Ids of every `categories` field in a urlencoded body.
fn selected_ids(body: &[u8]) -> Vec<CategoryId> {
    let joined = url::form_urlencoded::parse(body)
        .filter(|(key, _)| key == "categories")
        .map(|(_, value)| value.into_owned())
        .collect::<Vec<_>>()
        .join(",");
    parse_category_ids(&joined)
}

fn category_options(categories: Vec<Category>, checked: &[CategoryId]) -> Vec<CategoryOption> {
    categories
        .into_iter()
        .map(|c| CategoryOption {
            checked: checked.contains(&c.id),
            id: c.id,
            name: c.name,
            description: c.description,
        })
        .collect()
}

/// Display the preference picker. Categories already in the query are
/// pre-ticked.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CategoriesQuery>,
) -> impl IntoResponse {
    let mut page = PageContext::load(&session).await;

    let categories = match state.api().list_categories().await {
        Ok(categories) => categories,
        Err(e) => {
            tracing::error!("Failed to fetch categories: {e}");
            page.fail_soft("Failed to load categories");
            Vec::new()
        }
    };

    PreferencesTemplate {
        page,
        options: category_options(categories, &query.ids()),
    }
}

/// Apply the picked categories.
///
/// Nothing picked shows the full catalog; otherwise redirect to the curated
/// grid with the ids in the query string.
#[instrument(skip(session, body))]
pub async fn apply(session: Session, RawForm(body): RawForm) -> Redirect {
    let ids = selected_ids(&body);
    if ids.is_empty() {
        set_flash(&session, Flash::info("No preferences selected, showing all products")).await;
        return Redirect::to("/products");
    }
    Redirect::to(&format!(
        "/products/curated?categories={}",
        urlencoding::encode(&category_query(&ids))
    ))
}

/// Display products in the picked categories.
#[instrument(skip(state, session))]
pub async fn curated(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CategoriesQuery>,
) -> Response {
    let ids = query.ids();
    if ids.is_empty() {
        return Redirect::to("/products/preferences").into_response();
    }

    let mut page = PageContext::load(&session).await;

    let categories = state.api().list_categories().await.unwrap_or_else(|e| {
        tracing::warn!("Failed to fetch categories: {e}");
        Vec::new()
    });
    let products = match state.api().filter_by_categories(&ids).await {
        Ok(products) => products,
        Err(e) => {
            tracing::error!("Failed to filter products by category: {e}");
            page.fail_soft("Failed to load your curated products");
            Vec::new()
        }
    };

    let selected = categories
        .iter()
        .filter(|c| ids.contains(&c.id))
        .map(|c| c.name.clone())
        .collect();

    CuratedTemplate {
        page,
        selected,
        query: category_query(&ids),
        products: product_cards(&products, &categories),
    }
    .into_response()
}
