//! Category management route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use arcverse_core::CategoryId;
use arcverse_core::catalog::Category;
use arcverse_core::payloads::CategoryPayload;

use super::after_failure;
use crate::api::ApiError;
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::{AdminPage, CurrentAdmin, Flash, set_flash};
use crate::state::AppState;

/// Category form data.
#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl CategoryForm {
    fn validate(&self) -> Result<CategoryPayload, &'static str> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Category name is required");
        }
        Ok(CategoryPayload {
            name: name.to_string(),
            description: self.description.trim().to_string(),
        })
    }
}

/// Category list template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoriesTemplate {
    pub page: AdminPage,
    pub categories: Vec<Category>,
}

/// Edit category template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/edit.html")]
pub struct EditCategoryTemplate {
    pub page: AdminPage,
    pub category: Category,
}

async fn page(state: &AppState, session: &Session, admin: &CurrentAdmin) -> AdminPage {
    AdminPage::load(
        session,
        admin,
        "/categories",
        state.config().storefront_url.as_deref(),
    )
    .await
}

/// List categories with the create form.
#[instrument(skip(state, session, admin))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
) -> Response {
    let result = state.api().list_categories(&admin.token).await;
    if let Err(e @ ApiError::Unauthorized(_)) = &result {
        return after_failure(&session, e, "Failed to fetch categories", "/")
            .await
            .into_response();
    }

    let mut page = page(&state, &session, &admin).await;
    let categories = result.unwrap_or_else(|e| {
        tracing::error!("Failed to fetch categories: {e}");
        page.fail_soft("Failed to fetch categories");
        Vec::new()
    });

    CategoriesTemplate { page, categories }.into_response()
}

/// Create a category.
#[instrument(skip(state, session, admin, form))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Form(form): Form<CategoryForm>,
) -> Redirect {
    let payload = match form.validate() {
        Ok(payload) => payload,
        Err(message) => {
            set_flash(&session, Flash::error(message)).await;
            return Redirect::to("/categories");
        }
    };

    match state.api().create_category(&admin.token, &payload).await {
        Ok(()) => {
            tracing::info!(name = %payload.name, "Category created");
            set_flash(&session, Flash::success("Category created successfully")).await;
            Redirect::to("/categories")
        }
        Err(e) => {
            tracing::error!("Failed to create category: {e}");
            after_failure(&session, &e, "Failed to create category", "/categories").await
        }
    }
}

/// Edit form for one category.
#[instrument(skip(state, session, admin))]
pub async fn edit(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<CategoryId>,
) -> Response {
    let categories = match state.api().list_categories(&admin.token).await {
        Ok(categories) => categories,
        Err(e) => {
            tracing::error!("Failed to fetch categories: {e}");
            return after_failure(&session, &e, "Failed to fetch categories", "/categories")
                .await
                .into_response();
        }
    };

    let Some(category) = categories.into_iter().find(|c| c.id == id) else {
        return AppError::NotFound(format!("category {id}")).into_response();
    };

    EditCategoryTemplate {
        page: page(&state, &session, &admin).await,
        category,
    }
    .into_response()
}

/// Update a category.
#[instrument(skip(state, session, admin, form))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<CategoryId>,
    Form(form): Form<CategoryForm>,
) -> Redirect {
    let edit_path = format!("/categories/{id}/edit");
    let payload = match form.validate() {
        Ok(payload) => payload,
        Err(message) => {
            set_flash(&session, Flash::error(message)).await;
            return Redirect::to(&edit_path);
        }
    };

    match state.api().update_category(&admin.token, id, &payload).await {
        Ok(()) => {
            tracing::info!(category_id = %id, "Category updated");
            set_flash(&session, Flash::success("Category updated successfully")).await;
            Redirect::to("/categories")
        }
        Err(e) => {
            tracing::error!("Failed to update category: {e}");
            after_failure(&session, &e, "Failed to update category", &edit_path).await
        }
    }
}

/// Delete a category.
#[instrument(skip(state, session, admin))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<CategoryId>,
) -> Redirect {
    match state.api().delete_category(&admin.token, id).await {
        Ok(()) => {
            tracing::info!(category_id = %id, "Category deleted");
            set_flash(&session, Flash::success("Category deleted successfully")).await;
        }
        Err(e) => {
            tracing::error!("Failed to delete category: {e}");
            return after_failure(&session, &e, "Failed to delete category", "/categories").await;
        }
    }
    Redirect::to("/categories")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_category_form_trims() {
        let payload = CategoryForm {
            name: "  Audio ".to_string(),
            description: " Headphones and speakers ".to_string(),
        }
        .validate()
        .unwrap();
        assert_eq!(payload.name, "Audio");
        assert_eq!(payload.description, "Headphones and speakers");
    }

    #[test]
    fn test_category_name_required() {
        let err = CategoryForm {
            name: "   ".to_string(),
            description: String::new(),
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, "Category name is required");
    }
}
