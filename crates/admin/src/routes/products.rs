//! Product management route handlers.
//!
//! Creating a product is a three step pipeline against the backend: upload
//! the main image, upload each colour's images, then post the product with
//! the returned URLs. The first failure aborts the rest.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, State, multipart::MultipartError},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use arcverse_core::catalog::{Category, Product, category_name};
use arcverse_core::payloads::{
    ColourVariant, MAX_VARIANT_IMAGES, ProductPayload, specifications_from_rows,
};
use arcverse_core::{CategoryId, Price, ProductId};

use super::after_failure;
use crate::api::{ApiError, UploadFile};
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::{AdminPage, CurrentAdmin, Flash, set_flash};
use crate::state::AppState;

/// Blank specification rows on the new product form.
pub const SPEC_ROWS: usize = 5;

/// Colour variant slots on the new product form.
pub const VARIANT_SLOTS: usize = 3;

const NEW_PATH: &str = "/products/new";

/// Product table row.
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub price: String,
    pub stock: i64,
    pub thumbnail: Option<String>,
}

impl ProductRow {
    fn new(product: &Product, categories: &[Category]) -> Self {
        let category = product
            .category_name
            .as_deref()
            .or_else(|| category_name(categories, product.category_id))
            .unwrap_or("Uncategorized")
            .to_string();
        Self {
            id: product.id,
            name: product.name.clone(),
            category,
            price: product.price.display(),
            stock: product.stock,
            thumbnail: product.default_image().map(|img| img.url.clone()),
        }
    }

    /// Class for the stock cell.
    #[must_use]
    pub const fn stock_class(&self) -> &'static str {
        if self.stock <= super::dashboard::LOW_STOCK_THRESHOLD {
            "stock stock-low"
        } else {
            "stock"
        }
    }
}

/// Product list template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsTemplate {
    pub page: AdminPage,
    pub products: Vec<ProductRow>,
}

/// New product form template.
#[derive(Template, WebTemplate)]
#[template(path = "products/new.html")]
pub struct NewProductTemplate {
    pub page: AdminPage,
    pub categories: Vec<Category>,
    pub spec_rows: Vec<usize>,
    pub variant_slots: Vec<usize>,
    pub max_variant_images: usize,
}

/// One colour slot as submitted.
#[derive(Debug, Default)]
pub struct VariantInput {
    pub color: String,
    pub files: Vec<UploadFile>,
}

/// The raw multipart submission of the new product form.
#[derive(Debug, Default)]
pub struct ProductUpload {
    pub name: String,
    pub description: String,
    pub price: String,
    pub stock: String,
    pub category_id: String,
    pub spec_keys: Vec<String>,
    pub spec_values: Vec<String>,
    pub main_image: Option<UploadFile>,
    pub variants: Vec<VariantInput>,
}

/// Validated fields, waiting for image URLs.
#[derive(Debug)]
pub struct ProductDraft {
    pub payload: ProductPayload,
    pub main_image: Option<UploadFile>,
    pub variants: Vec<VariantInput>,
}

/// Variant slot index from a field name such as `variant_color_1`.
fn variant_slot(name: &str, prefix: &str) -> Option<usize> {
    name.strip_prefix(prefix)?
        .parse::<usize>()
        .ok()
        .filter(|slot| *slot < VARIANT_SLOTS)
}

impl ProductUpload {
    fn variant(&mut self, slot: usize) -> Option<&mut VariantInput> {
        if self.variants.len() <= slot {
            self.variants.resize_with(slot + 1, VariantInput::default);
        }
        self.variants.get_mut(slot)
    }

    /// Record one text field.
    pub fn push_text(&mut self, name: &str, value: String) {
        match name {
            "name" => self.name = value,
            "description" => self.description = value,
            "price" => self.price = value,
            "stock" => self.stock = value,
            "categoryId" => self.category_id = value,
            "spec_key" => self.spec_keys.push(value),
            "spec_value" => self.spec_values.push(value),
            other => {
                if let Some(variant) =
                    variant_slot(other, "variant_color_").and_then(|slot| self.variant(slot))
                {
                    variant.color = value;
                }
            }
        }
    }

    /// Record one file field. Empty file inputs are ignored.
    pub fn push_file(&mut self, name: &str, file: UploadFile) {
        if file.file_name.is_empty() || file.bytes.is_empty() {
            return;
        }
        if name == "main_image" {
            self.main_image = Some(file);
        } else if let Some(variant) =
            variant_slot(name, "variant_images_").and_then(|slot| self.variant(slot))
            && variant.files.len() < MAX_VARIANT_IMAGES
        {
            variant.files.push(file);
        }
    }

    /// Read the whole form.
    ///
    /// # Errors
    ///
    /// Returns the multipart error when the body cannot be read.
    pub async fn read(mut multipart: Multipart) -> Result<Self, MultipartError> {
        let mut upload = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let bytes = field.bytes().await?.to_vec();
                    upload.push_file(
                        &name,
                        UploadFile {
                            file_name,
                            content_type,
                            bytes,
                        },
                    );
                }
                None => {
                    let value = field.text().await?;
                    upload.push_text(&name, value);
                }
            }
        }
        Ok(upload)
    }

    /// Check the text fields.
    ///
    /// # Errors
    ///
    /// Returns a message for the first invalid field.
    pub fn validate(self) -> Result<ProductDraft, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Product name is required".to_string());
        }
        let price =
            Price::parse_strict(&self.price).map_err(|e| format!("Invalid price: {e}"))?;
        let stock = self
            .stock
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|stock| *stock >= 0)
            .ok_or("Stock must be a whole number of zero or more")?;
        let category_id = self
            .category_id
            .parse::<CategoryId>()
            .map_err(|_| "Please choose a category")?;

        let variants = self
            .variants
            .into_iter()
            .filter(|v| !v.color.trim().is_empty())
            .collect();

        Ok(ProductDraft {
            payload: ProductPayload {
                name: name.to_string(),
                description: self.description.trim().to_string(),
                price,
                stock,
                category_id,
                specifications: specifications_from_rows(&self.spec_keys, &self.spec_values),
                main_image: None,
                color_variants: Vec::new(),
            },
            main_image: self.main_image,
            variants,
        })
    }
}

impl ProductDraft {
    /// Upload the images and create the product.
    async fn submit(self, state: &AppState, token: &str) -> Result<ProductPayload, ApiError> {
        let api = state.api();
        let mut payload = self.payload;

        if let Some(file) = self.main_image {
            payload.main_image = Some(api.upload_single(token, file).await?);
        }

        for variant in self.variants {
            let urls = if variant.files.is_empty() {
                Vec::new()
            } else {
                api.upload_multiple(token, variant.files).await?
            };
            payload
                .color_variants
                .push(ColourVariant::new(&variant.color, urls));
        }

        api.create_product(token, &payload).await?;
        Ok(payload)
    }
}

async fn page(state: &AppState, session: &Session, admin: &CurrentAdmin) -> AdminPage {
    AdminPage::load(
        session,
        admin,
        "/products",
        state.config().storefront_url.as_deref(),
    )
    .await
}

/// List products.
#[instrument(skip(state, session, admin))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
) -> Response {
    let api = state.api();
    let (products, categories) = tokio::join!(
        api.list_products(&admin.token),
        api.list_categories(&admin.token),
    );
    for result in [products.as_ref().err(), categories.as_ref().err()] {
        if let Some(e @ ApiError::Unauthorized(_)) = result {
            return after_failure(&session, e, "Failed to fetch products", "/")
                .await
                .into_response();
        }
    }

    let mut page = page(&state, &session, &admin).await;
    let categories = categories.unwrap_or_else(|e| {
        tracing::warn!("Failed to fetch categories: {e}");
        Vec::new()
    });
    let products = products.unwrap_or_else(|e| {
        tracing::error!("Failed to fetch products: {e}");
        page.fail_soft("Failed to fetch products");
        Vec::new()
    });

    ProductsTemplate {
        page,
        products: products
            .iter()
            .map(|p| ProductRow::new(p, &categories))
            .collect(),
    }
    .into_response()
}

/// New product form.
#[instrument(skip(state, session, admin))]
pub async fn new(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
) -> Response {
    let categories = match state.api().list_categories(&admin.token).await {
        Ok(categories) => categories,
        Err(e) => {
            tracing::error!("Failed to fetch categories: {e}");
            return after_failure(&session, &e, "Failed to fetch categories", "/products")
                .await
                .into_response();
        }
    };

    NewProductTemplate {
        page: page(&state, &session, &admin).await,
        categories,
        spec_rows: (0..SPEC_ROWS).collect(),
        variant_slots: (0..VARIANT_SLOTS).collect(),
        max_variant_images: MAX_VARIANT_IMAGES,
    }
    .into_response()
}

/// Create a product from the multipart form.
#[instrument(skip(state, session, admin, multipart))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    multipart: Multipart,
) -> Redirect {
    let upload = match ProductUpload::read(multipart).await {
        Ok(upload) => upload,
        Err(e) => {
            tracing::warn!("Failed to read product form: {e}");
            let message = if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                "The uploaded images are too large"
            } else {
                "Failed to read the submitted form"
            };
            set_flash(&session, Flash::error(message)).await;
            return Redirect::to(NEW_PATH);
        }
    };

    let draft = match upload.validate() {
        Ok(draft) => draft,
        Err(message) => {
            set_flash(&session, Flash::error(message)).await;
            return Redirect::to(NEW_PATH);
        }
    };

    match draft.submit(&state, &admin.token).await {
        Ok(payload) => {
            tracing::info!(
                name = %payload.name,
                variants = payload.color_variants.len(),
                "Product created"
            );
            set_flash(&session, Flash::success("Product created successfully")).await;
            Redirect::to("/products")
        }
        Err(e) => {
            tracing::error!("Failed to create product: {e}");
            after_failure(&session, &e, "Failed to create product", NEW_PATH).await
        }
    }
}

/// Delete a product.
#[instrument(skip(state, session, admin))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Redirect {
    match state.api().delete_product(&admin.token, id).await {
        Ok(()) => {
            tracing::info!(product_id = %id, "Product deleted");
            set_flash(&session, Flash::success("Product deleted successfully")).await;
            Redirect::to("/products")
        }
        Err(e) => {
            tracing::error!("Failed to delete product: {e}");
            after_failure(&session, &e, "Failed to delete product", "/products").await
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn file(name: &str) -> UploadFile {
        UploadFile {
            file_name: name.to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![0x89, b'P', b'N', b'G'],
        }
    }

    fn filled() -> ProductUpload {
        let mut upload = ProductUpload::default();
        upload.push_text("name", " Arc Lamp ".to_string());
        upload.push_text("description", "Warm light".to_string());
        upload.push_text("price", "49.90".to_string());
        upload.push_text("stock", "12".to_string());
        upload.push_text("categoryId", "4".to_string());
        upload
    }

    #[test]
    fn test_variant_fields_fill_slots() {
        let mut upload = filled();
        upload.push_text("variant_color_1", "Red".to_string());
        for n in 0..5 {
            upload.push_file("variant_images_1", file(&format!("red-{n}.png")));
        }
        upload.push_text("variant_color_7", "Ignored".to_string());

        assert_eq!(upload.variants.len(), 2);
        assert_eq!(upload.variants[1].color, "Red");
        assert_eq!(upload.variants[1].files.len(), MAX_VARIANT_IMAGES);
    }

    #[test]
    fn test_empty_file_inputs_skipped() {
        let mut upload = filled();
        upload.push_file(
            "main_image",
            UploadFile {
                file_name: String::new(),
                content_type: "application/octet-stream".to_string(),
                bytes: Vec::new(),
            },
        );
        assert!(upload.main_image.is_none());

        upload.push_file("main_image", file("main.png"));
        assert_eq!(upload.main_image.unwrap().file_name, "main.png");
    }

    #[test]
    fn test_validate_builds_payload() {
        let mut upload = filled();
        upload.push_text("spec_key", "Wattage".to_string());
        upload.push_text("spec_value", "8W".to_string());
        upload.push_text("spec_key", String::new());
        upload.push_text("spec_value", "orphan".to_string());
        upload.push_text("variant_color_0", "  ".to_string());
        upload.push_text("variant_color_2", "Black".to_string());

        let draft = upload.validate().unwrap();
        assert_eq!(draft.payload.name, "Arc Lamp");
        assert_eq!(draft.payload.stock, 12);
        assert_eq!(draft.payload.category_id, CategoryId::new(4));
        assert_eq!(draft.payload.specifications.len(), 1);
        assert_eq!(draft.variants.len(), 1);
        assert_eq!(draft.variants[0].color, "Black");
    }

    #[test]
    fn test_validate_rejects_bad_numbers() {
        let mut upload = filled();
        upload.price = "abc".to_string();
        assert!(upload.validate().unwrap_err().starts_with("Invalid price"));

        let mut upload = filled();
        upload.stock = "-1".to_string();
        assert!(upload.validate().unwrap_err().starts_with("Stock"));

        let mut upload = filled();
        upload.category_id = String::new();
        assert_eq!(upload.validate().unwrap_err(), "Please choose a category");
    }

    #[test]
    fn test_row_falls_back_to_category_list() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "id": 9, "name": "Desk", "price": 120, "stock": 2, "CategoryId": 4
        }))
        .unwrap();
        let categories: Vec<Category> =
            serde_json::from_value(serde_json::json!([{"id": 4, "name": "Furniture"}])).unwrap();
        let row = ProductRow::new(&product, &categories);
        assert_eq!(row.category, "Furniture");
        assert_eq!(row.price, "$120.00");
        assert_eq!(row.stock_class(), "stock stock-low");
    }
}
