//! Request bodies for catalog and user management.
//!
//! Used by the admin console and the CLI; the storefront never writes to
//! these endpoints.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, Price, UserRole};

/// Most images kept per colour variant.
pub const MAX_VARIANT_IMAGES: usize = 3;

/// Body of `POST /users` (admin create) and `PUT /users/{id}`.
///
/// An empty password on update means "keep the current one" and is left out
/// of the JSON.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct UserPayload {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub role: UserRole,
}

impl UserPayload {
    /// Build a payload, dropping a blank password.
    #[must_use]
    pub fn new(name: &str, email: &str, password: &str, role: UserRole) -> Self {
        Self {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            password: Some(password.to_string()).filter(|p| !p.is_empty()),
            role,
        }
    }
}

impl std::fmt::Debug for UserPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserPayload")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("role", &self.role)
            .finish()
    }
}

/// Body of `POST /categories` and `PUT /categories/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPayload {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Images uploaded for one colour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColourVariant {
    pub color: String,
    pub images: Vec<String>,
}

impl ColourVariant {
    /// A variant keeping at most [`MAX_VARIANT_IMAGES`] images.
    #[must_use]
    pub fn new(color: &str, mut images: Vec<String>) -> Self {
        images.truncate(MAX_VARIANT_IMAGES);
        Self {
            color: color.trim().to_string(),
            images,
        }
    }
}

/// Body of `POST /products`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductPayload {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub stock: i64,
    #[serde(rename = "categoryId")]
    pub category_id: CategoryId,
    pub specifications: BTreeMap<String, String>,
    #[serde(rename = "mainImage", skip_serializing_if = "Option::is_none")]
    pub main_image: Option<String>,
    #[serde(rename = "colorVariants")]
    pub color_variants: Vec<ColourVariant>,
}

/// Pair up specification rows, dropping rows with an empty key or value.
/// Later rows win on duplicate keys.
#[must_use]
pub fn specifications_from_rows<K, V>(keys: &[K], values: &[V]) -> BTreeMap<String, String>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    keys.iter()
        .zip(values)
        .map(|(k, v)| (k.as_ref().trim(), v.as_ref().trim()))
        .filter(|(k, v)| !k.is_empty() && !v.is_empty())
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_payload_omits_blank_password() {
        let payload = UserPayload::new(" Ada ", "ada@arcverse.store", "", UserRole::Admin);
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({"name": "Ada", "email": "ada@arcverse.store", "role": "admin"})
        );

        let payload = UserPayload::new("Ada", "ada@arcverse.store", "hunter22", UserRole::User);
        assert_eq!(serde_json::to_value(&payload).unwrap()["password"], "hunter22");
        assert!(!format!("{payload:?}").contains("hunter22"));
    }

    #[test]
    fn test_specifications_drop_incomplete_rows() {
        let specs = specifications_from_rows(
            &["Weight", "", "Battery", "Colour "],
            &["320g", "orphan", " ", " Black"],
        );
        assert_eq!(specs.len(), 2);
        assert_eq!(specs["Weight"], "320g");
        assert_eq!(specs["Colour"], "Black");
    }

    #[test]
    fn test_variant_images_truncated() {
        let urls = (1..=5).map(|i| format!("/uploads/{i}.png")).collect();
        let variant = ColourVariant::new(" Red ", urls);
        assert_eq!(variant.color, "Red");
        assert_eq!(variant.images.len(), MAX_VARIANT_IMAGES);
        assert_eq!(variant.images[2], "/uploads/3.png");
    }

    #[test]
    fn test_product_payload_field_names() {
        let payload = ProductPayload {
            name: "Arc Buds".to_string(),
            description: "Earbuds".to_string(),
            price: Price::from_cents(12_999),
            stock: 4,
            category_id: CategoryId::new(2),
            specifications: BTreeMap::new(),
            main_image: Some("/uploads/main.png".to_string()),
            color_variants: vec![ColourVariant::new("Black", vec!["/uploads/b.png".to_string()])],
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["categoryId"], 2);
        assert_eq!(value["mainImage"], "/uploads/main.png");
        assert_eq!(value["colorVariants"][0]["color"], "Black");
        assert!(value.get("category_id").is_none());
    }
}
