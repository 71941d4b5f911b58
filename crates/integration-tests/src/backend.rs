//! In-memory stand-in for the ARCVERSE backend REST API.
//!
//! It speaks the same JSON as the real service, including its quirks: the
//! capitalised `CategoryId`, `0`/`1` flags, lists that are sometimes wrapped
//! in an object. Tokens are `token-{user id}`; management routes require an
//! admin token.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::Deserialize;
use serde_json::{Value, json};

/// Seeded shopper account.
pub const SHOPPER_EMAIL: &str = "sam@arcverse.store";
/// Seeded admin account.
pub const ADMIN_EMAIL: &str = "root@arcverse.store";
/// Password of both seeded accounts.
pub const PASSWORD: &str = "correct-horse-battery";

#[derive(Debug, Clone)]
struct StoredUser {
    id: i64,
    name: String,
    email: String,
    password: String,
    role: String,
}

impl StoredUser {
    fn json(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "email": self.email,
            "role": self.role,
            "createdAt": "2026-03-09T10:00:00.000Z",
        })
    }
}

#[derive(Debug, Clone)]
struct CartRow {
    id: i64,
    user_id: i64,
    product_id: i64,
    quantity: u32,
    ordered: bool,
}

#[derive(Debug, Default)]
struct Store {
    next_id: i64,
    users: Vec<StoredUser>,
    categories: Vec<Value>,
    products: Vec<Value>,
    cart: Vec<CartRow>,
    wishlist: Vec<(i64, i64)>,
    uploads: Vec<String>,
    tokens_revoked: bool,
}

impl Store {
    fn id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn product(&self, id: i64) -> Option<&Value> {
        self.products.iter().find(|p| p["id"] == id)
    }

    fn category_name(&self, id: &Value) -> Value {
        self.categories
            .iter()
            .find(|c| &c["id"] == id)
            .map_or(Value::Null, |c| c["name"].clone())
    }
}

/// Handle on the fake backend's data.
#[derive(Clone, Default)]
pub struct FakeBackend {
    store: Arc<Mutex<Store>>,
}

type Reply = (StatusCode, Json<Value>);

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn error(status: StatusCode, message: &str) -> Response {
    reply(status, json!({ "message": message }))
}

fn ok(body: Value) -> Response {
    reply(StatusCode::OK, body)
}

impl FakeBackend {
    /// A backend with one shopper, one admin, two categories and three
    /// products.
    #[must_use]
    pub fn seeded() -> Self {
        let backend = Self::default();
        {
            let mut store = backend.lock();
            store.users = vec![
                StoredUser {
                    id: 1,
                    name: "Root Admin".to_string(),
                    email: ADMIN_EMAIL.to_string(),
                    password: PASSWORD.to_string(),
                    role: "admin".to_string(),
                },
                StoredUser {
                    id: 2,
                    name: "Sam Shopper".to_string(),
                    email: SHOPPER_EMAIL.to_string(),
                    password: PASSWORD.to_string(),
                    role: "user".to_string(),
                },
            ];
            store.categories = vec![
                json!({"id": 10, "name": "Audio", "description": "Headphones and speakers"}),
                json!({"id": 11, "name": "Carry", "description": null}),
            ];
            store.products = vec![
                json!({
                    "id": 100, "name": "Arc Buds", "description": "Wireless earbuds",
                    "price": "129.00", "stock": 40, "CategoryId": 10, "category_name": "Audio",
                    "specifications": "{\"Battery\":\"30h\"}",
                    "images": [
                        {"id": 1, "url": "https://cdn.arcverse.store/buds.jpg", "isDefault": 1, "colour_variants": null},
                        {"id": 2, "url": "https://cdn.arcverse.store/buds-white.jpg", "isDefault": 0, "colour_variants": "White"}
                    ]
                }),
                json!({
                    "id": 101, "name": "Arc Sleeve", "description": "Laptop sleeve",
                    "price": 39, "stock": 3, "CategoryId": 11, "category_name": "Carry",
                    "images": []
                }),
                json!({
                    "id": 102, "name": "Arc Speaker", "description": "Room speaker",
                    "price": 249.5, "stock": 12, "CategoryId": 10, "category_name": "Audio",
                    "images": []
                }),
            ];
            store.next_id = 1000;
        }
        backend
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Make every token fail as expired.
    pub fn revoke_tokens(&self) {
        self.lock().tokens_revoked = true;
    }

    /// Names of all products.
    #[must_use]
    pub fn product_names(&self) -> Vec<String> {
        self.lock()
            .products
            .iter()
            .filter_map(|p| p["name"].as_str().map(str::to_string))
            .collect()
    }

    /// A stored product by name.
    #[must_use]
    pub fn product_named(&self, name: &str) -> Option<Value> {
        self.lock().products.iter().find(|p| p["name"] == name).cloned()
    }

    /// Names of all categories.
    #[must_use]
    pub fn category_names(&self) -> Vec<String> {
        self.lock()
            .categories
            .iter()
            .filter_map(|c| c["name"].as_str().map(str::to_string))
            .collect()
    }

    /// Emails of all users.
    #[must_use]
    pub fn user_emails(&self) -> Vec<String> {
        self.lock().users.iter().map(|u| u.email.clone()).collect()
    }

    /// File names received by the upload endpoints.
    #[must_use]
    pub fn uploads(&self) -> Vec<String> {
        self.lock().uploads.clone()
    }

    /// `(product id, quantity, ordered)` for a user's cart rows.
    #[must_use]
    pub fn cart_of(&self, user_id: i64) -> Vec<(i64, u32, bool)> {
        self.lock()
            .cart
            .iter()
            .filter(|row| row.user_id == user_id)
            .map(|row| (row.product_id, row.quantity, row.ordered))
            .collect()
    }

    /// Id of a user's open cart row for `product_id`.
    #[must_use]
    pub fn cart_line_id(&self, user_id: i64, product_id: i64) -> Option<i64> {
        self.lock()
            .cart
            .iter()
            .find(|row| row.user_id == user_id && row.product_id == product_id && !row.ordered)
            .map(|row| row.id)
    }

    /// Check a bearer token, requiring the admin role.
    fn admin(&self, headers: &HeaderMap) -> Result<i64, Response> {
        let store = self.lock();
        let token = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "No token provided"))?;
        if store.tokens_revoked {
            return Err(error(StatusCode::UNAUTHORIZED, "jwt expired"));
        }
        let user = token
            .strip_prefix("token-")
            .and_then(|id| id.parse::<i64>().ok())
            .and_then(|id| store.users.iter().find(|u| u.id == id))
            .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Invalid token"))?;
        if user.role != "admin" {
            return Err(error(StatusCode::FORBIDDEN, "Admin access required"));
        }
        Ok(user.id)
    }

    /// The backend's routes.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/users/login", post(login))
            .route("/users", get(list_users).post(create_user))
            .route("/users/{id}", put(update_user).delete(delete_user))
            .route("/categories", get(list_categories).post(create_category))
            .route(
                "/categories/{id}",
                put(update_category).delete(delete_category),
            )
            .route("/products", get(list_products).post(create_product))
            .route("/products/{id}", get(get_product).delete(delete_product))
            .route("/products/filter-by-categories", post(filter_products))
            .route("/uploads/single", post(upload_single))
            .route("/uploads/multiple", post(upload_multiple))
            .route("/cart/mark-ordered", post(mark_ordered))
            .route("/cart/orders/{user_id}", get(orders))
            .route("/cart/{user_id}", get(cart))
            .route("/cart/{user_id}/items", post(add_item))
            .route("/cart/{user_id}/items/{line_id}", put(update_item).delete(remove_item))
            .route("/wishlist/toggle", post(toggle_wishlist))
            .route("/wishlist/{user_id}", get(wishlist))
            .with_state(self.clone())
    }
}

// =============================================================================
// Users
// =============================================================================

#[derive(Deserialize)]
struct Credentials {
    email: String,
    password: String,
}

async fn login(State(backend): State<FakeBackend>, Json(body): Json<Credentials>) -> Response {
    let store = backend.lock();
    match store
        .users
        .iter()
        .find(|u| u.email == body.email && u.password == body.password)
    {
        Some(user) => ok(json!({ "user": user.json(), "token": format!("token-{}", user.id) })),
        None => error(StatusCode::UNAUTHORIZED, "Invalid email or password"),
    }
}

async fn list_users(State(backend): State<FakeBackend>, headers: HeaderMap) -> Response {
    if let Err(rejection) = backend.admin(&headers) {
        return rejection;
    }
    let users: Vec<Value> = backend.lock().users.iter().map(StoredUser::json).collect();
    ok(json!(users))
}

#[derive(Deserialize)]
struct UserBody {
    name: String,
    email: String,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

/// Public signup, or admin creation when an admin token is sent.
async fn create_user(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(body): Json<UserBody>,
) -> Response {
    let role = if headers.contains_key("authorization") {
        if let Err(rejection) = backend.admin(&headers) {
            return rejection;
        }
        body.role.unwrap_or_else(|| "user".to_string())
    } else {
        "user".to_string()
    };
    let mut store = backend.lock();
    if store.users.iter().any(|u| u.email == body.email) {
        return error(StatusCode::CONFLICT, "Email already registered");
    }
    let id = store.id();
    let user = StoredUser {
        id,
        name: body.name,
        email: body.email,
        password: body.password.unwrap_or_default(),
        role,
    };
    let created = user.json();
    store.users.push(user);
    reply(StatusCode::CREATED, created)
}

async fn update_user(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<UserBody>,
) -> Response {
    if let Err(rejection) = backend.admin(&headers) {
        return rejection;
    }
    let mut store = backend.lock();
    let Some(user) = store.users.iter_mut().find(|u| u.id == id) else {
        return error(StatusCode::NOT_FOUND, "User not found");
    };
    user.name = body.name;
    user.email = body.email;
    if let Some(password) = body.password {
        user.password = password;
    }
    if let Some(role) = body.role {
        user.role = role;
    }
    ok(user.json())
}

async fn delete_user(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Err(rejection) = backend.admin(&headers) {
        return rejection;
    }
    let mut store = backend.lock();
    let before = store.users.len();
    store.users.retain(|u| u.id != id);
    if store.users.len() == before {
        return error(StatusCode::NOT_FOUND, "User not found");
    }
    ok(json!({ "message": "User deleted" }))
}

// =============================================================================
// Categories
// =============================================================================

/// Wrapped, unlike the product list.
async fn list_categories(State(backend): State<FakeBackend>) -> Reply {
    let categories = backend.lock().categories.clone();
    (StatusCode::OK, Json(json!({ "categories": categories })))
}

#[derive(Deserialize)]
struct CategoryBody {
    name: String,
    #[serde(default)]
    description: String,
}

async fn create_category(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(body): Json<CategoryBody>,
) -> Response {
    if let Err(rejection) = backend.admin(&headers) {
        return rejection;
    }
    let mut store = backend.lock();
    if store.categories.iter().any(|c| c["name"] == body.name.as_str()) {
        return error(StatusCode::CONFLICT, "Category already exists");
    }
    let id = store.id();
    let category = json!({ "id": id, "name": body.name, "description": body.description });
    store.categories.push(category.clone());
    reply(StatusCode::CREATED, category)
}

async fn update_category(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<CategoryBody>,
) -> Response {
    if let Err(rejection) = backend.admin(&headers) {
        return rejection;
    }
    let mut store = backend.lock();
    let Some(category) = store.categories.iter_mut().find(|c| c["id"] == id) else {
        return error(StatusCode::NOT_FOUND, "Category not found");
    };
    *category = json!({ "id": id, "name": body.name, "description": body.description });
    ok(category.clone())
}

async fn delete_category(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Err(rejection) = backend.admin(&headers) {
        return rejection;
    }
    let mut store = backend.lock();
    if store.products.iter().any(|p| p["CategoryId"] == id) {
        return error(StatusCode::BAD_REQUEST, "Category still has products");
    }
    store.categories.retain(|c| c["id"] != id);
    ok(json!({ "message": "Category deleted" }))
}

// =============================================================================
// Products
// =============================================================================

async fn list_products(State(backend): State<FakeBackend>) -> Response {
    ok(Value::Array(backend.lock().products.clone()))
}

async fn get_product(State(backend): State<FakeBackend>, Path(id): Path<i64>) -> Response {
    match backend.lock().product(id) {
        Some(product) => ok(product.clone()),
        None => error(StatusCode::NOT_FOUND, "Product not found"),
    }
}

#[derive(Deserialize)]
struct FilterBody {
    categories: Vec<i64>,
}

async fn filter_products(
    State(backend): State<FakeBackend>,
    Json(body): Json<FilterBody>,
) -> Response {
    let products: Vec<Value> = backend
        .lock()
        .products
        .iter()
        .filter(|p| {
            p["CategoryId"]
                .as_i64()
                .is_some_and(|id| body.categories.contains(&id))
        })
        .cloned()
        .collect();
    ok(json!({ "products": products }))
}

/// Stores the product the way the real backend joins it: images flattened
/// into one list tagged with their colour.
async fn create_product(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(rejection) = backend.admin(&headers) {
        return rejection;
    }
    let mut store = backend.lock();
    let id = store.id();

    let mut images = Vec::new();
    if let Some(url) = body["mainImage"].as_str() {
        let image_id = store.id();
        images.push(json!({ "id": image_id, "url": url, "isDefault": 1, "colour_variants": null }));
    }
    for variant in body["colorVariants"].as_array().into_iter().flatten() {
        for url in variant["images"].as_array().into_iter().flatten() {
            let image_id = store.id();
            images.push(json!({
                "id": image_id, "url": url, "isDefault": 0, "colour_variants": variant["color"]
            }));
        }
    }

    let product = json!({
        "id": id,
        "name": body["name"],
        "description": body["description"],
        "price": body["price"],
        "stock": body["stock"],
        "CategoryId": body["categoryId"],
        "category_name": store.category_name(&body["categoryId"]),
        "specifications": body["specifications"],
        "images": images,
        "colorVariants": body["colorVariants"],
    });
    store.products.push(product.clone());
    reply(StatusCode::CREATED, product)
}

async fn delete_product(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Err(rejection) = backend.admin(&headers) {
        return rejection;
    }
    backend.lock().products.retain(|p| p["id"] != id);
    ok(json!({ "message": "Product deleted" }))
}

// =============================================================================
// Uploads
// =============================================================================

async fn read_files(multipart: &mut Multipart, field: &str) -> Result<Vec<String>, Response> {
    let mut names = Vec::new();
    while let Some(part) = multipart
        .next_field()
        .await
        .map_err(|_| error(StatusCode::BAD_REQUEST, "Malformed upload"))?
    {
        if part.name() != Some(field) {
            continue;
        }
        let name = part.file_name().unwrap_or("upload").to_string();
        part.bytes()
            .await
            .map_err(|_| error(StatusCode::BAD_REQUEST, "Malformed upload"))?;
        names.push(name);
    }
    Ok(names)
}

fn hosted(name: &str) -> String {
    format!("https://cdn.arcverse.store/uploads/{name}")
}

async fn upload_single(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if let Err(rejection) = backend.admin(&headers) {
        return rejection;
    }
    let names = match read_files(&mut multipart, "image").await {
        Ok(names) => names,
        Err(rejection) => return rejection,
    };
    let Some(name) = names.first() else {
        return error(StatusCode::BAD_REQUEST, "No file uploaded");
    };
    backend.lock().uploads.extend(names.iter().cloned());
    ok(json!({ "url": hosted(name) }))
}

async fn upload_multiple(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if let Err(rejection) = backend.admin(&headers) {
        return rejection;
    }
    let names = match read_files(&mut multipart, "images").await {
        Ok(names) => names,
        Err(rejection) => return rejection,
    };
    let urls: Vec<String> = names.iter().map(|n| hosted(n)).collect();
    backend.lock().uploads.extend(names);
    ok(json!({ "urls": urls }))
}

// =============================================================================
// Cart and orders
// =============================================================================

fn line_json(store: &Store, row: &CartRow) -> Value {
    let product = store.product(row.product_id).cloned().unwrap_or(Value::Null);
    json!({
        "id": row.id,
        "productId": row.product_id,
        "name": product["name"],
        "price": product["price"],
        "description": product["description"],
        "quantity": row.quantity,
        "category_name": product["category_name"],
        "ProductImages": product["images"].as_array().cloned().unwrap_or_default(),
    })
}

async fn cart(State(backend): State<FakeBackend>, Path(user_id): Path<i64>) -> Response {
    let store = backend.lock();
    let lines: Vec<Value> = store
        .cart
        .iter()
        .filter(|row| row.user_id == user_id && !row.ordered)
        .map(|row| line_json(&store, row))
        .collect();
    ok(json!(lines))
}

#[derive(Deserialize)]
struct AddItem {
    #[serde(rename = "productId")]
    product_id: i64,
    quantity: u32,
}

async fn add_item(
    State(backend): State<FakeBackend>,
    Path(user_id): Path<i64>,
    Json(body): Json<AddItem>,
) -> Response {
    let mut store = backend.lock();
    if store.product(body.product_id).is_none() {
        return error(StatusCode::NOT_FOUND, "Product not found");
    }
    if let Some(row) = store
        .cart
        .iter_mut()
        .find(|row| row.user_id == user_id && row.product_id == body.product_id && !row.ordered)
    {
        row.quantity += body.quantity;
    } else {
        let id = store.id();
        store.cart.push(CartRow {
            id,
            user_id,
            product_id: body.product_id,
            quantity: body.quantity,
            ordered: false,
        });
    }
    reply(StatusCode::CREATED, json!({ "message": "Added" }))
}

#[derive(Deserialize)]
struct Quantity {
    quantity: u32,
}

async fn update_item(
    State(backend): State<FakeBackend>,
    Path((user_id, line_id)): Path<(i64, i64)>,
    Json(body): Json<Quantity>,
) -> Response {
    let mut store = backend.lock();
    match store
        .cart
        .iter_mut()
        .find(|row| row.user_id == user_id && row.id == line_id)
    {
        Some(row) => {
            row.quantity = body.quantity;
            ok(json!({ "message": "Updated" }))
        }
        None => error(StatusCode::NOT_FOUND, "Cart item not found"),
    }
}

/// Removal is addressed by product id.
async fn remove_item(
    State(backend): State<FakeBackend>,
    Path((user_id, product_id)): Path<(i64, i64)>,
) -> Response {
    backend
        .lock()
        .cart
        .retain(|row| !(row.user_id == user_id && row.product_id == product_id && !row.ordered));
    ok(json!({ "message": "Removed" }))
}

#[derive(Deserialize)]
struct MarkOrdered {
    #[serde(rename = "cartIds")]
    cart_ids: Vec<i64>,
}

async fn mark_ordered(
    State(backend): State<FakeBackend>,
    Json(body): Json<MarkOrdered>,
) -> Response {
    let mut store = backend.lock();
    for row in store.cart.iter_mut().filter(|r| body.cart_ids.contains(&r.id)) {
        row.ordered = true;
    }
    ok(json!({ "message": "Order placed" }))
}

async fn orders(State(backend): State<FakeBackend>, Path(user_id): Path<i64>) -> Response {
    let store = backend.lock();
    let lines: Vec<Value> = store
        .cart
        .iter()
        .filter(|row| row.user_id == user_id && row.ordered)
        .map(|row| line_json(&store, row))
        .collect();
    ok(json!({ "orders": lines }))
}

// =============================================================================
// Wishlist
// =============================================================================

#[derive(Deserialize)]
struct Toggle {
    #[serde(rename = "userId")]
    user_id: i64,
    #[serde(rename = "productId")]
    product_id: i64,
}

async fn toggle_wishlist(State(backend): State<FakeBackend>, Json(body): Json<Toggle>) -> Response {
    let mut store = backend.lock();
    let entry = (body.user_id, body.product_id);
    let added = if store.wishlist.contains(&entry) {
        store.wishlist.retain(|e| *e != entry);
        false
    } else {
        store.wishlist.push(entry);
        true
    };
    ok(json!({ "added": added }))
}

async fn wishlist(State(backend): State<FakeBackend>, Path(user_id): Path<i64>) -> Response {
    let store = backend.lock();
    let entries: Vec<Value> = store
        .wishlist
        .iter()
        .filter(|(user, _)| *user == user_id)
        .filter_map(|(_, product_id)| store.product(*product_id))
        .map(|p| json!({ "productId": p["id"], "name": p["name"], "price": p["price"] }))
        .collect();
    ok(json!(entries))
}
