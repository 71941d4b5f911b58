//! Admin console flows against the fake backend.

#![allow(clippy::unwrap_used)]

use arcverse_integration_tests::backend::{ADMIN_EMAIL, PASSWORD, SHOPPER_EMAIL};
use arcverse_integration_tests::{TestApp, location};
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};

async fn signed_in() -> TestApp {
    let app = TestApp::admin().await;
    let resp = app.login(ADMIN_EMAIL, PASSWORD).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
    app
}

fn png(name: &str) -> Part {
    Part::bytes(vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a])
        .file_name(name.to_string())
        .mime_str("image/png")
        .unwrap()
}

#[tokio::test]
async fn test_console_requires_login() {
    let app = TestApp::admin().await;

    for path in ["/", "/users", "/categories", "/products", "/products/new"] {
        let resp = app.get(path).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&resp), "/login", "{path}");
    }

    let login = app.get("/login").await;
    assert_eq!(login.status(), StatusCode::OK);
    assert_eq!(login.headers()["x-frame-options"], "DENY");
    assert!(login.headers().contains_key("content-security-policy"));
}

#[tokio::test]
async fn test_shopper_cannot_sign_in() {
    let app = TestApp::admin().await;

    let resp = app.login(SHOPPER_EMAIL, PASSWORD).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(resp.text().await.unwrap().contains("administrator account required"));

    assert_eq!(location(&app.get("/").await), "/login");
}

#[tokio::test]
async fn test_wrong_password_shows_backend_message() {
    let app = TestApp::admin().await;

    let resp = app.login(ADMIN_EMAIL, "nope-nope-nope").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.text().await.unwrap().contains("Invalid email or password"));
}

#[tokio::test]
async fn test_dashboard_counts_and_low_stock() {
    let app = signed_in().await;

    let dashboard = app.page("/").await;
    assert!(dashboard.contains("Welcome back, Root Admin"));
    assert!(dashboard.contains("Total Users"));
    assert!(dashboard.contains("Low stock"));
    // Arc Sleeve has 3 left
    assert!(dashboard.contains("Arc Sleeve"));
    assert!(!dashboard.contains("Arc Speaker"));
}

#[tokio::test]
async fn test_category_lifecycle() {
    let app = signed_in().await;

    let resp = app
        .post_form("/categories", &[("name", "  Lighting "), ("description", "Lamps")])
        .await;
    assert_eq!(location(&resp), "/categories");
    assert!(app.backend.category_names().contains(&"Lighting".to_string()));

    let page = app.page("/categories").await;
    assert!(page.contains("Category created successfully"));
    assert!(page.contains("Lighting"));

    let resp = app
        .post_form("/categories", &[("name", " "), ("description", "")])
        .await;
    assert_eq!(location(&resp), "/categories");
    assert!(app.page("/categories").await.contains("Category name is required"));

    let resp = app
        .post_form("/categories/11", &[("name", "Bags"), ("description", "Carry goods")])
        .await;
    assert_eq!(location(&resp), "/categories");
    assert!(app.backend.category_names().contains(&"Bags".to_string()));

    // The backend refuses to delete a category that still has products
    let resp = app.post_form("/categories/10/delete", &[]).await;
    assert_eq!(location(&resp), "/categories");
    assert!(app.page("/categories").await.contains("Category still has products"));

    assert_eq!(app.get("/categories/999/edit").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_management_guards_own_account() {
    let app = signed_in().await;

    let resp = app
        .post_form(
            "/users",
            &[
                ("name", "Ops Person"),
                ("email", "ops@arcverse.store"),
                ("password", "long-enough-pass"),
                ("role", "admin"),
            ],
        )
        .await;
    assert_eq!(location(&resp), "/users");
    assert!(app.backend.user_emails().contains(&"ops@arcverse.store".to_string()));

    let resp = app.post_form("/users/1/delete", &[]).await;
    assert_eq!(location(&resp), "/users");
    assert!(app.page("/users").await.contains("You cannot delete your own account"));

    let resp = app
        .post_form(
            "/users/1",
            &[("name", "Root Admin"), ("email", ADMIN_EMAIL), ("role", "user")],
        )
        .await;
    assert_eq!(location(&resp), "/users/1/edit");
    assert!(app.page("/users/1/edit").await.contains("You cannot remove your own admin role"));

    let resp = app.post_form("/users/2/delete", &[]).await;
    assert_eq!(location(&resp), "/users");
    assert!(!app.backend.user_emails().contains(&SHOPPER_EMAIL.to_string()));
}

#[tokio::test]
async fn test_create_product_uploads_images_first() {
    let app = signed_in().await;

    let form = Form::new()
        .text("name", "Arc Lamp")
        .text("description", "Warm desk light")
        .text("price", "49.90")
        .text("stock", "7")
        .text("categoryId", "10")
        .text("spec_key", "Wattage")
        .text("spec_value", "8W")
        .text("spec_key", "")
        .text("spec_value", "")
        .part("main_image", png("lamp.png"))
        .text("variant_color_0", "Black")
        .part("variant_images_0", png("lamp-black-1.png"))
        .part("variant_images_0", png("lamp-black-2.png"))
        .text("variant_color_1", "")
        .part(
            "variant_images_1",
            Part::bytes(Vec::new()).file_name(String::new()),
        );

    let resp = app
        .client
        .post(app.url("/products"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/products");

    assert_eq!(
        app.backend.uploads(),
        vec!["lamp.png", "lamp-black-1.png", "lamp-black-2.png"]
    );

    let product = app.backend.product_named("Arc Lamp").unwrap();
    assert_eq!(product["stock"], 7);
    assert_eq!(product["CategoryId"], 10);
    assert_eq!(product["specifications"]["Wattage"], "8W");
    assert_eq!(product["colorVariants"][0]["color"], "Black");
    assert_eq!(product["colorVariants"][0]["images"].as_array().unwrap().len(), 2);
    assert_eq!(product["images"][0]["url"], "https://cdn.arcverse.store/uploads/lamp.png");

    let list = app.page("/products").await;
    assert!(list.contains("Product created successfully"));
    assert!(list.contains("Arc Lamp"));
    assert!(list.contains("$49.90"));
}

#[tokio::test]
async fn test_invalid_product_is_not_sent() {
    let app = signed_in().await;

    let form = Form::new()
        .text("name", "Broken")
        .text("price", "twelve")
        .text("stock", "1")
        .text("categoryId", "10")
        .part("main_image", png("broken.png"));
    let resp = app
        .client
        .post(app.url("/products"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(location(&resp), "/products/new");
    assert!(app.backend.uploads().is_empty());
    assert!(app.backend.product_named("Broken").is_none());
    assert!(app.page("/products/new").await.contains("Invalid price"));
}

#[tokio::test]
async fn test_delete_product() {
    let app = signed_in().await;

    let resp = app.post_form("/products/101/delete", &[]).await;
    assert_eq!(location(&resp), "/products");
    assert!(!app.backend.product_names().contains(&"Arc Sleeve".to_string()));
    assert!(app.page("/products").await.contains("Product deleted successfully"));
}

#[tokio::test]
async fn test_expired_token_ends_session() {
    let app = signed_in().await;
    app.backend.revoke_tokens();

    let resp = app.get("/users").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");

    let login = app.page("/login").await;
    assert!(login.contains("Your session has expired, please sign in again"));

    // The console session is gone too
    assert_eq!(location(&app.get("/").await), "/login");
}

#[tokio::test]
async fn test_logout() {
    let app = signed_in().await;

    let resp = app.post_form("/logout", &[]).await;
    assert_eq!(location(&resp), "/login");
    assert_eq!(location(&app.get("/").await), "/login");
}
