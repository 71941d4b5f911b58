//! Storefront flows against the fake backend.

#![allow(clippy::unwrap_used)]

use arcverse_integration_tests::backend::{ADMIN_EMAIL, PASSWORD, SHOPPER_EMAIL};
use arcverse_integration_tests::{TestApp, location};
use reqwest::StatusCode;

#[tokio::test]
async fn test_health_and_readiness() {
    let app = TestApp::storefront(None).await;

    let resp = app.get("/health").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");

    assert_eq!(app.get("/health/ready").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_catalog_pages_render_backend_data() {
    let app = TestApp::storefront(None).await;

    let home = app.get("/").await;
    assert_eq!(home.status(), StatusCode::OK);
    assert!(home.headers().contains_key("x-request-id"));
    assert!(home.text().await.unwrap().contains("Arc Buds"));

    let audio = app.page("/products?category=10").await;
    assert!(audio.contains("Arc Speaker"));
    assert!(!audio.contains("Arc Sleeve"));

    let detail = app.page("/products/100").await;
    assert!(detail.contains("Wireless earbuds"));
    assert!(detail.contains("$129.00"));
    assert!(detail.contains("Battery"));
}

#[tokio::test]
async fn test_missing_product_is_not_found() {
    let app = TestApp::storefront(None).await;
    assert_eq!(app.get("/products/999").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.get("/no-such-page").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cart_changes_require_login() {
    let app = TestApp::storefront(None).await;

    let resp = app
        .post_form("/cart/add", &[("product_id", "100"), ("quantity", "1")])
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
    assert!(app.backend.cart_of(2).is_empty());
}

#[tokio::test]
async fn test_bad_credentials_rerender_login() {
    let app = TestApp::storefront(None).await;

    let resp = app.login(SHOPPER_EMAIL, "wrong-password").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Invalid email or password"));
    assert!(body.contains(SHOPPER_EMAIL));
}

#[tokio::test]
async fn test_admin_is_sent_to_console() {
    let app = TestApp::storefront(Some("http://127.0.0.1:3001/")).await;

    let resp = app.login(ADMIN_EMAIL, PASSWORD).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "http://127.0.0.1:3001/login");

    // No storefront session was created
    assert!(!app.page("/").await.contains("Log out"));
}

#[tokio::test]
async fn test_shopper_buys_from_cart() {
    let app = TestApp::storefront(None).await;

    let resp = app.login(SHOPPER_EMAIL, PASSWORD).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
    assert!(app.page("/").await.contains("Welcome back, Sam"));

    let resp = app
        .post_form(
            "/cart/add",
            &[("product_id", "100"), ("quantity", "2"), ("return_to", "/products/100")],
        )
        .await;
    assert_eq!(location(&resp), "/products/100");
    assert_eq!(app.backend.cart_of(2), vec![(100, 2, false)]);

    let cart = app.page("/cart").await;
    assert!(cart.contains("Arc Buds"));
    assert!(cart.contains("$258.00"));

    let mut billing = vec![
        ("first_name", "S"),
        ("last_name", "Shopper"),
        ("email", SHOPPER_EMAIL),
        ("address", "1 Market Street"),
        ("city", "Springfield"),
        ("state", "IL"),
        ("zip_code", "62701"),
        ("phone_number", "2175550100"),
    ];

    // Step one rejects short fields and keeps the shopper on the form
    let resp = app.post_form("/checkout/billing", &billing).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(resp.text().await.unwrap().contains("First name must be at least 2 characters"));

    billing[0] = ("first_name", "Sam");
    let resp = app.post_form("/checkout/billing", &billing).await;
    assert_eq!(location(&resp), "/checkout/payment");

    let resp = app
        .post_form(
            "/checkout/payment",
            &[
                ("card_number", "4242424242424242"),
                ("expiry_date", "1239"),
                ("cvv", "123"),
                ("name_on_card", "Sam Shopper"),
            ],
        )
        .await;
    assert_eq!(location(&resp), "/checkout/success");
    assert_eq!(app.backend.cart_of(2), vec![(100, 2, true)]);

    let success = app.page("/checkout/success").await;
    assert!(success.contains("Arc Buds"));
    assert!(success.contains("Springfield"));

    let orders = app.get("/orders").await;
    assert_eq!(orders.status(), StatusCode::OK);
    assert!(orders.text().await.unwrap().contains("Arc Buds"));
}

#[tokio::test]
async fn test_wishlist_toggle() {
    let app = TestApp::storefront(None).await;
    app.login(SHOPPER_EMAIL, PASSWORD).await;

    let resp = app
        .post_form("/wishlist/toggle", &[("product_id", "102")])
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(app.page("/wishlist").await.contains("Arc Speaker"));
}

#[tokio::test]
async fn test_unknown_collection_is_not_found() {
    let app = TestApp::storefront(None).await;

    let audio = app.get("/collections/10").await;
    assert_eq!(audio.status(), StatusCode::OK);
    let body = audio.text().await.unwrap();
    assert!(body.contains("Arc Buds"));
    assert!(!body.contains("Arc Sleeve"));

    assert_eq!(app.get("/collections/999").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_preferences_lead_to_curated_products() {
    let app = TestApp::storefront(None).await;

    let resp = app
        .post_form("/products/preferences", &[("categories", "11")])
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/products/curated?categories=11");

    let resp = app
        .post_form("/products/preferences", &[("categories", "10"), ("categories", "11")])
        .await;
    assert_eq!(location(&resp), "/products/curated?categories=10%2C11");

    let curated = app.page("/products/curated?categories=11").await;
    assert!(curated.contains("Arc Sleeve"));
    assert!(!curated.contains("Arc Speaker"));
    assert!(curated.contains("Carry"));

    let resp = app.post_form("/products/preferences", &[]).await;
    assert_eq!(location(&resp), "/products");
    assert!(app.page("/products").await.contains("No preferences selected"));

    let resp = app.get("/products/curated").await;
    assert_eq!(location(&resp), "/products/preferences");
}

#[tokio::test]
async fn test_cart_update_remove_and_clear() {
    let app = TestApp::storefront(None).await;
    app.login(SHOPPER_EMAIL, PASSWORD).await;

    app.post_form("/cart/add", &[("product_id", "100"), ("quantity", "1")])
        .await;
    app.post_form("/cart/add", &[("product_id", "102"), ("quantity", "1")])
        .await;
    assert_eq!(app.backend.cart_of(2), vec![(100, 1, false), (102, 1, false)]);

    let line_id = app.backend.cart_line_id(2, 100).unwrap().to_string();
    let resp = app
        .post_form("/cart/update", &[("line_id", &line_id), ("quantity", "3")])
        .await;
    assert_eq!(location(&resp), "/cart");
    assert_eq!(app.backend.cart_of(2), vec![(100, 3, false), (102, 1, false)]);
    // 3 x 129.00 + 249.50
    assert!(app.page("/cart").await.contains("$636.50"));

    let resp = app.post_form("/cart/remove", &[("product_id", "102")]).await;
    assert_eq!(location(&resp), "/cart");
    assert_eq!(app.backend.cart_of(2), vec![(100, 3, false)]);
    assert!(app.page("/cart").await.contains("Item removed from cart"));

    app.post_form("/cart/add", &[("product_id", "101"), ("quantity", "2")])
        .await;
    let resp = app.post_form("/cart/clear", &[]).await;
    assert_eq!(location(&resp), "/cart");
    assert!(app.backend.cart_of(2).is_empty());
    assert!(app.page("/cart").await.contains("Your cart has been cleared"));
}

#[tokio::test]
async fn test_empty_cart_cannot_check_out() {
    let app = TestApp::storefront(None).await;
    app.login(SHOPPER_EMAIL, PASSWORD).await;

    let resp = app.post_form("/cart/checkout", &[]).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/cart");
    assert!(app.page("/cart").await.contains("Your cart is empty"));
    assert!(app.backend.cart_of(2).is_empty());
}
