//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use arcverse_core::catalog::{BEST_SELLER_COUNT, Category, best_sellers};

use super::products::{ProductCard, product_cards};
use crate::filters;
use crate::models::PageContext;
use crate::state::AppState;

/// A hero banner on the home page.
#[derive(Clone, Debug)]
pub struct HeroSlide {
    pub eyebrow: &'static str,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub button_text: &'static str,
    pub button_url: &'static str,
}

/// Static hero banners.
pub const HERO_SLIDES: &[HeroSlide] = &[
    HeroSlide {
        eyebrow: "New Season",
        title: "Gear for the everyday orbit",
        subtitle: "Tech, audio and carry essentials, designed to move with you.",
        button_text: "Shop Now",
        button_url: "/products",
    },
    HeroSlide {
        eyebrow: "Curated for you",
        title: "Let us pick for you",
        subtitle: "Tell us what you're into and we'll build your edit.",
        button_text: "Set Preferences",
        button_url: "/products/preferences",
    },
];

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub page: PageContext,
    pub hero: &'static [HeroSlide],
    pub best_sellers: Vec<ProductCard>,
    pub categories: Vec<Category>,
}

/// Display the home page.
#[instrument(skip(state, session))]
pub async fn home(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let mut page = PageContext::load(&session).await;

    let categories = state.api().list_categories().await.unwrap_or_else(|e| {
        tracing::warn!("Failed to fetch categories: {e}");
        Vec::new()
    });

    let products = match state.api().list_products().await {
        Ok(products) => best_sellers(&products, BEST_SELLER_COUNT),
        Err(e) => {
            tracing::error!("Failed to fetch best sellers: {e}");
            page.fail_soft("Failed to load products");
            Vec::new()
        }
    };

    HomeTemplate {
        page,
        hero: HERO_SLIDES,
        best_sellers: product_cards(&products, &categories),
        categories,
    }
}
