//! Checkout route handlers.
//!
//! Two steps: billing details (kept in the session) then card details
//! (validated for shape only, never stored). Placing an order marks the
//! cart rows as ordered on the backend and leaves an [`OrderSummary`] in
//! the session for the success page. `POST /cart/checkout` places the
//! order directly from the cart page without the two steps.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tower_sessions::Session;
use tracing::instrument;

use arcverse_core::cart::{CartLine, OrderSummary, generate_order_id, orderable_line_ids};
use arcverse_core::checkout::{
    BillingDetails, FieldErrors, PaymentDetails, format_card_number, format_expiry_date,
};

use super::cart::{CartView, load_cart};
use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, Flash, PageContext, session_keys, set_cart_count, set_flash};
use crate::state::AppState;

const PLACE_ORDER_FAILED: &str = "Failed to place order. Please try again.";

/// Billing step template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/billing.html")]
pub struct BillingTemplate {
    pub page: PageContext,
    pub billing: BillingDetails,
    pub errors: FieldErrors,
    pub cart: CartView,
}

/// Payment step template. The CVV is never echoed back.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/payment.html")]
pub struct PaymentTemplate {
    pub page: PageContext,
    pub billing: BillingDetails,
    pub card_number: String,
    pub expiry_date: String,
    pub name_on_card: String,
    pub errors: FieldErrors,
    pub cart: CartView,
}

/// Order confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/success.html")]
pub struct SuccessTemplate {
    pub page: PageContext,
    pub order: OrderSummary,
}

/// Billing form prefilled from the signed-in user.
fn billing_for(user: &CurrentUser) -> BillingDetails {
    let mut names = user.name.split_whitespace();
    BillingDetails {
        first_name: names.next().unwrap_or_default().to_string(),
        last_name: names.collect::<Vec<_>>().join(" "),
        email: user.email.clone(),
        ..BillingDetails::default()
    }
}

async fn stored_billing(session: &Session) -> Option<BillingDetails> {
    session
        .get::<BillingDetails>(session_keys::BILLING)
        .await
        .ok()
        .flatten()
}

/// Load the cart for a checkout step, or the redirect to send instead.
async fn checkout_cart(
    state: &AppState,
    session: &Session,
    user: &CurrentUser,
) -> Result<Vec<CartLine>, Redirect> {
    match load_cart(state, session, user.id).await {
        Ok(lines) if lines.is_empty() => {
            set_flash(session, Flash::error("Your cart is empty")).await;
            Err(Redirect::to("/cart"))
        }
        Ok(lines) => Ok(lines),
        Err(e) => {
            tracing::error!("Failed to fetch cart for checkout: {e}");
            set_flash(session, Flash::error("Failed to load cart")).await;
            Err(Redirect::to("/cart"))
        }
    }
}

/// Step one: billing form.
#[instrument(skip(state, session, user))]
pub async fn billing_page(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Response {
    let lines = match checkout_cart(&state, &session, &user).await {
        Ok(lines) => lines,
        Err(redirect) => return redirect.into_response(),
    };

    let billing = stored_billing(&session)
        .await
        .unwrap_or_else(|| billing_for(&user));

    BillingTemplate {
        page: PageContext::load(&session).await,
        billing,
        errors: FieldErrors::new(),
        cart: CartView::from_lines(&lines),
    }
    .into_response()
}

/// Validate billing details and move on to payment.
#[instrument(skip(state, session, user, billing))]
pub async fn submit_billing(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(billing): Form<BillingDetails>,
) -> Response {
    if let Err(errors) = billing.validate() {
        let lines = match checkout_cart(&state, &session, &user).await {
            Ok(lines) => lines,
            Err(redirect) => return redirect.into_response(),
        };
        let template = BillingTemplate {
            page: PageContext::load(&session).await,
            billing,
            errors,
            cart: CartView::from_lines(&lines),
        };
        return (StatusCode::UNPROCESSABLE_ENTITY, template).into_response();
    }

    if let Err(e) = session.insert(session_keys::BILLING, &billing).await {
        tracing::error!("Failed to store billing details: {e}");
        set_flash(&session, Flash::error("Something went wrong. Please try again.")).await;
        return Redirect::to("/checkout").into_response();
    }

    Redirect::to("/checkout/payment").into_response()
}

/// Step two: payment form. Requires billing details from step one.
#[instrument(skip(state, session, user))]
pub async fn payment_page(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Response {
    let Some(billing) = stored_billing(&session).await else {
        return Redirect::to("/checkout").into_response();
    };
    let lines = match checkout_cart(&state, &session, &user).await {
        Ok(lines) => lines,
        Err(redirect) => return redirect.into_response(),
    };

    PaymentTemplate {
        page: PageContext::load(&session).await,
        name_on_card: billing.full_name(),
        billing,
        card_number: String::new(),
        expiry_date: String::new(),
        errors: FieldErrors::new(),
        cart: CartView::from_lines(&lines),
    }
    .into_response()
}

/// Validate card details and place the order.
///
/// Card number and expiry are normalised the way the form formats them as
/// the shopper types, so raw digits are accepted too.
#[instrument(skip(state, session, user, payment))]
pub async fn submit_payment(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(mut payment): Form<PaymentDetails>,
) -> Response {
    let Some(billing) = stored_billing(&session).await else {
        return Redirect::to("/checkout").into_response();
    };

    payment.card_number = format_card_number(&payment.card_number);
    payment.expiry_date = format_expiry_date(&payment.expiry_date);

    if let Err(errors) = payment.validate() {
        let lines = match checkout_cart(&state, &session, &user).await {
            Ok(lines) => lines,
            Err(redirect) => return redirect.into_response(),
        };
        let template = PaymentTemplate {
            page: PageContext::load(&session).await,
            billing,
            card_number: payment.card_number,
            expiry_date: payment.expiry_date,
            name_on_card: payment.name_on_card,
            errors,
            cart: CartView::from_lines(&lines),
        };
        return (StatusCode::UNPROCESSABLE_ENTITY, template).into_response();
    }

    tracing::info!(card = %payment.last_four(), "Payment details accepted");
    place_order(&state, &session, &user, Some(billing))
        .await
        .into_response()
}

/// Place the order straight from the cart page.
#[instrument(skip(state, session, user))]
pub async fn place_from_cart(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Redirect {
    let billing = stored_billing(&session).await;
    place_order(&state, &session, &user, billing).await
}

/// Mark every cart line as ordered and remember the summary.
async fn place_order(
    state: &AppState,
    session: &Session,
    user: &CurrentUser,
    billing: Option<BillingDetails>,
) -> Redirect {
    let lines = match state.api().get_cart(user.id).await {
        Ok(lines) => lines,
        Err(e) => {
            tracing::error!("Failed to fetch cart for order: {e}");
            set_flash(session, Flash::error(PLACE_ORDER_FAILED)).await;
            return Redirect::to("/cart");
        }
    };

    let line_ids = match orderable_line_ids(&lines) {
        Ok(ids) => ids,
        Err(e) => {
            tracing::warn!("Checkout rejected: {e}");
            set_flash(session, Flash::error(e.to_string())).await;
            return Redirect::to("/cart");
        }
    };

    if let Err(e) = state.api().mark_ordered(&line_ids).await {
        tracing::error!("Failed to mark cart as ordered: {e}");
        set_flash(session, Flash::error(PLACE_ORDER_FAILED)).await;
        return Redirect::to("/cart");
    }

    let order_id = generate_order_id(&mut rand::rng());
    let summary = OrderSummary::from_cart(order_id, &lines, billing, Utc::now());
    tracing::info!(order_id = %summary.order_id, items = summary.item_count(), "Order placed");
    add_breadcrumb(
        "checkout",
        "Order placed",
        Some(&[("order_id", summary.order_id.as_str())]),
    );

    let stored = match session.insert(session_keys::LAST_ORDER, &summary).await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Failed to store order summary: {e}");
            false
        }
    };
    if let Err(e) = session.remove::<BillingDetails>(session_keys::BILLING).await {
        tracing::warn!("Failed to clear billing details: {e}");
    }
    set_cart_count(session, 0).await;

    let (target, notice) = confirmation(&summary.order_id, stored);
    if let Some(notice) = notice {
        set_flash(session, notice).await;
    }
    Redirect::to(target)
}

/// Where to send the shopper after a placed order. The success page needs
/// the stored summary; without it the order history confirms the order.
fn confirmation(order_id: &str, summary_stored: bool) -> (&'static str, Option<Flash>) {
    if summary_stored {
        ("/checkout/success", None)
    } else {
        (
            "/orders",
            Some(Flash::success(format!(
                "Order #{order_id} placed successfully"
            ))),
        )
    }
}

/// Order confirmation. Without a placed order there is nothing to show.
#[instrument(skip(session))]
pub async fn success(session: Session) -> Response {
    let order = session
        .get::<OrderSummary>(session_keys::LAST_ORDER)
        .await
        .ok()
        .flatten();

    match order {
        Some(order) => SuccessTemplate {
            page: PageContext::load(&session).await,
            order,
        }
        .into_response(),
        None => Redirect::to("/").into_response(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use arcverse_core::{UserId, UserRole};

    fn user(name: &str) -> CurrentUser {
        CurrentUser {
            id: UserId::new(7),
            name: name.to_string(),
            email: "ada@example.com".to_string(),
            role: UserRole::User,
        }
    }

    #[test]
    fn test_confirmation_without_stored_summary() {
        assert_eq!(confirmation("482913", true), ("/checkout/success", None));

        let (target, notice) = confirmation("482913", false);
        assert_eq!(target, "/orders");
        assert_eq!(
            notice,
            Some(Flash::success("Order #482913 placed successfully"))
        );
    }

    #[test]
    fn test_billing_prefill_splits_name() {
        let billing = billing_for(&user("Ada King Lovelace"));
        assert_eq!(billing.first_name, "Ada");
        assert_eq!(billing.last_name, "King Lovelace");
        assert_eq!(billing.email, "ada@example.com");
        assert!(billing.address.is_empty());
    }

    #[test]
    fn test_billing_prefill_single_name() {
        let billing = billing_for(&user("Ada"));
        assert_eq!(billing.first_name, "Ada");
        assert_eq!(billing.last_name, "");
    }
}
