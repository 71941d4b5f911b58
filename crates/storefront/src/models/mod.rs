//! Session-backed models for the storefront.
//!
//! Catalog and cart payloads come from `arcverse_core`; this module holds
//! only what the storefront keeps in its own session.

pub mod flash;
pub mod page;
pub mod session;

pub use flash::{Flash, FlashKind, set_flash, take_flash};
pub use page::{PageContext, cart_count, set_cart_count};
pub use session::{CurrentUser, keys as session_keys};
