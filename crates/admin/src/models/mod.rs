//! Session-backed models for the admin console.

pub mod flash;
pub mod page;
pub mod session;

pub use flash::{Flash, FlashKind, set_flash, take_flash};
pub use page::{AdminPage, AdminUserView};
pub use session::{CurrentAdmin, keys as session_keys};
