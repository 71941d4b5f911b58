//! ARCVERSE Core - Shared types library.
//!
//! This crate provides common types used across all ARCVERSE components:
//! - `storefront` - Public-facing e-commerce site
//! - `admin` - Role-gated administration console
//! - `cli` - Command-line tools for seeding and operating the backend
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O and no HTTP
//! clients. The backend REST API owns persistence, authentication and
//! inventory; these types mirror its JSON payloads and hold the small amount
//! of arithmetic the presentation layer performs (cart totals, form checks).
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, emails and roles
//! - [`catalog`] - Products, categories and catalog helpers
//! - [`cart`] - Cart lines, totals and order summaries
//! - [`checkout`] - Billing and payment form validation
//! - [`account`] - Users, auth responses and wishlist payloads
//! - [`payloads`] - Request bodies for user and catalog management
//! - [`preferences`] - Category preference query encoding
//! - [`secret`] - Session secret strength checks
//! - [`wire`] - Response envelopes shared by every endpoint

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod account;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod payloads;
pub mod preferences;
pub mod secret;
pub mod types;
pub mod wire;

pub use types::*;
