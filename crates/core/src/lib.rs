//! Bakehouse Core - Shared types library.
//!
//! This crate provides common types used across the Bakehouse components:
//! - `storefront` - JSON API serving the bakery storefront
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP. This keeps it lightweight and allows it to be used
//! anywhere, and lets the cart aggregate be tested without a running server.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, and emails
//! - [`cart`] - Session-scoped cart aggregate with pure reducer functions

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use types::*;
