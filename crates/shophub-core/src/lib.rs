//! # shophub-core
//!
//! Core crate for the ShopHub plugin layer. Contains configuration schemas,
//! the well-known hook names with their typed payloads, and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other ShopHub crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;

pub use error::AppError;
pub use events::HookEvent;
pub use result::AppResult;
