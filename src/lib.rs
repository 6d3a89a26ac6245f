//! Data-access layer for the mflix `comments`, `users` and `sessions`
//! collections.
//!
//! Every operation takes a shared [`database::MongoDB`] handle and returns a
//! [`utils::AppError`] on failure. The HTTP surface in [`api`] is a thin
//! wrapper used by the `mflix-data-service` binary.

pub mod api;
pub mod config;
pub mod database;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use database::MongoDB;
pub use utils::AppError;
