//! Flat key/value settings consumed by the storefront, cached with the
//! same named materialized-view mechanism as the category tree (single
//! entry, 24-hour TTL, fully evicted on any write).

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::SettingsService;
