// adxview-api: Async Rust client for the ad-exchange reporting backend.

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod reports;
pub mod transport;

pub use client::ReportsClient;
pub use error::Error;
