//! HubSpot REST adapter
//!
//! [`HubSpotClient`] implements the core `HubSpotApi` port on top of the
//! shared [`HttpClient`](crate::http::HttpClient). Wire shapes live in
//! [`models`], rate-limit header parsing in [`rate_limit`].

pub mod client;
pub mod models;
pub mod rate_limit;

pub use client::HubSpotClient;
pub use rate_limit::{extract_rate_limit, extract_rate_limit_at};
