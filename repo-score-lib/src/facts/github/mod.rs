//! Access to the GitHub REST API.

mod client;

pub use client::{ApiResult, Client, ClientOptions, DEFAULT_API_URL, RateLimitInfo};
