//! HTTP surface for the rate limit decision service.

mod server;
mod service;

pub use server::{router, HttpServer};
pub use service::{CheckRequest, CheckResponse, CheckStatus, ThrottledResponse};
