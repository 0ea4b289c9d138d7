//! Floodgate - Per-Key Rate Limiting Service
//!
//! This crate implements a fixed-window rate limiter for low-value abuse
//! deterrence. Attempts are counted per composite key (for example
//! `subscribe:ip:1.2.3.4`) and denied once the configured budget for the
//! current window is spent. The limiter is usable as a library and is also
//! exposed through a small HTTP decision service that surfaces denials as
//! `429` responses with a `Retry-After` hint.

pub mod config;
pub mod error;
pub mod http;
pub mod limit;
