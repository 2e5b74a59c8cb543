//! Tubely API
//!
//! Thin HTTP surface over the upload pipeline: bearer identity resolution, JSON
//! video record routes, the multipart upload route and local media serving.

pub mod auth;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;
pub mod telemetry;
