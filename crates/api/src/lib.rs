//! HTTP API: controller, router, validation, and auth gating.

pub mod app;
pub mod middleware;
