//! API Module
//!
//! HTTP handlers and routing exposing a persistent cache as a REST API.

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
