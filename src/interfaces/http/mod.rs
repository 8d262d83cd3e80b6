//! HTTP REST API interfaces
//!
//! - `middleware`: Bearer-token authentication
//! - `modules`: DTOs and handlers per resource
//! - `router`: API router with Swagger documentation

pub mod common;
pub mod middleware;
pub mod modules;
pub mod router;

pub use router::{create_api_router, ApiDoc, RouterDeps};
