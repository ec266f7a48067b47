//! API Module
//!
//! HTTP handlers and routing for the catalog service REST API.
//!
//! # Endpoints
//! - `GET /items/:id` - Look up one item
//! - `POST /items/batch` - Look up several items at once
//! - `POST /items` - Create an item
//! - `PUT /items/:id` - Update an item
//! - `DELETE /items/:id` - Delete an item
//! - `GET /stats` - Get caching-layer statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
