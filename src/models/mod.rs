//! Request, response and domain models for the catalog service
//!
//! This module defines the item domain types and the DTOs (Data Transfer
//! Objects) used for serializing/deserializing HTTP request and response bodies.

pub mod item;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use item::{Item, ItemDraft};
pub use requests::{BatchLookupRequest, CreateItemRequest, UpdateItemRequest};
pub use responses::{
    BatchLookupResponse, CreateItemResponse, DeleteItemResponse, ErrorResponse, HealthResponse,
    StatsResponse,
};
