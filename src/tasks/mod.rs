//! Background Tasks Module
//!
//! Contains background tasks that run during service operation.
//!
//! # Tasks
//! - Filter warmup: builds the membership filter from a full store scan at
//!   startup, off the request path
//! - TTL cleanup: sweeps expired entries out of the in-memory cache store at
//!   configured intervals

mod cleanup;
mod warmup;

pub use cleanup::spawn_cleanup_task;
pub use warmup::spawn_filter_build_task;
