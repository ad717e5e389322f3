//! Request and Response models for the cache server API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{validate_key, KeysRequest, SetEntry, SetManyRequest, SetRequest};
pub use responses::{
    DeleteResponse, EntriesResponse, EntryItem, ErrorResponse, GetManyResponse, GetResponse,
    HealthResponse, KeysResponse, SetResponse, StatsResponse,
};
