//! Request and Response models for the cache API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{ForceFetchRequest, MutateRequest, RegisterRequest};
pub use responses::{
    ErrorResponse, ForceFetchResponse, HealthResponse, MutateResponse, ReadResponse,
    RegisterResponse, StatsResponse, SubscriptionResponse, UnregisterResponse,
};
