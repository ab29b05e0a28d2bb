//! v1 API Data Transfer Objects.
//!
//! These types define the wire format for the v1 REST API. They are kept
//! separate from the internal domain models in `src/models/` and handle
//! serialization, deserialization, and domain-model conversion.

pub mod activity;
pub mod admin;
pub mod recommendations;

// Re-export all public types for convenient access via `dto::*`.
pub use activity::*;
pub use admin::*;
pub use recommendations::*;
