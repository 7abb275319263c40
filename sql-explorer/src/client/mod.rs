//! Metadata client
//!
//! This module provides the backend-facing interface of the explorer and its
//! HTTP implementation.

pub mod http;
pub mod traits;

// Re-export the main trait and the HTTP client
pub use http::{ClientConfig, MetadataClient};
pub use traits::MetadataSource;
