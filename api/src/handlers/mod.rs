//! Shared handler plumbing

pub mod error;

pub use error::ApiError;
