//! Request and response bodies

pub mod user;

pub use user::{CreateUserRequest, UserResponse};
