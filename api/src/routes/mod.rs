//! HTTP route handlers
//!
//! - `GET /health` probes the database
//! - `/api/v1/users` registers and reads users

pub mod health;
pub mod users;
