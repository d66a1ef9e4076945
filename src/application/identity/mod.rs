//! Identity module: user management & authentication
//!
//! Contains the `UserService` which orchestrates login, registration and
//! the default admin bootstrap.

pub mod service;

pub use service::{AuthResult, UserService};
