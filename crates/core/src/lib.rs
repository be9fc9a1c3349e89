//! Core business logic for launchdesk.

pub mod services;

pub use services::*;
