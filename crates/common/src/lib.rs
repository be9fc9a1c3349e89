//! Shared types for launchdesk.
//!
//! This crate holds the pieces every other layer depends on:
//!
//! - **Errors**: the application error taxonomy and its HTTP mapping
//! - **Config**: layered TOML + environment configuration
//! - **IDs**: entity IDs, session/invite tokens, submission codes

pub mod config;
pub mod error;
pub mod id;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
