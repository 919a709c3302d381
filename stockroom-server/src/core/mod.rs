//! Core module - configuration, state, and error definitions
//!
//! # Module structure
//!
//! - [`Config`] - runtime configuration from the environment
//! - [`AppState`] - shared service container
//! - [`AppError`] / [`AppResult`] - application error taxonomy

pub mod config;
pub mod error;
pub mod state;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AppState;
