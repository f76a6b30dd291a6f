//! # notewise-core
//!
//! Core types, traits, and error taxonomy for the notewise AI assistant.
//!
//! This crate provides the data structures and the [`AiService`] capability
//! contract that the provider crate implements and the application consumes.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{AiError, Error, ErrorKind, Result};
pub use models::*;
pub use traits::*;
