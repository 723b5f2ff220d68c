//! rigctl common types, IDs, and errors.
//!
//! This crate provides foundational types shared across rig-core modules:
//! - Action identity types (`ActionId`, `IdAllocator`)
//! - The unified error type with stable categories

pub mod error;
pub mod id;

pub use error::{Error, ErrorCategory, Result, StructuredError};
pub use id::{ActionId, IdAllocator};
