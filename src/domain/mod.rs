//! Domain layer - pure values with no runtime dependencies.
//!
//! This layer contains:
//! - The document payload and its wire mapping
//! - Fixed-window parameters and their validation
//!
//! All types in this layer are plain data and easily testable.

pub mod document;
pub mod window;
