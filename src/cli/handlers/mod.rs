//! CLI command handlers module
//!
//! This module is organized by functional domains:
//! - serve: HTTP analysis service
//! - analyze: submit a ticket from stdin to a running service
//! - seed: populate the similarity index
//! - info: configuration display

pub mod analyze;
pub mod info;
pub mod seed;
pub mod serve;

// Re-export all public handlers
pub use analyze::*;
pub use info::*;
pub use seed::*;
pub use serve::*;
