//! Domain types shared by the agentflow crates.

pub mod domain;
mod error;

pub use domain::*;
pub use error::CoreError;
