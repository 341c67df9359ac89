//! Clinicloud Shared Types
//!
//! This crate contains the domain vocabulary shared across the Clinicloud
//! platform: registration roles, billing periods and site counts.

pub mod error;
pub mod types;

pub use error::*;
pub use types::*;
