//! Error types for Clinicloud

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClinicError {
    #[error("Validation error: {0}")]
    Validation(String),
}
