//! Boundary errors. The solvers themselves never fail; these come from the checked entry
//! points and from configuration validation.

use nalgebra::{Matrix4, Vector3};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SolverError {
    /// An input carried NaN or an infinity.
    #[error("non-finite value in input '{field}'")]
    NonFinite { field: &'static str },

    /// A [`SolverConfig`](crate::SolverConfig) failed validation.
    #[error("invalid solver config: {reason}")]
    InvalidConfig { reason: String },
}

pub type SolverResult<T> = Result<T, SolverError>;

pub(crate) fn ensure_finite(field: &'static str, value: f64) -> SolverResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SolverError::NonFinite { field })
    }
}

pub(crate) fn ensure_finite_vector(field: &'static str, value: &Vector3<f64>) -> SolverResult<()> {
    if value.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(SolverError::NonFinite { field })
    }
}

pub(crate) fn ensure_finite_matrix(field: &'static str, value: &Matrix4<f64>) -> SolverResult<()> {
    if value.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(SolverError::NonFinite { field })
    }
}
