use thiserror::Error;

/// Failures raised by the scoring pipeline.
///
/// None of these are recovered internally: a failing candidate is reported to
/// the caller, which decides whether to perturb and retry.
#[derive(Error, Debug)]
pub enum SgoopError {
    /// Projection has zero range, or the reaction coordinate cannot be normalized.
    #[error("Degenerate projection: {0}")]
    DegenerateProjection(String),
    /// Zero denominator while estimating the rate prefactor.
    #[error("Division by zero: {0}")]
    DivisionByZero(String),
    /// A visited reference bin carries no probability mass.
    #[error("Zero weight in reference bin {bin}")]
    ZeroWeightBin { bin: usize },
    /// Eigendecomposition failed or the matrix is unusable.
    #[error("Numeric failure: {0}")]
    NumericFailure(String),
    /// Malformed trajectory input.
    #[error("Load error: {0}")]
    Load(String),
    /// Invalid settings or mismatched dimensions.
    #[error("Configuration error: {0}")]
    Config(String),
    /// I/O error when reading or writing files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SgoopError>;
