use thiserror::Error;

/// A result type for GP regression algorithm
pub type Result<T> = std::result::Result<T, GpError>;

/// An error when using a [`GaussianProcess`](crate::GaussianProcess) or one of its
/// [`CovarianceFunction`](crate::CovarianceFunction)
#[derive(Error, Debug)]
pub enum GpError {
    /// When a vector length does not match the expected dimension
    /// (input dimension for samples, parameter dimension for hyperparameters)
    #[error("Invalid parameter: expected {expected} components, got {actual}")]
    InvalidParameter {
        /// Expected number of components
        expected: usize,
        /// Actual number of components
        actual: usize,
    },
    /// When the kernel matrix is not positive-definite at the current hyperparameters
    #[error("Numerical error: {0}")]
    NumericalError(String),
    /// When a kernel name is not known by the covariance factory
    #[error("Unknown kernel: {0}")]
    UnknownKernel(String),
    #[error(transparent)]
    /// When linear algebra computation fails
    LinalgError(#[from] linfa_linalg::LinalgError),
    /// When a linfa error occurs
    #[error(transparent)]
    LinfaError(#[from] linfa::error::Error),
    /// When reading or writing a model description fails
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    /// When a model description is malformed
    #[error("Parse error at line {line}: {message}")]
    ParseError {
        /// Line number (1-based) where the error was detected
        line: usize,
        /// What went wrong
        message: String,
    },
    /// When error due to a bad value
    #[error("InvalidValue error: {0}")]
    InvalidValueError(String),
}

/// Check that a vector of `actual` components matches the `expected` dimension
pub(crate) fn check_dim(expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(GpError::InvalidParameter { expected, actual })
    }
}
