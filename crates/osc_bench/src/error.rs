use {
    crate::OptionsError,
    osc_core::RmaError,
    osc_verifier::ValidationError,
    thiserror::Error,
};

/// A failure that ends the run. Validation mismatches are not errors; they surface in the
/// summary and the exit code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BenchError {
    #[error(transparent)]
    Options(#[from] OptionsError),
    #[error("synchronization failed: {0}")]
    Rma(#[from] RmaError),
    #[error("validation could not run: {0}")]
    Validation(#[from] ValidationError),
    #[error("cannot write the report: {0}")]
    Io(#[from] std::io::Error),
}
