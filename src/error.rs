use std::time::Duration;

/// Error type for ros-nix-expression operations.
///
/// All variants describe failures of the external checksum oracle; the
/// rest of the crate resolves, recognizes, and renders without erroring.
/// Callers of [`crate::NixExpression::render`] never see these directly —
/// the renderer recovers by falling back to the tarball checksum.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// The prefetch executable could not be started.
    #[error("failed to run checksum prefetch: {0}")]
    PrefetchSpawn(String),

    /// The prefetch process exited with a non-zero status.
    #[error("checksum prefetch exited with {status}: {stderr}")]
    PrefetchExit {
        /// Exit status as reported by the process.
        status: String,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// The prefetch process did not finish within the configured deadline.
    #[error("checksum prefetch timed out after {0:?}")]
    PrefetchTimeout(Duration),

    /// The prefetch process produced output that is not a usable checksum.
    #[error("invalid checksum prefetch output: {0}")]
    PrefetchOutput(String),
}

/// Result type for ros-nix-expression operations.
pub type Result<T> = std::result::Result<T, Error>;
