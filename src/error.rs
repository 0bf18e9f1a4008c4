use thiserror::Error;

/// Failures surfaced by the persistence layer.
///
/// Core geometry and alignment operations never fail; degenerate inputs are
/// well-defined no-ops and per-point numeric edge cases are recovered
/// locally.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid image size {width}x{height}, images must be at least 1x1")]
    InvalidImageSize { width: u32, height: u32 },

    #[error("malformed project data: {0}")]
    MalformedProject(#[from] serde_json::Error),
}
