use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

/// Fatal configuration errors raised synchronously during chart construction.
///
/// Recoverable conditions (malformed data elements, absent payloads, overrides
/// addressed to out-of-range indices) are not errors: they are skipped or
/// treated as still-pending, with a tracing event where useful.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("chart requires at least one parameter")]
    EmptyParameters,

    #[error("color palette has no entries")]
    EmptyPalette,

    #[error("invalid range policy: {0}")]
    InvalidRangePolicy(String),
}
