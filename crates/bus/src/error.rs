use thiserror::Error;

/// Crate-wide result type for bus operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// `send` was called before `start` or after `stop`.
    #[error("message bus is not running")]
    NotRunning,
}
