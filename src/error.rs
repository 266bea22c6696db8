use thiserror::Error;

/// Errors surfaced by the public cache operations.
///
/// Reads (`get`, `get_with_ttl`) never return these; they degrade L2
/// failures to misses. Writes (`set`, `delete`, `clear`) propagate them.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Rejected at construction time, e.g. L2 enabled without an endpoint.
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    /// A mandatory L2 call failed (initial ping or a write-path command).
    #[error("L2 store unreachable: {0}")]
    L2Unreachable(String),

    /// The entry envelope could not be encoded or decoded.
    #[error("envelope serialization failed: {0}")]
    SerializationFailed(String),

    /// The operation was cancelled, e.g. invoked after `close`.
    #[error("operation cancelled")]
    Cancelled,
}
