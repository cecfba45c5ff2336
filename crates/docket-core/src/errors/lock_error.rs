/// Cross-process lock errors.
///
/// Subsystem errors convert these into their own `LockTimeout` and
/// `Persistence` variants.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("timed out after {waited_ms}ms waiting for lock {path}")]
    Timeout { path: String, waited_ms: u64 },

    #[error("lock file {path} unusable: {message}")]
    Io { path: String, message: String },
}
