/// Convenience result type used across pigment.
pub type PigmentResult<T> = Result<T, PigmentError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Identity-tag mismatches on buffers and surfaces are not represented here: they are caller
/// misuse and abort through a debug assertion instead.
#[derive(thiserror::Error, Debug)]
pub enum PigmentError {
    /// A pool could not supply backing storage.
    #[error("allocation failure: {0}")]
    AllocationFailure(String),

    /// Unrecognized format or zero-extent size request.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// Logical surface format cannot be derived from the buffer's storage format.
    #[error("incompatible format: {0}")]
    IncompatibleFormat(String),

    /// No converter registered for a requested (source, angle, destination) triple.
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed draw or conversion parameters.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Wrapped lower-level error from collaborators.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PigmentError {
    /// Build a [`PigmentError::AllocationFailure`] value.
    pub fn allocation(msg: impl Into<String>) -> Self {
        Self::AllocationFailure(msg.into())
    }

    /// Build a [`PigmentError::InvalidFormat`] value.
    pub fn invalid_format(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }

    /// Build a [`PigmentError::IncompatibleFormat`] value.
    pub fn incompatible_format(msg: impl Into<String>) -> Self {
        Self::IncompatibleFormat(msg.into())
    }

    /// Build a [`PigmentError::NotFound`] value.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Build a [`PigmentError::InvalidArgument`] value.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
