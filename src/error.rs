//! Error kinds surfaced by the booking engine

#[derive(thiserror::Error, Debug)]
pub enum BookingError {
    /// Missing user, item or booking. Also used to mask bookings the caller
    /// may not see.
    #[error("not found: {0}")]
    NotFound(String),
    #[error("access denied: {0}")]
    InvalidAccess(String),
    #[error("only the item owner may decide a booking: {0}")]
    BookerMismatch(String),
    #[error("item is not available for booking: {0}")]
    Unavailable(String),
    #[error("booking is already approved: {0}")]
    AlreadyDecided(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("storage failure")]
    Storage(#[from] sled::Error),
    #[error("failed to encode record: {0}")]
    Encoding(String),
    #[error("failed to decode record")]
    Decoding(#[from] minicbor::decode::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Coarse classification used by boundary layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidAccess,
    BookerMismatch,
    StatusConflict,
    InvalidArgument,
    Internal,
}

impl BookingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidAccess(_) => ErrorKind::InvalidAccess,
            Self::BookerMismatch(_) => ErrorKind::BookerMismatch,
            Self::Unavailable(_) | Self::AlreadyDecided(_) => ErrorKind::StatusConflict,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Storage(_) | Self::Encoding(_) | Self::Decoding(_) | Self::Internal(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// HTTP status the boundary reports for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) | Self::InvalidAccess(_) | Self::BookerMismatch(_) => 404,
            Self::Unavailable(_) | Self::InvalidArgument(_) => 400,
            Self::AlreadyDecided(_) => 409,
            Self::Storage(_) | Self::Encoding(_) | Self::Decoding(_) | Self::Internal(_) => 500,
        }
    }
}

impl<E: std::fmt::Display> From<minicbor::encode::Error<E>> for BookingError {
    fn from(value: minicbor::encode::Error<E>) -> Self {
        Self::Encoding(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_conflicts_share_a_kind() {
        let unavailable = BookingError::Unavailable("item_1".into());
        let decided = BookingError::AlreadyDecided("booking_1".into());

        assert_eq!(unavailable.kind(), ErrorKind::StatusConflict);
        assert_eq!(decided.kind(), ErrorKind::StatusConflict);
        assert_eq!(unavailable.status_code(), 400);
        assert_eq!(decided.status_code(), 409);
    }

    #[test]
    fn denials_are_reported_as_missing() {
        assert_eq!(BookingError::NotFound("x".into()).status_code(), 404);
        assert_eq!(BookingError::InvalidAccess("x".into()).status_code(), 404);
        assert_eq!(BookingError::BookerMismatch("x".into()).status_code(), 404);
    }
}
