use thiserror::Error;

/// Failures reported by a venue gateway
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VenueError {
    /// Network failure, timeout or rate limit. Worth retrying.
    #[error("Venue unavailable: {0}")]
    Unavailable(String),

    /// The venue understood the request and refused it
    #[error("Venue API error {code}: {message}")]
    Api { code: String, message: String },

    #[error("Not found on venue: {0}")]
    NotFound(String),

    /// The call was given up locally, e.g. on shutdown. Not retried.
    #[error("Venue call aborted: {0}")]
    Aborted(String),
}

impl VenueError {
    pub fn is_transient(&self) -> bool {
        matches!(self, VenueError::Unavailable(_))
    }
}

pub type VenueResult<T> = std::result::Result<T, VenueError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_unavailable_is_transient() {
        assert!(VenueError::Unavailable("timeout".into()).is_transient());
        assert!(
            !VenueError::Api {
                code: "30042".into(),
                message: "not enough assets".into()
            }
            .is_transient()
        );
        assert!(!VenueError::NotFound("order".into()).is_transient());
        assert!(!VenueError::Aborted("shutdown".into()).is_transient());
    }
}
