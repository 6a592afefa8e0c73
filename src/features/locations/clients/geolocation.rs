use thiserror::Error;

/// Why the device position could not be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("We need permission to use your location.")]
    PermissionDenied,

    #[error("We couldn't determine your position. Try again in a moment.")]
    PositionUnavailable,

    #[error("Locating timed out. Try again.")]
    Timeout,

    #[error("Your browser does not support locating you automatically.")]
    Unsupported,

    #[error("Something went wrong when trying to use your location.")]
    Other,
}

impl GeolocationError {
    /// Map a W3C `GeolocationPositionError.code`; unknown codes become `Other`
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => Self::PermissionDenied,
            2 => Self::PositionUnavailable,
            3 => Self::Timeout,
            _ => Self::Other,
        }
    }

    /// Inline message shown next to the form
    pub fn message(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "We need permission to use your location.",
            Self::PositionUnavailable => {
                "We couldn't determine your position. Try again in a moment."
            }
            Self::Timeout => "Locating timed out. Try again.",
            Self::Unsupported => "Your browser does not support locating you automatically.",
            Self::Other => "Something went wrong when trying to use your location.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            GeolocationError::PermissionDenied.message(),
            "We need permission to use your location."
        );
        assert_eq!(
            GeolocationError::PositionUnavailable.message(),
            "We couldn't determine your position. Try again in a moment."
        );
        assert_eq!(
            GeolocationError::Timeout.message(),
            "Locating timed out. Try again."
        );
        assert_eq!(
            GeolocationError::Unsupported.message(),
            "Your browser does not support locating you automatically."
        );
        assert_eq!(
            GeolocationError::Other.message(),
            "Something went wrong when trying to use your location."
        );
    }

    #[test]
    fn test_display_matches_message() {
        for error in [
            GeolocationError::PermissionDenied,
            GeolocationError::PositionUnavailable,
            GeolocationError::Timeout,
            GeolocationError::Unsupported,
            GeolocationError::Other,
        ] {
            assert_eq!(error.to_string(), error.message());
        }
    }

    #[test]
    fn test_from_code() {
        assert_eq!(GeolocationError::from_code(1), GeolocationError::PermissionDenied);
        assert_eq!(
            GeolocationError::from_code(2),
            GeolocationError::PositionUnavailable
        );
        assert_eq!(GeolocationError::from_code(3), GeolocationError::Timeout);
        assert_eq!(GeolocationError::from_code(0), GeolocationError::Other);
        assert_eq!(GeolocationError::from_code(42), GeolocationError::Other);
    }
}
