#![forbid(unsafe_code)]

//! Errors reported by host collaborators.

/// Failure of a platform call made through one of the collaborator traits.
///
/// The orchestrator never propagates these: every call site logs the error
/// and leaves its own state as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The surface is not attached to the root.
    SurfaceNotAttached,
    /// The surface is already attached to the root.
    SurfaceAlreadyAttached,
    /// The light sensor is missing or refused the registration.
    SensorUnavailable,
    /// Any other platform failure, with a human-readable reason.
    Platform(String),
}

impl HostError {
    /// Shorthand for [`HostError::Platform`].
    pub fn platform(reason: impl Into<String>) -> Self {
        Self::Platform(reason.into())
    }
}

impl std::fmt::Display for HostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SurfaceNotAttached => write!(f, "surface is not attached to the root"),
            Self::SurfaceAlreadyAttached => write!(f, "surface is already attached to the root"),
            Self::SensorUnavailable => write!(f, "light sensor is unavailable"),
            Self::Platform(reason) => write!(f, "platform call failed: {reason}"),
        }
    }
}

impl std::error::Error for HostError {}
