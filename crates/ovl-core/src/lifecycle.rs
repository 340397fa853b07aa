#![forbid(unsafe_code)]

//! Host lifecycle states and events.

/// Lifecycle state of the host window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostState {
    /// Nothing has been delivered yet.
    #[default]
    Unknown,
    /// Created but never resumed.
    Created,
    /// In the foreground and interactive.
    Resumed,
    /// Backgrounded or occluded.
    Paused,
    /// Torn down; no further events are expected.
    Destroyed,
}

impl HostState {
    /// Whether the host is resumed (the only state in which the camera may open).
    #[inline]
    pub const fn is_resumed(self) -> bool {
        matches!(self, Self::Resumed)
    }
}

/// Screen orientation reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
    ReversePortrait,
    ReverseLandscape,
}

impl Orientation {
    /// Whether this is one of the two portrait orientations.
    #[inline]
    pub const fn is_portrait(self) -> bool {
        matches!(self, Self::Portrait | Self::ReversePortrait)
    }
}

/// A notification fanned out to every surface that follows the host lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Created,
    Paused,
    Resumed,
    Destroyed,
    /// A configuration change carrying the new orientation.
    OrientationChanged(Orientation),
}

impl LifecycleEvent {
    /// The host state this event moves to, if it is a state transition.
    pub const fn target_state(self) -> Option<HostState> {
        match self {
            Self::Created => Some(HostState::Created),
            Self::Paused => Some(HostState::Paused),
            Self::Resumed => Some(HostState::Resumed),
            Self::Destroyed => Some(HostState::Destroyed),
            Self::OrientationChanged(_) => None,
        }
    }
}
