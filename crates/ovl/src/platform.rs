#![forbid(unsafe_code)]

//! The bundle of host collaborators an orchestrator drives.

use ovl_core::{
    CameraView, ContentLayer, LightSensor, LockScreen, PermissionGate, ProgressView, SurfaceHost,
    ThemeSink,
};

/// Every platform collaborator, boxed.
///
/// The orchestrator owns these for its whole life. Hosts that need to look
/// at them afterwards keep shared handles inside their own implementations.
pub struct Platform {
    pub host: Box<dyn SurfaceHost>,
    pub content: Box<dyn ContentLayer>,
    pub camera: Box<dyn CameraView>,
    pub lock: Box<dyn LockScreen>,
    pub progress: Box<dyn ProgressView>,
    pub sensor: Box<dyn LightSensor>,
    pub theme: Box<dyn ThemeSink>,
    pub permissions: Box<dyn PermissionGate>,
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform")
            .field("content", &self.content.surface())
            .field("camera", &self.camera.surface())
            .field("lock", &self.lock.surface())
            .field("progress", &self.progress.surface())
            .finish_non_exhaustive()
    }
}
