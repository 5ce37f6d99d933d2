use orrery_config::ConfigError;
use orrery_mesh::MeshError;
use orrery_render::{BufferError, RenderContextError, ShaderError};
use orrery_scene::SceneError;

use crate::platform::PlatformError;

/// Anything that stops the application from starting or keeps it from running.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error("invalid scene: {0}")]
    Scene(#[from] SceneError),

    #[error("sphere generation failed: {0}")]
    Mesh(#[from] MeshError),

    #[error("GPU initialization failed: {0}")]
    RenderContext(#[from] RenderContextError),

    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error("sphere upload failed: {0}")]
    Buffer(#[from] BufferError),

    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("event loop failed: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}
