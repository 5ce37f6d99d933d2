//! The three scene shaders, compiled once at startup.
//!
//! Sources are embedded in the binary. A library built with an override
//! directory compiles `<dir>/<name>.wgsl` instead when that file exists; an
//! override that does not validate falls back to the embedded source.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info, warn};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneShader {
    /// Phong-lit textured bodies and rings.
    Lit,
    /// Unlit textured sphere for the sun.
    Emissive,
    /// Full-screen starfield quad.
    Background,
}

impl SceneShader {
    pub const ALL: [SceneShader; 3] = [Self::Lit, Self::Emissive, Self::Background];

    pub fn name(self) -> &'static str {
        match self {
            Self::Lit => "lit",
            Self::Emissive => "emissive",
            Self::Background => "background",
        }
    }

    pub fn builtin_source(self) -> &'static str {
        match self {
            Self::Lit => include_str!("shaders/lit.wgsl"),
            Self::Emissive => include_str!("shaders/emissive.wgsl"),
            Self::Background => include_str!("shaders/background.wgsl"),
        }
    }

    fn override_path(self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.wgsl", self.name()))
    }
}

impl fmt::Display for SceneShader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("failed to read shader override {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("shader '{name}' failed to compile: {message}")]
    Compile { name: String, message: String },

    #[error("shader '{0}' has not been compiled")]
    NotCompiled(SceneShader),
}

#[derive(Default)]
pub struct ShaderLibrary {
    modules: HashMap<SceneShader, Arc<wgpu::ShaderModule>>,
    override_dir: Option<PathBuf>,
    /// Shaders currently compiled from an override file.
    overridden: HashSet<SceneShader>,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_override_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.override_dir = Some(dir.into());
        self
    }

    /// Contents of `<dir>/<name>.wgsl`, if an override dir is set and the file exists.
    pub fn override_source(&self, shader: SceneShader) -> Result<Option<String>, ShaderError> {
        let Some(dir) = &self.override_dir else {
            return Ok(None);
        };
        let path = shader.override_path(dir);
        if !path.is_file() {
            return Ok(None);
        }
        std::fs::read_to_string(&path)
            .map(Some)
            .map_err(|source| ShaderError::Read { path, source })
    }

    /// WGSL for `shader`: the override file if present, else the embedded source.
    pub fn source(&self, shader: SceneShader) -> Result<String, ShaderError> {
        Ok(self
            .override_source(shader)?
            .unwrap_or_else(|| shader.builtin_source().to_owned()))
    }

    pub fn is_overridden(&self, shader: SceneShader) -> bool {
        self.overridden.contains(&shader)
    }

    /// Compile `shader`, replacing any earlier module for it.
    ///
    /// An override that fails validation is logged and the embedded source is
    /// compiled instead.
    pub fn compile(
        &mut self,
        device: &wgpu::Device,
        shader: SceneShader,
    ) -> Result<Arc<wgpu::ShaderModule>, ShaderError> {
        let from_override = match self.override_source(shader)? {
            Some(source) => match compile_checked(device, shader.name(), &source) {
                Ok(module) => Some(module),
                Err(err) => {
                    warn!("{err}; using the built-in '{shader}' shader");
                    None
                }
            },
            None => None,
        };
        let module = match from_override {
            Some(module) => {
                info!("Using shader override for '{shader}'");
                self.overridden.insert(shader);
                module
            }
            None => {
                self.overridden.remove(&shader);
                compile_checked(device, shader.name(), shader.builtin_source())?
            }
        };

        let module = Arc::new(module);
        if self.modules.insert(shader, Arc::clone(&module)).is_some() {
            info!("Recompiled shader '{shader}'");
        } else {
            debug!("Compiled shader '{shader}'");
        }
        Ok(module)
    }

    pub fn compile_all(&mut self, device: &wgpu::Device) -> Result<(), ShaderError> {
        for shader in SceneShader::ALL {
            self.compile(device, shader)?;
        }
        Ok(())
    }

    pub fn get(&self, shader: SceneShader) -> Result<Arc<wgpu::ShaderModule>, ShaderError> {
        self.modules
            .get(&shader)
            .cloned()
            .ok_or(ShaderError::NotCompiled(shader))
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Create a module, turning WGSL validation errors into [`ShaderError::Compile`]
/// instead of leaving them to the device's uncaptured-error handler.
pub fn compile_checked(
    device: &wgpu::Device,
    name: &str,
    source: &str,
) -> Result<wgpu::ShaderModule, ShaderError> {
    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(name),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    match pollster::block_on(scope.pop()) {
        None => Ok(module),
        Some(err) => Err(ShaderError::Compile {
            name: name.to_string(),
            message: err.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::create_test_device_queue;

    #[test]
    fn test_uncompiled_shader_is_error() {
        let library = ShaderLibrary::new();
        assert!(library.is_empty());
        assert!(matches!(
            library.get(SceneShader::Emissive),
            Err(ShaderError::NotCompiled(SceneShader::Emissive))
        ));
    }

    #[test]
    fn test_builtin_sources_declare_entry_points() {
        for shader in SceneShader::ALL {
            let source = shader.builtin_source();
            assert!(source.contains("fn vs_main"), "{shader}");
            assert!(source.contains("fn fs_main"), "{shader}");
        }
    }

    #[test]
    fn test_override_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("lit.wgsl"), "// tinted").unwrap();
        let library = ShaderLibrary::new().with_override_dir(dir.path());

        assert_eq!(library.source(SceneShader::Lit).unwrap(), "// tinted");
        assert_eq!(
            library.source(SceneShader::Background).unwrap(),
            SceneShader::Background.builtin_source()
        );
    }

    #[test]
    fn test_missing_override_dir_uses_builtin() {
        let library = ShaderLibrary::new().with_override_dir("/nonexistent/orrery/shaders");
        assert_eq!(
            library.source(SceneShader::Emissive).unwrap(),
            SceneShader::Emissive.builtin_source()
        );
    }

    #[test]
    fn test_malformed_override_falls_back_to_builtin() {
        let Some((device, _queue)) = create_test_device_queue() else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("lit.wgsl"), "fn vs_main( {").unwrap();
        std::fs::write(
            dir.path().join("background.wgsl"),
            SceneShader::Background.builtin_source(),
        )
        .unwrap();

        let mut library = ShaderLibrary::new().with_override_dir(dir.path());
        library.compile_all(&device).unwrap();
        assert_eq!(library.len(), 3);
        assert!(!library.is_overridden(SceneShader::Lit));
        assert!(library.is_overridden(SceneShader::Background));
        assert!(!library.is_overridden(SceneShader::Emissive));
    }

    #[test]
    fn test_invalid_wgsl_is_compile_error() {
        let Some((device, _queue)) = create_test_device_queue() else {
            return;
        };
        let err = compile_checked(&device, "broken", "@vertex fn vs_main( {").unwrap_err();
        assert!(matches!(&err, ShaderError::Compile { name, .. } if name == "broken"));
    }

    #[test]
    fn test_builtin_shaders_compile() {
        let Some((device, _queue)) = create_test_device_queue() else {
            return;
        };
        let mut library = ShaderLibrary::new();
        library.compile_all(&device).unwrap();
        assert_eq!(library.len(), 3);

        let first = library.get(SceneShader::Lit).unwrap();
        let again = library.compile(&device, SceneShader::Lit).unwrap();
        assert!(!Arc::ptr_eq(&first, &again));
        assert_eq!(library.len(), 3);
    }
}
