//! Per-user directories for the config file and debug logs.

use std::path::{Path, PathBuf};

const APP_NAME: &str = "orrery";

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("could not determine the OS configuration directory")]
    NoConfigDir,

    #[error("failed to create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where the app keeps its files. Follows the OS convention via `dirs`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformDirs {
    /// Holds `config.ron`.
    pub config_dir: PathBuf,
    /// JSON logs from debug builds.
    pub log_dir: PathBuf,
}

impl PlatformDirs {
    /// Resolve without touching the disk.
    pub fn resolve() -> Result<Self, PlatformError> {
        let config_dir = orrery_config::default_config_dir().ok_or(PlatformError::NoConfigDir)?;
        let log_dir = match dirs::data_local_dir() {
            Some(base) => base.join(APP_NAME).join("logs"),
            None => config_dir.join("logs"),
        };
        Ok(Self {
            config_dir,
            log_dir,
        })
    }

    /// Everything under `root`, for tests and `--config` overrides.
    pub fn resolve_with_root(root: &Path) -> Self {
        Self {
            config_dir: root.to_path_buf(),
            log_dir: root.join("logs"),
        }
    }

    pub fn create_dirs(&self) -> Result<(), PlatformError> {
        for dir in [&self.config_dir, &self.log_dir] {
            std::fs::create_dir_all(dir).map_err(|source| PlatformError::CreateDir {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_dirs_are_absolute_and_named() {
        let Ok(dirs) = PlatformDirs::resolve() else {
            return;
        };
        assert!(dirs.config_dir.is_absolute());
        assert!(dirs.log_dir.is_absolute());
        assert!(dirs.config_dir.ends_with(APP_NAME));
        assert!(dirs.log_dir.ends_with("logs"));
    }

    #[test]
    fn test_root_override_layout() {
        let dirs = PlatformDirs::resolve_with_root(Path::new("/tmp/orrery-cfg"));
        assert_eq!(dirs.config_dir, PathBuf::from("/tmp/orrery-cfg"));
        assert_eq!(dirs.log_dir, Path::new("/tmp/orrery-cfg").join("logs"));
    }

    #[test]
    fn test_create_dirs_under_temp_root() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = PlatformDirs::resolve_with_root(&tmp.path().join("nested"));
        dirs.create_dirs().unwrap();
        assert!(dirs.config_dir.is_dir());
        assert!(dirs.log_dir.is_dir());
    }

    #[test]
    fn test_create_dirs_reports_path_on_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let dirs = PlatformDirs::resolve_with_root(&blocker);
        let err = dirs.create_dirs().unwrap_err();
        assert!(matches!(err, PlatformError::CreateDir { .. }));
        assert!(err.to_string().contains("file"));
    }
}
