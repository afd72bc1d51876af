//! Configuration loading and root folder resolution

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Environment variable checked when no command-line override is given
pub const ROOT_ENV_VAR: &str = "SONGBOOK_ROOT";

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. `SONGBOOK_ROOT` environment variable
/// 3. TOML config file (`root_folder` key)
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ROOT_ENV_VAR) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file. A missing file is normal; a present but
    // unreadable/unparsable one is reported and then skipped.
    if let Some(config_path) = config_file_path() {
        match load_root_from_config(&config_path) {
            Ok(Some(root_folder)) => return root_folder,
            Ok(None) => {}
            Err(e) => warn!("Ignoring config file {}: {}", config_path.display(), e),
        }
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Read `root_folder` from a TOML config file.
///
/// Returns Ok(None) when the file does not exist or has no `root_folder`
/// key; returns an error when the file exists but cannot be read or parsed.
pub fn load_root_from_config(path: &Path) -> Result<Option<PathBuf>> {
    if !path.exists() {
        return Ok(None);
    }

    let toml_content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read {}: {}", path.display(), e)))?;
    let config: toml::Value = toml::from_str(&toml_content)
        .map_err(|e| Error::Config(format!("failed to parse {}: {}", path.display(), e)))?;

    Ok(config
        .get("root_folder")
        .and_then(|v| v.as_str())
        .map(PathBuf::from))
}

/// Platform config file location: `<config dir>/songbook/config.toml`
fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("songbook").join("config.toml"))
}

/// OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("songbook"))
        .unwrap_or_else(|| PathBuf::from("./songbook_data"))
}

/// Filesystem layout under the resolved root folder
#[derive(Debug, Clone)]
pub struct RootFolder {
    path: PathBuf,
}

impl RootFolder {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Create the root folder and uploads directory if missing
    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.path)?;
        std::fs::create_dir_all(self.uploads_dir())?;
        Ok(())
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Database file: `<root>/songbook.db`
    pub fn database_path(&self) -> PathBuf {
        self.path.join("songbook.db")
    }

    /// Image attachments: `<root>/uploads`
    pub fn uploads_dir(&self) -> PathBuf {
        self.path.join("uploads")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    #[test]
    #[serial]
    fn cli_arg_takes_priority() {
        env::set_var(ROOT_ENV_VAR, "/tmp/songbook-env");
        let root = resolve_root_folder(Some("/tmp/songbook-cli"));
        env::remove_var(ROOT_ENV_VAR);
        assert_eq!(root, PathBuf::from("/tmp/songbook-cli"));
    }

    #[test]
    #[serial]
    fn env_var_used_when_no_cli_arg() {
        env::set_var(ROOT_ENV_VAR, "/tmp/songbook-env");
        let root = resolve_root_folder(None);
        env::remove_var(ROOT_ENV_VAR);
        assert_eq!(root, PathBuf::from("/tmp/songbook-env"));
    }

    #[test]
    fn config_file_root_folder_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "root_folder = \"/data/songbook\"\n").unwrap();

        let root = load_root_from_config(&path).unwrap();
        assert_eq!(root, Some(PathBuf::from("/data/songbook")));
    }

    #[test]
    fn missing_config_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let root = load_root_from_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(root, None);
    }

    #[test]
    fn config_file_without_key_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "port = 3000\n").unwrap();

        let root = load_root_from_config(&path).unwrap();
        assert_eq!(root, None);
    }

    #[test]
    fn unparsable_config_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "root_folder = [not toml").unwrap();

        let err = load_root_from_config(&path).unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)), "got {:?}", err);
    }

    #[test]
    fn default_root_is_nonempty() {
        assert!(!default_root_folder().as_os_str().is_empty());
    }

    #[test]
    fn root_folder_layout() {
        let root = RootFolder::new(PathBuf::from("/data/songbook"));
        assert_eq!(root.database_path(), PathBuf::from("/data/songbook/songbook.db"));
        assert_eq!(root.uploads_dir(), PathBuf::from("/data/songbook/uploads"));
    }
}
