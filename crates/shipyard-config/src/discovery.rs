//! 設定ファイルとリポジトリルートの発見

use crate::error::{ConfigError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// 設定ファイルパスを直接指定する環境変数
pub const CONFIG_PATH_ENV: &str = "SHIPYARD_CONFIG_PATH";

/// リポジトリルートを直接指定する環境変数
pub const REPO_ROOT_ENV: &str = "SHIPYARD_REPO_ROOT";

/// リポジトリルートからの設定ファイル候補（優先順）
const CONFIG_CANDIDATES: [&str; 2] = ["build/config.json", "config.json"];

/// 設定ファイルを探す
///
/// 検索順序:
/// 1. 環境変数 SHIPYARD_CONFIG_PATH
/// 2. {repo_root}/build/config.json
/// 3. {repo_root}/config.json
pub fn find_config_file(repo_root: &Path) -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(&config_path);
        if path.exists() {
            debug!(path = %path.display(), "Config file from environment variable");
            return Ok(path);
        }
        warn!(env_path = %config_path, "SHIPYARD_CONFIG_PATH is set but file does not exist");
    }

    CONFIG_CANDIDATES
        .iter()
        .map(|candidate| repo_root.join(candidate))
        .find(|path| path.exists())
        .ok_or_else(|| ConfigError::ConfigFileNotFound(repo_root.to_path_buf()))
}

/// リポジトリルートを検出
///
/// 以下の優先順位で検索:
/// 1. 環境変数 SHIPYARD_REPO_ROOT
/// 2. カレントディレクトリから上に向かって設定ファイルを含むディレクトリ
#[tracing::instrument]
pub fn find_repo_root() -> Result<PathBuf> {
    if let Ok(root) = std::env::var(REPO_ROOT_ENV) {
        let path = PathBuf::from(&root);
        if path.is_dir() {
            info!(repo_root = %path.display(), "Found repo root from environment variable");
            return Ok(path);
        }
        warn!(env_root = %root, "SHIPYARD_REPO_ROOT is set but is not a directory");
    }

    let start_dir = std::env::current_dir()?;
    find_repo_root_from(&start_dir).ok_or(ConfigError::RepoRootNotFound(start_dir))
}

/// 指定ディレクトリから上方向に設定ファイルを含むディレクトリを探す
pub fn find_repo_root_from(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    debug!(start_dir = %start_dir.display(), "Searching for repo root");

    loop {
        if CONFIG_CANDIDATES
            .iter()
            .any(|candidate| current.join(candidate).is_file())
        {
            info!(repo_root = %current.display(), "Found repo root");
            return Some(current);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    #[serial]
    fn test_find_config_file_build_dir_priority() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::create_dir(temp_dir.path().join("build")).unwrap();
        fs::write(temp_dir.path().join("build/config.json"), "{}").unwrap();
        fs::write(temp_dir.path().join("config.json"), "{}").unwrap();

        temp_env::with_var_unset(CONFIG_PATH_ENV, || {
            let found = find_config_file(temp_dir.path()).unwrap();
            assert!(found.ends_with("build/config.json"));
        });
    }

    #[test]
    #[serial]
    fn test_find_config_file_env_var() {
        let temp_dir = tempfile::tempdir().unwrap();
        let custom = temp_dir.path().join("custom.json");
        fs::write(&custom, "{}").unwrap();

        temp_env::with_var(CONFIG_PATH_ENV, Some(custom.to_str().unwrap()), || {
            assert_eq!(find_config_file(temp_dir.path()).unwrap(), custom);
        });
    }

    #[test]
    #[serial]
    fn test_find_config_file_not_found() {
        let temp_dir = tempfile::tempdir().unwrap();

        temp_env::with_var_unset(CONFIG_PATH_ENV, || {
            assert!(matches!(
                find_config_file(temp_dir.path()),
                Err(ConfigError::ConfigFileNotFound(_))
            ));
        });
    }

    #[test]
    fn test_find_repo_root_from_nested_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("build")).unwrap();
        fs::write(root.join("build/config.json"), "{}").unwrap();

        let nested = root.join("containers/foo/.devcontainer");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_repo_root_from(&nested), Some(root.to_path_buf()));
    }

    #[test]
    #[serial]
    fn test_find_repo_root_env_var() {
        let temp_dir = tempfile::tempdir().unwrap();

        temp_env::with_var(REPO_ROOT_ENV, Some(temp_dir.path().to_str().unwrap()), || {
            assert_eq!(find_repo_root().unwrap(), temp_dir.path());
        });
    }
}
