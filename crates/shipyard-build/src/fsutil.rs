//! ファイル操作ヘルパー
//!
//! tokio::fs の薄いラッパー。エラーには対象パスを付与します。

use crate::error::{BuildError, BuildResult};
use std::path::Path;

fn fs_error(path: &Path) -> impl FnOnce(std::io::Error) -> BuildError + '_ {
    move |source| BuildError::FileSystem {
        path: path.to_path_buf(),
        source,
    }
}

pub async fn read_to_string(path: &Path) -> BuildResult<String> {
    tokio::fs::read_to_string(path).await.map_err(fs_error(path))
}

pub async fn write(path: &Path, contents: impl AsRef<[u8]>) -> BuildResult<()> {
    tracing::debug!(path = %path.display(), "Writing file");
    tokio::fs::write(path, contents).await.map_err(fs_error(path))
}

pub async fn create_dir_all(path: &Path) -> BuildResult<()> {
    tokio::fs::create_dir_all(path).await.map_err(fs_error(path))
}

pub async fn copy(from: &Path, to: &Path) -> BuildResult<()> {
    if let Some(parent) = to.parent() {
        create_dir_all(parent).await?;
    }
    tokio::fs::copy(from, to).await.map_err(fs_error(from))?;
    Ok(())
}

pub async fn remove_file(path: &Path) -> BuildResult<()> {
    tracing::debug!(path = %path.display(), "Removing file");
    tokio::fs::remove_file(path).await.map_err(fs_error(path))
}

/// ディレクトリを再帰的に削除（存在しない場合は何もしない）
pub async fn remove_dir_all(path: &Path) -> BuildResult<()> {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(fs_error(path)(e)),
    }
}

/// ファイルを移動
///
/// rename がファイルシステムをまたいで失敗した場合はコピー＋削除にフォールバックします。
pub async fn move_file(from: &Path, to: &Path) -> BuildResult<()> {
    match tokio::fs::rename(from, to).await {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::debug!(
                from = %from.display(),
                to = %to.display(),
                error = %e,
                "rename failed, falling back to copy"
            );
            copy(from, to).await?;
            remove_file(from).await
        }
    }
}

pub async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_missing_file_carries_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("missing.txt");

        match read_to_string(&missing).await {
            Err(BuildError::FileSystem { path, .. }) => assert_eq!(path, missing),
            other => panic!("Expected FileSystem error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_copy_creates_parent_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let from = temp_dir.path().join("a.txt");
        let to = temp_dir.path().join("nested/deeper/a.txt");
        std::fs::write(&from, "content").unwrap();

        copy(&from, &to).await.unwrap();
        assert_eq!(std::fs::read_to_string(&to).unwrap(), "content");
    }

    #[tokio::test]
    async fn test_remove_dir_all_missing_is_ok() {
        let temp_dir = tempfile::tempdir().unwrap();
        remove_dir_all(&temp_dir.path().join("nope")).await.unwrap();
    }

    #[tokio::test]
    async fn test_move_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let from = temp_dir.path().join("pkg-1.0.0.tgz");
        let to = temp_dir.path().join("out/pkg-v1.0.0.tgz");
        std::fs::create_dir(temp_dir.path().join("out")).unwrap();
        std::fs::write(&from, "archive").unwrap();

        move_file(&from, &to).await.unwrap();
        assert!(!from.exists());
        assert!(to.exists());
    }
}
