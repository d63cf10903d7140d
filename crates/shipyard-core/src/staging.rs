//! ステージング
//!
//! リポジトリの必要なファイルだけを一時ディレクトリにコピーし、以降の処理は
//! すべてそのコピーに対して行います。ステージング領域は [`StagingArea`] が所有し、
//! ドロップ時に削除されます（失敗時も含む）。

use crate::error::{ReleaseError, ReleaseResult};
use crate::settings::ReleaseSettings;
use glob::MatchOptions;
use shipyard_build::descriptor::{DESCRIPTOR_FILE, DOT_DEVCONTAINER};
use shipyard_build::{TextPatch, fsutil, patch_file};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// ステージング領域内の定義ディレクトリ
///
/// 出自URLに使う `containersPathInRepo` とは独立しています。
pub const DEFINITIONS_DIR: &str = "containers";

/// ステージング領域
#[derive(Debug)]
pub struct StagingArea {
    path: PathBuf,
    keep: bool,
}

impl StagingArea {
    /// ステージング領域を作成
    ///
    /// `dest` に既存のディレクトリがあれば削除してから作り直し、`repo_root` からの
    /// 相対グロブに一致するファイルを相対パスを保ったままコピーします。
    #[tracing::instrument(skip(globs))]
    pub async fn create(
        repo_root: &Path,
        globs: &[String],
        dest: &Path,
    ) -> ReleaseResult<Self> {
        fsutil::remove_dir_all(dest).await?;
        fsutil::create_dir_all(dest).await?;

        // 以降の失敗で途中のコピーが残らないよう、ここから所有する
        let staging = Self {
            path: dest.to_path_buf(),
            keep: false,
        };

        let files = collect_files(repo_root, globs)?;
        info!("Staging {} file(s) into {}", files.len(), dest.display());

        for relative in &files {
            let target = dest.join(relative);
            if repo_root.join(relative).is_dir() {
                fsutil::create_dir_all(&target).await?;
            } else {
                fsutil::copy(&repo_root.join(relative), &target).await?;
            }
        }

        Ok(staging)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// ステージングされた定義ディレクトリ（`containers/`）
    pub fn definitions_dir(&self) -> PathBuf {
        self.path.join(DEFINITIONS_DIR)
    }

    pub fn definition_path(&self, definition_id: &str) -> PathBuf {
        self.definitions_dir().join(definition_id)
    }

    /// ステージング領域を削除
    pub async fn remove(mut self) -> ReleaseResult<()> {
        info!("Removing staging area: {}", self.path.display());
        self.keep = true;
        fsutil::remove_dir_all(&self.path).await?;
        Ok(())
    }

    /// 削除せずに残す
    pub fn persist(mut self) -> PathBuf {
        self.keep = true;
        std::mem::take(&mut self.path)
    }
}

impl Drop for StagingArea {
    fn drop(&mut self) {
        if self.keep {
            return;
        }
        debug!("Cleaning up staging area: {}", self.path.display());
        if let Err(e) = std::fs::remove_dir_all(&self.path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to clean up staging area"
            );
        }
    }
}

/// グロブに一致するパスを `repo_root` からの相対パスで返す
///
/// `.devcontainer` のようなドットで始まる名前にも一致させます。
fn collect_files(repo_root: &Path, globs: &[String]) -> ReleaseResult<Vec<PathBuf>> {
    let options = MatchOptions {
        require_literal_leading_dot: false,
        ..MatchOptions::new()
    };
    let root = glob::Pattern::escape(&repo_root.to_string_lossy());

    let mut files = Vec::new();
    let mut seen = HashSet::new();
    for pattern in globs {
        let full_pattern = format!("{}/{}", root, pattern);
        let invalid = |message: String| ReleaseError::InvalidGlob {
            pattern: pattern.clone(),
            message,
        };

        let entries = glob::glob_with(&full_pattern, options).map_err(|e| invalid(e.to_string()))?;
        for entry in entries {
            let path = entry.map_err(|e| invalid(e.to_string()))?;
            if let Ok(relative) = path.strip_prefix(repo_root)
                && seen.insert(relative.to_path_buf())
            {
                files.push(relative.to_path_buf());
            }
        }
    }

    Ok(files)
}

/// devcontainer.json の先頭に出自コメントを2行追加
///
/// ```text
/// // {devContainerJsonPreamble}
/// // {repo}/tree/{release}/{containersPath}/{definitionId}
/// ```
pub async fn annotate_descriptor(
    definition_path: &Path,
    definition_id: &str,
    release: &str,
    settings: &ReleaseSettings,
) -> ReleaseResult<()> {
    info!("Annotating devcontainer.json for {}", definition_id);
    let descriptor_path = definition_path.join(DOT_DEVCONTAINER).join(DESCRIPTOR_FILE);

    let patch = TextPatch::PrependLines(vec![
        format!("// {}", settings.dev_container_json_preamble),
        format!(
            "// {}/tree/{}/{}/{}",
            settings.repo_url, release, settings.containers_path, definition_id
        ),
    ]);
    patch_file(&descriptor_path, &patch).await?;

    Ok(())
}
