//! package.json の読み書き
//!
//! 書式を保つため、バージョンの書き換えは `"version": "..."` への正規表現置換で行います。

use crate::error::{ReleaseError, ReleaseResult};
use regex::Regex;
use serde::Deserialize;
use shipyard_build::{TextPatch, Version, fsutil, patch_file};
use std::path::{Path, PathBuf};

/// パッケージマニフェストのファイル名
pub const MANIFEST_FILE: &str = "package.json";

const VERSION_FIELD: &str = r#""version"\s*:\s*"[^"]*""#;

#[derive(Debug, Deserialize)]
struct ManifestFields {
    name: Option<String>,
    version: Option<String>,
}

/// package.json
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageManifest {
    pub path: PathBuf,
    pub name: String,
    pub version: String,
}

impl PackageManifest {
    pub async fn load(path: &Path) -> ReleaseResult<Self> {
        let raw = fsutil::read_to_string(path).await?;
        Self::parse(path, &raw)
    }

    pub fn parse(path: &Path, raw: &str) -> ReleaseResult<Self> {
        let invalid = |message: &str| ReleaseError::Manifest {
            path: path.to_path_buf(),
            message: message.to_string(),
        };

        let fields: ManifestFields =
            serde_json::from_str(raw).map_err(|e| invalid(&e.to_string()))?;
        let name = fields.name.ok_or_else(|| invalid("name がありません"))?;
        let version = fields.version.ok_or_else(|| invalid("version がありません"))?;

        Ok(Self {
            path: path.to_path_buf(),
            name,
            version,
        })
    }

    /// `"version"` フィールドを書き換える
    ///
    /// フィールドが見つからない場合は `PatternNotFound`。
    pub async fn set_version(&mut self, version: &str) -> ReleaseResult<()> {
        let patch = TextPatch::pattern(
            Regex::new(VERSION_FIELD).map_err(shipyard_build::BuildError::from)?,
            format!(r#""version": "{}""#, version),
        );
        patch_file(&self.path, &patch).await?;
        self.version = version.to_string();
        Ok(())
    }

    /// npm pack が出力するアーカイブ名（`@scope/name` は `scope-name`）
    pub fn packed_file_name(&self) -> String {
        format!("{}-{}.tgz", self.file_stem(), self.version)
    }

    /// リリースタグに合わせた `v` 付きのアーカイブ名
    pub fn release_file_name(&self) -> String {
        format!("{}-v{}.tgz", self.file_stem(), self.version)
    }

    fn file_stem(&self) -> String {
        self.name.trim_start_matches('@').replace('/', "-")
    }
}

/// パッケージに書き込むバージョン
///
/// `dev` の場合はマニフェストの既存バージョンに `-dev` を付けます。
pub fn package_version(version: &Version, manifest_version: &str) -> String {
    if version.is_dev() {
        format!("{}-dev", manifest_version)
    } else {
        version.to_string()
    }
}
