//! バージョン正規化とタグ導出
//!
//! リリースラベル（`master`, `v1.2.3`, `1.2.3` など）からバージョンを正規化し、
//! 定義ごとのイメージタグ一覧を導出します。

use crate::error::{BuildError, BuildResult};
use shipyard_config::ConfigResolver;
use std::fmt;

/// トランクブランチのリリースラベル
pub const TRUNK_RELEASE: &str = "master";

/// レジストリのデフォルト
pub const DEFAULT_REGISTRY: &str = "docker.io";

/// 正規化済みバージョン
///
/// 具体的なリリースでは `MAJOR.MINOR.PATCH`、トランクでは `latest`、
/// 開発ビルドでは `dev` になります。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version(String);

impl Version {
    pub const LATEST: &'static str = "latest";
    pub const DEV: &'static str = "dev";

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_dev(&self) -> bool {
        self.0 == Self::DEV
    }

    /// `MAJOR`, `MINOR`, `PATCH` に分解
    ///
    /// 3要素でない場合、または空の要素を含む場合は `InvalidVersionFormat`。
    pub fn parts(&self) -> BuildResult<[&str; 3]> {
        let parts: Vec<&str> = self.0.split('.').collect();
        match parts.as_slice() {
            [major, minor, patch]
                if !major.is_empty() && !minor.is_empty() && !patch.is_empty() =>
            {
                Ok([*major, *minor, *patch])
            }
            _ => Err(BuildError::InvalidVersionFormat(self.0.clone())),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Version {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// リリースラベルを正規化
///
/// - `master` -> `latest`
/// - 先頭の `v` を1文字だけ除去（`v1.2.3` -> `1.2.3`）
/// - それ以外はそのまま
pub fn normalize_version(release: &str) -> Version {
    if release == TRUNK_RELEASE {
        return Version(Version::LATEST.to_string());
    }
    Version(release.strip_prefix('v').unwrap_or(release).to_string())
}

/// リリースラベルから `MAJOR.MINOR` を取得
///
/// 要素が1つしかない場合（`latest` など）はそのまま返します。
pub fn major_minor(release: &str) -> String {
    let version = normalize_version(release);
    let mut parts = version.as_str().split('.');
    match (parts.next(), parts.next()) {
        (Some(major), Some(minor)) => format!("{}.{}", major, minor),
        _ => version.as_str().to_string(),
    }
}

/// イメージのレジストリ座標（`registry/path`）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryCoordinates {
    pub registry: String,
    pub path: String,
}

impl RegistryCoordinates {
    pub fn new(registry: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            registry: registry.into(),
            path: path.into(),
        }
    }

    /// レジストリ座標を解決
    ///
    /// # Priority
    /// 1. 明示的な指定（CLI オプション）
    /// 2. 設定 `containerRegistry` / `registryUser`
    /// 3. レジストリのみデフォルト `docker.io`（パスは必須）
    pub fn resolve(
        registry: Option<&str>,
        path: Option<&str>,
        config: &ConfigResolver,
    ) -> BuildResult<Self> {
        let registry = match registry {
            Some(r) => r.to_string(),
            None => config.get_string_or("containerRegistry", DEFAULT_REGISTRY)?,
        };
        let path = match path {
            Some(p) => p.to_string(),
            None => config
                .get_string("registryUser")?
                .ok_or_else(|| BuildError::MissingSetting("registryUser".to_string()))?,
        };

        Ok(Self { registry, path })
    }

    /// スタブ用のレジストリ座標を解決
    ///
    /// # Priority
    /// 1. 明示的な指定
    /// 2. 設定 `stubRegistry` / `stubRegistryPath`
    /// 3. プライマリのレジストリ座標
    pub fn resolve_stub(
        registry: Option<&str>,
        path: Option<&str>,
        primary: &RegistryCoordinates,
        config: &ConfigResolver,
    ) -> BuildResult<Self> {
        let registry = match registry {
            Some(r) => r.to_string(),
            None => config
                .get_string("stubRegistry")?
                .unwrap_or_else(|| primary.registry.clone()),
        };
        let path = match path {
            Some(p) => p.to_string(),
            None => config
                .get_string("stubRegistryPath")?
                .unwrap_or_else(|| primary.path.clone()),
        };

        Ok(Self { registry, path })
    }

    /// `registry/path/definitionId`
    pub fn base_tag(&self, definition_id: &str) -> String {
        format!("{}/{}/{}", self.registry, self.path, definition_id)
    }
}

impl fmt::Display for RegistryCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.registry, self.path)
    }
}

/// 定義のイメージタグ一覧を導出
///
/// - `update_latest = true`: `MAJOR`, `MAJOR.MINOR`, `MAJOR.MINOR.PATCH`, `latest`
/// - `update_latest = false`: `MAJOR.MINOR`, `MAJOR.MINOR.PATCH`
///
/// プレリリースやパッチのみのリリースがフローティングタグを上書きしないよう、
/// `latest` と `MAJOR` は `update_latest` の場合のみ付与します。
pub fn tag_list(
    definition_id: &str,
    version: &Version,
    update_latest: bool,
    coordinates: &RegistryCoordinates,
) -> BuildResult<Vec<String>> {
    let [major, minor, _] = version.parts()?;
    let base_tag = coordinates.base_tag(definition_id);

    let tags = if update_latest {
        vec![
            format!("{}:{}", base_tag, major),
            format!("{}:{}.{}", base_tag, major, minor),
            format!("{}:{}", base_tag, version),
            format!("{}:{}", base_tag, Version::LATEST),
        ]
    } else {
        vec![
            format!("{}:{}.{}", base_tag, major, minor),
            format!("{}:{}", base_tag, version),
        ]
    };

    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn coordinates() -> RegistryCoordinates {
        RegistryCoordinates::new("docker.io", "devcontainers")
    }

    #[test]
    fn test_normalize_version() {
        assert_eq!(normalize_version("master").as_str(), "latest");
        assert_eq!(normalize_version("v1.2.3").as_str(), "1.2.3");
        assert_eq!(normalize_version("1.2.3").as_str(), "1.2.3");
        assert_eq!(normalize_version("dev").as_str(), "dev");
        // 先頭の v は1文字だけ除去する
        assert_eq!(normalize_version("vv1.0.0").as_str(), "v1.0.0");
    }

    #[test]
    fn test_major_minor() {
        assert_eq!(major_minor("v2.5.1"), "2.5");
        assert_eq!(major_minor("0.128.0"), "0.128");
        assert_eq!(major_minor("master"), "latest");
    }

    #[test]
    fn test_tag_list_without_latest() {
        let tags = tag_list("typescript-node", &Version::from("1.2.3"), false, &coordinates())
            .unwrap();

        assert_eq!(
            tags,
            vec![
                "docker.io/devcontainers/typescript-node:1.2",
                "docker.io/devcontainers/typescript-node:1.2.3",
            ]
        );
    }

    #[test]
    fn test_tag_list_with_latest() {
        let tags =
            tag_list("python-3", &Version::from("0.128.0"), true, &coordinates()).unwrap();

        assert_eq!(
            tags,
            vec![
                "docker.io/devcontainers/python-3:0",
                "docker.io/devcontainers/python-3:0.128",
                "docker.io/devcontainers/python-3:0.128.0",
                "docker.io/devcontainers/python-3:latest",
            ]
        );
    }

    #[test]
    fn test_tag_list_prerelease_keeps_pinned_coordinates() {
        let tags = tag_list("go", &Version::from("1.2.3-beta"), false, &coordinates()).unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[1], "docker.io/devcontainers/go:1.2.3-beta");
    }

    #[test]
    fn test_tag_list_invalid_version() {
        for bad in ["1.2", "1.2.3.4", "latest", "dev", "", "1..3"] {
            match tag_list("go", &Version::from(bad), true, &coordinates()) {
                Err(BuildError::InvalidVersionFormat(v)) => assert_eq!(v, bad),
                other => panic!("Expected InvalidVersionFormat for {:?}, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_resolve_coordinates_explicit() {
        let config = ConfigResolver::default();
        let coords = RegistryCoordinates::resolve(Some("ghcr.io"), Some("org"), &config).unwrap();
        assert_eq!(coords, RegistryCoordinates::new("ghcr.io", "org"));
        assert_eq!(coords.base_tag("rust"), "ghcr.io/org/rust");
    }

    #[test]
    fn test_resolve_stub_falls_back_to_primary() {
        let config = ConfigResolver::from_value(json!({})).unwrap();
        let primary = RegistryCoordinates::new("ghcr.io", "org");

        let stub = RegistryCoordinates::resolve_stub(None, Some("public"), &primary, &config)
            .unwrap();
        assert_eq!(stub, RegistryCoordinates::new("ghcr.io", "public"));
    }
}
