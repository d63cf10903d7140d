//! リリース設定

use crate::error::ReleaseResult;
use shipyard_build::{DEFAULT_CONTAINER_CLI, StubSettings};
use shipyard_config::ConfigResolver;
use std::path::PathBuf;

/// ステージング対象のデフォルト
pub const DEFAULT_FILES_TO_STAGE: &[&str] = &["containers/**/*", "package.json"];

/// 出自URLに使う定義ディレクトリのパスのデフォルト
pub const DEFAULT_CONTAINERS_PATH: &str = "containers";

/// リリース1回分の設定
///
/// 設定ドキュメントと環境変数から一度だけ解決し、各オーケストレーターに渡します。
#[derive(Debug, Clone)]
pub struct ReleaseSettings {
    pub files_to_stage: Vec<String>,
    pub definitions_to_skip: Vec<String>,
    /// `None` は「発見した全定義」
    pub definitions_to_push: Option<Vec<String>>,
    pub dev_container_json_preamble: String,
    pub repo_url: String,
    /// 出自URL上の定義ディレクトリのパス（ステージング領域のレイアウトには影響しない）
    pub containers_path: String,
    pub container_cli: String,
    pub dependency_install_command: String,
    pub pack_command: String,
    pub staging_root: PathBuf,
    pub stub: StubSettings,
}

impl Default for ReleaseSettings {
    fn default() -> Self {
        Self {
            files_to_stage: DEFAULT_FILES_TO_STAGE.iter().map(|s| s.to_string()).collect(),
            definitions_to_skip: Vec::new(),
            definitions_to_push: None,
            dev_container_json_preamble: String::new(),
            repo_url: String::new(),
            containers_path: DEFAULT_CONTAINERS_PATH.to_string(),
            container_cli: DEFAULT_CONTAINER_CLI.to_string(),
            dependency_install_command: "yarn install".to_string(),
            pack_command: "npm pack".to_string(),
            staging_root: default_staging_root(),
            stub: StubSettings::default(),
        }
    }
}

impl ReleaseSettings {
    pub fn from_config(config: &ConfigResolver) -> ReleaseResult<Self> {
        let defaults = Self::default();

        let staging_root = config
            .get_string("stagingRoot")?
            .map(PathBuf::from)
            .unwrap_or(defaults.staging_root);

        Ok(Self {
            files_to_stage: config.get_list_or("filesToStage", DEFAULT_FILES_TO_STAGE)?,
            definitions_to_skip: config.get_list_or("definitionsToSkip", &[])?,
            definitions_to_push: config.get_list("definitionsToPush")?,
            dev_container_json_preamble: config.get_string_or("devContainerJsonPreamble", "")?,
            repo_url: config.get_string_or("vscodeDevContainersRepo", "")?,
            containers_path: config
                .get_string_or("containersPathInRepo", DEFAULT_CONTAINERS_PATH)?,
            container_cli: config.get_string_or("containerCli", DEFAULT_CONTAINER_CLI)?,
            dependency_install_command: config
                .get_string_or("dependencyInstallCommand", &defaults.dependency_install_command)?,
            pack_command: config.get_string_or("packCommand", &defaults.pack_command)?,
            staging_root,
            stub: StubSettings::from_config(config)?,
        })
    }

    /// 定義をビルド・プッシュ対象にするか
    pub fn should_push(&self, definition_id: &str) -> bool {
        let skipped = self.definitions_to_skip.iter().any(|d| d == definition_id);
        let included = match &self.definitions_to_push {
            Some(list) => list.iter().any(|d| d == definition_id),
            None => true,
        };
        included && !skipped
    }
}

fn default_staging_root() -> PathBuf {
    std::env::temp_dir().join("shipyard-staging")
}
