//! スタブ Dockerfile の管理
//!
//! プッシュ済みの定義は、ビルド済みイメージを参照するだけの軽量な `Dockerfile`
//! （スタブ）として配布されます。スタブの `FROM` はスタブ用レジストリ座標から
//! 導出した `MAJOR.MINOR` タグを指します。

use crate::descriptor::DOT_DEVCONTAINER;
use crate::error::{BuildError, BuildResult};
use crate::fsutil;
use crate::patch::TextPatch;
use crate::resolver::DockerfileKind;
use crate::tags::{RegistryCoordinates, normalize_version, tag_list};
use regex::Regex;
use shipyard_config::ConfigResolver;
use std::path::Path;

/// スタブテンプレート中の置換対象
pub const FROM_PLACEHOLDER: &str = "FROM REPLACE-ME";

/// 組み込みのスタブテンプレート
pub const DEFAULT_STUB_TEMPLATE: &str = "\
FROM REPLACE-ME

# [Optional] Uncomment this section to install additional OS packages.
# RUN apt-get update && export DEBIAN_FRONTEND=noninteractive \\
#     && apt-get -y install --no-install-recommends <your-package-list-here>
";

const FROM_LINE: &str = r"(?m)^FROM[ \t]+[^\r\n]+";

/// 実行したスタブ操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubAction {
    Created,
    Updated,
}

/// スタブ生成に使う設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubSettings {
    pub docker_file_preamble: String,
    pub repo_url: String,
    pub containers_path: String,
    pub template: String,
}

impl Default for StubSettings {
    fn default() -> Self {
        Self {
            docker_file_preamble: String::new(),
            repo_url: String::new(),
            containers_path: "containers".to_string(),
            template: DEFAULT_STUB_TEMPLATE.to_string(),
        }
    }
}

impl StubSettings {
    pub fn from_config(config: &ConfigResolver) -> BuildResult<Self> {
        Ok(Self {
            docker_file_preamble: config.get_string_or("dockerFilePreamble", "")?,
            repo_url: config.get_string_or("vscodeDevContainersRepo", "")?,
            containers_path: config.get_string_or("containersPathInRepo", "containers")?,
            template: DEFAULT_STUB_TEMPLATE.to_string(),
        })
    }
}

pub struct StubManager {
    settings: StubSettings,
}

impl StubManager {
    pub fn new(settings: StubSettings) -> Self {
        Self { settings }
    }

    /// スタブ先頭の `FROM` スニペット
    ///
    /// ```text
    /// # {dockerFilePreamble}
    /// # {repo}/tree/{release}/{containersPath}/{id}/.devcontainer/{base.}Dockerfile
    /// FROM {stubRegistry}/{stubRegistryPath}/{id}:{MAJOR.MINOR}
    /// ```
    pub fn from_snippet(
        &self,
        definition_id: &str,
        release: &str,
        has_base: bool,
        stub_coordinates: &RegistryCoordinates,
    ) -> BuildResult<String> {
        let version = normalize_version(release);
        let tags = tag_list(definition_id, &version, false, stub_coordinates)?;
        let image = tags
            .into_iter()
            .next()
            .ok_or_else(|| BuildError::InvalidVersionFormat(version.to_string()))?;

        let source = if has_base {
            DockerfileKind::Base
        } else {
            DockerfileKind::Final
        };

        Ok(format!(
            "# {}\n# {}/tree/{}/{}/{}/{}/{}\nFROM {}",
            self.settings.docker_file_preamble,
            self.settings.repo_url,
            release,
            self.settings.containers_path,
            definition_id,
            DOT_DEVCONTAINER,
            source.file_name(),
            image
        ))
    }

    /// テンプレートからスタブを生成し `.devcontainer/Dockerfile` に書き込む
    ///
    /// 既存の `Dockerfile` は上書きされます（イメージのビルドは完了している前提）。
    pub async fn create_stub(
        &self,
        dot_devcontainer: &Path,
        definition_id: &str,
        release: &str,
        has_base: bool,
        stub_coordinates: &RegistryCoordinates,
    ) -> BuildResult<StubAction> {
        let snippet = self.from_snippet(definition_id, release, has_base, stub_coordinates)?;
        let path = dot_devcontainer.join(DockerfileKind::Final.file_name());
        tracing::info!("Generating stub Dockerfile: {}", path.display());

        let rendered = TextPatch::literal(FROM_PLACEHOLDER, snippet)
            .apply(Path::new("<stub template>"), &self.settings.template)?;
        fsutil::write(&path, rendered).await?;

        Ok(StubAction::Created)
    }

    /// 既存スタブの最初の `FROM` 行を新しいリリースのスニペットに置き換える
    ///
    /// スタブの `Dockerfile` がまだ無い場合はテンプレートから書き出します。
    /// 既存ファイルが CRLF の場合はスニペットも CRLF で挿入します。
    pub async fn update_stub(
        &self,
        dot_devcontainer: &Path,
        definition_id: &str,
        release: &str,
        has_base: bool,
        stub_coordinates: &RegistryCoordinates,
    ) -> BuildResult<StubAction> {
        let snippet = self.from_snippet(definition_id, release, has_base, stub_coordinates)?;
        let path = dot_devcontainer.join(DockerfileKind::Final.file_name());
        tracing::info!("Updating stub Dockerfile: {}", path.display());

        if fsutil::exists(&path).await {
            let content = fsutil::read_to_string(&path).await?;
            let snippet = if content.contains("\r\n") {
                snippet.replace('\n', "\r\n")
            } else {
                snippet
            };
            let patch = TextPatch::pattern(Regex::new(FROM_LINE)?, snippet);
            fsutil::write(&path, patch.apply(&path, &content)?).await?;
        } else {
            tracing::debug!("No stub Dockerfile yet, rendering template");
            let rendered = TextPatch::literal(FROM_PLACEHOLDER, snippet)
                .apply(Path::new("<stub template>"), &self.settings.template)?;
            fsutil::write(&path, rendered).await?;
        }

        Ok(StubAction::Updated)
    }
}
