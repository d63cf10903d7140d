use crate::descriptor::{DESCRIPTOR_FILE, DOT_DEVCONTAINER, DevContainerDescriptor};
use crate::error::{BuildError, BuildResult};
use crate::fsutil;
use std::path::{Path, PathBuf};

/// ビルドに使う Dockerfile の種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DockerfileKind {
    /// `base.Dockerfile`（マルチステージの本体。横にスタブの `Dockerfile` を持つ）
    Base,
    /// `Dockerfile`（単体のビルド定義）
    Final,
}

impl DockerfileKind {
    pub fn file_name(&self) -> &'static str {
        match self {
            DockerfileKind::Base => "base.Dockerfile",
            DockerfileKind::Final => "Dockerfile",
        }
    }
}

/// 解決済みの Dockerfile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDockerfile {
    pub path: PathBuf,
    pub kind: DockerfileKind,
}

impl ResolvedDockerfile {
    pub fn has_base(&self) -> bool {
        self.kind == DockerfileKind::Base
    }
}

/// 定義ディレクトリ内のビルド入力を解決する
pub struct BuildResolver {
    dot_devcontainer: PathBuf,
}

impl BuildResolver {
    /// `definition_path` は定義ディレクトリ（`containers/{id}`）
    pub fn new(definition_path: &Path) -> Self {
        Self {
            dot_devcontainer: definition_path.join(DOT_DEVCONTAINER),
        }
    }

    pub fn dot_devcontainer(&self) -> &Path {
        &self.dot_devcontainer
    }

    pub fn descriptor_path(&self) -> PathBuf {
        self.dot_devcontainer.join(DESCRIPTOR_FILE)
    }

    /// Dockerfileのパスを解決
    ///
    /// 検索順序:
    /// 1. .devcontainer/base.Dockerfile
    /// 2. .devcontainer/Dockerfile
    pub async fn resolve_dockerfile(&self) -> BuildResult<ResolvedDockerfile> {
        for kind in [DockerfileKind::Base, DockerfileKind::Final] {
            let path = self.dot_devcontainer.join(kind.file_name());
            if fsutil::exists(&path).await {
                tracing::debug!("Found {:?} Dockerfile at: {}", kind, path.display());
                return Ok(ResolvedDockerfile { path, kind });
            }
        }

        Err(BuildError::MissingDockerfile(
            self.dot_devcontainer.join(DockerfileKind::Final.file_name()),
        ))
    }

    /// ビルドコンテキストのパスを解決
    ///
    /// devcontainer.json の `context` を `.devcontainer` からの相対パスとして扱い、
    /// 未指定なら `.devcontainer` 自体を使います。
    pub async fn resolve_context(&self, descriptor: &DevContainerDescriptor) -> BuildResult<PathBuf> {
        let context = match descriptor.context.as_deref() {
            Some(ctx) => self.dot_devcontainer.join(ctx),
            None => self.dot_devcontainer.clone(),
        };

        let is_dir = tokio::fs::metadata(&context)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(BuildError::ContextNotFound(context));
        }

        Ok(context)
    }
}
