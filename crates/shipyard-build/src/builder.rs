use crate::error::BuildResult;
use crate::executor::{CommandExecutor, ShellCommand};
use colored::Colorize;
use std::path::Path;

/// コンテナCLIのデフォルト
pub const DEFAULT_CONTAINER_CLI: &str = "docker";

pub struct ImageBuilder {
    container_cli: String,
}

impl Default for ImageBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_CONTAINER_CLI)
    }
}

impl ImageBuilder {
    pub fn new(container_cli: impl Into<String>) -> Self {
        Self {
            container_cli: container_cli.into(),
        }
    }

    /// ビルドコマンドを組み立てる
    ///
    /// `{cli} build {context} -f {dockerfile} -t {tag}...`（作業ディレクトリはコンテキスト）
    pub fn build_command(&self, context: &Path, dockerfile: &Path, tags: &[String]) -> ShellCommand {
        let mut cmd = ShellCommand::new(&self.container_cli, context)
            .arg("build")
            .path_arg(context)
            .arg("-f")
            .path_arg(dockerfile);

        for tag in tags {
            cmd = cmd.arg("-t").arg(tag);
        }

        cmd
    }

    /// イメージをビルド（全タグを1回のビルドで付与）
    pub async fn build_image<E>(
        &self,
        executor: &E,
        context: &Path,
        dockerfile: &Path,
        tags: &[String],
    ) -> BuildResult<()>
    where
        E: CommandExecutor + ?Sized,
    {
        tracing::info!(
            dockerfile = %dockerfile.display(),
            context = %context.display(),
            "Building image with {} tag(s)",
            tags.len()
        );
        println!("  {} イメージをビルド中...", "→".blue());

        let cmd = self.build_command(context, dockerfile, tags);
        executor.run(&cmd).await?;

        tracing::info!("Successfully built: {}", tags.join(", "));
        Ok(())
    }
}
