//! イメージプッシュ処理
//!
//! ビルドしたイメージをタグごとに1つずつコンテナレジストリにプッシュします。

use crate::builder::DEFAULT_CONTAINER_CLI;
use crate::error::{BuildError, BuildResult};
use crate::executor::{CommandExecutor, ShellCommand};
use colored::Colorize;
use std::path::Path;

/// イメージプッシュを実行するハンドラ
pub struct ImagePusher {
    container_cli: String,
}

impl Default for ImagePusher {
    fn default() -> Self {
        Self::new(DEFAULT_CONTAINER_CLI)
    }
}

impl ImagePusher {
    pub fn new(container_cli: impl Into<String>) -> Self {
        Self {
            container_cli: container_cli.into(),
        }
    }

    /// 全タグを順番にプッシュ
    ///
    /// プッシュを始める前に全タグを検証し、最初の失敗で中断します。
    ///
    /// # Returns
    /// プッシュしたイメージ参照
    pub async fn push_all<E>(
        &self,
        executor: &E,
        cwd: &Path,
        images: &[String],
    ) -> BuildResult<Vec<String>>
    where
        E: CommandExecutor + ?Sized,
    {
        for image in images {
            let (_, tag) = split_image_tag(image);
            validate_tag(&tag)?;
        }

        let mut pushed = Vec::with_capacity(images.len());
        for image in images {
            println!("  → {}", image.cyan());

            let cmd = ShellCommand::new(&self.container_cli, cwd)
                .arg("push")
                .arg(image);
            executor.run(&cmd).await?;

            println!("  {} Pushed", "✓".green());
            pushed.push(image.clone());
        }

        Ok(pushed)
    }
}

/// タグのバリデーション
fn validate_tag(tag: &str) -> BuildResult<()> {
    // Docker タグの制約:
    // - 128文字以下
    // - 英数字、ピリオド、ハイフン、アンダースコアのみ
    // - 先頭はピリオドまたはハイフンではない

    if tag.is_empty() {
        return Err(BuildError::InvalidTag {
            tag: "(empty)".to_string(),
        });
    }

    if tag.len() > 128 {
        return Err(BuildError::InvalidTag {
            tag: format!("Tag too long ({} characters, max 128)", tag.len()),
        });
    }

    if tag.starts_with('.') || tag.starts_with('-') {
        return Err(BuildError::InvalidTag {
            tag: tag.to_string(),
        });
    }

    if let Some(c) = tag
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && *c != '.' && *c != '-' && *c != '_')
    {
        return Err(BuildError::InvalidTag {
            tag: format!("Invalid character '{}' in tag: {}", c, tag),
        });
    }

    Ok(())
}

/// イメージ名とタグを分離
///
/// # Examples
/// - `docker.io/org/go:1.2` -> `("docker.io/org/go", "1.2")`
/// - `docker.io/org/go` -> `("docker.io/org/go", "latest")`
/// - `localhost:5000/go` -> `("localhost:5000/go", "latest")`
pub fn split_image_tag(image: &str) -> (String, String) {
    if let Some(pos) = image.rfind(':') {
        let potential_tag = &image[pos + 1..];
        let potential_image = &image[..pos];

        // `/` を含むならレジストリのポート番号側の `:`
        if !potential_tag.contains('/') {
            return (potential_image.to_string(), potential_tag.to_string());
        }
    }

    (image.to_string(), "latest".to_string())
}
