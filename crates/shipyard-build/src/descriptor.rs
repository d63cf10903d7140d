//! devcontainer.json の読み込み
//!
//! コメント付き JSON としてパースし、ビルドに必要なフィールドだけを取り出します。
//! 書き換えは [`crate::patch`] で生テキストに対して行うため、元の文字列も保持します。

use crate::error::{BuildError, BuildResult};
use crate::fsutil;
use jsonc_parser::ParseOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// 定義の `.devcontainer` ディレクトリ名
pub const DOT_DEVCONTAINER: &str = ".devcontainer";

/// devcontainer.json のファイル名
pub const DESCRIPTOR_FILE: &str = "devcontainer.json";

#[derive(Debug, Default, Deserialize)]
struct DescriptorFields {
    context: Option<String>,
    build: Option<BuildFields>,
}

#[derive(Debug, Default, Deserialize)]
struct BuildFields {
    context: Option<String>,
}

/// devcontainer.json
#[derive(Debug, Clone)]
pub struct DevContainerDescriptor {
    pub path: PathBuf,
    /// 読み込んだ時点の生テキスト
    pub raw: String,
    /// ビルドコンテキスト（`.devcontainer` からの相対パス）
    pub context: Option<String>,
}

impl DevContainerDescriptor {
    /// ファイルから読み込む
    pub async fn load(path: &Path) -> BuildResult<Self> {
        let raw = fsutil::read_to_string(path).await?;
        Self::parse(path, raw)
    }

    /// 生テキストをパース
    ///
    /// `context` が無い場合は `build.context` を参照します。
    pub fn parse(path: &Path, raw: String) -> BuildResult<Self> {
        let parse_error = |message: String| BuildError::Parse {
            path: path.to_path_buf(),
            message,
        };

        let value = jsonc_parser::parse_to_serde_value(&raw, &ParseOptions::default())
            .map_err(|e| parse_error(e.to_string()))?
            .ok_or_else(|| parse_error("ファイルが空です".to_string()))?;

        let fields: DescriptorFields =
            serde_json::from_value(value).map_err(|e| parse_error(e.to_string()))?;

        let context = fields
            .context
            .or_else(|| fields.build.and_then(|build| build.context));

        Ok(Self {
            path: path.to_path_buf(),
            raw,
            context,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> BuildResult<DevContainerDescriptor> {
        DevContainerDescriptor::parse(Path::new("devcontainer.json"), raw.to_string())
    }

    #[test]
    fn test_parse_with_comments_and_trailing_comma() {
        let descriptor = parse(
            r#"// For format details, see https://aka.ms/devcontainer.json
{
    "name": "Node.js",
    /* build context */
    "context": "..",
    "dockerFile": "base.Dockerfile",
}"#,
        )
        .unwrap();

        assert_eq!(descriptor.context.as_deref(), Some(".."));
        assert!(descriptor.raw.starts_with("// For format details"));
    }

    #[test]
    fn test_parse_without_context() {
        let descriptor = parse(r#"{ "name": "Go", "dockerFile": "Dockerfile" }"#).unwrap();
        assert_eq!(descriptor.context, None);
    }

    #[test]
    fn test_parse_build_context_fallback() {
        let descriptor =
            parse(r#"{ "build": { "dockerfile": "Dockerfile", "context": "../app" } }"#).unwrap();
        assert_eq!(descriptor.context.as_deref(), Some("../app"));
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            parse(r#"{ "name": "broken" "#),
            Err(BuildError::Parse { .. })
        ));
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(parse("// only a comment\n"), Err(BuildError::Parse { .. })));
    }

    #[test]
    fn test_parse_context_wrong_type() {
        assert!(matches!(
            parse(r#"{ "context": 3 }"#),
            Err(BuildError::Parse { .. })
        ));
    }
}
