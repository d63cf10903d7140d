//! テキストパッチ
//!
//! devcontainer.json や package.json のコメント・書式を保つため、構造化編集ではなく
//! 文字列置換で書き換えます。対象パターンが存在しない場合は何もせず成功するのではなく
//! [`BuildError::PatternNotFound`] を返します。

use crate::error::{BuildError, BuildResult};
use crate::fsutil;
use regex::Regex;
use std::path::Path;

/// 文字列パッチ
#[derive(Debug, Clone)]
pub enum TextPatch {
    /// 最初に出現する部分文字列を置換
    Literal { needle: String, replacement: String },
    /// 最初にマッチした箇所を置換（置換文字列は `$` 展開しない）
    Pattern { regex: Regex, replacement: String },
    /// 先頭に行を追加
    PrependLines(Vec<String>),
}

impl TextPatch {
    pub fn literal(needle: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self::Literal {
            needle: needle.into(),
            replacement: replacement.into(),
        }
    }

    pub fn pattern(regex: Regex, replacement: impl Into<String>) -> Self {
        Self::Pattern {
            regex,
            replacement: replacement.into(),
        }
    }

    /// パッチを適用
    ///
    /// `path` はエラーメッセージ用です。
    pub fn apply(&self, path: &Path, content: &str) -> BuildResult<String> {
        match self {
            TextPatch::Literal {
                needle,
                replacement,
            } => {
                if !content.contains(needle.as_str()) {
                    return Err(not_found(path, needle));
                }
                Ok(content.replacen(needle.as_str(), replacement, 1))
            }
            TextPatch::Pattern { regex, replacement } => {
                if !regex.is_match(content) {
                    return Err(not_found(path, regex.as_str()));
                }
                Ok(regex
                    .replacen(content, 1, regex::NoExpand(replacement))
                    .into_owned())
            }
            TextPatch::PrependLines(lines) => {
                let mut patched = String::with_capacity(content.len() + 256);
                for line in lines {
                    patched.push_str(line);
                    patched.push('\n');
                }
                patched.push_str(content);
                Ok(patched)
            }
        }
    }
}

fn not_found(path: &Path, pattern: &str) -> BuildError {
    BuildError::PatternNotFound {
        path: path.to_path_buf(),
        pattern: pattern.to_string(),
    }
}

/// ファイルを読み込み、パッチを適用して書き戻す
///
/// 適用後の内容を返します。
pub async fn patch_file(path: &Path, patch: &TextPatch) -> BuildResult<String> {
    let content = fsutil::read_to_string(path).await?;
    let patched = patch.apply(path, &content)?;
    fsutil::write(path, &patched).await?;
    Ok(patched)
}
