//! 設定値の解決
//!
//! 1つの設定キーを以下の優先順位で解決します:
//! 1. 環境変数（キーを大文字スネークケースに変換した名前）
//! 2. 設定ファイル (config.json) のエントリ
//! 3. 呼び出し側が渡したデフォルト値
//!
//! どれにも該当しない場合はエラーではなく `None` を返します。

use crate::error::{ConfigError, Result};
use serde_json::{Map, Value};
use std::path::Path;

/// 設定キーを環境変数名に変換
///
/// 大文字の前にアンダースコアを挿入し、全体を大文字化します。
///
/// # Examples
/// - `containerRegistry` -> `CONTAINER_REGISTRY`
/// - `definitionsToSkip` -> `DEFINITIONS_TO_SKIP`
pub fn env_var_name(key: &str) -> String {
    let mut name = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            name.push('_');
            name.push(c);
        } else {
            name.extend(c.to_uppercase());
        }
    }
    name
}

/// 設定ファイルと環境変数から設定値を解決する
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    document: Map<String, Value>,
}

impl ConfigResolver {
    /// JSON値から作成（トップレベルはオブジェクトのみ）
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(document) => Ok(Self { document }),
            _ => Err(ConfigError::NotAnObject),
        }
    }

    /// 設定ファイルを読み込む
    pub fn load(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config document");

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let value: Value = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_value(value)
    }

    /// 設定値を解決
    ///
    /// 空文字列の環境変数、および null / 空文字列のファイル値は未設定として扱います。
    pub fn resolve(&self, key: &str, default: Option<Value>) -> Option<Value> {
        let env_var = env_var_name(key);
        if let Ok(value) = std::env::var(&env_var)
            && !value.is_empty()
        {
            tracing::debug!(key, env_var = %env_var, "Config value overridden by environment");
            return Some(Value::String(value));
        }

        match self.document.get(key) {
            None | Some(Value::Null) => default,
            Some(Value::String(s)) if s.is_empty() => default,
            Some(value) => Some(value.clone()),
        }
    }

    /// 文字列として解決
    pub fn get_string(&self, key: &str) -> Result<Option<String>> {
        match self.resolve(key, None) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(Value::Bool(b)) => Ok(Some(b.to_string())),
            Some(other) => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("文字列が必要です（実際の値: {}）", other),
            }),
        }
    }

    /// 文字列として解決（デフォルト値付き）
    pub fn get_string_or(&self, key: &str, default: &str) -> Result<String> {
        Ok(self
            .get_string(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 文字列リストとして解決
    ///
    /// 環境変数の場合は JSON 配列 (`["a","b"]`) またはカンマ区切り (`a,b`) を受け付けます。
    /// 明示的な空リストは「空」として返し、未設定とは区別します。
    pub fn get_list(&self, key: &str) -> Result<Option<Vec<String>>> {
        match self.resolve(key, None) {
            None => Ok(None),
            Some(Value::String(raw)) => parse_list(key, &raw).map(Some),
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    other => Err(ConfigError::InvalidValue {
                        key: key.to_string(),
                        message: format!("リストの要素は文字列である必要があります（実際の値: {}）", other),
                    }),
                })
                .collect::<Result<Vec<_>>>()
                .map(Some),
            Some(other) => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("リストが必要です（実際の値: {}）", other),
            }),
        }
    }

    /// 文字列リストとして解決（デフォルト値付き）
    pub fn get_list_or(&self, key: &str, default: &[&str]) -> Result<Vec<String>> {
        Ok(self
            .get_list(key)?
            .unwrap_or_else(|| default.iter().map(|s| s.to_string()).collect()))
    }
}

fn parse_list(key: &str, raw: &str) -> Result<Vec<String>> {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("JSON配列として解析できません: {}", e),
        });
    }

    Ok(trimmed
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect())
}
