use shipyard_build::BuildError;
use shipyard_config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("ステージング対象のパターンが不正です: {pattern}\n理由: {message}")]
    InvalidGlob { pattern: String, message: String },

    #[error("定義が見つかりません: {0}")]
    DefinitionNotFound(String),

    #[error("package.json が不正です: {path}\n理由: {message}")]
    Manifest { path: PathBuf, message: String },
}

impl ReleaseError {
    /// ユーザー向けの分かりやすいエラーメッセージ
    pub fn user_message(&self) -> String {
        match self {
            ReleaseError::Build(e) => e.user_message(),
            ReleaseError::DefinitionNotFound(id) => {
                format!(
                    "定義 '{}' が見つかりません\n\
                     \n\
                     ステージングされた containers/ 以下のディレクトリ名を指定してください。",
                    id
                )
            }
            _ => format!("{}", self),
        }
    }
}

pub type ReleaseResult<T> = std::result::Result<T, ReleaseError>;
