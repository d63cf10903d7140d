use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("バージョン形式が不正です: {0}（MAJOR.MINOR.PATCH の3要素が必要です）")]
    InvalidVersionFormat(String),

    #[error("Dockerfileが見つかりません: {0}")]
    MissingDockerfile(PathBuf),

    #[error("ビルドコンテキストが見つかりません: {0}")]
    ContextNotFound(PathBuf),

    #[error("コマンドが失敗しました（終了コード: {}）: {command}", format_exit(.code, .signal))]
    ProcessFailure {
        command: String,
        code: Option<i32>,
        signal: Option<i32>,
    },

    #[error("コマンドを起動できません: {command}\n理由: {source}")]
    ProcessSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("ファイル操作に失敗しました: {path}\n理由: {source}")]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("devcontainer.json のパースに失敗しました: {path}\n理由: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("置換対象のパターンが見つかりません: {pattern}（{path}）")]
    PatternNotFound { path: PathBuf, pattern: String },

    #[error("設定値が不足しています: {0}")]
    MissingSetting(String),

    #[error("不正なイメージタグ: {tag}")]
    InvalidTag { tag: String },

    #[error("正規表現のコンパイルエラー: {0}")]
    Regex(#[from] regex::Error),

    #[error("設定エラー: {0}")]
    Config(#[from] shipyard_config::ConfigError),
}

fn format_exit(code: &Option<i32>, signal: &Option<i32>) -> String {
    match (code, signal) {
        (Some(code), _) => code.to_string(),
        (None, Some(signal)) => format!("signal {}", signal),
        (None, None) => "不明".to_string(),
    }
}

impl BuildError {
    /// ユーザー向けの分かりやすいエラーメッセージ
    pub fn user_message(&self) -> String {
        match self {
            BuildError::MissingDockerfile(path) => {
                format!(
                    "Dockerfileが見つかりません: {}\n\
                     \n\
                     解決方法:\n\
                     1. .devcontainer/ に base.Dockerfile または Dockerfile を配置してください\n\
                     2. 対象外の定義であれば definitionsToSkip に追加してください",
                    path.display()
                )
            }
            BuildError::ContextNotFound(path) => {
                format!(
                    "ビルドコンテキストが見つかりません: {}\n\
                     \n\
                     devcontainer.json の context を確認してください。",
                    path.display()
                )
            }
            BuildError::ProcessFailure { command, .. } => {
                format!(
                    "{}\n\
                     \n\
                     上記のコマンド出力を確認してください。\n\
                     手動で再実行する場合: {}",
                    self, command
                )
            }
            BuildError::MissingSetting(key) => {
                format!(
                    "設定値 '{}' がありません\n\
                     \n\
                     解決方法:\n\
                     1. CLI オプションで指定してください\n\
                     2. config.json または環境変数 {} で指定してください",
                    key,
                    shipyard_config::env_var_name(key)
                )
            }
            _ => format!("{}", self),
        }
    }
}

pub type BuildResult<T> = std::result::Result<T, BuildError>;
