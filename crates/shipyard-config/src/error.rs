use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "設定ファイルが見つかりません: {0}\n\
        以下の場所を確認してください:\n\
        - build/config.json\n\
        - config.json\n\
        または SHIPYARD_CONFIG_PATH 環境変数で直接指定できます"
    )]
    ConfigFileNotFound(PathBuf),

    #[error(
        "リポジトリルートが見つかりません\n探索開始位置: {0}\nヒント: build/config.json を含むディレクトリで実行するか --repo を指定してください"
    )]
    RepoRootNotFound(PathBuf),

    #[error("設定ファイルの読み込みに失敗しました: {path}\n理由: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("設定ファイルのJSONが不正です: {path}\n理由: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("設定ファイルのトップレベルはJSONオブジェクトである必要があります")]
    NotAnObject,

    #[error("設定値 '{key}' が不正です: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
