//! Shipyard 設定管理
//!
//! 設定値は 環境変数 → 設定ファイル (config.json) → デフォルト値 の順で解決されます。

pub mod discovery;
pub mod error;
pub mod resolver;

pub use discovery::{CONFIG_PATH_ENV, REPO_ROOT_ENV, find_config_file, find_repo_root, find_repo_root_from};
pub use error::*;
pub use resolver::{ConfigResolver, env_var_name};
