use crate::{RegistryArgs, RepoArgs};
use anyhow::Context;
use colored::Colorize;
use shipyard_build::RegistryCoordinates;
use shipyard_config::ConfigResolver;
use shipyard_core::ReleaseError;
use std::path::{Path, PathBuf};

/// リポジトリルートと解決済みの設定
pub struct ReleaseContext {
    pub repo_root: PathBuf,
    pub config: ConfigResolver,
}

/// リポジトリルートと設定ファイルを発見して読み込む
pub fn load_context(args: &RepoArgs) -> anyhow::Result<ReleaseContext> {
    let repo_root = match &args.repo {
        Some(repo) => repo.clone(),
        None => shipyard_config::find_repo_root()?,
    };
    let repo_root = repo_root
        .canonicalize()
        .with_context(|| format!("リポジトリルートを解決できません: {}", repo_root.display()))?;

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => shipyard_config::find_config_file(&repo_root)?,
    };
    let config = ConfigResolver::load(&config_path)?;

    println!("{} {}", "リポジトリ:".dimmed(), repo_root.display());
    println!("{} {}", "設定ファイル:".dimmed(), config_path.display());

    Ok(ReleaseContext { repo_root, config })
}

/// 設定ファイルを読み込む（見つからなければ環境変数のみで解決）
pub fn load_config_or_default(config: Option<&Path>) -> anyhow::Result<ConfigResolver> {
    if let Some(path) = config {
        return Ok(ConfigResolver::load(path)?);
    }

    let found = shipyard_config::find_repo_root()
        .and_then(|root| shipyard_config::find_config_file(&root));
    match found {
        Ok(path) => Ok(ConfigResolver::load(&path)?),
        Err(e) => {
            tracing::debug!("No config file, using environment only: {}", e);
            Ok(ConfigResolver::default())
        }
    }
}

/// プッシュ先とスタブ用のレジストリ座標を解決
pub fn resolve_registries(
    args: &RegistryArgs,
    config: &ConfigResolver,
) -> anyhow::Result<(RegistryCoordinates, RegistryCoordinates)> {
    let primary = RegistryCoordinates::resolve(
        args.registry.as_deref(),
        args.registry_path.as_deref(),
        config,
    )
    .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    let stub = RegistryCoordinates::resolve_stub(
        args.stub_registry.as_deref(),
        args.stub_registry_path.as_deref(),
        &primary,
        config,
    )?;

    Ok((primary, stub))
}

/// リリースエラーをユーザー向けのメッセージに変換
pub fn release_error(e: ReleaseError) -> anyhow::Error {
    eprintln!("{} {}", "✗".red(), "リリースに失敗しました".red());
    anyhow::anyhow!(e.user_message())
}
