use crate::utils;
use crate::{RegistryArgs, RepoArgs};
use colored::Colorize;
use shipyard_build::ShellExecutor;
use shipyard_core::{PackageOptions, PushOptions, ReleaseSettings};
use std::path::PathBuf;

pub struct PackageArgs {
    pub release: String,
    pub update_latest: bool,
    pub simulate: bool,
    pub no_push: bool,
    pub output_dir: Option<PathBuf>,
}

pub async fn handle(
    repo: &RepoArgs,
    registry: &RegistryArgs,
    args: PackageArgs,
) -> anyhow::Result<()> {
    println!("{}", format!("リリース {} をパッケージング中...", args.release).blue());

    let ctx = utils::load_context(repo)?;
    let settings = ReleaseSettings::from_config(&ctx.config).map_err(utils::release_error)?;
    let (primary, stub) = utils::resolve_registries(registry, &ctx.config)?;

    let options = PackageOptions {
        push: PushOptions {
            release: args.release,
            update_latest: args.update_latest,
            registry: primary,
            stub_registry: stub,
            definition_id: None,
            push_images: !args.no_push,
            simulate: args.simulate,
        },
        simulate: args.simulate,
        output_dir: args.output_dir.unwrap_or_else(|| ctx.repo_root.clone()),
    };

    let executor = ShellExecutor::new();
    let output = shipyard_core::package(&executor, &ctx.repo_root, &settings, &options)
        .await
        .map_err(utils::release_error)?;

    match output {
        Some(path) => println!("\n{} {}", "パッケージ:".green(), path.display()),
        None => println!("\n{}", "シミュレートのためパッケージは出力されていません".dimmed()),
    }

    Ok(())
}
