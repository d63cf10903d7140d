use crate::utils;
use crate::{RegistryArgs, RepoArgs};
use colored::Colorize;
use shipyard_build::ShellExecutor;
use shipyard_core::{PushOptions, ReleaseSettings};

pub struct PushArgs {
    pub release: String,
    pub update_latest: bool,
    pub definition: Option<String>,
    pub keep_staging: bool,
}

pub async fn handle(
    repo: &RepoArgs,
    registry: &RegistryArgs,
    args: PushArgs,
) -> anyhow::Result<()> {
    println!("{}", format!("リリース {} をプッシュ中...", args.release).blue());

    let ctx = utils::load_context(repo)?;
    let settings = ReleaseSettings::from_config(&ctx.config).map_err(utils::release_error)?;
    let (primary, stub) = utils::resolve_registries(registry, &ctx.config)?;

    println!("{} {}", "レジストリ:".dimmed(), primary.to_string().cyan());
    println!("{} {}", "スタブ:".dimmed(), stub.to_string().cyan());

    let options = PushOptions {
        release: args.release,
        update_latest: args.update_latest,
        registry: primary,
        stub_registry: stub,
        definition_id: args.definition,
        push_images: true,
        simulate: false,
    };

    let executor = ShellExecutor::new();
    let (staging, report) = shipyard_core::push(&executor, &ctx.repo_root, &settings, &options)
        .await
        .map_err(utils::release_error)?;

    println!();
    for definition in &report.definitions {
        match definition.state {
            shipyard_core::DefinitionState::Finalized => {
                println!("  {} {}", "✓".green(), definition.id.cyan());
            }
            state => {
                println!("  {} {} ({})", "-".dimmed(), definition.id.dimmed(), state);
            }
        }
    }
    println!(
        "\n{} {} 件をプッシュしました（スキップ: {} 件）",
        "✓".green(),
        report.pushed().count(),
        report.skipped().count()
    );

    if args.keep_staging {
        let path = staging.persist();
        println!("{} {}", "ステージング領域:".dimmed(), path.display());
    } else {
        staging.remove().await.map_err(utils::release_error)?;
    }

    Ok(())
}
