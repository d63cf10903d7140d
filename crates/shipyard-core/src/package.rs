//! パッケージング
//!
//! プッシュ後のステージング領域で package.json のバージョンを書き換え、依存関係の
//! インストールとアーカイブ作成を外部コマンドで行います。

use crate::error::ReleaseResult;
use crate::manifest::{MANIFEST_FILE, PackageManifest, package_version};
use crate::push::{PushOptions, push};
use crate::settings::ReleaseSettings;
use colored::Colorize;
use shipyard_build::{CommandExecutor, ShellCommand, fsutil, normalize_version};
use std::path::{Path, PathBuf};
use tracing::info;

/// パッケージングのオプション
#[derive(Debug, Clone)]
pub struct PackageOptions {
    pub push: PushOptions,
    /// レジストリへプッシュせず、アーカイブを移動せずに終了する
    pub simulate: bool,
    /// アーカイブの出力先
    pub output_dir: PathBuf,
}

/// プッシュしてからパッケージを作成
///
/// 作成したアーカイブのパスを返します。シミュレート時はプッシュも省略し `None` を返します。
/// ステージング領域は成功・失敗にかかわらず削除されます。
pub async fn package<E>(
    executor: &E,
    repo_root: &Path,
    settings: &ReleaseSettings,
    options: &PackageOptions,
) -> ReleaseResult<Option<PathBuf>>
where
    E: CommandExecutor + ?Sized,
{
    let release = &options.push.release;
    let push_options = PushOptions {
        simulate: options.simulate || options.push.simulate,
        ..options.push.clone()
    };
    let (staging, _report) = push(executor, repo_root, settings, &push_options).await?;

    println!("\n{} Package {}", "▶".green(), release.cyan().bold());

    let mut manifest = PackageManifest::load(&staging.path().join(MANIFEST_FILE)).await?;
    let version = package_version(&normalize_version(release), &manifest.version);
    println!("  {} Updating package.json with version {}", "→".blue(), version);
    manifest.set_version(&version).await?;

    println!("  {} Packaging...", "→".blue());
    executor
        .run(&ShellCommand::new(
            &settings.dependency_install_command,
            staging.path(),
        ))
        .await?;
    executor
        .run(&ShellCommand::new(&settings.pack_command, staging.path()))
        .await?;

    let output = if options.simulate {
        println!("  {} Simulating: skipping package move", "→".blue());
        None
    } else {
        let packed = staging.path().join(manifest.packed_file_name());
        let output = options.output_dir.join(manifest.release_file_name());
        info!(from = %packed.display(), to = %output.display(), "Moving package");
        fsutil::move_file(&packed, &output).await?;
        Some(output)
    };

    println!("  {} Cleaning up...", "→".blue());
    staging.remove().await?;

    println!("{} {}", "✓".green(), "Done".green());
    Ok(output)
}
