mod commands;
mod utils;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shipyard")]
#[command(about = "開発コンテナ定義のリリースパイプライン", long_about = None)]
struct Cli {
    /// 詳細なログを出力（RUST_LOG が優先）
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// リポジトリと設定ファイルの指定
#[derive(Args, Debug, Clone)]
pub struct RepoArgs {
    /// リポジトリルート（省略時は SHIPYARD_REPO_ROOT またはカレントディレクトリから探索）
    #[arg(long)]
    pub repo: Option<PathBuf>,

    /// 設定ファイル（省略時は SHIPYARD_CONFIG_PATH、build/config.json、config.json の順）
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// レジストリの指定
#[derive(Args, Debug, Clone, Default)]
pub struct RegistryArgs {
    /// プッシュ先レジストリ（デフォルト: containerRegistry 設定、docker.io）
    #[arg(long)]
    pub registry: Option<String>,

    /// レジストリ内のパス（デフォルト: registryUser 設定）
    #[arg(long)]
    pub registry_path: Option<String>,

    /// スタブ用レジストリ（デフォルト: stubRegistry 設定、プッシュ先レジストリ）
    #[arg(long)]
    pub stub_registry: Option<String>,

    /// スタブ用レジストリ内のパス（デフォルト: stubRegistryPath 設定、プッシュ先のパス）
    #[arg(long)]
    pub stub_registry_path: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// 定義のイメージをビルドしてプッシュ
    Push {
        /// リリースラベル（v1.2.3, 1.2.3, master）
        release: String,
        /// フローティングタグ（MAJOR, latest）も更新
        #[arg(long)]
        update_latest: bool,
        /// この定義だけをプッシュ（スキップ・対象リストを無視）
        #[arg(short, long)]
        definition: Option<String>,
        /// ステージング領域を削除せずに残す
        #[arg(long)]
        keep_staging: bool,
        #[command(flatten)]
        registry: RegistryArgs,
        #[command(flatten)]
        repo: RepoArgs,
    },
    /// イメージをプッシュしてから配布用パッケージを作成
    Package {
        /// リリースラベル（v1.2.3, 1.2.3, master, dev）
        release: String,
        /// フローティングタグ（MAJOR, latest）も更新
        #[arg(long)]
        update_latest: bool,
        /// レジストリへプッシュせず、アーカイブも移動しない（ステージング領域は削除）
        #[arg(long)]
        simulate: bool,
        /// イメージをビルド・プッシュせずにパッケージのみ作成
        #[arg(long)]
        no_push: bool,
        /// アーカイブの出力先（デフォルト: リポジトリルート）
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        #[command(flatten)]
        registry: RegistryArgs,
        #[command(flatten)]
        repo: RepoArgs,
    },
    /// 定義のイメージタグ一覧を表示
    Tags {
        /// 定義ID（containers/ 以下のディレクトリ名）
        definition: String,
        /// リリースラベル（v1.2.3, 1.2.3）
        release: String,
        /// フローティングタグ（MAJOR, latest）も含める
        #[arg(long)]
        update_latest: bool,
        /// プッシュ先レジストリ
        #[arg(long)]
        registry: Option<String>,
        /// レジストリ内のパス
        #[arg(long)]
        registry_path: Option<String>,
        /// 設定ファイル
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// バージョン情報を表示
    Version,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Push {
            release,
            update_latest,
            definition,
            keep_staging,
            registry,
            repo,
        } => {
            commands::push::handle(
                &repo,
                &registry,
                commands::push::PushArgs {
                    release,
                    update_latest,
                    definition,
                    keep_staging,
                },
            )
            .await?;
        }
        Commands::Package {
            release,
            update_latest,
            simulate,
            no_push,
            output_dir,
            registry,
            repo,
        } => {
            commands::package::handle(
                &repo,
                &registry,
                commands::package::PackageArgs {
                    release,
                    update_latest,
                    simulate,
                    no_push,
                    output_dir,
                },
            )
            .await?;
        }
        Commands::Tags {
            definition,
            release,
            update_latest,
            registry,
            registry_path,
            config,
        } => {
            commands::tags::handle(
                &definition,
                &release,
                update_latest,
                registry.as_deref(),
                registry_path.as_deref(),
                config.as_deref(),
            )?;
        }
        Commands::Version => {
            println!("shipyard {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
