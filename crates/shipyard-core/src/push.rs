//! プッシュオーケストレーション
//!
//! ステージング済みの各定義について、出自コメントの付与、ビルド、全タグのプッシュ、
//! スタブの同期、`base.Dockerfile` の後始末を順に実行します。定義は1つずつ
//! 処理し、どこかで失敗したらその時点でリリース全体を中断します。
//!
//! 定義ごとの状態遷移:
//!
//! ```text
//! Discovered → Annotated → Skipped
//!                        → BuildPending → Built → Pushed → StubSynced → Finalized
//! ```

use crate::discovery::discover_definitions;
use crate::error::{ReleaseError, ReleaseResult};
use crate::settings::ReleaseSettings;
use crate::staging::{StagingArea, annotate_descriptor};
use colored::Colorize;
use shipyard_build::{
    BuildResolver, CommandExecutor, DevContainerDescriptor, DockerfileKind, ImageBuilder,
    ImagePusher, RegistryCoordinates, ResolvedDockerfile, StubAction, StubManager, TextPatch,
    fsutil, normalize_version, patch_file, tag_list,
};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// プッシュのオプション
#[derive(Debug, Clone)]
pub struct PushOptions {
    /// リリースラベル（`v1.2.3`, `master` など）
    pub release: String,
    /// フローティングタグ（`MAJOR`, `latest`）も更新するか
    pub update_latest: bool,
    pub registry: RegistryCoordinates,
    pub stub_registry: RegistryCoordinates,
    /// 指定時はこの定義だけを対象にし、スキップ／対象リストを無視する
    pub definition_id: Option<String>,
    /// false の場合は出自コメントの付与のみ行い、ビルド・プッシュしない
    pub push_images: bool,
    /// true の場合はビルドとスタブ同期のみ行い、レジストリへはプッシュしない
    pub simulate: bool,
}

/// 定義の処理状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionState {
    Discovered,
    Annotated,
    Skipped,
    BuildPending,
    Built,
    Pushed,
    StubSynced,
    Finalized,
}

impl DefinitionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DefinitionState::Skipped | DefinitionState::Finalized)
    }
}

impl fmt::Display for DefinitionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DefinitionState::Discovered => "discovered",
            DefinitionState::Annotated => "annotated",
            DefinitionState::Skipped => "skipped",
            DefinitionState::BuildPending => "build-pending",
            DefinitionState::Built => "built",
            DefinitionState::Pushed => "pushed",
            DefinitionState::StubSynced => "stub-synced",
            DefinitionState::Finalized => "finalized",
        };
        f.write_str(name)
    }
}

/// 定義ごとの結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionReport {
    pub id: String,
    pub state: DefinitionState,
    pub tags: Vec<String>,
    pub stub: Option<StubAction>,
}

/// プッシュ全体の結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushReport {
    pub definitions: Vec<DefinitionReport>,
}

impl PushReport {
    pub fn get(&self, definition_id: &str) -> Option<&DefinitionReport> {
        self.definitions.iter().find(|d| d.id == definition_id)
    }

    /// ビルド・プッシュまで完了した定義
    pub fn pushed(&self) -> impl Iterator<Item = &DefinitionReport> {
        self.definitions
            .iter()
            .filter(|d| d.state == DefinitionState::Finalized)
    }

    pub fn skipped(&self) -> impl Iterator<Item = &DefinitionReport> {
        self.definitions
            .iter()
            .filter(|d| d.state == DefinitionState::Skipped)
    }
}

/// 1つの定義の処理
///
/// 各ステージは直前の状態を前提とし、成功時に次の状態へ進めます。
struct DefinitionTask {
    id: String,
    path: PathBuf,
    state: DefinitionState,
    dockerfile: Option<ResolvedDockerfile>,
    descriptor: Option<DevContainerDescriptor>,
    context: Option<PathBuf>,
    tags: Vec<String>,
    stub: Option<StubAction>,
}

impl DefinitionTask {
    fn new(id: String, path: PathBuf) -> Self {
        Self {
            id,
            path,
            state: DefinitionState::Discovered,
            dockerfile: None,
            descriptor: None,
            context: None,
            tags: Vec::new(),
            stub: None,
        }
    }

    fn advance(&mut self, from: DefinitionState, to: DefinitionState) {
        debug_assert_eq!(self.state, from, "unexpected state for {}", self.id);
        debug!(definition = %self.id, "{} -> {}", from, to);
        self.state = to;
    }

    fn resolver(&self) -> BuildResolver {
        BuildResolver::new(&self.path)
    }

    fn report(self) -> DefinitionReport {
        DefinitionReport {
            id: self.id,
            state: self.state,
            tags: self.tags,
            stub: self.stub,
        }
    }
}

/// ステージング済みの定義を処理するパイプライン
struct PushPipeline<'a, E: CommandExecutor + ?Sized> {
    executor: &'a E,
    settings: &'a ReleaseSettings,
    options: &'a PushOptions,
    builder: ImageBuilder,
    pusher: ImagePusher,
    stubs: StubManager,
}

impl<'a, E: CommandExecutor + ?Sized> PushPipeline<'a, E> {
    fn new(executor: &'a E, settings: &'a ReleaseSettings, options: &'a PushOptions) -> Self {
        Self {
            executor,
            settings,
            options,
            builder: ImageBuilder::new(&settings.container_cli),
            pusher: ImagePusher::new(&settings.container_cli),
            stubs: StubManager::new(settings.stub.clone()),
        }
    }

    async fn annotate(&self, task: &mut DefinitionTask) -> ReleaseResult<()> {
        annotate_descriptor(&task.path, &task.id, &self.options.release, self.settings).await?;
        task.advance(DefinitionState::Discovered, DefinitionState::Annotated);
        Ok(())
    }

    fn select(&self, task: &mut DefinitionTask) {
        let selected = self.options.push_images
            && (self.options.definition_id.is_some() || self.settings.should_push(&task.id));

        if selected {
            task.advance(DefinitionState::Annotated, DefinitionState::BuildPending);
        } else {
            info!(definition = %task.id, "Skipping definition");
            task.advance(DefinitionState::Annotated, DefinitionState::Skipped);
        }
    }

    async fn build(&self, task: &mut DefinitionTask) -> ReleaseResult<()> {
        let resolver = task.resolver();
        let dockerfile = resolver.resolve_dockerfile().await?;

        let version = normalize_version(&self.options.release);
        let tags = tag_list(
            &task.id,
            &version,
            self.options.update_latest,
            &self.options.registry,
        )?;
        println!("  {} Tags:", "→".blue());
        for tag in &tags {
            println!("      {}", tag.cyan());
        }

        let descriptor = DevContainerDescriptor::load(&resolver.descriptor_path()).await?;
        let context = resolver.resolve_context(&descriptor).await?;

        self.builder
            .build_image(self.executor, &context, &dockerfile.path, &tags)
            .await?;

        task.dockerfile = Some(dockerfile);
        task.descriptor = Some(descriptor);
        task.context = Some(context);
        task.tags = tags;
        task.advance(DefinitionState::BuildPending, DefinitionState::Built);
        Ok(())
    }

    async fn push(&self, task: &mut DefinitionTask) -> ReleaseResult<()> {
        if self.options.simulate {
            println!(
                "  {} Simulating: skipping push of {}",
                "→".blue(),
                task.id.cyan()
            );
            info!(definition = %task.id, "Simulating, registry push skipped");
        } else {
            println!("  {} Pushing {}...", "→".blue(), task.id.cyan());
            let cwd = task.context.as_deref().unwrap_or(&task.path);
            self.pusher.push_all(self.executor, cwd, &task.tags).await?;
        }

        task.advance(DefinitionState::Built, DefinitionState::Pushed);
        Ok(())
    }

    async fn sync_stub(&self, task: &mut DefinitionTask) -> ReleaseResult<()> {
        let has_base = task.dockerfile.as_ref().is_some_and(ResolvedDockerfile::has_base);
        let resolver = task.resolver();
        let dot_devcontainer = resolver.dot_devcontainer();

        let action = if has_base {
            self.stubs
                .update_stub(
                    dot_devcontainer,
                    &task.id,
                    &self.options.release,
                    has_base,
                    &self.options.stub_registry,
                )
                .await?
        } else {
            self.stubs
                .create_stub(
                    dot_devcontainer,
                    &task.id,
                    &self.options.release,
                    has_base,
                    &self.options.stub_registry,
                )
                .await?
        };

        task.stub = Some(action);
        task.advance(DefinitionState::Pushed, DefinitionState::StubSynced);
        Ok(())
    }

    /// `base.Dockerfile` を使った場合のみ、devcontainer.json の参照を `Dockerfile` に
    /// 書き換えて `base.Dockerfile` を削除する
    async fn finalize(&self, task: &mut DefinitionTask) -> ReleaseResult<()> {
        if let Some(dockerfile) = task.dockerfile.as_ref()
            && dockerfile.has_base()
        {
            let descriptor_path = match task.descriptor.as_ref() {
                Some(descriptor) => descriptor.path.clone(),
                None => task.resolver().descriptor_path(),
            };

            info!(definition = %task.id, "Updating devcontainer.json");
            let patch = TextPatch::literal(
                format!("\"{}\"", DockerfileKind::Base.file_name()),
                format!("\"{}\"", DockerfileKind::Final.file_name()),
            );
            patch_file(&descriptor_path, &patch).await?;

            info!(definition = %task.id, "Removing base.Dockerfile");
            fsutil::remove_file(&dockerfile.path).await?;
        }

        task.advance(DefinitionState::StubSynced, DefinitionState::Finalized);
        Ok(())
    }

    async fn run(&self, task: &mut DefinitionTask) -> ReleaseResult<()> {
        println!(
            "\n{} {} {}",
            "▶".green(),
            task.id.cyan().bold(),
            self.options.release
        );
        self.build(task).await?;
        self.push(task).await?;
        self.sync_stub(task).await?;
        self.finalize(task).await?;
        println!("  {} {}", "✓".green(), "Done".green());
        Ok(())
    }
}

/// ステージング済みの定義をすべて処理
///
/// 1. 対象定義の決定（`definition_id` 指定時はその1つだけ）
/// 2. 全定義の devcontainer.json に出自コメントを付与
/// 3. スキップ／対象リストに従って選別
/// 4. 対象定義をビルド → 全タグをプッシュ → スタブ同期 → 後始末
pub async fn push_all<E>(
    executor: &E,
    staging: &StagingArea,
    settings: &ReleaseSettings,
    options: &PushOptions,
) -> ReleaseResult<PushReport>
where
    E: CommandExecutor + ?Sized,
{
    let definition_ids = match &options.definition_id {
        Some(id) => {
            if !staging.definition_path(id).is_dir() {
                return Err(ReleaseError::DefinitionNotFound(id.clone()));
            }
            vec![id.clone()]
        }
        None => discover_definitions(&staging.definitions_dir()).await?,
    };

    let pipeline = PushPipeline::new(executor, settings, options);
    let mut tasks: Vec<DefinitionTask> = definition_ids
        .into_iter()
        .map(|id| {
            let path = staging.definition_path(&id);
            DefinitionTask::new(id, path)
        })
        .collect();

    for task in &mut tasks {
        pipeline.annotate(task).await?;
    }

    for task in &mut tasks {
        pipeline.select(task);
        if task.state == DefinitionState::BuildPending {
            pipeline.run(task).await?;
        }
    }

    Ok(PushReport {
        definitions: tasks.into_iter().map(DefinitionTask::report).collect(),
    })
}

/// リポジトリをステージングしてからプッシュ
///
/// ステージング領域は `{stagingRoot}/{version}`。失敗時はステージング領域を削除して
/// エラーを返し、成功時は呼び出し側に所有権を渡します。
pub async fn push<E>(
    executor: &E,
    repo_root: &Path,
    settings: &ReleaseSettings,
    options: &PushOptions,
) -> ReleaseResult<(StagingArea, PushReport)>
where
    E: CommandExecutor + ?Sized,
{
    let version = normalize_version(&options.release);
    let dest = settings.staging_root.join(version.as_str());
    println!("{} Copying files to {}", "→".blue(), dest.display());

    let staging = StagingArea::create(repo_root, &settings.files_to_stage, &dest).await?;

    let report = push_all(executor, &staging, settings, options).await?;
    Ok((staging, report))
}
