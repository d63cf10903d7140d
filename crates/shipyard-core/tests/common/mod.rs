use async_trait::async_trait;
use shipyard_build::{BuildError, BuildResult, CommandExecutor, RegistryCoordinates, ShellCommand};
use shipyard_core::{PushOptions, ReleaseSettings};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

pub const REPO_URL: &str = "https://github.com/org/containers";

pub struct TestRepo {
    pub root: TempDir,
    pub scratch: TempDir,
}

impl TestRepo {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        fs::write(
            root.path().join("package.json"),
            "{\n  \"name\": \"dev-containers\",\n  \"version\": \"0.1.0\"\n}\n",
        )
        .unwrap();
        fs::create_dir_all(root.path().join("containers")).unwrap();
        Self { root, scratch }
    }

    /// 単体の Dockerfile を持つ定義を追加
    pub fn add_definition(&self, id: &str) -> &Self {
        let dot = self.dot_devcontainer(id);
        fs::create_dir_all(&dot).unwrap();
        fs::write(dot.join("Dockerfile"), "FROM debian:bullseye\nRUN apt-get update\n").unwrap();
        fs::write(
            dot.join("devcontainer.json"),
            format!("{{\n  \"name\": \"{}\",\n  \"dockerFile\": \"Dockerfile\"\n}}\n", id),
        )
        .unwrap();
        self
    }

    /// `base.Dockerfile` を持つ定義を追加
    #[allow(dead_code)]
    pub fn add_base_definition(&self, id: &str) -> &Self {
        let dot = self.dot_devcontainer(id);
        fs::create_dir_all(&dot).unwrap();
        fs::write(dot.join("base.Dockerfile"), "FROM python:3\nRUN pip install pylint\n").unwrap();
        fs::write(
            dot.join("devcontainer.json"),
            format!(
                "{{\n  // base image\n  \"name\": \"{}\",\n  \"dockerFile\": \"base.Dockerfile\",\n  \"context\": \"..\",\n}}\n",
                id
            ),
        )
        .unwrap();
        self
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn dot_devcontainer(&self, id: &str) -> PathBuf {
        self.root.path().join("containers").join(id).join(".devcontainer")
    }

    pub fn staging_root(&self) -> PathBuf {
        self.scratch.path().join("staging")
    }

    #[allow(dead_code)]
    pub fn output_dir(&self) -> PathBuf {
        self.scratch.path().to_path_buf()
    }

    pub fn settings(&self) -> ReleaseSettings {
        let mut settings = ReleaseSettings {
            dev_container_json_preamble: "For format details, see https://aka.ms/devcontainer.json"
                .to_string(),
            repo_url: REPO_URL.to_string(),
            staging_root: self.staging_root(),
            ..Default::default()
        };
        settings.stub.docker_file_preamble = "Stub image".to_string();
        settings.stub.repo_url = REPO_URL.to_string();
        settings
    }
}

pub fn push_options(release: &str) -> PushOptions {
    PushOptions {
        release: release.to_string(),
        update_latest: false,
        registry: RegistryCoordinates::new("docker.io", "org"),
        stub_registry: RegistryCoordinates::new("mcr.example.com", "public"),
        definition_id: None,
        push_images: true,
        simulate: false,
    }
}

/// 実行したコマンドを記録するだけの実行器
#[derive(Default)]
pub struct RecordingExecutor {
    pub commands: Mutex<Vec<ShellCommand>>,
    /// このコマンドラインを含むコマンドは終了コード 1 で失敗させる
    pub fail_on: Option<String>,
    /// `pack` 実行時に作業ディレクトリへ作成するアーカイブ名
    pub pack_output: Option<String>,
}

#[allow(dead_code)]
impl RecordingExecutor {
    pub fn failing_on(needle: &str) -> Self {
        Self {
            fail_on: Some(needle.to_string()),
            ..Default::default()
        }
    }

    pub fn packing(file_name: &str) -> Self {
        Self {
            pack_output: Some(file_name.to_string()),
            ..Default::default()
        }
    }

    pub fn commands(&self) -> Vec<ShellCommand> {
        self.commands.lock().unwrap().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.commands()
            .iter()
            .map(ShellCommand::command_line)
            .collect()
    }

    /// 指定したサブコマンドの実行
    pub fn invocations(&self, subcommand: &str) -> Vec<ShellCommand> {
        self.commands()
            .into_iter()
            .filter(|c| c.args.first().map(String::as_str) == Some(subcommand))
            .collect()
    }
}

#[async_trait]
impl CommandExecutor for RecordingExecutor {
    async fn run(&self, command: &ShellCommand) -> BuildResult<()> {
        self.commands.lock().unwrap().push(command.clone());

        let line = command.command_line();
        if let Some(needle) = &self.fail_on
            && line.contains(needle.as_str())
        {
            return Err(BuildError::ProcessFailure {
                command: line,
                code: Some(1),
                signal: None,
            });
        }

        if let Some(file_name) = &self.pack_output
            && command.program.ends_with("pack")
        {
            fs::write(command.cwd.join(file_name), b"archive").unwrap();
        }

        Ok(())
    }
}
