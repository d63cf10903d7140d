//! 外部コマンドの実行
//!
//! docker / yarn / npm などの外部ツールはシェル経由で起動し、標準入出力は
//! 親プロセスから継承します。失敗は終了コードのみで判定します。

use crate::error::{BuildError, BuildResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;

/// シェルで実行するコマンド
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    /// 実行するプログラム（`yarn install` のようにシェル断片をそのまま含めてもよい）
    pub program: String,
    /// 引数（シェル用にエスケープされる）
    pub args: Vec<String>,
    /// 作業ディレクトリ
    pub cwd: PathBuf,
}

impl ShellCommand {
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.display().to_string())
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// シェルに渡すコマンドライン
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&shell_escape(arg));
        }
        line
    }
}

/// シェル用にエスケープ
///
/// 安全な文字だけで構成される場合はそのまま返します。
pub fn shell_escape(s: &str) -> String {
    let is_safe = !s.is_empty()
        && s.chars().all(|c| {
            c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ':' | '=' | '@' | '+' | ',')
        });

    if is_safe {
        s.to_string()
    } else {
        // シングルクォートでラップしてエスケープ
        format!("'{}'", s.replace('\'', "'\\''"))
    }
}

/// 外部コマンドの実行を抽象化
///
/// パイプラインは実行器に対してジェネリックなので、テストでは記録用の実装に差し替えられます。
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// コマンドを実行し、終了を待つ
    ///
    /// 終了コードが 0 以外の場合は `ProcessFailure` を返します。
    async fn run(&self, command: &ShellCommand) -> BuildResult<()>;
}

/// シェル経由で実際にコマンドを起動する実行器
#[derive(Debug, Default, Clone)]
pub struct ShellExecutor;

impl ShellExecutor {
    pub fn new() -> Self {
        Self
    }

    #[cfg(unix)]
    fn shell(line: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(line);
        cmd
    }

    #[cfg(windows)]
    fn shell(line: &str) -> Command {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(line);
        cmd
    }
}

#[async_trait]
impl CommandExecutor for ShellExecutor {
    async fn run(&self, command: &ShellCommand) -> BuildResult<()> {
        let line = command.command_line();
        tracing::debug!(cwd = %command.cwd.display(), "Running: {}", line);

        let status = Self::shell(&line)
            .current_dir(&command.cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|source| BuildError::ProcessSpawn {
                command: line.clone(),
                source,
            })?;

        if !status.success() {
            return Err(BuildError::ProcessFailure {
                command: line,
                code: status.code(),
                signal: exit_signal(&status),
            });
        }

        Ok(())
    }
}

#[cfg(unix)]
fn exit_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: &ExitStatus) -> Option<i32> {
    None
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_escape() {
        assert_eq!(shell_escape("docker.io/org/app:1.2"), "docker.io/org/app:1.2");
        assert_eq!(shell_escape("/tmp/with space"), "'/tmp/with space'");
        assert_eq!(shell_escape("it's"), "'it'\\''s'");
        assert_eq!(shell_escape(""), "''");
    }

    #[test]
    fn test_command_line() {
        let cmd = ShellCommand::new("docker", "/tmp")
            .arg("build")
            .path_arg(Path::new("/tmp/my context"))
            .args(["-t", "docker.io/org/app:1.2"]);

        assert_eq!(
            cmd.command_line(),
            "docker build '/tmp/my context' -t docker.io/org/app:1.2"
        );
    }

    #[test]
    fn test_program_is_not_escaped() {
        let cmd = ShellCommand::new("yarn install", "/tmp");
        assert_eq!(cmd.command_line(), "yarn install");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_shell_executor_success() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cmd = ShellCommand::new("touch", temp_dir.path()).arg("marker");

        ShellExecutor::new().run(&cmd).await.unwrap();
        assert!(temp_dir.path().join("marker").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_shell_executor_failure_carries_exit_code() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cmd = ShellCommand::new("exit 3", temp_dir.path());

        match ShellExecutor::new().run(&cmd).await {
            Err(BuildError::ProcessFailure { command, code, .. }) => {
                assert_eq!(command, "exit 3");
                assert_eq!(code, Some(3));
            }
            other => panic!("Expected ProcessFailure, got {:?}", other),
        }
    }
}
