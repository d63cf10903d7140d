mod common;

use common::{RecordingExecutor, TestRepo, push_options};
use shipyard_build::BuildError;
use shipyard_core::{PackageOptions, ReleaseError, package};
use std::fs;

fn package_options(repo: &TestRepo, release: &str, simulate: bool) -> PackageOptions {
    PackageOptions {
        push: push_options(release),
        simulate,
        output_dir: repo.output_dir(),
    }
}

#[tokio::test]
async fn test_simulate_returns_no_output_and_removes_staging() {
    let repo = TestRepo::new();
    repo.add_definition("go");
    let settings = repo.settings();

    let executor = RecordingExecutor::packing("dev-containers-1.2.3.tgz");
    let output = package(
        &executor,
        repo.path(),
        &settings,
        &package_options(&repo, "v1.2.3", true),
    )
    .await
    .unwrap();

    assert_eq!(output, None);
    assert!(!settings.staging_root.join("1.2.3").exists());
    assert!(!repo.output_dir().join("dev-containers-v1.2.3.tgz").exists());

    // ビルドとパックは行うがレジストリへはプッシュしない
    assert_eq!(executor.invocations("build").len(), 1);
    assert!(executor.invocations("push").is_empty());
    assert!(executor.lines().iter().any(|l| l == "npm pack"));
}

#[tokio::test]
async fn test_package_moves_archive_with_release_name() {
    let repo = TestRepo::new();
    repo.add_definition("go");
    let settings = repo.settings();

    let executor = RecordingExecutor::packing("dev-containers-1.2.3.tgz");
    let output = package(
        &executor,
        repo.path(),
        &settings,
        &package_options(&repo, "v1.2.3", false),
    )
    .await
    .unwrap();

    let expected = repo.output_dir().join("dev-containers-v1.2.3.tgz");
    assert_eq!(output, Some(expected.clone()));
    assert!(expected.is_file());
    assert!(!settings.staging_root.join("1.2.3").exists());

    // インストールとパックはステージング領域で、プッシュの後に実行
    let commands = executor.commands();
    let programs: Vec<&str> = commands.iter().map(|c| c.program.as_str()).collect();
    assert_eq!(
        &programs[programs.len() - 2..],
        &["yarn install", "npm pack"]
    );
    assert_eq!(commands.last().unwrap().cwd, settings.staging_root.join("1.2.3"));
}

#[tokio::test]
async fn test_dev_package_without_push() {
    let repo = TestRepo::new();
    repo.add_definition("go");
    let settings = repo.settings();

    let mut options = package_options(&repo, "dev", false);
    options.push.push_images = false;

    let executor = RecordingExecutor::packing("dev-containers-0.1.0-dev.tgz");
    let output = package(&executor, repo.path(), &settings, &options)
        .await
        .unwrap();

    assert_eq!(
        output,
        Some(repo.output_dir().join("dev-containers-v0.1.0-dev.tgz"))
    );
    assert_eq!(executor.commands().len(), 2);
}

#[tokio::test]
async fn test_missing_archive_fails_and_cleans_up() {
    let repo = TestRepo::new();
    repo.add_definition("go");
    let settings = repo.settings();

    // pack が何も出力しない
    let executor = RecordingExecutor::default();
    let result = package(
        &executor,
        repo.path(),
        &settings,
        &package_options(&repo, "v1.2.3", false),
    )
    .await;

    assert!(matches!(
        result,
        Err(ReleaseError::Build(BuildError::FileSystem { .. }))
    ));
    assert!(!settings.staging_root.join("1.2.3").exists());
}

#[cfg(unix)]
#[tokio::test]
async fn test_staged_manifest_version_is_rewritten() {
    let repo = TestRepo::new();
    repo.add_definition("go");
    let mut settings = repo.settings();
    settings.dependency_install_command = "true".to_string();
    // npm pack の代わりに package.json を出力先へコピー
    settings.pack_command = format!(
        "cp package.json {}/packed.json && touch dev-containers-2.0.0.tgz",
        repo.output_dir().display()
    );

    let output = package(
        &shipyard_build::ShellExecutor::new(),
        repo.path(),
        &settings,
        &{
            let mut options = package_options(&repo, "v2.0.0", false);
            options.push.push_images = false;
            options
        },
    )
    .await
    .unwrap();

    let packed = fs::read_to_string(repo.output_dir().join("packed.json")).unwrap();
    assert!(packed.contains("\"version\": \"2.0.0\""));
    assert!(output.unwrap().ends_with("dev-containers-v2.0.0.tgz"));

    // 元の package.json は変更しない
    let original = fs::read_to_string(repo.path().join("package.json")).unwrap();
    assert!(original.contains("\"version\": \"0.1.0\""));
}
