//! Shipyard イメージビルド機能
//!
//! リリースラベルからのタグ導出、Dockerfile の解決、イメージのビルドとプッシュ、
//! スタブ Dockerfile の生成・更新を提供します。外部ツール（docker など）は
//! [`CommandExecutor`] 経由で呼び出します。

pub mod builder;
pub mod descriptor;
pub mod error;
pub mod executor;
pub mod fsutil;
pub mod patch;
pub mod pusher;
pub mod resolver;
pub mod stub;
pub mod tags;

pub use builder::{DEFAULT_CONTAINER_CLI, ImageBuilder};
pub use descriptor::DevContainerDescriptor;
pub use error::{BuildError, BuildResult};
pub use executor::{CommandExecutor, ShellCommand, ShellExecutor};
pub use patch::{TextPatch, patch_file};
pub use pusher::{ImagePusher, split_image_tag};
pub use resolver::{BuildResolver, DockerfileKind, ResolvedDockerfile};
pub use stub::{StubAction, StubManager, StubSettings};
pub use tags::{RegistryCoordinates, Version, major_minor, normalize_version, tag_list};
