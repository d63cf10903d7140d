//! Shipyard リリースオーケストレーション
//!
//! リポジトリのスナップショットをステージングし、定義ごとにイメージをビルド・
//! プッシュし、必要に応じて配布用アーカイブを作成します。

pub mod discovery;
pub mod error;
pub mod manifest;
pub mod package;
pub mod push;
pub mod settings;
pub mod staging;

pub use discovery::discover_definitions;
pub use error::{ReleaseError, ReleaseResult};
pub use manifest::{PackageManifest, package_version};
pub use package::{PackageOptions, package};
pub use push::{DefinitionReport, DefinitionState, PushOptions, PushReport, push, push_all};
pub use settings::ReleaseSettings;
pub use staging::{StagingArea, annotate_descriptor};
