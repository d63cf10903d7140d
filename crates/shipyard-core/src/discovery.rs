//! 定義ディレクトリの発見

use crate::error::ReleaseResult;
use shipyard_build::BuildError;
use std::path::Path;
use tracing::{debug, warn};

/// `containers/` 直下のサブディレクトリ名を定義IDとして列挙
///
/// 結果は名前順に並べます。ファイルは無視します。
#[tracing::instrument]
pub async fn discover_definitions(containers_dir: &Path) -> ReleaseResult<Vec<String>> {
    let fs_error = |source| BuildError::FileSystem {
        path: containers_dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(containers_dir).await.map_err(fs_error)?;
    let mut definitions = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(fs_error)? {
        let file_type = entry.file_type().await.map_err(fs_error)?;
        if !file_type.is_dir() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => definitions.push(name),
            Err(name) => warn!(
                name = %name.to_string_lossy(),
                "Ignoring definition directory with a non UTF-8 name"
            ),
        }
    }

    definitions.sort();
    debug!("Discovered {} definition(s)", definitions.len());
    Ok(definitions)
}
