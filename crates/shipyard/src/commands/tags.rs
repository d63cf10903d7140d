use crate::utils;
use shipyard_build::{RegistryCoordinates, normalize_version, tag_list};
use std::path::Path;

pub fn handle(
    definition: &str,
    release: &str,
    update_latest: bool,
    registry: Option<&str>,
    registry_path: Option<&str>,
    config: Option<&Path>,
) -> anyhow::Result<()> {
    let config = utils::load_config_or_default(config)?;
    let coordinates = RegistryCoordinates::resolve(registry, registry_path, &config)
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    let tags = tag_list(
        definition,
        &normalize_version(release),
        update_latest,
        &coordinates,
    )?;
    for tag in tags {
        println!("{}", tag);
    }

    Ok(())
}
