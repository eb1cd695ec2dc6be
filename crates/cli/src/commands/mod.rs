pub mod breadcrumbs;
pub mod build;
pub mod init;
pub mod preview;
pub mod validate;

use anyhow::{Context, Result};
use site_kit_content::ContentStore;
use site_kit_core::{SiteConfig, parse_site_toml};
use std::path::Path;

pub const CONFIG_FILE: &str = site_kit_validator::CONFIG_FILE;

/// Load site.toml and every collection of the site at `path`.
pub fn load_site(path: &Path) -> Result<(SiteConfig, ContentStore)> {
    if !path.exists() {
        anyhow::bail!("Site directory does not exist: {}", path.display());
    }

    let config_path = path.join(CONFIG_FILE);
    if !config_path.exists() {
        anyhow::bail!(
            "{} not found in {}\nRun 'site-kit init {}' first",
            CONFIG_FILE,
            path.display(),
            path.display()
        );
    }

    let config = parse_site_toml(&config_path).context("Failed to parse site.toml")?;
    let store = ContentStore::load(path, &config).context("Failed to load content")?;
    Ok((config, store))
}
