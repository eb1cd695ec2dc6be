use crate::error::{Error, Result};
use crate::types::CollectionKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File formats a collection may be sourced from
pub const SUPPORTED_EXTENSIONS: &[&str] = &["md", "json", "yml", "yaml"];

/// Complete site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Content root, relative to the site directory
    pub content_dir: PathBuf,
    pub build: BuildConfig,
    pub pages: CollectionSource,
    pub news: CollectionSource,
    pub nav: CollectionSource,
}

/// Build settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    pub output: PathBuf,
    /// Abort the build when a single page fails to render
    pub fail_on_error: bool,
}

/// Where a collection's files live, relative to the content dir
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSource {
    pub dir: PathBuf,
    pub extensions: Vec<String>,
}

impl CollectionSource {
    fn default_for(kind: CollectionKind) -> Self {
        let extensions: &[&str] = match kind {
            CollectionKind::Pages | CollectionKind::News => SUPPORTED_EXTENSIONS,
            CollectionKind::Nav => &["json"],
        };
        Self {
            dir: PathBuf::from(kind.name()),
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Whether `path` has one of this collection's extensions
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| {
                let ext = ext.to_lowercase();
                self.extensions.iter().any(|allowed| *allowed == ext)
            })
            .unwrap_or(false)
    }
}

impl SiteConfig {
    pub fn collection(&self, kind: CollectionKind) -> &CollectionSource {
        match kind {
            CollectionKind::Pages => &self.pages,
            CollectionKind::News => &self.news,
            CollectionKind::Nav => &self.nav,
        }
    }

    /// Absolute-ish directory of a collection under `site_root`
    pub fn collection_dir(&self, site_root: &Path, kind: CollectionKind) -> PathBuf {
        site_root
            .join(&self.content_dir)
            .join(&self.collection(kind).dir)
    }
}

/// Raw TOML configuration structure
/// This matches the site.toml file structure exactly
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    site: RawSite,
    #[serde(default)]
    build: RawBuild,
    #[serde(default)]
    collections: RawCollections,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSite {
    name: String,
    base_url: Option<String>,
    content_dir: Option<String>, // Convert to PathBuf
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBuild {
    output: Option<String>,
    #[serde(default)]
    fail_on_error: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCollections {
    pages: Option<RawCollection>,
    news: Option<RawCollection>,
    nav: Option<RawCollection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCollection {
    dir: Option<String>,
    extensions: Option<Vec<String>>,
}

/// Parse site.toml from a file path
pub fn parse_site_toml<P: AsRef<Path>>(path: P) -> Result<SiteConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse_site_toml_str(&content)
}

/// Parse site.toml from a string (useful for testing)
pub fn parse_site_toml_str(content: &str) -> Result<SiteConfig> {
    let raw: RawConfig = toml::from_str(content)?;

    if raw.site.name.trim().is_empty() {
        return Err(Error::ConfigParse("site.name must not be empty".into()));
    }

    let content_dir = match raw.site.content_dir {
        Some(dir) => validate_path(&dir, "site.content_dir")?,
        None => PathBuf::from("content"),
    };

    let output = match raw.build.output {
        Some(dir) => validate_path(&dir, "build.output")?,
        None => PathBuf::from("dist"),
    };

    Ok(SiteConfig {
        name: raw.site.name,
        base_url: raw.site.base_url.map(|u| u.trim_end_matches('/').to_string()),
        content_dir,
        build: BuildConfig {
            output,
            fail_on_error: raw.build.fail_on_error,
        },
        pages: convert_collection(raw.collections.pages, CollectionKind::Pages)?,
        news: convert_collection(raw.collections.news, CollectionKind::News)?,
        nav: convert_collection(raw.collections.nav, CollectionKind::Nav)?,
    })
}

fn convert_collection(raw: Option<RawCollection>, kind: CollectionKind) -> Result<CollectionSource> {
    let defaults = CollectionSource::default_for(kind);
    let Some(raw) = raw else {
        return Ok(defaults);
    };

    let field = format!("collections.{}", kind);
    let dir = match raw.dir {
        Some(dir) => validate_path(&dir, &format!("{}.dir", field))?,
        None => defaults.dir,
    };

    let extensions = match raw.extensions {
        Some(exts) => {
            if exts.is_empty() {
                return Err(Error::ConfigParse(format!(
                    "'{}.extensions' must list at least one extension",
                    field
                )));
            }
            exts.into_iter()
                .map(|e| {
                    let e = e.trim_start_matches('.').to_lowercase();
                    if SUPPORTED_EXTENSIONS.contains(&e.as_str()) {
                        Ok(e)
                    } else {
                        Err(Error::ConfigParse(format!(
                            "Unsupported extension '{}' in '{}.extensions'. Supported: {}",
                            e,
                            field,
                            SUPPORTED_EXTENSIONS.join(", ")
                        )))
                    }
                })
                .collect::<Result<Vec<_>>>()?
        }
        None => defaults.extensions,
    };

    if kind == CollectionKind::Nav && extensions.iter().any(|e| e == "md") {
        return Err(Error::ConfigParse(
            "The nav collection is data-only; 'md' is not allowed".into(),
        ));
    }

    Ok(CollectionSource { dir, extensions })
}

/// Validate and convert a path string to PathBuf.
///
/// Rejects absolute paths and `..` components so a site.toml cannot point
/// the loader or the build output outside the site directory.
fn validate_path(path_str: &str, field_name: &str) -> Result<PathBuf> {
    let path = Path::new(path_str);

    // Ensure path is not empty
    if path_str.trim().is_empty() {
        return Err(Error::ConfigParse(format!(
            "Empty path in '{}' field",
            field_name
        )));
    }

    // Reject absolute paths
    if path.is_absolute() || path_str.starts_with('/') {
        return Err(Error::ConfigParse(format!(
            "Absolute paths not allowed in '{}': '{}'. Use relative paths only.",
            field_name, path_str
        )));
    }

    // Check for parent directory references
    for component in path.components() {
        if component == std::path::Component::ParentDir {
            return Err(Error::ConfigParse(format!(
                "Parent directory references (..) not allowed in '{}': '{}'",
                field_name, path_str
            )));
        }
    }

    Ok(path.to_path_buf())
}
