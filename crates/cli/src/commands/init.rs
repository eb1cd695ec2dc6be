use anyhow::{Context, Result};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};

use super::CONFIG_FILE;

const COLLECTION_DIRS: &[&str] = &["content/pages", "content/news", "content/nav", "public"];

/// Escape a string for safe inclusion in a TOML basic string
///
/// site.toml is written from a commented template rather than serialized,
/// so user input has to be escaped by hand.
///
/// See: https://toml.io/en/v1.0.0#string
fn toml_escape_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\x08', "\\b")
        .replace('\x0C', "\\f")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// Default site name: the directory name in title case
fn name_from_dir(path: &Path) -> String {
    let raw = path
        .canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "My Site".to_string());

    let words: Vec<String> = raw
        .split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();

    if words.is_empty() {
        "My Site".to_string()
    } else {
        words.join(" ")
    }
}

/// Scaffold a new site: site.toml plus starter pages, news and nav.
///
/// # Errors
///
/// Returns an error if the directory doesn't exist, if site.toml is
/// already there, or if a file cannot be written.
pub async fn run(path: PathBuf, name: Option<String>) -> Result<()> {
    println!("Initializing site directory: {}", path.display());

    if !path.exists() {
        anyhow::bail!(
            "Directory '{}' does not exist. Create it first: mkdir {}",
            path.display(),
            path.display()
        );
    }

    let config_path = path.join(CONFIG_FILE);
    if config_path.exists() {
        anyhow::bail!(
            "{} already exists at {}\nHint: Delete it first or use a different directory",
            CONFIG_FILE,
            config_path.display()
        );
    }

    let name = name.unwrap_or_else(|| name_from_dir(&path));

    create_directory_structure(&path)?;
    generate_site_toml(&path, &name)?;
    generate_starter_content(&path, &name)?;

    println!("\n✓ Initialization complete!");
    println!("\nGenerated structure:");
    println!("  {}/", path.display());
    println!("  ├── site.toml              ← Site name, build output, collections");
    println!("  ├── public/                ← Served as-is under /public");
    println!("  └── content/");
    println!("      ├── pages/index.md");
    println!("      ├── pages/about/index.md");
    println!("      ├── news/welcome.md");
    println!("      └── nav/main.json");

    println!("\nNext steps:");
    println!("  1. Edit site.toml");
    println!("  2. Add pages under content/pages/");
    println!("  3. Preview: site-kit preview {}", path.display());

    Ok(())
}

fn create_directory_structure(base: &Path) -> Result<()> {
    for dir in COLLECTION_DIRS {
        fs::create_dir_all(base.join(dir))
            .with_context(|| format!("Failed to create {}", dir))?;
    }
    Ok(())
}

fn generate_site_toml(base: &Path, name: &str) -> Result<()> {
    let content = format!(
        r#"# site-kit configuration

[site]
name = "{}"
# base_url = "https://example.com"
# content_dir = "content"

[build]
# output = "dist"
# Abort the build if any page fails to render
fail_on_error = false

# Collections default to content/pages, content/news and content/nav.
# [collections.pages]
# dir = "pages"
# extensions = ["md", "json", "yml", "yaml"]
"#,
        toml_escape_string(name)
    );

    fs::write(base.join(CONFIG_FILE), content).context("Failed to write site.toml")?;
    Ok(())
}

fn generate_starter_content(base: &Path, name: &str) -> Result<()> {
    let content = base.join("content");
    let today = Local::now().format("%Y-%m-%d");
    // YAML single-quoted scalar
    let yaml_name = name.replace('\'', "''");

    let files: Vec<(PathBuf, String)> = vec![
        (
            content.join("pages/index.md"),
            format!("---\ntitle: '{}'\n---\n\nWelcome to your new site.\n", yaml_name),
        ),
        (
            content.join("pages/about/index.md"),
            "---\ntitle: About\n---\n\nTell visitors who you are.\n".to_string(),
        ),
        (
            content.join("news/welcome.md"),
            format!(
                "---\ntitle: Welcome\ndate: {}\n---\n\nThe site is live.\n",
                today
            ),
        ),
        (
            content.join("nav/main.json"),
            r#"{
  "label": "About",
  "to": "/about",
  "order": 1
}
"#
            .to_string(),
        ),
        (
            content.join("nav/news.json"),
            r#"{
  "label": "News",
  "to": "/news",
  "order": 2
}
"#
            .to_string(),
        ),
    ];

    for (path, body) in files {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, body).with_context(|| format!("Failed to write {}", path.display()))?;
    }

    Ok(())
}
