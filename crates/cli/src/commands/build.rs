use anyhow::{Context, Result};
use site_kit_generator::{GenerateOptions, generate_site, output_path};
use std::fs;
use std::path::{Path, PathBuf};

use super::load_site;

/// Build static site for deployment
pub async fn run(path: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let (config, store) = load_site(&path)?;
    let output = output.unwrap_or_else(|| path.join(&config.build.output));

    println!("🔨 Building static site...");
    println!("   Source: {}", path.display());
    println!("   Output: {}", output.display());
    println!();

    println!("✓ Loaded: {}", config.name);
    println!("  Pages: {}", store.pages().count());
    println!("  News: {}", store.news().len());
    println!();

    if !store.failures().is_empty() {
        for failure in store.failures() {
            eprintln!("   ⚠ {}", failure);
        }
        if config.build.fail_on_error {
            anyhow::bail!(
                "{} content file(s) failed to load and build.fail_on_error is set",
                store.failures().len()
            );
        }
    }

    println!("📄 Generating pages...");
    let site = generate_site(&config, &store, GenerateOptions::default())
        .await
        .context("Failed to generate site")?;

    let written = write_site(&output, &site.pages, &site.assets)?;
    println!("   ✓ Wrote {} pages, {} assets", site.pages.len(), site.assets.len());

    let copied = copy_public(&path.join("public"), &output)?;
    if copied > 0 {
        println!("   ✓ Copied {} public files", copied);
    }

    println!();
    println!("✅ Build complete! ({} files)", written + copied);
    println!("   Output: {}", output.display());
    println!();
    println!("To test locally:");
    println!("   cd {} && python3 -m http.server 8000", output.display());
    println!();

    Ok(())
}

/// Write generated pages and assets under `output`; returns files written
fn write_site(output: &Path, pages: &[(String, String)], assets: &[(String, Vec<u8>)]) -> Result<usize> {
    fs::create_dir_all(output).context("Failed to create output directory")?;

    let files = pages
        .iter()
        .map(|(route, html)| (output_path(route), html.as_bytes()))
        .chain(assets.iter().map(|(name, data)| (name.clone(), data.as_slice())));

    let mut written = 0;
    for (rel, data) in files {
        let dst = output.join(&rel);
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&dst, data).with_context(|| format!("Failed to write {}", dst.display()))?;
        written += 1;
    }
    Ok(written)
}

/// Copy `public/` into `output/public/`, preserving layout
fn copy_public(public: &Path, output: &Path) -> Result<usize> {
    if !public.is_dir() {
        return Ok(0);
    }

    let mut copied = 0;
    for entry in walkdir::WalkDir::new(public) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry.path().strip_prefix(public)?;
        let dst = output.join("public").join(rel);
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(entry.path(), &dst)
            .with_context(|| format!("Failed to copy {}", entry.path().display()))?;
        copied += 1;
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[tokio::test]
    async fn test_build_writes_pages() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "site.toml", "[site]\nname = \"Test\"\n");
        write(dir.path(), "content/pages/index.md", "# Home");
        write(dir.path(), "content/pages/docs/index.md", "# Docs");
        write(dir.path(), "content/pages/docs/guide/install.md", "# Install");
        write(dir.path(), "public/img/logo.svg", "<svg/>");

        run(dir.path().to_path_buf(), None).await.unwrap();

        let out = dir.path().join("dist");
        assert!(out.join("index.html").is_file());
        assert!(out.join("style.css").is_file());
        assert!(out.join("public/img/logo.svg").is_file());

        let install = fs::read_to_string(out.join("docs/guide/install/index.html")).unwrap();
        assert!(install.contains(r#"<li><a href="/docs">Docs</a></li>"#));
        assert!(install.contains(r#"<li aria-current="page">Install</li>"#));
    }

    #[tokio::test]
    async fn test_build_custom_output() {
        let dir = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write(dir.path(), "site.toml", "[site]\nname = \"Test\"\n");
        write(dir.path(), "content/pages/about.md", "# About");

        run(dir.path().to_path_buf(), Some(out.path().to_path_buf()))
            .await
            .unwrap();
        assert!(out.path().join("about/index.html").is_file());
    }

    #[tokio::test]
    async fn test_build_fail_on_error() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "site.toml",
            "[site]\nname = \"Test\"\n[build]\nfail_on_error = true\n",
        );
        write(dir.path(), "content/pages/bad.json", "{ broken");

        let err = run(dir.path().to_path_buf(), None).await.unwrap_err();
        assert!(err.to_string().contains("fail_on_error"));
    }

    #[tokio::test]
    async fn test_build_without_site_toml() {
        let dir = TempDir::new().unwrap();
        let err = run(dir.path().to_path_buf(), None).await.unwrap_err();
        assert!(err.to_string().contains("site-kit init"));
    }
}
