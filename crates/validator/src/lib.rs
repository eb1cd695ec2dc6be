//! Site validation: configuration, collection schemas and link integrity.

use chrono::NaiveDate;
use site_kit_content::ContentStore;
use site_kit_core::breadcrumbs::prefixes;
use site_kit_core::{SiteConfig, parse_site_toml};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::instrument;

pub const CONFIG_FILE: &str = "site.toml";

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub info: Vec<String>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate the site rooted at `site_root`.
///
/// Never fails: every problem, including an unreadable `site.toml`, ends
/// up in the report.
#[instrument]
pub fn validate_site(site_root: &Path) -> ValidationReport {
    let mut report = ValidationReport::default();

    let config = match parse_site_toml(site_root.join(CONFIG_FILE)) {
        Ok(config) => config,
        Err(e) => {
            report.errors.push(format!("{}: {}", CONFIG_FILE, e));
            return report;
        }
    };
    report.info.push(format!("{} valid ({})", CONFIG_FILE, config.name));

    let store = match ContentStore::load(site_root, &config) {
        Ok(store) => store,
        Err(e) => {
            report.errors.push(e.to_string());
            return report;
        }
    };

    validate_store(&config, &store, &mut report);
    report
}

/// Checks that only need the loaded content.
pub fn validate_store(config: &SiteConfig, store: &ContentStore, report: &mut ValidationReport) {
    report
        .errors
        .extend(store.failures().iter().map(|e| e.to_string()));

    check_pages(store, report);
    check_news(store, report);
    check_nav(store, report);
    check_breadcrumb_gaps(store, report);

    report.info.push(format!(
        "{} pages, {} news items, {} nav entries (content in {})",
        store.pages().count(),
        store.news().len(),
        store.nav().len(),
        config.content_dir.display()
    ));
}

fn describe(path: &str, source: Option<&Path>) -> String {
    match source {
        Some(file) => format!("{} ({})", path, file.display()),
        None => path.to_string(),
    }
}

fn check_pages(store: &ContentStore, report: &mut ValidationReport) {
    for page in store.pages() {
        match &page.title {
            None => report.errors.push(format!(
                "page {}: missing required field 'title'",
                describe(&page.path, page.source.as_deref())
            )),
            Some(t) if t.trim().is_empty() => report.warnings.push(format!(
                "page {}: empty title, it will not appear in breadcrumbs",
                describe(&page.path, page.source.as_deref())
            )),
            Some(_) => {}
        }
    }
}

fn check_news(store: &ContentStore, report: &mut ValidationReport) {
    let mut seen = BTreeSet::new();
    for item in store.news() {
        let what = describe(&item.path, item.source.as_deref());
        if NaiveDate::parse_from_str(&item.date, "%Y-%m-%d").is_err() {
            report.warnings.push(format!(
                "news {}: date '{}' is not in YYYY-MM-DD format, ordering may be wrong",
                what, item.date
            ));
        }
        if !seen.insert(item.path.as_str()) {
            report
                .errors
                .push(format!("news {}: duplicate route", what));
        }
        if store.page(&item.path).is_some() {
            report
                .errors
                .push(format!("news {}: route collides with a page", what));
        }
    }
}

fn check_nav(store: &ContentStore, report: &mut ValidationReport) {
    for entry in store.nav() {
        if entry.label.trim().is_empty() {
            report.errors.push("nav entry with empty label".to_string());
        }
        for link in entry.links() {
            if is_external(link) {
                continue;
            }
            if !store.has_route(link) {
                report.warnings.push(format!(
                    "nav '{}': link '{}' does not match any page",
                    entry.label, link
                ));
            }
        }
    }
}

fn is_external(link: &str) -> bool {
    link.contains("://") || link.starts_with("mailto:") || link.starts_with('#')
}

/// Ancestor routes with no titled page leave gaps in breadcrumb trails.
fn check_breadcrumb_gaps(store: &ContentStore, report: &mut ValidationReport) {
    let mut gaps = BTreeSet::new();
    for page in store.pages() {
        let ancestors = prefixes(&page.path);
        for ancestor in ancestors.iter().take(ancestors.len().saturating_sub(1)) {
            let titled = store.page(ancestor).and_then(|p| p.label()).is_some();
            if !titled {
                gaps.insert(ancestor.clone());
            }
        }
    }
    for gap in gaps {
        report.info.push(format!(
            "no titled page at '{}', breadcrumb trails below it skip this level",
            gap
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "site.toml", "[site]\nname = \"Test\"\n");
        fs::create_dir_all(dir.path().join("content")).unwrap();
        dir
    }

    #[test]
    fn test_missing_config_is_error() {
        let dir = TempDir::new().unwrap();
        let report = validate_site(dir.path());
        assert!(!report.is_ok());
        assert!(report.errors[0].starts_with("site.toml"));
    }

    #[test]
    fn test_valid_site() {
        let dir = site();
        write(dir.path(), "content/pages/index.md", "---\ntitle: Home\n---\n");
        write(dir.path(), "content/pages/about.md", "---\ntitle: About\n---\n");
        write(
            dir.path(),
            "content/news/launch.md",
            "---\ntitle: Launch\ndate: 2025-07-15\n---\n",
        );
        write(
            dir.path(),
            "content/nav/main.json",
            r#"{"label": "About", "to": "/about",
                "children": [{"label": "News", "to": "/news"},
                             {"label": "Source", "to": "https://example.com"}]}"#,
        );

        let report = validate_site(dir.path());
        assert!(report.is_ok(), "{:?}", report.errors);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    }

    #[test]
    fn test_schema_failures_are_errors() {
        let dir = site();
        write(dir.path(), "content/pages/untitled.md", "no title anywhere");
        write(dir.path(), "content/news/undated.md", "---\ntitle: X\n---\n");
        write(dir.path(), "content/nav/bad.json", r#"{"to": "/x"}"#);

        let report = validate_site(dir.path());
        assert_eq!(report.errors.len(), 3, "{:?}", report.errors);
        assert!(report.errors.iter().any(|e| e.contains("untitled.md")));
        assert!(report.errors.iter().any(|e| e.contains("'date'")));
        assert!(report.errors.iter().any(|e| e.contains("bad.json")));
    }

    #[test]
    fn test_warnings() {
        let dir = site();
        write(dir.path(), "content/pages/blank.yaml", "title: ''\n");
        write(
            dir.path(),
            "content/news/old.md",
            "---\ntitle: Old\ndate: July 2025\n---\n",
        );
        write(dir.path(), "content/nav/main.json", r#"{"label": "Gone", "to": "/gone"}"#);

        let report = validate_site(dir.path());
        assert!(report.is_ok(), "{:?}", report.errors);
        assert_eq!(report.warnings.len(), 3, "{:?}", report.warnings);
        assert!(report.warnings.iter().any(|w| w.contains("empty title")));
        assert!(report.warnings.iter().any(|w| w.contains("YYYY-MM-DD")));
        assert!(report.warnings.iter().any(|w| w.contains("'/gone'")));
    }

    #[test]
    fn test_breadcrumb_gaps_reported_once() {
        let dir = site();
        write(dir.path(), "content/pages/a/b/c.md", "# C");
        write(dir.path(), "content/pages/a/b/d.md", "# D");
        write(dir.path(), "content/pages/a/index.md", "# A");

        let report = validate_site(dir.path());
        let gaps: Vec<&String> = report
            .info
            .iter()
            .filter(|i| i.contains("breadcrumb"))
            .collect();
        assert_eq!(gaps.len(), 1);
        assert!(gaps[0].contains("'/a/b'"));
    }

    #[test]
    fn test_news_colliding_with_page() {
        let dir = site();
        write(dir.path(), "content/pages/news/launch.md", "# Page");
        write(
            dir.path(),
            "content/news/launch.md",
            "---\ntitle: Launch\ndate: 2025-01-01\n---\n",
        );
        let report = validate_site(dir.path());
        assert!(report.errors.iter().any(|e| e.contains("collides")));
    }
}
