//! Collection loading from the content directory.
//!
//! Files that fail to parse or violate their collection schema are
//! collected as failures instead of aborting the load, so `validate`
//! can report every problem in one pass.

use crate::frontmatter::{self, Format};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use site_kit_core::breadcrumbs::segments;
use site_kit_core::config::CollectionSource;
use site_kit_core::{Error, NavEntry, NewsItem, PageRecord, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Items loaded from one collection plus the files that were rejected
#[derive(Debug)]
pub struct Loaded<T> {
    pub items: Vec<T>,
    pub failures: Vec<Error>,
}

impl<T> Default for Loaded<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            failures: Vec::new(),
        }
    }
}

/// Raw front matter / data shape of a `pages` file
#[derive(Debug, Default, Deserialize)]
struct RawPage {
    title: Option<String>,
    path: Option<String>,
}

/// Raw front matter / data shape of a `news` file
#[derive(Debug, Default, Deserialize)]
struct RawNews {
    title: Option<String>,
    #[serde(default, deserialize_with = "date_string")]
    date: Option<String>,
    path: Option<String>,
}

/// Accept a date written as a string or as a bare TOML date
/// (`date = 2025-07-15`), keeping it in its written `YYYY-MM-DD` form.
fn date_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<toml::Value>::deserialize(deserializer)? {
        None => Ok(None),
        Some(toml::Value::String(s)) => Ok(Some(s)),
        Some(toml::Value::Datetime(dt)) => Ok(Some(dt.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "invalid type: {}, expected a date string",
            other.type_str()
        ))),
    }
}

/// Canonical form of a route: one leading slash, no trailing slash, no
/// empty segments. The root is `/`.
pub fn normalize_route(path: &str) -> String {
    format!("/{}", segments(path).join("/"))
}

/// Route given explicitly in a file's `path` field.
///
/// `.` and `..` segments are rejected; routes become output paths at
/// build time and must stay inside the output directory.
fn explicit_route(file: &Path, path: &str) -> Result<String> {
    if let Some(seg) = segments(path).into_iter().find(|s| *s == "." || *s == "..") {
        return Err(Error::schema(
            file,
            format!("'{}' segments are not allowed in path '{}'", seg, path),
        ));
    }
    Ok(normalize_route(path))
}

/// Route for a content file, given its location relative to the
/// collection directory. `index` files map to their parent directory.
pub fn route_from_file(relative: &Path, prefix: &str) -> String {
    let mut parts: Vec<String> = relative
        .with_extension("")
        .components()
        .filter_map(|c| c.as_os_str().to_str().map(str::to_string))
        .collect();

    if parts.last().is_some_and(|last| last == "index") {
        parts.pop();
    }

    normalize_route(&format!("{}/{}", prefix, parts.join("/")))
}

/// Content files of a collection, sorted by path. Hidden entries are skipped.
fn collection_files(dir: &Path, source: &CollectionSource) -> Vec<PathBuf> {
    if !dir.exists() {
        debug!(dir = %dir.display(), "collection directory missing");
        return Vec::new();
    }

    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(error = %err, "skipping unreadable entry");
                None
            }
        })
        .filter(|e| e.file_type().is_file() && source.matches(e.path()))
        .map(|e| e.into_path())
        .collect()
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_lowercase()
}

/// Read a file and split it into typed metadata and a Markdown body.
fn read_document<T: DeserializeOwned + Default>(file: &Path) -> Result<(T, String)> {
    let text = fs::read_to_string(file).map_err(|e| Error::io(file, e))?;

    match extension(file).as_str() {
        "md" => {
            let split = frontmatter::split(&text);
            let meta = frontmatter::parse(file, split.front)?;
            Ok((meta, split.body.to_string()))
        }
        "json" => {
            let meta = serde_json::from_str(&text).map_err(|e| Error::schema(file, e.to_string()))?;
            Ok((meta, String::new()))
        }
        "yml" | "yaml" => {
            let meta = frontmatter::parse(file, Some((Format::Yaml, text.as_str())))?;
            Ok((meta, String::new()))
        }
        other => Err(Error::schema(file, format!("unsupported file type '{}'", other))),
    }
}

fn relative_to<'a>(file: &'a Path, root: &Path) -> &'a Path {
    file.strip_prefix(root).unwrap_or(file)
}

/// Load the `pages` collection.
///
/// Titles come from front matter, falling back to the first `# ` heading.
/// An explicit `path` overrides the route derived from the file location.
pub fn load_pages(dir: &Path, source: &CollectionSource) -> Loaded<PageRecord> {
    let mut loaded = Loaded::default();

    for file in collection_files(dir, source) {
        let relative = relative_to(&file, dir);
        let page = read_document::<RawPage>(&file).and_then(|(raw, body)| {
            let path = match raw.path {
                Some(p) => explicit_route(&file, &p)?,
                None => route_from_file(relative, ""),
            };
            let title = raw
                .title
                .or_else(|| frontmatter::first_heading(&body).map(str::to_string));
            debug!(file = %relative.display(), %path, "loaded page");
            Ok(PageRecord {
                path,
                title,
                body,
                source: Some(relative.to_path_buf()),
            })
        });

        match page {
            Ok(page) => loaded.items.push(page),
            Err(err) => {
                warn!(file = %file.display(), error = %err, "rejected page");
                loaded.failures.push(err);
            }
        }
    }

    loaded
}

/// Load the `news` collection. Routes live under `/news`.
pub fn load_news(dir: &Path, source: &CollectionSource) -> Loaded<NewsItem> {
    let mut loaded = Loaded::default();

    for file in collection_files(dir, source) {
        let relative = relative_to(&file, dir);
        let item = read_document::<RawNews>(&file).and_then(|(raw, body)| {
            let title = raw
                .title
                .or_else(|| frontmatter::first_heading(&body).map(str::to_string))
                .ok_or_else(|| Error::schema(&file, "missing required field 'title'"))?;
            let date = raw
                .date
                .ok_or_else(|| Error::schema(&file, "missing required field 'date'"))?;
            let path = match raw.path {
                Some(p) => explicit_route(&file, &p)?,
                None => route_from_file(relative, "/news"),
            };
            Ok(NewsItem {
                path,
                title,
                date,
                body,
                source: Some(relative.to_path_buf()),
            })
        });

        match item {
            Ok(item) => loaded.items.push(item),
            Err(err) => {
                warn!(file = %file.display(), error = %err, "rejected news item");
                loaded.failures.push(err);
            }
        }
    }

    loaded
}

/// Load the `nav` data collection: one entry per file.
pub fn load_nav(dir: &Path, source: &CollectionSource) -> Loaded<NavEntry> {
    let mut loaded = Loaded::default();

    for file in collection_files(dir, source) {
        let entry = fs::read_to_string(&file)
            .map_err(|e| Error::io(&file, e))
            .and_then(|text| match extension(&file).as_str() {
                "json" => serde_json::from_str::<NavEntry>(&text)
                    .map_err(|e| Error::schema(&file, e.to_string())),
                "yml" | "yaml" => serde_yaml::from_str::<NavEntry>(&text)
                    .map_err(|e| Error::schema(&file, e.to_string())),
                other => Err(Error::schema(
                    &file,
                    format!("nav entries must be data files, not '{}'", other),
                )),
            });

        match entry {
            Ok(entry) => loaded.items.push(entry),
            Err(err) => {
                warn!(file = %file.display(), error = %err, "rejected nav entry");
                loaded.failures.push(err);
            }
        }
    }

    loaded
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn source(exts: &[&str]) -> CollectionSource {
        CollectionSource {
            dir: PathBuf::from("unused"),
            extensions: exts.iter().map(|e| e.to_string()).collect(),
        }
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_normalize_route() {
        assert_eq!(normalize_route(""), "/");
        assert_eq!(normalize_route("/"), "/");
        assert_eq!(normalize_route("about/"), "/about");
        assert_eq!(normalize_route("//a//b/"), "/a/b");
    }

    #[test]
    fn test_route_from_file() {
        assert_eq!(route_from_file(Path::new("index.md"), ""), "/");
        assert_eq!(route_from_file(Path::new("about.md"), ""), "/about");
        assert_eq!(route_from_file(Path::new("about/index.md"), ""), "/about");
        assert_eq!(route_from_file(Path::new("about/team.yml"), ""), "/about/team");
        assert_eq!(route_from_file(Path::new("launch.md"), "/news"), "/news/launch");
        assert_eq!(route_from_file(Path::new("index.md"), "/news"), "/news");
    }

    #[test]
    fn test_load_pages_all_formats() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "index.md", "---\ntitle: Home\n---\nWelcome");
        write(dir.path(), "about/index.md", "+++\ntitle = \"About\"\n+++\n");
        write(dir.path(), "about/team.json", r#"{"title": "Team"}"#);
        write(dir.path(), "about/history.yaml", "title: History\npath: /history\n");
        write(dir.path(), "notes.txt", "ignored");

        let loaded = load_pages(dir.path(), &source(&["md", "json", "yml", "yaml"]));
        assert!(loaded.failures.is_empty(), "{:?}", loaded.failures);

        let routes: Vec<(&str, Option<&str>)> = loaded
            .items
            .iter()
            .map(|p| (p.path.as_str(), p.label()))
            .collect();
        assert_eq!(
            routes,
            vec![
                ("/history", Some("History")),
                ("/about", Some("About")),
                ("/about/team", Some("Team")),
                ("/", Some("Home")),
            ]
        );
        assert_eq!(loaded.items[3].body, "Welcome");
    }

    #[test]
    fn test_load_pages_title_from_heading() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "guide.md", "# The Guide\n\nText");
        write(dir.path(), "blank.md", "No heading here");

        let loaded = load_pages(dir.path(), &source(&["md"]));
        let titles: Vec<Option<&str>> = loaded.items.iter().map(|p| p.label()).collect();
        assert_eq!(titles, vec![None, Some("The Guide")]);
    }

    #[test]
    fn test_load_pages_collects_failures() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "good.md", "---\ntitle: Good\n---\n");
        write(dir.path(), "bad.json", "{ not json");
        write(dir.path(), "wrong.md", "---\ntitle: [a, b]\n---\n");

        let loaded = load_pages(dir.path(), &source(&["md", "json"]));
        assert_eq!(loaded.items.len(), 1);
        assert_eq!(loaded.failures.len(), 2);
        assert!(
            loaded
                .failures
                .iter()
                .all(|e| matches!(e, Error::Schema { .. }))
        );
    }

    #[test]
    fn test_load_pages_skips_hidden_and_missing_dir() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ".drafts/secret.md", "# Secret");
        write(dir.path(), ".hidden.md", "# Hidden");
        let loaded = load_pages(dir.path(), &source(&["md"]));
        assert!(loaded.items.is_empty());

        let loaded = load_pages(&dir.path().join("nope"), &source(&["md"]));
        assert!(loaded.items.is_empty());
        assert!(loaded.failures.is_empty());
    }

    #[test]
    fn test_load_news_requires_date() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "launch.md", "---\ntitle: Launch\ndate: 2025-07-15\n---\nWe launched.");
        write(dir.path(), "undated.md", "---\ntitle: Undated\n---\n");

        let loaded = load_news(dir.path(), &source(&["md"]));
        assert_eq!(loaded.items.len(), 1);
        assert_eq!(loaded.items[0].path, "/news/launch");
        assert_eq!(loaded.items[0].date, "2025-07-15");
        assert_eq!(loaded.failures.len(), 1);
        assert!(loaded.failures[0].to_string().contains("'date'"));
    }

    #[test]
    fn test_load_pages_rejects_dot_segments_in_path() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "evil.md", "---\ntitle: Evil\npath: /../../escaped\n---\n");
        write(dir.path(), "here.md", "---\ntitle: Here\npath: /a/./b\n---\n");
        write(dir.path(), "ok.md", "---\ntitle: Ok\npath: /docs//ok/\n---\n");

        let loaded = load_pages(dir.path(), &source(&["md"]));
        assert_eq!(loaded.items.len(), 1);
        assert_eq!(loaded.items[0].path, "/docs/ok");
        assert_eq!(loaded.failures.len(), 2);
        assert!(loaded.failures[0].to_string().contains("evil.md"));
        assert!(loaded.failures[0].to_string().contains("'..' segments"));
        assert!(loaded.failures[1].to_string().contains("'.' segments"));
    }

    #[test]
    fn test_load_news_rejects_dot_segments_in_path() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "evil.md",
            "---\ntitle: Evil\ndate: 2025-01-01\npath: ../outside\n---\n",
        );
        let loaded = load_news(dir.path(), &source(&["md"]));
        assert!(loaded.items.is_empty());
        assert_eq!(loaded.failures.len(), 1);
    }

    #[test]
    fn test_load_news_accepts_toml_dates() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "bare.md", "+++\ntitle = \"Bare\"\ndate = 2025-07-15\n+++\n");
        write(dir.path(), "quoted.md", "+++\ntitle = \"Quoted\"\ndate = \"2025-07-16\"\n+++\n");
        write(dir.path(), "number.md", "+++\ntitle = \"Number\"\ndate = 2025\n+++\n");

        let loaded = load_news(dir.path(), &source(&["md"]));
        let dates: Vec<(&str, &str)> = loaded
            .items
            .iter()
            .map(|n| (n.title.as_str(), n.date.as_str()))
            .collect();
        assert_eq!(dates, vec![("Bare", "2025-07-15"), ("Quoted", "2025-07-16")]);
        assert_eq!(loaded.failures.len(), 1);
        assert!(loaded.failures[0].to_string().contains("number.md"));
    }

    #[test]
    fn test_load_news_yaml_and_json_dates() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.yaml", "title: A\ndate: 2025-07-15\n");
        write(dir.path(), "b.json", r#"{"title": "B", "date": "2025-07-14"}"#);

        let loaded = load_news(dir.path(), &source(&["yaml", "json"]));
        assert!(loaded.failures.is_empty(), "{:?}", loaded.failures);
        assert_eq!(loaded.items.len(), 2);
        assert_eq!(loaded.items[0].date, "2025-07-15");
    }

    #[test]
    fn test_load_nav_tolerates_extra_keys() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "main.json",
            r#"{"label": "Docs", "to": "/docs", "icon": "book",
                "children": [{"label": "Intro", "to": "/docs/intro", "badge": "new"}]}"#,
        );
        let loaded = load_nav(dir.path(), &source(&["json"]));
        assert!(loaded.failures.is_empty(), "{:?}", loaded.failures);
        assert_eq!(loaded.items[0].label, "Docs");
        assert_eq!(loaded.items[0].children[0].label, "Intro");
    }

    #[test]
    fn test_load_nav() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "main.json",
            r#"{"label": "Docs", "to": "/docs", "order": 1,
                "children": [{"label": "Intro", "to": "/docs/intro"}]}"#,
        );
        write(dir.path(), "broken.json", r#"{"label": "X", "children": [{"label": "Y"}]}"#);

        let loaded = load_nav(dir.path(), &source(&["json"]));
        assert_eq!(loaded.items.len(), 1);
        assert_eq!(loaded.items[0].children[0].to, "/docs/intro");
        assert_eq!(loaded.failures.len(), 1);
    }
}
