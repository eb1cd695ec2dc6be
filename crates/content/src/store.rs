use crate::loader::{self, normalize_route};
use async_trait::async_trait;
use site_kit_core::{
    CollectionKind, Error, NavEntry, NewsItem, PageRecord, PageStore, Result, SiteConfig,
};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, instrument, warn};

/// In-memory index over every collection of a site.
///
/// Pages are keyed by normalized route. Files that failed to load are kept
/// in [`ContentStore::failures`] rather than failing the whole load.
#[derive(Debug, Default)]
pub struct ContentStore {
    pages: BTreeMap<String, PageRecord>,
    news: Vec<NewsItem>,
    nav: Vec<NavEntry>,
    failures: Vec<Error>,
}

impl ContentStore {
    /// Load all collections for the site rooted at `site_root`.
    #[instrument(skip(config), fields(site = %config.name))]
    pub fn load(site_root: &Path, config: &SiteConfig) -> Result<Self> {
        let content_dir = site_root.join(&config.content_dir);
        if !content_dir.is_dir() {
            return Err(Error::InvalidData(format!(
                "Content directory not found: {}",
                content_dir.display()
            )));
        }

        let pages = loader::load_pages(
            &config.collection_dir(site_root, CollectionKind::Pages),
            &config.pages,
        );
        let news = loader::load_news(
            &config.collection_dir(site_root, CollectionKind::News),
            &config.news,
        );
        let nav = loader::load_nav(
            &config.collection_dir(site_root, CollectionKind::Nav),
            &config.nav,
        );

        let mut failures = pages.failures;
        failures.extend(news.failures);
        failures.extend(nav.failures);

        let mut store = Self::from_parts(pages.items, news.items, nav.items);
        failures.append(&mut store.failures);
        store.failures = failures;

        info!(
            pages = store.pages.len(),
            news = store.news.len(),
            nav = store.nav.len(),
            failures = store.failures.len(),
            "content loaded"
        );
        Ok(store)
    }

    /// Build a store from already-loaded records.
    ///
    /// When two pages claim the same route the first one wins and the
    /// other is recorded as a failure.
    pub fn from_parts(pages: Vec<PageRecord>, news: Vec<NewsItem>, nav: Vec<NavEntry>) -> Self {
        let mut store = Self::default();

        for mut page in pages {
            page.path = normalize_route(&page.path);
            if let Some(existing) = store.pages.get(&page.path) {
                let file = page.source.clone().unwrap_or_default();
                warn!(path = %page.path, "duplicate page route");
                store.failures.push(Error::schema(
                    file,
                    format!(
                        "duplicate route '{}' (already defined by {})",
                        page.path,
                        existing
                            .source
                            .as_deref()
                            .map(|s| s.display().to_string())
                            .unwrap_or_else(|| "another page".into())
                    ),
                ));
                continue;
            }
            store.pages.insert(page.path.clone(), page);
        }

        store.news = news;
        store
            .news
            .sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.title.cmp(&b.title)));

        store.nav = nav;
        store.nav.sort_by(|a, b| {
            a.order
                .total_cmp(&b.order)
                .then_with(|| a.label.cmp(&b.label))
        });
        for entry in &mut store.nav {
            entry.sort_children();
        }

        store
    }

    pub fn page(&self, path: &str) -> Option<&PageRecord> {
        self.pages.get(&normalize_route(path))
    }

    /// Pages in route order
    pub fn pages(&self) -> impl Iterator<Item = &PageRecord> {
        self.pages.values()
    }

    /// News items, newest first
    pub fn news(&self) -> &[NewsItem] {
        &self.news
    }

    /// Navigation entries sorted by `order`, then label
    pub fn nav(&self) -> &[NavEntry] {
        &self.nav
    }

    pub fn failures(&self) -> &[Error] {
        &self.failures
    }

    pub fn has_route(&self, path: &str) -> bool {
        let path = normalize_route(path);
        self.pages.contains_key(&path)
            || self.news.iter().any(|n| n.path == path)
            || (path == "/news" && !self.news.is_empty())
    }
}

#[async_trait]
impl PageStore for ContentStore {
    async fn lookup_page_by_path(&self, path: &str) -> Result<Option<PageRecord>> {
        Ok(self.page(path).cloned())
    }
}
