//! Breadcrumb resolution.
//!
//! Walks a route path segment by segment and asks a [`PageStore`] for the
//! page at each accumulated prefix. Prefixes without a titled page are
//! skipped, so a trail may have gaps.

use crate::error::Result;
use crate::types::{Breadcrumb, PageRecord};
use async_trait::async_trait;
use futures::future::try_join_all;
use tracing::{debug, instrument};

/// Path-keyed read access to the `pages` collection.
///
/// `Ok(None)` means there is no page at `path`. `Err` is reserved for the
/// store itself failing, and aborts breadcrumb resolution.
#[async_trait]
pub trait PageStore: Send + Sync {
    async fn lookup_page_by_path(&self, path: &str) -> Result<Option<PageRecord>>;
}

#[async_trait]
impl<S: PageStore + ?Sized> PageStore for std::sync::Arc<S> {
    async fn lookup_page_by_path(&self, path: &str) -> Result<Option<PageRecord>> {
        (**self).lookup_page_by_path(path).await
    }
}

/// Split a route into its non-empty segments.
///
/// One leading and one trailing slash are stripped, then empty tokens
/// left by repeated slashes are dropped.
pub fn segments(full_path: &str) -> Vec<&str> {
    let clean = full_path.strip_prefix('/').unwrap_or(full_path);
    let clean = clean.strip_suffix('/').unwrap_or(clean);
    clean.split('/').filter(|s| !s.is_empty()).collect()
}

/// Cumulative prefixes of a route: `/a/b/c` gives `/a`, `/a/b`, `/a/b/c`.
pub fn prefixes(full_path: &str) -> Vec<String> {
    let mut acc = String::new();
    segments(full_path)
        .into_iter()
        .map(|seg| {
            acc.push('/');
            acc.push_str(seg);
            acc.clone()
        })
        .collect()
}

fn crumb(to: String, page: Option<PageRecord>) -> Option<Breadcrumb> {
    let label = page.as_ref().and_then(PageRecord::label)?.to_string();
    Some(Breadcrumb { label, to })
}

/// Resolve the breadcrumb trail for `full_path`, one lookup at a time.
///
/// Returns an empty trail for `""`, `"/"` and similar without touching the
/// store. The first store error aborts the whole resolution.
#[instrument(skip(store))]
pub async fn resolve_breadcrumbs<S>(store: &S, full_path: &str) -> Result<Vec<Breadcrumb>>
where
    S: PageStore + ?Sized,
{
    let mut crumbs = Vec::new();

    for to in prefixes(full_path) {
        let page = store.lookup_page_by_path(&to).await?;
        debug!(path = %to, found = page.is_some(), "page lookup");
        if let Some(c) = crumb(to, page) {
            crumbs.push(c);
        }
    }

    Ok(crumbs)
}

/// Same result as [`resolve_breadcrumbs`], but all lookups are issued at once.
#[instrument(skip(store))]
pub async fn resolve_breadcrumbs_concurrent<S>(
    store: &S,
    full_path: &str,
) -> Result<Vec<Breadcrumb>>
where
    S: PageStore + ?Sized,
{
    let paths = prefixes(full_path);
    let lookups = paths.iter().map(|p| store.lookup_page_by_path(p));
    // try_join_all keeps input order
    let pages = try_join_all(lookups).await?;

    Ok(paths
        .into_iter()
        .zip(pages)
        .filter_map(|(to, page)| crumb(to, page))
        .collect())
}
