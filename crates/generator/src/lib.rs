//! Static site generation: every page and news item becomes one HTML file
//! carrying site navigation and its breadcrumb trail.

pub mod template;

use site_kit_content::ContentStore;
use site_kit_core::breadcrumbs::segments;
use site_kit_core::{PageStore, Result, SiteConfig, resolve_breadcrumbs};
use template::{
    PageView, STYLESHEET, render_breadcrumbs, render_markdown, render_nav, render_news_list,
    render_page,
};
use tracing::{debug, instrument, warn};

pub const NEWS_INDEX: &str = "/news";

pub struct GeneratedSite {
    pub pages: Vec<(String, String)>,   // (path, html)
    pub assets: Vec<(String, Vec<u8>)>, // (path, data)
}

impl GeneratedSite {
    /// HTML for a route, if one was generated
    pub fn page(&self, route: &str) -> Option<&str> {
        self.pages
            .iter()
            .find(|(path, _)| path == route)
            .map(|(_, html)| html.as_str())
    }
}

/// File a route is written to: `/` is `index.html`, `/a/b` is `a/b/index.html`
///
/// `.` and `..` segments are dropped so no route can address a file
/// outside the output directory.
pub fn output_path(route: &str) -> String {
    let parts: Vec<&str> = segments(route)
        .into_iter()
        .filter(|s| *s != "." && *s != "..")
        .collect();
    if parts.is_empty() {
        "index.html".to_string()
    } else {
        format!("{}/index.html", parts.join("/"))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateOptions {
    /// Inject the hot reload script
    pub preview: bool,
}

/// Generate the site, resolving breadcrumbs against the content itself.
pub async fn generate_site(
    config: &SiteConfig,
    content: &ContentStore,
    options: GenerateOptions,
) -> Result<GeneratedSite> {
    generate_site_with(config, content, content, options).await
}

/// Generate the site with breadcrumbs resolved against `pages`.
///
/// A page whose breadcrumbs cannot be resolved is dropped with a warning,
/// unless `build.fail_on_error` is set, in which case generation stops.
#[instrument(skip_all, fields(site = %config.name))]
pub async fn generate_site_with<S>(
    config: &SiteConfig,
    content: &ContentStore,
    pages: &S,
    options: GenerateOptions,
) -> Result<GeneratedSite>
where
    S: PageStore + ?Sized,
{
    let nav = render_nav(content.nav());
    let mut site = GeneratedSite {
        pages: Vec::new(),
        assets: vec![("style.css".to_string(), STYLESHEET.as_bytes().to_vec())],
    };

    let mut news_page_exists = false;

    for page in content.pages() {
        let crumbs = match resolve_breadcrumbs(pages, &page.path).await {
            Ok(crumbs) => crumbs,
            Err(e) if config.build.fail_on_error => return Err(e),
            Err(e) => {
                warn!(path = %page.path, error = %e, "skipping page");
                continue;
            }
        };

        let mut body = render_markdown(&page.body);
        if page.path == NEWS_INDEX {
            news_page_exists = true;
            body.push_str(&render_news_list(content.news()));
        }

        let view = PageView {
            route: &page.path,
            title: page.label().unwrap_or_default(),
            nav: &nav,
            breadcrumbs: &render_breadcrumbs(&crumbs),
            content: &body,
        };
        debug!(path = %page.path, crumbs = crumbs.len(), "rendered page");
        site.pages
            .push((page.path.clone(), render_page(config, &view, options.preview)));
    }

    if !content.news().is_empty() && !news_page_exists {
        let view = PageView {
            route: NEWS_INDEX,
            title: "News",
            nav: &nav,
            breadcrumbs: "",
            content: &format!("<h1>News</h1>{}", render_news_list(content.news())),
        };
        site.pages.push((
            NEWS_INDEX.to_string(),
            render_page(config, &view, options.preview),
        ));
    }

    for item in content.news() {
        let crumbs = match resolve_breadcrumbs(pages, &item.path).await {
            Ok(crumbs) => crumbs,
            Err(e) if config.build.fail_on_error => return Err(e),
            Err(e) => {
                warn!(path = %item.path, error = %e, "skipping news item");
                continue;
            }
        };

        let content_html = format!(
            r#"<h1>{}</h1><p><time datetime="{}">{}</time></p>{}"#,
            template::html_escape(&item.title),
            template::html_escape(&item.date),
            template::html_escape(&template::format_date(&item.date)),
            render_markdown(&item.body)
        );
        let view = PageView {
            route: &item.path,
            title: &item.title,
            nav: &nav,
            breadcrumbs: &render_breadcrumbs(&crumbs),
            content: &content_html,
        };
        site.pages
            .push((item.path.clone(), render_page(config, &view, options.preview)));
    }

    Ok(site)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use site_kit_core::config::parse_site_toml_str;
    use site_kit_core::{Error, NewsItem, PageRecord};

    fn content() -> ContentStore {
        let mut about = PageRecord::new("/about", "About");
        about.body = "Hello **there**".into();
        ContentStore::from_parts(
            vec![
                PageRecord::new("/", "Home"),
                about,
                PageRecord::new("/about/team/people", "People"),
            ],
            vec![NewsItem {
                path: "/news/launch".into(),
                title: "Launch".into(),
                date: "2025-07-15".into(),
                body: "We launched.".into(),
                source: None,
            }],
            vec![serde_json::from_str(r#"{"label": "About", "to": "/about"}"#).unwrap()],
        )
    }

    struct BrokenStore;

    #[async_trait]
    impl PageStore for BrokenStore {
        async fn lookup_page_by_path(&self, path: &str) -> Result<Option<PageRecord>> {
            Err(Error::store_unavailable(path, "offline"))
        }
    }

    /// The `<nav class="breadcrumbs">` element of a rendered page
    fn breadcrumb_block(html: &str) -> &str {
        let start = html.find(r#"<nav class="breadcrumbs""#).expect("no breadcrumbs");
        let end = start + html[start..].find("</nav>").unwrap() + "</nav>".len();
        &html[start..end]
    }

    #[test]
    fn test_output_path() {
        assert_eq!(output_path("/"), "index.html");
        assert_eq!(output_path("/about"), "about/index.html");
        assert_eq!(output_path("/news/launch"), "news/launch/index.html");
    }

    #[test]
    fn test_output_path_stays_inside_output_dir() {
        assert_eq!(output_path("/../../escaped"), "escaped/index.html");
        assert_eq!(output_path("/a/./b/../c"), "a/b/c/index.html");
        assert_eq!(output_path("/.."), "index.html");
    }

    #[tokio::test]
    async fn test_generate_site() {
        let config = parse_site_toml_str("[site]\nname = \"Test\"\n").unwrap();
        let site = generate_site(&config, &content(), GenerateOptions::default())
            .await
            .unwrap();

        let routes: Vec<&str> = site.pages.iter().map(|(r, _)| r.as_str()).collect();
        assert_eq!(
            routes,
            vec!["/", "/about", "/about/team/people", "/news", "/news/launch"]
        );

        let people = breadcrumb_block(site.page("/about/team/people").unwrap());
        assert_eq!(
            people,
            concat!(
                r#"<nav class="breadcrumbs" aria-label="Breadcrumb"><ol>"#,
                r#"<li><a href="/about">About</a></li>"#,
                r#"<li aria-current="page">People</li>"#,
                "</ol></nav>"
            )
        );

        let about = site.page("/about").unwrap();
        assert!(about.contains("<strong>there</strong>"));
        assert!(about.contains(r#"<nav class="site-nav">"#));

        let news = site.page("/news").unwrap();
        assert!(news.contains("July 15, 2025"));
        assert_eq!(site.assets[0].0, "style.css");
    }

    #[tokio::test]
    async fn test_news_page_in_pages_collection_gets_listing() {
        let config = parse_site_toml_str("[site]\nname = \"Test\"\n").unwrap();
        let mut store_pages: Vec<PageRecord> = vec![PageRecord::new("/news", "Latest")];
        store_pages[0].body = "Our news.".into();
        let content = ContentStore::from_parts(store_pages, content().news().to_vec(), vec![]);

        let site = generate_site(&config, &content, GenerateOptions::default())
            .await
            .unwrap();
        let news_pages = site.pages.iter().filter(|(r, _)| r == NEWS_INDEX).count();
        assert_eq!(news_pages, 1);

        let news = site.page("/news").unwrap();
        assert!(news.contains("Our news."));
        assert!(news.contains(r#"<a href="/news/launch">Launch</a>"#));

        // the news item trail picks up the /news page
        let item = breadcrumb_block(site.page("/news/launch").unwrap());
        assert!(item.contains(r#"<li aria-current="page">Latest</li>"#));
    }

    #[tokio::test]
    async fn test_lookup_failures_skip_pages() {
        let config = parse_site_toml_str("[site]\nname = \"Test\"\n").unwrap();
        let site = generate_site_with(&config, &content(), &BrokenStore, GenerateOptions::default())
            .await
            .unwrap();
        // only the root (no lookups) and the synthesized news index survive
        let routes: Vec<&str> = site.pages.iter().map(|(r, _)| r.as_str()).collect();
        assert_eq!(routes, vec!["/", "/news"]);
    }

    #[tokio::test]
    async fn test_lookup_failures_abort_with_fail_on_error() {
        let config =
            parse_site_toml_str("[site]\nname = \"Test\"\n[build]\nfail_on_error = true\n").unwrap();
        let result =
            generate_site_with(&config, &content(), &BrokenStore, GenerateOptions::default()).await;
        assert!(matches!(result, Err(Error::StoreUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_preview_injects_reload() {
        let config = parse_site_toml_str("[site]\nname = \"Test\"\n").unwrap();
        let site = generate_site(&config, &content(), GenerateOptions { preview: true })
            .await
            .unwrap();
        assert!(site.page("/").unwrap().contains("/_reload"));
    }
}
