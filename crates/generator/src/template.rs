use chrono::NaiveDate;
use pulldown_cmark::{Options, Parser, html};
use site_kit_core::{Breadcrumb, NavEntry, NewsItem, SiteConfig};

/// HTML-escape a string to prevent XSS attacks
///
/// Escapes: & < > " '
pub fn html_escape(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            '\'' => "&#x27;".to_string(),
            _ => c.to_string(),
        })
        .collect()
}

/// Render Markdown to HTML (tables, footnotes, strikethrough enabled)
pub fn render_markdown(body: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(body, options);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

/// Human-readable news date; unparseable dates are shown as written
pub fn format_date(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%B %-d, %Y").to_string())
        .unwrap_or_else(|_| date.to_string())
}

/// Breadcrumb trail as an ordered list. Empty trails render nothing.
pub fn render_breadcrumbs(crumbs: &[Breadcrumb]) -> String {
    if crumbs.is_empty() {
        return String::new();
    }

    let last = crumbs.len() - 1;
    let items: String = crumbs
        .iter()
        .enumerate()
        .map(|(i, crumb)| {
            let label = html_escape(&crumb.label);
            if i == last {
                format!(r#"<li aria-current="page">{}</li>"#, label)
            } else {
                format!(r#"<li><a href="{}">{}</a></li>"#, html_escape(&crumb.to), label)
            }
        })
        .collect();

    format!(
        r#"<nav class="breadcrumbs" aria-label="Breadcrumb"><ol>{}</ol></nav>"#,
        items
    )
}

fn nav_link(label: &str, to: Option<&str>) -> String {
    match to {
        Some(to) => format!(r#"<a href="{}">{}</a>"#, html_escape(to), html_escape(label)),
        None => format!("<span>{}</span>", html_escape(label)),
    }
}

/// Site navigation, up to three levels deep
pub fn render_nav(entries: &[NavEntry]) -> String {
    if entries.is_empty() {
        return String::new();
    }

    let items: String = entries
        .iter()
        .map(|entry| {
            let children: String = entry
                .children
                .iter()
                .map(|child| {
                    let leaves: String = child
                        .children
                        .iter()
                        .map(|leaf| format!("<li>{}</li>", nav_link(&leaf.label, Some(&leaf.to))))
                        .collect();
                    let leaves = if leaves.is_empty() {
                        leaves
                    } else {
                        format!("<ul>{}</ul>", leaves)
                    };
                    format!("<li>{}{}</li>", nav_link(&child.label, Some(&child.to)), leaves)
                })
                .collect();
            let children = if children.is_empty() {
                children
            } else {
                format!("<ul>{}</ul>", children)
            };
            format!(
                "<li>{}{}</li>",
                nav_link(&entry.label, entry.to.as_deref()),
                children
            )
        })
        .collect();

    format!(r#"<nav class="site-nav"><ul>{}</ul></nav>"#, items)
}

/// News listing, in the order given
pub fn render_news_list(items: &[NewsItem]) -> String {
    let entries: String = items
        .iter()
        .map(|item| {
            format!(
                r#"<li><a href="{}">{}</a> <time datetime="{}">{}</time></li>"#,
                html_escape(&item.path),
                html_escape(&item.title),
                html_escape(&item.date),
                html_escape(&format_date(&item.date))
            )
        })
        .collect();
    format!(r#"<ul class="news-list">{}</ul>"#, entries)
}

/// Everything that varies between pages
pub struct PageView<'a> {
    /// Route the page is served at
    pub route: &'a str,
    pub title: &'a str,
    pub nav: &'a str,
    pub breadcrumbs: &'a str,
    /// Already-rendered HTML
    pub content: &'a str,
}

/// Wrap page content in the site layout
///
/// Shared between preview and build so the preview matches what gets
/// written to disk.
pub fn render_page(config: &SiteConfig, view: &PageView<'_>, is_preview: bool) -> String {
    // Hot reload script only in preview mode
    let reload_script = if is_preview {
        r#"<script>
        // Hot reload via Server-Sent Events
        const eventSource = new EventSource('/_reload');
        eventSource.onmessage = () => location.reload();
        eventSource.onerror = () => eventSource.close();
    </script>"#
    } else {
        ""
    };

    let site_name = html_escape(&config.name);
    let page_title = if view.title.is_empty() || view.title == config.name {
        site_name.clone()
    } else {
        format!("{} - {}", html_escape(view.title), site_name)
    };

    let canonical = config
        .base_url
        .as_deref()
        .map(|base| {
            format!(
                r#"<link rel="canonical" href="{}{}">"#,
                html_escape(base),
                html_escape(view.route)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{page_title}</title>
    {canonical}
    <link rel="stylesheet" href="/style.css">
</head>
<body>
    <header><a class="site-name" href="/">{site_name}</a>{nav}</header>
    <main>
        {breadcrumbs}
        <article>{content}</article>
    </main>
    <footer>Generated by site-kit</footer>
    {reload_script}
</body>
</html>
"#,
        nav = view.nav,
        breadcrumbs = view.breadcrumbs,
        content = view.content,
    )
}

/// Stylesheet written next to the generated pages
pub const STYLESHEET: &str = r#"* { box-sizing: border-box; }
body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; line-height: 1.6; margin: 0; color: #1f2328; }
header { display: flex; gap: 2rem; align-items: center; padding: 1rem 2rem; border-bottom: 1px solid #d0d7de; }
header ul { list-style: none; margin: 0; padding: 0; display: flex; gap: 1rem; }
header ul ul { display: none; }
main { max-width: 860px; margin: 0 auto; padding: 2rem; }
.breadcrumbs ol { list-style: none; padding: 0; display: flex; flex-wrap: wrap; gap: 0.5rem; font-size: 0.9rem; }
.breadcrumbs li + li::before { content: "/"; margin-right: 0.5rem; color: #656d76; }
.news-list time { color: #656d76; font-size: 0.9rem; }
footer { text-align: center; color: #656d76; padding: 2rem; font-size: 0.8rem; }
"#;
