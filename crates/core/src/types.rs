use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One navigational link in a breadcrumb trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadcrumb {
    pub label: String,
    pub to: String,
}

/// A page in the `pages` collection, keyed by its route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Markdown body; empty for JSON/YAML pages
    #[serde(default)]
    pub body: String,
    /// File the record was loaded from, relative to the content dir
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
}

impl PageRecord {
    pub fn new(path: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: Some(title.into()),
            body: String::new(),
            source: None,
        }
    }

    /// The title to show in navigation, if the page has a non-empty one
    pub fn label(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }
}

/// An entry in the `news` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub path: String,
    pub title: String,
    /// Publication date as written in the source, normally `YYYY-MM-DD`
    pub date: String,
    #[serde(default)]
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
}

/// Top-level entry in the `nav` data collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavEntry {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default)]
    pub order: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavChild>,
}

/// Second-level nav link; `to` is required below the top level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavChild {
    pub label: String,
    pub to: String,
    #[serde(default)]
    pub order: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavLeaf>,
}

/// Third and deepest nav level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavLeaf {
    pub label: String,
    pub to: String,
    #[serde(default)]
    pub order: f64,
}

impl NavEntry {
    /// Every link target in this entry and its descendants, depth first
    pub fn links(&self) -> Vec<&str> {
        let mut out = Vec::new();
        if let Some(to) = &self.to {
            out.push(to.as_str());
        }
        for child in &self.children {
            out.push(child.to.as_str());
            out.extend(child.children.iter().map(|leaf| leaf.to.as_str()));
        }
        out
    }

    /// Sort children and grandchildren by `order`, then label
    pub fn sort_children(&mut self) {
        self.children
            .sort_by(|a, b| a.order.total_cmp(&b.order).then_with(|| a.label.cmp(&b.label)));
        for child in &mut self.children {
            child
                .children
                .sort_by(|a, b| a.order.total_cmp(&b.order).then_with(|| a.label.cmp(&b.label)));
        }
    }
}

/// The named collections a site is made of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Pages,
    News,
    Nav,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 3] = [
        CollectionKind::Pages,
        CollectionKind::News,
        CollectionKind::Nav,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CollectionKind::Pages => "pages",
            CollectionKind::News => "news",
            CollectionKind::Nav => "nav",
        }
    }
}

impl std::fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
