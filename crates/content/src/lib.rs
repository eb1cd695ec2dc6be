//! Content collections: loading pages, news and nav from disk into a
//! path-keyed store that breadcrumb resolution and generation read from.

pub mod frontmatter;
pub mod loader;
pub mod store;

pub use loader::{normalize_route, route_from_file};
pub use store::ContentStore;
