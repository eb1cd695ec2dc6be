pub mod breadcrumbs;
pub mod config;
pub mod error;
pub mod types;

pub use breadcrumbs::{PageStore, resolve_breadcrumbs, resolve_breadcrumbs_concurrent};
pub use config::{SiteConfig, parse_site_toml};
pub use error::{Error, Result};
pub use types::*;
