use anyhow::{Context, Result};
use site_kit_core::{Breadcrumb, resolve_breadcrumbs, resolve_breadcrumbs_concurrent};
use std::path::PathBuf;

use super::load_site;

/// Print the breadcrumb trail for `route`
pub async fn run(path: PathBuf, route: String, json: bool, concurrent: bool) -> Result<()> {
    let (_, store) = load_site(&path)?;

    let crumbs = if concurrent {
        resolve_breadcrumbs_concurrent(&store, &route).await
    } else {
        resolve_breadcrumbs(&store, &route).await
    }
    .with_context(|| format!("Failed to resolve breadcrumbs for '{}'", route))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&crumbs)?);
    } else {
        println!("{}", format_trail(&crumbs));
    }

    Ok(())
}

fn format_trail(crumbs: &[Breadcrumb]) -> String {
    if crumbs.is_empty() {
        return "(no breadcrumbs)".to_string();
    }
    crumbs
        .iter()
        .map(|c| format!("{} ({})", c.label, c.to))
        .collect::<Vec<_>>()
        .join(" › ")
}
