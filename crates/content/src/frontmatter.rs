//! Front matter splitting for Markdown content files.
//!
//! `---` fences hold YAML, `+++` fences hold TOML. A file without a fence
//! is all body.

use serde::de::DeserializeOwned;
use site_kit_core::{Error, Result};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Toml,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Split<'a> {
    pub front: Option<(Format, &'a str)>,
    pub body: &'a str,
}

/// Separate the front matter block from the Markdown body.
pub fn split(text: &str) -> Split<'_> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    for (fence, format) in [("---", Format::Yaml), ("+++", Format::Toml)] {
        let Some(rest) = strip_fence_line(text, fence) else {
            continue;
        };
        let mut offset = 0;
        for line in rest.split_inclusive('\n') {
            if line.trim_end() == fence {
                let front = &rest[..offset];
                let body = &rest[offset + line.len()..];
                return Split {
                    front: Some((format, front)),
                    body,
                };
            }
            offset += line.len();
        }
    }

    Split {
        front: None,
        body: text,
    }
}

fn strip_fence_line<'a>(text: &'a str, fence: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(fence)?;
    if let Some(rest) = rest.strip_prefix("\r\n") {
        Some(rest)
    } else {
        rest.strip_prefix('\n')
    }
}

/// Deserialize a front matter block into `T`, tagging errors with `file`.
pub fn parse<T: DeserializeOwned + Default>(file: &Path, front: Option<(Format, &str)>) -> Result<T> {
    match front {
        None => Ok(T::default()),
        Some((_, raw)) if raw.trim().is_empty() => Ok(T::default()),
        Some((Format::Yaml, raw)) => {
            serde_yaml::from_str(raw).map_err(|e| Error::schema(file, e.to_string()))
        }
        Some((Format::Toml, raw)) => {
            toml::from_str(raw).map_err(|e| Error::schema(file, e.to_string()))
        }
    }
}

/// Text of the first level-one ATX heading in a Markdown body.
pub fn first_heading(body: &str) -> Option<&str> {
    body.lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix("# "))
        .map(|h| h.trim().trim_end_matches('#').trim())
        .filter(|h| !h.is_empty())
}
