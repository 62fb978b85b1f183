//! Findings layout: one folder per category or profile under the output dir.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Serialize;
use uuid::Uuid;

const PIN_SEARCH_URL: &str = "https://www.pinterest.com/search/pins/?q=";

/// Folder name for a category or profile: lowercase, spaces to `_`.
///
/// Path separators are also replaced so a name can never escape the
/// output directory.
pub(crate) fn slug(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect()
}

/// Pin search URL the category was discovered from.
pub(crate) fn search_url(category: &str) -> String {
    let encoded = utf8_percent_encode(category.trim(), NON_ALPHANUMERIC).to_string();
    format!("{PIN_SEARCH_URL}{encoded}")
}

/// Identity stamped on every file written by one run.
#[derive(Debug, Clone, Copy, Serialize)]
pub(crate) struct RunStamp {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
}

impl RunStamp {
    pub(crate) fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
        }
    }
}

/// Create `<out>/<slug(name)>` and return it.
pub(crate) fn run_dir(out: &Path, name: &str) -> anyhow::Result<PathBuf> {
    let dir = out.join(slug(name));
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create output dir {}", dir.display()))?;
    Ok(dir)
}

pub(crate) fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> anyhow::Result<()> {
    let body = serde_json::to_string_pretty(value)
        .with_context(|| format!("failed to serialize {}", path.display()))?;
    fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))
}

/// Write one entry per line, skipping blanks, with a trailing newline.
pub(crate) fn write_lines<'a, I>(path: &Path, lines: I) -> anyhow::Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut body = String::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        body.push_str(line);
        body.push('\n');
    }
    fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))
}
