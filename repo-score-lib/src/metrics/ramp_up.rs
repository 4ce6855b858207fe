//! Documentation volume relative to code volume.
//!
//! Everything is derived from the contents API: top-level files and folders are
//! classified by name, documentation folders are listed one level deep, and source
//! folders are walked with an explicit `(path, depth)` worklist bounded at
//! [`MAX_SOURCE_DEPTH`] levels below the folder itself.

use super::MetricContext;
use crate::Result;
use crate::facts::RepoIdentity;
use ohno::app_err;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::Deserialize;

const LOG_TARGET: &str = "   ramp_up";

/// Levels descended below a source folder.
const MAX_SOURCE_DEPTH: u32 = 2;

/// Code volume, in bytes, under which a project counts as small.
const SMALL_PROJECT_THRESHOLD: u64 = 10_000;

const SMALL_PROJECT_MULTIPLIER: f64 = 5.0;
const LARGE_PROJECT_MULTIPLIER: f64 = 1.5;

const DOC_FILES: &[&str] = &["readme.md", "changelog.md"];
const DOCS_DIRS: &[&str] = &["docs", "doc", "documentation", "documents"];
const EXAMPLES_DIRS: &[&str] = &["examples", "example", "sample", "samples", "demos"];
const SOURCE_DIRS: &[&str] = &["src", "source", "code", "lib"];

const SOURCE_EXTENSIONS: &[&str] = &[
    "js", "ts", "jsx", "tsx", "mjs", "cjs", "py", "java", "c", "cpp", "h", "hpp", "cs", "go", "rb", "rs", "php", "swift", "kt", "scala",
];

/// Characters escaped in a path segment of a contents URL.
const PATH_SEGMENT: &AsciiSet = &CONTROLS.add(b' ').add(b'"').add(b'#').add(b'%').add(b'<').add(b'>').add(b'?').add(b'`').add(b'{').add(b'}');

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    #[serde(other)]
    Other,
}

/// One entry of a contents listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default)]
    pub size: u64,
}

impl ContentEntry {
    fn is_dir_named(&self, names: &[&str]) -> bool {
        self.kind == EntryKind::Dir && names.contains(&self.name.to_ascii_lowercase().as_str())
    }

    fn is_source_file(&self) -> bool {
        self.kind == EntryKind::File && is_source_file_name(&self.name)
    }
}

fn is_source_file_name(name: &str) -> bool {
    name.rsplit_once('.')
        .is_some_and(|(stem, ext)| !stem.is_empty() && SOURCE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

pub async fn compute(ctx: &MetricContext, identity: &RepoIdentity) -> Result<Option<f64>> {
    let top_level = list_dir(ctx, identity, "").await?;

    let mut doc_size = 0;
    let mut code_size = 0;
    let mut doc_dirs = Vec::new();
    let mut source_dirs = Vec::new();

    for entry in &top_level {
        if entry.kind == EntryKind::File && DOC_FILES.contains(&entry.name.to_ascii_lowercase().as_str()) {
            doc_size += entry.size;
        } else if entry.is_dir_named(DOCS_DIRS) || entry.is_dir_named(EXAMPLES_DIRS) {
            doc_dirs.push(entry.path.as_str());
        } else if entry.is_dir_named(SOURCE_DIRS) {
            source_dirs.push(entry.path.as_str());
        } else if entry.is_source_file() {
            code_size += entry.size;
        }
    }

    for dir in doc_dirs {
        let entries = list_dir(ctx, identity, dir).await?;
        doc_size += entries.iter().map(|e| e.size).sum::<u64>();
    }

    for dir in source_dirs {
        code_size += source_tree_size(ctx, identity, dir).await;
    }

    log::debug!(target: LOG_TARGET, "'{identity}' has {doc_size} bytes of documentation and {code_size} bytes of code");

    Ok(Some(ramp_up_score(doc_size, code_size)))
}

/// Sum recognized source files under `root`, down to [`MAX_SOURCE_DEPTH`] levels below it.
///
/// A folder whose listing fails contributes nothing.
async fn source_tree_size(ctx: &MetricContext, identity: &RepoIdentity, root: &str) -> u64 {
    let mut total = 0;
    let mut worklist = vec![(root.to_string(), 0)];

    while let Some((path, depth)) = worklist.pop() {
        let entries = match list_dir(ctx, identity, &path).await {
            Ok(entries) => entries,
            Err(e) => {
                log::debug!(target: LOG_TARGET, "Skipping '{path}' in '{identity}': {e:#}");
                continue;
            }
        };

        for entry in entries {
            match entry.kind {
                EntryKind::File if is_source_file_name(&entry.name) => total += entry.size,
                EntryKind::Dir if depth < MAX_SOURCE_DEPTH => worklist.push((entry.path, depth + 1)),
                _ => {}
            }
        }
    }

    total
}

async fn list_dir(ctx: &MetricContext, identity: &RepoIdentity, path: &str) -> Result<Vec<ContentEntry>> {
    let suffix = if path.is_empty() {
        "/contents".to_string()
    } else {
        let encoded: Vec<String> = path.split('/').map(|s| utf8_percent_encode(s, PATH_SEGMENT).to_string()).collect();
        format!("/contents/{}", encoded.join("/"))
    };

    let url = ctx.client.repo_url(identity.spec(), &suffix);
    ctx.client
        .get_json::<Vec<ContentEntry>>(&url)
        .await
        .into_result(&format!("contents of '{path}'"))?
        .ok_or_else(|| app_err!("directory '{path}' not found in '{identity}'"))
}

/// Score a documentation/code size pair.
///
/// No documentation scores 0; documentation without code scores 1.
#[expect(clippy::cast_precision_loss, reason = "byte counts fit comfortably in f64")]
#[must_use]
pub fn ramp_up_score(doc_size: u64, code_size: u64) -> f64 {
    if doc_size == 0 {
        return 0.0;
    }

    if code_size == 0 {
        return 1.0;
    }

    let ratio = doc_size as f64 / code_size as f64;
    let multiplier = if code_size < SMALL_PROJECT_THRESHOLD {
        SMALL_PROJECT_MULTIPLIER
    } else {
        LARGE_PROJECT_MULTIPLIER
    };

    (ratio * multiplier).min(1.0)
}
