//! Filename rewriting for provisioned folders.
//!
//! Every file under the folder is renamed to fold in the new issue's id:
//! whitespace is tidied first, then the first matching identifier rule wins:
//!
//! 1. base contains `issue-` (any case) → every occurrence becomes
//!    `Issue-<iid>`, with the id landing directly against the remainder
//!    (`issue-foo` → `Issue-42foo`);
//! 2. else base contains the whole word `issue` → every occurrence becomes
//!    `Issue-<iid>`;
//! 3. else the base is left alone.
//!
//! Running the pass twice re-matches rule 1 against its own output and
//! prepends the id again. That matches the tool's established behavior and
//! is pinned by tests; do not change it without a product decision.

use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::warn;
use walkdir::WalkDir;

// Compile regexes once using LazyLock
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static SPACED_HYPHEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s-\s").unwrap());

static ISSUE_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)issue-").unwrap());

static ISSUE_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bissue\b").unwrap());

/// Rename every file (never directories) under `folder` in place.
///
/// Rename failures are deliberately swallowed: the error is logged and the
/// pass moves on, leaving that file under its original name.
pub fn normalize(folder: &Path, iid: i64) {
    for entry in WalkDir::new(folder).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            warn!(path = %entry.path().display(), "skipping file with non-UTF-8 name");
            continue;
        };

        let rewritten = rewrite_filename(name, iid);
        if rewritten == name {
            continue;
        }

        let target = entry.path().with_file_name(&rewritten);
        if let Err(err) = fs::rename(entry.path(), &target) {
            warn!(
                from = %entry.path().display(),
                to = %target.display(),
                error = %err,
                "rename failed, keeping original name"
            );
        }
    }
}

/// Compute the normalized filename: tidy the base, apply the identifier
/// rules, and reattach the extension.
pub fn rewrite_filename(name: &str, iid: i64) -> String {
    let (base, extension) = split_extension(name);
    let base = tidy_whitespace(base);
    let base = insert_identifier(&base, iid);
    format!("{base}{extension}")
}

/// Split at the last dot; the extension includes the dot and is empty when
/// there is none.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) => name.split_at(idx),
        None => (name, ""),
    }
}

/// Collapse whitespace runs to single spaces, collapse spaced hyphens to a
/// bare hyphen, and trim the ends.
fn tidy_whitespace(base: &str) -> String {
    let collapsed = WHITESPACE_RUN.replace_all(base, " ");
    let hyphenated = SPACED_HYPHEN.replace_all(&collapsed, "-");
    hyphenated.trim().to_string()
}

fn insert_identifier(base: &str, iid: i64) -> String {
    let replacement = format!("Issue-{iid}");
    if ISSUE_PREFIX.is_match(base) {
        ISSUE_PREFIX.replace_all(base, replacement.as_str()).into_owned()
    } else if ISSUE_WORD.is_match(base) {
        ISSUE_WORD.replace_all(base, replacement.as_str()).into_owned()
    } else {
        base.to_string()
    }
}
