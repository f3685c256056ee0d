//! Filename classification for the input tree.

use globset::{GlobBuilder, GlobMatcher};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// Substring that marks a directory under the root as a chapter.
pub const EPISODE_MARKER: &str = "Episode";

static EPISODE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Episode\s*(\d+)").expect("episode pattern is valid"));

static MARKDOWN: Lazy<GlobMatcher> = Lazy::new(|| case_insensitive("*.md"));
static IMAGE: Lazy<GlobMatcher> = Lazy::new(|| case_insensitive("*.{jpg,jpeg,png,gif}"));
static JPEG: Lazy<GlobMatcher> = Lazy::new(|| case_insensitive("*.{jpg,jpeg}"));

fn case_insensitive(pattern: &str) -> GlobMatcher {
    GlobBuilder::new(pattern)
        .case_insensitive(true)
        .literal_separator(true)
        .build()
        .expect("filename pattern is valid")
        .compile_matcher()
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}

pub fn is_chapter_dir_name(name: &str) -> bool {
    name.contains(EPISODE_MARKER)
}

pub fn is_markdown(path: &Path) -> bool {
    file_name(path).is_some_and(|name| MARKDOWN.is_match(name))
}

/// Images collected into a chapter's index: jpg, jpeg, png and gif.
pub fn is_image(path: &Path) -> bool {
    file_name(path).is_some_and(|name| IMAGE.is_match(name))
}

/// The only images the renderer can place.
pub fn is_jpeg(path: &Path) -> bool {
    file_name(path).is_some_and(|name| JPEG.is_match(name))
}

/// The number after `Episode` in a directory's name, or 0 when there is none.
pub fn episode_number(name: &str) -> u64 {
    EPISODE_NUMBER
        .captures(name)
        .and_then(|captures| captures.get(1))
        .and_then(|digits| digits.as_str().parse().ok())
        .unwrap_or(0)
}

/// The printed chapter title: `Episode` followed by whatever the directory
/// name has after the `Episode` prefix.
pub fn chapter_title(name: &str) -> String {
    let suffix = name.strip_prefix(EPISODE_MARKER).unwrap_or(name);
    format!("{EPISODE_MARKER} {}", suffix.trim())
}
