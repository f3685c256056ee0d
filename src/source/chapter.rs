use super::classify;
use crate::error::BookError;
use anyhow::{anyhow, Result};
use derive_builder::Builder;
use ignore::WalkBuilder;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One `Episode*` directory: its Markdown files in reading order, and every
/// image anywhere beneath it indexed by file name.
#[derive(Builder, Debug, Clone)]
#[builder(setter(into), build_fn(skip, error = "anyhow::Error"))]
pub struct Chapter {
    path: PathBuf,
    /// Markdown files directly inside the chapter directory, ascending
    #[builder(setter(skip))]
    files: Vec<PathBuf>,
    /// Image file name to path; when names collide the last one walked wins
    #[builder(setter(skip))]
    images: BTreeMap<String, PathBuf>,
}

impl ChapterBuilder {
    /// Scan the chapter directory. Markdown files come from its top level;
    /// images are collected from the whole subtree.
    ///
    /// Fails with [`BookError::EmptyChapter`] when no Markdown file is found.
    pub fn build(&mut self) -> Result<Chapter> {
        let path = self
            .path
            .take()
            .ok_or_else(|| anyhow!("chapter path not provided"))?;

        if !path.is_dir() {
            return Err(BookError::InvalidConfig(format!(
                "chapter path {} isn't a directory",
                path.display()
            ))
            .into());
        }

        let mut files = markdown_files(&path)?;
        files.sort();
        if files.is_empty() {
            return Err(BookError::EmptyChapter(path).into());
        }

        let images = image_index(&path);

        Ok(Chapter {
            path,
            files,
            images,
        })
    }
}

fn markdown_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| BookError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| BookError::io(dir, e))?;
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        let path = dir.join(entry.file_name());
        if is_file && classify::is_markdown(&path) {
            log::debug!("found markdown file: {}", path.display());
            files.push(path);
        }
    }
    Ok(files)
}

fn image_index(dir: &Path) -> BTreeMap<String, PathBuf> {
    let walk = WalkBuilder::new(dir)
        .standard_filters(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut images = BTreeMap::new();
    for entry in walk {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("skipping part of {}: {e}", dir.display());
                continue;
            }
        };
        if entry.file_type().is_some_and(|t| t.is_dir()) {
            continue;
        }
        if !classify::is_image(entry.path()) {
            continue;
        }
        if let Some(name) = entry.path().file_name() {
            images.insert(name.to_string_lossy().to_string(), entry.into_path());
        }
    }
    images
}

impl Chapter {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The directory's own name.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    pub fn title(&self) -> String {
        classify::chapter_title(&self.name())
    }

    pub fn episode_number(&self) -> u64 {
        classify::episode_number(&self.name())
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn images(&self) -> &BTreeMap<String, PathBuf> {
        &self.images
    }

    /// Look an image up by its file name exactly as written.
    pub fn image(&self, name: &str) -> Option<&Path> {
        self.images.get(name).map(PathBuf::as_path)
    }
}
