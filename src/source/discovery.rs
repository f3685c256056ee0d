use super::chapter::{Chapter, ChapterBuilder};
use super::classify;
use crate::error::BookError;
use anyhow::Result;
use std::path::Path;

/// Find every chapter under `root`, ordered by episode number.
///
/// Directories whose name contains `Episode` become chapters. Those without
/// a Markdown file at their top level are skipped with a warning; if nothing
/// is left the result is [`BookError::NoChapters`].
pub fn discover_chapters(root: &Path) -> Result<Vec<Chapter>> {
    validate_root(root)?;

    let mut entries = std::fs::read_dir(root)
        .map_err(|e| BookError::io(root, e))?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| BookError::io(root, e))?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut chapters = Vec::new();
    for entry in entries {
        let name = entry.file_name().to_string_lossy().to_string();
        let path = entry.path();
        if !path.is_dir() || !classify::is_chapter_dir_name(&name) {
            continue;
        }

        match ChapterBuilder::default().path(&path).build() {
            Ok(chapter) => {
                log::debug!(
                    "found chapter {name} with {} file(s) and {} image(s)",
                    chapter.files().len(),
                    chapter.images().len()
                );
                chapters.push(chapter);
            }
            Err(e) => log::warn!("skipping chapter {name}: {e:#}"),
        }
    }

    if chapters.is_empty() {
        return Err(BookError::NoChapters(root.to_path_buf()).into());
    }

    // stable, so equal numbers keep their name order
    chapters.sort_by_key(Chapter::episode_number);
    Ok(chapters)
}

/// The book root must be a non-empty path to an existing directory.
pub fn validate_root(root: &Path) -> Result<()> {
    if root.as_os_str().is_empty() {
        return Err(BookError::InvalidConfig("root directory not provided".to_string()).into());
    }
    let metadata = std::fs::metadata(root).map_err(|e| {
        BookError::InvalidConfig(format!(
            "failed to access root directory {}: {e}",
            root.display()
        ))
    })?;
    if !metadata.is_dir() {
        return Err(BookError::InvalidConfig(format!(
            "{} is not a directory",
            root.display()
        ))
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::fs;

    fn chapter(root: &Path, name: &str, files: &[&str]) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).expect("can create chapter dir");
        for file in files {
            fs::write(dir.join(file), format!("# {file}\n")).expect("can write file");
        }
    }

    fn names(chapters: &[Chapter]) -> Vec<String> {
        chapters.iter().map(Chapter::name).collect()
    }

    #[test]
    fn can_order_chapters_by_number() {
        let root = tempfile::tempdir().expect("can create temp dir");
        chapter(root.path(), "Episode 10", &["a.md"]);
        chapter(root.path(), "Episode 2", &["a.md"]);
        chapter(root.path(), "Episode 1", &["a.md"]);

        let chapters = discover_chapters(root.path()).expect("can discover");
        assert_eq!(names(&chapters), vec!["Episode 1", "Episode 2", "Episode 10"]);
    }

    #[test]
    fn can_break_ties_by_name() {
        let root = tempfile::tempdir().expect("can create temp dir");
        chapter(root.path(), "Episode 1 b", &["a.md"]);
        chapter(root.path(), "Episode Pilot", &["a.md"]);
        chapter(root.path(), "Episode 1 a", &["a.md"]);

        let chapters = discover_chapters(root.path()).expect("can discover");
        assert_eq!(
            names(&chapters),
            vec!["Episode Pilot", "Episode 1 a", "Episode 1 b"]
        );
    }

    #[test]
    fn can_skip_empty_and_unrelated_directories() {
        let root = tempfile::tempdir().expect("can create temp dir");
        chapter(root.path(), "Episode 1", &["a.md"]);
        chapter(root.path(), "Episode 2", &["notes.txt"]);
        chapter(root.path(), "assets", &["a.md"]);
        fs::write(root.path().join("Episode 3.md"), "# stray").expect("can write");

        let chapters = discover_chapters(root.path()).expect("can discover");
        assert_eq!(names(&chapters), vec!["Episode 1"]);
    }

    #[test]
    fn can_report_missing_chapters() {
        let root = tempfile::tempdir().expect("can create temp dir");
        chapter(root.path(), "Episode 1", &[]);
        let err = discover_chapters(root.path()).expect_err("no chapters");
        assert!(matches!(
            err.downcast_ref::<BookError>(),
            Some(BookError::NoChapters(_))
        ));
    }

    #[test]
    fn can_reject_bad_roots() {
        let root = tempfile::tempdir().expect("can create temp dir");
        let file = root.path().join("file.txt");
        fs::write(&file, "").expect("can write");

        let missing = root.path().join("missing");
        for bad in [Path::new(""), missing.as_path(), file.as_path()] {
            let err = discover_chapters(bad).expect_err("bad root");
            assert!(
                matches!(err.downcast_ref::<BookError>(), Some(BookError::InvalidConfig(_))),
                "{bad:?}: {err:#}"
            );
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn chapters_come_out_in_episode_order(
            numbers in prop::collection::btree_set(0u64..500, 1..8),
        ) {
            let root = tempfile::tempdir().expect("can create temp dir");
            for n in numbers.iter() {
                chapter(root.path(), &format!("Episode{n}"), &["a.md"]);
            }

            let chapters = discover_chapters(root.path()).expect("can discover");
            let found: Vec<u64> = chapters.iter().map(Chapter::episode_number).collect();
            let expected: Vec<u64> = numbers.into_iter().collect();
            prop_assert_eq!(found, expected);
        }
    }
}
