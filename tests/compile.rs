use episode_book::canvas::{Op, RectStyle};
use episode_book::layout::colours;
use episode_book::{
    directory_to_pdf, directory_to_pdf_file, BookCompiler, BookConfig, BookError, BookLayout,
    CancellationToken,
};
use image::{ImageFormat, Rgb, RgbImage};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn book(files: &[(&str, &str)]) -> TempDir {
    init_logging();
    let root = tempfile::tempdir().expect("can create temp dir");
    for (path, contents) in files {
        write(root.path(), path, contents);
    }
    root
}

fn write(root: &Path, path: &str, contents: &str) {
    let path = root.join(path);
    fs::create_dir_all(path.parent().expect("has parent")).expect("can create dir");
    fs::write(path, contents).expect("can write file");
}

fn write_jpeg(path: &Path, width: u32, height: u32) {
    fs::create_dir_all(path.parent().expect("has parent")).expect("can create dir");
    RgbImage::from_pixel(width, height, Rgb([40, 90, 160]))
        .save_with_format(path, ImageFormat::Jpeg)
        .expect("can write jpeg");
}

fn layout(root: &Path) -> BookLayout {
    BookCompiler::new(root, root.join("out.pdf"))
        .layout()
        .expect("can lay out book")
}

/// Titles of the chapter bookmarks, in document order, with their page index.
fn chapters(layout: &BookLayout, toc_title: &str) -> Vec<(String, usize)> {
    layout
        .document
        .bookmarks()
        .iter()
        .filter(|b| b.level == 0 && b.title != toc_title)
        .map(|b| (b.title.clone(), b.destination.page))
        .collect()
}

fn all_text(layout: &BookLayout) -> String {
    layout
        .document
        .pages()
        .iter()
        .map(|p| p.plain_text())
        .collect::<Vec<String>>()
        .join("\n")
}

#[test]
fn can_compile_a_single_heading() {
    let root = book(&[("Episode01/a.md", "# Hello\n\nWorld")]);
    let layout = layout(root.path());

    let pages = layout.document.pages();
    assert!(pages.len() >= 2);

    assert_eq!(layout.toc.len(), 1);
    assert_eq!(layout.toc[0].title, "Hello");
    assert_eq!(layout.toc[0].level, 1);

    let contents = pages[0].plain_text();
    assert!(contents.starts_with("Contents"), "{contents}");
    assert!(contents.contains("Hello"));
    assert!(contents.contains(&layout.toc[0].page_num.to_string()));

    let titles = chapters(&layout, "Contents");
    assert_eq!(titles.len(), 1);
    assert_eq!(titles[0].0, "Episode 01");
    assert!(pages[titles[0].1].texts().any(|t| t == "Episode 01"));

    assert!(all_text(&layout).contains("World"));
    assert_eq!(layout.stats.chapter_count, 1);
    assert_eq!(layout.stats.heading_count, 1);
    assert_eq!(layout.stats.page_count, pages.len());
}

#[test]
fn can_write_the_pdf_file() {
    let root = book(&[("Episode01/a.md", "# Hello\n\nWorld")]);
    let output = root.path().join("book.pdf");

    let stats = BookCompiler::new(root.path(), &output)
        .compile()
        .expect("can compile");
    let bytes = fs::read(&output).expect("output is written");
    assert!(bytes.starts_with(b"%PDF-"));
    assert!(stats.page_count >= 2);

    let again = root.path().join("again.pdf");
    directory_to_pdf_file(root.path(), &again).expect("can compile");
    assert_eq!(fs::read(&again).expect("output is written"), bytes);
}

#[test]
fn can_order_chapters_by_episode_number() {
    let root = book(&[
        ("Episode10/a.md", "## Ten\n"),
        ("Episode2/a.md", "## Two\n"),
        ("Episode01/a.md", "## One\n"),
    ]);
    let layout = layout(root.path());

    let titles: Vec<String> = chapters(&layout, "Contents")
        .into_iter()
        .map(|(title, _)| title)
        .collect();
    assert_eq!(titles, vec!["Episode 01", "Episode 2", "Episode 10"]);

    let headings: Vec<&str> = layout.toc.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(headings, vec!["One", "Two", "Ten"]);
}

#[test]
fn can_open_every_chapter_on_an_odd_page() {
    let root = book(&[
        ("Episode 1/a.md", "## One\n\nshort"),
        ("Episode 2/a.md", "## Two\n\nshort"),
        ("Episode 3/a.md", "## Three\n\nshort"),
    ]);
    let layout = layout(root.path());

    for (title, page) in chapters(&layout, "Contents") {
        assert_eq!(page % 2, 0, "{title} opens on page {}", page + 1);
    }
}

#[test]
fn can_render_files_in_path_order() {
    let root = book(&[
        ("Episode 1/b.md", "## from b\n"),
        ("Episode 1/a.md", "## from a\n"),
        ("Episode 1/C.md", "## from C\n"),
        ("Episode 1/notes/d.md", "## nested\n"),
    ]);
    let layout = layout(root.path());

    let headings: Vec<&str> = layout.toc.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(headings, vec!["from C", "from a", "from b"]);
}

#[test]
fn can_start_each_h1_on_a_new_page() {
    let root = book(&[
        (
            "Episode 1/a.md",
            "# First\n\nintro\n\n## Detail\n\ntext\n\n# Second\n\nmore\n",
        ),
        ("Episode 2/a.md", "# Third\n\n### Deep\n\nend\n"),
    ]);
    let layout = layout(root.path());
    let pages = layout.document.pages();

    let numbers: Vec<usize> = layout.toc.iter().map(|e| e.page_num).collect();
    assert!(numbers.windows(2).all(|w| w[0] <= w[1]), "{numbers:?}");

    for entry in layout.toc.iter().filter(|e| e.level == 1) {
        let first = pages[entry.page_num - 1].texts().next();
        assert_eq!(first, Some(entry.title.as_str()), "{entry:?}");
    }

    // every listed page number is where the heading really is
    for entry in layout.toc.iter() {
        assert!(
            pages[entry.page_num - 1].texts().any(|t| t == entry.title),
            "{entry:?}"
        );
    }
}

#[test]
fn can_render_tables() {
    let root = book(&[("Episode01/a.md", "| a | b |\n|---|---|\n| 1 | 2 |\n")]);
    let layout = layout(root.path());

    let rects: Vec<&Op> = layout
        .document
        .pages()
        .iter()
        .flat_map(|p| p.rects())
        .collect();
    assert_eq!(rects.len(), 4);
    for rect in rects {
        match rect {
            Op::Rect { w, style, fill, .. } => {
                assert_eq!(*w, 85.0);
                if *style == RectStyle::Fill {
                    assert_eq!(*fill, colours::TABLE_HEADER);
                }
            }
            _ => unreachable!(),
        }
    }
}

#[test]
fn can_find_images_in_the_chapter() {
    let root = book(&[("Episode01/a.md", "![cap](pic.jpg)\n")]);
    write_jpeg(&root.path().join("Episode01").join("pic.jpg"), 64, 32);
    let layout = layout(root.path());

    let ops: Vec<&Op> = layout
        .document
        .pages()
        .iter()
        .flat_map(|p| p.ops.iter())
        .collect();
    let image = ops.iter().find_map(|op| match op {
        Op::Image { w, h, y, .. } => Some((*w, *h, *y)),
        _ => None,
    });
    let (w, h, image_y) = image.expect("image is placed");
    assert_eq!((w, h), (100.0, 50.0));

    let caption = ops.iter().find_map(|op| match op {
        Op::Text { text, font, y, .. } if text == "cap" => Some((font.base_font(), *y)),
        _ => None,
    });
    let (font, caption_y) = caption.expect("caption is written");
    assert_eq!(font, "Times-Italic");
    assert!(caption_y > image_y + h);
}

#[test]
fn can_find_images_with_spaces_and_accents() {
    let root = book(&[(
        "Episode 1/a.md",
        "![first](café.jpg)\n\n![second](<my pic.jpg>)\n",
    )]);
    write_jpeg(&root.path().join("Episode 1").join("café.jpg"), 40, 10);
    write_jpeg(&root.path().join("Episode 1").join("my pic.jpg"), 40, 10);

    let layout = layout(root.path());
    let placed = layout
        .document
        .pages()
        .iter()
        .flat_map(|p| p.ops.iter())
        .filter(|op| matches!(op, Op::Image { .. }))
        .count();
    assert_eq!(placed, 2);

    let bytes = directory_to_pdf(root.path()).expect("can compile");
    assert!(bytes.starts_with(b"%PDF-"));
}

#[test]
fn can_refuse_unsupported_images() {
    let root = book(&[("Episode01/a.md", "![x](pic.png)\n")]);
    write(root.path(), "Episode01/pic.png", "not a jpeg");
    let output = root.path().join("out.pdf");

    let err = BookCompiler::new(root.path(), &output)
        .compile()
        .expect_err("png is not supported");
    assert!(matches!(
        err.downcast_ref::<BookError>(),
        Some(BookError::UnsupportedImageFormat(_))
    ));
    let message = format!("{err:#}");
    assert!(message.contains("failed to process chapter"), "{message}");
    assert!(message.contains("failed to process file"), "{message}");
    assert!(!output.exists());
}

#[test]
fn can_report_missing_images() {
    let root = book(&[("Episode01/a.md", "![x](nowhere.jpg)\n")]);
    let err = directory_to_pdf(root.path()).expect_err("image is missing");
    assert!(matches!(
        err.downcast_ref::<BookError>(),
        Some(BookError::ImageNotFound(src)) if src == "nowhere.jpg"
    ));
}

#[test]
fn can_report_an_empty_root() {
    let root = book(&[("notes/a.md", "# Not a chapter\n")]);
    let output = root.path().join("out.pdf");

    let err = BookCompiler::new(root.path(), &output)
        .compile()
        .expect_err("no chapters");
    assert!(matches!(
        err.downcast_ref::<BookError>(),
        Some(BookError::NoChapters(_))
    ));
    assert!(!output.exists());
}

#[test]
fn can_cancel_a_compilation() {
    let root = book(&[("Episode01/a.md", "# Hello\n")]);
    let output = root.path().join("out.pdf");
    let token = CancellationToken::new();
    token.cancel();

    let mut compiler = BookCompiler::new(root.path(), &output);
    compiler.set_cancellation_token(token);
    let err = compiler.compile().expect_err("cancelled");
    assert!(matches!(
        err.downcast_ref::<BookError>(),
        Some(BookError::Cancelled)
    ));
    assert!(!output.exists());
}

#[test]
fn can_produce_identical_bytes() {
    let root = book(&[
        ("Episode 1/a.md", "# One\n\nSome *text* and a [link](https://example.org).\n"),
        ("Episode 2/a.md", "# Two\n\n> quoted\n\n```\ncode\n```\n"),
    ]);
    write_jpeg(&root.path().join("Episode 2").join("pic.jpg"), 20, 20);
    write(root.path(), "Episode 2/b.md", "![](pic.jpg)\n");

    let first = directory_to_pdf(root.path()).expect("can compile");
    let second = directory_to_pdf(root.path()).expect("can compile");
    assert!(first.starts_with(b"%PDF-"));
    assert_eq!(first, second);
}

#[test]
fn can_follow_configuration() {
    let root = book(&[("Episode 1/a.md", "# One\n\n## Two\n")]);
    let config = BookConfig::from_toml(
        "[pdf]\ntoc_title = \"Episodes\"\npage_numbers = false\ntitle = \"Season One\"\n",
    )
    .expect("can parse config");
    let layout = BookCompiler::new(root.path(), root.path().join("out.pdf"))
        .with_config(config)
        .layout()
        .expect("can lay out book");

    let text = all_text(&layout);
    assert!(layout.document.pages()[0]
        .plain_text()
        .starts_with("Episodes"));
    assert!(!text.contains("Page 1"), "{text}");
}

#[test]
fn can_leave_out_the_table_of_contents() {
    let root = book(&[("Episode 1/a.md", "# One\n\ntext\n")]);
    let mut compiler = BookCompiler::new(root.path(), root.path().join("out.pdf"));
    compiler.clear_toc_levels();
    let layout = compiler.layout().expect("can lay out book");

    assert!(!all_text(&layout).contains("Contents"));
    assert_eq!(chapters(&layout, "Contents")[0].1, 0);
    // headings are still recorded for the outline
    assert_eq!(layout.toc.len(), 1);
}

#[test]
fn can_number_pages() {
    let root = book(&[("Episode 1/a.md", "# One\n\ntext\n")]);
    let layout = layout(root.path());
    for (i, page) in layout.document.pages().iter().enumerate() {
        let label = format!("Page {}", i + 1);
        assert!(page.texts().any(|t| t == label), "missing {label}");
    }
}
