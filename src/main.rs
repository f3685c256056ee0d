use anyhow::{Context, Result};
use cli::Cli;
use episode_book::{BookCompiler, BookConfig};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

mod cli;

const LOG_PREFIX: &str = "[BookCompiler] ";

fn main() -> ExitCode {
    let cli = Cli::parse_normalized();
    init_logging(cli.debug);

    if let Err(e) = try_main(&cli) {
        eprintln!(
            "{}: {e:#}",
            console::style(format!("{LOG_PREFIX}Error")).red()
        );
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format(move |buf, record| {
            if debug {
                writeln!(
                    buf,
                    "{LOG_PREFIX}{}:{} {}",
                    record.file().unwrap_or("?"),
                    record.line().unwrap_or(0),
                    record.args()
                )
            } else {
                writeln!(buf, "{LOG_PREFIX}{}", record.args())
            }
        })
        .init();
}

fn load_config(path: Option<&Path>) -> Result<BookConfig> {
    let Some(path) = path else {
        return Ok(BookConfig::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to load {} contents", path.display()))?;
    BookConfig::from_toml(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

#[cfg(unix)]
fn create_output_dir(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    std::fs::DirBuilder::new()
        .recursive(true)
        .mode(0o755)
        .create(dir)
}

#[cfg(not(unix))]
fn create_output_dir(dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)
}

/// Build the compiler for `cli`, checking the input before the output
/// directory is created.
fn prepare(cli: &Cli, config: BookConfig) -> Result<BookCompiler> {
    let output = cli.output_path();
    let mut compiler = BookCompiler::new(&cli.indir, &output).with_config(config);
    if cli.no_page_numbers {
        compiler.set_page_numbers(false);
    }
    compiler.validate()?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_output_dir(parent)
            .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
    }
    Ok(compiler)
}

fn try_main(cli: &Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let compiler = prepare(cli, config)?;

    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("can parse progress style")
            .progress_chars("#>-"),
    );
    progress.set_message("Rendering PDF...");

    let result = compiler.compile_with_progress(&progress);
    progress.finish_and_clear();
    let stats = result.with_context(|| "Failed to compile PDF")?;

    log::info!(
        "{} chapter(s), {} heading(s), {} page(s)",
        stats.chapter_count,
        stats.heading_count,
        stats.page_count
    );
    log::info!(
        "Successfully compiled PDF: {}",
        compiler.output_path().display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::ffi::OsStr;

    fn cli(indir: &Path, outfile: &Path) -> Cli {
        Cli::try_parse_from([
            OsStr::new("book"),
            OsStr::new("--indir"),
            indir.as_os_str(),
            OsStr::new("--outfile"),
            outfile.as_os_str(),
        ])
        .expect("can parse args")
    }

    #[test]
    fn can_leave_output_alone_for_a_bad_input() {
        let dir = tempfile::tempdir().expect("can create temp dir");
        let out_dir = dir.path().join("out");
        let cli = cli(&dir.path().join("missing"), &out_dir.join("book.pdf"));

        assert!(prepare(&cli, BookConfig::default()).is_err());
        assert!(!out_dir.exists());
    }

    #[test]
    fn can_create_the_output_directory() {
        let dir = tempfile::tempdir().expect("can create temp dir");
        let out_dir = dir.path().join("out").join("nested");
        let cli = cli(dir.path(), &out_dir.join("book.pdf"));

        let compiler = prepare(&cli, BookConfig::default()).expect("input is valid");
        assert!(out_dir.is_dir());
        assert_eq!(compiler.output_path(), out_dir.join("book.pdf"));
    }
}
