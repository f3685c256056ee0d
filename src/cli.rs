use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

pub const DEFAULT_INDIR: &str = "tmp";
pub const DEFAULT_OUTFILE: &str = "tmp.pdf";

/// Long options that may also be written with a single dash, `-indir book`.
const LONG_FLAGS: &[&str] = &[
    "indir",
    "outfile",
    "debug",
    "config",
    "no-page-numbers",
    "help",
    "version",
];

#[derive(Parser, Debug)]
#[clap(author, version, about)]
pub struct Cli {
    /// Directory holding the Episode chapter directories
    #[clap(long, default_value = DEFAULT_INDIR)]
    pub indir: PathBuf,

    /// Where to write the PDF. Defaults to `<indir>.pdf` when only the input
    /// directory is given
    #[clap(long, default_value = DEFAULT_OUTFILE)]
    pub outfile: PathBuf,

    /// Log at debug level, with source locations
    #[clap(long)]
    pub debug: bool,

    /// TOML file with `[pdf]` settings
    #[clap(long, env = "BOOK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Leave the page number footer off
    #[clap(long)]
    pub no_page_numbers: bool,
}

impl Cli {
    pub fn parse_normalized() -> Cli {
        Cli::parse_from(normalize_args(std::env::args_os()))
    }

    /// The output file, following the input directory's name when no output
    /// was given.
    pub fn output_path(&self) -> PathBuf {
        if self.outfile.as_os_str() == DEFAULT_OUTFILE && self.indir.as_os_str() != DEFAULT_INDIR {
            let mut name: OsString = self.indir.components().as_path().as_os_str().to_owned();
            name.push(".pdf");
            PathBuf::from(name)
        } else {
            self.outfile.clone()
        }
    }
}

/// Rewrite `-flag` style long options to `--flag` so clap accepts them.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .enumerate()
        .map(|(i, arg)| {
            if i == 0 {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            let Some(rest) = text.strip_prefix('-') else {
                return arg;
            };
            if rest.starts_with('-') {
                return arg;
            }
            let name = rest.split('=').next().unwrap_or_default();
            if LONG_FLAGS.contains(&name) {
                OsString::from(format!("-{text}"))
            } else {
                arg
            }
        })
        .collect()
}
