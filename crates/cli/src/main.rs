//! nub — compress a file or directory tree into a fixed character budget.

mod detect;
mod walk;

use std::io::Read;
use std::path::PathBuf;

use clap::Parser;
use regex::Regex;

use nub_core::{CharBudget, FolderFormat, Options};

/// Compress source content into a fixed character budget.
#[derive(Parser)]
#[command(name = "nub", version, about)]
struct Cli {
    /// File or directory to compress. Reads stdin when omitted.
    path: Option<PathBuf>,

    /// Output shape as WIDTH:HEIGHT (default 80:24).
    #[arg(short = 's', long = "shape", value_name = "W:H")]
    shape: Option<String>,

    /// Restrict to source line range START:END (fractional ends allowed).
    #[arg(short = 'r', long = "range", value_name = "S:E")]
    range: Option<String>,

    /// Boost nodes whose text matches this pattern.
    #[arg(short = 'g', long = "grep", value_name = "PATTERN")]
    grep: Option<String>,

    /// Wrap lines wider than WIDTH instead of truncating them.
    #[arg(short = 'w', long = "wrap", value_name = "WIDTH")]
    wrap_width: Option<u32>,

    /// Enable the 3-gram intra-output dedup pass.
    #[arg(short = 'd', long = "dedup")]
    dedup: bool,

    /// Disable the `n:` line-number prefix on every output line.
    #[arg(short = 'p', long = "no-line-numbers", alias = "plain")]
    no_line_numbers: bool,

    /// Force a format instead of detecting by extension (python, markdown,
    /// mindmap, folder, text).
    #[arg(long = "type", value_name = "FMT")]
    format_type: Option<String>,

    /// Absolute character ceiling, combined with `--shape` via the smaller
    /// of the two (see `DESIGN.md`).
    #[arg(long = "limit", value_name = "N")]
    limit: Option<usize>,
}

fn parse_pair(raw: &str, sep: char) -> Result<(String, String), String> {
    let mut parts = raw.splitn(2, sep);
    let a = parts.next().ok_or_else(|| format!("expected A{sep}B, got {raw:?}"))?;
    let b = parts.next().ok_or_else(|| format!("expected A{sep}B, got {raw:?}"))?;
    Ok((a.to_string(), b.to_string()))
}

fn parse_shape(raw: &str) -> Result<CharBudget, String> {
    let (w, h) = parse_pair(raw, ':')?;
    let width: u32 = w.parse().map_err(|_| format!("bad width in shape {raw:?}"))?;
    let height: u32 = h.parse().map_err(|_| format!("bad height in shape {raw:?}"))?;
    Ok(CharBudget::new(width, height))
}

fn parse_range(raw: &str) -> Result<(f64, f64), String> {
    let (s, e) = parse_pair(raw, ':')?;
    let start: f64 = s.parse().map_err(|_| format!("bad range start in {raw:?}"))?;
    let end: f64 = e.parse().map_err(|_| format!("bad range end in {raw:?}"))?;
    Ok((start, end))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive("nub=warn".parse().unwrap()))
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let budget = match cli.shape.as_deref().map(parse_shape).transpose() {
        Ok(shape) => shape.unwrap_or(CharBudget::new(80, 24)),
        Err(msg) => {
            eprintln!("bad arguments: {msg}");
            std::process::exit(2);
        }
    };

    let range = match cli.range.as_deref().map(parse_range).transpose() {
        Ok(r) => r,
        Err(msg) => {
            eprintln!("bad arguments: {msg}");
            std::process::exit(2);
        }
    };

    let grep_pattern = match cli.grep.as_deref().map(Regex::new).transpose() {
        Ok(p) => p,
        Err(err) => {
            eprintln!("bad arguments: invalid --grep pattern: {err}");
            std::process::exit(2);
        }
    };

    let mut options = Options::default();
    options.grep_pattern = grep_pattern;
    options.wrap_width = cli.wrap_width;
    options.deduplicate = cli.dedup;
    options.line_numbers = !cli.no_line_numbers;
    options.limit = cli.limit;
    options.range = range;

    if let Err(err) = options.validate() {
        eprintln!("bad arguments: {err}");
        std::process::exit(2);
    }

    if let Some(path) = &cli.path {
        if path.is_dir() {
            let fmt = FolderFormat::new(options.weights);
            let entries = match walk::walk_tree(path) {
                Ok(e) => e,
                Err(err) => {
                    eprintln!("parse error: could not walk {}: {err}", path.display());
                    std::process::exit(1);
                }
            };
            let root_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| ".".to_string());
            let tree = fmt.build(&root_name, entries);
            match nub_core::compress(&fmt, &tree, budget, &options) {
                Ok(lines) => print_lines(&lines),
                Err(err) => {
                    eprintln!("parse error: {err}");
                    std::process::exit(1);
                }
            }
            return;
        }
    }

    let source = match &cli.path {
        Some(path) => match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                eprintln!("parse error: could not read {}: {err}", path.display());
                std::process::exit(1);
            }
        },
        None => {
            let mut buf = Vec::new();
            if let Err(err) = std::io::stdin().read_to_end(&mut buf) {
                eprintln!("parse error: could not read stdin: {err}");
                std::process::exit(1);
            }
            buf
        }
    };

    let fmt = match &cli.format_type {
        Some(name) => match detect::by_name(name, options.weights) {
            Some(fmt) => fmt,
            None => {
                eprintln!("bad arguments: unknown --type {name:?}");
                std::process::exit(2);
            }
        },
        None => match &cli.path {
            Some(path) => detect::by_extension(path, options.weights),
            None => Box::new(nub_core::TextFormat::new(options.weights)),
        },
    };

    match nub_core::compress_source(fmt.as_ref(), &source, budget, &options) {
        Ok(lines) => print_lines(&lines),
        Err(err) => {
            eprintln!("parse error: {err}");
            std::process::exit(1);
        }
    }
}

fn print_lines(lines: &[nub_core::OutputLine]) {
    let joined = lines.iter().map(|l| l.text.as_str()).collect::<Vec<_>>().join("\n");
    print!("{joined}");
}
