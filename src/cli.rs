//! CLI module - Command-line interface definitions and handlers

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use ctcache::core::model::{CacheIssue, Kind, Meta, ResultItem, ResultSet};
use ctcache::core::render::{OutputFormat, RenderConfig, Renderer};
use ctcache::{collect_status, CacheConfig, Digest, FsCache, Pruner, CACHE_DIR_ENV};

/// Default retention window for `prune`
pub const DEFAULT_RETENTION_WEEKS: u32 = 4;

/// ctcache - a two-tier disk cache for static-analysis results.
#[derive(Parser, Debug)]
#[command(name = "ctcache")]
#[command(
    author,
    version,
    about,
    long_about = r#"ctcache stores analysis output keyed by a hex digest.

Saves land in a sharded tree of raw files (ROOT/ab/cd/ef...). Lookups consult
the consolidated index (ROOT/entries.json) first and fall back to the sharded
tree. `prune` folds loose files into the index and evicts stale entries.

Output formats:
- jsonl: one JSON object per line (default)
- json: a single JSON array
- md: human-friendly Markdown
- raw: content only (find writes the cached bytes verbatim)

Examples:
    ctcache save 3f2a9c01 report.txt
    ctcache find 3f2a9c01 --format raw
    ctcache prune --weeks 2
    ctcache status
"#
)]
pub struct Cli {
    /// Cache root directory.
    #[arg(
        long,
        global = true,
        env = CACHE_DIR_ENV,
        value_name = "DIR",
        long_help = "Cache root directory holding entries.json and the sharded tree.\n\n\
Defaults to ~/.ctcache/cache. Can also be set with CLANG_TIDY_CACHE_DIR."
    )]
    pub cache_dir: Option<PathBuf>,

    /// Output format (jsonl/json/md/raw).
    #[arg(long, global = true, default_value = "jsonl", value_name = "FORMAT")]
    pub format: String,

    /// Disable colored output (when applicable).
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(
        short,
        long,
        global = true,
        long_help = "Suppress human-readable summaries and all log output below error level.\n\
Machine-readable results are still printed to stdout."
    )]
    pub quiet: bool,

    /// Verbose mode (more diagnostics).
    #[arg(
        short,
        long,
        global = true,
        long_help = "Log informational events to stderr. RUST_LOG overrides both -q and -v."
    )]
    pub verbose: bool,

    /// Pretty-print JSON/JSONL output with indentation.
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Look up a digest in the cache.
    #[command(
        long_about = "Look up DIGEST in the index, then in the sharded tree.\n\n\
A hit refreshes the entry's last-used time, which rewrites entries.json. A hit in\n\
the sharded tree also moves the entry into the index.\n\n\
Examples:\n\
  ctcache find 3f2a9c01\n\
  ctcache find 3f2a9c01 --format raw > out.txt\n"
    )]
    Find {
        /// Hex-encoded digest (at least 5 hex characters).
        #[arg(value_name = "DIGEST")]
        digest: String,
    },

    /// Store content under a digest.
    #[command(
        long_about = "Write FILE (or stdin) into the sharded tree under DIGEST.\n\n\
The index is not touched; run prune to consolidate.\n\n\
Examples:\n\
  ctcache save 3f2a9c01 report.txt\n\
  clang-tidy main.cpp | ctcache save 3f2a9c01\n"
    )]
    Save {
        /// Hex-encoded digest (at least 5 hex characters).
        #[arg(value_name = "DIGEST")]
        digest: String,

        /// File to store. Reads stdin when omitted.
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Consolidate loose files and evict stale entries.
    #[command(
        long_about = "Move every loose file into entries.json, delete the sharded tree, and drop\n\
entries not used within the retention window.\n\n\
Example:\n\
  ctcache prune --weeks 2\n"
    )]
    Prune {
        /// Retention window in whole weeks.
        #[arg(long, default_value_t = DEFAULT_RETENTION_WEEKS, value_name = "N")]
        weeks: u32,
    },

    /// Show entry counts without modifying the cache.
    Status,
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    let format: OutputFormat = cli.format.parse().unwrap_or_default();
    let render_config = RenderConfig::with_pretty(format, cli.pretty);
    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = CacheConfig::new(cli.cache_dir);
    let cache = FsCache::from_config(&config).context("Failed to resolve cache directory")?;

    match cli.command {
        Commands::Find { digest } => run_find(&cache, &digest, render_config),
        Commands::Save { digest, file } => {
            run_save(&cache, &digest, file.as_deref(), render_config)
        }
        Commands::Prune { weeks } => run_prune(&cache, weeks, cli.quiet, render_config),
        Commands::Status => run_status(&cache, render_config),
    }
}

fn parse_digest(input: &str) -> Result<Digest> {
    input
        .parse::<Digest>()
        .with_context(|| format!("Invalid digest: {}", input))
}

fn emit(result_set: &ResultSet, render_config: RenderConfig) -> Result<()> {
    let renderer = Renderer::with_config(render_config);
    let stdout = std::io::stdout();
    renderer
        .render_to(result_set, stdout.lock())
        .context("Failed to write output")
}

fn run_find(cache: &FsCache, digest: &str, render_config: RenderConfig) -> Result<()> {
    let digest = parse_digest(digest)?;
    let hit = cache
        .lookup(&digest)
        .with_context(|| format!("Failed to look up {}", digest))?;

    // Raw mode hands back the exact cached bytes.
    if render_config.format == OutputFormat::Raw {
        if let Some(hit) = &hit {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(&hit.content)
                .and_then(|()| stdout.flush())
                .context("Failed to write output")?;
        }
        return Ok(());
    }

    let item = match hit {
        Some(hit) => ResultItem::entry(digest.to_hex(), &hit.content, hit.tier),
        None => ResultItem::miss(digest.to_hex()),
    };
    emit(&ResultSet::from_iter([item]), render_config)
}

fn run_save(
    cache: &FsCache,
    digest: &str,
    file: Option<&Path>,
    render_config: RenderConfig,
) -> Result<()> {
    let digest = parse_digest(digest)?;
    let content = match file {
        Some(path) => std::fs::read(path)
            .with_context(|| format!("Failed to read input file: {:?}", path))?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    cache
        .save(&digest, &content)
        .with_context(|| format!("Failed to save {}", digest))?;

    emit(
        &ResultSet::from_iter([ResultItem::saved(digest.to_hex(), content.len() as u64)]),
        render_config,
    )
}

fn run_prune(cache: &FsCache, weeks: u32, quiet: bool, render_config: RenderConfig) -> Result<()> {
    let report = Pruner::for_cache(cache)
        .prune(weeks)
        .with_context(|| format!("Failed to prune cache in {:?}", cache.root()))?;

    let lines = report.summary_lines();
    if !quiet {
        eprintln!("{}", lines[0]);
        if report.removed == 0 {
            eprintln!("{}", lines[1].green());
        } else {
            eprintln!("{}", lines[1].yellow());
        }
    }

    let data = serde_json::to_value(&report)?;
    let mut item = ResultItem::report(Kind::Prune, lines.join("\n"), data);
    if report.skipped > 0 {
        item = item.with_error(CacheIssue::new(
            "SKIPPED_FILES",
            format!(
                "{} file(s) under the cache root could not be migrated",
                report.skipped
            ),
        ));
    }
    emit(&ResultSet::from_iter([item]), render_config)
}

fn run_status(cache: &FsCache, render_config: RenderConfig) -> Result<()> {
    let status = collect_status(cache)
        .with_context(|| format!("Failed to inspect cache in {:?}", cache.root()))?;

    let data = serde_json::to_value(&status)?;
    let item = ResultItem::report(Kind::Status, status.summary(), data).with_meta(Meta {
        last_used: status.newest_last_used,
        ..Meta::default()
    });
    emit(&ResultSet::from_iter([item]), render_config)
}
