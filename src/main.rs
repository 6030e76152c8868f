use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;

use rusty_dataviz::{Session, DEFAULT_ROW_LIMIT};

/// Inspect and chart CSV, Excel and JSON tables.
#[derive(Parser)]
#[command(name = "rusty-dataviz", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print row/column counts, dtypes and column classification.
    Schema { file: PathBuf },
    /// Print descriptive statistics, missing counts and dtypes.
    Stats { file: PathBuf },
    /// Print the first rows as JSON records.
    Rows {
        file: PathBuf,
        #[arg(long, default_value_t = DEFAULT_ROW_LIMIT)]
        limit: usize,
    },
    /// Render a chart to a PNG file or print it as base64.
    Chart {
        file: PathBuf,
        /// histogram, scatter, bar or correlation
        #[arg(long)]
        kind: String,
        /// Primary column
        #[arg(long)]
        x: Option<String>,
        /// Secondary column (scatter)
        #[arg(long)]
        y: Option<String>,
        #[arg(long, conflicts_with = "base64")]
        out: Option<PathBuf>,
        #[arg(long)]
        base64: bool,
    },
}

impl Command {
    fn file(&self) -> &Path {
        match self {
            Command::Schema { file }
            | Command::Stats { file }
            | Command::Rows { file, .. }
            | Command::Chart { file, .. } => file,
        }
    }
}

fn open(session: &Session, path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .with_context(|| format!("{} has no file extension", path.display()))?;
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    session
        .load(&bytes, extension)
        .with_context(|| format!("loading {}", path.display()))?;
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let session = Session::new();
    open(&session, cli.command.file())?;

    match &cli.command {
        Command::Schema { .. } => print_json(&session.schema()?),
        Command::Stats { .. } => print_json(&session.stats()?),
        Command::Rows { limit, .. } => print_json(&session.rows(*limit)?),
        Command::Chart {
            kind,
            x,
            y,
            out,
            base64,
            ..
        } => {
            let image = session
                .render_chart(kind, x.as_deref(), y.as_deref())
                .context("rendering chart")?;
            if *base64 {
                println!("{}", image.to_base64());
            } else if let Some(out) = out {
                fs::write(out, &image.png)
                    .with_context(|| format!("writing {}", out.display()))?;
                info!("Wrote {}x{} chart to {}", image.width, image.height, out.display());
            } else {
                bail!("pass --out <file.png> or --base64");
            }
            Ok(())
        }
    }
}
