//! ireal - decode and transpose iReal Pro chord charts
//!
//! Subcommands:
//! - `ireal show <input>` - Decode a link, text dump or file and print the charts
//!   as YAML, JSON or a re-encoded link
//! - `ireal unscramble <payload>` - Print the plaintext notation of a music payload
//! - `ireal keys` - List the keys charts can be transposed to
//! - `ireal scale <chord>` - Spell the first-choice scale for a chord

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ireal::metadata::{encode_playlist, parse_playlist, percent_decode, strip_scheme};
use ireal::{chord_scale, supported_keys, transpose_chart, unscramble, Playlist};
use std::fs;
use std::io::Read;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ireal")]
#[command(about = "Decode and transpose iReal Pro chord charts")]
#[command(version)]
struct Cli {
    /// Log more (-v info, -vv debug, -vvv trace). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode charts and print them
    Show {
        /// irealb:// link, file path, or - for stdin
        input: String,

        /// Transpose every chart to this key (see `ireal keys`)
        #[arg(short, long)]
        transpose: Option<String>,

        /// Output format
        #[arg(short, long, env = "IREAL_FORMAT", value_enum, default_value = "yaml")]
        format: Format,

        /// Only print the chart at this position in the playlist
        #[arg(short, long)]
        index: Option<usize>,
    },

    /// Print the plaintext notation of a (possibly scrambled) payload
    Unscramble {
        /// Music payload, optionally percent-encoded
        payload: String,
    },

    /// List supported keys
    Keys,

    /// Spell the first-choice scale for a chord symbol
    Scale {
        /// Chord symbol, e.g. C7, D-7, Bh7
        chord: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Yaml,
    Json,
    /// irealb:// link with scrambled payloads
    Link,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Show {
            input,
            transpose,
            format,
            index,
        } => show(&input, transpose.as_deref(), format, index),
        Commands::Unscramble { payload } => {
            let decoded = percent_decode(payload.trim());
            println!("{}", unscramble(strip_scheme(&decoded)));
            Ok(())
        }
        Commands::Keys => {
            for key in supported_keys() {
                println!("{}", key);
            }
            Ok(())
        }
        Commands::Scale { chord } => scale(&chord),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read chart from stdin")?;
        return Ok(text);
    }
    if input.starts_with("irealb://") || input.starts_with("irealbook://") {
        return Ok(input.to_string());
    }
    fs::read_to_string(input).with_context(|| format!("Failed to read '{}'", input))
}

fn show(input: &str, transpose: Option<&str>, format: Format, index: Option<usize>) -> Result<()> {
    let text = read_input(input)?;
    let mut playlist = parse_playlist(&text).context("Failed to decode input")?;
    info!(charts = playlist.charts.len(), "decoded playlist");

    if let Some(key) = transpose {
        playlist.charts = playlist
            .charts
            .iter()
            .map(|chart| transpose_chart(chart, key).into_result())
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Cannot transpose to '{}'", key))?;
        debug!(key, "transposed charts");
    }

    let output = match (index, format) {
        (Some(i), Format::Link) => {
            let single = Playlist {
                name: None,
                charts: vec![playlist.chart(i)?.clone()],
            };
            format!("{}\n", encode_playlist(&single))
        }
        (None, Format::Link) => format!("{}\n", encode_playlist(&playlist)),
        (Some(i), _) => render(playlist.chart(i)?, format)?,
        (None, _) => render(&playlist, format)?,
    };
    print!("{}", output);
    Ok(())
}

fn render<T: serde::Serialize>(value: &T, format: Format) -> Result<String> {
    match format {
        Format::Yaml => serde_yaml::to_string(value).context("Failed to write YAML"),
        Format::Json | Format::Link => {
            let mut json = serde_json::to_string_pretty(value).context("Failed to write JSON")?;
            json.push('\n');
            Ok(json)
        }
    }
}

fn scale(chord: &str) -> Result<()> {
    let Some(scale) = chord_scale(chord) else {
        bail!("'{}' has no root note", chord);
    };
    let notes: Vec<String> = scale.tones.iter().map(|t| t.note.to_string()).collect();
    let degrees: Vec<&str> = scale.tones.iter().map(|t| t.degree.as_str()).collect();
    println!("{}: {}", chord, scale.scale);
    println!("  {}", notes.join(" "));
    println!("  {}", degrees.join(" "));
    Ok(())
}
