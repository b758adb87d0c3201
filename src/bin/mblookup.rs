//! Command-line catalog lookup.
//!
//! Results go to stdout; tracing output goes to stderr.

use std::path::PathBuf;

use clap::Parser;
use mblookup::query::{EntityKind, QueryClient};
use mblookup::{LookupConfig, LookupError};
use tracing_subscriber::EnvFilter;

/// Look up artists, releases, recordings or labels in the music catalog.
#[derive(Debug, Parser)]
#[command(name = "mblookup", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Entity to search: artist, release, recording or label.
    #[arg(value_parser = parse_kind)]
    kind: EntityKind,

    /// Search terms, joined with spaces.
    #[arg(required = true, num_args = 1..)]
    terms: Vec<String>,
}

impl Cli {
    /// The search terms as one query string.
    fn query(&self) -> Result<String, LookupError> {
        let terms = self.terms.join(" ");
        if terms.trim().is_empty() {
            return Err(LookupError::Usage("no search terms".into()));
        }
        Ok(terms)
    }
}

fn parse_kind(value: &str) -> Result<EntityKind, String> {
    EntityKind::from_url_extension(value).ok_or_else(|| {
        let known: Vec<&str> = EntityKind::all().iter().map(|k| k.url_extension()).collect();
        format!("unknown entity {value:?} (use {})", known.join("|"))
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mblookup=info,mblookup_query=info")),
        )
        .init();

    let cli = Cli::parse();
    let terms = cli.query()?;

    let config = match cli.config {
        Some(ref path) => LookupConfig::from_file(path)?,
        None => LookupConfig::load_or_default(&LookupConfig::default_config_path())?,
    };

    let client = QueryClient::new(config.query.clone())?;
    let report = mblookup::lookup(&client, cli.kind, &terms, &config.output)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "lookup failed");
            anyhow::anyhow!("lookup failed: {e}")
        })?;

    print!("{report}");
    Ok(())
}
