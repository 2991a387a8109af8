use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

mod commands;
mod config;

use commands::browse::DEFAULT_LIMIT;
use config::Config;

#[derive(Debug, Parser)]
#[command(name = "timbre", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the track catalog, CSV or JSON (default: ~/.local/share/timbre/tracks.csv)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Recommend songs that sound like the one you name
    ///
    /// The query is matched against the catalog's track names, so small typos,
    /// different capitalisation and reordered words are tolerated. When no
    /// track matches with enough confidence (see `confidence_threshold`), the
    /// closest candidate is shown instead of recommendations.
    ///
    /// Similarity is the cosine similarity of the tracks' standardised audio
    /// features (energy, danceability and valence by default). The named
    /// track itself is never recommended.
    Recommend {
        /// Song name to search for
        query: String,

        /// Number of recommendations (default: `default_top_n` from config)
        #[arg(short = 'n', long)]
        top_n: Option<usize>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show which track a query resolves to and how confidently
    Resolve {
        /// Song name to search for
        query: String,
    },
    /// List the tracks in the catalog
    Songs {
        /// Maximum number of tracks to show
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,
    },
    /// List the genres in the catalog
    Genres,
    /// List the tracks of a genre
    Genre {
        /// Genre name, exactly as listed by `timbre genres`
        genre: String,

        /// Maximum number of tracks to show
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,
    },
    /// List the artists in the catalog
    Artists,
    /// List the tracks of an artist
    Artist {
        /// Artist name, exactly as listed by `timbre artists`
        artist: String,

        /// Maximum number of tracks to show
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,
    },
    /// Start an interactive session over the loaded catalog
    Shell,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Print one value, or the whole config file when no key is given
    Get {
        /// Config key, e.g. `confidence_threshold`
        key: Option<String>,
    },
    /// Set a value in the config file
    Set {
        /// Config key, e.g. `confidence_threshold`
        key: String,
        /// New value
        value: String,
    },
    /// Print the config file path
    Path,
    /// Print an example config file
    Example,
    /// Create the config file if it does not exist
    Init,
}

/// Load configuration, apply CLI overrides and start logging.
fn load_config(catalog: Option<PathBuf>) -> Result<Config> {
    let mut config = Config::load()?;
    if let Some(path) = catalog {
        config = config.with_catalog_path(path);
    }

    if let Err(e) = twyg::setup(config.logging.clone()) {
        eprintln!("Warning: failed to initialise logging: {e}");
    }
    log::debug!("Using catalog {}", config.catalog_path.display());

    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let catalog = cli.catalog;
    let config = || load_config(catalog.clone());

    match cli.command {
        Commands::Recommend { query, top_n, json } => {
            commands::run_recommend(&config()?, &query, top_n, json)?;
        }
        Commands::Resolve { query } => {
            commands::resolve_query(&config()?, &query)?;
        }
        Commands::Songs { limit } => {
            commands::show_songs(&config()?, limit)?;
        }
        Commands::Genres => {
            commands::list_genres(&config()?)?;
        }
        Commands::Genre { genre, limit } => {
            commands::show_genre(&config()?, &genre, limit)?;
        }
        Commands::Artists => {
            commands::list_artists(&config()?)?;
        }
        Commands::Artist { artist, limit } => {
            commands::show_artist(&config()?, &artist, limit)?;
        }
        Commands::Shell => {
            commands::run_shell(&config()?)?;
        }
        Commands::Config { action } => match action {
            ConfigCommands::Show => commands::config::show_config()?,
            ConfigCommands::Get { key } => commands::config::get_config(key)?,
            ConfigCommands::Set { key, value } => commands::config::set_config(&key, &value)?,
            ConfigCommands::Path => commands::config::show_path()?,
            ConfigCommands::Example => commands::config::show_example()?,
            ConfigCommands::Init => commands::config::init_config()?,
        },
    }

    Ok(())
}
