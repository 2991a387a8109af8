use anyhow::{Context, Result};
use timbre_core::Feature;
use toml_edit::{Array, DocumentMut, Item};

use crate::config::{self, Config};

/// Keys accepted by `config get` and `config set`.
pub const KEYS: [&str; 8] = [
    "catalog_path",
    "features",
    "confidence_threshold",
    "max_tracks",
    "default_top_n",
    "logging.level",
    "logging.coloured",
    "logging.output",
];

/// Show the current effective configuration.
pub fn show_config() -> Result<()> {
    let config = Config::load()?;

    println!("Current Configuration");
    println!("=====================\n");

    println!("Config file: {}", config::config_file_path().display());

    let exists = config::config_file_path().exists();
    println!(
        "File exists: {}\n",
        if exists { "yes" } else { "no (using defaults)" }
    );

    println!("Settings:");
    for key in KEYS {
        println!("  {key}: {}", config_value(&config, key)?);
    }

    println!("\nPriority: CLI args > ENV vars (TIMBRE_*) > Config file > Defaults");

    Ok(())
}

/// Get a specific config value.
pub fn get_config(key: Option<String>) -> Result<()> {
    if let Some(key) = key {
        let config = Config::load()?;
        println!("{}", config_value(&config, &key)?);
    } else {
        // No key provided, show entire config file contents
        let config_path = config::config_file_path();

        if config_path.exists() {
            let contents =
                std::fs::read_to_string(&config_path).context("Failed to read config file")?;
            print!("{contents}");
        } else {
            println!("Config file does not exist: {}", config_path.display());
            println!("\nRun 'timbre config init' to create it.");
        }
    }

    Ok(())
}

/// Set a config value, keeping the rest of the file (comments included)
/// as it was.
pub fn set_config(key: &str, value: &str) -> Result<()> {
    let config_path = config::config_file_path();
    config::ensure_config_file()?;

    let contents = std::fs::read_to_string(&config_path).context("Failed to read config file")?;
    let mut doc: DocumentMut = contents
        .parse()
        .context("Failed to parse config file")?;

    set_value(&mut doc, key, value)?;

    std::fs::write(&config_path, doc.to_string()).context("Failed to write config file")?;

    println!("✓ Updated {key} = {value}");
    println!("  in {}", config_path.display());

    Ok(())
}

/// Show the config file path.
pub fn show_path() -> Result<()> {
    println!("{}", config::config_file_path().display());
    Ok(())
}

/// Show example configuration.
pub fn show_example() -> Result<()> {
    print!("{}", config::example_config());
    Ok(())
}

/// Initialize config file with defaults.
pub fn init_config() -> Result<()> {
    let created = config::ensure_config_file()?;
    let config_path = config::config_file_path();

    if created {
        println!("✓ Created config file: {}", config_path.display());
        println!("\nEdit this file to configure timbre.");
    } else {
        println!("Config file already exists: {}", config_path.display());
    }

    Ok(())
}

fn config_value(config: &Config, key: &str) -> Result<String> {
    Ok(match key {
        "catalog_path" => config.catalog_path.display().to_string(),
        "features" => config
            .features
            .iter()
            .map(Feature::to_string)
            .collect::<Vec<_>>()
            .join(", "),
        "confidence_threshold" => config.confidence_threshold.to_string(),
        "max_tracks" => config.max_tracks.to_string(),
        "default_top_n" => config.default_top_n.to_string(),
        "logging.level" => format!("{:?}", config.logging.level()),
        "logging.coloured" => config.logging.coloured().to_string(),
        "logging.output" => format!("{:?}", config.logging.output()),
        _ => anyhow::bail!(unknown_key(key)),
    })
}

/// Write `raw` under `key` in `doc`, creating the `[logging]` table when
/// needed.
fn set_value(doc: &mut DocumentMut, key: &str, raw: &str) -> Result<()> {
    let item = parse_value(key, raw)?;

    match key.split_once('.') {
        Some((table, field)) => {
            let table = doc
                .entry(table)
                .or_insert(toml_edit::table())
                .as_table_mut()
                .ok_or_else(|| anyhow::anyhow!("[{table}] in the config file is not a table"))?;
            table[field] = item;
        }
        None => doc[key] = item,
    }

    Ok(())
}

fn parse_value(key: &str, raw: &str) -> Result<Item> {
    let item = match key {
        "catalog_path" | "logging.level" | "logging.output" => toml_edit::value(raw),
        "features" => {
            let features = raw
                .split(',')
                .map(str::parse::<Feature>)
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(anyhow::Error::msg)?;
            if let Some(feature) = config::repeated_feature(&features) {
                anyhow::bail!("features lists {feature} more than once");
            }
            let mut array = Array::new();
            for feature in features {
                array.push(feature.column());
            }
            toml_edit::value(array)
        }
        "confidence_threshold" => {
            let threshold: u8 = raw
                .parse()
                .with_context(|| format!("Invalid confidence_threshold: {raw}"))?;
            if threshold > 100 {
                anyhow::bail!("confidence_threshold must be between 0 and 100 (got {threshold})");
            }
            toml_edit::value(i64::from(threshold))
        }
        "max_tracks" | "default_top_n" => {
            let n: u32 = raw
                .parse()
                .with_context(|| format!("Invalid {key}: {raw}"))?;
            if n == 0 {
                anyhow::bail!("{key} must be greater than zero");
            }
            toml_edit::value(i64::from(n))
        }
        "logging.coloured" => {
            let coloured: bool = raw
                .parse()
                .with_context(|| format!("Invalid logging.coloured: {raw} (expected true or false)"))?;
            toml_edit::value(coloured)
        }
        _ => anyhow::bail!(unknown_key(key)),
    };
    Ok(item)
}

fn unknown_key(key: &str) -> String {
    format!("Unknown config key: {key}\n\nValid keys: {}", KEYS.join(", "))
}
