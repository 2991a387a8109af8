use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use timbre_search::SharedRecommender;

use super::load_recommender;
use super::recommend::render;
use crate::config::Config;

const HELP: &str = "\
Type a song name to get recommendations.
  :top <n>   change how many recommendations are shown
  :reload    reload the catalog from disk
  :help      show this message
  :quit      leave the shell
";

/// Interactive session over one loaded catalog.
///
/// The catalog is loaded once; `:reload` swaps in a fresh copy without
/// leaving the shell, and keeps the current one if loading fails.
pub fn run_shell(config: &Config) -> Result<()> {
    let shared = SharedRecommender::new(load_recommender(config)?);
    println!(
        "Loaded {} tracks from {}",
        shared.snapshot().catalog().len(),
        config.catalog_path.display()
    );
    print!("{HELP}");

    let stdin = io::stdin();
    let stdout = io::stdout();
    run_session(&shared, config, stdin.lock(), stdout.lock())
}

pub(crate) fn run_session(
    shared: &SharedRecommender,
    config: &Config,
    input: impl BufRead,
    mut output: impl Write,
) -> Result<()> {
    let mut top_n = config.default_top_n;

    prompt(&mut output)?;
    for line in input.lines() {
        let line = line.context("Failed to read input")?;
        let line = line.trim();

        match line.split_once(' ').map_or((line, ""), |(c, rest)| (c, rest.trim())) {
            ("", _) => {}
            (":quit" | ":q", _) => break,
            (":help", _) => write!(output, "{HELP}")?,
            (":top", arg) => match arg.parse::<usize>() {
                Ok(n) if n > 0 => {
                    top_n = n;
                    writeln!(output, "Showing {top_n} recommendations")?;
                }
                _ => writeln!(output, "Usage: :top <n>, with n at least 1")?,
            },
            (":reload", _) => {
                match shared.reload_from_path(&config.catalog_path, &config.load_options()) {
                    Ok(()) => writeln!(
                        output,
                        "Reloaded {} tracks",
                        shared.snapshot().catalog().len()
                    )?,
                    Err(e) => {
                        log::warn!("Reload failed: {e}");
                        writeln!(output, "Reload failed, keeping the current catalog: {e}")?;
                    }
                }
            }
            _ => {
                let recommender = shared.snapshot();
                match recommender.recommend(line, top_n) {
                    Ok(outcome) => write!(output, "{}", render(&outcome))?,
                    Err(e) => writeln!(output, "Error: {e}")?,
                }
            }
        }
        prompt(&mut output)?;
    }

    writeln!(output)?;
    Ok(())
}

fn prompt(output: &mut impl Write) -> Result<()> {
    write!(output, "> ")?;
    output.flush()?;
    Ok(())
}
