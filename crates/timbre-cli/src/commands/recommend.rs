use anyhow::{Context, Result};
use timbre_search::Recommendations;

use super::table;
use super::{load_catalog, load_recommender};
use crate::config::Config;

/// Recommend tracks similar to the one named by `query`.
pub fn run_recommend(config: &Config, query: &str, top_n: Option<usize>, json: bool) -> Result<()> {
    let recommender = load_recommender(config)?;
    let top_n = top_n.unwrap_or(config.default_top_n);

    let outcome = recommender
        .recommend(query, top_n)
        .context("Failed to compute recommendations")?;

    if json {
        let rendered =
            serde_json::to_string_pretty(&outcome).context("Failed to serialize recommendations")?;
        println!("{rendered}");
    } else {
        print!("{}", render(&outcome));
    }

    Ok(())
}

/// Show which track a query resolves to, without computing recommendations.
pub fn resolve_query(config: &Config, query: &str) -> Result<()> {
    let catalog = load_catalog(config)?;

    let Some(result) = timbre_search::resolve(query, catalog.all_names()) else {
        anyhow::bail!("The catalog has no tracks");
    };

    let verdict = if result.confidence >= config.confidence_threshold {
        "match"
    } else {
        "below threshold"
    };
    println!(
        "{} (confidence {}, {verdict} at {})",
        result.matched_name, result.confidence, config.confidence_threshold
    );

    Ok(())
}

/// Human-readable rendering of a recommendation outcome.
pub fn render(outcome: &Recommendations<'_>) -> String {
    match outcome {
        Recommendations::Resolved {
            matched_name,
            confidence,
            recommendations,
        } => {
            let rows: Vec<Vec<String>> = recommendations
                .iter()
                .enumerate()
                .map(|(i, r)| {
                    vec![
                        (i + 1).to_string(),
                        r.track.name.clone(),
                        r.track.artist.clone(),
                        r.track.genre.clone(),
                        format!("{:.3}", r.similarity),
                    ]
                })
                .collect();

            let mut out =
                format!("Songs similar to \"{matched_name}\" (match confidence {confidence})\n\n");
            if rows.is_empty() {
                out.push_str("No other tracks in the catalog.\n");
            } else {
                out.push_str(&table::render(
                    &["#", "Track", "Artist", "Genre", "Similarity"],
                    &rows,
                ));
            }
            out
        }
        Recommendations::Unresolved { best_guess } => format!(
            "Song not found confidently.\n\
             Closest match: \"{}\" (confidence {}). Try a different spelling.\n",
            best_guess.matched_name, best_guess.confidence
        ),
    }
}
