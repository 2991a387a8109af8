use anyhow::Result;
use timbre_core::Track;

use super::load_catalog;
use super::table;
use crate::config::Config;

/// Rows shown by the browsing commands when `--limit` is absent.
pub const DEFAULT_LIMIT: usize = 20;

/// List tracks in catalog order.
pub fn show_songs(config: &Config, limit: usize) -> Result<()> {
    let catalog = load_catalog(config)?;
    let tracks: Vec<&Track> = catalog.tracks().iter().collect();
    print!("{}", render_tracks(&tracks, limit));
    Ok(())
}

/// List the tracks of one genre.
pub fn show_genre(config: &Config, genre: &str, limit: usize) -> Result<()> {
    let catalog = load_catalog(config)?;
    let tracks: Vec<&Track> = catalog.by_genre(genre).collect();

    if tracks.is_empty() {
        println!("No tracks with genre \"{genre}\".");
        print_suggestion(genre, catalog.genres());
    } else {
        println!("Genre: {genre}\n");
        print!("{}", render_tracks(&tracks, limit));
    }
    Ok(())
}

/// List the tracks of one artist.
pub fn show_artist(config: &Config, artist: &str, limit: usize) -> Result<()> {
    let catalog = load_catalog(config)?;
    let tracks: Vec<&Track> = catalog.by_artist(artist).collect();

    if tracks.is_empty() {
        println!("No tracks by \"{artist}\".");
        print_suggestion(artist, catalog.artists());
    } else {
        println!("Artist: {artist}\n");
        print!("{}", render_tracks(&tracks, limit));
    }
    Ok(())
}

/// List every genre in the catalog with its track count.
pub fn list_genres(config: &Config) -> Result<()> {
    let catalog = load_catalog(config)?;
    let rows: Vec<Vec<String>> = catalog
        .genres()
        .into_iter()
        .map(|genre| vec![genre.to_string(), catalog.by_genre(genre).count().to_string()])
        .collect();
    print!("{}", table::render(&["Genre", "Tracks"], &rows));
    Ok(())
}

/// List every artist in the catalog with their track count.
pub fn list_artists(config: &Config) -> Result<()> {
    let catalog = load_catalog(config)?;
    let rows: Vec<Vec<String>> = catalog
        .artists()
        .into_iter()
        .map(|artist| vec![artist.to_string(), catalog.by_artist(artist).count().to_string()])
        .collect();
    print!("{}", table::render(&["Artist", "Tracks"], &rows));
    Ok(())
}

fn print_suggestion(query: &str, candidates: Vec<&str>) {
    if let Some(result) = timbre_search::resolve(query, candidates) {
        println!("Did you mean \"{}\"?", result.matched_name);
    }
}

/// Render at most `limit` tracks, noting how many were left out.
pub fn render_tracks(tracks: &[&Track], limit: usize) -> String {
    let rows: Vec<Vec<String>> = tracks
        .iter()
        .take(limit)
        .map(|t| {
            vec![
                t.name.clone(),
                t.artist.clone(),
                t.genre.clone(),
                format!("{:.2}", t.features.energy),
                format!("{:.2}", t.features.danceability),
                format!("{:.2}", t.features.valence),
            ]
        })
        .collect();

    let table = table::render(
        &["Track", "Artist", "Genre", "Energy", "Dance", "Valence"],
        &rows,
    );
    if tracks.len() > rows.len() {
        format!(
            "{table}\nShowing {} of {} tracks (use --limit to see more)\n",
            rows.len(),
            tracks.len()
        )
    } else {
        table
    }
}
