//! Fuzzy track-name resolution.
//!
//! Free-text queries are matched against candidate names with a weighted
//! string-similarity score on a 0–100 scale. Both strings are lower-cased
//! and every run of non-alphanumeric characters becomes a single space
//! before scoring. The score is the best of:
//!
//! - the plain ratio of the two strings,
//! - token-sort and token-set ratios (scaled by 0.95), which ignore word
//!   order and repeated words,
//! - partial ratios (scaled by 0.9, or 0.6 when one string is more than
//!   eight times longer), used only when the lengths differ by 1.5× or
//!   more, which reward a short query contained in a long name.
//!
//! Ratios are normalised Levenshtein similarities.

use std::collections::BTreeSet;

use serde::Serialize;
use strsim::normalized_levenshtein;

/// Scores at or above this are treated as a confident match.
pub const DEFAULT_CONFIDENCE_THRESHOLD: u8 = 70;

const TOKEN_SCALE: f64 = 0.95;
const PARTIAL_SCALE: f64 = 0.9;
const LONG_PARTIAL_SCALE: f64 = 0.6;
const PARTIAL_LENGTH_RATIO: f64 = 1.5;
const LONG_LENGTH_RATIO: f64 = 8.0;

/// The best candidate for a query and how confident the match is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub matched_name: String,
    /// 0–100; 100 means the names are equal after normalisation.
    pub confidence: u8,
}

/// Find the candidate that best matches `query`.
///
/// Ties go to the earliest candidate. Returns `None` only when there are
/// no candidates; a poor match is still returned with its low score and
/// the caller decides whether it is good enough.
pub fn resolve<I, S>(query: &str, candidates: I) -> Option<MatchResult>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let candidates: Vec<S> = candidates.into_iter().collect();
    best_match(query, candidates.iter().map(|c| c.as_ref())).map(|(position, confidence)| {
        MatchResult {
            matched_name: candidates[position].as_ref().to_string(),
            confidence,
        }
    })
}

/// Position and score of the best candidate; ties go to the earliest.
///
/// A candidate spelled exactly like the query wins outright, even when an
/// earlier one differs only in case or punctuation.
pub(crate) fn best_match<'a>(
    query: &str,
    candidates: impl IntoIterator<Item = &'a str>,
) -> Option<(usize, u8)> {
    let candidates: Vec<&str> = candidates.into_iter().collect();
    if let Some(position) = candidates.iter().position(|&c| c == query) {
        return Some((position, 100));
    }

    let query = normalize(query);
    let mut best: Option<(usize, u8)> = None;

    for (position, candidate) in candidates.into_iter().enumerate() {
        let score = normalized_score(&query, &normalize(candidate));
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((position, score));
            if score == 100 {
                break;
            }
        }
    }

    best
}

/// Similarity of two strings on a 0–100 scale.
pub fn score(a: &str, b: &str) -> u8 {
    normalized_score(&normalize(a), &normalize(b))
}

// Bounded to 0..=100 by the clamp.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn normalized_score(a: &str, b: &str) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let base = ratio(a, b);
    let (len_a, len_b) = (a.chars().count() as f64, b.chars().count() as f64);
    let length_ratio = len_a.max(len_b) / len_a.min(len_b);

    let best = if length_ratio < PARTIAL_LENGTH_RATIO {
        base.max(ratio(&token_sort(a), &token_sort(b)) * TOKEN_SCALE)
            .max(token_set_ratio(a, b) * TOKEN_SCALE)
    } else {
        let partial_scale = if length_ratio > LONG_LENGTH_RATIO {
            LONG_PARTIAL_SCALE
        } else {
            PARTIAL_SCALE
        };
        base.max(partial_ratio(a, b) * partial_scale)
            .max(partial_ratio(&token_sort(a), &token_sort(b)) * TOKEN_SCALE * partial_scale)
    };

    (best * 100.0).round().clamp(0.0, 100.0) as u8
}

fn normalize(s: &str) -> String {
    s.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn ratio(a: &str, b: &str) -> f64 {
    normalized_levenshtein(a, b)
}

fn token_sort(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn token_set_ratio(a: &str, b: &str) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    let join = |tokens: Vec<&str>| tokens.join(" ");
    let common = join(tokens_a.intersection(&tokens_b).copied().collect());
    let only_a = join(tokens_a.difference(&tokens_b).copied().collect());
    let only_b = join(tokens_b.difference(&tokens_a).copied().collect());

    let with_common = |rest: &str| {
        if common.is_empty() {
            rest.to_string()
        } else if rest.is_empty() {
            common.clone()
        } else {
            format!("{common} {rest}")
        }
    };
    let combined_a = with_common(&only_a);
    let combined_b = with_common(&only_b);

    ratio(&common, &combined_a)
        .max(ratio(&common, &combined_b))
        .max(ratio(&combined_a, &combined_b))
}

/// Best ratio of the shorter string against every same-length window of
/// the longer one.
fn partial_ratio(a: &str, b: &str) -> f64 {
    let (short, long) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    let long_chars: Vec<char> = long.chars().collect();
    let width = short.chars().count();
    if width == 0 {
        return 0.0;
    }

    let mut best: f64 = 0.0;
    for window in long_chars.windows(width) {
        let candidate: String = window.iter().collect();
        best = best.max(ratio(short, &candidate));
        if best >= 1.0 {
            break;
        }
    }
    best
}
