use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use tracing::instrument;

use crate::{
    models::{Language, MediaKind, MovieRef},
    services::tmdb::TmdbApi,
};

fn bracket_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\[(.*?)\]").expect("bracket pattern is valid"))
}

/// Bracketed titles in first-seen order, trimmed, without blanks or
/// case-insensitive repeats
pub fn extract_titles(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    bracket_pattern()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|title| !title.is_empty())
        .filter(|title| seen.insert(title.to_lowercase()))
        .map(str::to_string)
        .collect()
}

/// Turns `[Movie Title]` markers in model output into movie cards
#[derive(Clone)]
pub struct TitleResolver {
    tmdb: Arc<dyn TmdbApi>,
    image_url: String,
}

impl TitleResolver {
    pub fn new(tmdb: Arc<dyn TmdbApi>, image_url: String) -> Self {
        Self { tmdb, image_url }
    }

    /// Resolves each bracketed title to the top TMDB multi-search hit.
    ///
    /// Output keeps first-seen order and holds each TMDB id once. Titles
    /// without a match, hits without a poster and people are dropped.
    #[instrument(skip_all)]
    pub async fn resolve(&self, text: &str, language: Language) -> Vec<MovieRef> {
        let titles = extract_titles(text);
        if titles.is_empty() {
            return Vec::new();
        }

        let mut seen_ids = HashSet::new();
        let mut movies = Vec::new();

        for title in &titles {
            let Some(top) = self.tmdb.search(title, None, language).await.into_iter().next() else {
                tracing::debug!(title = %title, "No TMDB match for bracketed title");
                continue;
            };

            let Some(movie) = MovieRef::from_tmdb(top, MediaKind::Movie, &self.image_url) else {
                continue;
            };

            if seen_ids.insert(movie.id) {
                movies.push(movie);
            }
        }

        tracing::info!(
            titles = titles.len(),
            resolved = movies.len(),
            "Resolved bracketed titles"
        );

        movies
    }
}
