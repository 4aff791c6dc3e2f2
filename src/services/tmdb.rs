/// TMDB v3 access
///
/// Every public operation degrades to an empty result on failure: a missing
/// key, a non-2xx status, a timeout or an undecodable body is logged and
/// swallowed. Browse listings are memoized in the process-wide cache.
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;

use crate::{
    cache::{Cache, CacheKey},
    cached,
    config::Config,
    error::{AppError, AppResult},
    models::{
        Language, MediaKind, TmdbItem, TmdbPage, TmdbVideos, TmdbWatchProviders, WatchProvider,
    },
};

const CONTENT_CACHE_TTL: u64 = 3600; // 1 hour
const DETAILS_TIMEOUT: Duration = Duration::from_secs(5);

const MOVIE_CATEGORIES: &[&str] = &["popular", "top_rated", "now_playing", "upcoming"];
const TV_CATEGORIES: &[&str] = &["popular", "top_rated", "on_the_air", "airing_today"];

/// Browse request: a category listing, or a discover query when `region`
/// names a known region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentQuery {
    pub kind: MediaKind,
    pub category: String,
    pub region: Option<String>,
    pub language: Language,
}

impl ContentQuery {
    /// Category restricted to the ones TMDB serves for this kind; anything
    /// else falls back to `popular`.
    pub fn normalized_category(&self) -> &'static str {
        let allowed = match self.kind {
            MediaKind::Movie => MOVIE_CATEGORIES,
            MediaKind::Tv => TV_CATEGORIES,
        };
        allowed
            .iter()
            .find(|c| **c == self.category.trim())
            .copied()
            .unwrap_or("popular")
    }

    /// Region filter as (original language, optional genre)
    pub fn region_filter(&self) -> Option<(&'static str, Option<&'static str>)> {
        let filter = match self.region.as_deref()?.trim().to_lowercase().as_str() {
            "korea" => ("ko", None),
            "india" => ("hi", None),
            "arabic" => ("ar", None),
            "turkey" => ("tr", None),
            "spain" => ("es", None),
            // Japanese animation
            "japan" => ("ja", Some("16")),
            _ => return None,
        };
        Some(filter)
    }

    fn cache_key(&self) -> CacheKey {
        CacheKey::Content {
            kind: self.kind,
            category: self.normalized_category().to_string(),
            region: self
                .region_filter()
                .and(self.region.as_ref())
                .map(|r| r.trim().to_lowercase()),
            language: self.language,
        }
    }
}

/// Trait for TMDB lookups used by the handlers and the title resolver
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TmdbApi: Send + Sync {
    /// Category or region listing
    async fn fetch_content(&self, query: &ContentQuery) -> Vec<TmdbItem>;

    /// Typed search, or multi-search when `kind` is `None`
    async fn search(&self, query: &str, kind: Option<MediaKind>, language: Language)
        -> Vec<TmdbItem>;

    /// YouTube key of the first trailer
    async fn trailer(&self, id: u64, kind: MediaKind) -> Option<String>;

    /// Subscription (else rent, else buy) offers in the configured region
    async fn watch_providers(&self, id: u64, kind: MediaKind) -> Vec<WatchProvider>;
}

#[derive(Clone)]
pub struct TmdbClient {
    http_client: HttpClient,
    api_key: Option<String>,
    base_url: String,
    request_timeout: Duration,
    watch_region: String,
    cache: Cache,
}

impl TmdbClient {
    pub fn new(http_client: HttpClient, config: &Config, cache: Cache) -> Self {
        if config.tmdb_api_key.is_none() {
            tracing::warn!("TMDB_API_KEY is not set; movie lookups will return no results");
        }

        Self {
            http_client,
            api_key: config.tmdb_api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(config.request_timeout),
            watch_region: config.watch_region.clone(),
            cache,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
        timeout: Duration,
    ) -> AppResult<T> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::ExternalApi("TMDB_API_KEY is not configured".to_string()))?;

        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", api_key)])
            .query(params)
            .timeout(timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB returned status {} for {}: {}",
                status, path, body
            )));
        }

        Ok(response.json().await?)
    }

    async fn try_fetch_content(&self, query: &ContentQuery) -> AppResult<Vec<TmdbItem>> {
        cached!(self.cache, query.cache_key(), CONTENT_CACHE_TTL, async move {
            let language = query.language.tmdb_locale();
            let page: TmdbPage = match query.region_filter() {
                Some((original_language, genres)) => {
                    let mut params = vec![
                        ("language", language),
                        ("sort_by", "popularity.desc"),
                        ("with_original_language", original_language),
                    ];
                    if let Some(genres) = genres {
                        params.push(("with_genres", genres));
                    }
                    let path = format!("/discover/{}", query.kind.as_path());
                    self.get_json(&path, &params, self.request_timeout).await?
                }
                None => {
                    let path = format!(
                        "/{}/{}",
                        query.kind.as_path(),
                        query.normalized_category()
                    );
                    self.get_json(&path, &[("language", language)], self.request_timeout)
                        .await?
                }
            };

            tracing::info!(
                kind = %query.kind,
                category = query.normalized_category(),
                region = ?query.region,
                results = page.results.len(),
                "TMDB content fetched"
            );

            Ok::<_, AppError>(page.results)
        })
    }

    async fn try_search(
        &self,
        query: &str,
        kind: Option<MediaKind>,
        language: Language,
    ) -> AppResult<Vec<TmdbItem>> {
        let path = match kind {
            Some(kind) => format!("/search/{}", kind.as_path()),
            None => "/search/multi".to_string(),
        };
        let page: TmdbPage = self
            .get_json(
                &path,
                &[("query", query), ("language", language.tmdb_locale())],
                self.request_timeout,
            )
            .await?;

        tracing::debug!(query = %query, results = page.results.len(), "TMDB search completed");
        Ok(page.results)
    }
}

/// Key of the first YouTube-hosted trailer
pub fn first_youtube_trailer(videos: TmdbVideos) -> Option<String> {
    videos
        .results
        .into_iter()
        .find(|v| v.video_type.as_deref() == Some("Trailer") && v.site.as_deref() == Some("YouTube"))
        .and_then(|v| v.key)
}

/// Offers for `region` (matched case-insensitively): flatrate, else rent,
/// else buy. Empty when the region is absent.
pub fn region_providers(response: TmdbWatchProviders, region: &str) -> Vec<WatchProvider> {
    let Some((_, offers)) = response
        .results
        .into_iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(region))
    else {
        return Vec::new();
    };

    [offers.flatrate, offers.rent, offers.buy]
        .into_iter()
        .find(|list| !list.is_empty())
        .unwrap_or_default()
}

#[async_trait::async_trait]
impl TmdbApi for TmdbClient {
    async fn fetch_content(&self, query: &ContentQuery) -> Vec<TmdbItem> {
        self.try_fetch_content(query).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, kind = %query.kind, "TMDB content fetch failed");
            Vec::new()
        })
    }

    async fn search(
        &self,
        query: &str,
        kind: Option<MediaKind>,
        language: Language,
    ) -> Vec<TmdbItem> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        self.try_search(query, kind, language)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, query = %query, "TMDB search failed");
                Vec::new()
            })
    }

    async fn trailer(&self, id: u64, kind: MediaKind) -> Option<String> {
        let path = format!("/{}/{}/videos", kind.as_path(), id);
        match self.get_json::<TmdbVideos>(&path, &[], DETAILS_TIMEOUT).await {
            Ok(videos) => first_youtube_trailer(videos),
            Err(e) => {
                tracing::warn!(error = %e, id, kind = %kind, "TMDB trailer lookup failed");
                None
            }
        }
    }

    async fn watch_providers(&self, id: u64, kind: MediaKind) -> Vec<WatchProvider> {
        let path = format!("/{}/{}/watch/providers", kind.as_path(), id);
        match self
            .get_json::<TmdbWatchProviders>(&path, &[], DETAILS_TIMEOUT)
            .await
        {
            Ok(response) => region_providers(response, &self.watch_region),
            Err(e) => {
                tracing::warn!(error = %e, id, kind = %kind, "TMDB watch provider lookup failed");
                Vec::new()
            }
        }
    }
}
