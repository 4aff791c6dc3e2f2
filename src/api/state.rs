use std::sync::Arc;

use reqwest::Client as HttpClient;

use crate::{
    cache::Cache,
    config::Config,
    services::{ProviderRouter, TitleResolver, TmdbApi, TmdbClient},
    session::{SessionSigner, SessionStore},
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub providers: ProviderRouter,
    pub tmdb: Arc<dyn TmdbApi>,
    pub resolver: TitleResolver,
    pub sessions: SessionStore,
    pub signer: SessionSigner,
    pub image_url: String,
}

impl AppState {
    pub fn new(
        providers: ProviderRouter,
        tmdb: Arc<dyn TmdbApi>,
        image_url: String,
        session_secret: &str,
    ) -> Self {
        Self {
            resolver: TitleResolver::new(tmdb.clone(), image_url.clone()),
            providers,
            tmdb,
            sessions: SessionStore::new(),
            signer: SessionSigner::new(session_secret),
            image_url,
        }
    }

    /// Wires the real TMDB client and AI providers from configuration
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http_client = HttpClient::builder()
            .user_agent(concat!("cimabot/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let providers = ProviderRouter::from_config(config, http_client.clone());
        let tmdb = TmdbClient::new(http_client, config, Cache::default());

        let session_secret = match &config.session_secret {
            Some(secret) => secret.clone(),
            None => {
                tracing::warn!(
                    "FLASK_SECRET_KEY is not set; using a random secret, sessions will not survive restarts"
                );
                uuid::Uuid::new_v4().to_string()
            }
        };

        tracing::info!(
            providers = ?providers.provider_names(),
            tmdb = config.tmdb_api_key.is_some(),
            "Application state initialized"
        );

        Ok(Self::new(
            providers,
            Arc::new(tmdb),
            config.image_url.clone(),
            &session_secret,
        ))
    }
}
