use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB v3 API key. Without it every TMDB call returns an empty result.
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    /// TMDB REST base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Prefix prepended to TMDB poster paths
    #[serde(default = "default_image_url")]
    pub image_url: String,

    /// Timeout in seconds for TMDB browse and search calls
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Timeout in seconds for a single AI provider call
    #[serde(default = "default_ai_timeout")]
    pub ai_timeout: u64,

    /// Region used for watch-provider lookups
    #[serde(default = "default_watch_region")]
    pub watch_region: String,

    #[serde(default)]
    pub openrouter_api_key: Option<String>,

    #[serde(default = "default_openrouter_api_url")]
    pub openrouter_api_url: String,

    #[serde(default = "default_openrouter_model")]
    pub openrouter_model: String,

    #[serde(default)]
    pub gemini_api_key: Option<String>,

    /// Generative Language API root; the model path is appended per call
    #[serde(default = "default_gemini_api_url")]
    pub gemini_api_url: String,

    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    #[serde(default)]
    pub groq_api_key: Option<String>,

    #[serde(default = "default_groq_api_url")]
    pub groq_api_url: String,

    #[serde(default = "default_groq_model")]
    pub groq_model: String,

    /// Public URL of this app, sent to OpenRouter as the referer
    #[serde(default = "default_app_url")]
    pub app_url: String,

    /// Secret used to sign session cookies
    #[serde(default, alias = "flask_secret_key")]
    pub session_secret: Option<String>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_image_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_ai_timeout() -> u64 {
    30
}

fn default_watch_region() -> String {
    "SA".to_string()
}

fn default_openrouter_api_url() -> String {
    "https://openrouter.ai/api/v1/chat/completions".to_string()
}

fn default_openrouter_model() -> String {
    "google/gemini-flash-1.5".to_string()
}

fn default_gemini_api_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_groq_api_url() -> String {
    "https://api.groq.com/openai/v1/chat/completions".to_string()
}

fn default_groq_model() -> String {
    "llama-3.1-8b-instant".to_string()
}

fn default_app_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tmdb_api_key: None,
            base_url: default_base_url(),
            image_url: default_image_url(),
            request_timeout: default_request_timeout(),
            ai_timeout: default_ai_timeout(),
            watch_region: default_watch_region(),
            openrouter_api_key: None,
            openrouter_api_url: default_openrouter_api_url(),
            openrouter_model: default_openrouter_model(),
            gemini_api_key: None,
            gemini_api_url: default_gemini_api_url(),
            gemini_model: default_gemini_model(),
            groq_api_key: None,
            groq_api_url: default_groq_api_url(),
            groq_model: default_groq_model(),
            app_url: default_app_url(),
            session_secret: None,
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        Ok(config.normalized())
    }

    /// Treats blank keys as unset, so `GEMINI_API_KEY=` does not enable a provider.
    fn normalized(mut self) -> Self {
        for key in [
            &mut self.tmdb_api_key,
            &mut self.openrouter_api_key,
            &mut self.gemini_api_key,
            &mut self.groq_api_key,
            &mut self.session_secret,
        ] {
            if key.as_deref().is_some_and(|k| k.trim().is_empty()) {
                *key = None;
            }
        }
        self
    }
}
