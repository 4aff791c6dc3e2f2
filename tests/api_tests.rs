use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use axum::http::{
    header::{COOKIE, SET_COOKIE},
    HeaderValue, StatusCode,
};
use axum_test::{
    multipart::{MultipartForm, Part},
    TestResponse, TestServer,
};
use parking_lot::Mutex;
use serde_json::Value;

use cimabot::{
    api::{create_router, AppState},
    models::{ChatMessage, Language, MediaKind, TmdbItem, WatchProvider},
    services::{
        providers::{ChatProvider, ProviderError},
        ContentQuery, ProviderRouter, TmdbApi,
    },
};

const IMAGE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Canned TMDB catalogue
#[derive(Default)]
struct FakeTmdb {
    browse_queries: Mutex<Vec<ContentQuery>>,
    search_kinds: Mutex<Vec<Option<MediaKind>>>,
}

fn item(id: u64, title: &str, media_type: Option<&str>) -> TmdbItem {
    TmdbItem {
        id,
        title: Some(title.to_string()),
        poster_path: Some(format!("/{}.jpg", id)),
        overview: Some(format!("About {}", title)),
        media_type: media_type.map(str::to_string),
        ..Default::default()
    }
}

#[async_trait]
impl TmdbApi for FakeTmdb {
    async fn fetch_content(&self, query: &ContentQuery) -> Vec<TmdbItem> {
        self.browse_queries.lock().push(query.clone());
        vec![item(496243, "Parasite", None), item(496243, "Parasite", None)]
    }

    async fn search(
        &self,
        query: &str,
        kind: Option<MediaKind>,
        _language: Language,
    ) -> Vec<TmdbItem> {
        self.search_kinds.lock().push(kind);
        match query {
            "Inception" => vec![item(27205, "Inception", Some("movie"))],
            "Dark" => vec![item(70523, "Dark", Some("tv"))],
            "Heat" => vec![item(949, "Heat", Some("movie"))],
            _ => Vec::new(),
        }
    }

    async fn trailer(&self, id: u64, _kind: MediaKind) -> Option<String> {
        (id == 27205).then(|| "YoHD9XEInc0".to_string())
    }

    async fn watch_providers(&self, id: u64, _kind: MediaKind) -> Vec<WatchProvider> {
        if id != 27205 {
            return Vec::new();
        }
        vec![WatchProvider {
            provider_id: 8,
            provider_name: "Netflix".to_string(),
            logo_path: Some("/netflix.jpg".to_string()),
        }]
    }
}

/// Provider that always answers with the same text and records its prompts
struct ScriptedProvider {
    answer: &'static str,
    calls: AtomicUsize,
    prompts: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedProvider {
    fn new(answer: &'static str) -> Arc<Self> {
        Arc::new(Self {
            answer,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ChatProvider for ScriptedProvider {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(messages.to_vec());
        Ok(self.answer.to_string())
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Provider that always fails like a vendor outage
struct DownProvider;

#[async_trait]
impl ChatProvider for DownProvider {
    async fn generate(&self, _messages: &[ChatMessage]) -> Result<String, ProviderError> {
        Err(ProviderError::Api {
            status: 500,
            message: "upstream down".to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "down"
    }
}

struct TestApp {
    server: TestServer,
    tmdb: Arc<FakeTmdb>,
}

fn create_test_app(providers: Vec<Arc<dyn ChatProvider>>) -> TestApp {
    let tmdb = Arc::new(FakeTmdb::default());
    let state = AppState::new(
        ProviderRouter::new(providers),
        tmdb.clone(),
        IMAGE_URL.to_string(),
        "test-secret",
    );
    let app = create_router(state);
    TestApp {
        server: TestServer::new(app).unwrap(),
        tmdb,
    }
}

/// `name=value` pair from the response's session cookie
fn session_cookie(response: &TestResponse) -> HeaderValue {
    let raw = response
        .headers()
        .get(SET_COOKIE)
        .expect("session cookie should be set")
        .to_str()
        .unwrap();
    let pair = raw.split(';').next().unwrap();
    HeaderValue::from_str(pair).unwrap()
}

/// Opens a session and returns its cookie
async fn open_session(server: &TestServer) -> HeaderValue {
    let response = server.get("/").await;
    response.assert_status_ok();
    session_cookie(&response)
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app(Vec::new());
    let response = app.server.get("/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert!(response.headers().get(SET_COOKIE).is_none());
    assert!(response.headers().get("x-request-id").is_some());
}

#[tokio::test]
async fn test_index_defaults() {
    let app = create_test_app(vec![ScriptedProvider::new("hi")]);
    let response = app.server.get("/").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["lang"], "en");
    assert_eq!(body["dir"], "ltr");
    assert_eq!(body["persona"], "friendly");
    assert_eq!(body["history"].as_array().unwrap().len(), 1);
    assert_eq!(body["history"][0]["role"], "assistant");
    assert_eq!(body["ai_providers"][0], "scripted");
}

#[tokio::test]
async fn test_change_lang_redirects_and_persists() {
    let app = create_test_app(Vec::new());
    let cookie = open_session(&app.server).await;

    let response = app
        .server
        .get("/change_lang/ar")
        .add_header(COOKIE, cookie.clone())
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get("location").unwrap(), "/");

    let body: Value = app.server.get("/").add_header(COOKIE, cookie).await.json();
    assert_eq!(body["lang"], "ar");
    assert_eq!(body["dir"], "rtl");
}

#[tokio::test]
async fn test_change_lang_ignores_unsupported_code() {
    let app = create_test_app(Vec::new());
    let cookie = open_session(&app.server).await;

    app.server
        .get("/change_lang/de")
        .add_header(COOKIE, cookie.clone())
        .await
        .assert_status(StatusCode::SEE_OTHER);
    app.server
        .get("/change_lang/fr")
        .add_header(COOKIE, cookie.clone())
        .await
        .assert_status(StatusCode::SEE_OTHER);

    let body: Value = app.server.get("/").add_header(COOKIE, cookie).await.json();
    assert_eq!(body["lang"], "de");
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let app = create_test_app(Vec::new());
    let first = open_session(&app.server).await;

    app.server
        .get("/change_lang/de")
        .add_header(COOKIE, first)
        .await
        .assert_status(StatusCode::SEE_OTHER);

    let body: Value = app.server.get("/").await.json();
    assert_eq!(body["lang"], "en");
}

#[tokio::test]
async fn test_forged_cookie_starts_new_session() {
    let app = create_test_app(Vec::new());
    let forged = HeaderValue::from_static(
        "cimabot_session=6f1d2c1e-7c1a-4b5e-9a55-0b4f6c8d9e10.00000000000000000000000000000000",
    );

    let response = app.server.get("/").add_header(COOKIE, forged).await;
    response.assert_status_ok();
    assert!(response.headers().get(SET_COOKIE).is_some());
}

#[tokio::test]
async fn test_chat_without_providers() {
    let app = create_test_app(Vec::new());
    let cookie = open_session(&app.server).await;

    let response = app
        .server
        .post("/chat")
        .add_header(COOKIE, cookie.clone())
        .form(&[("message", "Something dark please")])
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert!(body["response"]
        .as_str()
        .unwrap()
        .starts_with("Error: no AI provider"));
    assert_eq!(body["movies"].as_array().unwrap().len(), 0);

    // Error answers are not stored as assistant turns
    let index: Value = app.server.get("/").add_header(COOKIE, cookie).await.json();
    assert_eq!(index["history"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_chat_falls_back_and_resolves_titles() {
    let answer = ScriptedProvider::new("Try [Inception] and the series [Dark]. Also [Inception]!");
    let app = create_test_app(vec![Arc::new(DownProvider), answer.clone()]);
    let cookie = open_session(&app.server).await;

    let response = app
        .server
        .post("/chat")
        .add_header(COOKIE, cookie.clone())
        .form(&[("message", "Mind-bending please")])
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let movies = body["movies"].as_array().unwrap();
    assert_eq!(movies.len(), 2);
    assert_eq!(movies[0]["id"], 27205);
    assert_eq!(movies[0]["poster_url"], format!("{}/27205.jpg", IMAGE_URL));
    assert_eq!(movies[1]["media_type"], "tv");
    assert_eq!(answer.calls.load(Ordering::SeqCst), 1);

    // Resolver always multi-searches
    assert!(app.tmdb.search_kinds.lock().iter().all(Option::is_none));

    let prompt = &answer.prompts.lock()[0];
    assert_eq!(prompt.last().unwrap().content.text(), "Mind-bending please");

    let index: Value = app.server.get("/").add_header(COOKIE, cookie).await.json();
    let history = index["history"].as_array().unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[1]["role"], "user");
    assert_eq!(history[2]["role"], "assistant");
}

#[tokio::test]
async fn test_chat_persona_switch_resets_history() {
    let app = create_test_app(vec![ScriptedProvider::new("Watch [Heat].")]);
    let cookie = open_session(&app.server).await;

    for message in ["one", "two"] {
        app.server
            .post("/chat")
            .add_header(COOKIE, cookie.clone())
            .form(&[("message", message)])
            .await
            .assert_status_ok();
    }

    app.server
        .post("/chat")
        .add_header(COOKIE, cookie.clone())
        .form(&[("message", "three"), ("persona", "The Critic")])
        .await
        .assert_status_ok();

    let index: Value = app.server.get("/").add_header(COOKIE, cookie).await.json();
    assert_eq!(index["persona"], "critic");
    // Critic welcome, user turn, assistant turn
    assert_eq!(index["history"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_chat_requires_message() {
    let app = create_test_app(vec![ScriptedProvider::new("unused")]);
    let response = app.server.post("/chat").form(&[("message", "   ")]).await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_new_chat_returns_welcome() {
    let app = create_test_app(Vec::new());
    let cookie = open_session(&app.server).await;

    let response = app
        .server
        .post("/new_chat")
        .add_header(COOKIE, cookie)
        .form(&[("persona", "joker")])
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["response"], "Why so serious? 🤡 Let's find something fun!");
}

#[tokio::test]
async fn test_search_by_kind() {
    let app = create_test_app(Vec::new());

    let response = app
        .server
        .post("/search")
        .form(&[("query", "Dark"), ("content_type", "tv")])
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["movies"][0]["title"], "Dark");
    assert_eq!(*app.tmdb.search_kinds.lock(), vec![Some(MediaKind::Tv)]);
}

#[tokio::test]
async fn test_browse_content_builds_query() {
    let app = create_test_app(Vec::new());

    let response = app
        .server
        .post("/browse_content")
        .form(&[
            ("content_type", "movie"),
            ("category", "top_rated"),
            ("region", "korea"),
        ])
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["movies"].as_array().unwrap().len(), 1);

    let queries = app.tmdb.browse_queries.lock();
    assert_eq!(queries[0].kind, MediaKind::Movie);
    assert_eq!(queries[0].category, "top_rated");
    assert_eq!(queries[0].region.as_deref(), Some("korea"));
    assert_eq!(queries[0].language, Language::En);
}

#[tokio::test]
async fn test_get_details() {
    let app = create_test_app(Vec::new());

    let response = app
        .server
        .post("/get_details")
        .form(&[("id", "27205"), ("content_type", "movie")])
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["providers"][0]["provider_name"], "Netflix");
    assert_eq!(body["trailer"], "YoHD9XEInc0");

    let body: Value = app
        .server
        .post("/get_details")
        .form(&[("id", "1")])
        .await
        .json();
    assert!(body["trailer"].is_null());
    assert_eq!(body["providers"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_analyze_dna_without_movies_skips_providers() {
    let provider = ScriptedProvider::new("unused");
    let app = create_test_app(vec![provider.clone()]);

    let response = app
        .server
        .post("/analyze_dna")
        .form(&[("movie1", " "), ("movie2", ""), ("movie3", "")])
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["response"], "Please enter movies.");
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_analyze_dna() {
    let provider = ScriptedProvider::new("You love heists. See [Heat].");
    let app = create_test_app(vec![provider.clone()]);

    let body: Value = app
        .server
        .post("/analyze_dna")
        .form(&[("movie1", "Ocean's Eleven"), ("movie2", "The Town")])
        .await
        .json();
    assert_eq!(body["movies"][0]["title"], "Heat");

    let prompt = provider.prompts.lock()[0].last().unwrap().content.text();
    assert!(prompt.contains("Ocean's Eleven"));
    assert!(prompt.contains("The Town"));
}

#[tokio::test]
async fn test_matchmaker_requires_both_users() {
    let app = create_test_app(vec![ScriptedProvider::new("unused")]);
    let response = app
        .server
        .post("/matchmaker")
        .form(&[("user1", "horror")])
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analyze_image() {
    let provider = ScriptedProvider::new("Moody. Try [Dark].");
    let app = create_test_app(vec![provider.clone()]);

    let form = MultipartForm::new().add_part(
        "image",
        Part::bytes(vec![0x89, 0x50, 0x4e, 0x47])
            .file_name("poster.png")
            .mime_type("image/png"),
    );
    let response = app.server.post("/analyze_image").multipart(form).await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["movies"][0]["id"], 70523);

    let prompts = provider.prompts.lock();
    let images = prompts[0].last().unwrap().content.images();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].mime_type, "image/png");
}

#[tokio::test]
async fn test_analyze_image_rejects_non_images() {
    let app = create_test_app(vec![ScriptedProvider::new("unused")]);

    let form = MultipartForm::new().add_part(
        "image",
        Part::bytes(b"hello".to_vec())
            .file_name("notes.txt")
            .mime_type("text/plain"),
    );
    let response = app.server.post("/analyze_image").multipart(form).await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_favorites_add_and_remove() {
    let app = create_test_app(Vec::new());
    let cookie = open_session(&app.server).await;

    let favorite = [
        ("id", "27205"),
        ("title", "Inception"),
        ("poster_path", "/27205.jpg"),
        ("media_type", "movie"),
    ];
    for _ in 0..2 {
        app.server
            .post("/favorites/add")
            .add_header(COOKIE, cookie.clone())
            .form(&favorite)
            .await
            .assert_status_ok();
    }

    let body: Value = app
        .server
        .get("/favorites")
        .add_header(COOKIE, cookie.clone())
        .await
        .json();
    let movies = body["movies"].as_array().unwrap();
    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0]["poster_url"], format!("{}/27205.jpg", IMAGE_URL));

    let body: Value = app
        .server
        .post("/favorites/remove")
        .add_header(COOKIE, cookie)
        .form(&[("id", "27205")])
        .await
        .json();
    assert_eq!(body["movies"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_get_details_without_id_is_json_error() {
    let app = create_test_app(Vec::new());

    let response = app
        .server
        .post("/get_details")
        .form(&[("content_type", "movie")])
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("id"));
}

#[tokio::test]
async fn test_remove_favorite_with_garbage_id_is_json_error() {
    let app = create_test_app(Vec::new());

    let response = app
        .server
        .post("/favorites/remove")
        .form(&[("id", "abc")])
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_add_favorite_without_poster_is_json_error() {
    let app = create_test_app(Vec::new());

    let response = app
        .server
        .post("/favorites/add")
        .form(&[("id", "27205"), ("title", "Inception")])
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_analyze_image_without_multipart_is_json_error() {
    let app = create_test_app(vec![ScriptedProvider::new("unused")]);

    let response = app
        .server
        .post("/analyze_image")
        .form(&[("image", "not-a-file")])
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert!(body["error"].is_string());
}
