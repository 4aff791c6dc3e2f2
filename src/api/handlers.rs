use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::StatusCode,
    response::Redirect,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{ChatMessage, ImageData, Language, MediaKind, MovieRef, Persona, UiText, WatchProvider},
    services::{prompts, ContentQuery},
    session::SessionId,
};

use super::{extract::ValidForm, AppState};

/// Form field carrying the uploaded image
const IMAGE_FIELD: &str = "image";
const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct ChatForm {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub persona: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewChatForm {
    #[serde(default)]
    pub persona: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub content_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BrowseForm {
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DnaForm {
    #[serde(default)]
    pub movie1: String,
    #[serde(default)]
    pub movie2: String,
    #[serde(default)]
    pub movie3: String,
}

#[derive(Debug, Deserialize)]
pub struct MatchmakerForm {
    #[serde(default)]
    pub user1: String,
    #[serde(default)]
    pub user2: String,
}

#[derive(Debug, Deserialize)]
pub struct DetailsForm {
    pub id: u64,
    #[serde(default)]
    pub content_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FavoriteForm {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    pub poster_path: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub media_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RemoveFavoriteForm {
    pub id: u64,
}

/// AI answer plus the movies it recommends
#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub response: String,
    pub movies: Vec<MovieRef>,
}

#[derive(Debug, Serialize)]
pub struct MoviesResponse {
    pub movies: Vec<MovieRef>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub response: String,
}

#[derive(Debug, Serialize)]
pub struct DetailsResponse {
    pub providers: Vec<WatchProvider>,
    pub trailer: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub lang: Language,
    pub dir: &'static str,
    pub text: &'static UiText,
    pub persona: Persona,
    pub history: Vec<ChatMessage>,
    pub favorites: Vec<MovieRef>,
    pub ai_providers: Vec<&'static str>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl AppState {
    /// Runs a one-shot prompt through the provider chain and resolves the
    /// recommended titles.
    async fn analyze(&self, messages: Vec<ChatMessage>, language: Language) -> AnalysisResponse {
        let response = self.providers.generate(&messages).await;
        let movies = self.resolver.resolve(&response, language).await;
        AnalysisResponse { response, movies }
    }
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// UI bootstrap: localized text and the visitor's session state
pub async fn index(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
) -> Json<IndexResponse> {
    let session = state.sessions.get(session_id).await;
    let text = session.language.text();

    Json(IndexResponse {
        lang: session.language,
        dir: text.dir,
        text,
        persona: session.persona,
        history: session.history,
        favorites: session.favorites,
        ai_providers: state.providers.provider_names(),
    })
}

/// Switches the session language and redirects to the index.
///
/// Unsupported codes leave the language unchanged.
pub async fn change_lang(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
    Path(lang): Path<String>,
) -> Redirect {
    match Language::from_code(&lang) {
        Some(language) => {
            state
                .sessions
                .update(session_id, |s| s.language = language)
                .await;
            tracing::info!(session_id = %session_id, lang = language.code(), "Language changed");
        }
        None => {
            tracing::warn!(session_id = %session_id, lang = %lang, "Unsupported language ignored");
        }
    }
    Redirect::to("/")
}

/// Conversational recommendations in the session's persona and language
pub async fn chat(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
    Extension(request_id): Extension<RequestId>,
    ValidForm(form): ValidForm<ChatForm>,
) -> AppResult<Json<AnalysisResponse>> {
    let message = form.message.trim();
    if message.is_empty() {
        return Err(AppError::InvalidInput("message is required".to_string()));
    }
    let persona = non_blank(form.persona.as_deref()).map(Persona::resolve);

    let (messages, language) = state
        .sessions
        .update(session_id, |session| {
            if let Some(persona) = persona {
                if persona != session.persona {
                    session.reset_chat(persona);
                }
            }
            session.push(ChatMessage::user(message));
            (
                prompts::chat_messages(&session.history, session.persona, session.language),
                session.language,
            )
        })
        .await;

    tracing::info!(
        request_id = %request_id,
        turns = messages.len(),
        "Processing chat request"
    );

    let response = state.providers.generate(&messages).await;

    if !response.starts_with("Error:") {
        let answer = ChatMessage::assistant(response.clone());
        state.sessions.update(session_id, |s| s.push(answer)).await;
    }

    let movies = state.resolver.resolve(&response, language).await;
    Ok(Json(AnalysisResponse { response, movies }))
}

/// Starts a new conversation, optionally with another persona
pub async fn new_chat(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
    ValidForm(form): ValidForm<NewChatForm>,
) -> Json<MessageResponse> {
    let persona = non_blank(form.persona.as_deref()).map(Persona::resolve);

    let response = state
        .sessions
        .update(session_id, |session| {
            let persona = persona.unwrap_or(session.persona);
            session.reset_chat(persona);
            persona.welcome(session.language).to_string()
        })
        .await;

    Json(MessageResponse { response })
}

/// TMDB search; multi-search unless `content_type` is movie or tv
pub async fn search(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
    ValidForm(form): ValidForm<SearchForm>,
) -> Json<MoviesResponse> {
    let kind = match non_blank(form.content_type.as_deref()) {
        Some("movie") => Some(MediaKind::Movie),
        Some("tv") => Some(MediaKind::Tv),
        _ => None,
    };
    let language = state.sessions.get(session_id).await.language;

    let items = state.tmdb.search(&form.query, kind, language).await;
    let movies = MovieRef::cards(items, kind.unwrap_or(MediaKind::Movie), &state.image_url);

    Json(MoviesResponse { movies })
}

/// Category or region listing
pub async fn browse_content(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
    ValidForm(form): ValidForm<BrowseForm>,
) -> Json<MoviesResponse> {
    let query = ContentQuery {
        kind: MediaKind::from_form(form.content_type.as_deref()),
        category: non_blank(form.category.as_deref())
            .unwrap_or("popular")
            .to_string(),
        region: non_blank(form.region.as_deref()).map(str::to_string),
        language: state.sessions.get(session_id).await.language,
    };

    let items = state.tmdb.fetch_content(&query).await;
    let movies = MovieRef::cards(items, query.kind, &state.image_url);

    Json(MoviesResponse { movies })
}

/// Recommends movies matching the mood of an uploaded image
pub async fn analyze_image(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<AnalysisResponse>> {
    let mut multipart = multipart?;
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Invalid upload: {}", e)))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let mime_type = field
            .content_type()
            .unwrap_or(DEFAULT_IMAGE_MIME)
            .to_string();
        if !mime_type.starts_with("image/") {
            return Err(AppError::InvalidInput(format!(
                "Unsupported upload type: {}",
                mime_type
            )));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Invalid upload: {}", e)))?;
        if bytes.is_empty() {
            return Err(AppError::InvalidInput("Uploaded image is empty".to_string()));
        }

        image = Some(ImageData::from_bytes(mime_type, &bytes));
        break;
    }

    let image = image.ok_or_else(|| AppError::InvalidInput("image is required".to_string()))?;
    let language = state.sessions.get(session_id).await.language;

    tracing::info!(mime_type = %image.mime_type, "Analyzing uploaded image");

    Ok(Json(
        state
            .analyze(prompts::image_messages(&image, language), language)
            .await,
    ))
}

/// Infers a viewer profile from up to three favourite movies
pub async fn analyze_dna(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
    ValidForm(form): ValidForm<DnaForm>,
) -> Json<AnalysisResponse> {
    let language = state.sessions.get(session_id).await.language;
    let movies = [form.movie1, form.movie2, form.movie3];

    match prompts::dna_messages(&movies, language) {
        Some(messages) => Json(state.analyze(messages, language).await),
        None => Json(AnalysisResponse {
            response: prompts::EMPTY_DNA_RESPONSE.to_string(),
            movies: Vec::new(),
        }),
    }
}

/// Middle-ground recommendations for two viewers
pub async fn matchmaker(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
    ValidForm(form): ValidForm<MatchmakerForm>,
) -> AppResult<Json<AnalysisResponse>> {
    if form.user1.trim().is_empty() || form.user2.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "user1 and user2 are required".to_string(),
        ));
    }
    let language = state.sessions.get(session_id).await.language;

    let messages = prompts::matchmaker_messages(&form.user1, &form.user2, language);
    Ok(Json(state.analyze(messages, language).await))
}

/// Trailer and watch providers for one title
pub async fn get_details(
    State(state): State<AppState>,
    ValidForm(form): ValidForm<DetailsForm>,
) -> Json<DetailsResponse> {
    let kind = MediaKind::from_form(form.content_type.as_deref());

    let (trailer, providers) = tokio::join!(
        state.tmdb.trailer(form.id, kind),
        state.tmdb.watch_providers(form.id, kind)
    );

    Json(DetailsResponse { providers, trailer })
}

/// Saved movies of this session
pub async fn get_favorites(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
) -> Json<MoviesResponse> {
    let movies = state.sessions.get(session_id).await.favorites;
    Json(MoviesResponse { movies })
}

/// Saves a movie card; saving an id twice is a no-op
pub async fn add_favorite(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
    ValidForm(form): ValidForm<FavoriteForm>,
) -> AppResult<Json<MoviesResponse>> {
    let poster_path = form.poster_path.trim().to_string();
    if poster_path.is_empty() {
        return Err(AppError::InvalidInput("poster_path is required".to_string()));
    }

    let movie = MovieRef {
        id: form.id,
        title: form.title,
        poster_url: format!("{}{}", state.image_url, poster_path),
        poster_path,
        overview: form.overview,
        media_type: MediaKind::from_form(form.media_type.as_deref()),
    };

    let movies = state
        .sessions
        .update(session_id, |session| {
            session.add_favorite(movie);
            session.favorites.clone()
        })
        .await;

    Ok(Json(MoviesResponse { movies }))
}

pub async fn remove_favorite(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
    ValidForm(form): ValidForm<RemoveFavoriteForm>,
) -> Json<MoviesResponse> {
    let movies = state
        .sessions
        .update(session_id, |session| {
            session.remove_favorite(form.id);
            session.favorites.clone()
        })
        .await;

    Json(MoviesResponse { movies })
}
