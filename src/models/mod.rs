mod chat;
mod language;
mod movie;
mod persona;

pub use chat::{ChatMessage, ContentPart, ImageData, ImageUrl, MessageContent, Role};
pub use language::{DetailLabels, Language, UiText};
pub use movie::{
    MediaKind, MovieRef, RegionProviders, TmdbItem, TmdbPage, TmdbVideo, TmdbVideos,
    TmdbWatchProviders, WatchProvider,
};
pub use persona::Persona;
