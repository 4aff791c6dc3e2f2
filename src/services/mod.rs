pub mod prompts;
pub mod providers;
pub mod router;
pub mod title_resolver;
pub mod tmdb;

pub use router::ProviderRouter;
pub use title_resolver::TitleResolver;
pub use tmdb::{ContentQuery, TmdbApi, TmdbClient};
