//! Prompt templates for the chat, image, DNA and matchmaker features.
//!
//! Every template asks the model to put English movie titles inside
//! `[Brackets]`, which is what the title resolver looks for.

use crate::models::{ChatMessage, ImageData, Language, Persona, Role};

/// Chat turns forwarded to the provider, not counting the system prompt
pub const MAX_HISTORY: usize = 20;

pub const EMPTY_DNA_RESPONSE: &str = "Please enter movies.";

pub fn language_rule(language: Language) -> &'static str {
    match language {
        Language::En => "Speak ONLY in English.",
        Language::De => "Speak ONLY in German.",
        Language::Ar => "Speak ONLY in Arabic.",
    }
}

pub fn system_prompt(persona: Persona, language: Language) -> String {
    format!(
        "{} RULES: 1. {} 2. Movie titles MUST be in English inside [Brackets] like [Inception]. 3. Be concise.",
        persona.instruction(),
        language_rule(language)
    )
}

/// System prompt followed by the most recent `MAX_HISTORY` turns.
///
/// System turns stored in the history are dropped; the persona prompt is
/// rebuilt on every call so a language switch takes effect immediately.
pub fn chat_messages(
    history: &[ChatMessage],
    persona: Persona,
    language: Language,
) -> Vec<ChatMessage> {
    let turns: Vec<&ChatMessage> = history
        .iter()
        .filter(|m| m.role != Role::System)
        .collect();
    let start = turns.len().saturating_sub(MAX_HISTORY);

    std::iter::once(ChatMessage::system(system_prompt(persona, language)))
        .chain(turns[start..].iter().map(|m| (*m).clone()))
        .collect()
}

pub fn image_messages(image: &ImageData, language: Language) -> Vec<ChatMessage> {
    let prompt = format!(
        "Analyze the mood of this image and recommend 3 movies. {} Titles in [Brackets].",
        language_rule(language)
    );
    vec![ChatMessage::user_with_image(prompt, image)]
}

/// `None` when no non-blank movie was given.
pub fn dna_messages(movies: &[String], language: Language) -> Option<Vec<ChatMessage>> {
    let valid: Vec<&str> = movies
        .iter()
        .map(|m| m.trim())
        .filter(|m| !m.is_empty())
        .collect();

    if valid.is_empty() {
        return None;
    }

    let prompt = format!(
        "User likes: {}. Analyze personality and suggest 3 NEW movies. {} Titles in [Brackets].",
        valid.join(", "),
        language_rule(language)
    );
    Some(vec![ChatMessage::user(prompt)])
}

pub fn matchmaker_messages(first: &str, second: &str, language: Language) -> Vec<ChatMessage> {
    let prompt = format!(
        "Matchmaker: Person A likes {}. Person B likes {}. Find middle ground movies. {} Titles in [Brackets].",
        first.trim(),
        second.trim(),
        language_rule(language)
    );
    vec![ChatMessage::user(prompt)]
}
