use serde::{Deserialize, Serialize};

use super::Language;

/// Canned assistant personality
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    #[default]
    Friendly,
    Critic,
    Joker,
    Fanboy,
}

impl Persona {
    /// Order matches the persona labels in `UiText`
    pub const ALL: [Persona; 4] = [
        Persona::Friendly,
        Persona::Critic,
        Persona::Joker,
        Persona::Fanboy,
    ];

    /// Resolves a free-form label, including the localized UI labels.
    ///
    /// Unrecognized labels fall back to `Friendly`.
    pub fn resolve(label: &str) -> Self {
        let label = label.to_lowercase();
        let matches = |needles: &[&str]| needles.iter().any(|n| label.contains(n));

        if matches(&["critic", "kritiker", "الناقد"]) {
            Persona::Critic
        } else if matches(&["joker", "جوكر"]) {
            Persona::Joker
        } else if matches(&["fan", "المتحمس"]) {
            Persona::Fanboy
        } else {
            Persona::Friendly
        }
    }

    /// Persona line opening the system prompt
    pub fn instruction(&self) -> &'static str {
        match self {
            Persona::Friendly => "You are CimaBot, a helpful movie expert.",
            Persona::Critic => "You are a snobbish movie critic. You hate blockbusters.",
            Persona::Joker => "You are a funny bot. Make jokes about movies.",
            Persona::Fanboy => "You are a hyped fanboy! Use emojis! 🤩",
        }
    }

    fn index(&self) -> usize {
        match self {
            Persona::Friendly => 0,
            Persona::Critic => 1,
            Persona::Joker => 2,
            Persona::Fanboy => 3,
        }
    }

    /// Greeting shown when a conversation starts
    pub fn welcome(&self, language: Language) -> &'static str {
        language.text().welcome_msgs[self.index()]
    }
}
