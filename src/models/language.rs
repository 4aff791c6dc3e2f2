use serde::{Deserialize, Serialize};

/// UI and response language
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ar,
    #[default]
    En,
    De,
}

impl Language {
    /// Parses a language code; unsupported codes yield `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "ar" => Some(Language::Ar),
            "en" => Some(Language::En),
            "de" => Some(Language::De),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::Ar => "ar",
            Language::En => "en",
            Language::De => "de",
        }
    }

    /// Locale passed to TMDB as the `language` query parameter
    pub fn tmdb_locale(&self) -> &'static str {
        match self {
            Language::Ar => "ar-SA",
            Language::En => "en-US",
            Language::De => "de-DE",
        }
    }

    pub fn text(&self) -> &'static UiText {
        match self {
            Language::Ar => &AR,
            Language::En => &EN,
            Language::De => &DE,
        }
    }
}

/// Labels for the details panel
#[derive(Debug, Serialize)]
pub struct DetailLabels {
    pub story: &'static str,
    pub trailer: &'static str,
    pub providers: &'static str,
    pub no_providers: &'static str,
    pub close: &'static str,
}

/// Localized text bundle rendered by the front end
#[derive(Debug, Serialize)]
pub struct UiText {
    pub dir: &'static str,
    pub align: &'static str,
    pub app_title: &'static str,
    pub menu: [&'static str; 7],
    /// Indexed like `Persona::ALL`
    pub personas: [&'static str; 4],
    /// Indexed like `Persona::ALL`
    pub welcome_msgs: [&'static str; 4],
    pub persona_label: &'static str,
    pub new_chat: &'static str,
    pub input_placeholder: &'static str,
    pub upload_text: &'static str,
    pub analyze_btn: &'static str,
    pub dna_inputs: [&'static str; 3],
    pub dna_btn: &'static str,
    pub match_inputs: [&'static str; 2],
    pub match_btn: &'static str,
    pub search_placeholder: &'static str,
    pub headers: [&'static str; 5],
    pub descs: [&'static str; 3],
    pub details: DetailLabels,
}

static AR: UiText = UiText {
    dir: "rtl",
    align: "right",
    app_title: "AI CINEMA 🔮",
    menu: ["الرئيسية", "أفلام", "مسلسلات", "محقق بصري", "تحليل DNA", "توحيد السهرة", "مفضلتي"],
    personas: ["الصديق الناصح 🤝", "الناقد القاسي 🧐", "الجوكر الساخر 🤡", "المتحمس (Fanboy) 🤩"],
    welcome_msgs: [
        "أهلاً بك! 👋 أنا دليلك السينمائي الذكي. أخبرني بمزاجك وسأقترح عليك روائع تناسب ذوقك! 🎥✨",
        "أهلاً. أنا الناقد السينمائي. أتمنى ألا تطلب مني أفلاماً تجارية مملة. هات ما عندك بذكاء. 🧐",
        "لماذا أنت جاد هكذا؟ 🤡 دعنا نجد فيلماً يضحكنا أو يرعبنا.. المهم ألا ننام!",
        "يا هلااا! 🔥 مستعد لأقوى الاقتراحات؟ أكشن، خيال، حماس.. يلا نبدأ! 🚀🤩",
    ],
    persona_label: "شخصية المساعد:",
    new_chat: "تغيير الشخصية / محادثة جديدة",
    input_placeholder: "اكتب هنا...",
    upload_text: "ارفع صورة (JPG/PNG)",
    analyze_btn: "🔍 ابدأ التحليل",
    dna_inputs: ["الفيلم الأول ⭐", "الفيلم الثاني ⭐⭐", "الفيلم الثالث ⭐⭐⭐"],
    dna_btn: "🔍 حلل شخصيتي",
    match_inputs: ["ذوق الطرف الأول", "ذوق الطرف الثاني"],
    match_btn: "✨ جد الحل الوسط!",
    search_placeholder: "بحث...",
    headers: ["المحقق البصري 🕵️", "تحليل الحمض النووي 🧬", "توحيد السهرة ⚖️", "تصفح المحتوى", "مفضلتي ❤️"],
    descs: [
        "ارفع صورة وسأجد لك أفلاماً بنفس الأجواء والنمط البصري!",
        "أخبرني بأفلامك المفضلة وسأحلل شخصيتك السينمائية!",
        "مختلفين على الفيلم؟ اكتبوا الأذواق وسأجد الحل الوسط!",
    ],
    details: DetailLabels {
        story: "القصة",
        trailer: "الإعلان التشويقي",
        providers: "متوفر للمشاهدة على:",
        no_providers: "غير متوفر رقمياً في منطقتك حالياً.",
        close: "إغلاق",
    },
};

static EN: UiText = UiText {
    dir: "ltr",
    align: "left",
    app_title: "AI CINEMA 🔮",
    menu: ["Home", "Movies", "TV Shows", "Visual Detective", "DNA Analysis", "Matchmaker", "Favorites"],
    personas: ["Friendly Guide 🤝", "Harsh Critic 🧐", "Joker 🤡", "Fanboy 🤩"],
    welcome_msgs: [
        "Welcome! 👋 I am your AI Movie Guide. Tell me your mood! 🎥✨",
        "Hello. I am the Critic. I hope you have good taste. 🧐",
        "Why so serious? 🤡 Let's find something fun!",
        "Hey there! 🔥 Ready for EPIC recommendations? 🚀🤩",
    ],
    persona_label: "Persona:",
    new_chat: "Change Persona / New Chat",
    input_placeholder: "Type here...",
    upload_text: "Upload Image (JPG/PNG)",
    analyze_btn: "🔍 Analyze",
    dna_inputs: ["1st Movie ⭐", "2nd Movie ⭐⭐", "3rd Movie ⭐⭐⭐"],
    dna_btn: "🔍 Analyze Me",
    match_inputs: ["Person 1 Taste", "Person 2 Taste"],
    match_btn: "✨ Find Match!",
    search_placeholder: "Search...",
    headers: ["Visual Detective 🕵️", "DNA Analysis 🧬", "Movie Matchmaker ⚖️", "Browse", "My Favorites ❤️"],
    descs: [
        "Upload an image to find movies with the same vibe!",
        "Tell me your favorites, I'll analyze your personality!",
        "Can't agree on a movie? I'll find the middle ground!",
    ],
    details: DetailLabels {
        story: "Overview",
        trailer: "Trailer",
        providers: "Available on:",
        no_providers: "Not available digitally.",
        close: "Close",
    },
};

static DE: UiText = UiText {
    dir: "ltr",
    align: "left",
    app_title: "KI KINO 🔮",
    menu: ["Startseite", "Filme", "Serien", "Visueller Detektiv", "DNA Analyse", "Film-Match", "Favoriten"],
    personas: ["Freundlicher Guide 🤝", "Kritiker 🧐", "Joker 🤡", "Fanboy 🤩"],
    welcome_msgs: [
        "Willkommen! 👋 Ich bin dein KI-Filmführer. 🎥✨",
        "Hallo. Ich bin der Kritiker. 🧐",
        "Warum so ernst? 🤡",
        "Hallo! 🔥 Bereit für Action? 🚀🤩",
    ],
    persona_label: "Persönlichkeit:",
    new_chat: "Neuer Chat",
    input_placeholder: "Hier schreiben...",
    upload_text: "Bild hochladen",
    analyze_btn: "🔍 Starten",
    dna_inputs: ["1. Film", "2. Film", "3. Film"],
    dna_btn: "🔍 Analyse",
    match_inputs: ["Person 1", "Person 2"],
    match_btn: "✨ Lösung finden!",
    search_placeholder: "Suchen...",
    headers: ["Visueller Detektiv", "DNA Analyse", "Film-Match", "Durchsuchen", "Favoriten"],
    descs: ["Bild hochladen...", "Deine Favoriten...", "Keine Einigung?..."],
    details: DetailLabels {
        story: "Handlung",
        trailer: "Trailer",
        providers: "Verfügbar auf:",
        no_providers: "Nicht verfügbar.",
        close: "Schließen",
    },
};
