//! Interface languages and localized UI strings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Interface language. The server uses the same lowercase names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Arabic,
    French,
}

impl Language {
    pub const ALL: [Self; 3] = [Self::English, Self::Arabic, Self::French];

    /// Render language to wire/storage format.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::English => "english",
            Self::Arabic => "arabic",
            Self::French => "french",
        }
    }

    /// Parse a language from wire/storage format.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "english" | "en" => Some(Self::English),
            "arabic" | "ar" => Some(Self::Arabic),
            "french" | "fr" => Some(Self::French),
            _ => None,
        }
    }

    /// Name shown in the language picker.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Arabic => "العربية",
            Self::French => "Français",
        }
    }

    /// BCP 47 tag handed to the speech synthesizer.
    #[must_use]
    pub fn speech_locale(self) -> &'static str {
        match self {
            Self::English => "en-US",
            Self::Arabic => "ar-SA",
            Self::French => "fr-FR",
        }
    }

    /// Right-to-left script.
    #[must_use]
    pub fn is_rtl(self) -> bool {
        matches!(self, Self::Arabic)
    }

    /// Localized UI strings for this language.
    #[must_use]
    pub fn text(self) -> &'static UiText {
        match self {
            Self::English => &ENGLISH,
            Self::Arabic => &ARABIC,
            Self::French => &FRENCH,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every user-visible string the controllers project.
#[derive(Debug)]
pub struct UiText {
    // chat
    pub thinking: &'static str,
    pub sources: &'static str,
    pub hide_sources: &'static str,
    pub reflection_button: &'static str,
    pub reflection_label: &'static str,
    pub clear_button: &'static str,
    pub send: &'static str,
    pub placeholder: &'static str,
    pub welcome_title: &'static str,
    pub welcome_body: &'static str,
    pub welcome_prompt: &'static str,
    pub clear_confirm: &'static str,
    pub send_error: &'static str,
    pub reflection_error: &'static str,
    pub clear_error: &'static str,
    pub language_error: &'static str,
    pub network_error: &'static str,
    // auth
    pub login: &'static str,
    pub signup: &'static str,
    pub logout: &'static str,
    pub welcome_back: &'static str,
    pub login_success: &'static str,
    pub signup_success: &'static str,
    pub login_error: &'static str,
    pub signup_error: &'static str,
    pub logout_error: &'static str,
    // tabs
    pub chat_tab: &'static str,
    pub insights_tab: &'static str,
    pub resources_tab: &'static str,
}

static ENGLISH: UiText = UiText {
    thinking: "EchoMind is reflecting on your message...",
    sources: "View sources EchoMind consulted",
    hide_sources: "Hide sources",
    reflection_button: "✨ Generate Reflection",
    reflection_label: "Reflection:",
    clear_button: "Clear Conversation",
    send: "Send",
    placeholder: "Share what's on your mind...",
    welcome_title: "Welcome to EchoMind",
    welcome_body: "I'm here to listen, support, and offer guidance based on therapeutic principles. \
                   Share your thoughts, concerns, or feelings, and I'll respond with empathy and understanding.",
    welcome_prompt: "How are you feeling today?",
    clear_confirm: "Are you sure you want to clear the entire conversation?",
    send_error: "Sorry, I encountered an error processing your message. Please try again.",
    reflection_error: "Sorry, I encountered an error generating a reflection. Please try again.",
    clear_error: "Sorry, I encountered an error clearing the conversation. Please try again.",
    language_error: "Sorry, I encountered an error changing the language. Please try again.",
    network_error: "Network connection error. Please check your internet connection.",
    login: "Login",
    signup: "Sign Up",
    logout: "Logout",
    welcome_back: "Welcome back, ",
    login_success: "Login successful!",
    signup_success: "Sign up successful!",
    login_error: "Login failed. Please check your credentials.",
    signup_error: "Sign up failed. Please try again.",
    logout_error: "Logout failed. Please try again.",
    chat_tab: "Chat",
    insights_tab: "Insights",
    resources_tab: "Resources",
};

static ARABIC: UiText = UiText {
    thinking: "إيكو مايند يفكر في رسالتك...",
    sources: "عرض المصادر التي استشارها إيكو مايند",
    hide_sources: "إخفاء المصادر",
    reflection_button: "✨ إنشاء تفكير",
    reflection_label: "تفكير:",
    clear_button: "مسح المحادثة",
    send: "إرسال",
    placeholder: "شارك ما يدور في ذهنك...",
    welcome_title: "مرحبًا بك في إيكو مايند",
    welcome_body: "أنا هنا للاستماع والدعم وتقديم التوجيه بناءً على المبادئ العلاجية. \
                   شارك أفكارك أو مخاوفك أو مشاعرك، وسأرد بتعاطف وتفهم.",
    welcome_prompt: "كيف تشعر اليوم؟",
    clear_confirm: "هل أنت متأكد أنك تريد مسح المحادثة بالكامل؟",
    send_error: "عذرًا، حدث خطأ أثناء معالجة رسالتك. يرجى المحاولة مرة أخرى.",
    reflection_error: "عذرًا، حدث خطأ أثناء إنشاء التفكير. يرجى المحاولة مرة أخرى.",
    clear_error: "عذرًا، حدث خطأ أثناء مسح المحادثة. يرجى المحاولة مرة أخرى.",
    language_error: "عذرًا، حدث خطأ أثناء تغيير اللغة. يرجى المحاولة مرة أخرى.",
    network_error: "خطأ في الاتصال بالشبكة. يرجى التحقق من اتصالك بالإنترنت.",
    login: "تسجيل الدخول",
    signup: "إنشاء حساب",
    logout: "تسجيل الخروج",
    welcome_back: "مرحبًا بعودتك، ",
    login_success: "تم تسجيل الدخول بنجاح!",
    signup_success: "تم إنشاء الحساب بنجاح!",
    login_error: "فشل تسجيل الدخول. يرجى التحقق من بيانات الاعتماد الخاصة بك.",
    signup_error: "فشل إنشاء الحساب. يرجى المحاولة مرة أخرى.",
    logout_error: "فشل تسجيل الخروج. يرجى المحاولة مرة أخرى.",
    chat_tab: "دردشة",
    insights_tab: "رؤى",
    resources_tab: "موارد",
};

static FRENCH: UiText = UiText {
    thinking: "EchoMind réfléchit à votre message...",
    sources: "Voir les sources consultées par EchoMind",
    hide_sources: "Masquer les sources",
    reflection_button: "✨ Générer une réflexion",
    reflection_label: "Réflexion :",
    clear_button: "Effacer la conversation",
    send: "Envoyer",
    placeholder: "Partagez ce qui vous préoccupe...",
    welcome_title: "Bienvenue à EchoMind",
    welcome_body: "Je suis là pour écouter, soutenir et offrir des conseils basés sur des principes thérapeutiques. \
                   Partagez vos pensées, préoccupations ou sentiments, et je répondrai avec empathie et compréhension.",
    welcome_prompt: "Comment vous sentez-vous aujourd'hui ?",
    clear_confirm: "Voulez-vous vraiment effacer toute la conversation ?",
    send_error: "Désolé, une erreur s'est produite lors du traitement de votre message. Veuillez réessayer.",
    reflection_error: "Désolé, une erreur s'est produite lors de la génération d'une réflexion. Veuillez réessayer.",
    clear_error: "Désolé, une erreur s'est produite lors de l'effacement de la conversation. Veuillez réessayer.",
    language_error: "Désolé, une erreur s'est produite lors du changement de langue. Veuillez réessayer.",
    network_error: "Erreur de connexion réseau. Veuillez vérifier votre connexion internet.",
    login: "Connexion",
    signup: "S'inscrire",
    logout: "Déconnexion",
    welcome_back: "Bon retour, ",
    login_success: "Connexion réussie!",
    signup_success: "Inscription réussie!",
    login_error: "Échec de la connexion. Veuillez vérifier vos identifiants.",
    signup_error: "Échec de l'inscription. Veuillez réessayer.",
    logout_error: "Échec de la déconnexion. Veuillez réessayer.",
    chat_tab: "Discuter",
    insights_tab: "Aperçus",
    resources_tab: "Ressources",
};
