/// A language the services accept, with its native display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
}

pub const SUPPORTED_LANGUAGES: [Language; 12] = [
    Language { code: "en", name: "English" },
    Language { code: "fa", name: "فارسی" },
    Language { code: "ar", name: "العربية" },
    Language { code: "fr", name: "Français" },
    Language { code: "es", name: "Español" },
    Language { code: "de", name: "Deutsch" },
    Language { code: "it", name: "Italiano" },
    Language { code: "pt", name: "Português" },
    Language { code: "ru", name: "Русский" },
    Language { code: "zh", name: "中文" },
    Language { code: "ja", name: "日本語" },
    Language { code: "ko", name: "한국어" },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Voice {
    pub id: &'static str,
    pub name: &'static str,
}

const EN_VOICES: [Voice; 4] = [
    Voice { id: "en-US-male", name: "English (US) - Male" },
    Voice { id: "en-US-female", name: "English (US) - Female" },
    Voice { id: "en-GB-male", name: "English (UK) - Male" },
    Voice { id: "en-GB-female", name: "English (UK) - Female" },
];

const FA_VOICES: [Voice; 2] = [
    Voice { id: "fa-IR-male", name: "فارسی - مرد" },
    Voice { id: "fa-IR-female", name: "فارسی - زن" },
];

const AR_VOICES: [Voice; 2] = [
    Voice { id: "ar-SA-male", name: "العربية - ذكر" },
    Voice { id: "ar-SA-female", name: "العربية - أنثى" },
];

pub fn language_name(code: &str) -> Option<&'static str> {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|language| language.code == code)
        .map(|language| language.name)
}

/// Voices for a language. Languages without their own voices use English.
pub fn voices_for(code: &str) -> &'static [Voice] {
    match code {
        "fa" => &FA_VOICES,
        "ar" => &AR_VOICES,
        _ => &EN_VOICES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_lookup() {
        assert_eq!(language_name("fa"), Some("فارسی"));
        assert_eq!(language_name("xx"), None);
    }

    #[test]
    fn test_voices_fall_back_to_english() {
        assert_eq!(voices_for("fa")[0].id, "fa-IR-male");
        assert_eq!(voices_for("de"), &EN_VOICES[..]);
    }
}
