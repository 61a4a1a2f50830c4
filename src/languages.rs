//! Supported-language catalog.
//! The vendor supports 100+ languages but exposes no listing endpoint
//! through the broker, so a curated table stands in.

use serde::Serialize;

/// One selectable target language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
}

pub const SUPPORTED_LANGUAGES: &[Language] = &[
    Language { code: "en", name: "English" },
    Language { code: "es", name: "Spanish" },
    Language { code: "fr", name: "French" },
    Language { code: "de", name: "German" },
    Language { code: "it", name: "Italian" },
    Language { code: "pt", name: "Portuguese" },
    Language { code: "ru", name: "Russian" },
    Language { code: "ja", name: "Japanese" },
    Language { code: "ko", name: "Korean" },
    Language { code: "zh-Hans", name: "Chinese (Simplified)" },
    Language { code: "zh-Hant", name: "Chinese (Traditional)" },
    Language { code: "ar", name: "Arabic" },
    Language { code: "hi", name: "Hindi" },
    Language { code: "nl", name: "Dutch" },
    Language { code: "pl", name: "Polish" },
    Language { code: "tr", name: "Turkish" },
    Language { code: "vi", name: "Vietnamese" },
    Language { code: "th", name: "Thai" },
    Language { code: "id", name: "Indonesian" },
    Language { code: "cs", name: "Czech" },
    Language { code: "sv", name: "Swedish" },
    Language { code: "da", name: "Danish" },
    Language { code: "fi", name: "Finnish" },
    Language { code: "no", name: "Norwegian" },
    Language { code: "he", name: "Hebrew" },
    Language { code: "uk", name: "Ukrainian" },
    Language { code: "ro", name: "Romanian" },
    Language { code: "bg", name: "Bulgarian" },
    Language { code: "hr", name: "Croatian" },
    Language { code: "sk", name: "Slovak" },
    Language { code: "sl", name: "Slovenian" },
    Language { code: "el", name: "Greek" },
    Language { code: "hu", name: "Hungarian" },
];

pub fn is_supported(code: &str) -> bool {
    SUPPORTED_LANGUAGES.iter().any(|lang| lang.code == code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_contains_base_language() {
        assert!(is_supported("en"));
        assert!(is_supported("zh-Hans"));
        assert!(!is_supported("xx"));
    }

    #[test]
    fn codes_are_unique() {
        for (i, a) in SUPPORTED_LANGUAGES.iter().enumerate() {
            for b in &SUPPORTED_LANGUAGES[i + 1..] {
                assert_ne!(a.code, b.code);
            }
        }
    }
}
