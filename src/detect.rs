//! Source-language detection via whatlang.
//! Advisory only: detection never alters the short-circuit rules, it exists
//! for callers that want to display the detected source language.

/// Detect the dominant language of `text`. Returns an ISO 639-1 code, or
/// None when detection is unreliable or the script is unmapped.
pub fn detect_language(text: &str) -> Option<String> {
    let info = whatlang::detect(text)?;
    if !info.is_reliable() {
        return None;
    }
    lang_to_code(info.lang()).map(str::to_owned)
}

fn lang_to_code(lang: whatlang::Lang) -> Option<&'static str> {
    use whatlang::Lang::*;
    let code = match lang {
        Eng => "en",
        Cmn => "zh",
        Jpn => "ja",
        Kor => "ko",
        Fra => "fr",
        Deu => "de",
        Spa => "es",
        Rus => "ru",
        Por => "pt",
        Ita => "it",
        Ara => "ar",
        Hin => "hi",
        Tur => "tr",
        Vie => "vi",
        Tha => "th",
        Nld => "nl",
        Pol => "pl",
        Ukr => "uk",
        _ => return None,
    };
    Some(code)
}
