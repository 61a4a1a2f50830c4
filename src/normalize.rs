//! Language-code and response-shape normalization.
//! Vendor APIs reject or mishandle regional subtags, so codes are reduced to
//! their primary tag before a request is built. Vendor responses are
//! polymorphic over a handful of known shapes; an ordered list of structural
//! matchers reduces them all to a plain string.

use serde_json::Value;

/// Strip the regional subtag from a language code: "zh-Hans" -> "zh",
/// "pt-BR" -> "pt". Codes without a subtag pass through unchanged.
pub fn normalize_lang(code: &str) -> &str {
    code.split('-').next().unwrap_or(code)
}

/// Reduce a raw vendor response body to the translated string.
/// A body that fails to parse as JSON is itself the translation when
/// non-empty (some vendors return bare text). Returns None when no known
/// shape matches; the caller logs the shape and falls back to the original.
pub fn extract_translation(body: &str) -> Option<String> {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                return None;
            }
            return Some(trimmed.to_string());
        }
    };
    extract_from_value(&value)
}

type ShapeMatcher = fn(&Value) -> Option<String>;

/// Known shapes in priority order; first structural match wins. An empty
/// string is treated as no match so a vacuous field cannot shadow a later
/// shape or mask the fallback.
const SHAPE_MATCHERS: &[ShapeMatcher] = &[
    match_bare_string,
    match_deep_translate_keyed,
    match_deep_translate_listed,
    match_translated_text,
    match_text,
    match_result,
    match_translation,
    match_translated_text_snake,
    match_data_translated_text,
    match_data_text,
    match_array,
];

pub fn extract_from_value(value: &Value) -> Option<String> {
    for matcher in SHAPE_MATCHERS {
        if let Some(translated) = matcher(value) {
            if !translated.is_empty() {
                return Some(translated);
            }
        }
    }
    None
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key)?.as_str().map(str::to_owned)
}

fn match_bare_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_owned)
}

/// Deep Translate: { data: { translations: { translatedText: ["..."] } } }
fn match_deep_translate_keyed(value: &Value) -> Option<String> {
    value
        .get("data")?
        .get("translations")?
        .get("translatedText")?
        .as_array()?
        .first()?
        .as_str()
        .map(str::to_owned)
}

/// Alternative Deep Translate: { data: { translations: [{ translatedText }] } }
fn match_deep_translate_listed(value: &Value) -> Option<String> {
    value
        .get("data")?
        .get("translations")?
        .as_array()?
        .first()
        .and_then(|entry| string_field(entry, "translatedText"))
}

fn match_translated_text(value: &Value) -> Option<String> {
    string_field(value, "translatedText")
}

fn match_text(value: &Value) -> Option<String> {
    string_field(value, "text")
}

fn match_result(value: &Value) -> Option<String> {
    string_field(value, "result")
}

fn match_translation(value: &Value) -> Option<String> {
    string_field(value, "translation")
}

fn match_translated_text_snake(value: &Value) -> Option<String> {
    string_field(value, "translated_text")
}

fn match_data_translated_text(value: &Value) -> Option<String> {
    string_field(value.get("data")?, "translatedText")
}

fn match_data_text(value: &Value) -> Option<String> {
    string_field(value.get("data")?, "text")
}

/// Array of strings, or array of { text } / { translatedText } objects.
fn match_array(value: &Value) -> Option<String> {
    let first = value.as_array()?.first()?;
    if let Some(s) = first.as_str() {
        return Some(s.to_owned());
    }
    string_field(first, "text").or_else(|| string_field(first, "translatedText"))
}
