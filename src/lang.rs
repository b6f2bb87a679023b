//! Language detection heuristics and the speech-locale table.
//!
//! Detection never fails: every input maps to one of the supported ISO 639-1
//! codes, defaulting to "en".

/// Unicode block → language, scanned in order; the first character falling
/// into a recognized block decides the language.
const SCRIPT_RANGES: &[(u32, u32, &str)] = &[
    (0x0900, 0x097F, "hi"), // Devanagari
    (0x0980, 0x09FF, "bn"), // Bengali
    (0x0A80, 0x0AFF, "gu"), // Gujarati
    (0x0B00, 0x0B7F, "or"), // Odia
    (0x0B80, 0x0BFF, "ta"), // Tamil
    (0x0C00, 0x0C7F, "te"), // Telugu
    (0x0C80, 0x0CFF, "kn"), // Kannada
    (0x0D00, 0x0D7F, "ml"), // Malayalam
    (0x0600, 0x06FF, "ar"), // Arabic
    (0x0400, 0x04FF, "ru"), // Cyrillic
];

/// Detect the language of free text.
///
/// Order: empty input → "en"; first recognized script wins; otherwise an
/// ASCII-alphabetic majority means "en"; default "en". A statistical
/// identifier would slot in ahead of the script scan, filtered by the
/// supported-code set, but none is bundled.
pub fn detect(text: &str) -> &'static str {
    let text = text.trim();
    if text.is_empty() {
        return "en";
    }

    for ch in text.chars() {
        let o = ch as u32;
        for &(lo, hi, code) in SCRIPT_RANGES {
            if (lo..=hi).contains(&o) {
                return code;
            }
        }
    }

    let ascii_letters = text.chars().filter(|c| c.is_ascii_alphabetic()).count();
    if ascii_letters * 2 >= text.chars().count() {
        return "en";
    }

    "en"
}

/// Locale tag for speech synthesis of text in the given language.
pub fn speech_locale(lang_code: &str) -> &'static str {
    match lang_code {
        "hi" => "hi-IN",
        "or" => "or-IN",
        "bn" => "bn-IN",
        "te" => "te-IN",
        "ta" => "ta-IN",
        "kn" => "kn-IN",
        "ml" => "ml-IN",
        "gu" => "gu-IN",
        "ar" => "ar-SA",
        "ru" => "ru-RU",
        "es" => "es-ES",
        _ => "en-US",
    }
}
