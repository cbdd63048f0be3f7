//! ISO 639 language code display names

/// (ISO 639-1, ISO 639-2, English name)
const LANGUAGES: [(&str, &str, &str); 32] = [
    ("ar", "ara", "Arabic"),
    ("bg", "bul", "Bulgarian"),
    ("ca", "cat", "Catalan"),
    ("cs", "ces", "Czech"),
    ("da", "dan", "Danish"),
    ("de", "deu", "German"),
    ("el", "ell", "Greek"),
    ("en", "eng", "English"),
    ("es", "spa", "Spanish"),
    ("et", "est", "Estonian"),
    ("fi", "fin", "Finnish"),
    ("fr", "fra", "French"),
    ("ga", "gle", "Irish"),
    ("he", "heb", "Hebrew"),
    ("hi", "hin", "Hindi"),
    ("hu", "hun", "Hungarian"),
    ("is", "isl", "Icelandic"),
    ("it", "ita", "Italian"),
    ("ja", "jpn", "Japanese"),
    ("ko", "kor", "Korean"),
    ("la", "lat", "Latin"),
    ("nl", "nld", "Dutch"),
    ("no", "nor", "Norwegian"),
    ("pl", "pol", "Polish"),
    ("pt", "por", "Portuguese"),
    ("ro", "ron", "Romanian"),
    ("ru", "rus", "Russian"),
    ("sv", "swe", "Swedish"),
    ("tr", "tur", "Turkish"),
    ("uk", "ukr", "Ukrainian"),
    ("yo", "yor", "Yoruba"),
    ("zh", "zho", "Chinese"),
];

/// Bibliographic ISO 639-2 codes that differ from the terminology ones
const BIBLIOGRAPHIC: [(&str, &str); 7] = [
    ("cze", "ces"),
    ("ger", "deu"),
    ("gre", "ell"),
    ("fre", "fra"),
    ("ice", "isl"),
    ("dut", "nld"),
    ("chi", "zho"),
];

/// Display name for a language code, case-insensitive; `None` if unknown
pub fn language_name(code: &str) -> Option<&'static str> {
    let code = code.trim().to_ascii_lowercase();
    let code = BIBLIOGRAPHIC
        .iter()
        .find(|(b, _)| *b == code)
        .map(|(_, t)| t.to_string())
        .unwrap_or(code);

    LANGUAGES
        .iter()
        .find(|(two, three, _)| *two == code || *three == code)
        .map(|(_, _, name)| *name)
}
