use regex::Regex;
use std::sync::LazyLock;

/// Arabic combining marks: tanween, harakat, shadda, sukun, superscript alef and
/// the Quranic annotation signs.
static ARABIC_DIACRITICS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\u{064B}-\u{065F}\u{0670}\u{06D6}-\u{06ED}]").expect("valid diacritics pattern")
});

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Canonical form used for comparison: lowercase, diacritics removed,
/// whitespace runs collapsed to one space, trimmed.
///
/// Idempotent: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let lowered = text.to_lowercase();
    let stripped = ARABIC_DIACRITICS.replace_all(&lowered, "");
    let collapsed = WHITESPACE_RUN.replace_all(&stripped, " ");
    collapsed.trim().to_string()
}
