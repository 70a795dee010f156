//! Name normalization for label ids and entity slugs.

use regex::Regex;
use std::sync::OnceLock;
use unicode_segmentation::UnicodeSegmentation;

static HYPHEN_RUNS: OnceLock<Regex> = OnceLock::new();

fn hyphen_runs() -> &'static Regex {
    HYPHEN_RUNS.get_or_init(|| Regex::new(r"-+").unwrap())
}

/// Fold a display name into a canonical identifier
///
/// Rules:
/// - Lowercase
/// - Fold accented latin letters to ASCII (umlauts become two letters)
/// - Replace whitespace, punctuation and symbols with hyphens
/// - Keep other alphabetic characters as they are, together with their
///   vowel signs and other marks
/// - Collapse multiple hyphens and trim them from both ends
///
/// Names that fold to the same identifier denote the same label.
///
/// # Examples
///
/// ```
/// use venuedir_core::normalize;
///
/// assert_eq!(normalize("Yoga "), "yoga");
/// assert_eq!(normalize("Kraft & Ausdauer"), "kraft-ausdauer");
/// assert_eq!(normalize("Müller Sportpark"), "mueller-sportpark");
/// assert_eq!(normalize(&normalize("Café Bleu")), normalize("Café Bleu"));
/// ```
pub fn normalize(input: &str) -> String {
    let lowercased = input.to_lowercase();

    let mut folded = String::with_capacity(lowercased.len());
    for grapheme in lowercased.graphemes(true) {
        fold_grapheme(grapheme, &mut folded);
    }

    let collapsed = hyphen_runs().replace_all(&folded, "-");
    collapsed.trim_matches('-').to_string()
}

fn fold_grapheme(grapheme: &str, out: &mut String) {
    let mut chars = grapheme.chars();
    let Some(base) = chars.next() else {
        return;
    };
    let marks: Vec<char> = chars.collect();

    // A mark with nothing to attach to (start of input, after a control char)
    if is_extending(base) {
        return;
    }

    if marks.is_empty() {
        push_char(base, out);
        return;
    }

    // Decomposed latin letter: base followed by combining accents
    let latin_base = base.is_ascii_alphabetic() || fold_latin(base).is_some();
    if latin_base && marks.iter().all(|&m| is_combining_mark(m)) {
        if marks.contains(&'\u{308}') && matches!(base, 'a' | 'o' | 'u') {
            out.push(base);
            out.push('e');
            return;
        }
        push_char(base, out);
        return;
    }

    // Vowel signs and other marks belong to the letter they follow
    if base.is_alphabetic() {
        out.push_str(grapheme);
    } else {
        push_char(base, out);
    }
}

/// Whether `c` attaches to the preceding character instead of starting a grapheme
fn is_extending(c: char) -> bool {
    let mut pair = String::from("a");
    pair.push(c);
    pair.graphemes(true).count() == 1
}

fn push_char(c: char, out: &mut String) {
    if c.is_ascii_alphanumeric() {
        out.push(c);
    } else if let Some(ascii) = fold_latin(c) {
        out.push_str(ascii);
    } else if c.is_alphabetic() {
        out.push(c);
    } else {
        out.push('-');
    }
}

fn is_combining_mark(c: char) -> bool {
    matches!(c, '\u{300}'..='\u{36f}' | '\u{1ab0}'..='\u{1aff}' | '\u{1dc0}'..='\u{1dff}')
}

fn fold_latin(c: char) -> Option<&'static str> {
    let folded = match c {
        'ä' | 'æ' => "ae",
        'ö' | 'œ' => "oe",
        'ü' => "ue",
        'ß' => "ss",
        'à' | 'á' | 'â' | 'ã' | 'å' | 'ā' | 'ą' | 'ă' => "a",
        'ç' | 'ć' | 'č' | 'ĉ' => "c",
        'ď' | 'đ' | 'ð' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ę' | 'ě' | 'ė' => "e",
        'ğ' | 'ĝ' => "g",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'ı' | 'į' => "i",
        'ł' | 'ľ' | 'ĺ' => "l",
        'ñ' | 'ń' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ø' | 'ō' | 'ő' => "o",
        'ř' | 'ŕ' => "r",
        'ś' | 'š' | 'ş' | 'ș' => "s",
        'ť' | 'ţ' | 'ț' => "t",
        'ù' | 'ú' | 'û' | 'ū' | 'ů' | 'ű' | 'ų' => "u",
        'ý' | 'ÿ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        'þ' => "th",
        _ => return None,
    };
    Some(folded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_normalize() {
        assert_eq!(normalize("Hello World"), "hello-world");
        assert_eq!(normalize("Fitness Studio"), "fitness-studio");
    }

    #[test]
    fn test_case_and_spacing_merge() {
        assert_eq!(normalize("Yoga"), normalize("yoga "));
        assert_eq!(normalize("  GYM\t"), "gym");
        assert_eq!(normalize("Bouldern  Halle"), "bouldern-halle");
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(normalize("Kraft & Ausdauer"), "kraft-ausdauer");
        assert_eq!(normalize("Cross-Fit!"), "cross-fit");
        assert_eq!(normalize("under_score"), "under-score");
        assert_eq!(normalize("Dr. Med's Praxis"), "dr-med-s-praxis");
    }

    #[test]
    fn test_diacritics_folded() {
        assert_eq!(normalize("Müller"), "mueller");
        assert_eq!(normalize("Straße"), "strasse");
        assert_eq!(normalize("Café"), "cafe");
        assert_eq!(normalize("Øresund"), "oresund");
    }

    #[test]
    fn test_decomposed_matches_precomposed() {
        assert_eq!(normalize("Mu\u{308}ller"), normalize("Müller"));
        assert_eq!(normalize("Cafe\u{301}"), normalize("Café"));
    }

    #[test]
    fn test_other_scripts_kept() {
        assert_eq!(normalize("Спорт Зал"), "спорт-зал");
    }

    #[test]
    fn test_marks_stay_with_their_letter() {
        assert_eq!(normalize("योग"), "योग");
        assert_eq!(normalize("याग"), "याग");
        assert_ne!(normalize("योग"), normalize("याग"));
        assert_eq!(normalize("योगा Studio"), "योगा-studio");
        assert_eq!(normalize("की"), "की");
        assert_eq!(normalize("مَركز"), "مَركز");
        assert_eq!(normalize("กีฬา"), "กีฬา");
    }

    #[test]
    fn test_stray_marks_dropped() {
        assert_eq!(normalize("a\n\u{345}"), "a");
        assert_eq!(normalize("\u{301}Yoga"), "yoga");
        assert_eq!(normalize("\u{93e}"), "");
    }

    #[test]
    fn test_empty_and_symbols_only() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("!!!"), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "Hello World",
            "  Yoga & Pilates ",
            "Müller-Thurgau",
            "Über 50",
            "A\u{308}rzte",
            "Спорт Зал",
            "İstanbul Gym",
            "--x--y--",
            "ǅemal",
            "a\n\u{345}",
            "\u{93e}योग",
            "योगा",
            "مَركز",
            "กีฬา",
            "\tи\u{306}",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {sample:?}");
        }
    }
}
