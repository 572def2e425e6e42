//! Slug normalisation.
//!
//! Storage-free half of unique identifier generation: turning a display
//! name into a URL-safe base slug and deriving suffixed candidates from it.
//! Probing storage for a free candidate lives in the backend.

/// Slug used when a name has no characters that survive normalisation
pub const FALLBACK_SLUG: &str = "asset";

/// Longest base slug produced, leaving room for a numeric suffix
pub const MAX_SLUG_LENGTH: usize = 120;

/// Normalise a display name into a lowercase slug.
///
/// The result only contains `[a-z0-9-]`, never starts or ends with a
/// hyphen and never contains two hyphens in a row. Common Latin letters
/// with diacritics are folded to ASCII; everything else that is not an
/// ASCII letter or digit acts as a separator.
///
/// ```
/// use assetreg_common::slugify;
///
/// assert_eq!(slugify("  Dell Latitude 7490 (Office #2) "), "dell-latitude-7490-office-2");
/// assert_eq!(slugify("Crème Brûlée"), "creme-brulee");
/// assert_eq!(slugify("!!!"), "asset");
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    // Starts true so leading separators are dropped.
    let mut pending_separator = true;

    for c in name.chars().flat_map(char::to_lowercase) {
        match fold(c) {
            Some(ascii) => {
                if pending_separator && !slug.is_empty() {
                    slug.push('-');
                }
                pending_separator = false;
                slug.push_str(ascii);
            },
            None if c.is_ascii_alphanumeric() => {
                if pending_separator && !slug.is_empty() {
                    slug.push('-');
                }
                pending_separator = false;
                slug.push(c);
            },
            None => pending_separator = true,
        }
    }

    if slug.is_empty() {
        return FALLBACK_SLUG.to_string();
    }

    truncate(slug)
}

/// The `attempt`-th candidate for `base`: the base itself, then `base-1`,
/// `base-2` and so on.
pub fn candidate(base: &str, attempt: u32) -> String {
    if attempt == 0 {
        base.to_string()
    } else {
        format!("{base}-{attempt}")
    }
}

fn truncate(slug: String) -> String {
    if slug.len() <= MAX_SLUG_LENGTH {
        return slug;
    }

    // Slugs are pure ASCII at this point, so byte offsets are char offsets.
    let head = &slug[..MAX_SLUG_LENGTH];
    let cut_mid_word = slug.as_bytes()[MAX_SLUG_LENGTH] != b'-';
    let head = match head.rfind('-') {
        Some(pos) if cut_mid_word => &head[..pos],
        _ => head,
    };
    head.trim_end_matches('-').to_string()
}

fn fold(c: char) -> Option<&'static str> {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'ç' | 'ć' | 'č' => "c",
        'ď' | 'đ' | 'ð' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => "e",
        'ğ' => "g",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' | 'ı' => "i",
        'ł' | 'ľ' => "l",
        'ñ' | 'ń' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => "o",
        'ř' => "r",
        'ś' | 'š' | 'ş' => "s",
        'ť' | 'ţ' => "t",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' => "u",
        'ý' | 'ÿ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        'ß' => "ss",
        'æ' => "ae",
        'œ' => "oe",
        'þ' => "th",
        _ => return None,
    };
    Some(folded)
}
