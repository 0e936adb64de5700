//! Public rule identity derivation.
//!
//! Rule ids are derived, not stored: `federal:<domain>:<slug>`,
//! `state:<ST>:<slug>`, or `city:<City>,<ST>:<slug>`. The derivation is a
//! pure function of jurisdiction, title, category, and the profile's primary
//! state, so the same catalog always yields the same ids.

/// Ordered acronym table for federal domain detection. Scanned top to
/// bottom against the lowercased title; the first needle found wins, so
/// more specific needles must precede substrings of themselves.
const DOMAIN_HINTS: &[(&str, &str)] = &[
    ("osha", "osha"),
    ("hipaa", "hipaa"),
    ("ccpa", "ccpa"),
    ("vcdpa", "vcdpa"),
    ("eeo-1", "eeoc"),
    ("eeo1", "eeoc"),
    ("fmla", "fmla"),
    ("cobra", "cobra"),
    ("warn", "warn"),
    ("ada", "ada"),
    ("coppa", "coppa"),
    ("pci", "pci"),
    ("bipa", "bipa"),
];

/// Collapses text to a stable slug: lowercase, with every run of
/// non-alphanumeric characters (including non-ASCII) reduced to a single
/// underscore and no leading or trailing underscore.
pub fn slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_separator = false;
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !out.is_empty() {
                out.push('_');
            }
            pending_separator = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }
    out
}

fn federal_domain(title: &str, category: Option<&str>) -> String {
    let haystack = title.to_ascii_lowercase();
    for (needle, domain) in DOMAIN_HINTS {
        if haystack.contains(needle) {
            return (*domain).to_string();
        }
    }
    match category {
        Some(category) if !category.is_empty() => slug(category),
        _ => "general".to_string(),
    }
}

fn strip_prefix_ci<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&text[prefix.len()..])
    } else {
        None
    }
}

/// Derives the public rule identifier.
///
/// * `federal` titles are grouped by detected domain.
/// * `state:XX` keeps the (uppercased) code; an empty code falls back to
///   the profile's primary state, then to `US`.
/// * `city:<rest>` parses `ST-City` (dash takes priority) or `City,ST`
///   into the canonical `city:<City>,<ST>` form.
/// * Anything else falls back to the state form with the primary state.
pub fn public_rule_id(
    jurisdiction: &str,
    title: &str,
    category: Option<&str>,
    primary_state: Option<&str>,
) -> String {
    let title_slug = slug(title);
    let fallback_state = primary_state
        .map(str::to_ascii_uppercase)
        .filter(|state| !state.is_empty())
        .unwrap_or_else(|| "US".to_string());

    let jurisdiction = jurisdiction.trim();

    if jurisdiction.eq_ignore_ascii_case("federal") {
        return format!(
            "federal:{}:{}",
            federal_domain(title, category),
            title_slug
        );
    }

    if let Some(code) = strip_prefix_ci(jurisdiction, "state:") {
        let state = if code.is_empty() {
            fallback_state
        } else {
            code.to_ascii_uppercase()
        };
        return format!("state:{}:{}", state, title_slug);
    }

    if let Some(rest) = strip_prefix_ci(jurisdiction, "city:") {
        let mut city = rest.to_string();
        let mut state = fallback_state;
        if let Some((left, right)) = rest.split_once('-') {
            state = left.to_ascii_uppercase();
            city = right.to_string();
        } else if let Some((left, right)) = rest.split_once(',') {
            city = left.trim().to_string();
            state = right.trim().to_ascii_uppercase();
        }
        return format!("city:{},{}:{}", city, state, title_slug);
    }

    format!("state:{}:{}", fallback_state, title_slug)
}
