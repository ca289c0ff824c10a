use once_cell::sync::Lazy;
use regex::Regex;

// Any run of whitespace, including newlines
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").expect("Invalid whitespace regex pattern")
});

static QUOTES_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[“”"’‘']"#).expect("Invalid quotes regex pattern")
});

static BRACKETS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[(){}\[\]]").expect("Invalid brackets regex pattern")
});

static DASHES_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\u{2013}\u{2014}]").expect("Invalid dashes regex pattern")
});

// Keeps numbers, roman numerals, dashes, slashes and ampersands
static SEARCH_NOISE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^A-Za-z0-9\-/&\s]").expect("Invalid search noise regex pattern")
});

/// Collapse runs of whitespace into a single space and trim the ends
pub fn normalize_whitespace(content: &str) -> String {
    WHITESPACE_RE.replace_all(content, " ").trim().to_string()
}

/// Clean a listing title into plain search terms
pub fn sanitize_title(title: &str) -> String {
    let result = normalize_whitespace(title);
    let result = QUOTES_RE.replace_all(&result, "\"");
    let result = BRACKETS_RE.replace_all(&result, " ");
    let result = DASHES_RE.replace_all(&result, "-");
    let result = SEARCH_NOISE_RE.replace_all(&result, " ");
    normalize_whitespace(&result)
}

/// Wrap non-blank text in double quotes for an exact-phrase search
pub fn quote(s: &str) -> String {
    let s = normalize_whitespace(s);
    if s.is_empty() {
        String::new()
    } else {
        format!("\"{}\"", s)
    }
}

/// Map color variants onto stable tokens ("grey" and "gray" must search alike)
pub fn normalize_color(color: &str) -> String {
    let lower = color.trim().to_lowercase();
    match lower.as_str() {
        "grey" => "gray".to_string(),
        "charcoal" => "dark gray".to_string(),
        "heather grey" | "heather grey/gray" => "heather gray".to_string(),
        _ => lower,
    }
}

fn canonical_material(material: &str) -> &str {
    match material {
        "elastane" => "spandex",
        other => other,
    }
}

/// Lowercase, alias and dedupe fabric names, keeping first-seen order
pub fn normalize_materials<S: AsRef<str>>(materials: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for raw in materials {
        let lower = raw.as_ref().trim().to_lowercase();
        let canonical = canonical_material(&lower);
        if canonical.is_empty() || out.iter().any(|m| m == canonical) {
            continue;
        }
        out.push(canonical.to_string());
    }
    out
}
