use std::sync::LazyLock;

use quick_xml::escape::unescape;
use regex::Regex;
use serde_json::Value;

static NEXT_DATA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<script[^>]+id="__NEXT_DATA__"[^>]*>(.*?)</script>"#).unwrap()
});
static PRELOADED_STATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)window\.__PRELOADED_STATE__\s*=\s*(\{.*?\})\s*;").unwrap());
static INITIAL_STATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)window\.__INITIAL_STATE__\s*=\s*(\{.*?\})\s*;").unwrap());
static DATA_TRACK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"data-track="(\{.*?\})""#).unwrap());

/// Scan raw HTML for embedded JSON and return every blob that parses:
/// the Next.js hydration script, global state assignments, and per-element
/// data-track attributes. Captures that fail to parse are skipped; non-greedy
/// brace matching over markup is allowed to produce truncated candidates.
pub fn locate_blobs(html: &str) -> Vec<Value> {
    let mut blobs = Vec::new();

    if let Some(caps) = NEXT_DATA_RE.captures(html) {
        let raw = decode_entities(&caps[1]);
        if let Ok(value) = serde_json::from_str(raw.trim()) {
            blobs.push(value);
        }
    }

    for re in [&*PRELOADED_STATE_RE, &*INITIAL_STATE_RE] {
        for caps in re.captures_iter(html) {
            if let Ok(value) = serde_json::from_str(&caps[1]) {
                blobs.push(value);
            }
        }
    }

    for caps in DATA_TRACK_RE.captures_iter(html) {
        let raw = decode_entities(&caps[1]);
        if let Ok(value) = serde_json::from_str(&raw) {
            blobs.push(value);
        }
    }

    blobs
}

/// Decode HTML entities in script/attribute content. Script bodies usually
/// carry raw JSON where a bare `&` makes unescaping fail; the raw capture is
/// used as-is in that case.
fn decode_entities(raw: &str) -> String {
    match unescape(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}

// ── Tests ──
