use serde::Serialize;
use serde_json::{Map, Value};

use super::{ARTIST_KEYS, GENRE_KEYS, IMAGE_KEYS, LABEL_KEYS, MIX_KEYS, NAME_KEYS};

const TEMPO_KEYS: &[&str] = &["bpm", "bpm_value", "tempo"];
const KEY_KEYS: &[&str] = &["key", "key_name"];

/// Fixed output schema. Field order is the serialized key order; empty string
/// is the no-data sentinel for every field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalTrack {
    pub song_name: String,
    pub artist_name: String,
    pub label_name: String,
    pub genre: String,
    pub bpm_key: String,
    pub album_art: String,
}

/// Whether `bpm_key` is formatted from tempo/key fields or always left empty
/// (the legacy output shape).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BpmKeyMode {
    #[default]
    Formatted,
    Omitted,
}

/// Map one raw record into the canonical schema. Total: unrecognized or
/// missing source data degrades to empty strings, never to an error.
pub fn normalize_track(track: &Map<String, Value>, mode: BpmKeyMode) -> CanonicalTrack {
    let title = find_first(track, NAME_KEYS).map(value_text).unwrap_or_default();
    let mix_name = find_first(track, MIX_KEYS).map(unwrap_name).unwrap_or_default();

    let artists = normalize_artist_list(find_first(track, ARTIST_KEYS));
    let remixers = normalize_artist_list(track.get("remixers"));

    let mut title_parts = vec![title.trim().to_string()];
    let mix_text = mix_name.trim();
    if !mix_text.is_empty()
        && !matches!(mix_text.to_lowercase().as_str(), "original mix" | "original")
    {
        title_parts.push(mix_text.to_string());
    }
    if !remixers.is_empty() && mix_text.is_empty() {
        title_parts.push(format!("{} Remix", remixers.join(", ")));
    }
    let song_name = title_parts
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string();

    let bpm_key = match mode {
        BpmKeyMode::Formatted => normalize_bpm_key(track),
        BpmKeyMode::Omitted => String::new(),
    };

    CanonicalTrack {
        song_name,
        artist_name: artists.join(", "),
        label_name: normalize_label(find_first(track, LABEL_KEYS), &remixers),
        genre: normalize_genre(find_first(track, GENRE_KEYS)),
        bpm_key,
        album_art: normalize_image(find_first(track, IMAGE_KEYS)),
    }
}

/// Deterministic first-match-wins lookup over an ordered candidate key list.
fn find_first<'a>(track: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| track.get(*key))
}

/// Scalar display text; mappings and sequences have no direct text form.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// A `{"name": …}` mapping unwraps to the name; scalars pass through.
fn unwrap_name(value: &Value) -> String {
    match value {
        Value::Object(map) => map.get("name").map(value_text).unwrap_or_default(),
        other => value_text(other),
    }
}

/// Artist-list rule: a sequence takes each element's `name` (mapping) or the
/// element itself (string); a single `{"name": …}` mapping or a bare string
/// is a one-element list; anything else is empty.
fn normalize_artist_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|entry| match entry {
                Value::Object(map) => map.get("name").map(value_text),
                Value::String(s) => Some(s.clone()),
                _ => None,
            })
            .collect(),
        Some(Value::Object(map)) if map.contains_key("name") => {
            vec![map.get("name").map(value_text).unwrap_or_default()]
        }
        Some(Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}

fn normalize_label(value: Option<&Value>, remixers: &[String]) -> String {
    match value {
        Some(Value::Object(map)) if map.contains_key("name") => {
            map.get("name").map(value_text).unwrap_or_default()
        }
        Some(Value::String(s)) => s.clone(),
        _ if !remixers.is_empty() => remixers.join(", "),
        _ => String::new(),
    }
}

fn normalize_genre(value: Option<&Value>) -> String {
    match value {
        Some(Value::Object(map)) => map
            .get("name")
            .or_else(|| map.get("slug"))
            .map(value_text)
            .unwrap_or_default(),
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

/// Tempo/key summary: `"<tempo> bpm"` and the musical key, joined with ", ".
fn normalize_bpm_key(track: &Map<String, Value>) -> String {
    let tempo = TEMPO_KEYS
        .iter()
        .filter_map(|key| track.get(*key))
        .find(|value| is_truthy(value))
        .map(value_text);
    let key = KEY_KEYS
        .iter()
        .filter_map(|key| track.get(*key))
        .map(unwrap_name)
        .find(|text| !text.is_empty());

    let mut parts = Vec::new();
    if let Some(tempo) = tempo {
        parts.push(format!("{} bpm", tempo));
    }
    if let Some(key) = key {
        parts.push(key);
    }
    parts.join(", ")
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Album art: strings pass through; mappings prefer `uri` then `url`, else the
/// first http-looking string value; sequences take the first non-empty result.
fn normalize_image(value: Option<&Value>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => {
            for key in ["uri", "url"] {
                if let Some(v) = map.get(key) {
                    return value_text(v);
                }
            }
            map.values()
                .find_map(|v| match v {
                    Value::String(s) if s.starts_with("http") => Some(s.clone()),
                    _ => None,
                })
                .unwrap_or_default()
        }
        Value::Array(items) => items
            .iter()
            .map(|item| normalize_image(Some(item)))
            .find(|result| !result.is_empty())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn track(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    fn normalize(value: Value) -> CanonicalTrack {
        normalize_track(&track(value), BpmKeyMode::Formatted)
    }

    #[test]
    fn original_mix_suppressed() {
        let t = normalize(json!({"name": "Strobe", "mix": "Original Mix"}));
        assert_eq!(t.song_name, "Strobe");
    }

    #[test]
    fn original_suppressed_case_insensitive() {
        let t = normalize(json!({"name": "Strobe", "mix": "ORIGINAL"}));
        assert_eq!(t.song_name, "Strobe");
    }

    #[test]
    fn named_mix_appended() {
        let t = normalize(json!({"name": "Strobe", "mix": "Club Mix"}));
        assert_eq!(t.song_name, "Strobe Club Mix");
    }

    #[test]
    fn mix_object_unwrapped() {
        let t = normalize(json!({"name": "Strobe", "mixName": {"name": "Extended Mix"}}));
        assert_eq!(t.song_name, "Strobe Extended Mix");
    }

    #[test]
    fn remixers_appended_when_no_mix() {
        let t = normalize(json!({"name": "Strobe", "remixers": [{"name": "DJ X"}]}));
        assert_eq!(t.song_name, "Strobe DJ X Remix");
    }

    #[test]
    fn remixers_ignored_when_mix_present() {
        let t = normalize(json!({
            "name": "Strobe",
            "mix": "Dub Mix",
            "remixers": [{"name": "DJ X"}]
        }));
        assert_eq!(t.song_name, "Strobe Dub Mix");
    }

    #[test]
    fn artist_object_list_joined() {
        let t = normalize(json!({"name": "S", "artists": [{"name": "A"}, {"name": "B"}]}));
        assert_eq!(t.artist_name, "A, B");
    }

    #[test]
    fn artist_bare_string() {
        let t = normalize(json!({"name": "S", "artists": "Solo Artist"}));
        assert_eq!(t.artist_name, "Solo Artist");
    }

    #[test]
    fn artist_mixed_list() {
        let t = normalize(json!({"name": "S", "artists": [{"name": "A"}, "B", 7]}));
        assert_eq!(t.artist_name, "A, B");
    }

    #[test]
    fn artist_single_object() {
        let t = normalize(json!({"name": "S", "artist": {"name": "deadmau5"}}));
        assert_eq!(t.artist_name, "deadmau5");
    }

    #[test]
    fn label_object_name() {
        let t = normalize(json!({"name": "S", "bpm": 1, "label": {"name": "mau5trap"}}));
        assert_eq!(t.label_name, "mau5trap");
    }

    #[test]
    fn label_falls_back_to_remixers() {
        let t = normalize(json!({"name": "S", "bpm": 1, "remixers": ["DJ X", "DJ Y"]}));
        assert_eq!(t.label_name, "DJ X, DJ Y");
    }

    #[test]
    fn genre_object_prefers_name_then_slug() {
        let t = normalize(json!({"name": "S", "bpm": 1, "genre": {"slug": "tech-house"}}));
        assert_eq!(t.genre, "tech-house");
        let t = normalize(json!({"name": "S", "bpm": 1, "genre": {"name": "Techno", "slug": "techno"}}));
        assert_eq!(t.genre, "Techno");
    }

    #[test]
    fn bpm_and_key_formatted() {
        let t = normalize(json!({"name": "S", "artist": "A", "bpm": 128, "key": "8A"}));
        assert_eq!(t.bpm_key, "128 bpm, 8A");
    }

    #[test]
    fn key_object_unwrapped() {
        let t = normalize(json!({"name": "S", "bpm": 126, "key": {"name": "Ab Minor"}}));
        assert_eq!(t.bpm_key, "126 bpm, Ab Minor");
    }

    #[test]
    fn key_only() {
        let t = normalize(json!({"name": "S", "artist": "A", "key_name": "5B"}));
        assert_eq!(t.bpm_key, "5B");
    }

    #[test]
    fn zero_bpm_not_truthy() {
        let t = normalize(json!({"name": "S", "artist": "A", "bpm": 0, "tempo": 124}));
        assert_eq!(t.bpm_key, "124 bpm");
    }

    #[test]
    fn bpm_key_omitted_mode() {
        let t = normalize_track(
            &track(json!({"name": "S", "bpm": 128, "key": "8A"})),
            BpmKeyMode::Omitted,
        );
        assert_eq!(t.bpm_key, "");
    }

    #[test]
    fn image_string() {
        let t = normalize(json!({"name": "S", "bpm": 1, "image": "http://img/a.jpg"}));
        assert_eq!(t.album_art, "http://img/a.jpg");
    }

    #[test]
    fn image_object_uri_preferred() {
        let t = normalize(json!({
            "name": "S", "bpm": 1,
            "image": {"uri": "http://img/uri.jpg", "url": "http://img/url.jpg"}
        }));
        assert_eq!(t.album_art, "http://img/uri.jpg");
    }

    #[test]
    fn image_object_scans_for_http_value() {
        let t = normalize(json!({
            "name": "S", "bpm": 1,
            "image": {"id": 9, "dynamic": "http://img/d.jpg"}
        }));
        assert_eq!(t.album_art, "http://img/d.jpg");
    }

    #[test]
    fn image_list_first_nonempty() {
        let t = normalize(json!({
            "name": "S", "bpm": 1,
            "images": [{"id": 1}, {"url": "http://img/b.jpg"}]
        }));
        assert_eq!(t.album_art, "http://img/b.jpg");
    }

    #[test]
    fn missing_everything_degrades_to_empty() {
        let t = normalize(json!({"unrelated": true}));
        assert_eq!(
            t,
            CanonicalTrack {
                song_name: String::new(),
                artist_name: String::new(),
                label_name: String::new(),
                genre: String::new(),
                bpm_key: String::new(),
                album_art: String::new(),
            }
        );
    }

    #[test]
    fn numeric_title_rendered() {
        let t = normalize(json!({"name": 1998, "artists": ["Binary Finary"]}));
        assert_eq!(t.song_name, "1998");
    }

    #[test]
    fn normalization_is_idempotent_per_record() {
        let record = track(json!({
            "name": "Strobe",
            "mix": "Club Mix",
            "artists": [{"name": "deadmau5"}],
            "label": {"name": "mau5trap"},
            "bpm": 128,
            "key": "8A"
        }));
        let first = normalize_track(&record, BpmKeyMode::Formatted);
        let second = normalize_track(&record, BpmKeyMode::Formatted);
        assert_eq!(first, second);
    }
}
