use serde_json::{Map, Value};

use super::{ARTIST_KEYS, MIX_KEYS, NAME_KEYS};

/// Key-presence heuristic: a mapping looks like a track when it carries a
/// name key plus at least one other track attribute. False positives are
/// cheap (empty-title records are dropped downstream); false negatives just
/// mean a record is missed.
pub fn is_track_like(map: &Map<String, Value>) -> bool {
    NAME_KEYS.iter().any(|k| map.contains_key(*k))
        && (ARTIST_KEYS.iter().any(|k| map.contains_key(*k))
            || MIX_KEYS.iter().any(|k| map.contains_key(*k))
            || map.contains_key("bpm"))
}

/// Collect every candidate track record nested anywhere inside `value`.
///
/// Walks an explicit stack: hydration payloads nest arbitrarily deep, so the
/// traversal must not ride the native call stack. A `tracks` array is a
/// trusted collection key and every mapping element of it is collected
/// unconditionally; independently, any visited mapping passing the classifier
/// is collected too. Both can fire on the same node, and children are always
/// explored regardless.
pub fn collect_tracks(value: &Value) -> Vec<Map<String, Value>> {
    let mut tracks = Vec::new();
    let mut stack = vec![value];

    while let Some(current) = stack.pop() {
        if let Value::Object(map) = current {
            if let Some(Value::Array(items)) = map.get("tracks") {
                for item in items {
                    if let Value::Object(track) = item {
                        tracks.push(track.clone());
                    }
                }
            }
            if is_track_like(map) {
                tracks.push(map.clone());
            }
        }
        match current {
            Value::Object(map) => stack.extend(map.values()),
            Value::Array(items) => stack.extend(items.iter()),
            _ => {}
        }
    }

    tracks
}

// ── Tests ──
