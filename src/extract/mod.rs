pub mod blobs;
pub mod collect;
pub mod normalize;

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

pub use normalize::{BpmKeyMode, CanonicalTrack};

/// Candidate key names per logical field, in lookup priority order.
pub(crate) const NAME_KEYS: &[&str] = &["name", "title", "track_name", "trackName"];
pub(crate) const ARTIST_KEYS: &[&str] = &["artists", "artist", "artist_name", "artistName"];
pub(crate) const MIX_KEYS: &[&str] = &["mixName", "mix_name", "mix"];
pub(crate) const LABEL_KEYS: &[&str] = &["label", "labelName", "label_name"];
pub(crate) const GENRE_KEYS: &[&str] = &["genre", "genreName", "primaryGenre"];
pub(crate) const IMAGE_KEYS: &[&str] = &["image", "images", "artwork", "album_art", "albumArt"];

const PLAYLIST_NAME_KEYS: &[&str] = &["name", "title", "playlistName", "playlist_name"];

static TITLE_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<title[^>]*>([^<]+)</title>").unwrap());
static TITLE_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*[-|]\s*Beatport\s*$").unwrap());

/// Full pipeline over one page source: locate blobs, collect candidate
/// records, normalize, deduplicate on (song, artist, label) keeping the first
/// occurrence, drop empty-titled records. Never fails; unparseable input
/// yields an empty playlist.
pub fn extract_playlist(html: &str, mode: BpmKeyMode) -> Vec<CanonicalTrack> {
    extract_playlist_pages(&[html], mode)
}

/// Same pipeline over several page sources of one playlist, deduplicating
/// globally so tracks repeated across pages appear once, first page wins.
pub fn extract_playlist_pages<S: AsRef<str>>(pages: &[S], mode: BpmKeyMode) -> Vec<CanonicalTrack> {
    let mut candidates = Vec::new();
    for page in pages {
        for blob in blobs::locate_blobs(page.as_ref()) {
            candidates.extend(collect::collect_tracks(&blob));
        }
    }

    let mut seen = HashSet::new();
    let mut playlist = Vec::new();
    for candidate in &candidates {
        let track = normalize::normalize_track(candidate, mode);
        let key = (
            track.song_name.clone(),
            track.artist_name.clone(),
            track.label_name.clone(),
        );
        if !seen.insert(key) {
            continue;
        }
        if track.song_name.is_empty() {
            continue;
        }
        playlist.push(track);
    }

    playlist
}

/// Best-effort playlist title for output file naming: first plausible name
/// string in the embedded state (track-sized "… Mix" strings are skipped),
/// falling back to the page <title> minus its site suffix.
pub fn extract_playlist_name(html: &str) -> String {
    for blob in blobs::locate_blobs(html) {
        let mut stack = vec![&blob];
        while let Some(current) = stack.pop() {
            if let Value::Object(map) = current {
                for key in PLAYLIST_NAME_KEYS {
                    if let Some(Value::String(value)) = map.get(*key) {
                        if !value.is_empty()
                            && (!value.to_lowercase().contains("mix") || value.len() > 15)
                        {
                            return value.clone();
                        }
                    }
                }
            }
            match current {
                Value::Object(map) => stack.extend(map.values()),
                Value::Array(items) => stack.extend(items.iter()),
                _ => {}
            }
        }
    }

    if let Some(caps) = TITLE_TAG_RE.captures(html) {
        let title = TITLE_SUFFIX_RE.replace(caps[1].trim(), "").trim().to_string();
        if !title.is_empty() {
            return title;
        }
    }

    "playlist".to_string()
}

/// Pagination window advertised by the hydration payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    pub results: usize,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub has_next: bool,
}

/// Inspect `props.pageProps.dehydratedState.queries[*].state.data` for the
/// first query carrying a `results` array. Drives the pagination loop; pages
/// without a hydration payload report no window.
pub fn hydrated_page_window(html: &str) -> Option<PageWindow> {
    for blob in blobs::locate_blobs(html) {
        let Some(queries) = blob
            .pointer("/props/pageProps/dehydratedState/queries")
            .and_then(Value::as_array)
        else {
            continue;
        };
        for query in queries {
            let Some(data) = query.pointer("/state/data") else {
                continue;
            };
            let Some(results) = data.get("results").and_then(Value::as_array) else {
                continue;
            };
            return Some(PageWindow {
                results: results.len(),
                page: data.get("page").and_then(Value::as_u64),
                per_page: data.get("per_page").and_then(Value::as_u64),
                has_next: data.get("next").is_some_and(|next| !next.is_null()),
            });
        }
    }
    None
}

// ── Tests ──
