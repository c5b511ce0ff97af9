//! URL validation helpers
//!
//! Pure predicates used before any network I/O.

use url::Url;

/// Playlist file extensions recognised by `is_playlist_url`
const PLAYLIST_EXTENSIONS: [&str; 2] = [".m3u", ".m3u8"];

/// Check that a string is an absolute HTTP(S) URL
///
/// Relative paths, malformed strings and any other scheme (`ftp:`, `file:`, ...)
/// are rejected.
pub fn is_valid_url(candidate: &str) -> bool {
    match Url::parse(candidate) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Check whether a URL points at a playlist manifest (by file suffix)
///
/// Query string and fragment are ignored, so
/// `http://host/list.m3u8?token=abc` is a playlist.
pub fn is_playlist_url(candidate: &str) -> bool {
    let path = match Url::parse(candidate) {
        Ok(url) => url.path().to_lowercase(),
        Err(_) => candidate
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_lowercase(),
    };

    PLAYLIST_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}
