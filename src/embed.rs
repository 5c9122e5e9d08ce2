use std::fmt;

use url::{form_urlencoded, Url};

const EMBED_BASE: &str = "https://www.youtube.com/embed";
const SHORT_LINK: &str = "youtu.be/";

/// Something the embeddable player can show
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EmbedRef {
    Playlist(String),
    Video(String),
}

impl EmbedRef {
    pub fn id(&self) -> &str {
        match self {
            EmbedRef::Playlist(id) | EmbedRef::Video(id) => id,
        }
    }

    pub fn is_playlist(&self) -> bool {
        matches!(self, EmbedRef::Playlist(_))
    }

    /// The player URL, always with autoplay on.
    pub fn embed_url(&self) -> String {
        match self {
            EmbedRef::Playlist(id) => {
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair("list", id)
                    .append_pair("autoplay", "1")
                    .finish();
                format!("{}/videoseries?{}", EMBED_BASE, query)
            }
            EmbedRef::Video(id) => {
                let segment: String = form_urlencoded::byte_serialize(id.as_bytes()).collect();
                format!("{}/{}?autoplay=1", EMBED_BASE, segment)
            }
        }
    }
}

impl fmt::Display for EmbedRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbedRef::Playlist(id) => write!(f, "playlist {}", id),
            EmbedRef::Video(id) => write!(f, "video {}", id),
        }
    }
}

/// Resolves whatever the user pasted into an embeddable reference.
///
/// A `list` query parameter wins over `v`; short links are only tried when
/// neither is present. Anything that is not an absolute URL, or carries no
/// recognizable id, resolves to `None`.
pub fn resolve(input: &str) -> Option<EmbedRef> {
    let parsed = Url::parse(input.trim()).ok()?;

    let param = |name: &str| {
        parsed
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
            .filter(|v| !v.is_empty())
    };

    if let Some(list) = param("list") {
        return Some(EmbedRef::Playlist(list));
    }
    if let Some(video) = param("v") {
        return Some(EmbedRef::Video(video));
    }

    short_link_id(input).map(|id| EmbedRef::Video(id.to_string()))
}

fn short_link_id(input: &str) -> Option<&str> {
    let (_, tail) = input.split_once(SHORT_LINK)?;
    let id = tail
        .split(['?', '#', '/'])
        .next()
        .unwrap_or_default()
        .trim();
    (!id.is_empty()).then_some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_watch_url_resolves_to_video() {
        let r = resolve("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap();
        assert_eq!(r, EmbedRef::Video("dQw4w9WgXcQ".into()));
        assert_eq!(
            r.embed_url(),
            "https://www.youtube.com/embed/dQw4w9WgXcQ?autoplay=1"
        );
    }

    #[test]
    fn test_list_wins_over_video() {
        let r = resolve("https://www.youtube.com/watch?v=abc&list=PL123").unwrap();
        assert!(r.is_playlist());
        assert_eq!(r.id(), "PL123");
        let url = r.embed_url();
        assert!(url.contains("PL123"));
        assert!(url.contains("autoplay=1"));
        assert!(url.starts_with("https://www.youtube.com/embed/videoseries?"));
    }

    #[test]
    fn test_playlist_page() {
        assert_matches!(
            resolve("https://www.youtube.com/playlist?list=PLx"),
            Some(EmbedRef::Playlist(id)) if id == "PLx"
        );
    }

    #[test]
    fn test_short_link_drops_query() {
        assert_eq!(
            resolve("https://youtu.be/abc123?t=5"),
            Some(EmbedRef::Video("abc123".into()))
        );
    }

    #[test]
    fn test_short_link_without_id() {
        assert_eq!(resolve("https://youtu.be/"), None);
        assert_eq!(resolve("https://youtu.be/?t=5"), None);
    }

    #[test]
    fn test_short_link_with_list_is_a_playlist() {
        assert_matches!(
            resolve("https://youtu.be/abc123?list=PL9"),
            Some(EmbedRef::Playlist(id)) if id == "PL9"
        );
    }

    #[test]
    fn test_unrecognized_urls() {
        assert_eq!(resolve("https://example.com/"), None);
        assert_eq!(resolve("https://www.youtube.com/feed/subscriptions"), None);
        assert_eq!(resolve("https://www.youtube.com/watch?v="), None);
    }

    #[test]
    fn test_malformed_input() {
        assert_eq!(resolve(""), None);
        assert_eq!(resolve("not a url"), None);
        // relative input fails to parse even if it mentions a short link
        assert_eq!(resolve("youtu.be/abc123"), None);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let input = "https://www.youtube.com/watch?v=xyz";
        assert_eq!(resolve(input), resolve(input));
    }

    #[test]
    fn test_video_id_is_escaped() {
        let r = EmbedRef::Video("a b".into());
        assert_eq!(r.embed_url(), "https://www.youtube.com/embed/a+b?autoplay=1");
    }
}
