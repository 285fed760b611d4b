//! Catalog lookup against the marketplace's tag-listing pages: a slug
//! builder for album and track titles, and a page fetcher that pulls the
//! genre tags out of the returned markup.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;
use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};

/// Titles carrying this sentinel have no catalog identity.
const NA_TITLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Album,
    Track,
}

impl CatalogKind {
    fn prefix(self) -> &'static str {
        match self {
            CatalogKind::Album => "album",
            CatalogKind::Track => "track",
        }
    }
}

static NON_SLUG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9\s'.]+").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static TRACK_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.").unwrap());
static HYPHEN_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-{2,}").unwrap());

/// Derive the catalog path segment (`album/<slug>` or `track/<slug>`) for a
/// title, or `None` for the "N/A" sentinel.
///
/// `build_path("Déjà Vu (Remix)", CatalogKind::Album)` is
/// `album/deja-vu-remix`.
pub fn build_path(title: &str, kind: CatalogKind) -> Option<String> {
    if title == NA_TITLE {
        return None;
    }

    let ascii: String = title.nfkd().filter(|c| c.is_ascii()).collect();
    let s = NON_SLUG_RE.replace_all(&ascii, "-");
    let s = WHITESPACE_RE.replace_all(&s, "-").to_lowercase();
    let s = s.replace('\'', "");
    let s = TRACK_PREFIX_RE.replace(&s, "");
    let s = s.replace('.', "-");
    let s = HYPHEN_RUN_RE.replace_all(&s, "-");
    let slug = s.trim_matches('-');

    Some(format!("{}/{}", kind.prefix(), slug))
}

/// Seam for the catalog page fetch, so the retry policy is testable without
/// the network.
pub trait PageSource {
    fn get(&self, url: &str) -> Result<String>;
}

pub struct HttpPageSource {
    agent: ureq::Agent,
}

impl HttpPageSource {
    pub fn new() -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!("audiosort/", env!("CARGO_PKG_VERSION")))
            .build();
        Self { agent }
    }
}

impl Default for HttpPageSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PageSource for HttpPageSource {
    fn get(&self, url: &str) -> Result<String> {
        match self.agent.get(url).call() {
            Ok(response) => Ok(response.into_string()?),
            Err(ureq::Error::Status(status, _)) => Err(Error::TransientFetch {
                url: url.to_string(),
                status,
            }),
            Err(err) => Err(Error::Http(Box::new(err))),
        }
    }
}

static TAG_ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a.tag").unwrap());

/// Fetch the descriptive tags listed on a catalog page.
///
/// An HTTP-level failure is retried exactly once against `url + "-2"` (the
/// site's convention for an alternate listing page); a second HTTP failure
/// degrades to an empty list. Transport failures propagate.
pub fn fetch_tags(source: &impl PageSource, url: &str) -> Result<Vec<String>> {
    match source.get(url) {
        Ok(body) => Ok(parse_tags(&body)),
        Err(Error::TransientFetch { status, .. }) => {
            let alternate = format!("{url}-2");
            debug!(status, %alternate, "catalog page unavailable, trying alternate listing");
            match source.get(&alternate) {
                Ok(body) => Ok(parse_tags(&body)),
                Err(Error::TransientFetch { .. }) => Ok(Vec::new()),
                Err(other) => Err(other),
            }
        }
        Err(other) => Err(other),
    }
}

/// Text content of every `a.tag` anchor, insertion order preserved,
/// duplicates allowed.
pub fn parse_tags(html: &str) -> Vec<String> {
    Html::parse_document(html)
        .select(&TAG_ANCHOR)
        .map(|anchor| anchor.text().collect::<String>().trim().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    #[test]
    fn builds_album_slug() {
        assert_eq!(
            build_path("Déjà Vu (Remix)", CatalogKind::Album).as_deref(),
            Some("album/deja-vu-remix")
        );
    }

    #[test]
    fn na_sentinel_has_no_path() {
        assert_eq!(build_path("N/A", CatalogKind::Track), None);
    }

    #[test]
    fn strips_track_number_prefix() {
        assert_eq!(
            build_path("01. Intro", CatalogKind::Track).as_deref(),
            Some("track/intro")
        );
    }

    #[test]
    fn drops_apostrophes_and_converts_periods() {
        assert_eq!(
            build_path("Don't Stop", CatalogKind::Album).as_deref(),
            Some("album/dont-stop")
        );
        assert_eq!(
            build_path("Vol. 2", CatalogKind::Album).as_deref(),
            Some("album/vol-2")
        );
    }

    const TAG_PAGE: &str = r#"
        <html><body>
          <a class="tag" href="/t/electronic">electronic</a>
          <a href="/elsewhere">not a tag</a>
          <a class="tag" href="/t/ambient"> ambient </a>
          <a class="tag" href="/t/electronic">electronic</a>
        </body></html>"#;

    #[test]
    fn parses_tag_anchors_in_order_with_duplicates() {
        assert_eq!(parse_tags(TAG_PAGE), vec!["electronic", "ambient", "electronic"]);
    }

    struct ScriptedSource {
        responses: RefCell<VecDeque<Result<String>>>,
        requests: RefCell<Vec<String>>,
    }

    impl ScriptedSource {
        fn new(responses: Vec<Result<String>>) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl PageSource for ScriptedSource {
        fn get(&self, url: &str) -> Result<String> {
            self.requests.borrow_mut().push(url.to_string());
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(String::new()))
        }
    }

    fn status_failure(url: &str) -> Error {
        Error::TransientFetch {
            url: url.to_string(),
            status: 404,
        }
    }

    #[test]
    fn first_success_needs_no_retry() {
        let source = ScriptedSource::new(vec![Ok(TAG_PAGE.to_string())]);
        let tags = fetch_tags(&source, "https://x.example/album/a").unwrap();
        assert_eq!(tags.len(), 3);
        assert_eq!(source.requests.borrow().as_slice(), ["https://x.example/album/a"]);
    }

    #[test]
    fn http_failure_retries_alternate_listing_once() {
        let url = "https://x.example/album/a";
        let source =
            ScriptedSource::new(vec![Err(status_failure(url)), Ok(TAG_PAGE.to_string())]);
        let tags = fetch_tags(&source, url).unwrap();
        assert_eq!(tags, vec!["electronic", "ambient", "electronic"]);
        assert_eq!(
            source.requests.borrow().as_slice(),
            [url, "https://x.example/album/a-2"]
        );
    }

    #[test]
    fn second_http_failure_degrades_to_empty() {
        let url = "https://x.example/album/a";
        let source = ScriptedSource::new(vec![
            Err(status_failure(url)),
            Err(status_failure("https://x.example/album/a-2")),
        ]);
        assert_eq!(fetch_tags(&source, url).unwrap(), Vec::<String>::new());
        assert_eq!(source.requests.borrow().len(), 2);
    }

    #[test]
    fn transport_failure_propagates() {
        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "unreachable");
        let source = ScriptedSource::new(vec![Err(Error::Io(io_err))]);
        let got = fetch_tags(&source, "https://x.example/album/a");
        assert!(matches!(got, Err(Error::Io(_))));
    }
}
