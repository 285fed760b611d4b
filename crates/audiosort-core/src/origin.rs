use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

/// The only marketplace recognized today. Matching is a plain substring
/// check with no partial-match fallback.
const MARKETPLACE_DOMAIN: &str = "bandcamp.com";

static URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://\S+").unwrap());

/// Where a track was originally downloaded from, inferred from the comment
/// text embedded in its tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Carries the marketplace URL verbatim as it appeared in the comment.
    Bandcamp(String),
    Other,
}

impl Origin {
    pub fn as_str(&self) -> &str {
        match self {
            Origin::Bandcamp(url) => url,
            Origin::Other => "other",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Origin {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Classify a comment field. If it mentions the marketplace domain, the
/// first URL-shaped token (scheme plus non-whitespace run) is the origin;
/// anything else is [`Origin::Other`].
pub fn classify(comment: &str) -> Origin {
    if comment.contains(MARKETPLACE_DOMAIN) {
        if let Some(m) = URL_RE.find(comment) {
            return Origin::Bandcamp(m.as_str().to_string());
        }
    }
    Origin::Other
}
