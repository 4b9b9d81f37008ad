//! Blog platform classification.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::utils::get_domain;

/// Platform a post was published on, decided by the link's hostname.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceLabel {
    #[serde(alias = "네이버")]
    Naver,
    #[serde(alias = "티스토리")]
    Tistory,
    #[serde(alias = "기타")]
    Other,
}

impl SourceLabel {
    pub const ALL: [SourceLabel; 3] = [Self::Naver, Self::Tistory, Self::Other];

    /// Classify a post link by hostname substring (case-insensitive).
    pub fn classify(link: &str) -> Self {
        let host = get_domain(link).unwrap_or_default().to_lowercase();
        if host.contains("tistory.com") {
            Self::Tistory
        } else if host.contains("naver.com") {
            // blog.naver.com, m.blog.naver.com, post.naver.com ...
            Self::Naver
        } else {
            Self::Other
        }
    }

    /// Display label used in badges and page filenames.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Naver => "네이버",
            Self::Tistory => "티스토리",
            Self::Other => "기타",
        }
    }

    /// Rewrite a link for reading outside the platform's desktop frame.
    ///
    /// Naver desktop posts are iframe wrappers; the mobile host serves the
    /// article body directly.
    pub fn outbound_link(&self, link: &str) -> String {
        if *self != Self::Naver {
            return link.to_string();
        }
        match Url::parse(link) {
            Ok(mut url) if url.host_str() == Some("blog.naver.com") => {
                if url.set_host(Some("m.blog.naver.com")).is_ok() {
                    url.to_string()
                } else {
                    link.to_string()
                }
            }
            _ => link.to_string(),
        }
    }
}

impl fmt::Display for SourceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_by_host() {
        assert_eq!(
            SourceLabel::classify("https://blog.naver.com/abc/123"),
            SourceLabel::Naver
        );
        assert_eq!(
            SourceLabel::classify("https://M.BLOG.NAVER.COM/abc/123"),
            SourceLabel::Naver
        );
        assert_eq!(
            SourceLabel::classify("https://ksp668.tistory.com/42"),
            SourceLabel::Tistory
        );
        assert_eq!(
            SourceLabel::classify("https://example.com/naver.com"),
            SourceLabel::Other
        );
        assert_eq!(SourceLabel::classify("#"), SourceLabel::Other);
    }

    #[test]
    fn naver_links_go_mobile() {
        assert_eq!(
            SourceLabel::Naver.outbound_link("https://blog.naver.com/abc/123"),
            "https://m.blog.naver.com/abc/123"
        );
        assert_eq!(
            SourceLabel::Naver.outbound_link("https://m.blog.naver.com/abc/123"),
            "https://m.blog.naver.com/abc/123"
        );
        assert_eq!(
            SourceLabel::Tistory.outbound_link("https://ksp668.tistory.com/42"),
            "https://ksp668.tistory.com/42"
        );
    }

    #[test]
    fn labels_are_korean() {
        assert_eq!(SourceLabel::Naver.to_string(), "네이버");
        assert_eq!(SourceLabel::Tistory.label(), "티스토리");
        assert_eq!(SourceLabel::Other.label(), "기타");
    }
}
