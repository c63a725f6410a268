use serde::{Deserialize, Serialize};

use crate::posts::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Hashtag,
    Account,
}

/// A content locator to query for candidate posts.
///
/// The locator is stored without its `#`/`@` sigil; `Display` puts it back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    pub kind: TargetKind,
    pub locator: String,
}

/// Locator fragments that declare what a target is mostly about.
const INTENT_HINTS: &[(&str, Category)] = &[
    ("job", Category::Job),
    ("hiring", Category::Job),
    ("求人", Category::Job),
    ("就職", Category::Job),
    ("rental", Category::House),
    ("housing", Category::House),
    ("room", Category::House),
    ("シェアハウス", Category::House),
    ("event", Category::Event),
    ("イベント", Category::Event),
];

impl Target {
    /// Instagram hashtags and handles are case-insensitive, so locators are
    /// stored lowercased.
    #[must_use]
    pub fn hashtag(tag: &str) -> Self {
        Self {
            kind: TargetKind::Hashtag,
            locator: tag.trim().trim_start_matches('#').to_lowercase(),
        }
    }

    #[must_use]
    pub fn account(handle: &str) -> Self {
        Self {
            kind: TargetKind::Account,
            locator: handle.trim().trim_start_matches('@').to_lowercase(),
        }
    }

    /// Parse a single user-supplied target.
    ///
    /// `@name` is an account, `#name` or a bare `name` is a hashtag. Returns
    /// `None` when nothing remains after trimming the sigil.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let target = if raw.starts_with('@') {
            Self::account(raw)
        } else {
            Self::hashtag(raw)
        };
        if target.locator.is_empty() {
            None
        } else {
            Some(target)
        }
    }

    /// Instagram page URL for this target.
    #[must_use]
    pub fn url(&self) -> String {
        match self.kind {
            TargetKind::Hashtag => {
                format!("https://www.instagram.com/explore/tags/{}/", self.locator)
            }
            TargetKind::Account => format!("https://www.instagram.com/{}/", self.locator),
        }
    }

    /// Category the target name itself suggests, e.g. `#torontojobs` → Job.
    #[must_use]
    pub fn intent(&self) -> Option<Category> {
        let lower = self.locator.to_lowercase();
        INTENT_HINTS
            .iter()
            .find(|(hint, _)| lower.contains(hint))
            .map(|&(_, category)| category)
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TargetKind::Hashtag => write!(f, "#{}", self.locator),
            TargetKind::Account => write!(f, "@{}", self.locator),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_account_and_hashtags() {
        assert_eq!(Target::parse("@blogto"), Some(Target::account("blogto")));
        assert_eq!(
            Target::parse("#torontojobs"),
            Some(Target::hashtag("torontojobs"))
        );
        assert_eq!(
            Target::parse("  torontojobs "),
            Some(Target::hashtag("torontojobs"))
        );
    }

    #[test]
    fn locators_are_case_insensitive() {
        assert_eq!(Target::parse("#TorontoJobs"), Target::parse("#torontojobs"));
        assert_eq!(Target::account("@BlogTO").locator, "blogto");
        assert_eq!(Target::hashtag("トロント求人").locator, "トロント求人");
    }

    #[test]
    fn parse_rejects_bare_sigils() {
        assert_eq!(Target::parse("#"), None);
        assert_eq!(Target::parse(" @ "), None);
        assert_eq!(Target::parse(""), None);
    }

    #[test]
    fn urls_follow_instagram_layout() {
        assert_eq!(
            Target::hashtag("torontojobs").url(),
            "https://www.instagram.com/explore/tags/torontojobs/"
        );
        assert_eq!(
            Target::account("blogto").url(),
            "https://www.instagram.com/blogto/"
        );
    }

    #[test]
    fn display_restores_sigil() {
        assert_eq!(Target::hashtag("ukjobs").to_string(), "#ukjobs");
        assert_eq!(Target::account("torontolife").to_string(), "@torontolife");
    }

    #[test]
    fn intent_from_locator() {
        assert_eq!(Target::hashtag("torontojobs").intent(), Some(Category::Job));
        assert_eq!(
            Target::hashtag("manilarentals").intent(),
            Some(Category::House)
        );
        assert_eq!(Target::hashtag("トロント求人").intent(), Some(Category::Job));
        assert_eq!(
            Target::hashtag("torontoevents").intent(),
            Some(Category::Event)
        );
        assert_eq!(Target::account("blogto").intent(), None);
    }
}
