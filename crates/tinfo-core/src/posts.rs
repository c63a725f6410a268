use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::targets::Target;

/// Closed set of categories a post can be classified into.
///
/// Declaration order is the persistence priority: Job > House > Event > Ignore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Job,
    House,
    Event,
    Ignore,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Job,
        Category::House,
        Category::Event,
        Category::Ignore,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Job => "Job",
            Category::House => "House",
            Category::Event => "Event",
            Category::Ignore => "Ignore",
        }
    }

    fn index(self) -> usize {
        match self {
            Category::Job => 0,
            Category::House => 1,
            Category::Event => 2,
            Category::Ignore => 3,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown category '{s}'"))
    }
}

/// Per-category post counts. Every category is always present, so the
/// rendered breakdown has a stable shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryBreakdown([usize; 4]);

impl CategoryBreakdown {
    pub fn increment(&mut self, category: Category) {
        let slot = &mut self.0[category.index()];
        *slot = slot.saturating_add(1);
    }

    #[must_use]
    pub fn get(&self, category: Category) -> usize {
        self.0[category.index()]
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, usize)> + '_ {
        Category::ALL.into_iter().map(|c| (c, self.get(c)))
    }

    /// JSON object keyed by category name.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .iter()
            .map(|(c, n)| (c.as_str().to_string(), serde_json::Value::from(n)))
            .collect();
        serde_json::Value::Object(map)
    }
}

/// A post as returned by a source fetcher, before filtering and classification.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPost {
    /// Stable platform identifier, e.g. the Instagram shortcode `"C1a2b3c4"`.
    pub shortcode: String,
    /// Caption or body text.
    pub text: String,
    pub image_url: Option<String>,
    pub post_url: String,
    pub author: Option<String>,
    pub published_at: DateTime<Utc>,
    /// The target this post was fetched for.
    pub target: Target,
}

/// Lifecycle state written on insert. Downstream tooling owns later transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostStatus {
    New,
    Ignored,
}

impl PostStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PostStatus::New => "new",
            PostStatus::Ignored => "ignored",
        }
    }
}

/// Insert payload for the `posts` table.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub shortcode: String,
    pub category: Category,
    pub status: PostStatus,
    pub content: String,
    pub details: serde_json::Value,
    pub original_url: String,
    pub author: Option<String>,
    pub posted_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_order_is_priority_order() {
        let mut cats = vec![
            Category::Ignore,
            Category::Event,
            Category::Job,
            Category::House,
        ];
        cats.sort();
        assert_eq!(cats, Category::ALL.to_vec());
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("job".parse::<Category>().unwrap(), Category::Job);
        assert_eq!(" HOUSE ".parse::<Category>().unwrap(), Category::House);
        assert!("Error".parse::<Category>().is_err());
    }

    #[test]
    fn breakdown_counts_and_totals() {
        let mut b = CategoryBreakdown::default();
        b.increment(Category::Job);
        b.increment(Category::Job);
        b.increment(Category::Ignore);
        assert_eq!(b.get(Category::Job), 2);
        assert_eq!(b.get(Category::House), 0);
        assert_eq!(b.total(), 3);
    }

    #[test]
    fn breakdown_json_contains_every_category() {
        let mut b = CategoryBreakdown::default();
        b.increment(Category::Event);
        let json = b.to_json();
        assert_eq!(
            json,
            serde_json::json!({"Job": 0, "House": 0, "Event": 1, "Ignore": 0})
        );
    }
}
