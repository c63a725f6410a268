//! Keyword lexicon classifier for community posts.

use tinfo_core::Category;

/// Weighted terms per category.
///
/// ASCII terms match whole lowercase words (a trailing plural `s` is
/// tolerated). Non-ASCII terms (Japanese) match as substrings because the
/// text is not whitespace-delimited.
pub(crate) const LEXICON: &[(&str, Category, u32)] = &[
    // Job
    ("hiring", Category::Job, 3),
    ("hire", Category::Job, 2),
    ("job", Category::Job, 3),
    ("career", Category::Job, 2),
    ("recruit", Category::Job, 3),
    ("recruiting", Category::Job, 3),
    ("position", Category::Job, 1),
    ("staff", Category::Job, 1),
    ("server", Category::Job, 1),
    ("cook", Category::Job, 1),
    ("barista", Category::Job, 2),
    ("wage", Category::Job, 2),
    ("salary", Category::Job, 2),
    ("part-time", Category::Job, 2),
    ("full-time", Category::Job, 2),
    ("resume", Category::Job, 2),
    ("apply", Category::Job, 1),
    ("求人", Category::Job, 3),
    ("募集", Category::Job, 2),
    ("採用", Category::Job, 3),
    ("アルバイト", Category::Job, 3),
    ("バイト", Category::Job, 2),
    ("スタッフ", Category::Job, 1),
    ("時給", Category::Job, 3),
    ("就職", Category::Job, 3),
    // House
    ("rent", Category::House, 3),
    ("rental", Category::House, 3),
    ("room", Category::House, 2),
    ("roommate", Category::House, 3),
    ("apartment", Category::House, 3),
    ("condo", Category::House, 2),
    ("basement", Category::House, 2),
    ("lease", Category::House, 3),
    ("sublet", Category::House, 3),
    ("housing", Category::House, 3),
    ("move-in", Category::House, 2),
    ("utilities", Category::House, 1),
    ("bedroom", Category::House, 2),
    ("シェアハウス", Category::House, 3),
    ("ルームシェア", Category::House, 3),
    ("賃貸", Category::House, 3),
    ("家賃", Category::House, 3),
    ("部屋", Category::House, 2),
    ("入居", Category::House, 2),
    // Event
    ("event", Category::Event, 3),
    ("party", Category::Event, 2),
    ("meetup", Category::Event, 3),
    ("festival", Category::Event, 3),
    ("workshop", Category::Event, 2),
    ("concert", Category::Event, 2),
    ("tickets", Category::Event, 2),
    ("rsvp", Category::Event, 2),
    ("market", Category::Event, 1),
    ("イベント", Category::Event, 3),
    ("祭り", Category::Event, 3),
    ("交流会", Category::Event, 3),
    ("ワークショップ", Category::Event, 2),
    ("開催", Category::Event, 2),
];

/// Per-category lexicon scores for `text`, in [`Category::ALL`] order.
#[must_use]
pub fn category_scores(text: &str) -> [u32; 3] {
    let lower = text.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !(c.is_alphanumeric() || c == '-'))
        .map(|w| w.trim_matches('-'))
        .filter(|w| !w.is_empty())
        .collect();

    let mut scores = [0u32; 3];
    for &(term, category, weight) in LEXICON {
        let hits = if term.is_ascii() {
            words
                .iter()
                .filter(|w| **w == term || w.strip_suffix('s') == Some(term))
                .count()
        } else {
            lower.matches(term).count()
        };
        if hits > 0 {
            let slot = match category {
                Category::Job => 0,
                Category::House => 1,
                Category::Event => 2,
                Category::Ignore => continue,
            };
            let hits = u32::try_from(hits).unwrap_or(u32::MAX);
            scores[slot] = scores[slot].saturating_add(weight.saturating_mul(hits));
        }
    }
    scores
}

/// Assign exactly one category to a post.
///
/// The highest lexicon score wins and ties go to the higher priority
/// category (Job > House > Event). With no keyword hits the target's
/// declared intent is used, and failing that the post is `Ignore`.
#[must_use]
pub fn classify(text: &str, intent: Option<Category>) -> Category {
    let scores = category_scores(text);
    let mut best: Option<(Category, u32)> = None;
    for (category, score) in [Category::Job, Category::House, Category::Event]
        .into_iter()
        .zip(scores)
    {
        if score > 0 && best.is_none_or(|(_, top)| score > top) {
            best = Some((category, score));
        }
    }
    match best {
        Some((category, _)) => category,
        None => intent.unwrap_or(Category::Ignore),
    }
}
