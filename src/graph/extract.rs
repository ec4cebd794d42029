//! Wiki-link and hashtag extraction from raw note text.

use std::sync::LazyLock;

use regex::Regex;

static WIKI_LINK: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\[\[([^\]]+)\]\]").expect("wiki-link pattern"));

static HASHTAG: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"#([A-Za-z0-9_-]+)").expect("hashtag pattern"));

/// Inner text of every `[[...]]` occurrence, in order, duplicates kept.
pub fn extract_links(content: &str) -> Vec<&str> {
	WIKI_LINK
		.captures_iter(content)
		.filter_map(|c| c.get(1))
		.map(|m| m.as_str())
		.collect()
}

/// Every `#tag` occurrence without the leading `#`, in order, duplicates kept.
/// Tag characters are ASCII word characters and `-`.
pub fn extract_tags(content: &str) -> Vec<&str> {
	HASHTAG
		.captures_iter(content)
		.filter_map(|c| c.get(1))
		.map(|m| m.as_str())
		.collect()
}

/// Number of literal `[[link]]` occurrences in `content`.
pub fn link_occurrences(content: &str, link: &str) -> usize {
	content.matches(&format!("[[{link}]]")).count()
}
