//! Topical overlap between a post's text and a comment's tags/category.

use std::collections::BTreeSet;

/// Words too common to signal topical overlap.
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "has", "have", "if",
    "in", "into", "is", "it", "its", "just", "no", "not", "of", "on", "or", "so", "that", "the",
    "their", "them", "then", "there", "these", "they", "this", "to", "was", "we", "what", "will",
    "with", "you", "your",
];

/// Added when the literal category name appears inside the post text.
const CATEGORY_MATCH_BONUS: f64 = 0.25;

/// Lowercase alphanumeric tokens, stop words removed.
pub fn tokenize(text: &str) -> BTreeSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty() && !STOP_WORDS.contains(t))
        .map(str::to_string)
        .collect()
}

/// Relevance of a comment (its tags plus category) to a post's text.
/// Zero means "no topical signal", which the selector treats as neutral,
/// never as exclusion.
pub fn score(post_text: &str, category: &str, tags: &BTreeSet<String>) -> f64 {
    if post_text.trim().is_empty() {
        return 0.0;
    }

    let tokens = tokenize(post_text);
    let mut terms: BTreeSet<String> = tags.iter().map(|t| t.to_lowercase()).collect();
    let category_lower = category.to_lowercase();
    if !category_lower.is_empty() {
        terms.insert(category_lower.clone());
    }

    let overlap = tokens.intersection(&terms).count();
    let mut score = overlap as f64 / tags.len().max(1) as f64;

    if !category_lower.is_empty() && post_text.to_lowercase().contains(&category_lower) {
        score += CATEGORY_MATCH_BONUS;
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn tokenize_lowercases_and_drops_stop_words() {
        let tokens = tokenize("The new AI chatbot, launched!");
        assert!(tokens.contains("ai"));
        assert!(tokens.contains("chatbot"));
        assert!(tokens.contains("launched"));
        assert!(!tokens.contains("the"));
    }

    #[test]
    fn no_shared_tokens_scores_zero() {
        assert_eq!(score("gardening tips for spring", "finance", &tags(&["stocks"])), 0.0);
        assert_eq!(score("", "tech", &tags(&["ai"])), 0.0);
    }

    #[test]
    fn score_grows_with_overlap() {
        let t = tags(&["ai", "chatbot", "launch"]);
        let one = score("the ai question", "software", &t);
        let two = score("the ai chatbot question", "software", &t);
        let three = score("ai chatbot launch day", "software", &t);
        assert!(one > 0.0);
        assert!(two > one);
        assert!(three > two);
    }

    #[test]
    fn category_substring_earns_bonus() {
        let none = tags(&[]);
        let plain = score("thoughts on technology today", "tech", &none);
        // "tech" is a substring of "technology" but not a token of it.
        assert_eq!(plain, CATEGORY_MATCH_BONUS);

        let exact = score("tech news today", "tech", &none);
        assert!(exact > plain); // token match plus substring bonus
    }

    #[test]
    fn tags_are_matched_case_insensitively() {
        assert!(score("New AI launch", "general", &tags(&["AI"])) > 0.0);
    }
}
