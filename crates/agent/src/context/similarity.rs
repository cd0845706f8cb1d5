//! Lexical similarity between a history message and the current question.
//!
//! Deterministic and cheap: no model calls, no embeddings. The score is the
//! Jaccard overlap of lowercase alphanumeric token sets, damped by how much
//! the two texts differ in length:
//!
//! ```text
//! score = jaccard(tokens_a, tokens_b) * (0.5 + 0.5 * min_len/max_len)
//! ```
//!
//! The length factor keeps a one-word message from scoring high against a
//! long question just because its single token happens to overlap.

use std::collections::HashSet;

/// Split into lowercase alphanumeric tokens.
fn tokenize(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Score two texts in `[0.0, 1.0]`. Empty input on either side scores 0.0.
pub fn similarity_score(a: &str, b: &str) -> f64 {
    let tokens_a = tokenize(a);
    let tokens_b = tokenize(b);

    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let intersection = tokens_a.intersection(&tokens_b).count() as f64;
    let union = tokens_a.union(&tokens_b).count() as f64;
    let jaccard = intersection / union;

    let len_a = tokens_a.len() as f64;
    let len_b = tokens_b.len() as f64;
    let ratio = len_a.min(len_b) / len_a.max(len_b);

    jaccard * (0.5 + 0.5 * ratio)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_texts_score_one() {
        let score = similarity_score("android revenue last week", "android revenue last week");
        assert!((score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn disjoint_texts_score_zero() {
        assert_eq!(similarity_score("apples oranges", "trains planes"), 0.0);
    }

    #[test]
    fn empty_input_scores_zero() {
        assert_eq!(similarity_score("", "anything"), 0.0);
        assert_eq!(similarity_score("anything", ""), 0.0);
        assert_eq!(similarity_score("...", "anything"), 0.0);
    }

    #[test]
    fn case_and_punctuation_insensitive() {
        let a = similarity_score("Android Revenue?", "android revenue");
        assert!((a - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn related_followup_stays_above_threshold() {
        // A prior analysis request vs. a follow-up about the same topic.
        let score = similarity_score(
            "Android revenue analysis from last week",
            "What was the Android revenue last week?",
        );
        assert!(score >= 0.25, "score was {score}");
    }

    #[test]
    fn unrelated_question_falls_below_threshold() {
        let score = similarity_score(
            "Android revenue analysis from last week",
            "How many users were active last weekend?",
        );
        assert!(score < 0.25, "score was {score}");
    }

    #[test]
    fn short_overlap_is_damped() {
        // One shared token, very different lengths.
        let score = similarity_score(
            "revenue",
            "what was the total revenue across all platforms yesterday",
        );
        assert!(score < 0.25, "score was {score}");
    }

    #[test]
    fn symmetric() {
        let a = "android revenue analysis";
        let b = "what about ios revenue";
        assert_eq!(similarity_score(a, b).to_bits(), similarity_score(b, a).to_bits());
    }
}
