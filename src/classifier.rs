//! Keyword classification of article titles.
//!
//! Classification is a pure function of the title and is never stored, so a
//! vocabulary change re-classifies every stored article on the next read.
//!
//! # Rules
//!
//! - **AI score**: +2 for each AI keyword found in the title, plus a +2 bonus
//!   when "ai" stands alone as a word. Keywords of one or two characters
//!   (`ai`, `rl`) only count as whole words, so "said" or "world" do not
//!   score. Longer keywords match anywhere, case-insensitively.
//! - **Funding flag**: any funding keyword as a substring, or a money amount
//!   such as `$50M`, `USD 1.2 billion` or `€ 30m`.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());

/// Keywords at or below this length are matched as whole words only.
const WORD_KEYWORD_MAX_LEN: usize = 2;

/// Points added per keyword hit and for the standalone "ai" bonus.
const KEYWORD_POINTS: u32 = 2;

/// The classifier's keyword lists and money pattern.
///
/// This is the single source of truth for both the console views and the
/// HTML report. It can be overridden as a whole from the config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Vocabulary {
    /// Bumped whenever the default lists change.
    pub version: u32,
    pub ai_keywords: Vec<String>,
    pub funding_keywords: Vec<String>,
    /// Case-insensitive regular expression for money amounts.
    pub money_pattern: String,
}

impl Default for Vocabulary {
    fn default() -> Self {
        let words = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        Self {
            version: 1,
            ai_keywords: words(&[
                "ai",
                "agent",
                "agents",
                "llm",
                "model",
                "models",
                "foundation",
                "gemini",
                "claude",
                "openai",
                "anthropic",
                "copilot",
                "reinforcement learning",
                "rl",
                "neural",
                "transformer",
                "inference",
                "vector",
                "embedding",
                "orchestration",
            ]),
            funding_keywords: words(&[
                "raises",
                "raised",
                "funding",
                "series a",
                "series b",
                "series c",
                "seed",
                "round",
                "valuation",
                "backed",
                "led by",
            ]),
            money_pattern: r"(\$|usd|€|£)\s?\d+(\.\d+)?\s?(m|million|b|billion)?".to_string(),
        }
    }
}

/// Result of running both passes over one title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub ai_score: u32,
    pub funding: bool,
}

impl Classification {
    pub fn is_ai(&self) -> bool {
        self.ai_score > 0
    }
}

/// A compiled [`Vocabulary`].
#[derive(Debug, Clone)]
pub struct Classifier {
    version: u32,
    ai_substrings: Vec<String>,
    ai_words: Vec<String>,
    funding_keywords: Vec<String>,
    money: Regex,
}

impl Classifier {
    /// Compile `vocabulary`. Fails only if the money pattern is not a valid
    /// regular expression.
    pub fn new(vocabulary: &Vocabulary) -> Result<Self, regex::Error> {
        let (ai_words, ai_substrings): (Vec<String>, Vec<String>) = vocabulary
            .ai_keywords
            .iter()
            .map(|kw| kw.trim().to_lowercase())
            .filter(|kw| !kw.is_empty())
            .partition(|kw| {
                kw.chars().count() <= WORD_KEYWORD_MAX_LEN && kw.chars().all(char::is_alphanumeric)
            });

        let funding_keywords = vocabulary
            .funding_keywords
            .iter()
            .map(|kw| kw.trim().to_lowercase())
            .filter(|kw| !kw.is_empty())
            .collect();

        let money = RegexBuilder::new(&vocabulary.money_pattern)
            .case_insensitive(true)
            .build()?;

        Ok(Self {
            version: vocabulary.version,
            ai_substrings,
            ai_words,
            funding_keywords,
            money,
        })
    }

    /// Version of the vocabulary this classifier was built from.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// AI relevance of `title`; 0 means "not AI".
    pub fn score_ai(&self, title: &str) -> u32 {
        let lower = title.to_lowercase();
        let words: HashSet<&str> = WORD.find_iter(&lower).map(|m| m.as_str()).collect();

        let substring_hits = self
            .ai_substrings
            .iter()
            .filter(|kw| lower.contains(kw.as_str()))
            .count() as u32;
        let word_hits = self
            .ai_words
            .iter()
            .filter(|kw| words.contains(kw.as_str()))
            .count() as u32;

        let mut score = (substring_hits + word_hits) * KEYWORD_POINTS;
        if words.contains("ai") {
            score += KEYWORD_POINTS;
        }
        score
    }

    /// Whether `title` looks like a funding announcement.
    pub fn is_funding(&self, title: &str) -> bool {
        let lower = title.to_lowercase();
        self.funding_keywords
            .iter()
            .any(|kw| lower.contains(kw.as_str()))
            || self.money.is_match(&lower)
    }

    pub fn classify(&self, title: &str) -> Classification {
        Classification {
            ai_score: self.score_ai(title),
            funding: self.is_funding(title),
        }
    }
}

#[cfg(test)]
impl Default for Classifier {
    fn default() -> Self {
        Self::new(&Vocabulary::default()).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_startup_headline_is_ai_and_funding() {
        let classifier = Classifier::default();
        let result = classifier.classify("AI startup raises $50M");

        // "ai" keyword as a word plus the standalone bonus.
        assert_eq!(result.ai_score, 4);
        assert!(result.is_ai());
        assert!(result.funding);
    }

    #[test]
    fn test_substring_noise_does_not_score() {
        let classifier = Classifier::default();
        assert_eq!(classifier.score_ai("This contains aid and said"), 0);
        assert_eq!(classifier.score_ai("World leaders meet in Spain"), 0);
        assert_eq!(classifier.score_ai(""), 0);
    }

    #[test]
    fn test_each_keyword_scores_two() {
        let classifier = Classifier::default();
        assert_eq!(classifier.score_ai("Faster inference on laptops"), 2);
        // "openai" and "model"; the "ai" inside "openai" is not a word.
        assert_eq!(classifier.score_ai("OpenAI's next model"), 4);
        // "agent" and "agents" both match "agents".
        assert_eq!(classifier.score_ai("Agents take over"), 4);
        assert_eq!(classifier.score_ai("Notes on RL fine-tuning"), 2);
    }

    #[test]
    fn test_standalone_ai_at_edges_and_punctuation() {
        let classifier = Classifier::default();
        assert_eq!(classifier.score_ai("AI"), 4);
        assert_eq!(classifier.score_ai("Why everyone wants AI"), 4);
        assert_eq!(classifier.score_ai("AI-powered search"), 4);
        assert_eq!(classifier.score_ai("Maintain the main domain"), 0);
    }

    #[test]
    fn test_funding_keywords() {
        let classifier = Classifier::default();
        assert!(classifier.is_funding("Acme closes Series B led by Sequoia"));
        assert!(classifier.is_funding("Valuation doubles"));
        assert!(!classifier.is_funding("New phone reviewed"));
    }

    #[test]
    fn test_money_pattern() {
        let classifier = Classifier::default();
        assert!(classifier.is_funding("Chipmaker lands $1.5 billion"));
        assert!(classifier.is_funding("Deal worth USD 300"));
        assert!(classifier.is_funding("Paris lab gets €30m"));
        assert!(classifier.is_funding("£ 12 for a coffee"));
        assert!(!classifier.is_funding("Costs dropped 50 percent"));
    }

    #[test]
    fn test_custom_vocabulary() {
        let vocabulary = Vocabulary {
            version: 7,
            ai_keywords: vec!["Robot".to_string()],
            funding_keywords: vec!["IPO".to_string()],
            money_pattern: r"\d+ coins".to_string(),
        };
        let classifier = Classifier::new(&vocabulary).unwrap();

        assert_eq!(classifier.version(), 7);
        assert_eq!(classifier.score_ai("robot arms"), 2);
        assert_eq!(classifier.score_ai("New model"), 0);
        assert!(classifier.is_funding("Company files for ipo"));
        assert!(classifier.is_funding("Paid 40 COINS"));
        assert!(!classifier.is_funding("Raises prices"));
    }

    #[test]
    fn test_default_vocabulary_compiles() {
        let classifier = Classifier::new(&Vocabulary::default()).unwrap();
        assert_eq!(classifier.version(), 1);
        assert!(classifier.is_funding("Startup lands $5M"));
    }

    #[test]
    fn test_invalid_money_pattern_is_error() {
        let vocabulary = Vocabulary {
            money_pattern: "(unclosed".to_string(),
            ..Vocabulary::default()
        };
        assert!(Classifier::new(&vocabulary).is_err());
    }
}
