use regex::{Regex, RegexBuilder};

use crate::models::Sentiment;

/// Symbol and keyword lists used to tag scraped articles. Injected rather
/// than hardcoded so sources, tickers and keywords can be extended without
/// touching the tagging logic.
#[derive(Debug, Clone)]
pub struct TaggingConfig {
    /// Known ticker symbols, matched case-insensitively as whole words
    pub symbols: Vec<String>,
    /// Returned when no known symbol appears in the text
    pub default_symbol: String,
    pub positive_keywords: Vec<String>,
    pub negative_keywords: Vec<String>,
}

impl Default for TaggingConfig {
    fn default() -> Self {
        fn owned(words: &[&str]) -> Vec<String> {
            words.iter().map(|w| (*w).to_string()).collect()
        }

        Self {
            symbols: owned(&[
                "TCS", "INFY", "RELIANCE", "HDFC", "ICICI", "SBI", "WIPRO", "HCL", "ADANI",
            ]),
            default_symbol: "NIFTY".to_string(),
            positive_keywords: owned(&[
                "growth", "profit", "gain", "rise", "surge", "beat", "strong", "robust",
            ]),
            negative_keywords: owned(&[
                "loss", "fall", "decline", "drop", "weak", "miss", "concern", "challenge",
            ]),
        }
    }
}

/// Tags free text with a ticker symbol and a sentiment label. Pure: the
/// same config and text always produce the same tags.
pub struct Tagger {
    config: TaggingConfig,
    symbol_pattern: Option<Regex>,
}

impl Tagger {
    pub fn new(config: TaggingConfig) -> Result<Self, regex::Error> {
        let symbol_pattern = if config.symbols.is_empty() {
            None
        } else {
            let alternation = config
                .symbols
                .iter()
                .map(|s| regex::escape(s))
                .collect::<Vec<_>>()
                .join("|");
            Some(
                RegexBuilder::new(&format!(r"\b({})\b", alternation))
                    .case_insensitive(true)
                    .build()?,
            )
        };

        Ok(Self {
            config,
            symbol_pattern,
        })
    }

    /// Best-matching known ticker in `text`, or the default market symbol.
    /// Leftmost occurrence wins; there is no frequency weighting.
    pub fn extract_symbol(&self, text: &str) -> String {
        self.symbol_pattern
            .as_ref()
            .and_then(|re| re.find(text))
            .map(|m| m.as_str().to_uppercase())
            .unwrap_or_else(|| self.config.default_symbol.clone())
    }

    /// Keyword-count sentiment: one count per keyword present in the
    /// lower-cased text. Equal counts (including zero) are neutral.
    pub fn classify_sentiment(&self, text: &str) -> Sentiment {
        let lower = text.to_lowercase();

        let positive = self
            .config
            .positive_keywords
            .iter()
            .filter(|w| lower.contains(w.as_str()))
            .count();
        let negative = self
            .config
            .negative_keywords
            .iter()
            .filter(|w| lower.contains(w.as_str()))
            .count();

        if positive > negative {
            Sentiment::Positive
        } else if negative > positive {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagger() -> Tagger {
        Tagger::new(TaggingConfig::default()).unwrap()
    }

    #[test]
    fn test_extract_symbol_single_match() {
        let t = tagger();
        assert_eq!(t.extract_symbol("TCS announces quarterly results"), "TCS");
    }

    #[test]
    fn test_extract_symbol_case_insensitive() {
        let t = tagger();
        assert_eq!(t.extract_symbol("Reliance shares jump"), "RELIANCE");
        assert_eq!(t.extract_symbol("wipro wins large deal"), "WIPRO");
    }

    #[test]
    fn test_extract_symbol_whole_word_only() {
        let t = tagger();
        // "SBIN" must not match "SBI"
        assert_eq!(t.extract_symbol("SBIN futures expire today"), "NIFTY");
    }

    #[test]
    fn test_extract_symbol_none_returns_default() {
        let t = tagger();
        assert_eq!(t.extract_symbol("Markets end flat ahead of budget"), "NIFTY");
    }

    #[test]
    fn test_extract_symbol_leftmost_wins() {
        let t = tagger();
        assert_eq!(t.extract_symbol("INFY and TCS both rallied, TCS more"), "INFY");
    }

    #[test]
    fn test_extract_symbol_empty_symbol_list() {
        let t = Tagger::new(TaggingConfig {
            symbols: vec![],
            ..TaggingConfig::default()
        })
        .unwrap();
        assert_eq!(t.extract_symbol("TCS beats estimates"), "NIFTY");
    }

    #[test]
    fn test_classify_positive() {
        let t = tagger();
        let text = "Reliance reports strong profit growth, beats estimates";
        assert_eq!(t.classify_sentiment(text), Sentiment::Positive);
        assert_eq!(t.extract_symbol(text), "RELIANCE");
    }

    #[test]
    fn test_classify_negative() {
        let t = tagger();
        assert_eq!(
            t.classify_sentiment("Shares drop on weak demand, loss widens"),
            Sentiment::Negative
        );
    }

    #[test]
    fn test_classify_neutral_no_keywords() {
        let t = tagger();
        assert_eq!(
            t.classify_sentiment("Board meeting scheduled for Thursday"),
            Sentiment::Neutral
        );
    }

    #[test]
    fn test_classify_tie_is_neutral() {
        let t = tagger();
        // one positive keyword (gain), one negative (loss)
        assert_eq!(
            t.classify_sentiment("Gain in one segment offsets loss in another"),
            Sentiment::Neutral
        );
    }

    #[test]
    fn test_classify_is_deterministic() {
        let t = tagger();
        let text = "Profit surge despite margin concern";
        assert_eq!(t.classify_sentiment(text), t.classify_sentiment(text));
    }
}
