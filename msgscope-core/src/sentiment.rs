use serde::Serialize;

use crate::aggregate::Aggregator;
use crate::lexicon::CompiledLexicons;
use crate::message::Message;
use crate::tally::percentage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SentimentBreakdown {
    pub positive_count: usize,
    pub negative_count: usize,
    pub neutral_count: usize,
    pub total_messages: usize,
    pub positive_percentage: f64,
    pub negative_percentage: f64,
    pub neutral_percentage: f64,
}

/// Keyword polarity vote per text message.
pub struct SentimentClassifier<'a> {
    lexicons: &'a CompiledLexicons,
    positive: usize,
    negative: usize,
    neutral: usize,
}

impl<'a> SentimentClassifier<'a> {
    pub fn new(lexicons: &'a CompiledLexicons) -> Self {
        Self {
            lexicons,
            positive: 0,
            negative: 0,
            neutral: 0,
        }
    }

    /// Each keyword counts once however often it appears.
    pub fn classify(&self, text: &str) -> Polarity {
        let lowered = text.to_lowercase();
        let hits = |words: &[String]| words.iter().filter(|w| lowered.contains(w.as_str())).count();
        let pos = hits(&self.lexicons.positive);
        let neg = hits(&self.lexicons.negative);
        match pos.cmp(&neg) {
            std::cmp::Ordering::Greater => Polarity::Positive,
            std::cmp::Ordering::Less => Polarity::Negative,
            std::cmp::Ordering::Equal => Polarity::Neutral,
        }
    }
}

impl Aggregator for SentimentClassifier<'_> {
    type Output = SentimentBreakdown;

    fn observe(&mut self, message: &Message) {
        let Some(text) = message.text() else {
            return;
        };
        match self.classify(text) {
            Polarity::Positive => self.positive += 1,
            Polarity::Negative => self.negative += 1,
            Polarity::Neutral => self.neutral += 1,
        }
    }

    fn finish(self) -> SentimentBreakdown {
        let total = self.positive + self.negative + self.neutral;
        SentimentBreakdown {
            positive_count: self.positive,
            negative_count: self.negative,
            neutral_count: self.neutral,
            total_messages: total,
            positive_percentage: percentage(self.positive, total),
            negative_percentage: percentage(self.negative, total),
            neutral_percentage: percentage(self.neutral, total),
        }
    }
}
