use serde::Serialize;

use crate::aggregate::Aggregator;
use crate::message::Message;
use crate::tally::{percentage, Tally};
use crate::text::{alphabetic_words, char_len, emoticons};

const TOP_PHRASES: usize = 20;

const PUNCTUATION: [(&str, char); 4] = [
    ("periods", '.'),
    ("commas", ','),
    ("exclamations", '!'),
    ("questions", '?'),
];

#[derive(Debug, Clone, Default, Serialize)]
pub struct CapitalizationPatterns {
    pub total_words: usize,
    pub capitalized_words: usize,
    pub capitalization_rate: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct WritingStyleMetrics {
    pub total_messages_analyzed: usize,
    pub total_characters: usize,
    pub chars_per_message: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct WritingStyle {
    pub avg_message_length: f64,
    pub message_lengths: Vec<usize>,
    pub punctuation_usage: Tally<String>,
    pub emoticon_usage: Tally<String>,
    pub capitalization_patterns: CapitalizationPatterns,
    pub common_phrases: Vec<(String, u32)>,
    pub writing_style_metrics: WritingStyleMetrics,
}

/// Punctuation, emoticons, capitalization and bigram habits.
///
/// Capitalization is accumulated over every message seen, so the rate
/// describes the whole sample rather than the last message.
#[derive(Default)]
pub struct StyleAnalyzer {
    lengths: Vec<usize>,
    total_chars: usize,
    punctuation: Tally<String>,
    emoticons: Tally<String>,
    words: usize,
    capitalized: usize,
    bigrams: Tally<String>,
}

impl StyleAnalyzer {
    pub fn new() -> Self {
        let mut punctuation = Tally::new();
        for (name, _) in PUNCTUATION {
            punctuation.seed(name.to_string());
        }
        Self {
            punctuation,
            ..Self::default()
        }
    }
}

impl Aggregator for StyleAnalyzer {
    type Output = WritingStyle;

    fn observe(&mut self, message: &Message) {
        let Some(text) = message.text() else {
            return;
        };

        let len = char_len(text);
        self.lengths.push(len);
        self.total_chars += len;

        for (name, mark) in PUNCTUATION {
            let n = text.matches(mark).count() as u32;
            self.punctuation.add(name.to_string(), n);
        }

        for face in emoticons(text) {
            self.emoticons.bump(face.to_string());
        }

        let mut long_words = Vec::new();
        for word in alphabetic_words(text) {
            self.words += 1;
            if word.chars().next().is_some_and(char::is_uppercase) {
                self.capitalized += 1;
            }
            if word.chars().count() > 2 {
                long_words.push(word.to_lowercase());
            }
        }
        for pair in long_words.windows(2) {
            self.bigrams.bump(format!("{} {}", pair[0], pair[1]));
        }
    }

    fn finish(self) -> WritingStyle {
        let analyzed = self.lengths.len();
        let avg = if analyzed == 0 {
            0.0
        } else {
            self.total_chars as f64 / analyzed as f64
        };

        WritingStyle {
            avg_message_length: avg,
            message_lengths: self.lengths,
            punctuation_usage: self.punctuation,
            emoticon_usage: self.emoticons,
            capitalization_patterns: CapitalizationPatterns {
                total_words: self.words,
                capitalized_words: self.capitalized,
                capitalization_rate: percentage(self.capitalized, self.words),
            },
            common_phrases: self.bigrams.most_common(TOP_PHRASES),
            writing_style_metrics: WritingStyleMetrics {
                total_messages_analyzed: analyzed,
                total_characters: self.total_chars,
                chars_per_message: avg,
            },
        }
    }
}
