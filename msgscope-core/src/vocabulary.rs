use serde::Serialize;

use crate::aggregate::Aggregator;
use crate::lexicon::CompiledLexicons;
use crate::message::Message;
use crate::tally::Tally;
use crate::text::vocabulary_tokens;

pub const DEFAULT_TOP_WORDS: usize = 50;
const FREQUENCY_TABLE_SIZE: usize = 100;

#[derive(Debug, Clone, Default, Serialize)]
pub struct WordAnalysis {
    pub total_unique_words: usize,
    pub most_common_words: Vec<(String, u32)>,
    pub word_frequency: Tally<String>,
}

/// Word frequency over every message with text.
pub struct VocabularyAnalyzer<'a> {
    lexicons: &'a CompiledLexicons,
    top_n: usize,
    words: Tally<String>,
}

impl<'a> VocabularyAnalyzer<'a> {
    pub fn new(lexicons: &'a CompiledLexicons, top_n: usize) -> Self {
        Self {
            lexicons,
            top_n,
            words: Tally::new(),
        }
    }
}

impl Aggregator for VocabularyAnalyzer<'_> {
    type Output = WordAnalysis;

    fn observe(&mut self, message: &Message) {
        let Some(text) = message.text() else {
            return;
        };
        for word in vocabulary_tokens(text, &self.lexicons.stop_words) {
            self.words.bump(word);
        }
    }

    fn finish(self) -> WordAnalysis {
        let analysis = WordAnalysis {
            total_unique_words: self.words.len(),
            most_common_words: self.words.most_common(self.top_n),
            word_frequency: self.words.ranked(FREQUENCY_TABLE_SIZE),
        };
        tracing::info!(
            unique = analysis.total_unique_words,
            "vocabulary analysis finished"
        );
        analysis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::fold_messages;
    use crate::testing::text_msg;

    #[test]
    fn counts_words_across_messages() {
        let lex = CompiledLexicons::builtin();
        let msgs = vec![
            text_msg(3, "2024-01-01T10:00:00Z", "hola que tal"),
            text_msg(2, "2024-01-01T09:00:00Z", "HOLA amigo"),
            text_msg(1, "2024-01-01T08:00:00Z", ""),
        ];
        let out = fold_messages(&msgs, VocabularyAnalyzer::new(&lex, DEFAULT_TOP_WORDS));
        assert_eq!(
            out.most_common_words,
            vec![
                ("hola".to_string(), 2),
                ("tal".to_string(), 1),
                ("amigo".to_string(), 1)
            ]
        );
        assert_eq!(out.total_unique_words, 3);
        assert_eq!(out.word_frequency.get(&"hola".to_string()), 2);
        assert_eq!(out.word_frequency.get(&"que".to_string()), 0);
    }

    #[test]
    fn ties_keep_first_seen_order_across_runs() {
        let lex = CompiledLexicons::builtin();
        let msgs = vec![
            text_msg(2, "2024-01-01T10:00:00Z", "zorro gato"),
            text_msg(1, "2024-01-01T09:00:00Z", "gato zorro perro"),
        ];
        let first = fold_messages(&msgs, VocabularyAnalyzer::new(&lex, 10)).most_common_words;
        let second = fold_messages(&msgs, VocabularyAnalyzer::new(&lex, 10)).most_common_words;
        assert_eq!(first, second);
        assert_eq!(first[0].0, "zorro");
        assert_eq!(first[1].0, "gato");
        assert_eq!(first[2].0, "perro");
    }

    #[test]
    fn top_n_truncates_ranking() {
        let lex = CompiledLexicons::builtin();
        let msgs = vec![text_msg(1, "2024-01-01T10:00:00Z", "uno dos tres cuatro cinco")];
        let out = fold_messages(&msgs, VocabularyAnalyzer::new(&lex, 2));
        assert_eq!(out.most_common_words.len(), 2);
        assert_eq!(out.total_unique_words, 5);
    }
}
