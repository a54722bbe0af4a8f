use std::collections::HashSet;

use serde::Serialize;

use crate::aggregate::Aggregator;
use crate::lexicon::CompiledLexicons;
use crate::message::Message;

#[derive(Debug, Clone, Default, Serialize)]
pub struct GeoMentions {
    pub mentioned_locations: Vec<String>,
    pub total_mentions: usize,
    pub unique_locations: usize,
}

/// Lexical place mentions. Nothing is geocoded.
pub struct GeoExtractor<'a> {
    lexicons: &'a CompiledLexicons,
    seen: HashSet<String>,
    ordered: Vec<String>,
    total: usize,
}

impl<'a> GeoExtractor<'a> {
    pub fn new(lexicons: &'a CompiledLexicons) -> Self {
        Self {
            lexicons,
            seen: HashSet::new(),
            ordered: Vec::new(),
            total: 0,
        }
    }

    fn record(&mut self, mention: &str) {
        self.total += 1;
        if self.seen.insert(mention.to_string()) {
            self.ordered.push(mention.to_string());
        }
    }
}

impl Aggregator for GeoExtractor<'_> {
    type Output = GeoMentions;

    fn observe(&mut self, message: &Message) {
        let Some(text) = message.text() else {
            return;
        };
        let lexicons = self.lexicons;
        for pattern in &lexicons.location_patterns {
            for caps in pattern.captures_iter(text) {
                // group 1 when the pattern has one, the whole match otherwise
                let hit = caps.get(1).or_else(|| caps.get(0));
                if let Some(hit) = hit {
                    self.record(hit.as_str());
                }
            }
        }
    }

    fn finish(self) -> GeoMentions {
        if self.total > 0 {
            tracing::info!(
                mentions = self.total,
                unique = self.ordered.len(),
                "location mentions found"
            );
        }
        GeoMentions {
            unique_locations: self.ordered.len(),
            mentioned_locations: self.ordered,
            total_mentions: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::fold_messages;
    use crate::lexicon::Lexicons;
    use crate::testing::text_msg;

    #[test]
    fn mentions_are_deduplicated_in_first_seen_order() {
        let lex = CompiledLexicons::builtin();
        let msgs = vec![
            text_msg(3, "2024-01-01T00:00:00Z", "Vivo en Madrid, CP 28001"),
            text_msg(2, "2024-01-01T00:00:00Z", "de vuelta a Madrid desde Perú"),
            text_msg(1, "2024-01-01T00:00:00Z", "sin lugares"),
        ];
        let out = fold_messages(&msgs, GeoExtractor::new(&lex));
        assert_eq!(out.mentioned_locations, vec!["Madrid", "28001", "Perú"]);
        assert_eq!(out.total_mentions, 4);
        assert_eq!(out.unique_locations, 3);
    }

    #[test]
    fn place_phrases_keep_the_whole_phrase() {
        let lex = CompiledLexicons::builtin();
        let msgs = vec![text_msg(1, "2024-01-01T00:00:00Z", "quedamos en la plaza Mayor")];
        let out = fold_messages(&msgs, GeoExtractor::new(&lex));
        assert_eq!(out.mentioned_locations, vec!["plaza Mayor"]);
    }

    #[test]
    fn patterns_without_groups_use_the_whole_match() {
        let lex = Lexicons {
            location_patterns: vec![r"\bnorth pole\b".into()],
            ..Lexicons::default()
        }
        .compile()
        .unwrap();
        let msgs = vec![text_msg(1, "2024-01-01T00:00:00Z", "off to the North Pole")];
        let out = fold_messages(&msgs, GeoExtractor::new(&lex));
        assert_eq!(out.mentioned_locations, vec!["North Pole"]);
    }

    #[test]
    fn nothing_found_is_empty_not_missing() {
        let lex = CompiledLexicons::builtin();
        let out = fold_messages(&[], GeoExtractor::new(&lex));
        assert!(out.mentioned_locations.is_empty());
        assert_eq!(out.total_mentions, 0);
    }
}
