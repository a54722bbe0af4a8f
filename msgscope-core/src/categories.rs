use serde::Serialize;

use crate::aggregate::Aggregator;
use crate::message::Message;
use crate::text::{char_len, has_link};

pub const DEFAULT_SAMPLES_PER_CATEGORY: usize = 50;
const LONG_MESSAGE: usize = 200;
const SHORT_MESSAGE: usize = 50;

#[derive(Debug, Clone, Serialize)]
pub struct TextEntry {
    pub id: i64,
    pub date: String,
    pub text: String,
    pub length: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MediaEntry {
    pub id: i64,
    pub date: String,
    pub media_type: String,
    pub caption: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CategorySamples {
    pub text_only: Vec<TextEntry>,
    pub with_links: Vec<TextEntry>,
    pub with_media: Vec<MediaEntry>,
    pub questions: Vec<TextEntry>,
    pub exclamations: Vec<TextEntry>,
    pub long_messages: Vec<TextEntry>,
    pub short_messages: Vec<TextEntry>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryStats {
    pub text_only_count: usize,
    pub with_links_count: usize,
    pub with_media_count: usize,
    pub questions_count: usize,
    pub exclamations_count: usize,
    pub long_messages_count: usize,
    pub short_messages_count: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MessageCategories {
    pub categories: CategorySamples,
    pub stats: CategoryStats,
}

/// Sorts messages into overlapping content buckets. Counts are exact, the
/// stored samples stop at the cap.
pub struct CategoryAnalyzer {
    cap: usize,
    out: MessageCategories,
}

impl CategoryAnalyzer {
    pub fn new(sample_cap: usize) -> Self {
        Self {
            cap: sample_cap,
            out: MessageCategories::default(),
        }
    }
}

fn keep<T>(bucket: &mut Vec<T>, count: &mut usize, cap: usize, entry: impl FnOnce() -> T) {
    *count += 1;
    if bucket.len() < cap {
        bucket.push(entry());
    }
}

impl Aggregator for CategoryAnalyzer {
    type Output = MessageCategories;

    fn observe(&mut self, message: &Message) {
        let cap = self.cap;
        let MessageCategories { categories, stats } = &mut self.out;

        if let Some(text) = message.text() {
            let len = char_len(text);
            let entry = || TextEntry {
                id: message.id,
                date: message.date.clone(),
                text: text.to_string(),
                length: len,
            };

            keep(&mut categories.text_only, &mut stats.text_only_count, cap, entry);
            if has_link(text) {
                keep(&mut categories.with_links, &mut stats.with_links_count, cap, entry);
            }
            if text.contains('?') {
                keep(&mut categories.questions, &mut stats.questions_count, cap, entry);
            }
            if text.contains('!') {
                keep(&mut categories.exclamations, &mut stats.exclamations_count, cap, entry);
            }
            if len > LONG_MESSAGE {
                keep(&mut categories.long_messages, &mut stats.long_messages_count, cap, entry);
            }
            if len < SHORT_MESSAGE {
                keep(&mut categories.short_messages, &mut stats.short_messages_count, cap, entry);
            }
        }

        if message.media.is_some() {
            keep(&mut categories.with_media, &mut stats.with_media_count, cap, || MediaEntry {
                id: message.id,
                date: message.date.clone(),
                media_type: message.media_label().to_string(),
                caption: message.text().unwrap_or_default().to_string(),
            });
        }
    }

    fn finish(self) -> MessageCategories {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::fold_messages;
    use crate::message::MediaKind;
    use crate::testing::{media_msg, text_msg};

    #[test]
    fn buckets_overlap() {
        let msgs = vec![text_msg(1, "2024-01-01T00:00:00Z", "¿viste https://x.io? ¡wow!")];
        let out = fold_messages(&msgs, CategoryAnalyzer::new(DEFAULT_SAMPLES_PER_CATEGORY));
        let s = &out.stats;
        assert_eq!(
            (
                s.text_only_count,
                s.with_links_count,
                s.questions_count,
                s.exclamations_count,
                s.short_messages_count,
                s.long_messages_count
            ),
            (1, 1, 1, 1, 1, 0)
        );
    }

    #[test]
    fn captioned_media_is_text_and_media() {
        let mut photo = media_msg(2, "2024-01-01T00:00:00Z", MediaKind::Photo);
        photo.text = Some("mi perro".into());
        let msgs = vec![photo, media_msg(1, "2024-01-01T00:00:00Z", MediaKind::Voice)];
        let out = fold_messages(&msgs, CategoryAnalyzer::new(10));
        assert_eq!(out.stats.with_media_count, 2);
        assert_eq!(out.stats.text_only_count, 1);
        assert_eq!(out.categories.with_media[0].caption, "mi perro");
        assert_eq!(out.categories.with_media[1].media_type, "voice");
        assert_eq!(out.categories.with_media[1].caption, "");
    }

    #[test]
    fn counts_stay_exact_past_the_cap() {
        let long = "x".repeat(201);
        let msgs: Vec<_> = (0..5)
            .map(|i| text_msg(i, "2024-01-01T00:00:00Z", &long))
            .collect();
        let out = fold_messages(&msgs, CategoryAnalyzer::new(2));
        assert_eq!(out.stats.long_messages_count, 5);
        assert_eq!(out.categories.long_messages.len(), 2);
        assert_eq!(out.categories.long_messages[0].length, 201);
        assert_eq!(out.stats.short_messages_count, 0);
    }
}
