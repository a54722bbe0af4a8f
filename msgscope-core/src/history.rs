//! Per-message history views: aggregate statistics, a sorted activity
//! timeline, and a full digest of each message.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::aggregate::Aggregator;
use crate::message::{MediaKind, Message};
use crate::text::{extract_urls, preview};

const TIMELINE_PREVIEW: usize = 100;

#[derive(Debug, Clone, Default, Serialize)]
pub struct MessageStatistics {
    pub total_messages: usize,
    pub photos_count: usize,
    pub videos_count: usize,
    pub documents_count: usize,
    pub audio_count: usize,
    pub first_message_date: Option<String>,
    pub last_message_date: Option<String>,
}

/// Counts by media family. The stream is newest first, so the "first"
/// message date is the most recent one.
#[derive(Default)]
pub struct StatisticsCollector {
    stats: MessageStatistics,
}

impl StatisticsCollector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Aggregator for StatisticsCollector {
    type Output = MessageStatistics;

    fn observe(&mut self, message: &Message) {
        let stats = &mut self.stats;
        stats.total_messages += 1;
        match message.media_kind() {
            Some(MediaKind::Photo) => stats.photos_count += 1,
            Some(MediaKind::Video) => stats.videos_count += 1,
            Some(MediaKind::Audio | MediaKind::Voice) => stats.audio_count += 1,
            Some(MediaKind::Document | MediaKind::Sticker | MediaKind::Other) => {
                stats.documents_count += 1
            }
            _ => {}
        }
        if stats.first_message_date.is_none() {
            stats.first_message_date = Some(message.date.clone());
        }
        stats.last_message_date = Some(message.date.clone());
    }

    fn finish(self) -> MessageStatistics {
        self.stats
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineEvent {
    pub date: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub content_preview: Option<String>,
    pub media_type: &'static str,
}

#[derive(Default)]
pub struct TimelineBuilder {
    events: Vec<(Option<DateTime<Utc>>, TimelineEvent)>,
}

impl TimelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Aggregator for TimelineBuilder {
    type Output = Vec<TimelineEvent>;

    fn observe(&mut self, message: &Message) {
        let event = TimelineEvent {
            date: message.date.clone(),
            kind: "message",
            content_preview: message.text().map(|t| preview(t, TIMELINE_PREVIEW)),
            media_type: message.media_label(),
        };
        self.events.push((message.timestamp(), event));
    }

    /// Newest first. Events without a usable timestamp sink to the end in
    /// arrival order.
    fn finish(mut self) -> Vec<TimelineEvent> {
        self.events.sort_by_key(|(ts, _)| std::cmp::Reverse(*ts));
        self.events.into_iter().map(|(_, event)| event).collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageDigest {
    pub id: i64,
    pub date: String,
    pub text: String,
    pub media_type: &'static str,
    pub is_reply: bool,
    pub is_forward: bool,
    pub views: u32,
    pub forwards: u32,
    pub reactions: Option<BTreeMap<String, u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urls: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
}

impl From<&Message> for MessageDigest {
    fn from(message: &Message) -> Self {
        let reactions = (!message.reactions.is_empty()).then(|| {
            message
                .reactions
                .iter()
                .map(|r| (r.emoticon.clone(), r.count))
                .collect()
        });
        let media = message.media.as_ref();
        MessageDigest {
            id: message.id,
            date: message.date.clone(),
            text: message.text().unwrap_or_default().to_string(),
            media_type: message.media_label(),
            is_reply: message.is_reply,
            is_forward: message.is_forward,
            views: message.views.unwrap_or(0),
            forwards: message.forwards.unwrap_or(0),
            reactions,
            urls: message.text().map(extract_urls),
            mime_type: media.and_then(|m| m.mime_type.clone()),
            file_size: media.and_then(|m| m.file_size),
        }
    }
}

#[derive(Default)]
pub struct MessageDigester {
    out: Vec<MessageDigest>,
}

impl MessageDigester {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Aggregator for MessageDigester {
    type Output = Vec<MessageDigest>;

    fn observe(&mut self, message: &Message) {
        self.out.push(MessageDigest::from(message));
    }

    fn finish(self) -> Vec<MessageDigest> {
        tracing::info!(messages = self.out.len(), "message digest built");
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::fold_messages;
    use crate::message::{Media, Reaction};
    use crate::testing::{media_msg, text_msg};

    #[test]
    fn statistics_group_media_families() {
        let msgs = vec![
            media_msg(6, "2024-03-06T00:00:00Z", MediaKind::Photo),
            media_msg(5, "2024-03-05T00:00:00Z", MediaKind::Voice),
            media_msg(4, "2024-03-04T00:00:00Z", MediaKind::Audio),
            media_msg(3, "2024-03-03T00:00:00Z", MediaKind::Sticker),
            media_msg(2, "2024-03-02T00:00:00Z", MediaKind::WebPage),
            text_msg(1, "2024-03-01T00:00:00Z", "hola"),
        ];
        let out = fold_messages(&msgs, StatisticsCollector::new());
        assert_eq!(out.total_messages, 6);
        assert_eq!(out.photos_count, 1);
        assert_eq!(out.audio_count, 2);
        assert_eq!(out.documents_count, 1);
        assert_eq!(out.videos_count, 0);
        assert_eq!(out.first_message_date.as_deref(), Some("2024-03-06T00:00:00Z"));
        assert_eq!(out.last_message_date.as_deref(), Some("2024-03-01T00:00:00Z"));
    }

    #[test]
    fn empty_statistics_have_no_dates() {
        let out = fold_messages(&[], StatisticsCollector::new());
        assert!(out.first_message_date.is_none());
        assert!(out.last_message_date.is_none());
    }

    #[test]
    fn timeline_sorts_newest_first_with_bad_dates_last() {
        let msgs = vec![
            text_msg(4, "2024-01-01T00:00:00Z", "old"),
            text_msg(3, "garbage", "first bad"),
            text_msg(2, "2024-06-01T00:00:00+02:00", "new"),
            text_msg(1, "", "second bad"),
        ];
        let out = fold_messages(&msgs, TimelineBuilder::new());
        let previews: Vec<_> = out
            .iter()
            .map(|e| e.content_preview.as_deref().unwrap())
            .collect();
        assert_eq!(previews, vec!["new", "old", "first bad", "second bad"]);
        assert!(out.iter().all(|e| e.kind == "message"));
    }

    #[test]
    fn timeline_previews_are_cut_and_media_labelled() {
        let long = "a".repeat(150);
        let msgs = vec![
            text_msg(2, "2024-01-02T00:00:00Z", &long),
            media_msg(1, "2024-01-01T00:00:00Z", MediaKind::Video),
        ];
        let out = fold_messages(&msgs, TimelineBuilder::new());
        assert_eq!(out[0].content_preview.as_ref().unwrap().chars().count(), 103);
        assert_eq!(out[0].media_type, "text");
        assert!(out[1].content_preview.is_none());
        assert_eq!(out[1].media_type, "video");
    }

    #[test]
    fn digest_carries_urls_reactions_and_file_details() {
        let mut msg = text_msg(9, "2024-01-01T00:00:00Z", "mira https://a.io/x");
        msg.views = Some(12);
        msg.reactions = vec![Reaction {
            emoticon: "👍".into(),
            count: 3,
        }];
        msg.media = Some(Media {
            kind: MediaKind::Document,
            mime_type: Some("application/pdf".into()),
            file_size: Some(2048),
        });
        let out = fold_messages(&[msg], MessageDigester::new());
        let d = &out[0];
        assert_eq!(d.urls.as_deref(), Some(&["https://a.io/x".to_string()][..]));
        assert_eq!(d.reactions.as_ref().unwrap()["👍"], 3);
        assert_eq!(d.mime_type.as_deref(), Some("application/pdf"));
        assert_eq!(d.file_size, Some(2048));
        assert_eq!(d.views, 12);
        assert_eq!(d.forwards, 0);
        assert_eq!(d.media_type, "document");
    }

    #[test]
    fn digest_of_plain_media_has_no_urls_key() {
        let msg = media_msg(1, "2024-01-01T00:00:00Z", MediaKind::Photo);
        let json = serde_json::to_value(MessageDigest::from(&msg)).unwrap();
        assert!(json.get("urls").is_none());
        assert_eq!(json["text"], "");
        assert!(json["reactions"].is_null());
    }
}
