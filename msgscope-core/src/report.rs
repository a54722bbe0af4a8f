//! The assembled profile report and its plain-text rendering.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::categories::MessageCategories;
use crate::error::AnalysisError;
use crate::geo::GeoMentions;
use crate::history::{MessageDigest, MessageStatistics, TimelineEvent};
use crate::patterns::BehaviorPatterns;
use crate::profile::{or_na, UserProfile, NOT_AVAILABLE};
use crate::sentiment::SentimentBreakdown;
use crate::style::WritingStyle;
use crate::text::preview;
use crate::topics::TopicAnalysis;
use crate::vocabulary::WordAnalysis;

const TIMELINE_LINES: usize = 10;
const TOP_WORD_LINES: usize = 10;
const LOCATION_LINES: usize = 10;
const DETAIL_LINES: usize = 20;
const DETAIL_PREVIEW: usize = 150;
const VOCABULARY_LINES: usize = 25;

/// JSON shape a failed section collapses to.
pub trait SlotShape {
    const LIST: bool = false;
}

impl<T> SlotShape for Vec<T> {
    const LIST: bool = true;
}

impl SlotShape for MessageStatistics {}
impl SlotShape for BehaviorPatterns {}
impl SlotShape for GeoMentions {}
impl SlotShape for SentimentBreakdown {}
impl SlotShape for WordAnalysis {}
impl SlotShape for MessageCategories {}
impl SlotShape for TopicAnalysis {}
impl SlotShape for WritingStyle {}

/// One report section.
#[derive(Debug, Clone, Default)]
pub enum Slot<T> {
    /// Not requested by the tier.
    #[default]
    Skipped,
    /// Requested but errored or panicked.
    Failed,
    Done(T),
}

impl<T> Slot<T> {
    pub fn done(&self) -> Option<&T> {
        match self {
            Slot::Done(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Slot::Skipped)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Slot::Failed)
    }
}

impl<T> From<Result<T, AnalysisError>> for Slot<T> {
    fn from(result: Result<T, AnalysisError>) -> Self {
        match result {
            Ok(v) => Slot::Done(v),
            Err(_) => Slot::Failed,
        }
    }
}

impl<T: Serialize + SlotShape> Serialize for Slot<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Slot::Done(v) => v.serialize(serializer),
            Slot::Failed if T::LIST => serializer.serialize_seq(Some(0))?.end(),
            Slot::Failed => serializer.serialize_map(Some(0))?.end(),
            Slot::Skipped => serializer.serialize_none(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileReport {
    pub user_info: UserProfile,
    #[serde(skip_serializing_if = "Slot::is_skipped")]
    pub message_statistics: Slot<MessageStatistics>,
    #[serde(skip_serializing_if = "Slot::is_skipped")]
    pub behavior_patterns: Slot<BehaviorPatterns>,
    #[serde(skip_serializing_if = "Slot::is_skipped")]
    pub geolocation_analysis: Slot<GeoMentions>,
    #[serde(skip_serializing_if = "Slot::is_skipped")]
    pub sentiment_analysis: Slot<SentimentBreakdown>,
    #[serde(skip_serializing_if = "Slot::is_skipped")]
    pub activity_timeline: Slot<Vec<TimelineEvent>>,
    #[serde(skip_serializing_if = "Slot::is_skipped")]
    pub full_messages: Slot<Vec<MessageDigest>>,
    #[serde(skip_serializing_if = "Slot::is_skipped")]
    pub word_analysis: Slot<WordAnalysis>,
    #[serde(skip_serializing_if = "Slot::is_skipped")]
    pub message_categories: Slot<MessageCategories>,
    #[serde(skip_serializing_if = "Slot::is_skipped")]
    pub conversation_topics: Slot<TopicAnalysis>,
    #[serde(skip_serializing_if = "Slot::is_skipped")]
    pub writing_style_analysis: Slot<WritingStyle>,
    pub search_timestamp: String,
    pub report_version: String,
    pub lexicon_version: String,
}

impl ProfileReport {
    /// Empty report: every section skipped.
    pub fn new(
        user_info: UserProfile,
        report_version: &str,
        lexicon_version: &str,
        searched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_info,
            message_statistics: Slot::Skipped,
            behavior_patterns: Slot::Skipped,
            geolocation_analysis: Slot::Skipped,
            sentiment_analysis: Slot::Skipped,
            activity_timeline: Slot::Skipped,
            full_messages: Slot::Skipped,
            word_analysis: Slot::Skipped,
            message_categories: Slot::Skipped,
            conversation_topics: Slot::Skipped,
            writing_style_analysis: Slot::Skipped,
            search_timestamp: searched_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            report_version: report_version.to_string(),
            lexicon_version: lexicon_version.to_string(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, AnalysisError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Names of sections that were requested but failed.
    pub fn failed_sections(&self) -> Vec<&'static str> {
        let flags = [
            ("message_statistics", self.message_statistics.is_failed()),
            ("behavior_patterns", self.behavior_patterns.is_failed()),
            ("geolocation_analysis", self.geolocation_analysis.is_failed()),
            ("sentiment_analysis", self.sentiment_analysis.is_failed()),
            ("activity_timeline", self.activity_timeline.is_failed()),
            ("full_messages", self.full_messages.is_failed()),
            ("word_analysis", self.word_analysis.is_failed()),
            ("message_categories", self.message_categories.is_failed()),
            ("conversation_topics", self.conversation_topics.is_failed()),
            ("writing_style_analysis", self.writing_style_analysis.is_failed()),
        ];
        flags
            .into_iter()
            .filter(|(_, failed)| *failed)
            .map(|(name, _)| name)
            .collect()
    }
}

pub fn render_text(report: &ProfileReport) -> String {
    TextReport(report).to_string()
}

/// Flat text form of a report. Sections appear in a fixed order and only
/// when their analysis completed.
pub struct TextReport<'a>(pub &'a ProfileReport);

fn heading(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "{title}")?;
    writeln!(f, "{}", "-".repeat(title.chars().count()))
}

fn opt_num<T: fmt::Display>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.0;
        let user = &r.user_info;

        writeln!(f, "=== MSGSCOPE PROFILE REPORT ===")?;
        writeln!(f, "Date: {}", r.search_timestamp)?;
        writeln!(f, "Report version: {}", r.report_version)?;

        heading(f, "USER INFORMATION")?;
        writeln!(f, "ID: {}", user.id)?;
        writeln!(f, "Username: @{}", or_na(&user.username))?;
        writeln!(f, "Name: {}", user.display_name())?;
        writeln!(f, "Phone: {}", or_na(&user.phone))?;
        writeln!(f, "Verified: {}", user.verified)?;
        writeln!(f, "Premium: {}", user.premium)?;
        writeln!(f, "Bot: {}", user.bot)?;
        writeln!(f, "Bio: {}", or_na(&user.bio))?;

        heading(f, "STATUS")?;
        writeln!(f, "Last seen: {}", or_na(&user.last_seen))?;
        writeln!(f, "Status: {}", or_na(&user.status))?;
        writeln!(f, "Data center: {}", opt_num(user.dc_id))?;
        writeln!(f, "Language: {}", or_na(&user.lang_code))?;
        writeln!(f, "Common chats: {}", user.common_chats_count)?;

        heading(f, "SECURITY")?;
        writeln!(f, "Restricted: {}", user.restricted)?;
        writeln!(f, "Scam: {}", user.scam)?;
        writeln!(f, "Fake: {}", user.fake)?;

        if let Some(stats) = r.message_statistics.done() {
            heading(f, "MESSAGE STATISTICS")?;
            writeln!(f, "Total messages analyzed: {}", stats.total_messages)?;
            writeln!(f, "Photos: {}", stats.photos_count)?;
            writeln!(f, "Videos: {}", stats.videos_count)?;
            writeln!(f, "Documents: {}", stats.documents_count)?;
            writeln!(f, "Audio: {}", stats.audio_count)?;
            writeln!(f, "First message: {}", or_na(&stats.first_message_date))?;
            writeln!(f, "Last message: {}", or_na(&stats.last_message_date))?;
        }

        if let Some(photo) = &user.photo {
            writeln!(f)?;
            writeln!(f, "Profile photo saved at: {photo}")?;
        }

        if let Some(p) = r.behavior_patterns.done() {
            write_patterns(f, p)?;
        }

        if let Some(s) = r.sentiment_analysis.done() {
            heading(f, "SENTIMENT ANALYSIS")?;
            writeln!(
                f,
                "Positive: {:.1}% ({} messages)",
                s.positive_percentage, s.positive_count
            )?;
            writeln!(
                f,
                "Negative: {:.1}% ({} messages)",
                s.negative_percentage, s.negative_count
            )?;
            writeln!(
                f,
                "Neutral: {:.1}% ({} messages)",
                s.neutral_percentage, s.neutral_count
            )?;
            writeln!(f, "Total messages analyzed: {}", s.total_messages)?;
        }

        if let Some(geo) = r.geolocation_analysis.done() {
            heading(f, "GEOGRAPHIC ANALYSIS")?;
            if geo.mentioned_locations.is_empty() {
                writeln!(f, "No location mentions found in the analyzed messages.")?;
            } else {
                let shown: Vec<&str> = geo
                    .mentioned_locations
                    .iter()
                    .take(LOCATION_LINES)
                    .map(String::as_str)
                    .collect();
                writeln!(f, "Mentioned locations: {}", shown.join(", "))?;
                writeln!(f, "Total mentions: {}", geo.total_mentions)?;
                writeln!(f, "Unique locations: {}", geo.unique_locations)?;
            }
        }

        if let Some(timeline) = r.activity_timeline.done() {
            heading(f, "RECENT TIMELINE (last 10 events)")?;
            for event in timeline.iter().take(TIMELINE_LINES) {
                write!(f, "- {}: {}", event.date, event.kind)?;
                if let Some(preview) = &event.content_preview {
                    write!(f, " - {preview}")?;
                }
                writeln!(f)?;
            }
        }

        if let Some(digests) = r.full_messages.done() {
            write_message_detail(f, digests)?;
        }

        if let Some(words) = r.word_analysis.done() {
            heading(f, "VOCABULARY")?;
            writeln!(f, "Unique words: {}", words.total_unique_words)?;
            for (word, count) in words.most_common_words.iter().take(VOCABULARY_LINES) {
                writeln!(f, "- '{word}': {count} times")?;
            }
        }

        if let Some(topics) = r.conversation_topics.done() {
            heading(f, "CONVERSATION TOPICS")?;
            let mut any = false;
            for (label, count) in topics.topic_counts.iter().filter(|(_, n)| *n > 0) {
                writeln!(f, "- {label}: {count} messages")?;
                any = true;
            }
            if any {
                writeln!(f, "Main topics: {}", topics.most_common_topics.join(", "))?;
            } else {
                writeln!(f, "No recurring topics detected.")?;
            }
        }

        if let Some(cats) = r.message_categories.done() {
            let s = &cats.stats;
            heading(f, "MESSAGE CATEGORIES")?;
            writeln!(f, "Text: {}", s.text_only_count)?;
            writeln!(f, "With links: {}", s.with_links_count)?;
            writeln!(f, "With media: {}", s.with_media_count)?;
            writeln!(f, "Questions: {}", s.questions_count)?;
            writeln!(f, "Exclamations: {}", s.exclamations_count)?;
            writeln!(f, "Long (>200 chars): {}", s.long_messages_count)?;
            writeln!(f, "Short (<50 chars): {}", s.short_messages_count)?;
        }

        if let Some(style) = r.writing_style_analysis.done() {
            let punct = |name: &str| style.punctuation_usage.get(&name.to_string());
            heading(f, "WRITING STYLE")?;
            writeln!(
                f,
                "Average message length: {:.1} characters",
                style.avg_message_length
            )?;
            writeln!(
                f,
                "Messages analyzed: {}",
                style.writing_style_metrics.total_messages_analyzed
            )?;
            writeln!(f, "Punctuation:")?;
            writeln!(f, "  - Periods: {}", punct("periods"))?;
            writeln!(f, "  - Commas: {}", punct("commas"))?;
            writeln!(f, "  - Exclamations: {}", punct("exclamations"))?;
            writeln!(f, "  - Questions: {}", punct("questions"))?;
            writeln!(
                f,
                "Capitalization rate: {:.1}%",
                style.capitalization_patterns.capitalization_rate
            )?;
        }

        Ok(())
    }
}

fn write_message_detail(f: &mut fmt::Formatter<'_>, digests: &[MessageDigest]) -> fmt::Result {
    heading(
        f,
        &format!("MESSAGE DETAIL (first {DETAIL_LINES} of {})", digests.len()),
    )?;
    for (i, d) in digests.iter().take(DETAIL_LINES).enumerate() {
        writeln!(f, "[{}] {} (id {})", i + 1, d.date, d.id)?;
        if d.text.is_empty() {
            writeln!(f, "  Text: (none)")?;
        } else {
            writeln!(f, "  Text: {}", preview(&d.text, DETAIL_PREVIEW))?;
        }
        writeln!(f, "  Type: {}", d.media_type)?;
        let links = d.urls.as_ref().map_or(0, Vec::len);
        if links > 0 {
            writeln!(f, "  Links: {links}")?;
        }
    }
    Ok(())
}

fn write_patterns(f: &mut fmt::Formatter<'_>, p: &BehaviorPatterns) -> fmt::Result {
    heading(f, "BEHAVIOR ANALYSIS")?;
    writeln!(f, "Messages processed: {}", p.total_messages_processed)?;
    writeln!(
        f,
        "Messages with text: {} ({:.1}%)",
        p.messages_with_text, p.text_percentage
    )?;
    writeln!(
        f,
        "Messages with media: {} ({:.1}%)",
        p.total_media, p.media_percentage
    )?;
    writeln!(
        f,
        "Replies: {} ({:.1}%)",
        p.reply_frequency, p.reply_percentage
    )?;
    writeln!(
        f,
        "Forwards: {} ({:.1}%)",
        p.forward_frequency, p.forward_percentage
    )?;

    writeln!(f, "Activity schedule (UTC):")?;
    match p.most_active_hour {
        Some((hour, count)) => writeln!(f, "Most active hour: {hour:02}:00 ({count} messages)")?,
        None => writeln!(f, "Most active hour: not available")?,
    }
    if let Some((day, count)) = &p.most_active_day {
        writeln!(f, "Most active day: {day} ({count} messages)")?;
    }
    if let Some((month, count)) = &p.most_active_month {
        writeln!(f, "Most active month: {month} ({count} messages)")?;
    }

    heading(f, "TEXT STATISTICS")?;
    writeln!(f, "Average length: {:.1} characters", p.avg_message_length)?;
    writeln!(f, "Longest: {} characters", p.max_message_length)?;
    writeln!(f, "Shortest: {} characters", p.min_message_length)?;

    writeln!(f, "Media types:")?;
    for (kind, count) in p.media_frequency.iter() {
        writeln!(f, "- {kind}: {count}")?;
    }

    writeln!(f, "Most used words (top 10):")?;
    for (word, count) in p.most_common_words.iter().take(TOP_WORD_LINES) {
        writeln!(f, "- '{word}': {count} times")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tally::Tally;
    use chrono::TimeZone;

    fn report() -> ProfileReport {
        let profile = UserProfile {
            id: 42,
            username: Some("ana".into()),
            first_name: Some("Ana".into()),
            ..UserProfile::default()
        };
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        ProfileReport::new(profile, "3.0", "2024.1", at)
    }

    #[test]
    fn skipped_sections_are_omitted_and_failed_ones_are_empty() {
        let mut r = report();
        r.sentiment_analysis = Slot::Failed;
        r.activity_timeline = Slot::Failed;
        r.geolocation_analysis = Slot::Done(GeoMentions::default());

        let json = serde_json::to_value(&r).unwrap();
        assert!(json.get("word_analysis").is_none());
        assert_eq!(json["sentiment_analysis"], serde_json::json!({}));
        assert_eq!(json["activity_timeline"], serde_json::json!([]));
        assert_eq!(json["geolocation_analysis"]["total_mentions"], 0);
        assert_eq!(json["search_timestamp"], "2024-05-01T12:00:00Z");
        assert_eq!(json["report_version"], "3.0");
        assert_eq!(
            r.failed_sections(),
            vec!["sentiment_analysis", "activity_timeline"]
        );
    }

    #[test]
    fn text_renders_only_completed_sections() {
        let mut r = report();
        r.sentiment_analysis = Slot::Failed;
        r.geolocation_analysis = Slot::Done(GeoMentions::default());
        let text = render_text(&r);
        assert!(text.contains("Username: @ana"));
        assert!(text.contains("Name: Ana N/A"));
        assert!(text.contains("Phone: N/A"));
        assert!(text.contains("No location mentions found"));
        assert!(!text.contains("SENTIMENT ANALYSIS"));
        assert!(!text.contains("BEHAVIOR ANALYSIS"));
    }

    #[test]
    fn absent_most_active_hour_is_not_an_error() {
        let mut r = report();
        r.behavior_patterns = Slot::Done(BehaviorPatterns::default());
        let text = render_text(&r);
        assert!(text.contains("Most active hour: not available"));
        assert!(!text.contains("Most active day"));
    }

    #[test]
    fn geo_section_lists_at_most_ten_locations() {
        let mut r = report();
        let places: Vec<String> = (0..12).map(|i| format!("place{i}")).collect();
        r.geolocation_analysis = Slot::Done(GeoMentions {
            unique_locations: places.len(),
            total_mentions: 12,
            mentioned_locations: places,
        });
        let text = render_text(&r);
        assert!(text.contains("place9"));
        assert!(!text.contains("place10"));
        assert!(text.contains("Unique locations: 12"));
    }

    #[test]
    fn message_detail_lists_the_first_twenty_digests() {
        use crate::testing::text_msg;

        let mut r = report();
        let long = "x".repeat(180);
        let links = text_msg(30, "2024-05-01T10:00:00Z", "see https://a.io and https://b.io");
        let mut digests = vec![
            MessageDigest::from(&links),
            MessageDigest::from(&text_msg(29, "2024-05-01T09:00:00Z", &long)),
        ];
        for id in 0..20 {
            let filler = text_msg(id, "2024-04-01T00:00:00Z", "filler");
            digests.push(MessageDigest::from(&filler));
        }
        r.full_messages = Slot::Done(digests);
        r.word_analysis = Slot::Done(WordAnalysis::default());

        let text = render_text(&r);
        assert!(text.contains("MESSAGE DETAIL (first 20 of 22)"));
        assert!(text.contains("see https://a.io and https://b.io"));
        assert!(text.contains("  Links: 2"));
        assert!(text.contains(&format!("{}...", "x".repeat(150))));
        assert!(text.contains("[20] "));
        assert!(!text.contains("[21] "));
        assert!(text.find("MESSAGE DETAIL").unwrap() < text.find("VOCABULARY").unwrap());
    }

    #[test]
    fn topics_section_lists_every_detected_topic() {
        let mut r = report();
        let mut counts = Tally::new();
        let seen = [
            ("sports", 3),
            ("food", 0),
            ("music", 1),
            ("travel", 2),
            ("work", 1),
            ("games", 1),
            ("study", 1),
        ];
        for (label, n) in seen {
            counts.add(label.to_string(), n);
        }
        r.conversation_topics = Slot::Done(TopicAnalysis {
            topic_counts: counts,
            topic_messages: Vec::new(),
            most_common_topics: vec!["sports".into(), "travel".into()],
        });
        let text = render_text(&r);
        for label in ["sports", "music", "travel", "work", "games", "study"] {
            assert!(text.contains(&format!("- {label}: ")), "{label} missing");
        }
        assert!(!text.contains("- food: "));
        assert!(text.contains("Main topics: sports, travel"));
    }

    #[test]
    fn error_converts_to_failed_slot() {
        let slot: Slot<WordAnalysis> = Err(AnalysisError::Empty).into();
        assert!(slot.is_failed());
        assert!(slot.done().is_none());
    }
}
