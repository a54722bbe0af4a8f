use chrono::{Datelike, Timelike};
use serde::Serialize;

use crate::aggregate::Aggregator;
use crate::lexicon::CompiledLexicons;
use crate::message::Message;
use crate::tally::{percentage, Tally};
use crate::text::{alphabetic_words, char_len};

const TOP_WORDS: usize = 15;
const PROGRESS_EVERY: usize = 100;

const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Clone, Default, Serialize)]
pub struct BehaviorPatterns {
    pub activity_hours: Tally<u32>,
    pub activity_days: Tally<String>,
    pub activity_months: Tally<String>,
    pub message_lengths: Vec<usize>,
    pub media_frequency: Tally<String>,
    pub reply_frequency: usize,
    pub forward_frequency: usize,
    pub total_messages_processed: usize,
    pub messages_with_text: usize,
    pub messages_with_dates: usize,
    pub total_messages_analyzed: usize,
    pub avg_message_length: f64,
    pub max_message_length: usize,
    pub min_message_length: usize,
    pub most_active_hour: Option<(u32, u32)>,
    pub most_active_day: Option<(String, u32)>,
    pub most_active_month: Option<(String, u32)>,
    pub most_common_words: Vec<(String, u32)>,
    pub total_media: u64,
    pub media_percentage: f64,
    pub text_percentage: f64,
    pub reply_percentage: f64,
    pub forward_percentage: f64,
}

/// When and how the target writes: hour, weekday and month histograms plus
/// length, media and reply/forward ratios.
pub struct PatternAnalyzer<'a> {
    lexicons: &'a CompiledLexicons,
    limit: usize,
    hours: Tally<u32>,
    days: Tally<String>,
    months: Tally<String>,
    lengths: Vec<usize>,
    words: Tally<String>,
    media: Tally<String>,
    replies: usize,
    forwards: usize,
    processed: usize,
    with_text: usize,
    with_dates: usize,
}

impl<'a> PatternAnalyzer<'a> {
    /// `limit` is the number of messages requested from the source; it is
    /// reported as-is next to the number actually processed.
    pub fn new(lexicons: &'a CompiledLexicons, limit: usize) -> Self {
        Self {
            lexicons,
            limit,
            hours: Tally::new(),
            days: Tally::new(),
            months: Tally::new(),
            lengths: Vec::new(),
            words: Tally::new(),
            media: Tally::new(),
            replies: 0,
            forwards: 0,
            processed: 0,
            with_text: 0,
            with_dates: 0,
        }
    }
}

impl Aggregator for PatternAnalyzer<'_> {
    type Output = BehaviorPatterns;

    fn observe(&mut self, message: &Message) {
        self.processed += 1;

        match message.timestamp() {
            Some(ts) => {
                self.with_dates += 1;
                self.hours.bump(ts.hour());
                let weekday = ts.weekday().num_days_from_monday() as usize;
                self.days.bump(DAY_NAMES[weekday].to_string());
                self.months.bump(MONTH_NAMES[ts.month0() as usize].to_string());
            }
            None => tracing::debug!(id = message.id, date = %message.date, "unparsable message date"),
        }

        if let Some(text) = message.text() {
            self.with_text += 1;
            self.lengths.push(char_len(text));
            let lowered = text.to_lowercase();
            for word in alphabetic_words(&lowered) {
                if word.chars().count() > 2 && !self.lexicons.pattern_stop_words.contains(word) {
                    self.words.bump(word.to_string());
                }
            }
        }

        if let Some(kind) = message.media_kind() {
            self.media.bump(kind.label().to_string());
        }
        if message.is_reply {
            self.replies += 1;
        }
        if message.is_forward {
            self.forwards += 1;
        }

        if self.processed % PROGRESS_EVERY == 0 {
            tracing::debug!(processed = self.processed, limit = self.limit, "pattern analysis progress");
        }
    }

    fn finish(self) -> BehaviorPatterns {
        let total = self.processed;
        let (avg, max, min) = if self.lengths.is_empty() {
            (0.0, 0, 0)
        } else {
            let sum: usize = self.lengths.iter().sum();
            (
                sum as f64 / self.lengths.len() as f64,
                self.lengths.iter().copied().max().unwrap_or(0),
                self.lengths.iter().copied().min().unwrap_or(0),
            )
        };
        let total_media = self.media.total();

        tracing::info!(processed = total, "pattern analysis finished");

        BehaviorPatterns {
            most_active_hour: self.hours.top(),
            most_active_day: self.days.top(),
            most_active_month: self.months.top(),
            most_common_words: self.words.most_common(TOP_WORDS),
            media_percentage: percentage(total_media as usize, total),
            text_percentage: percentage(self.with_text, total),
            reply_percentage: percentage(self.replies, total),
            forward_percentage: percentage(self.forwards, total),
            total_media,
            activity_hours: self.hours,
            activity_days: self.days,
            activity_months: self.months,
            message_lengths: self.lengths,
            media_frequency: self.media,
            reply_frequency: self.replies,
            forward_frequency: self.forwards,
            total_messages_processed: total,
            messages_with_text: self.with_text,
            messages_with_dates: self.with_dates,
            total_messages_analyzed: self.limit,
            avg_message_length: avg,
            max_message_length: max,
            min_message_length: min,
        }
    }
}
