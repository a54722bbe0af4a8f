use serde::Serialize;

use crate::aggregate::Aggregator;
use crate::message::Message;
use crate::tally::Tally;
use crate::text::clip;

pub const DEFAULT_GROUP_LIMIT: usize = 1000;
const TOP_POSTERS: usize = 10;
const RECENT_CAP: usize = 50;
const RECENT_TEXT: usize = 200;

#[derive(Debug, Clone, Serialize)]
pub struct TopPoster {
    pub user_id: i64,
    pub message_count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentMessage {
    pub date: String,
    pub sender_id: Option<i64>,
    pub text: String,
    pub media_type: &'static str,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GroupActivity {
    pub total_messages: usize,
    pub active_users: Tally<i64>,
    pub message_frequency: Tally<String>,
    pub top_posters: Vec<TopPoster>,
    pub recent_activity: Vec<RecentMessage>,
}

/// Who posts in a group, and on which days.
#[derive(Default)]
pub struct GroupActivityAnalyzer {
    total: usize,
    senders: Tally<i64>,
    days: Tally<String>,
    recent: Vec<RecentMessage>,
}

impl GroupActivityAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Aggregator for GroupActivityAnalyzer {
    type Output = GroupActivity;

    fn observe(&mut self, message: &Message) {
        self.total += 1;
        if let Some(sender) = message.sender_id {
            self.senders.bump(sender);
        }
        if let Some(ts) = message.timestamp() {
            self.days.bump(ts.format("%Y-%m-%d").to_string());
        }
        if self.recent.len() < RECENT_CAP {
            self.recent.push(RecentMessage {
                date: message.date.clone(),
                sender_id: message.sender_id,
                text: message.text().map(|t| clip(t, RECENT_TEXT)).unwrap_or_default(),
                media_type: message.media_label(),
            });
        }
    }

    fn finish(self) -> GroupActivity {
        let top_posters = self
            .senders
            .most_common(TOP_POSTERS)
            .into_iter()
            .map(|(user_id, message_count)| TopPoster {
                user_id,
                message_count,
            })
            .collect();
        tracing::info!(
            messages = self.total,
            senders = self.senders.len(),
            "group activity analyzed"
        );
        GroupActivity {
            total_messages: self.total,
            active_users: self.senders,
            message_frequency: self.days,
            top_posters,
            recent_activity: self.recent,
        }
    }
}
