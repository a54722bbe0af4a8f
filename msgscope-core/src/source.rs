//! The seam to whatever delivers messages: a platform client, an export file,
//! or an in-memory list.

use futures::future::{self, BoxFuture};
use futures::stream::{self, BoxStream};
use futures::{FutureExt, StreamExt};
use serde::{Deserialize, Serialize};

use crate::error::SourceError;
use crate::message::Message;
use crate::profile::UserProfile;
use crate::target::TargetQuery;

pub type MessageStream<'a> = BoxStream<'a, Result<Message, SourceError>>;

/// Outcome of resolving a target, keeping "not there" apart from "try again".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
    Transient(String),
}

impl<T> Lookup<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Lookup::Transient(_))
    }
}

pub trait MessageSource: Sync {
    fn resolve<'a>(&'a self, query: &'a TargetQuery) -> BoxFuture<'a, Lookup<UserProfile>>;

    /// Open a fresh newest-first stream of at most `limit` messages.
    fn messages<'a>(
        &'a self,
        target: &'a UserProfile,
        limit: usize,
    ) -> Result<MessageStream<'a>, SourceError>;
}

/// A source backed by one profile and its messages held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pub profile: UserProfile,
    pub messages: Vec<Message>,
}

impl MemorySource {
    pub fn new(profile: UserProfile, messages: Vec<Message>) -> Self {
        Self { profile, messages }
    }
}

impl MessageSource for MemorySource {
    fn resolve<'a>(&'a self, query: &'a TargetQuery) -> BoxFuture<'a, Lookup<UserProfile>> {
        let lookup = if self.profile.matches(query) {
            Lookup::Found(self.profile.clone())
        } else {
            Lookup::NotFound
        };
        future::ready(lookup).boxed()
    }

    fn messages<'a>(
        &'a self,
        _target: &'a UserProfile,
        limit: usize,
    ) -> Result<MessageStream<'a>, SourceError> {
        Ok(stream::iter(self.messages.iter().take(limit).cloned().map(Ok)).boxed())
    }
}

/// A conversation dump: one profile and its messages, newest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationExport {
    #[serde(default)]
    pub profile: UserProfile,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl ConversationExport {
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn into_source(self) -> MemorySource {
        MemorySource::new(self.profile, self.messages)
    }
}

/// Resolve a query, falling back from a name's suggested username to the
/// name itself.
pub async fn resolve_target<S: MessageSource + ?Sized>(
    source: &S,
    query: &TargetQuery,
) -> Lookup<UserProfile> {
    if let TargetQuery::Name { suggested, .. } = query {
        let by_handle = TargetQuery::Username(suggested.clone());
        match source.resolve(&by_handle).await {
            Lookup::Found(profile) => {
                tracing::info!(username = %suggested, "resolved name through suggested username");
                return Lookup::Found(profile);
            }
            Lookup::Transient(reason) => return Lookup::Transient(reason),
            Lookup::NotFound => {
                tracing::debug!(username = %suggested, "suggested username not found");
            }
        }
    }
    source.resolve(query).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn profile() -> UserProfile {
        UserProfile {
            id: 7,
            username: Some("anaperez".into()),
            first_name: Some("Ana".into()),
            last_name: Some("Pérez".into()),
            ..UserProfile::default()
        }
    }

    fn message(id: i64) -> Message {
        Message {
            id,
            date: "2024-01-01T00:00:00Z".into(),
            text: Some(format!("m{id}")),
            media: None,
            is_reply: false,
            is_forward: false,
            sender_id: None,
            views: None,
            forwards: None,
            reactions: Vec::new(),
        }
    }

    #[tokio::test]
    async fn memory_source_honors_limit_and_restarts() {
        let source = MemorySource::new(profile(), (1..=5).rev().map(message).collect());
        let target = profile();
        let first: Vec<_> = source.messages(&target, 3).unwrap().collect().await;
        assert_eq!(first.len(), 3);
        let again: Vec<_> = source.messages(&target, 10).unwrap().collect().await;
        assert_eq!(again.len(), 5);
        assert_eq!(again[0].as_ref().unwrap().id, 5);
    }

    #[tokio::test]
    async fn name_query_tries_suggested_username_first() {
        let source = MemorySource::new(profile(), Vec::new());
        let query = TargetQuery::parse("Ana Perez");
        assert!(matches!(
            resolve_target(&source, &query).await,
            Lookup::Found(p) if p.id == 7
        ));
    }

    #[test]
    fn export_document_tolerates_missing_fields() {
        let export = ConversationExport::from_json_str(
            r#"{"profile": {"id": 9, "username": "bob"},
                "messages": [{"id": 2, "date": "2024-01-02T00:00:00Z", "text": "hi"},
                             {"id": 1, "date": "2024-01-01T00:00:00Z"}]}"#,
        )
        .unwrap();
        assert_eq!(export.profile.id, 9);
        assert!(!export.profile.verified);
        assert_eq!(export.messages.len(), 2);
        assert!(export.messages[1].text().is_none());
    }

    #[tokio::test]
    async fn unknown_target_is_not_found() {
        let source = MemorySource::new(profile(), Vec::new());
        let query = TargetQuery::parse("@someoneelse");
        assert_eq!(resolve_target(&source, &query).await, Lookup::NotFound);
    }
}
