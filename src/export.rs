//! Message source over a JSON conversation export on disk.

use std::path::{Path, PathBuf};

use anyhow::Context;
use futures::future::BoxFuture;
use msgscope_core::source::MessageStream;
use msgscope_core::{
    ConversationExport, Lookup, MemorySource, MessageSource, SourceError, TargetQuery,
    UserProfile,
};

/// Reads `{ "profile": {...}, "messages": [...] }` once and serves fresh
/// streams from memory.
pub struct ExportSource {
    path: PathBuf,
    inner: MemorySource,
}

impl ExportSource {
    pub async fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let raw = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("reading export {}", path.display()))?;
        let export = ConversationExport::from_json_str(&raw)
            .with_context(|| format!("parsing export {}", path.display()))?;
        tracing::info!(
            path = %path.display(),
            messages = export.messages.len(),
            "export loaded"
        );
        Ok(Self {
            path,
            inner: export.into_source(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn profile(&self) -> &UserProfile {
        &self.inner.profile
    }

    pub fn message_count(&self) -> usize {
        self.inner.messages.len()
    }
}

impl MessageSource for ExportSource {
    fn resolve<'a>(&'a self, query: &'a TargetQuery) -> BoxFuture<'a, Lookup<UserProfile>> {
        tracing::debug!(%query, path = %self.path.display(), "resolving against export");
        self.inner.resolve(query)
    }

    fn messages<'a>(
        &'a self,
        target: &'a UserProfile,
        limit: usize,
    ) -> Result<MessageStream<'a>, SourceError> {
        if target.id != self.inner.profile.id {
            return Err(SourceError::Fatal(format!(
                "{} holds no conversation with account {}",
                self.path.display(),
                target.id
            )));
        }
        self.inner.messages(target, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::io::Write;

    const EXPORT: &str = r#"{
        "profile": {"id": 77, "username": "Carla_M", "first_name": "Carla", "last_name": "Mora", "phone": "+34600111222"},
        "messages": [
            {"id": 3, "date": "2024-01-03T10:00:00Z", "text": "tres"},
            {"id": 2, "date": "2024-01-02T10:00:00Z", "text": "dos"},
            {"id": 1, "date": "2024-01-01T10:00:00Z", "media": {"kind": "photo"}}
        ]
    }"#;

    fn write_export() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(EXPORT.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn resolves_by_username_phone_id_and_name() {
        let file = write_export();
        let source = ExportSource::open(file.path()).await.unwrap();
        for input in ["@carla_m", "carla_m", "34600111222", "77", "Carla Mora"] {
            let query = TargetQuery::parse(input);
            assert!(
                source.resolve(&query).await.found().is_some(),
                "{input} should resolve"
            );
        }
        let miss = TargetQuery::parse("@nobody");
        assert_eq!(source.resolve(&miss).await, Lookup::NotFound);
    }

    #[tokio::test]
    async fn streams_are_bounded_and_restart() {
        let file = write_export();
        let source = ExportSource::open(file.path()).await.unwrap();
        let target = source.profile().clone();
        let first: Vec<_> = source.messages(&target, 2).unwrap().collect().await;
        assert_eq!(first.len(), 2);
        let all: Vec<_> = source.messages(&target, 100).unwrap().collect().await;
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].as_ref().unwrap().id, 3);
    }

    #[tokio::test]
    async fn other_accounts_have_no_stream() {
        let file = write_export();
        let source = ExportSource::open(file.path()).await.unwrap();
        let stranger = UserProfile {
            id: 1,
            ..UserProfile::default()
        };
        assert!(matches!(
            source.messages(&stranger, 10),
            Err(SourceError::Fatal(_))
        ));
    }

    #[tokio::test]
    async fn malformed_export_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{not json").unwrap();
        let err = ExportSource::open(file.path()).await.err().unwrap();
        assert!(format!("{err:#}").contains("parsing export"));
    }
}
