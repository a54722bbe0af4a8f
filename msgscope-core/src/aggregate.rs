use futures::StreamExt;

use crate::error::{AnalysisError, SourceError};
use crate::message::Message;
use crate::source::MessageStream;

/// A single-pass reduction over a message stream.
///
/// Each aggregator owns its accumulator; `finish` hands back the result and
/// nothing touches it afterwards.
pub trait Aggregator {
    type Output;

    fn observe(&mut self, message: &Message);

    fn finish(self) -> Self::Output;
}

/// Fold an in-memory slice.
pub fn fold_messages<A: Aggregator>(messages: &[Message], mut aggregator: A) -> A::Output {
    for m in messages {
        aggregator.observe(m);
    }
    aggregator.finish()
}

/// Fold a source stream. Transient item failures are skipped; a fatal one
/// ends the pass with an error.
pub async fn fold_stream<A: Aggregator>(
    mut stream: MessageStream<'_>,
    mut aggregator: A,
) -> Result<A::Output, AnalysisError> {
    let mut skipped = 0usize;
    while let Some(item) = stream.next().await {
        match item {
            Ok(message) => aggregator.observe(&message),
            Err(SourceError::Transient(reason)) => {
                skipped += 1;
                tracing::warn!(%reason, "skipping message after transient fetch failure");
            }
            Err(fatal) => return Err(fatal.into()),
        }
    }
    if skipped > 0 {
        tracing::info!(skipped, "stream finished with skipped items");
    }
    Ok(aggregator.finish())
}
