use std::time::Duration;

use msgscope_core::{resolve_target, Lookup, MessageSource, TargetQuery, UserProfile};

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Wait after the zero-based `attempt` failed: `base * 2^attempt`.
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Resolve `query`, retrying only transient failures.
pub async fn resolve_with_retry<S: MessageSource + ?Sized>(
    source: &S,
    query: &TargetQuery,
    policy: RetryPolicy,
) -> Lookup<UserProfile> {
    let mut last = Lookup::NotFound;
    for attempt in 0..policy.attempts {
        match resolve_target(source, query).await {
            Lookup::Transient(reason) => {
                tracing::warn!(attempt = attempt + 1, %reason, "lookup attempt failed");
                last = Lookup::Transient(reason);
                if attempt + 1 < policy.attempts {
                    tokio::time::sleep(policy.delay(attempt)).await;
                }
            }
            settled => return settled,
        }
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::{self, BoxFuture};
    use futures::FutureExt;
    use msgscope_core::source::MessageStream;
    use msgscope_core::SourceError;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails transiently `failures` times, then finds the profile.
    struct Flaky {
        failures: u32,
        calls: AtomicU32,
    }

    impl MessageSource for Flaky {
        fn resolve<'a>(&'a self, _query: &'a TargetQuery) -> BoxFuture<'a, Lookup<UserProfile>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            let lookup = if n < self.failures {
                Lookup::Transient("flood wait".into())
            } else {
                Lookup::Found(UserProfile {
                    id: 9,
                    ..UserProfile::default()
                })
            };
            future::ready(lookup).boxed()
        }

        fn messages<'a>(
            &'a self,
            _target: &'a UserProfile,
            _limit: usize,
        ) -> Result<MessageStream<'a>, SourceError> {
            Err(SourceError::Fatal("not used".into()))
        }
    }

    fn flaky(failures: u32) -> Flaky {
        Flaky {
            failures,
            calls: AtomicU32::new(0),
        }
    }

    #[test]
    fn delays_double() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(0), Duration::from_secs(1));
        assert_eq!(policy.delay(1), Duration::from_secs(2));
        assert_eq!(policy.delay(2), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_after_transient_failures() {
        let source = flaky(2);
        let query = TargetQuery::parse("@x");
        let started = tokio::time::Instant::now();
        let lookup = resolve_with_retry(&source, &query, RetryPolicy::default()).await;
        assert!(matches!(lookup, Lookup::Found(p) if p.id == 9));
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
        let waited = started.elapsed();
        assert!(waited >= Duration::from_secs(3) && waited < Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_the_last_attempt() {
        let source = flaky(10);
        let query = TargetQuery::parse("@x");
        let lookup = resolve_with_retry(&source, &query, RetryPolicy::default()).await;
        assert!(lookup.is_transient());
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn not_found_is_not_retried() {
        struct Empty(AtomicU32);

        impl MessageSource for Empty {
            fn resolve<'a>(
                &'a self,
                _query: &'a TargetQuery,
            ) -> BoxFuture<'a, Lookup<UserProfile>> {
                self.0.fetch_add(1, Ordering::SeqCst);
                future::ready(Lookup::NotFound).boxed()
            }

            fn messages<'a>(
                &'a self,
                _target: &'a UserProfile,
                _limit: usize,
            ) -> Result<MessageStream<'a>, SourceError> {
                Err(SourceError::Fatal("not used".into()))
            }
        }

        let source = Empty(AtomicU32::new(0));
        let lookup =
            resolve_with_retry(&source, &TargetQuery::parse("@x"), RetryPolicy::default()).await;
        assert_eq!(lookup, Lookup::NotFound);
        assert_eq!(source.0.load(Ordering::SeqCst), 1);
    }
}
