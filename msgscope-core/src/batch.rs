//! Tier selection and concurrent dispatch of the analyses behind a report.

use std::collections::BTreeMap;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use futures::future::{join_all, LocalBoxFuture};
use futures::FutureExt;
use serde::{Deserialize, Serialize};

use crate::aggregate::{fold_stream, Aggregator};
use crate::categories::{CategoryAnalyzer, MessageCategories, DEFAULT_SAMPLES_PER_CATEGORY};
use crate::error::AnalysisError;
use crate::geo::{GeoExtractor, GeoMentions};
use crate::group::{GroupActivity, GroupActivityAnalyzer};
use crate::history::{
    MessageDigest, MessageDigester, MessageStatistics, StatisticsCollector, TimelineBuilder,
    TimelineEvent,
};
use crate::lexicon::CompiledLexicons;
use crate::patterns::{BehaviorPatterns, PatternAnalyzer};
use crate::profile::UserProfile;
use crate::report::{ProfileReport, Slot};
use crate::sentiment::{SentimentBreakdown, SentimentClassifier};
use crate::source::MessageSource;
use crate::style::{StyleAnalyzer, WritingStyle};
use crate::topics::{TopicAnalysis, TopicClassifier, DEFAULT_SAMPLES_PER_TOPIC};
use crate::vocabulary::{VocabularyAnalyzer, WordAnalysis, DEFAULT_TOP_WORDS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    Statistics,
    Patterns,
    Geolocation,
    Sentiment,
    Timeline,
    Messages,
    Vocabulary,
    Categories,
    Topics,
    Style,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 10] = [
        AnalysisKind::Statistics,
        AnalysisKind::Patterns,
        AnalysisKind::Geolocation,
        AnalysisKind::Sentiment,
        AnalysisKind::Timeline,
        AnalysisKind::Messages,
        AnalysisKind::Vocabulary,
        AnalysisKind::Categories,
        AnalysisKind::Topics,
        AnalysisKind::Style,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AnalysisKind::Statistics => "statistics",
            AnalysisKind::Patterns => "patterns",
            AnalysisKind::Geolocation => "geolocation",
            AnalysisKind::Sentiment => "sentiment",
            AnalysisKind::Timeline => "timeline",
            AnalysisKind::Messages => "messages",
            AnalysisKind::Vocabulary => "vocabulary",
            AnalysisKind::Categories => "categories",
            AnalysisKind::Topics => "topics",
            AnalysisKind::Style => "style",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AnalysisKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        AnalysisKind::ALL
            .into_iter()
            .find(|k| k.label() == wanted)
            .ok_or_else(|| format!("unknown analysis '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportTier {
    #[default]
    Complete,
    Enhanced,
    Premium,
}

impl ReportTier {
    pub fn version(self) -> &'static str {
        match self {
            ReportTier::Complete => "2.0",
            ReportTier::Enhanced => "3.0",
            ReportTier::Premium => "PREMIUM",
        }
    }

    pub fn kinds(self) -> &'static [AnalysisKind] {
        use AnalysisKind::*;
        match self {
            ReportTier::Complete => &[Statistics, Patterns, Geolocation, Sentiment, Timeline],
            ReportTier::Enhanced => &[
                Statistics,
                Patterns,
                Geolocation,
                Sentiment,
                Timeline,
                Messages,
                Vocabulary,
                Categories,
                Topics,
            ],
            ReportTier::Premium => &AnalysisKind::ALL,
        }
    }

    /// Messages requested per analysis when nothing overrides it.
    pub fn default_limit(self, kind: AnalysisKind) -> usize {
        use AnalysisKind::*;
        match (self, kind) {
            (_, Statistics | Patterns | Timeline) => 1000,
            (_, Sentiment | Geolocation) => 500,
            (_, Style) => 200,
            (ReportTier::Premium, _) => 300,
            _ => 200,
        }
    }
}

impl FromStr for ReportTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "complete" | "2.0" => Ok(ReportTier::Complete),
            "enhanced" | "3.0" => Ok(ReportTier::Enhanced),
            "premium" => Ok(ReportTier::Premium),
            other => Err(format!("unknown report tier '{other}'")),
        }
    }
}

/// What to run and how much of the stream each analysis reads.
#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub tier: ReportTier,
    pub selected: Vec<AnalysisKind>,
    pub limits: BTreeMap<AnalysisKind, usize>,
    pub topic_samples: usize,
    pub category_samples: usize,
    pub top_words: usize,
}

impl AnalysisSettings {
    pub fn for_tier(tier: ReportTier) -> Self {
        let selected = tier.kinds().to_vec();
        let limits = selected
            .iter()
            .map(|&k| (k, tier.default_limit(k)))
            .collect();
        Self {
            tier,
            selected,
            limits,
            topic_samples: DEFAULT_SAMPLES_PER_TOPIC,
            category_samples: DEFAULT_SAMPLES_PER_CATEGORY,
            top_words: DEFAULT_TOP_WORDS,
        }
    }

    /// Run exactly `kinds`, whatever the tier holds. Analyses outside the
    /// tier read the tier's default limit for them.
    pub fn only(mut self, kinds: &[AnalysisKind]) -> Self {
        if kinds.is_empty() {
            return self;
        }
        self.selected = AnalysisKind::ALL
            .into_iter()
            .filter(|k| kinds.contains(k))
            .collect();
        let tier = self.tier;
        self.limits = self
            .selected
            .iter()
            .map(|&k| (k, tier.default_limit(k)))
            .collect();
        self
    }

    pub fn with_limits(mut self, overrides: &BTreeMap<AnalysisKind, usize>) -> Self {
        for (&kind, &limit) in overrides {
            self.limits.insert(kind, limit);
        }
        self
    }

    pub fn limit(&self, kind: AnalysisKind) -> usize {
        self.limits
            .get(&kind)
            .copied()
            .unwrap_or_else(|| self.tier.default_limit(kind))
    }
}

enum Section {
    Statistics(MessageStatistics),
    Patterns(BehaviorPatterns),
    Geolocation(GeoMentions),
    Sentiment(SentimentBreakdown),
    Timeline(Vec<TimelineEvent>),
    Messages(Vec<MessageDigest>),
    Vocabulary(WordAnalysis),
    Categories(MessageCategories),
    Topics(TopicAnalysis),
    Style(WritingStyle),
}

async fn run_one<S, A>(
    source: &S,
    target: &UserProfile,
    limit: usize,
    aggregator: A,
) -> Result<A::Output, AnalysisError>
where
    S: MessageSource + ?Sized,
    A: Aggregator,
{
    let stream = source.messages(target, limit)?;
    fold_stream(stream, aggregator).await
}

fn dispatch<'a, S: MessageSource + ?Sized>(
    kind: AnalysisKind,
    source: &'a S,
    target: &'a UserProfile,
    lexicons: &'a CompiledLexicons,
    settings: &'a AnalysisSettings,
) -> LocalBoxFuture<'a, Result<Section, AnalysisError>> {
    let limit = settings.limit(kind);
    match kind {
        AnalysisKind::Statistics => run_one(source, target, limit, StatisticsCollector::new())
            .map(|r| r.map(Section::Statistics))
            .boxed_local(),
        AnalysisKind::Patterns => run_one(source, target, limit, PatternAnalyzer::new(lexicons, limit))
            .map(|r| r.map(Section::Patterns))
            .boxed_local(),
        AnalysisKind::Geolocation => run_one(source, target, limit, GeoExtractor::new(lexicons))
            .map(|r| r.map(Section::Geolocation))
            .boxed_local(),
        AnalysisKind::Sentiment => {
            run_one(source, target, limit, SentimentClassifier::new(lexicons))
                .map(|r| r.map(Section::Sentiment))
                .boxed_local()
        }
        AnalysisKind::Timeline => run_one(source, target, limit, TimelineBuilder::new())
            .map(|r| r.map(Section::Timeline))
            .boxed_local(),
        AnalysisKind::Messages => run_one(source, target, limit, MessageDigester::new())
            .map(|r| r.map(Section::Messages))
            .boxed_local(),
        AnalysisKind::Vocabulary => run_one(
            source,
            target,
            limit,
            VocabularyAnalyzer::new(lexicons, settings.top_words),
        )
        .map(|r| r.map(Section::Vocabulary))
        .boxed_local(),
        AnalysisKind::Categories => run_one(
            source,
            target,
            limit,
            CategoryAnalyzer::new(settings.category_samples),
        )
        .map(|r| r.map(Section::Categories))
        .boxed_local(),
        AnalysisKind::Topics => run_one(
            source,
            target,
            limit,
            TopicClassifier::new(lexicons, settings.topic_samples),
        )
        .map(|r| r.map(Section::Topics))
        .boxed_local(),
        AnalysisKind::Style => run_one(source, target, limit, StyleAnalyzer::new())
            .map(|r| r.map(Section::Style))
            .boxed_local(),
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn place(report: &mut ProfileReport, section: Section) {
    match section {
        Section::Statistics(v) => report.message_statistics = Slot::Done(v),
        Section::Patterns(v) => report.behavior_patterns = Slot::Done(v),
        Section::Geolocation(v) => report.geolocation_analysis = Slot::Done(v),
        Section::Sentiment(v) => report.sentiment_analysis = Slot::Done(v),
        Section::Timeline(v) => report.activity_timeline = Slot::Done(v),
        Section::Messages(v) => report.full_messages = Slot::Done(v),
        Section::Vocabulary(v) => report.word_analysis = Slot::Done(v),
        Section::Categories(v) => report.message_categories = Slot::Done(v),
        Section::Topics(v) => report.conversation_topics = Slot::Done(v),
        Section::Style(v) => report.writing_style_analysis = Slot::Done(v),
    }
}

fn mark_failed(report: &mut ProfileReport, kind: AnalysisKind) {
    match kind {
        AnalysisKind::Statistics => report.message_statistics = Slot::Failed,
        AnalysisKind::Patterns => report.behavior_patterns = Slot::Failed,
        AnalysisKind::Geolocation => report.geolocation_analysis = Slot::Failed,
        AnalysisKind::Sentiment => report.sentiment_analysis = Slot::Failed,
        AnalysisKind::Timeline => report.activity_timeline = Slot::Failed,
        AnalysisKind::Messages => report.full_messages = Slot::Failed,
        AnalysisKind::Vocabulary => report.word_analysis = Slot::Failed,
        AnalysisKind::Categories => report.message_categories = Slot::Failed,
        AnalysisKind::Topics => report.conversation_topics = Slot::Failed,
        AnalysisKind::Style => report.writing_style_analysis = Slot::Failed,
    }
}

/// Run every selected analysis over its own stream and assemble the report.
///
/// All analyses are polled together on the current task. An error or a
/// panic in one of them marks only that section as failed.
pub async fn run_report<S: MessageSource + ?Sized>(
    source: &S,
    target: &UserProfile,
    lexicons: &CompiledLexicons,
    settings: &AnalysisSettings,
    searched_at: DateTime<Utc>,
) -> ProfileReport {
    tracing::info!(
        target_user = target.handle(),
        tier = settings.tier.version(),
        analyses = settings.selected.len(),
        "starting report"
    );

    let jobs = settings.selected.iter().map(|&kind| {
        AssertUnwindSafe(dispatch(kind, source, target, lexicons, settings))
            .catch_unwind()
            .map(move |outcome| {
                let result = outcome.unwrap_or_else(|payload| {
                    Err(AnalysisError::Panicked(panic_message(payload)))
                });
                (kind, result)
            })
    });
    let outcomes = join_all(jobs).await;

    let mut report = ProfileReport::new(
        target.clone(),
        settings.tier.version(),
        &lexicons.version,
        searched_at,
    );
    for (kind, result) in outcomes {
        match result {
            Ok(section) => {
                tracing::debug!(analysis = %kind, "analysis finished");
                place(&mut report, section);
            }
            Err(err) => {
                tracing::warn!(analysis = %kind, error = %err, "analysis failed");
                mark_failed(&mut report, kind);
            }
        }
    }
    report
}

/// Activity summary over a group's stream.
pub async fn run_group<S: MessageSource + ?Sized>(
    source: &S,
    group: &UserProfile,
    limit: usize,
) -> Result<GroupActivity, AnalysisError> {
    run_one(source, group, limit, GroupActivityAnalyzer::new()).await
}
