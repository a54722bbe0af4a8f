use serde::Serialize;

use crate::aggregate::Aggregator;
use crate::lexicon::CompiledLexicons;
use crate::message::Message;
use crate::tally::{serialize_pairs, Tally};
use crate::text::preview;

pub const DEFAULT_SAMPLES_PER_TOPIC: usize = 10;
const SAMPLE_CHARS: usize = 200;
const TOP_TOPICS: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct TopicSample {
    pub id: i64,
    pub date: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TopicAnalysis {
    pub topic_counts: Tally<String>,
    #[serde(serialize_with = "serialize_pairs")]
    pub topic_messages: Vec<(String, Vec<TopicSample>)>,
    pub most_common_topics: Vec<String>,
}

pub struct TopicClassifier<'a> {
    lexicons: &'a CompiledLexicons,
    sample_cap: usize,
    counts: Tally<String>,
    samples: Vec<Vec<TopicSample>>,
}

impl<'a> TopicClassifier<'a> {
    pub fn new(lexicons: &'a CompiledLexicons, sample_cap: usize) -> Self {
        let mut counts = Tally::new();
        for topic in &lexicons.topics {
            counts.seed(topic.label.clone());
        }
        Self {
            lexicons,
            sample_cap,
            counts,
            samples: vec![Vec::new(); lexicons.topics.len()],
        }
    }
}

impl Aggregator for TopicClassifier<'_> {
    type Output = TopicAnalysis;

    fn observe(&mut self, message: &Message) {
        let Some(text) = message.text() else {
            return;
        };
        let lowered = text.to_lowercase();
        for (idx, topic) in self.lexicons.topics.iter().enumerate() {
            if !topic.matches(&lowered) {
                continue;
            }
            self.counts.bump(topic.label.clone());
            let bucket = &mut self.samples[idx];
            if bucket.len() < self.sample_cap {
                bucket.push(TopicSample {
                    id: message.id,
                    date: message.date.clone(),
                    text: preview(text, SAMPLE_CHARS),
                });
            }
        }
    }

    fn finish(self) -> TopicAnalysis {
        let ranked = self.counts.ranked(usize::MAX);
        let most_common_topics = ranked
            .most_common(TOP_TOPICS)
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(label, _)| label)
            .collect();
        let topic_messages = self
            .lexicons
            .topics
            .iter()
            .map(|t| t.label.clone())
            .zip(self.samples)
            .collect();

        TopicAnalysis {
            topic_counts: ranked,
            topic_messages,
            most_common_topics,
        }
    }
}
