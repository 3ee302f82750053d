//! Recommendation pipeline
//!
//! context → mood analysis → GIF lookup → recommendation. Fed by the random
//! trigger on ordinary messages and by the meme command.

#[path = "dispatcher_tests.rs"]
mod dispatcher_tests;

use meme_types::{MoodAnalysis, Recommendation, RecommendationSource};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::context::ContextBuffer;
use crate::errors::PipelineError;
use crate::gif::GifSelector;
use crate::mood::MoodAnalyzer;

/// Buffered messages fed to the analyzer.
pub const ANALYSIS_WINDOW: usize = 5;

/// Outcome of an explicit request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Recommendation(Recommendation),
    /// Neither the search nor the fallback list produced a GIF.
    NotFound,
    /// The pipeline itself broke; the cause has been logged.
    Failed,
}

/// What the analyzer should look at.
enum AnalysisInput {
    Messages(Vec<String>),
    /// Skip analysis and use this result as is.
    Fixed(MoodAnalysis),
}

pub struct RecommendationDispatcher {
    contexts: Arc<ContextBuffer>,
    analyzer: Arc<MoodAnalyzer>,
    selector: Arc<GifSelector>,
    auto_probability: f64,
}

impl RecommendationDispatcher {
    pub fn new(
        contexts: Arc<ContextBuffer>,
        analyzer: Arc<MoodAnalyzer>,
        selector: Arc<GifSelector>,
        auto_probability: f64,
    ) -> Self {
        Self {
            contexts,
            analyzer,
            selector,
            auto_probability,
        }
    }

    pub fn contexts(&self) -> &ContextBuffer {
        &self.contexts
    }

    /// Whether a uniform roll in `[0, 1)` fires the automatic path.
    pub fn should_auto_trigger(&self, roll: f64) -> bool {
        roll < self.auto_probability
    }

    /// Roll the dice for one inbound message and maybe recommend.
    ///
    /// Every message is sampled independently; there is no cooldown.
    pub async fn maybe_auto_recommend(&self, channel_id: u64) -> Option<Recommendation> {
        if !self.should_auto_trigger(rand::random::<f64>()) {
            return None;
        }
        self.auto_recommend(channel_id).await
    }

    /// Recommend from the channel's buffered context. `None` when there is
    /// nothing to say or the pipeline failed.
    pub async fn auto_recommend(&self, channel_id: u64) -> Option<Recommendation> {
        let messages = self.recent_contents(channel_id).await;
        if messages.is_empty() {
            return None;
        }

        match self.run(AnalysisInput::Messages(messages)).await {
            Ok(Some((analysis, gif_url))) => {
                info!(channel_id, mood = %analysis.mood, "Auto recommendation");
                Some(Recommendation {
                    analysis,
                    gif_url,
                    source: RecommendationSource::Auto,
                })
            }
            Ok(None) => {
                debug!(channel_id, "No GIF available for auto recommendation");
                None
            }
            Err(e) => {
                error!(channel_id, error = %e, "Auto recommendation failed");
                None
            }
        }
    }

    /// Handle an explicit request.
    ///
    /// Inline text, when given, is the only analyzer input. Otherwise the
    /// channel's recent context is used, or a fixed "random" mood when there
    /// is none.
    pub async fn recommend_now(
        &self,
        channel_id: u64,
        inline: Option<&str>,
        requested_by: &str,
    ) -> Reply {
        let input = match inline.map(str::trim).filter(|text| !text.is_empty()) {
            Some(text) => AnalysisInput::Messages(vec![text.to_string()]),
            None => {
                let recent = self.recent_contents(channel_id).await;
                if recent.is_empty() {
                    AnalysisInput::Fixed(MoodAnalysis::random())
                } else {
                    AnalysisInput::Messages(recent)
                }
            }
        };

        match self.run(input).await {
            Ok(Some((analysis, gif_url))) => {
                info!(channel_id, requested_by, mood = %analysis.mood, "Requested recommendation");
                Reply::Recommendation(Recommendation {
                    analysis,
                    gif_url,
                    source: RecommendationSource::Requested {
                        by: requested_by.to_string(),
                    },
                })
            }
            Ok(None) => Reply::NotFound,
            Err(e) => {
                error!(channel_id, error = %e, "Requested recommendation failed");
                Reply::Failed
            }
        }
    }

    async fn recent_contents(&self, channel_id: u64) -> Vec<String> {
        self.contexts
            .recent(channel_id, ANALYSIS_WINDOW)
            .await
            .into_iter()
            .map(|m| m.content)
            .collect()
    }

    /// Run analysis and lookup as their own task so a panic stays contained.
    async fn run(
        &self,
        input: AnalysisInput,
    ) -> Result<Option<(MoodAnalysis, String)>, PipelineError> {
        let analyzer = self.analyzer.clone();
        let selector = self.selector.clone();

        let handle = tokio::spawn(async move {
            let analysis = match input {
                AnalysisInput::Messages(messages) => analyzer.analyze(&messages).await,
                AnalysisInput::Fixed(analysis) => analysis,
            };
            let gif_url = selector.select(&analysis.search_query).await;
            gif_url.map(|url| (analysis, url))
        });

        Ok(handle.await?)
    }
}
