//! # Taskweave Capabilities
//!
//! The standard analytic capability set: audience-segment and
//! news-article analytics over an in-memory [`AnalyticsDataset`]. Each
//! capability declares its expected argument types and produces
//! capability-native values (maps, tables, timestamps) that the engine
//! normalizes before storage.

pub mod articles;
pub mod dataset;
pub mod segments;

pub use articles::{GetArticlesInfo, GetNewsTopicsInfo, GetTopRecentArticles};
pub use dataset::{
    AnalyticsDataset, ArticleRecord, DatasetError, EngagementSample, SegmentRecord, TopicRecord,
    TopicTransition,
};
pub use segments::{
    GetNextTopicPrediction, GetSegmentDescription, GetSegmentEngagementStats, GetSegmentRegions,
    GetTopicTransitions,
};

use std::sync::Arc;
use taskweave_core::InMemoryCapabilityRegistry;

/// Build a registry holding the full standard capability set over one
/// dataset.
pub fn standard_registry(dataset: Arc<AnalyticsDataset>) -> InMemoryCapabilityRegistry {
    InMemoryCapabilityRegistry::new()
        .with_capability(Arc::new(GetSegmentDescription::new(Arc::clone(&dataset))))
        .with_capability(Arc::new(GetSegmentEngagementStats::new(Arc::clone(&dataset))))
        .with_capability(Arc::new(GetTopicTransitions::new(Arc::clone(&dataset))))
        .with_capability(Arc::new(GetNextTopicPrediction::new(Arc::clone(&dataset))))
        .with_capability(Arc::new(GetSegmentRegions::new(Arc::clone(&dataset))))
        .with_capability(Arc::new(GetArticlesInfo::new(Arc::clone(&dataset))))
        .with_capability(Arc::new(GetTopRecentArticles::new(Arc::clone(&dataset))))
        .with_capability(Arc::new(GetNewsTopicsInfo::new(dataset)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskweave_core::CapabilityRegistry;

    #[test]
    fn standard_registry_holds_the_full_set() {
        let registry = standard_registry(dataset::test_fixture());
        assert_eq!(registry.len(), 8);
        for name in [
            "get_segment_description",
            "get_segment_engagement_stats",
            "get_topic_transitions",
            "get_next_topic_prediction",
            "get_segment_regions",
            "get_articles_info",
            "get_top_recent_articles",
            "get_news_topics_info",
        ] {
            assert!(registry.lookup(name).is_some(), "missing {name}");
        }
    }
}
