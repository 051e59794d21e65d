//! Deterministic fixture data.

use chrono::{TimeZone, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use taskweave_capabilities::{
    AnalyticsDataset, ArticleRecord, EngagementSample, SegmentRecord, TopicRecord, TopicTransition,
};

/// A small deterministic analytics dataset: one well-populated segment
/// (id 3), three articles, and two topics. Suitable for end-to-end
/// plan runs against the standard capability set.
pub fn sample_dataset() -> Arc<AnalyticsDataset> {
    let published = |day, hour| {
        Utc.with_ymd_and_hms(2024, 11, day, hour, 0, 0)
            .single()
            .expect("valid timestamp")
    };

    Arc::new(AnalyticsDataset {
        segments: vec![SegmentRecord {
            id: 3,
            title: "Evening commuters".to_string(),
            description: "Readers active on weekday evenings".to_string(),
            user_frequent: 1200,
            user_nonfrequent: 400,
            regions: BTreeMap::from([
                ("north".to_string(), 0.5),
                ("south".to_string(), 0.3),
                ("west".to_string(), 0.2),
            ]),
            engagement: vec![
                EngagementSample {
                    article_id: 11,
                    engaged: true,
                    scroll_depth: 0.8,
                    engaged_secs: 60.0,
                    words_per_minute: 220.0,
                },
                EngagementSample {
                    article_id: 12,
                    engaged: true,
                    scroll_depth: 0.6,
                    engaged_secs: 40.0,
                    words_per_minute: 180.0,
                },
                EngagementSample {
                    article_id: 13,
                    engaged: false,
                    scroll_depth: 0.1,
                    engaged_secs: 5.0,
                    words_per_minute: 90.0,
                },
            ],
            transitions: vec![
                TopicTransition {
                    from_topic: "economy".to_string(),
                    to_topic: "politics".to_string(),
                    probability: 0.42,
                },
                TopicTransition {
                    from_topic: "economy".to_string(),
                    to_topic: "sports".to_string(),
                    probability: 0.11,
                },
                TopicTransition {
                    from_topic: "sports".to_string(),
                    to_topic: "economy".to_string(),
                    probability: 0.27,
                },
            ],
        }],
        articles: vec![
            ArticleRecord {
                id: 11,
                title: "Rates hold steady".to_string(),
                topic: "economy".to_string(),
                cluster: "macro".to_string(),
                published_at: published(3, 9),
                region: "north".to_string(),
            },
            ArticleRecord {
                id: 12,
                title: "Cup final preview".to_string(),
                topic: "sports".to_string(),
                cluster: "football".to_string(),
                published_at: published(4, 18),
                region: "south".to_string(),
            },
            ArticleRecord {
                id: 13,
                title: "Budget vote delayed".to_string(),
                topic: "politics".to_string(),
                cluster: "parliament".to_string(),
                published_at: published(2, 7),
                region: "north".to_string(),
            },
        ],
        topics: vec![
            TopicRecord {
                id: 1,
                name: "economy".to_string(),
                doc_count: 340,
                description: "Markets and macroeconomics".to_string(),
            },
            TopicRecord {
                id: 2,
                name: "sports".to_string(),
                doc_count: 510,
                description: "Sports coverage".to_string(),
            },
        ],
    })
}
