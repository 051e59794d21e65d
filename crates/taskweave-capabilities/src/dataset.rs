//! The in-memory analytics dataset the standard capabilities query.
//!
//! Loaded once per process from a JSON document and shared behind an
//! `Arc` by every capability instance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors loading a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to parse dataset: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One reader engagement sample for a segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementSample {
    pub article_id: i64,
    pub engaged: bool,
    pub scroll_depth: f64,
    pub engaged_secs: f64,
    pub words_per_minute: f64,
}

/// One observed topic-to-topic transition with its probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicTransition {
    pub from_topic: String,
    pub to_topic: String,
    pub probability: f64,
}

/// An audience segment with its profile and behavioral models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRecord {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub user_frequent: u64,
    pub user_nonfrequent: u64,
    /// Region name to consumption share.
    #[serde(default)]
    pub regions: BTreeMap<String, f64>,
    #[serde(default)]
    pub engagement: Vec<EngagementSample>,
    #[serde(default)]
    pub transitions: Vec<TopicTransition>,
}

/// One news article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub id: i64,
    pub title: String,
    pub topic: String,
    pub cluster: String,
    pub published_at: DateTime<Utc>,
    pub region: String,
}

/// One news topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicRecord {
    pub id: i64,
    pub name: String,
    pub doc_count: u64,
    pub description: String,
}

/// The full dataset: segments, articles, and topics.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalyticsDataset {
    #[serde(default)]
    pub segments: Vec<SegmentRecord>,
    #[serde(default)]
    pub articles: Vec<ArticleRecord>,
    #[serde(default)]
    pub topics: Vec<TopicRecord>,
}

impl AnalyticsDataset {
    /// Parse a dataset from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, DatasetError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a dataset from a reader.
    pub fn from_reader(reader: impl std::io::Read) -> Result<Self, DatasetError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Find a segment by id.
    pub fn segment(&self, id: i64) -> Option<&SegmentRecord> {
        self.segments.iter().find(|segment| segment.id == id)
    }

    /// Find an article by id.
    pub fn article(&self, id: i64) -> Option<&ArticleRecord> {
        self.articles.iter().find(|article| article.id == id)
    }

    /// Find a topic by id.
    pub fn topic(&self, id: i64) -> Option<&TopicRecord> {
        self.topics.iter().find(|topic| topic.id == id)
    }
}

#[cfg(test)]
pub(crate) fn test_fixture() -> std::sync::Arc<AnalyticsDataset> {
    use chrono::TimeZone;

    let published = |day, hour| {
        Utc.with_ymd_and_hms(2024, 11, day, hour, 0, 0)
            .single()
            .expect("valid timestamp")
    };

    std::sync::Arc::new(AnalyticsDataset {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datasets_parse_from_json() {
        let dataset = AnalyticsDataset::from_json_str(
            r#"{
                "segments": [{
                    "id": 1,
                    "title": "t",
                    "description": "d",
                    "user_frequent": 10,
                    "user_nonfrequent": 2
                }],
                "articles": [],
                "topics": []
            }"#,
        )
        .unwrap();
        assert_eq!(dataset.segments.len(), 1);
        let segment = dataset.segment(1).unwrap();
        assert!(segment.regions.is_empty());
        assert!(segment.engagement.is_empty());
    }

    #[test]
    fn lookups_miss_on_unknown_ids() {
        let dataset = test_fixture();
        assert!(dataset.segment(3).is_some());
        assert!(dataset.segment(99).is_none());
        assert!(dataset.article(11).is_some());
        assert!(dataset.article(99).is_none());
        assert!(dataset.topic(1).is_some());
        assert!(dataset.topic(99).is_none());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            AnalyticsDataset::from_json_str("{ nope"),
            Err(DatasetError::Parse(_))
        ));
    }
}
