//! Article and news-topic capabilities.

use crate::dataset::{AnalyticsDataset, ArticleRecord};
use std::sync::Arc;
use taskweave_core::{
    Capability, CapabilityArgs, CapabilityError, CapabilityResult, CapabilitySignature,
    ExpectedType, NativeValue, Table,
};

fn article_row(article: &ArticleRecord) -> [(&'static str, NativeValue); 6] {
    [
        ("id", NativeValue::Int(article.id)),
        ("title", NativeValue::from(article.title.clone())),
        ("topic", NativeValue::from(article.topic.clone())),
        ("cluster", NativeValue::from(article.cluster.clone())),
        ("published_at", NativeValue::Timestamp(article.published_at)),
        ("region", NativeValue::from(article.region.clone())),
    ]
}

fn articles_by_ids<'d>(
    dataset: &'d AnalyticsDataset,
    ids: &[i64],
) -> CapabilityResult<Vec<&'d ArticleRecord>> {
    ids.iter()
        .map(|id| {
            dataset.article(*id).ok_or_else(|| CapabilityError::NotFound {
                what: format!("article {}", id),
            })
        })
        .collect()
}

/// `get_articles_info`: full records for a list of article ids.
pub struct GetArticlesInfo {
    dataset: Arc<AnalyticsDataset>,
}

impl GetArticlesInfo {
    pub fn new(dataset: Arc<AnalyticsDataset>) -> Self {
        Self { dataset }
    }
}

impl Capability for GetArticlesInfo {
    fn name(&self) -> &str {
        "get_articles_info"
    }

    fn description(&self) -> &str {
        "Title, topic, cluster, publication time, and region per article id"
    }

    fn signature(&self) -> CapabilitySignature {
        CapabilitySignature::new().arg("articles_ids", ExpectedType::List)
    }

    fn invoke(&self, args: &CapabilityArgs) -> CapabilityResult<NativeValue> {
        let ids = args.require_i64_list("articles_ids")?;
        let mut table = Table::new();
        for article in articles_by_ids(&self.dataset, &ids)? {
            table.push_row(article_row(article));
        }
        Ok(NativeValue::Table(table))
    }
}

/// `get_top_recent_articles`: the most recently published of a set.
pub struct GetTopRecentArticles {
    dataset: Arc<AnalyticsDataset>,
}

impl GetTopRecentArticles {
    pub fn new(dataset: Arc<AnalyticsDataset>) -> Self {
        Self { dataset }
    }
}

impl Capability for GetTopRecentArticles {
    fn name(&self) -> &str {
        "get_top_recent_articles"
    }

    fn description(&self) -> &str {
        "The newest articles of the given set, most recent first"
    }

    fn signature(&self) -> CapabilitySignature {
        CapabilitySignature::new()
            .arg("articles_ids", ExpectedType::List)
            .arg("top", ExpectedType::Int)
    }

    fn invoke(&self, args: &CapabilityArgs) -> CapabilityResult<NativeValue> {
        let ids = args.require_i64_list("articles_ids")?;
        let top = args.get_i64_or("top", 5)?.max(0) as usize;

        let mut articles = articles_by_ids(&self.dataset, &ids)?;
        articles.sort_by_key(|article| std::cmp::Reverse(article.published_at));

        let mut table = Table::new();
        for article in articles.into_iter().take(top) {
            table.push_row(article_row(article));
        }
        Ok(NativeValue::Table(table))
    }
}

/// `get_news_topics_info`: records for a list of news topic ids.
pub struct GetNewsTopicsInfo {
    dataset: Arc<AnalyticsDataset>,
}

impl GetNewsTopicsInfo {
    pub fn new(dataset: Arc<AnalyticsDataset>) -> Self {
        Self { dataset }
    }
}

impl Capability for GetNewsTopicsInfo {
    fn name(&self) -> &str {
        "get_news_topics_info"
    }

    fn description(&self) -> &str {
        "Name, document count, and description per news topic id"
    }

    fn signature(&self) -> CapabilitySignature {
        CapabilitySignature::new().arg("topics_id", ExpectedType::List)
    }

    fn invoke(&self, args: &CapabilityArgs) -> CapabilityResult<NativeValue> {
        let ids = args.require_i64_list("topics_id")?;
        let mut table = Table::new();
        for id in ids {
            let topic = self.dataset.topic(id).ok_or_else(|| CapabilityError::NotFound {
                what: format!("topic {}", id),
            })?;
            table.push_row([
                ("id", NativeValue::Int(topic.id)),
                ("name", NativeValue::from(topic.name.clone())),
                ("doc_count", NativeValue::Int(topic.doc_count as i64)),
                ("description", NativeValue::from(topic.description.clone())),
            ]);
        }
        Ok(NativeValue::Table(table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::test_fixture;
    use serde_json::json;

    fn args(pairs: &[(&str, serde_json::Value)]) -> CapabilityArgs {
        let mut args = CapabilityArgs::new();
        for (key, value) in pairs {
            args.insert(*key, value.clone());
        }
        args
    }

    #[test]
    fn articles_info_returns_one_row_per_id() {
        let capability = GetArticlesInfo::new(test_fixture());
        let result = capability
            .invoke(&args(&[("articles_ids", json!([11, 13]))]))
            .unwrap()
            .into_transport();

        let rows = result.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("id"), Some(&json!(11)));
        assert_eq!(rows[0].get("topic"), Some(&json!("economy")));
        // Timestamps land as RFC 3339 strings.
        assert_eq!(
            rows[0].get("published_at"),
            Some(&json!("2024-11-03T09:00:00+00:00"))
        );
    }

    #[test]
    fn unknown_article_ids_are_not_found() {
        let capability = GetArticlesInfo::new(test_fixture());
        let err = capability
            .invoke(&args(&[("articles_ids", json!([11, 99]))]))
            .unwrap_err();
        assert!(matches!(err, CapabilityError::NotFound { .. }));
    }

    #[test]
    fn top_recent_orders_newest_first_and_truncates() {
        let capability = GetTopRecentArticles::new(test_fixture());
        let result = capability
            .invoke(&args(&[
                ("articles_ids", json!([11, 12, 13])),
                ("top", json!(2)),
            ]))
            .unwrap()
            .into_transport();

        let rows = result.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("id"), Some(&json!(12)));
        assert_eq!(rows[1].get("id"), Some(&json!(11)));
    }

    #[test]
    fn topics_info_reports_doc_counts() {
        let capability = GetNewsTopicsInfo::new(test_fixture());
        let result = capability
            .invoke(&args(&[("topics_id", json!([2, 1]))]))
            .unwrap()
            .into_transport();

        let rows = result.as_array().unwrap();
        assert_eq!(rows[0].get("name"), Some(&json!("sports")));
        assert_eq!(rows[0].get("doc_count"), Some(&json!(510)));
        assert_eq!(rows[1].get("name"), Some(&json!("economy")));
    }
}
