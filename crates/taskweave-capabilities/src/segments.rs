//! Audience-segment capabilities.

use crate::dataset::AnalyticsDataset;
use std::sync::Arc;
use taskweave_core::{
    Capability, CapabilityArgs, CapabilityError, CapabilityResult, CapabilitySignature,
    ExpectedType, NativeValue, Table,
};

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn segment<'d>(
    dataset: &'d AnalyticsDataset,
    args: &CapabilityArgs,
) -> CapabilityResult<&'d crate::dataset::SegmentRecord> {
    let segment_id = args.require_i64("segment_id")?;
    dataset.segment(segment_id).ok_or_else(|| CapabilityError::NotFound {
        what: format!("segment {}", segment_id),
    })
}

/// `get_segment_description`: titled profile of one audience segment.
pub struct GetSegmentDescription {
    dataset: Arc<AnalyticsDataset>,
}

impl GetSegmentDescription {
    pub fn new(dataset: Arc<AnalyticsDataset>) -> Self {
        Self { dataset }
    }
}

impl Capability for GetSegmentDescription {
    fn name(&self) -> &str {
        "get_segment_description"
    }

    fn description(&self) -> &str {
        "Title, description, audience split, and region consumption for one segment"
    }

    fn signature(&self) -> CapabilitySignature {
        CapabilitySignature::new().arg("segment_id", ExpectedType::Int)
    }

    fn invoke(&self, args: &CapabilityArgs) -> CapabilityResult<NativeValue> {
        let segment = segment(&self.dataset, args)?;
        let regions = segment
            .regions
            .iter()
            .map(|(region, share)| (region.clone(), NativeValue::Float(*share)))
            .collect();
        Ok(NativeValue::map([
            ("segment_id", NativeValue::Int(segment.id)),
            ("title", NativeValue::from(segment.title.clone())),
            ("description", NativeValue::from(segment.description.clone())),
            ("user_frequent", NativeValue::Int(segment.user_frequent as i64)),
            (
                "user_nonfrequent",
                NativeValue::Int(segment.user_nonfrequent as i64),
            ),
            ("region_consumption", NativeValue::Map(regions)),
        ]))
    }
}

/// `get_segment_engagement_stats`: aggregate engagement for one segment.
pub struct GetSegmentEngagementStats {
    dataset: Arc<AnalyticsDataset>,
}

impl GetSegmentEngagementStats {
    pub fn new(dataset: Arc<AnalyticsDataset>) -> Self {
        Self { dataset }
    }
}

impl Capability for GetSegmentEngagementStats {
    fn name(&self) -> &str {
        "get_segment_engagement_stats"
    }

    fn description(&self) -> &str {
        "Scroll depth, engaged time, and engagement rate over a segment's engaged reads"
    }

    fn signature(&self) -> CapabilitySignature {
        CapabilitySignature::new().arg("segment_id", ExpectedType::Int)
    }

    fn invoke(&self, args: &CapabilityArgs) -> CapabilityResult<NativeValue> {
        let segment = segment(&self.dataset, args)?;
        let engaged: Vec<_> = segment
            .engagement
            .iter()
            .filter(|sample| sample.engaged)
            .collect();
        if engaged.is_empty() {
            return Err(CapabilityError::NotFound {
                what: format!("engagement samples for segment {}", segment.id),
            });
        }

        let count = engaged.len() as f64;
        let avg = |f: fn(&crate::dataset::EngagementSample) -> f64| {
            engaged.iter().map(|sample| f(sample)).sum::<f64>() / count
        };

        let mut engaged_secs: Vec<f64> =
            engaged.iter().map(|sample| sample.engaged_secs).collect();
        engaged_secs.sort_by(f64::total_cmp);
        let median = if engaged_secs.len() % 2 == 1 {
            engaged_secs[engaged_secs.len() / 2]
        } else {
            let upper = engaged_secs.len() / 2;
            (engaged_secs[upper - 1] + engaged_secs[upper]) / 2.0
        };

        Ok(NativeValue::map([
            ("segment_id", NativeValue::Int(segment.id)),
            (
                "avg_scroll_depth",
                NativeValue::Float(round2(avg(|s| s.scroll_depth))),
            ),
            (
                "avg_engaged_secs",
                NativeValue::Float(round2(avg(|s| s.engaged_secs))),
            ),
            (
                "avg_words_per_minute",
                NativeValue::Float(round2(avg(|s| s.words_per_minute))),
            ),
            ("median_engaged_secs", NativeValue::Float(round2(median))),
            (
                "engagement_rate",
                NativeValue::Float(round3(count / segment.engagement.len() as f64)),
            ),
        ]))
    }
}

/// `get_topic_transitions`: most likely topic-to-topic transitions.
pub struct GetTopicTransitions {
    dataset: Arc<AnalyticsDataset>,
}

impl GetTopicTransitions {
    pub fn new(dataset: Arc<AnalyticsDataset>) -> Self {
        Self { dataset }
    }
}

impl Capability for GetTopicTransitions {
    fn name(&self) -> &str {
        "get_topic_transitions"
    }

    fn description(&self) -> &str {
        "The segment's topic transitions, most probable first"
    }

    fn signature(&self) -> CapabilitySignature {
        CapabilitySignature::new()
            .arg("segment_id", ExpectedType::Int)
            .arg("top_n", ExpectedType::Int)
    }

    fn invoke(&self, args: &CapabilityArgs) -> CapabilityResult<NativeValue> {
        let segment = segment(&self.dataset, args)?;
        let top_n = args.get_i64_or("top_n", 10)?.max(0) as usize;

        let mut transitions = segment.transitions.clone();
        transitions.sort_by(|a, b| b.probability.total_cmp(&a.probability));

        let mut table = Table::new();
        for transition in transitions.into_iter().take(top_n) {
            table.push_row([
                ("from_topic", NativeValue::from(transition.from_topic)),
                ("to_topic", NativeValue::from(transition.to_topic)),
                (
                    "probability",
                    NativeValue::Float(round2(transition.probability)),
                ),
            ]);
        }
        Ok(NativeValue::Table(table))
    }
}

/// `get_next_topic_prediction`: likely next topics after the current one.
pub struct GetNextTopicPrediction {
    dataset: Arc<AnalyticsDataset>,
}

impl GetNextTopicPrediction {
    pub fn new(dataset: Arc<AnalyticsDataset>) -> Self {
        Self { dataset }
    }
}

impl Capability for GetNextTopicPrediction {
    fn name(&self) -> &str {
        "get_next_topic_prediction"
    }

    fn description(&self) -> &str {
        "Predicted next topics for a segment reading the given topic"
    }

    fn signature(&self) -> CapabilitySignature {
        CapabilitySignature::new()
            .arg("segment_id", ExpectedType::Int)
            .arg("current_topic", ExpectedType::Text)
            .arg("top_n", ExpectedType::Int)
    }

    fn invoke(&self, args: &CapabilityArgs) -> CapabilityResult<NativeValue> {
        let segment = segment(&self.dataset, args)?;
        let current_topic = args.require_str("current_topic")?;
        let top_n = args.get_i64_or("top_n", 3)?.max(0) as usize;

        let mut candidates: Vec<_> = segment
            .transitions
            .iter()
            .filter(|transition| transition.from_topic == current_topic)
            .collect();
        candidates.sort_by(|a, b| b.probability.total_cmp(&a.probability));

        let mut predictions = Table::new();
        for transition in candidates.into_iter().take(top_n) {
            predictions.push_row([
                ("to_topic", NativeValue::from(transition.to_topic.clone())),
                (
                    "probability",
                    NativeValue::Float(round2(transition.probability)),
                ),
            ]);
        }

        Ok(NativeValue::map([
            ("segment_id", NativeValue::Int(segment.id)),
            ("current_topic", NativeValue::from(current_topic)),
            ("predictions", NativeValue::Table(predictions)),
        ]))
    }
}

/// `get_segment_regions`: regions where the segment reads most.
pub struct GetSegmentRegions {
    dataset: Arc<AnalyticsDataset>,
}

impl GetSegmentRegions {
    pub fn new(dataset: Arc<AnalyticsDataset>) -> Self {
        Self { dataset }
    }
}

impl Capability for GetSegmentRegions {
    fn name(&self) -> &str {
        "get_segment_regions"
    }

    fn description(&self) -> &str {
        "The segment's consumption share per region, largest first"
    }

    fn signature(&self) -> CapabilitySignature {
        CapabilitySignature::new()
            .arg("segment_id", ExpectedType::Int)
            .arg("top_n", ExpectedType::Int)
    }

    fn invoke(&self, args: &CapabilityArgs) -> CapabilityResult<NativeValue> {
        let segment = segment(&self.dataset, args)?;
        let top_n = args.get_i64_or("top_n", 10)?.max(0) as usize;

        let mut regions: Vec<_> = segment.regions.iter().collect();
        regions.sort_by(|a, b| b.1.total_cmp(a.1));

        let mut table = Table::new();
        for (region, share) in regions.into_iter().take(top_n) {
            table.push_row([
                ("region", NativeValue::from(region.clone())),
                ("share", NativeValue::Float(*share)),
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
    fn description_includes_audience_split_and_regions() {
        let capability = GetSegmentDescription::new(test_fixture());
        let result = capability
            .invoke(&args(&[("segment_id", json!(3))]))
            .unwrap()
            .into_transport();

        assert_eq!(result.get("segment_id"), Some(&json!(3)));
        assert_eq!(result.get("user_frequent"), Some(&json!(1200)));
        assert_eq!(
            result.get("region_consumption").and_then(|r| r.get("north")),
            Some(&json!(0.5))
        );
    }

    #[test]
    fn unknown_segments_are_not_found() {
        let capability = GetSegmentDescription::new(test_fixture());
        let err = capability
            .invoke(&args(&[("segment_id", json!(99))]))
            .unwrap_err();
        assert!(matches!(err, CapabilityError::NotFound { .. }));
    }

    #[test]
    fn engagement_stats_aggregate_engaged_samples_only() {
        let capability = GetSegmentEngagementStats::new(test_fixture());
        let result = capability
            .invoke(&args(&[("segment_id", json!(3))]))
            .unwrap()
            .into_transport();

        // Two engaged samples: secs 60 and 40.
        assert_eq!(result.get("avg_engaged_secs"), Some(&json!(50.0)));
        assert_eq!(result.get("median_engaged_secs"), Some(&json!(50.0)));
        assert_eq!(result.get("avg_scroll_depth"), Some(&json!(0.7)));
        assert_eq!(result.get("engagement_rate"), Some(&json!(0.667)));
    }

    #[test]
    fn transitions_rank_by_probability_and_honor_top_n() {
        let capability = GetTopicTransitions::new(test_fixture());
        let result = capability
            .invoke(&args(&[("segment_id", json!(3)), ("top_n", json!(2))]))
            .unwrap()
            .into_transport();

        let rows = result.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("probability"), Some(&json!(0.42)));
        assert_eq!(rows[1].get("probability"), Some(&json!(0.27)));
    }

    #[test]
    fn predictions_filter_on_the_current_topic() {
        let capability = GetNextTopicPrediction::new(test_fixture());
        let result = capability
            .invoke(&args(&[
                ("segment_id", json!(3)),
                ("current_topic", json!("economy")),
            ]))
            .unwrap()
            .into_transport();

        let predictions = result.get("predictions").and_then(|p| p.as_array()).unwrap();
        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0].get("to_topic"), Some(&json!("politics")));
    }

    #[test]
    fn regions_rank_by_share() {
        let capability = GetSegmentRegions::new(test_fixture());
        let result = capability
            .invoke(&args(&[("segment_id", json!(3)), ("top_n", json!(2))]))
            .unwrap()
            .into_transport();

        let rows = result.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("region"), Some(&json!("north")));
    }
}
