//! Progress read model over the error ledger.

use serde::Serialize;

/// Error count within one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicErrorCount {
    pub topic: String,
    /// Sum of repetition counts of the user's errors in this topic.
    pub error_count: u64,
}

/// A learner's mistakes aggregated by topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct ProgressSummary {
    pub total_errors: u64,
    pub topics_encountered: usize,
    /// Sorted by descending count, then topic name.
    pub topics: Vec<TopicErrorCount>,
}

impl ProgressSummary {
    /// Builds a summary from per-topic counts in any order.
    pub fn from_counts(counts: impl IntoIterator<Item = (String, u64)>) -> Self {
        let mut topics: Vec<TopicErrorCount> = counts
            .into_iter()
            .filter(|(_, n)| *n > 0)
            .map(|(topic, error_count)| TopicErrorCount { topic, error_count })
            .collect();
        topics.sort_by(|a, b| {
            b.error_count
                .cmp(&a.error_count)
                .then_with(|| a.topic.cmp(&b.topic))
        });

        Self {
            total_errors: topics.iter().map(|t| t.error_count).sum(),
            topics_encountered: topics.len(),
            topics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_and_orders_topics() {
        let summary = ProgressSummary::from_counts(vec![
            ("Spelling".to_string(), 2),
            ("Grammar".to_string(), 5),
            ("Articles".to_string(), 2),
            ("Unused".to_string(), 0),
        ]);
        assert_eq!(summary.total_errors, 9);
        assert_eq!(summary.topics_encountered, 3);
        let names: Vec<&str> = summary.topics.iter().map(|t| t.topic.as_str()).collect();
        assert_eq!(names, vec!["Grammar", "Articles", "Spelling"]);
    }

    #[test]
    fn empty_ledger_is_default() {
        assert_eq!(ProgressSummary::from_counts(vec![]), ProgressSummary::default());
    }
}
