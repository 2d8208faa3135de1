//! Condition classification by type suffix.
//!
//! Conditions whose type carries no recognized suffix are ignored by the
//! aggregator; they are never an error.

use status_types::{Category, SourceCondition};

/// Category a condition type belongs to, if any.
pub fn classify(condition_type: &str) -> Option<Category> {
    Category::ALL
        .into_iter()
        .find(|category| condition_type.ends_with(category.suffix()))
}

/// Sources whose raw status differs from the category's healthy status,
/// in source order.
pub fn non_healthy<'a>(
    category: Category,
    sources: &[&'a SourceCondition],
) -> Vec<&'a SourceCondition> {
    let healthy = category.healthy_status();
    sources
        .iter()
        .copied()
        .filter(|c| c.status != healthy)
        .collect()
}

/// Source conditions grouped by category, source order preserved.
#[derive(Debug, Clone, Default)]
pub struct ClassifiedConditions<'a> {
    degraded: Vec<&'a SourceCondition>,
    progressing: Vec<&'a SourceCondition>,
    available: Vec<&'a SourceCondition>,
    unrecognized: usize,
}

impl<'a> ClassifiedConditions<'a> {
    pub fn from_conditions(conditions: &'a [SourceCondition]) -> Self {
        let mut classified = Self::default();
        for condition in conditions {
            match classify(&condition.condition_type) {
                Some(Category::Degraded) => classified.degraded.push(condition),
                Some(Category::Progressing) => classified.progressing.push(condition),
                Some(Category::Available) => classified.available.push(condition),
                None => classified.unrecognized += 1,
            }
        }
        classified
    }

    /// Conditions of one category, in source order.
    pub fn get(&self, category: Category) -> &[&'a SourceCondition] {
        match category {
            Category::Degraded => &self.degraded,
            Category::Progressing => &self.progressing,
            Category::Available => &self.available,
        }
    }

    pub fn is_empty(&self, category: Category) -> bool {
        self.get(category).is_empty()
    }

    /// Conditions of one category whose raw status is not the healthy one.
    pub fn non_healthy(&self, category: Category) -> Vec<&'a SourceCondition> {
        non_healthy(category, self.get(category))
    }

    /// Number of conditions that matched no category.
    pub fn unrecognized(&self) -> usize {
        self.unrecognized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use status_types::ConditionStatus;

    fn condition(condition_type: &str, status: ConditionStatus) -> SourceCondition {
        SourceCondition::new(condition_type, status, Utc::now())
    }

    #[test]
    fn test_classify_every_suffix() {
        assert_eq!(classify("TypeADegraded"), Some(Category::Degraded));
        assert_eq!(classify("TypeAProgressing"), Some(Category::Progressing));
        assert_eq!(classify("TypeAAvailable"), Some(Category::Available));
        assert_eq!(classify("Degraded"), Some(Category::Degraded));
    }

    #[test]
    fn test_classify_unrecognized() {
        assert_eq!(classify("TypeAUpgradeable"), None);
        assert_eq!(classify("DegradedTypeA"), None);
        assert_eq!(classify("typeadegraded"), None);
        assert_eq!(classify(""), None);
    }

    #[test]
    fn test_grouping_preserves_source_order() {
        let conditions = vec![
            condition("ZetaDegraded", ConditionStatus::True),
            condition("AlphaAvailable", ConditionStatus::True),
            condition("BetaDegraded", ConditionStatus::False),
            condition("SomethingElse", ConditionStatus::True),
            condition("AlphaDegraded", ConditionStatus::True),
        ];
        let classified = ClassifiedConditions::from_conditions(&conditions);

        let degraded: Vec<_> = classified
            .get(Category::Degraded)
            .iter()
            .map(|c| c.condition_type.as_str())
            .collect();
        assert_eq!(degraded, vec!["ZetaDegraded", "BetaDegraded", "AlphaDegraded"]);
        assert_eq!(classified.get(Category::Available).len(), 1);
        assert!(classified.is_empty(Category::Progressing));
        assert_eq!(classified.unrecognized(), 1);
    }

    #[test]
    fn test_non_healthy_uses_category_polarity() {
        let conditions = vec![
            condition("ADegraded", ConditionStatus::False),
            condition("BDegraded", ConditionStatus::True),
            condition("CDegraded", ConditionStatus::Unknown),
            condition("AAvailable", ConditionStatus::True),
            condition("BAvailable", ConditionStatus::False),
        ];
        let classified = ClassifiedConditions::from_conditions(&conditions);

        let degraded: Vec<_> = classified
            .non_healthy(Category::Degraded)
            .into_iter()
            .map(|c| c.condition_type.as_str())
            .collect();
        assert_eq!(degraded, vec!["BDegraded", "CDegraded"]);

        let available: Vec<_> = classified
            .non_healthy(Category::Available)
            .into_iter()
            .map(|c| c.condition_type.as_str())
            .collect();
        assert_eq!(available, vec!["BAvailable"]);
    }
}
