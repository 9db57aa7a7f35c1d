use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Variant order is the canonical category order; RatingSet iteration and
// risk-factor output follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Communication,
    Trust,
    Intimacy,
    SharedGoals,
    ConflictResolution,
    EmotionalSupport,
    QualityTime,
    Finances,
    Appreciation,
    FutureAlignment,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Communication,
        Category::Trust,
        Category::Intimacy,
        Category::SharedGoals,
        Category::ConflictResolution,
        Category::EmotionalSupport,
        Category::QualityTime,
        Category::Finances,
        Category::Appreciation,
        Category::FutureAlignment,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Communication => "communication",
            Category::Trust => "trust",
            Category::Intimacy => "intimacy",
            Category::SharedGoals => "shared_goals",
            Category::ConflictResolution => "conflict_resolution",
            Category::EmotionalSupport => "emotional_support",
            Category::QualityTime => "quality_time",
            Category::Finances => "finances",
            Category::Appreciation => "appreciation",
            Category::FutureAlignment => "future_alignment",
        }
    }

    pub fn weight(self) -> f64 {
        match self {
            Category::Communication | Category::Trust | Category::ConflictResolution => 1.5,
            Category::Finances => 1.2,
            _ => 1.0,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for category in Category::ALL {
            if category.as_str() == s {
                return Ok(category);
            }
        }
        bail!("unknown category: {s}")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RatingSet(BTreeMap<Category, i32>);

impl RatingSet {
    pub fn new(ratings: impl IntoIterator<Item = (Category, i32)>) -> anyhow::Result<Self> {
        let mut map = BTreeMap::new();
        for (category, rating) in ratings {
            if !(1..=10).contains(&rating) {
                bail!("rating for {category} must be between 1 and 10, got {rating}");
            }
            map.insert(category, rating);
        }
        Ok(RatingSet(map))
    }

    pub fn parse_json(input: &str) -> anyhow::Result<Self> {
        let raw: BTreeMap<String, i32> = serde_json::from_str(input)?;
        let mut pairs = Vec::with_capacity(raw.len());
        for (name, rating) in raw {
            pairs.push((name.parse::<Category>()?, rating));
        }
        Self::new(pairs)
    }

    pub fn get(&self, category: Category) -> Option<i32> {
        self.0.get(&category).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    // Yields entries in canonical category order regardless of insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, i32)> + '_ {
        self.0.iter().map(|(category, rating)| (*category, *rating))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Stable,
    Strained,
    Critical,
    Severe,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Stable => "stable",
            Stage::Strained => "strained",
            Stage::Critical => "critical",
            Stage::Severe => "severe",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stable" => Ok(Stage::Stable),
            "strained" => Ok(Stage::Strained),
            "critical" => Ok(Stage::Critical),
            "severe" => Ok(Stage::Severe),
            other => bail!("unknown stage: {other}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub category: Category,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub check_in_id: Option<Uuid>,
    pub angle: i32,
    pub stage: Stage,
    pub ratings: RatingSet,
    pub risk_factors: Vec<RiskFactor>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_set_rejects_out_of_range_values() {
        assert!(RatingSet::new(vec![(Category::Trust, 0)]).is_err());
        assert!(RatingSet::new(vec![(Category::Trust, 11)]).is_err());
        assert!(RatingSet::new(vec![(Category::Trust, 1), (Category::Intimacy, 10)]).is_ok());
    }

    #[test]
    fn rating_set_iterates_in_canonical_order() {
        let ratings = RatingSet::new(vec![
            (Category::Finances, 4),
            (Category::Communication, 8),
            (Category::Intimacy, 6),
        ])
        .unwrap();

        let order: Vec<Category> = ratings.iter().map(|(category, _)| category).collect();
        assert_eq!(
            order,
            vec![Category::Communication, Category::Intimacy, Category::Finances]
        );
    }

    #[test]
    fn parse_json_accepts_known_categories() {
        let ratings = RatingSet::parse_json(r#"{"communication": 8, "trust": 9}"#).unwrap();
        assert_eq!(ratings.get(Category::Communication), Some(8));
        assert_eq!(ratings.get(Category::Trust), Some(9));
    }

    #[test]
    fn parse_json_rejects_unknown_categories() {
        let err = RatingSet::parse_json(r#"{"vibes": 8}"#).unwrap_err();
        assert!(err.to_string().contains("unknown category"));
    }

    #[test]
    fn category_names_round_trip() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
    }
}
