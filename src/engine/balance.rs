//! Muscle-group balance recommendations from the category distribution

use serde::{Deserialize, Serialize};

use super::volume::CategoryShare;
use crate::muscles::Category;

/// Above this share a category needs active rest
const OVERTRAINED_PERCENT: f64 = 40.0;
/// Above this share (up to 40%) a category should be balanced out
const HEAVY_PERCENT: f64 = 35.0;
/// Below this share a category needs dedicated exercises
const NEGLECTED_PERCENT: f64 = 5.0;
/// Below this share a category could use more work
const LIGHT_PERCENT: f64 = 10.0;
/// Max spread (percentage points) between highest and lowest for "well balanced"
const BALANCED_SPREAD: f64 = 20.0;
const BALANCED_MIN_CATEGORIES: usize = 4;
/// Completed sets in the window beyond which a deload is advised
const DELOAD_TOTAL_SETS: u32 = 100;

/// Default antagonist ratio: more than 1.5x one side triggers advice
pub const DEFAULT_ANTAGONIST_RATIO: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Rest,
    Warning,
    Focus,
    Suggestion,
    Balance,
    Success,
}

/// A recommendation with explanation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl Recommendation {
    fn new(kind: RecommendationKind, category: Option<Category>, message: String) -> Self {
        Self { kind, message, category }
    }
}

/// Two opposing categories compared by volume share
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AntagonistPair {
    pub first: Category,
    pub second: Category,
    #[serde(default = "default_ratio")]
    pub max_ratio: f64,
}

fn default_ratio() -> f64 {
    DEFAULT_ANTAGONIST_RATIO
}

impl AntagonistPair {
    pub fn chest_back() -> Self {
        Self {
            first: Category::Chest,
            second: Category::Back,
            max_ratio: DEFAULT_ANTAGONIST_RATIO,
        }
    }
}

/// Balance advisor over a category distribution
pub struct BalanceAdvisor<'a> {
    pairs: &'a [AntagonistPair],
}

impl<'a> BalanceAdvisor<'a> {
    pub fn new(pairs: &'a [AntagonistPair]) -> Self {
        Self { pairs }
    }

    /// All recommendations for a distribution and the window's total completed sets
    pub fn recommend(&self, distribution: &[CategoryShare], total_sets: u32) -> Vec<Recommendation> {
        let mut recs = Vec::new();
        let has_volume = distribution.iter().any(|s| s.percent > 0.0);

        if has_volume {
            for share in distribution {
                if let Some(rec) = Self::load_alert(share) {
                    recs.push(rec);
                }
                if let Some(rec) = Self::gap_alert(share) {
                    recs.push(rec);
                }
            }

            for pair in self.pairs {
                if let Some(rec) = Self::antagonist_alert(distribution, pair) {
                    recs.push(rec);
                }
            }

            if let Some(rec) = Self::balanced(distribution) {
                recs.push(rec);
            }
        }

        if total_sets > DELOAD_TOTAL_SETS {
            recs.push(Recommendation::new(
                RecommendationKind::Rest,
                None,
                format!(
                    "{} sets this period. Consider a deload week and prioritise extra sleep.",
                    total_sets
                ),
            ));
        }

        recs
    }

    /// Over-trained categories
    fn load_alert(share: &CategoryShare) -> Option<Recommendation> {
        let category = share.category;
        if share.percent > OVERTRAINED_PERCENT {
            Some(Recommendation::new(
                RecommendationKind::Rest,
                Some(category),
                format!(
                    "{} takes {:.0}% of your volume. Give it active rest before training it again.",
                    category, share.percent
                ),
            ))
        } else if share.percent > HEAVY_PERCENT {
            Some(Recommendation::new(
                RecommendationKind::Warning,
                Some(category),
                format!(
                    "{} takes {:.0}% of your volume. Shift some work to other muscle groups.",
                    category, share.percent
                ),
            ))
        } else {
            None
        }
    }

    /// Under-trained categories. Core never gets the hard `focus` alert
    fn gap_alert(share: &CategoryShare) -> Option<Recommendation> {
        let category = share.category;
        if share.percent < NEGLECTED_PERCENT && category != Category::Core {
            Some(Recommendation::new(
                RecommendationKind::Focus,
                Some(category),
                format!(
                    "{} gets only {:.0}% of your volume. Add 2-3 exercises targeting it.",
                    category, share.percent
                ),
            ))
        } else if (NEGLECTED_PERCENT..LIGHT_PERCENT).contains(&share.percent) {
            Some(Recommendation::new(
                RecommendationKind::Suggestion,
                Some(category),
                format!(
                    "{} is a bit light at {:.0}%. Consider one more exercise for it.",
                    category, share.percent
                ),
            ))
        } else {
            None
        }
    }

    fn antagonist_alert(distribution: &[CategoryShare], pair: &AntagonistPair) -> Option<Recommendation> {
        let first = percent_of(distribution, pair.first);
        let second = percent_of(distribution, pair.second);

        // Ratio undefined when either side is empty
        if first <= 0.0 || second <= 0.0 {
            return None;
        }

        let ratio = first / second;
        let (strong, weak) = if ratio > pair.max_ratio {
            (pair.first, pair.second)
        } else if ratio < 1.0 / pair.max_ratio {
            (pair.second, pair.first)
        } else {
            return None;
        };

        Some(Recommendation::new(
            RecommendationKind::Balance,
            Some(weak),
            format!(
                "{}:{} ratio is {:.1}. Add more {} work to balance {}.",
                pair.first, pair.second, ratio, weak, strong
            ),
        ))
    }

    /// Spread is measured across trained categories only
    fn balanced(distribution: &[CategoryShare]) -> Option<Recommendation> {
        let trained: Vec<f64> = distribution
            .iter()
            .map(|s| s.percent)
            .filter(|p| *p > 0.0)
            .collect();
        if trained.len() < BALANCED_MIN_CATEGORIES {
            return None;
        }

        let max = trained.iter().copied().fold(f64::MIN, f64::max);
        let min = trained.iter().copied().fold(f64::MAX, f64::min);
        if max - min < BALANCED_SPREAD {
            Some(Recommendation::new(
                RecommendationKind::Success,
                None,
                "Training is well balanced across muscle groups.".to_string(),
            ))
        } else {
            None
        }
    }
}

fn percent_of(distribution: &[CategoryShare], category: Category) -> f64 {
    distribution
        .iter()
        .find(|s| s.category == category)
        .map(|s| s.percent)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dist(percents: [f64; 6]) -> Vec<CategoryShare> {
        Category::all()
            .iter()
            .zip(percents)
            .map(|(category, percent)| CategoryShare {
                category: *category,
                percent,
                total_sets: percent as u32,
            })
            .collect()
    }

    fn kinds_for(recs: &[Recommendation], category: Option<Category>) -> Vec<RecommendationKind> {
        recs.iter()
            .filter(|r| r.category == category)
            .map(|r| r.kind)
            .collect()
    }

    fn has_success(recs: &[Recommendation]) -> bool {
        recs.iter().any(|r| r.kind == RecommendationKind::Success)
    }

    fn default_pairs() -> Vec<AntagonistPair> {
        vec![AntagonistPair::chest_back()]
    }

    #[test]
    fn test_chest_heavy_scenario() {
        // Chest 45, Back 10, Shoulders 15, Arms 15, Legs 10, Core 5 with 120 sets
        let pairs = default_pairs();
        let advisor = BalanceAdvisor::new(&pairs);
        let recs = advisor.recommend(&dist([45.0, 10.0, 15.0, 15.0, 10.0, 5.0]), 120);

        assert_eq!(kinds_for(&recs, Some(Category::Chest)), vec![RecommendationKind::Rest]);

        let balance: Vec<_> = recs
            .iter()
            .filter(|r| r.kind == RecommendationKind::Balance)
            .collect();
        assert_eq!(balance.len(), 1);
        assert_eq!(balance[0].category, Some(Category::Back));

        let core = kinds_for(&recs, Some(Category::Core));
        assert!(
            core.contains(&RecommendationKind::Suggestion) || core.contains(&RecommendationKind::Focus),
            "core: {:?}",
            core
        );

        assert_eq!(kinds_for(&recs, None), vec![RecommendationKind::Rest]);
        // 10% is not light
        assert_eq!(kinds_for(&recs, Some(Category::Back)), vec![RecommendationKind::Balance]);
        assert!(kinds_for(&recs, Some(Category::Legs)).is_empty());
    }

    #[test]
    fn test_warning_band() {
        let pairs = default_pairs();
        let advisor = BalanceAdvisor::new(&pairs);
        let recs = advisor.recommend(&dist([20.0, 20.0, 40.0, 10.0, 10.0, 0.0]), 30);
        assert_eq!(kinds_for(&recs, Some(Category::Shoulders)), vec![RecommendationKind::Warning]);

        let recs = advisor.recommend(&dist([20.0, 20.0, 35.0, 15.0, 10.0, 0.0]), 30);
        assert!(kinds_for(&recs, Some(Category::Shoulders)).is_empty());
    }

    #[test]
    fn test_focus_and_suggestion_bands() {
        let advisor = BalanceAdvisor::new(&[]);
        let recs = advisor.recommend(&dist([30.0, 30.0, 26.0, 4.0, 9.0, 1.0]), 50);

        assert_eq!(kinds_for(&recs, Some(Category::Arms)), vec![RecommendationKind::Focus]);
        assert_eq!(kinds_for(&recs, Some(Category::Legs)), vec![RecommendationKind::Suggestion]);
        // Core below 5% is not flagged
        assert!(kinds_for(&recs, Some(Category::Core)).is_empty());
    }

    #[test]
    fn test_gap_band_edges() {
        let advisor = BalanceAdvisor::new(&[]);
        let recs = advisor.recommend(&dist([30.0, 30.0, 25.0, 5.0, 10.0, 0.0]), 50);

        assert_eq!(kinds_for(&recs, Some(Category::Arms)), vec![RecommendationKind::Suggestion]);
        assert!(kinds_for(&recs, Some(Category::Legs)).is_empty());
    }

    #[test]
    fn test_ratio_at_limit_is_balanced() {
        let pairs = default_pairs();
        let advisor = BalanceAdvisor::new(&pairs);

        let recs = advisor.recommend(&dist([30.0, 20.0, 10.0, 20.0, 10.0, 10.0]), 50);
        assert!(recs.iter().all(|r| r.kind != RecommendationKind::Balance));

        let recs = advisor.recommend(&dist([20.0, 30.0, 10.0, 20.0, 10.0, 10.0]), 50);
        assert!(recs.iter().all(|r| r.kind != RecommendationKind::Balance));
    }

    #[test]
    fn test_success_spread_edge() {
        let advisor = BalanceAdvisor::new(&[]);

        // 30 - 10 = 20 is not under 20
        assert!(!has_success(&advisor.recommend(&dist([30.0, 20.0, 10.0, 20.0, 10.0, 10.0]), 50)));
        assert!(has_success(&advisor.recommend(&dist([29.9, 20.0, 10.1, 20.0, 10.0, 10.0]), 50)));
    }

    #[test]
    fn test_success_needs_four_categories() {
        let advisor = BalanceAdvisor::new(&[]);

        assert!(has_success(&advisor.recommend(&dist([25.0, 25.0, 25.0, 25.0, 0.0, 0.0]), 40)));
        assert!(!has_success(&advisor.recommend(&dist([34.0, 33.0, 33.0, 0.0, 0.0, 0.0]), 40)));
    }

    #[test]
    fn test_balance_favors_chest() {
        let pairs = default_pairs();
        let advisor = BalanceAdvisor::new(&pairs);
        let recs = advisor.recommend(&dist([12.0, 30.0, 20.0, 18.0, 15.0, 5.0]), 40);
        let balance = recs.iter().find(|r| r.kind == RecommendationKind::Balance).unwrap();
        assert_eq!(balance.category, Some(Category::Chest));
    }

    #[test]
    fn test_balance_skipped_when_side_empty() {
        let pairs = default_pairs();
        let advisor = BalanceAdvisor::new(&pairs);
        let recs = advisor.recommend(&dist([30.0, 0.0, 25.0, 20.0, 20.0, 5.0]), 40);
        assert!(recs.iter().all(|r| r.kind != RecommendationKind::Balance));
    }

    #[test]
    fn test_extra_antagonist_pair() {
        let pairs = vec![
            AntagonistPair::chest_back(),
            AntagonistPair {
                first: Category::Legs,
                second: Category::Core,
                max_ratio: 3.0,
            },
        ];
        let advisor = BalanceAdvisor::new(&pairs);
        let recs = advisor.recommend(&dist([20.0, 20.0, 15.0, 15.0, 24.0, 6.0]), 40);
        let balance: Vec<_> = recs
            .iter()
            .filter(|r| r.kind == RecommendationKind::Balance)
            .collect();
        assert_eq!(balance.len(), 1);
        assert_eq!(balance[0].category, Some(Category::Core));
    }

    #[test]
    fn test_well_balanced() {
        let pairs = default_pairs();
        let advisor = BalanceAdvisor::new(&pairs);
        let recs = advisor.recommend(&dist([18.0, 20.0, 16.0, 16.0, 18.0, 12.0]), 60);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].kind, RecommendationKind::Success);
    }

    #[test]
    fn test_not_balanced_with_few_categories() {
        let advisor = BalanceAdvisor::new(&[]);
        let recs = advisor.recommend(&dist([34.0, 33.0, 33.0, 0.0, 0.0, 0.0]), 20);
        assert!(recs.iter().all(|r| r.kind != RecommendationKind::Success));
    }

    #[test]
    fn test_no_volume_no_advice() {
        let pairs = default_pairs();
        let advisor = BalanceAdvisor::new(&pairs);
        assert!(advisor.recommend(&dist([0.0; 6]), 0).is_empty());
    }

    #[test]
    fn test_deload_independent_of_distribution() {
        let advisor = BalanceAdvisor::new(&[]);
        let recs = advisor.recommend(&dist([0.0; 6]), 101);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].kind, RecommendationKind::Rest);
        assert!(advisor.recommend(&dist([0.0; 6]), 100).is_empty());
    }

    #[test]
    fn test_recommend_idempotent() {
        let pairs = default_pairs();
        let advisor = BalanceAdvisor::new(&pairs);
        let d = dist([45.0, 10.0, 15.0, 15.0, 10.0, 5.0]);
        assert_eq!(advisor.recommend(&d, 120), advisor.recommend(&d, 120));
    }

    #[test]
    fn test_recommendation_json_shape() {
        let rec = Recommendation::new(RecommendationKind::Focus, Some(Category::Legs), "x".to_string());
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["type"], "focus");
        assert_eq!(json["category"], "Legs");
    }
}
