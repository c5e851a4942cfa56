//! Engine module - training load, readiness, balance and records
//!
//! Features:
//! - Volume per body part and category (primary 1.0, secondary 0.5)
//! - Per body part readiness with pain override
//! - Balance recommendations over six categories
//! - Personal records, top performances and progression trends (linfa)
//!
//! Every computation is a pure fold over the input snapshot; `now` is always passed in.

pub mod balance;
pub mod readiness;
pub mod records;
pub mod trend;
pub mod volume;

pub use balance::{AntagonistPair, BalanceAdvisor, Recommendation, RecommendationKind};
pub use readiness::{BodyPartInsight, ReadinessStatus, RestHoursStrategy};
pub use records::{PersonalRecord, TopPerformance};
pub use trend::ProgressionTrend;
pub use volume::{CategoryShare, VolumeSummary};

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{self, EngineConfig};
use crate::history::{FeedbackReport, WorkoutSession};
use readiness::WithOverrides;
use records::{Bucket, SeriesMetric};

/// Window used for the per body part volume in insights
const INSIGHT_VOLUME_DAYS: u32 = 7;

/// Everything one query needs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineInput {
    #[serde(default)]
    pub sessions: Vec<WorkoutSession>,
    #[serde(default)]
    pub feedback: Vec<FeedbackReport>,
    pub now: DateTime<Utc>,
    pub window_days: u32,
    #[serde(default)]
    pub rest_hours_by_body_part: Option<BTreeMap<String, u32>>,
}

/// Data contract handed to presentation layers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineOutput {
    pub body_part_insights: Vec<BodyPartInsight>,
    pub distribution: Vec<CategoryShare>,
    pub recommendations: Vec<Recommendation>,
    pub personal_records: BTreeMap<String, PersonalRecord>,
    pub top_performances: Vec<TopPerformance>,
    pub progression_trends: BTreeMap<String, ProgressionTrend>,
}

impl EngineOutput {
    /// Ready body parts, longest since trained first
    pub fn suggested_focus(&self) -> Vec<&BodyPartInsight> {
        readiness::suggested_focus(&self.body_part_insights)
    }

    /// Recovering body parts, soonest eligible first
    pub fn next_eligible(&self) -> Vec<&BodyPartInsight> {
        readiness::next_eligible(&self.body_part_insights)
    }
}

/// Readiness engine
pub struct Engine {
    config: EngineConfig,
    rest_hours: Box<dyn RestHoursStrategy>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let rest_hours = config.rest_strategy();
        Self { config, rest_hours }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run every component over one snapshot
    pub fn analyze(&self, input: &EngineInput) -> EngineOutput {
        let now = input.now;
        let window_days = input.window_days.max(1);

        // Full history decides when each body part was last worked
        let history = VolumeSummary::aggregate(input.sessions.iter().filter(|s| s.start_time <= now));
        let recent = VolumeSummary::aggregate(volume::sessions_in_window(
            &input.sessions,
            now,
            INSIGHT_VOLUME_DAYS,
        ));
        let window_sessions = volume::sessions_in_window(&input.sessions, now, window_days);
        let window = VolumeSummary::aggregate(window_sessions.iter().copied());

        let rest_hours = WithOverrides {
            overrides: input
                .rest_hours_by_body_part
                .as_ref()
                .map(config::normalize_rest_hours)
                .unwrap_or_default(),
            inner: self.rest_hours.as_ref(),
        };
        let body_part_insights =
            readiness::insights(&history, &recent, &input.feedback, now, &rest_hours);

        let distribution = window.distribution();
        let recommendations = BalanceAdvisor::new(&self.config.antagonist_pairs)
            .recommend(&distribution, window.total_sets);

        let personal_records = records::personal_records(window_sessions.iter().copied(), window_days);
        let top_performances = records::top_performances(&personal_records, self.config.top_n);
        let progression_trends = self.trends(&window_sessions, &personal_records, window_days);

        debug!(
            "Analyzed {} sessions ({} in window): {} sets, {} recommendations, {} records",
            input.sessions.len(),
            window_sessions.len(),
            window.total_sets,
            recommendations.len(),
            personal_records.len()
        );

        EngineOutput {
            body_part_insights,
            distribution,
            recommendations,
            personal_records,
            top_performances,
            progression_trends,
        }
    }

    /// Weight trend for loaded exercises, reps trend for bodyweight ones
    fn trends(
        &self,
        sessions: &[&WorkoutSession],
        records: &BTreeMap<String, PersonalRecord>,
        window_days: u32,
    ) -> BTreeMap<String, ProgressionTrend> {
        let bucket = Bucket::for_window(window_days);

        records
            .values()
            .filter_map(|record| {
                let metric = if record.is_bodyweight() {
                    SeriesMetric::Reps
                } else {
                    SeriesMetric::Weight
                };
                let series = records::progression_series(
                    sessions.iter().copied(),
                    &record.exercise,
                    metric,
                    bucket,
                );
                ProgressionTrend::fit(&series).map(|trend| (record.exercise.clone(), trend))
            })
            .collect()
    }
}

/// Analyze with the default configuration
pub fn analyze(input: &EngineInput) -> EngineOutput {
    Engine::default().analyze(input)
}
