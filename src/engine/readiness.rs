//! Per body part recovery state
//!
//! Order of checks (first match wins):
//! 1. active SORE/INJURED report -> pain
//! 2. never worked -> ready
//! 3. hours until eligible = max(0, rest hours - hours since last)
//! 4. nothing left -> ready, under 24h left -> worked-recently/caution, else rest

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::volume::VolumeSummary;
use crate::history::FeedbackReport;
use crate::muscles::{self, BodyPart};

/// Rest requirement when nothing better is known
pub const DEFAULT_REST_HOURS: f64 = 48.0;

/// Remaining rest below this splits into worked-recently/caution
const NEARLY_RECOVERED_HOURS: f64 = 24.0;

/// Trained this recently = still on schedule
const JUST_TRAINED_HOURS: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadinessStatus {
    Ready,
    Caution,
    Rest,
    WorkedRecently,
    Pain,
}

impl ReadinessStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ReadinessStatus::Ready => "ready",
            ReadinessStatus::Caution => "caution",
            ReadinessStatus::Rest => "rest",
            ReadinessStatus::WorkedRecently => "worked-recently",
            ReadinessStatus::Pain => "pain",
        }
    }
}

/// Snapshot of one body part's readiness, rebuilt on every query
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyPartInsight {
    pub body_part: BodyPart,
    pub status: ReadinessStatus,
    /// None = never trained
    pub hours_since_last: Option<f64>,
    pub recommended_rest_hours: f64,
    pub hours_until_eligible: f64,
    pub seven_day_volume: f64,
    pub feedback: Option<FeedbackReport>,
}

/// Source of per body part rest requirements
pub trait RestHoursStrategy: Send + Sync {
    /// Hours of rest `part` needs, given every time it was worked
    fn rest_hours(&self, part: &BodyPart, worked_at: &BTreeSet<DateTime<Utc>>) -> f64;
}

/// Fixed rest hours with optional per body part overrides
#[derive(Debug, Clone)]
pub struct FlatRestHours {
    pub default_hours: f64,
    pub overrides: BTreeMap<BodyPart, f64>,
}

impl Default for FlatRestHours {
    fn default() -> Self {
        Self {
            default_hours: DEFAULT_REST_HOURS,
            overrides: BTreeMap::new(),
        }
    }
}

impl RestHoursStrategy for FlatRestHours {
    fn rest_hours(&self, part: &BodyPart, _worked_at: &BTreeSet<DateTime<Utc>>) -> f64 {
        self.overrides
            .get(part)
            .copied()
            .unwrap_or(self.default_hours)
    }
}

/// Rest hours learned from the user's own gaps between sessions for a body part
#[derive(Debug, Clone, Default)]
pub struct LearnedRestHours {
    pub fallback: FlatRestHours,
}

impl LearnedRestHours {
    /// Minimum gaps before the median is trusted
    const MIN_GAPS: usize = 3;

    /// Gaps shorter than this are the same training day
    const SAME_DAY_HOURS: f64 = 12.0;

    const MIN_HOURS: f64 = 24.0;
    const MAX_HOURS: f64 = 96.0;

    fn median_gap(worked_at: &BTreeSet<DateTime<Utc>>) -> Option<f64> {
        // First timestamp of each training day
        let mut days: Vec<DateTime<Utc>> = Vec::new();
        for at in worked_at {
            if days
                .last()
                .is_none_or(|start| hours_between(*start, *at) >= Self::SAME_DAY_HOURS)
            {
                days.push(*at);
            }
        }

        let mut gaps: Vec<f64> = days
            .windows(2)
            .map(|w| hours_between(w[0], w[1]))
            .collect();

        if gaps.len() < Self::MIN_GAPS {
            return None;
        }

        gaps.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        let mid = gaps.len() / 2;
        let median = if gaps.len() % 2 == 0 {
            (gaps[mid - 1] + gaps[mid]) / 2.0
        } else {
            gaps[mid]
        };
        Some(median)
    }
}

impl RestHoursStrategy for LearnedRestHours {
    fn rest_hours(&self, part: &BodyPart, worked_at: &BTreeSet<DateTime<Utc>>) -> f64 {
        // Explicit overrides beat anything learned
        if let Some(hours) = self.fallback.overrides.get(part) {
            return *hours;
        }

        match Self::median_gap(worked_at) {
            Some(median) => median.clamp(Self::MIN_HOURS, Self::MAX_HOURS),
            None => self.fallback.rest_hours(part, worked_at),
        }
    }
}

/// Per-request overrides layered on top of another strategy
pub struct WithOverrides<'a> {
    pub overrides: BTreeMap<BodyPart, f64>,
    pub inner: &'a dyn RestHoursStrategy,
}

impl RestHoursStrategy for WithOverrides<'_> {
    fn rest_hours(&self, part: &BodyPart, worked_at: &BTreeSet<DateTime<Utc>>) -> f64 {
        match self.overrides.get(part) {
            Some(hours) => *hours,
            None => self.inner.rest_hours(part, worked_at),
        }
    }
}

fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_seconds() as f64 / 3600.0
}

/// Classify one body part. Returns the state and hours until eligible (never negative)
pub fn classify(
    hours_since_last: Option<f64>,
    recommended_rest_hours: f64,
    feedback: Option<&FeedbackReport>,
) -> (ReadinessStatus, f64) {
    let hours_until_eligible = hours_since_last
        .map(|since| (recommended_rest_hours - since).max(0.0))
        .unwrap_or(0.0);

    if feedback.is_some_and(|f| f.signals_pain()) {
        return (ReadinessStatus::Pain, hours_until_eligible);
    }

    let Some(since) = hours_since_last else {
        return (ReadinessStatus::Ready, 0.0);
    };

    let status = if hours_until_eligible <= 0.0 {
        ReadinessStatus::Ready
    } else if hours_until_eligible < NEARLY_RECOVERED_HOURS {
        if since < JUST_TRAINED_HOURS {
            ReadinessStatus::WorkedRecently
        } else {
            ReadinessStatus::Caution
        }
    } else {
        ReadinessStatus::Rest
    };

    (status, hours_until_eligible)
}

fn active_for<'a, 'p>(
    reports: &'a [FeedbackReport],
    part: &'p BodyPart,
    now: DateTime<Utc>,
) -> impl Iterator<Item = &'a FeedbackReport> {
    reports
        .iter()
        .filter(move |r| r.is_active_at(now) && muscles::normalize(&r.body_part) == *part)
}

/// Most recent active report for a body part
pub fn active_feedback<'a>(
    reports: &'a [FeedbackReport],
    part: &BodyPart,
    now: DateTime<Utc>,
) -> Option<&'a FeedbackReport> {
    let active: Vec<_> = active_for(reports, part, now).collect();

    if active.len() > 1 {
        warn!(
            "{} unresolved feedback reports for {}, using the most recent",
            active.len(),
            part
        );
    }

    active.into_iter().max_by_key(|r| r.created_at)
}

/// Most recent active SORE/INJURED report. A later check-in does not clear it
pub fn active_pain<'a>(
    reports: &'a [FeedbackReport],
    part: &BodyPart,
    now: DateTime<Utc>,
) -> Option<&'a FeedbackReport> {
    active_for(reports, part, now)
        .filter(|r| r.signals_pain())
        .max_by_key(|r| r.created_at)
}

/// Readiness for every canonical body part plus any custom one seen in history or feedback
pub fn insights(
    history: &VolumeSummary,
    recent: &VolumeSummary,
    feedback: &[FeedbackReport],
    now: DateTime<Utc>,
    rest_hours: &dyn RestHoursStrategy,
) -> Vec<BodyPartInsight> {
    let mut parts: BTreeSet<BodyPart> = BodyPart::all().iter().cloned().collect();
    parts.extend(history.last_worked.keys().cloned());
    parts.extend(
        feedback
            .iter()
            .filter(|r| r.is_active_at(now))
            .map(|r| muscles::normalize(&r.body_part)),
    );

    let no_history = BTreeSet::new();

    parts
        .into_iter()
        .map(|part| {
            let worked_at = history.worked_at.get(&part).unwrap_or(&no_history);
            let recommended_rest_hours = rest_hours.rest_hours(&part, worked_at);
            let hours_since_last = history
                .last_worked_at(&part)
                .map(|last| hours_between(last, now).max(0.0));
            let report = active_feedback(feedback, &part, now);
            let (status, hours_until_eligible) = classify(
                hours_since_last,
                recommended_rest_hours,
                active_pain(feedback, &part, now).or(report),
            );

            BodyPartInsight {
                seven_day_volume: recent.volume_of(&part),
                body_part: part,
                status,
                hours_since_last,
                recommended_rest_hours,
                hours_until_eligible,
                feedback: report.cloned(),
            }
        })
        .collect()
}

/// Ready body parts, longest since trained first (never trained leads)
pub fn suggested_focus(insights: &[BodyPartInsight]) -> Vec<&BodyPartInsight> {
    let mut ready: Vec<_> = insights
        .iter()
        .filter(|i| i.status == ReadinessStatus::Ready)
        .collect();

    ready.sort_by(|a, b| {
        let a_since = a.hours_since_last.unwrap_or(f64::INFINITY);
        let b_since = b.hours_since_last.unwrap_or(f64::INFINITY);
        b_since
            .partial_cmp(&a_since)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.body_part.cmp(&b.body_part))
    });
    ready
}

/// Recovering body parts, soonest eligible first
pub fn next_eligible(insights: &[BodyPartInsight]) -> Vec<&BodyPartInsight> {
    let mut recovering: Vec<_> = insights
        .iter()
        .filter(|i| matches!(i.status, ReadinessStatus::Caution | ReadinessStatus::Rest))
        .collect();

    recovering.sort_by(|a, b| {
        a.hours_until_eligible
            .partial_cmp(&b.hours_until_eligible)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.body_part.cmp(&b.body_part))
    });
    recovering
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{Feeling, LoggedSet, SessionExercise, SessionStatus, WorkoutSession};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap()
    }

    fn report(part: &str, feeling: Feeling, hours_ago: i64) -> FeedbackReport {
        FeedbackReport {
            body_part: part.to_string(),
            feeling,
            intensity: 5,
            note: None,
            created_at: now() - Duration::hours(hours_ago),
            resolved_at: None,
        }
    }

    fn session_hours_ago(muscle: &str, hours_ago: i64) -> WorkoutSession {
        WorkoutSession {
            id: format!("{}-{}", muscle, hours_ago),
            start_time: now() - Duration::hours(hours_ago),
            end_time: None,
            status: SessionStatus::Completed,
            exercises: vec![SessionExercise {
                exercise: "work".to_string(),
                sets: vec![LoggedSet {
                    reps: Some(10),
                    duration_seconds: None,
                    weight_external: None,
                    completed: true,
                    completed_at: None,
                }],
                target_sets: None,
                target_reps: None,
                primary_muscles: vec![muscle.to_string()],
                secondary_muscles: vec![],
            }],
        }
    }

    fn insight_for<'a>(all: &'a [BodyPartInsight], part: &BodyPart) -> &'a BodyPartInsight {
        all.iter().find(|i| i.body_part == *part).unwrap()
    }

    #[test]
    fn test_worked_50_hours_ago_is_ready() {
        assert_eq!(classify(Some(50.0), 48.0, None), (ReadinessStatus::Ready, 0.0));
    }

    #[test]
    fn test_worked_10_hours_ago_is_rest() {
        assert_eq!(classify(Some(10.0), 48.0, None), (ReadinessStatus::Rest, 38.0));
    }

    #[test]
    fn test_worked_30_hours_ago_is_caution() {
        assert_eq!(classify(Some(30.0), 48.0, None), (ReadinessStatus::Caution, 18.0));
    }

    #[test]
    fn test_worked_5_hours_ago_is_rest() {
        assert_eq!(classify(Some(5.0), 48.0, None), (ReadinessStatus::Rest, 43.0));
    }

    #[test]
    fn test_worked_recently_with_short_rest() {
        // 24h requirement, 6h in -> 18h left, trained under 12h ago
        assert_eq!(
            classify(Some(6.0), 24.0, None),
            (ReadinessStatus::WorkedRecently, 18.0)
        );
    }

    #[test]
    fn test_exact_rest_boundary_is_ready() {
        assert_eq!(classify(Some(48.0), 48.0, None).0, ReadinessStatus::Ready);
    }

    #[test]
    fn test_never_worked_is_ready() {
        assert_eq!(classify(None, 48.0, None), (ReadinessStatus::Ready, 0.0));
    }

    #[test]
    fn test_pain_precedence() {
        let sore = report("chest", Feeling::Sore, 1);
        let injured = report("chest", Feeling::Injured, 1);
        for since in [None, Some(0.5), Some(30.0), Some(500.0)] {
            assert_eq!(classify(since, 48.0, Some(&sore)).0, ReadinessStatus::Pain);
            assert_eq!(classify(since, 48.0, Some(&injured)).0, ReadinessStatus::Pain);
        }
    }

    #[test]
    fn test_tight_does_not_force_pain() {
        let tight = report("chest", Feeling::Tight, 1);
        assert_eq!(classify(Some(30.0), 48.0, Some(&tight)).0, ReadinessStatus::Caution);
    }

    #[test]
    fn test_resolving_falls_back_to_time_state() {
        let history = VolumeSummary::aggregate([&session_hours_ago("chest", 30)]);
        let strategy = FlatRestHours::default();
        let mut sore = report("pecs", Feeling::Sore, 2);

        let before = insights(&history, &history, std::slice::from_ref(&sore), now(), &strategy);
        assert_eq!(insight_for(&before, &BodyPart::Chest).status, ReadinessStatus::Pain);

        sore.resolved_at = Some(now() - Duration::minutes(5));
        let after = insights(&history, &history, &[sore], now(), &strategy);
        let chest = insight_for(&after, &BodyPart::Chest);
        assert_eq!(chest.status, ReadinessStatus::Caution);
        assert!(chest.feedback.is_none());
    }

    #[test]
    fn test_most_recent_report_wins() {
        let reports = vec![
            report("lower back", Feeling::Injured, 20),
            report("lower-back", Feeling::Tight, 2),
        ];
        let active = active_feedback(&reports, &BodyPart::LowerBack, now()).unwrap();
        assert_eq!(active.feeling, Feeling::Tight);
        let pain = active_pain(&reports, &BodyPart::LowerBack, now()).unwrap();
        assert_eq!(pain.feeling, Feeling::Injured);
    }

    #[test]
    fn test_injury_not_cleared_by_newer_check_in() {
        let history = VolumeSummary::aggregate([&session_hours_ago("chest", 100)]);
        let reports = vec![
            report("chest", Feeling::Injured, 20),
            report("pecs", Feeling::Tight, 2),
        ];
        let all = insights(&history, &history, &reports, now(), &FlatRestHours::default());
        let chest = insight_for(&all, &BodyPart::Chest);

        assert_eq!(chest.status, ReadinessStatus::Pain);
        assert_eq!(chest.feedback.as_ref().map(|f| f.feeling), Some(Feeling::Tight));
    }

    #[test]
    fn test_readiness_monotonic_over_time() {
        let last = now() - Duration::hours(1);
        for rest in [24.0, 36.0, 48.0, 72.0] {
            let mut seen_ready = false;
            for hour in 0..120 {
                let at = last + Duration::hours(hour);
                let since = hours_between(last, at);
                let (status, until) = classify(Some(since), rest, None);
                assert!(until >= 0.0);
                if seen_ready {
                    assert_eq!(status, ReadinessStatus::Ready, "regressed at hour {}", hour);
                }
                seen_ready |= status == ReadinessStatus::Ready;
            }
            assert!(seen_ready);
        }
    }

    #[test]
    fn test_insights_idempotent() {
        let sessions = vec![session_hours_ago("quads", 30), session_hours_ago("lats", 5)];
        let history = VolumeSummary::aggregate(&sessions);
        let feedback = vec![report("calf", Feeling::Sore, 3)];
        let strategy = FlatRestHours::default();

        let first = insights(&history, &history, &feedback, now(), &strategy);
        let second = insights(&history, &history, &feedback, now(), &strategy);
        assert_eq!(first, second);
        assert_eq!(insight_for(&first, &BodyPart::Calves).status, ReadinessStatus::Pain);
        assert_eq!(first.len(), BodyPart::all().len());
    }

    #[test]
    fn test_custom_body_part_gets_insight() {
        let history = VolumeSummary::aggregate([&session_hours_ago("serratus anterior", 10)]);
        let all = insights(&history, &history, &[], now(), &FlatRestHours::default());
        let custom = BodyPart::Custom("serratus-anterior".to_string());
        assert_eq!(insight_for(&all, &custom).status, ReadinessStatus::Rest);
    }

    #[test]
    fn test_flat_overrides() {
        let mut flat = FlatRestHours::default();
        flat.overrides.insert(BodyPart::Calves, 24.0);
        let empty = BTreeSet::new();
        assert_eq!(flat.rest_hours(&BodyPart::Calves, &empty), 24.0);
        assert_eq!(flat.rest_hours(&BodyPart::Chest, &empty), DEFAULT_REST_HOURS);
    }

    #[test]
    fn test_request_overrides_win() {
        let flat = FlatRestHours::default();
        let layered = WithOverrides {
            overrides: BTreeMap::from([(BodyPart::Chest, 72.0)]),
            inner: &flat,
        };
        let empty = BTreeSet::new();
        assert_eq!(layered.rest_hours(&BodyPart::Chest, &empty), 72.0);
        assert_eq!(layered.rest_hours(&BodyPart::Abs, &empty), 48.0);
    }

    #[test]
    fn test_learned_rest_hours_median() {
        let learned = LearnedRestHours::default();
        let times: BTreeSet<_> = [0, 60, 132, 192]
            .iter()
            .map(|h| now() - Duration::hours(200 - h))
            .collect();
        // gaps 60, 72, 60 -> median 60
        assert_eq!(learned.rest_hours(&BodyPart::Chest, &times), 60.0);
    }

    #[test]
    fn test_learned_rest_hours_merges_same_day() {
        let learned = LearnedRestHours::default();
        // Two visits per day, days 30h apart
        let times: BTreeSet<_> = [0, 6, 30, 36, 60, 66, 90]
            .iter()
            .map(|h| now() - Duration::hours(100 - h))
            .collect();
        assert_eq!(learned.rest_hours(&BodyPart::Chest, &times), 30.0);
    }

    #[test]
    fn test_learned_rest_hours_needs_data() {
        let learned = LearnedRestHours::default();
        let times: BTreeSet<_> = [now() - Duration::hours(80), now()].into_iter().collect();
        assert_eq!(learned.rest_hours(&BodyPart::Chest, &times), DEFAULT_REST_HOURS);
    }

    #[test]
    fn test_learned_rest_hours_clamped() {
        let learned = LearnedRestHours::default();
        let times: BTreeSet<_> = (0..5).map(|d| now() - Duration::days(d * 10)).collect();
        assert_eq!(learned.rest_hours(&BodyPart::Chest, &times), 96.0);
    }

    #[test]
    fn test_suggested_focus_ordering() {
        let sessions = vec![session_hours_ago("chest", 100), session_hours_ago("lats", 60)];
        let history = VolumeSummary::aggregate(&sessions);
        let all = insights(&history, &history, &[], now(), &FlatRestHours::default());
        let focus = suggested_focus(&all);

        // Never-trained parts lead, then chest (100h) before lats (60h)
        let chest_pos = focus.iter().position(|i| i.body_part == BodyPart::Chest).unwrap();
        let lats_pos = focus.iter().position(|i| i.body_part == BodyPart::Lats).unwrap();
        assert!(chest_pos < lats_pos);
        assert!(focus[0].hours_since_last.is_none());
        assert_eq!(focus.len(), all.len());
    }

    #[test]
    fn test_next_eligible_ordering() {
        let sessions = vec![session_hours_ago("chest", 10), session_hours_ago("lats", 30)];
        let history = VolumeSummary::aggregate(&sessions);
        let all = insights(&history, &history, &[], now(), &FlatRestHours::default());
        let next = next_eligible(&all);

        assert_eq!(next.len(), 2);
        assert_eq!(next[0].body_part, BodyPart::Lats);
        assert_eq!(next[1].body_part, BodyPart::Chest);
    }
}
