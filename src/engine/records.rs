//! Personal records, top performances and progression series per exercise

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::history::{LoggedSet, WorkoutSession};
use crate::muscles::{self, BodyPart};

/// Best-observed metrics for one exercise over the window
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalRecord {
    pub exercise: String,
    /// 0 = bodyweight only
    pub max_weight: f64,
    pub max_reps: u32,
    pub max_duration_seconds: u32,
    /// Max weight x reps over loaded sets; 0 for bodyweight exercises
    pub max_volume: f64,
    pub average_reps: f64,
    pub average_volume: f64,
    /// Distinct training days per week over the window
    pub frequency: f64,
    pub session_count: u32,
    pub last_workout_date: Option<DateTime<Utc>>,
    pub muscle_groups: Vec<BodyPart>,
}

impl PersonalRecord {
    pub fn is_bodyweight(&self) -> bool {
        self.max_weight <= 0.0
    }
}

#[derive(Default)]
struct RecordBuilder {
    max_weight: f64,
    max_reps: u32,
    max_duration_seconds: u32,
    max_volume: f64,
    reps_total: u64,
    reps_sets: u32,
    volume_total: f64,
    volume_sets: u32,
    days: BTreeSet<NaiveDate>,
    sessions: BTreeSet<String>,
    last: Option<DateTime<Utc>>,
    muscles: BTreeSet<BodyPart>,
}

impl RecordBuilder {
    fn add_set(&mut self, set: &LoggedSet, at: DateTime<Utc>) {
        if let Some(weight) = set.loaded_weight() {
            self.max_weight = self.max_weight.max(weight);
        }
        if let Some(reps) = set.reps {
            self.max_reps = self.max_reps.max(reps);
            self.reps_total += reps as u64;
            self.reps_sets += 1;
        }
        if let Some(duration) = set.duration_seconds {
            self.max_duration_seconds = self.max_duration_seconds.max(duration);
        }
        if let Some(volume) = set.volume() {
            self.max_volume = self.max_volume.max(volume);
            self.volume_total += volume;
            self.volume_sets += 1;
        }
        self.days.insert(at.date_naive());
        if self.last.is_none_or(|last| last < at) {
            self.last = Some(at);
        }
    }

    fn build(self, exercise: String, window_days: u32) -> PersonalRecord {
        let weeks = window_days.max(1) as f64 / 7.0;
        let average = |total: f64, count: u32| if count > 0 { total / count as f64 } else { 0.0 };

        PersonalRecord {
            exercise,
            max_weight: self.max_weight,
            max_reps: self.max_reps,
            max_duration_seconds: self.max_duration_seconds,
            max_volume: self.max_volume,
            average_reps: average(self.reps_total as f64, self.reps_sets),
            average_volume: average(self.volume_total, self.volume_sets),
            frequency: self.days.len() as f64 / weeks,
            session_count: self.sessions.len() as u32,
            last_workout_date: self.last,
            muscle_groups: self.muscles.into_iter().collect(),
        }
    }
}

/// When a set happened: its own timestamp, else when the session was worked
fn set_time(set: &LoggedSet, session: &WorkoutSession) -> DateTime<Utc> {
    set.completed_at.unwrap_or_else(|| session.worked_at())
}

/// Personal records for every exercise with at least one completed set
pub fn personal_records<'a>(
    sessions: impl IntoIterator<Item = &'a WorkoutSession>,
    window_days: u32,
) -> BTreeMap<String, PersonalRecord> {
    let mut builders: BTreeMap<String, RecordBuilder> = BTreeMap::new();

    for session in sessions {
        if !session.counts_toward_load() {
            continue;
        }
        for exercise in &session.exercises {
            let mut completed = exercise.completed_sets().peekable();
            if completed.peek().is_none() {
                continue;
            }

            let builder = builders.entry(exercise.exercise.clone()).or_default();
            builder.sessions.insert(session.id.clone());
            builder
                .muscles
                .extend(exercise.tagged_muscles().map(|(m, _)| muscles::normalize(m)));
            for set in completed {
                builder.add_set(set, set_time(set, session));
            }
        }
    }

    builders
        .into_iter()
        .map(|(name, builder)| {
            let record = builder.build(name.clone(), window_days);
            (name, record)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceCategory {
    Strength,
    Endurance,
    Volume,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordMetric {
    MaxWeight,
    MaxReps,
    MaxVolume,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPerformance {
    pub exercise: String,
    pub metric: RecordMetric,
    pub value: f64,
    pub unit: &'static str,
    pub category: PerformanceCategory,
}

impl PerformanceCategory {
    pub fn all() -> &'static [PerformanceCategory] {
        &[
            PerformanceCategory::Strength,
            PerformanceCategory::Endurance,
            PerformanceCategory::Volume,
        ]
    }

    fn metric(&self) -> (RecordMetric, &'static str) {
        match self {
            PerformanceCategory::Strength => (RecordMetric::MaxWeight, "kg"),
            PerformanceCategory::Endurance => (RecordMetric::MaxReps, "reps"),
            PerformanceCategory::Volume => (RecordMetric::MaxVolume, "kg"),
        }
    }

    fn value(&self, record: &PersonalRecord) -> f64 {
        match self {
            PerformanceCategory::Strength => record.max_weight,
            PerformanceCategory::Endurance => record.max_reps as f64,
            PerformanceCategory::Volume => record.max_volume,
        }
    }

    /// Bodyweight exercises cannot be ranked by load
    fn accepts(&self, record: &PersonalRecord) -> bool {
        match self {
            PerformanceCategory::Strength | PerformanceCategory::Volume => !record.is_bodyweight(),
            PerformanceCategory::Endurance => true,
        }
    }
}

/// Top `n` performances per category: value desc, then most recent, then name
pub fn top_performances(records: &BTreeMap<String, PersonalRecord>, n: usize) -> Vec<TopPerformance> {
    let mut top = Vec::new();

    for category in PerformanceCategory::all() {
        let mut candidates: Vec<&PersonalRecord> = records
            .values()
            .filter(|r| category.accepts(r) && category.value(r) > 0.0)
            .collect();

        candidates.sort_by(|a, b| {
            category
                .value(b)
                .partial_cmp(&category.value(a))
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.last_workout_date.cmp(&a.last_workout_date))
                .then_with(|| a.exercise.cmp(&b.exercise))
        });

        let (metric, unit) = category.metric();
        top.extend(candidates.into_iter().take(n).map(|r| TopPerformance {
            exercise: r.exercise.clone(),
            metric,
            value: category.value(r),
            unit,
            category: *category,
        }));
    }

    top
}

/// Metric charted by a progression series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesMetric {
    Weight,
    Reps,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Day,
    Week,
    Month,
}

impl Bucket {
    /// Days for up to a month, weeks up to ~6 months, months beyond
    pub fn for_window(window_days: u32) -> Self {
        match window_days {
            0..=30 => Bucket::Day,
            31..=180 => Bucket::Week,
            _ => Bucket::Month,
        }
    }

    /// First calendar day of the bucket containing `date` (weeks start Monday)
    pub fn start_of(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Bucket::Day => date,
            Bucket::Week => date - Duration::days(date.weekday().num_days_from_monday() as i64),
            Bucket::Month => NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionPoint {
    pub period_start: NaiveDate,
    pub value: f64,
}

/// Peak value per bucket for one exercise. Never a sum or average
pub fn progression_series<'a>(
    sessions: impl IntoIterator<Item = &'a WorkoutSession>,
    exercise: &str,
    metric: SeriesMetric,
    bucket: Bucket,
) -> Vec<ProgressionPoint> {
    let mut peaks: BTreeMap<NaiveDate, f64> = BTreeMap::new();

    for session in sessions {
        if !session.counts_toward_load() {
            continue;
        }
        for entry in session.exercises.iter().filter(|e| e.exercise == exercise) {
            for set in entry.completed_sets() {
                let value = match metric {
                    SeriesMetric::Weight => set.loaded_weight(),
                    SeriesMetric::Reps => set.reps.map(|r| r as f64),
                };
                let Some(value) = value else {
                    continue;
                };

                let period = bucket.start_of(set_time(set, session).date_naive());
                let peak = peaks.entry(period).or_insert(value);
                *peak = peak.max(value);
            }
        }
    }

    peaks
        .into_iter()
        .map(|(period_start, value)| ProgressionPoint { period_start, value })
        .collect()
}
