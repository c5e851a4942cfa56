//! Training volume per body part and category

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::history::WorkoutSession;
use crate::muscles::{self, BodyPart, Category};

/// Additive fold of completed sets over a set of sessions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VolumeSummary {
    /// Weighted volume (primary 1.0, secondary 0.5 per completed set)
    pub volume: BTreeMap<BodyPart, f64>,
    /// Raw completed sets touching the body part
    pub set_counts: BTreeMap<BodyPart, u32>,
    pub last_worked: BTreeMap<BodyPart, DateTime<Utc>>,
    /// Distinct work timestamps, used to learn rest intervals
    pub worked_at: BTreeMap<BodyPart, BTreeSet<DateTime<Utc>>>,
    pub category_volume: BTreeMap<Category, f64>,
    /// Raw completed sets touching the category, each set counted once
    pub category_sets: BTreeMap<Category, u32>,
    pub total_sets: u32,
}

/// One row of the muscle-group focus breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryShare {
    pub category: Category,
    pub percent: f64,
    pub total_sets: u32,
}

impl VolumeSummary {
    /// Fold every completed set of every non-cancelled session
    pub fn aggregate<'a>(sessions: impl IntoIterator<Item = &'a WorkoutSession>) -> Self {
        let mut summary = Self::default();
        for session in sessions {
            summary.add_session(session);
        }
        summary
    }

    fn add_session(&mut self, session: &WorkoutSession) {
        if !session.counts_toward_load() {
            return;
        }

        for exercise in &session.exercises {
            let completed: Vec<_> = exercise.completed_sets().collect();
            if completed.is_empty() {
                continue;
            }
            let set_count = completed.len() as u32;
            let last_set_at = completed
                .iter()
                .filter_map(|s| s.completed_at)
                .max()
                .unwrap_or_else(|| session.worked_at());

            self.total_sets += set_count;

            // The same body part may be tagged twice (e.g. "quads" primary, "vastus" secondary)
            let mut parts_seen: BTreeSet<BodyPart> = BTreeSet::new();
            let mut categories_seen: BTreeSet<Category> = BTreeSet::new();

            for (muscle, role) in exercise.tagged_muscles() {
                let part = muscles::normalize(muscle);
                let load = role.weight() * set_count as f64;

                *self.volume.entry(part.clone()).or_insert(0.0) += load;
                if let Some(category) = part.category() {
                    *self.category_volume.entry(category).or_insert(0.0) += load;
                    categories_seen.insert(category);
                }
                parts_seen.insert(part);
            }

            for part in parts_seen {
                *self.set_counts.entry(part.clone()).or_insert(0) += set_count;
                self.worked_at
                    .entry(part.clone())
                    .or_default()
                    .insert(last_set_at);

                let last = self.last_worked.entry(part).or_insert(last_set_at);
                if *last < last_set_at {
                    *last = last_set_at;
                }
            }

            for category in categories_seen {
                *self.category_sets.entry(category).or_insert(0) += set_count;
            }
        }
    }

    /// Combine two summaries; aggregating disjoint session sets then merging
    /// equals aggregating their union
    pub fn merge(mut self, other: VolumeSummary) -> Self {
        for (part, volume) in other.volume {
            *self.volume.entry(part).or_insert(0.0) += volume;
        }
        for (part, count) in other.set_counts {
            *self.set_counts.entry(part).or_insert(0) += count;
        }
        for (part, at) in other.last_worked {
            let last = self.last_worked.entry(part).or_insert(at);
            if *last < at {
                *last = at;
            }
        }
        for (part, times) in other.worked_at {
            self.worked_at.entry(part).or_default().extend(times);
        }
        for (category, volume) in other.category_volume {
            *self.category_volume.entry(category).or_insert(0.0) += volume;
        }
        for (category, count) in other.category_sets {
            *self.category_sets.entry(category).or_insert(0) += count;
        }
        self.total_sets += other.total_sets;
        self
    }

    pub fn volume_of(&self, part: &BodyPart) -> f64 {
        self.volume.get(part).copied().unwrap_or(0.0)
    }

    pub fn last_worked_at(&self, part: &BodyPart) -> Option<DateTime<Utc>> {
        self.last_worked.get(part).copied()
    }

    /// Share of total category volume for all six categories, in fixed order
    pub fn distribution(&self) -> Vec<CategoryShare> {
        let total: f64 = Category::all()
            .iter()
            .map(|c| self.category_volume.get(c).copied().unwrap_or(0.0))
            .sum();

        Category::all()
            .iter()
            .map(|category| {
                let volume = self.category_volume.get(category).copied().unwrap_or(0.0);
                let percent = if total > 0.0 { volume / total * 100.0 } else { 0.0 };
                CategoryShare {
                    category: *category,
                    percent,
                    total_sets: self.category_sets.get(category).copied().unwrap_or(0),
                }
            })
            .collect()
    }
}

/// Sessions that started in `(now - days, now]`
pub fn sessions_in_window(
    sessions: &[WorkoutSession],
    now: DateTime<Utc>,
    days: u32,
) -> Vec<&WorkoutSession> {
    let cutoff = now - Duration::days(days as i64);
    sessions
        .iter()
        .filter(|s| s.start_time > cutoff && s.start_time <= now)
        .collect()
}
