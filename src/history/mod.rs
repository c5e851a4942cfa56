//! History module - logged sessions, sets and manual feedback reports

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One completed repetition unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedSet {
    pub reps: Option<u32>,
    pub duration_seconds: Option<u32>, // Time-based exercises (plank)
    pub weight_external: Option<f64>,  // None = bodyweight
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl LoggedSet {
    /// External weight, if the set was loaded at all
    pub fn loaded_weight(&self) -> Option<f64> {
        self.weight_external.filter(|w| *w > 0.0)
    }

    /// weight x reps for externally loaded sets
    pub fn volume(&self) -> Option<f64> {
        let weight = self.loaded_weight()?;
        let reps = self.reps?;
        Some(weight * reps as f64)
    }
}

/// Whether a muscle is the main mover of an exercise or an assisting one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MuscleRole {
    Primary,
    Secondary,
}

impl MuscleRole {
    /// Load attributed per completed set
    pub fn weight(&self) -> f64 {
        match self {
            MuscleRole::Primary => 1.0,
            MuscleRole::Secondary => 0.5,
        }
    }
}

/// An exercise instance within a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionExercise {
    pub exercise: String,
    #[serde(default)]
    pub sets: Vec<LoggedSet>,
    #[serde(default)]
    pub target_sets: Option<u32>,
    #[serde(default)]
    pub target_reps: Option<u32>,
    #[serde(default)]
    pub primary_muscles: Vec<String>,
    #[serde(default)]
    pub secondary_muscles: Vec<String>,
}

impl SessionExercise {
    pub fn completed_sets(&self) -> impl Iterator<Item = &LoggedSet> {
        self.sets.iter().filter(|s| s.completed)
    }

    pub fn completed_set_count(&self) -> u32 {
        self.completed_sets().count() as u32
    }

    /// Check completion against the planned sets/reps
    pub fn is_target_met(&self) -> bool {
        let done = self.completed_set_count();
        if done == 0 {
            return false;
        }

        if let Some(target_sets) = self.target_sets
            && done < target_sets
        {
            return false;
        }

        match self.target_reps {
            Some(target_reps) => self
                .completed_sets()
                .all(|s| s.reps.is_some_and(|r| r >= target_reps)),
            None => true,
        }
    }

    /// All tagged muscles with their role (primary first)
    pub fn tagged_muscles(&self) -> impl Iterator<Item = (&str, MuscleRole)> {
        self.primary_muscles
            .iter()
            .map(|m| (m.as_str(), MuscleRole::Primary))
            .chain(
                self.secondary_muscles
                    .iter()
                    .map(|m| (m.as_str(), MuscleRole::Secondary)),
            )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Paused,
    Completed,
    Cancelled,
}

/// Workout session record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSession {
    pub id: String,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    pub status: SessionStatus,
    #[serde(default)]
    pub exercises: Vec<SessionExercise>,
}

impl WorkoutSession {
    /// Cancelled sessions never count toward training load
    pub fn counts_toward_load(&self) -> bool {
        self.status != SessionStatus::Cancelled
    }

    /// Timestamp used for "last worked" when a set carries none
    pub fn worked_at(&self) -> DateTime<Utc> {
        self.end_time.unwrap_or(self.start_time)
    }

    pub fn completed_set_count(&self) -> u32 {
        self.exercises.iter().map(|e| e.completed_set_count()).sum()
    }
}

/// Manual check-in feeling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Feeling {
    Good,
    Tight,
    Sore,
    Injured,
}

/// Manual soreness/pain report for a body part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackReport {
    pub body_part: String,
    pub feeling: Feeling,
    pub intensity: u8, // 0..=10
    #[serde(default)]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl FeedbackReport {
    /// Reported at or before `now` and not yet resolved at `now`
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.created_at <= now && self.resolved_at.is_none_or(|r| r > now)
    }

    pub fn signals_pain(&self) -> bool {
        matches!(self.feeling, Feeling::Sore | Feeling::Injured)
    }
}

/// Everything the engine needs about one user's history
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySnapshot {
    #[serde(default)]
    pub sessions: Vec<WorkoutSession>,
    #[serde(default)]
    pub feedback: Vec<FeedbackReport>,
}

impl HistorySnapshot {
    /// Load a history snapshot exported as JSON
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read history {}", path.display()))?;
        let snapshot = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse history {}", path.display()))?;
        Ok(snapshot)
    }
}
