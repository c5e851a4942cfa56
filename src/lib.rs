//! liftready - Training-load and recovery readiness engine
//!
//! Turns logged sets and soreness reports into per body part readiness,
//! muscle-group balance advice and personal records.

pub mod config;
pub mod engine;
pub mod history;
pub mod muscles;
pub mod timer;

pub use config::EngineConfig;
pub use engine::{Engine, EngineInput, EngineOutput};
pub use history::HistorySnapshot;
