//! liftready - Training-load and recovery readiness engine

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use liftready::engine::records::{self, Bucket, SeriesMetric};
use liftready::engine::volume;
use liftready::timer::{SessionTimer, TickEvent, TimerSnapshot, format_duration};
use liftready::{Engine, EngineConfig, EngineInput, HistorySnapshot};

const DEFAULT_TIMER_PATH: &str = "session_timer.json";

#[derive(Parser)]
#[command(name = "liftready")]
#[command(author, version, about = "Training-load and recovery readiness engine")]
struct Cli {
    /// Engine config file (JSON)
    #[arg(short, long, global = true, env = "LIFTREADY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full engine output as JSON
    Report {
        /// History snapshot exported as JSON
        history: PathBuf,

        /// Aggregation window in days
        #[arg(short, long, default_value = "30")]
        window: u32,

        /// Evaluation time (RFC 3339), defaults to now
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },

    /// Readiness per body part with suggested focus
    Readiness {
        history: PathBuf,

        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },

    /// Personal records and top performances
    Records {
        history: PathBuf,

        #[arg(short, long, default_value = "90")]
        window: u32,

        /// Show the progression series for one exercise
        #[arg(short, long)]
        exercise: Option<String>,

        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },

    /// Session timer bookkeeping
    Timer {
        /// Timer snapshot file
        #[arg(short, long, env = "LIFTREADY_TIMER", default_value = DEFAULT_TIMER_PATH)]
        snapshot: PathBuf,

        #[command(subcommand)]
        action: TimerAction,
    },
}

#[derive(Subcommand)]
enum TimerAction {
    /// Start a fresh session timer
    New,
    Show,
    Pause,
    Resume,
    /// Log a set and start the rest countdown
    LogSet,
    SkipRest,
    StartExercise,
    StopExercise,
    Finish,
    /// Tick once per second until Ctrl-C, then save
    Run,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Commands::Report { history, window, now } => {
            let engine = Engine::new(config);
            let input = load_input(&history, window, now)?;
            let output = engine.analyze(&input);
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Commands::Readiness { history, now } => {
            let engine = Engine::new(config);
            let input = load_input(&history, 7, now)?;
            let output = engine.analyze(&input);

            println!("Readiness at {}", input.now.format("%Y-%m-%d %H:%M"));
            println!("{:-<72}", "");
            for insight in &output.body_part_insights {
                let since = insight
                    .hours_since_last
                    .map(|h| format!("{:.0}h ago", h))
                    .unwrap_or_else(|| "never".to_string());
                println!(
                    "{:18} | {:15} | {:>10} | eligible in {:>4.0}h | 7d vol {:>5.1}",
                    insight.body_part.slug(),
                    insight.status.label(),
                    since,
                    insight.hours_until_eligible,
                    insight.seven_day_volume
                );
            }

            let focus: Vec<_> = output
                .suggested_focus()
                .iter()
                .take(3)
                .map(|i| i.body_part.slug().to_string())
                .collect();
            println!();
            println!("Suggested focus: {}", focus.join(", "));

            if let Some(next) = output.next_eligible().first() {
                println!(
                    "Next eligible: {} in {:.0}h",
                    next.body_part, next.hours_until_eligible
                );
            }
        }

        Commands::Records { history, window, exercise, now } => {
            let engine = Engine::new(config);
            let input = load_input(&history, window, now)?;
            let output = engine.analyze(&input);

            println!("Personal records ({} days)", window);
            println!("{:-<72}", "");
            for record in output.personal_records.values() {
                let load = if record.is_bodyweight() {
                    "bodyweight".to_string()
                } else {
                    format!("{:.1}kg / vol {:.0}", record.max_weight, record.max_volume)
                };
                println!(
                    "{:24} | {:22} | max {:>3} reps | {:.1}/week",
                    record.exercise, load, record.max_reps, record.frequency
                );
            }

            println!();
            for perf in &output.top_performances {
                println!(
                    "{:?} | {:24} | {:.1} {}",
                    perf.category, perf.exercise, perf.value, perf.unit
                );
            }

            if let Some(name) = exercise {
                let sessions = volume::sessions_in_window(&input.sessions, input.now, window);
                let metric = match output.personal_records.get(&name) {
                    Some(record) if record.is_bodyweight() => SeriesMetric::Reps,
                    _ => SeriesMetric::Weight,
                };
                let series = records::progression_series(
                    sessions,
                    &name,
                    metric,
                    Bucket::for_window(window),
                );

                println!();
                println!("Progression: {} ({:?})", name, metric);
                for point in series {
                    println!("{} | {:.1}", point.period_start, point.value);
                }
                if let Some(trend) = output.progression_trends.get(&name) {
                    println!(
                        "Trend: {:+.2}/week (r2 {:.2})",
                        trend.slope_per_day * 7.0,
                        trend.r2
                    );
                }
            }
        }

        Commands::Timer { snapshot, action } => {
            run_timer(&snapshot, action, config.rest_countdown_secs).await?;
        }
    }

    Ok(())
}

fn load_input(path: &Path, window_days: u32, now: Option<DateTime<Utc>>) -> Result<EngineInput> {
    let history = HistorySnapshot::load(path)?;
    info!(
        "Loaded {} sessions and {} feedback reports from {}",
        history.sessions.len(),
        history.feedback.len(),
        path.display()
    );
    Ok(EngineInput {
        sessions: history.sessions,
        feedback: history.feedback,
        now: now.unwrap_or_else(Utc::now),
        window_days,
        rest_hours_by_body_part: None,
    })
}

fn load_timer(path: &Path) -> Result<SessionTimer> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("no timer at {}, run `timer new` first", path.display()))?;
    let snapshot: TimerSnapshot = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse timer {}", path.display()))?;
    Ok(SessionTimer::from_snapshot(snapshot))
}

fn save_timer(path: &Path, timer: &SessionTimer) -> Result<()> {
    let json = serde_json::to_string_pretty(&timer.snapshot())?;
    std::fs::write(path, json).with_context(|| format!("failed to write timer {}", path.display()))
}

fn print_timer(timer: &SessionTimer) {
    let state = if timer.is_finished() {
        "finished"
    } else if timer.is_running() {
        "running"
    } else {
        "paused"
    };
    println!(
        "Session: {} ({}), {} sets",
        format_duration(timer.elapsed_secs()),
        state,
        timer.sets_logged()
    );
    if let Some(rest) = timer.rest_remaining_secs() {
        println!("Rest: {} left", format_duration(rest as u64));
    }
    if let Some(exercise) = timer.exercise_elapsed_secs() {
        println!("Exercise: {}", format_duration(exercise as u64));
    }
}

async fn run_timer(path: &Path, action: TimerAction, rest_countdown_secs: u32) -> Result<()> {
    let mut timer = match action {
        TimerAction::New => {
            let mut timer = SessionTimer::new(rest_countdown_secs);
            timer.start();
            timer
        }
        _ => load_timer(path)?,
    };

    match action {
        TimerAction::New | TimerAction::Show => {}
        TimerAction::Pause => timer.pause(),
        TimerAction::Resume => timer.resume(),
        TimerAction::LogSet => timer.log_set(),
        TimerAction::SkipRest => timer.skip_rest(),
        TimerAction::StartExercise => timer.start_exercise_timer(),
        TimerAction::StopExercise => {
            if let Some(secs) = timer.stop_exercise_timer() {
                println!("Exercise time: {}", format_duration(secs as u64));
            }
        }
        TimerAction::Finish => timer.finish(),
        TimerAction::Run => {
            tick_until_interrupted(&mut timer).await?;
        }
    }

    save_timer(path, &timer)?;
    print_timer(&timer);
    Ok(())
}

/// Resume a paused timer before ticking. A finished one cannot run again
fn prepare_run(timer: &mut SessionTimer) -> bool {
    if timer.is_finished() {
        warn!("Session already finished, start a new one with `timer new`");
        return false;
    }
    if !timer.is_running() {
        info!("Timer was paused, resuming");
        timer.resume();
    }
    true
}

async fn tick_until_interrupted(timer: &mut SessionTimer) -> Result<()> {
    if !prepare_run(timer) {
        return Ok(());
    }

    info!("Timer running, Ctrl-C to stop and save");
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    // First tick completes immediately
    interval.tick().await;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if timer.tick() == TickEvent::RestFinished {
                    info!("Rest over after {} sets, next set!", timer.sets_logged());
                }
            }
            result = tokio::signal::ctrl_c() => {
                result.context("failed to listen for Ctrl-C")?;
                break;
            }
        }
    }

    info!("Timer stopped at {}", format_duration(timer.elapsed_secs()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_resumes_paused_timer() {
        let mut timer = SessionTimer::new(90);
        timer.start();
        timer.pause();

        assert!(prepare_run(&mut timer));
        assert_eq!(timer.tick(), TickEvent::Running);
    }

    #[test]
    fn test_run_refuses_finished_timer() {
        let mut timer = SessionTimer::new(90);
        timer.start();
        timer.finish();

        assert!(!prepare_run(&mut timer));
        assert_eq!(timer.tick(), TickEvent::Idle);
    }
}
