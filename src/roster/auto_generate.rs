//! Background duty generation.
//!
//! Keeps duties materialized from the current week start through the
//! configured horizon so coverage exists without operator action. Safe to
//! run alongside grab/drop traffic: generation only inserts missing rows.

use tokio::time::{interval, Duration};

use crate::config::DutiesConfig;
use crate::db::DbPool;

use super::generator::DutyGenerator;
use super::{generation_range, week_start};

/// Spawn the periodic generation task.
pub fn spawn_generation_task(db: DbPool, config: DutiesConfig) {
    if !config.auto_generate {
        tracing::info!("Automatic duty generation is disabled");
        return;
    }

    let interval_secs = config.generation_interval_hours * 3600;
    tracing::info!(
        interval_hours = config.generation_interval_hours,
        weeks_ahead = config.generate_weeks_ahead,
        "Starting duty generation task"
    );

    let generator = DutyGenerator::new(db);
    let weeks_ahead = config.generate_weeks_ahead;

    tokio::spawn(async move {
        let mut tick = interval(Duration::from_secs(interval_secs));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tick.tick().await;
            let start = week_start(chrono::Local::now().date_naive());
            let (start, end) = generation_range(start, weeks_ahead);
            match generator.generate(start, end).await {
                Ok(stats) => {
                    if stats.created > 0 {
                        tracing::info!(
                            created = stats.created,
                            existing = stats.existing,
                            %start,
                            %end,
                            "Generated duties"
                        );
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Duty generation cycle failed");
                }
            }
        }
    });
}
