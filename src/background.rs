use std::sync::Arc;
use std::time::Duration;
use chrono::{DateTime, Utc};
use tokio::time::sleep;
use tracing::{error, info, warn, info_span, Instrument};
use uuid::Uuid;
use crate::error::AppError;
use crate::state::AppState;
use crate::domain::services::recurrence::expand_slots;

pub async fn start_slot_horizon_worker(state: Arc<AppState>) {
    info!("Starting slot horizon worker...");

    let interval = Duration::from_secs(state.config.slot_worker_interval_secs.max(60));

    loop {
        let span = info_span!("slot_horizon", run_id = %Uuid::new_v4());

        async {
            match extend_slot_horizon(&state, Utc::now()).await {
                Ok(0) => info!("Slot horizon already up to date"),
                Ok(created) => info!(created, "Generated slots up to the horizon"),
                Err(e) => error!("Slot horizon run failed: {:?}", e),
            }
        }
            .instrument(span)
            .await;

        sleep(interval).await;
    }
}

/// Materializes every active recurring schedule from today up to the configured horizon.
/// Already generated slots are left untouched.
pub async fn extend_slot_horizon(state: &AppState, now: DateTime<Utc>) -> Result<u64, AppError> {
    let tz = state.config.studio_timezone;
    let from = now.with_timezone(&tz).date_naive();
    let to = from + chrono::Duration::weeks(state.config.slot_horizon_weeks as i64) - chrono::Duration::days(1);

    let schedules = state.schedule_repo.list().await?;

    let mut created = 0;
    for schedule in schedules.iter().filter(|s| s.is_available && s.is_recurrent) {
        let slots = expand_slots(schedule, from, to, &tz);
        if slots.is_empty() {
            continue;
        }
        match state.slot_repo.insert_many(&slots).await {
            Ok(inserted) => created += inserted,
            Err(e) => warn!(schedule_id = %schedule.id, "Failed to extend slots: {:?}", e),
        }
    }
    Ok(created)
}
