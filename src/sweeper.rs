//! Background cleanup of finished rooms

use crate::state::AppState;
use std::sync::Arc;
use std::time::Duration;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// How long a completed room stays visible before being reclaimed
const COMPLETED_GRACE_MINUTES: i64 = 5;

/// Spawn a background task that reclaims completed rooms after a grace
/// period, so abandoned sessions don't accumulate.
pub fn spawn_room_sweeper(state: Arc<AppState>) {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(SWEEP_INTERVAL).await;

            let swept = state
                .sweep_finished_rooms(chrono::Duration::minutes(COMPLETED_GRACE_MINUTES))
                .await;
            if swept > 0 {
                tracing::info!("Swept {} finished rooms", swept);
            }
        }
    });
}
