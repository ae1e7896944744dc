//! services/api/src/web/generation_task.rs
//!
//! This module contains the asynchronous "worker" responsible for one
//! lighting generation session.

use crate::web::{protocol::ServerMessage, state::AppState};
use async_trait::async_trait;
use lumiere_core::{run_session, RoomImage, SessionEvent, SessionObserver, StudioError};
use std::sync::Arc;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Forwards session events to the studio (progress) and to WebSocket subscribers.
struct BroadcastObserver {
    app_state: Arc<AppState>,
    cancellation_token: CancellationToken,
}

#[async_trait]
impl SessionObserver for BroadcastObserver {
    async fn on_event(&self, event: SessionEvent) {
        if let SessionEvent::Progress(percent) = event {
            self.app_state.studio.lock().await.record_progress(percent);
        }
        self.app_state.publish(ServerMessage::from(event));
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }
}

/// Marks a session as running and spawns the task that performs it.
///
/// Fails if there is no room photo or a session is already running.
pub async fn start_generation(app_state: Arc<AppState>) -> Result<(), StudioError> {
    let (room, token) = {
        let mut studio = app_state.studio.lock().await;
        let room = studio.begin_session()?;
        let token = CancellationToken::new();
        *app_state.active_generation.lock().await = Some(token.clone());
        (room, token)
    };

    let worker = tokio::spawn(generation_process(app_state.clone(), room, token));
    tokio::spawn(async move {
        if let Err(e) = worker.await {
            recover_from_failed_session(&app_state, e).await;
        }
    });
    Ok(())
}

/// Returns the studio to idle after the session task died without recording
/// its report, so new sessions and uploads are accepted again.
async fn recover_from_failed_session(app_state: &AppState, err: JoinError) {
    error!("Generation task ended abnormally: {}", err);
    {
        let mut studio = app_state.studio.lock().await;
        studio.abort_session();
        *app_state.active_generation.lock().await = None;
    }
    app_state.publish(ServerMessage::Error {
        message: "Generation failed unexpectedly; no results were recorded.".to_string(),
    });
}

/// Requests cooperative cancellation of the running session.
/// Returns `false` when nothing is running.
pub async fn cancel_generation(app_state: &AppState) -> bool {
    match app_state.active_generation.lock().await.as_ref() {
        Some(token) => {
            info!("Cancelling the running generation session.");
            token.cancel();
            true
        }
        None => false,
    }
}

/// Runs the six-color session and records the outcome.
///
/// The studio lock is only taken between remote calls, never across one.
pub async fn generation_process(
    app_state: Arc<AppState>,
    room: RoomImage,
    cancellation_token: CancellationToken,
) {
    let observer = BroadcastObserver {
        app_state: app_state.clone(),
        cancellation_token,
    };

    let report = run_session(app_state.generator.as_ref(), &room, &observer).await;
    let cancelled = report.cancelled;

    let (history_id, result_count) = {
        let mut studio = app_state.studio.lock().await;
        let item = studio.finish_session(report);
        let recorded = (item.id, item.generated_variants.len());
        // Cleared under the studio lock so a session started right after
        // this one cannot lose its token.
        *app_state.active_generation.lock().await = None;
        recorded
    };

    info!(
        "Generation recorded as history entry {} with {} images.",
        history_id, result_count
    );
    app_state.publish(ServerMessage::SessionCompleted {
        history_id,
        result_count,
        cancelled,
    });
}
