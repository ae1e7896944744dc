//! crates/lumiere_core/src/orchestrator.rs
//!
//! Drives one generation session: the original image followed by one remote
//! call per lighting color, strictly one after another.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{GeneratedImage, LightingColor, RoomImage};
use crate::ports::{LightingGenerator, SessionEvent, SessionObserver};

/// The outcome of a single generation session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub session_id: Uuid,
    pub original: RoomImage,
    /// The original image first, then every successful variant in color order.
    pub variants: Vec<GeneratedImage>,
    /// How many colors were attempted before the session ended.
    pub attempted: usize,
    pub cancelled: bool,
}

/// Percentage of `attempted` out of `total`, exactly 100 once every color was tried.
pub fn progress_percent(attempted: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    (attempted as f64 / total as f64) * 100.0
}

/// Runs the six-color session for `original`.
///
/// Each color is awaited before the next one is requested. A color whose
/// generation fails is left out of the result without a placeholder, and
/// progress still advances past it.
pub async fn run_session(
    generator: &dyn LightingGenerator,
    original: &RoomImage,
    observer: &dyn SessionObserver,
) -> SessionReport {
    let session_id = Uuid::new_v4();
    let colors = LightingColor::GENERATED;
    let total = colors.len();

    info!("Generation session {} started.", session_id);
    observer
        .on_event(SessionEvent::Started { session_id, total })
        .await;

    let mut variants = vec![GeneratedImage {
        id: Uuid::new_v4(),
        jpeg: original.jpeg.clone(),
        color: LightingColor::Original,
        created_at: Utc::now(),
    }];
    let mut attempted = 0;
    let mut cancelled = false;

    for color in colors {
        if observer.is_cancelled() {
            warn!(
                "Generation session {} cancelled after {} of {} colors.",
                session_id, attempted, total
            );
            cancelled = true;
            break;
        }

        match generator.generate(original, color).await {
            Some(jpeg) => {
                let image = GeneratedImage {
                    id: Uuid::new_v4(),
                    jpeg,
                    color,
                    created_at: Utc::now(),
                };
                observer
                    .on_event(SessionEvent::VariantReady(image.clone()))
                    .await;
                variants.push(image);
            }
            None => {
                observer.on_event(SessionEvent::ColorSkipped(color)).await;
            }
        }

        attempted += 1;
        observer
            .on_event(SessionEvent::Progress(progress_percent(attempted, total)))
            .await;
    }

    info!(
        "Generation session {} finished with {} of {} variants.",
        session_id,
        variants.len() - 1,
        total
    );

    SessionReport {
        session_id,
        original: original.clone(),
        variants,
        attempted,
        cancelled,
    }
}
