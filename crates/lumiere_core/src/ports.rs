//! crates/lumiere_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like image-generation APIs.

use async_trait::async_trait;
use bytes::Bytes;
use tracing::warn;
use uuid::Uuid;

use crate::domain::{GeneratedImage, LightingColor, RoomImage};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., network, provider).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait LightingGenerator: Send + Sync {
    /// Re-lights the room in the given color, reporting why a call failed.
    async fn relight(&self, room: &RoomImage, color: LightingColor) -> PortResult<Bytes>;

    /// Re-lights the room in the given color. Any failure is logged and
    /// reported as `None`; this never surfaces an error to the caller.
    async fn generate(&self, room: &RoomImage, color: LightingColor) -> Option<Bytes> {
        match self.relight(room, color).await {
            Ok(jpeg) => Some(jpeg),
            Err(e) => {
                warn!("Lighting generation for {} failed: {}", color, e);
                None
            }
        }
    }
}

/// Something that happened while a generation session was running.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Started { session_id: Uuid, total: usize },
    VariantReady(GeneratedImage),
    ColorSkipped(LightingColor),
    /// Percentage of colors attempted so far, in `[0, 100]`.
    Progress(f64),
}

#[async_trait]
pub trait SessionObserver: Send + Sync {
    async fn on_event(&self, event: SessionEvent);

    /// Checked before every color attempt.
    fn is_cancelled(&self) -> bool {
        false
    }
}
