//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::catalog::Catalog;
use crate::config::Config;
use crate::web::protocol::ServerMessage;
use lumiere_core::{LightingGenerator, Studio};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tokio_util::sync::CancellationToken;

/// How many undelivered events a slow WebSocket subscriber may fall behind.
const EVENT_BUFFER: usize = 64;

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
pub struct AppState {
    pub config: Arc<Config>,
    pub generator: Arc<dyn LightingGenerator>,
    pub catalog: Arc<Catalog>,
    /// The one owner of room, results, history and placements.
    pub studio: Mutex<Studio>,
    /// Cancels the running generation session, if there is one.
    pub active_generation: Mutex<Option<CancellationToken>>,
    events: broadcast::Sender<ServerMessage>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        generator: Arc<dyn LightingGenerator>,
        catalog: Arc<Catalog>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            config,
            generator,
            catalog,
            studio: Mutex::new(Studio::new()),
            active_generation: Mutex::new(None),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerMessage> {
        self.events.subscribe()
    }

    /// Sends an event to every connected socket. Having no listener is fine.
    pub fn publish(&self, message: ServerMessage) {
        let _ = self.events.send(message);
    }
}
