pub mod canvas;
pub mod cover_flow;
pub mod generation_task;
pub mod protocol;
pub mod rest;
pub mod state;
pub mod ws_handler;

// Re-export the WebSocket handler and the generation entry points for the
// binary that builds the router.
pub use generation_task::{cancel_generation, start_generation};
pub use ws_handler::ws_handler;
