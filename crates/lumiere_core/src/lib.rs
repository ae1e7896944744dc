pub mod cover_flow;
pub mod domain;
pub mod orchestrator;
pub mod placement;
pub mod ports;
pub mod studio;

pub use cover_flow::{CoverFlow, CoverFlowError, ItemLayout};
pub use domain::{
    GeneratedImage, HistoryItem, LightingColor, PlacedProduct, Position, Product, RoomImage,
};
pub use orchestrator::{run_session, SessionReport};
pub use placement::{CanvasRect, PlacementBoard};
pub use ports::{LightingGenerator, PortError, PortResult, SessionEvent, SessionObserver};
pub use studio::{GenerationStatus, Studio, StudioError};
