//! crates/lumiere_core/src/studio.rs
//!
//! The single application-state container. Every change to the room, the
//! results, the history or the canvas goes through one of its transitions.

use chrono::Utc;
use uuid::Uuid;

use crate::cover_flow::{CoverFlow, CoverFlowError};
use crate::domain::{GeneratedImage, HistoryItem, PlacedProduct, Position, Product, RoomImage};
use crate::orchestrator::SessionReport;
use crate::placement::PlacementBoard;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StudioError {
    #[error("No room photo has been uploaded")]
    NoRoom,
    #[error("A generation session is already running")]
    SessionInProgress,
    #[error("History entry not found: {0}")]
    HistoryNotFound(Uuid),
    #[error("Placed product not found: {0}")]
    PlacementNotFound(Uuid),
    #[error(transparent)]
    CoverFlow(#[from] CoverFlowError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStatus {
    Idle,
    Running,
}

#[derive(Debug, Clone)]
pub struct Studio {
    room: Option<RoomImage>,
    results: Vec<GeneratedImage>,
    history: Vec<HistoryItem>,
    generation: GenerationStatus,
    /// Progress of the current or most recent session.
    progress: f64,
    cover_flow: CoverFlow,
    placements: PlacementBoard,
}

impl Default for Studio {
    fn default() -> Self {
        Self {
            room: None,
            results: Vec::new(),
            history: Vec::new(),
            generation: GenerationStatus::Idle,
            progress: 0.0,
            cover_flow: CoverFlow::default(),
            placements: PlacementBoard::default(),
        }
    }
}

impl Studio {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Accessors ---

    pub fn room(&self) -> Option<&RoomImage> {
        self.room.as_ref()
    }

    pub fn results(&self) -> &[GeneratedImage] {
        &self.results
    }

    /// Newest first.
    pub fn history(&self) -> &[HistoryItem] {
        &self.history
    }

    pub fn generation(&self) -> GenerationStatus {
        self.generation
    }

    pub fn is_generating(&self) -> bool {
        self.generation == GenerationStatus::Running
    }

    /// Percent complete of the running session, or where the last one ended.
    /// Reset to 0 only when the next session begins.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn cover_flow(&self) -> &CoverFlow {
        &self.cover_flow
    }

    pub fn cover_flow_mut(&mut self) -> &mut CoverFlow {
        &mut self.cover_flow
    }

    /// The result currently in front of the cover flow.
    pub fn centered(&self) -> Option<&GeneratedImage> {
        self.results.get(self.cover_flow.center())
    }

    pub fn placements(&self) -> &PlacementBoard {
        &self.placements
    }

    // --- Room and results ---

    /// Makes a freshly uploaded photo the active room, dropping the previous results.
    pub fn load_room(&mut self, room: RoomImage) -> Result<(), StudioError> {
        if self.is_generating() {
            return Err(StudioError::SessionInProgress);
        }
        self.set_room(room);
        self.set_results(Vec::new());
        Ok(())
    }

    /// Replaces the room and results with a past session.
    pub fn select_history(&mut self, history_id: Uuid) -> Result<(), StudioError> {
        if self.is_generating() {
            return Err(StudioError::SessionInProgress);
        }
        let item = self
            .history
            .iter()
            .find(|h| h.id == history_id)
            .cloned()
            .ok_or(StudioError::HistoryNotFound(history_id))?;
        self.set_room(item.original);
        self.set_results(item.generated_variants);
        Ok(())
    }

    fn set_room(&mut self, room: RoomImage) {
        let changed = self.room.as_ref().map(|r| r.id) != Some(room.id);
        if changed {
            self.placements.clear();
        }
        self.room = Some(room);
    }

    fn set_results(&mut self, results: Vec<GeneratedImage>) {
        self.cover_flow.reset(results.len());
        self.results = results;
    }

    // --- Generation sessions ---

    /// Marks a session as running and hands back the room to generate from.
    pub fn begin_session(&mut self) -> Result<RoomImage, StudioError> {
        if self.is_generating() {
            return Err(StudioError::SessionInProgress);
        }
        let room = self.room.clone().ok_or(StudioError::NoRoom)?;
        self.generation = GenerationStatus::Running;
        self.progress = 0.0;
        Ok(room)
    }

    /// Stores the latest progress of the running session; it never goes backwards.
    pub fn record_progress(&mut self, percent: f64) {
        if self.is_generating() {
            self.progress = self.progress.max(percent.clamp(0.0, 100.0));
        }
    }

    /// Records the finished session in history and makes it the active result set.
    pub fn finish_session(&mut self, report: SessionReport) -> &HistoryItem {
        let item = HistoryItem {
            id: Uuid::new_v4(),
            original: report.original,
            generated_variants: report.variants,
            date: Utc::now(),
        };
        self.set_room(item.original.clone());
        self.set_results(item.generated_variants.clone());
        self.history.insert(0, item);
        self.generation = GenerationStatus::Idle;
        &self.history[0]
    }

    /// Ends a session that died without a report. Room, results and history
    /// stay as they were before it began.
    pub fn abort_session(&mut self) {
        self.generation = GenerationStatus::Idle;
    }

    // --- Placements ---

    pub fn drop_product(
        &mut self,
        product: Product,
        position: Position,
    ) -> Result<&PlacedProduct, StudioError> {
        if self.room.is_none() {
            return Err(StudioError::NoRoom);
        }
        Ok(self.placements.drop_product(product, position))
    }

    pub fn grab_placement(&mut self, unique_id: Uuid) -> Result<(), StudioError> {
        if self.placements.grab(unique_id) {
            Ok(())
        } else {
            Err(StudioError::PlacementNotFound(unique_id))
        }
    }

    /// Moves the grabbed placement; `None` when nothing is grabbed.
    pub fn drag_placement(&mut self, position: Position) -> Option<&PlacedProduct> {
        self.placements.drag_to(position)
    }

    pub fn release_placement(&mut self) {
        self.placements.release();
    }

    pub fn remove_placement(&mut self, unique_id: Uuid) -> Result<PlacedProduct, StudioError> {
        self.placements
            .remove(unique_id)
            .ok_or(StudioError::PlacementNotFound(unique_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LightingColor;
    use bytes::Bytes;

    fn room(tag: &'static [u8]) -> RoomImage {
        RoomImage::new(Bytes::from_static(tag))
    }

    fn report_for(room: &RoomImage, colors: &[LightingColor]) -> SessionReport {
        let mut variants = vec![GeneratedImage {
            id: Uuid::new_v4(),
            jpeg: room.jpeg.clone(),
            color: LightingColor::Original,
            created_at: Utc::now(),
        }];
        variants.extend(colors.iter().map(|&color| GeneratedImage {
            id: Uuid::new_v4(),
            jpeg: Bytes::from_static(b"variant"),
            color,
            created_at: Utc::now(),
        }));
        SessionReport {
            session_id: Uuid::new_v4(),
            original: room.clone(),
            attempted: 6,
            cancelled: false,
            variants,
        }
    }

    fn product() -> Product {
        Product {
            id: "ikea-tertial".to_string(),
            name: "TERTIAL".to_string(),
            price: "$19.99".to_string(),
            category: "Work Lamp".to_string(),
            image: "https://example.com/tertial.jpg".to_string(),
            description: "Classic steel work lamp.".to_string(),
        }
    }

    #[test]
    fn session_requires_a_room() {
        let mut studio = Studio::new();
        assert_eq!(studio.begin_session(), Err(StudioError::NoRoom));
        assert!(!studio.is_generating());
    }

    #[test]
    fn second_session_is_rejected_while_running() {
        let mut studio = Studio::new();
        studio.load_room(room(b"a")).unwrap();
        studio.begin_session().unwrap();
        assert_eq!(studio.begin_session(), Err(StudioError::SessionInProgress));
        assert_eq!(studio.load_room(room(b"b")), Err(StudioError::SessionInProgress));
    }

    #[test]
    fn finished_session_becomes_results_and_history() {
        let mut studio = Studio::new();
        let a = room(b"a");
        studio.load_room(a.clone()).unwrap();
        let running = studio.begin_session().unwrap();
        studio.record_progress(50.0);
        studio.record_progress(30.0);
        assert_eq!(studio.generation(), GenerationStatus::Running);
        assert_eq!(studio.progress(), 50.0);
        studio.record_progress(100.0);

        let report = report_for(&running, &LightingColor::GENERATED);
        let expected = report.variants.clone();
        let item = studio.finish_session(report);
        assert_eq!(item.generated_variants, expected);
        assert_eq!(item.original, a);

        assert_eq!(studio.results(), expected.as_slice());
        assert_eq!(studio.history().len(), 1);
        assert_eq!(studio.cover_flow().len(), 7);
        assert_eq!(studio.generation(), GenerationStatus::Idle);
        assert_eq!(studio.progress(), 100.0, "last progress survives completion");
        studio.begin_session().unwrap();
        assert_eq!(studio.progress(), 0.0);
        assert_eq!(studio.centered().map(|g| g.color), Some(LightingColor::Original));
    }

    #[test]
    fn aborted_session_leaves_state_as_before() {
        let mut studio = Studio::new();
        let a = room(b"a");
        studio.load_room(a.clone()).unwrap();
        studio.begin_session().unwrap();
        studio.record_progress(50.0);

        studio.abort_session();
        assert!(!studio.is_generating());
        assert!(studio.history().is_empty());
        assert!(studio.results().is_empty());
        assert_eq!(studio.room(), Some(&a));
        studio.begin_session().unwrap();
    }

    #[test]
    fn history_is_newest_first_and_selectable() {
        let mut studio = Studio::new();
        let a = room(b"a");
        let b = room(b"b");

        studio.load_room(a.clone()).unwrap();
        studio.begin_session().unwrap();
        let first = studio.finish_session(report_for(&a, &[LightingColor::Red])).id;

        studio.load_room(b.clone()).unwrap();
        assert!(studio.results().is_empty());
        studio.begin_session().unwrap();
        let second = studio.finish_session(report_for(&b, &[])).id;

        let ids: Vec<_> = studio.history().iter().map(|h| h.id).collect();
        assert_eq!(ids, [second, first]);

        studio.cover_flow_mut().move_by(1);
        studio.select_history(first).unwrap();
        assert_eq!(studio.room(), Some(&a));
        assert_eq!(studio.results().len(), 2);
        assert_eq!(studio.cover_flow().center(), 0);

        let missing = Uuid::new_v4();
        assert_eq!(
            studio.select_history(missing),
            Err(StudioError::HistoryNotFound(missing))
        );
    }

    #[test]
    fn placements_need_a_room_and_clear_when_it_changes() {
        let mut studio = Studio::new();
        assert_eq!(
            studio
                .drop_product(product(), Position::clamped(50.0, 50.0))
                .err(),
            Some(StudioError::NoRoom)
        );

        let a = room(b"a");
        studio.load_room(a.clone()).unwrap();
        studio.begin_session().unwrap();
        let history_a = studio.finish_session(report_for(&a, &[])).id;
        studio
            .drop_product(product(), Position::clamped(50.0, 50.0))
            .unwrap();

        // Re-selecting the same room keeps the stickers.
        studio.select_history(history_a).unwrap();
        assert_eq!(studio.placements().items().len(), 1);

        studio.load_room(room(b"b")).unwrap();
        assert!(studio.placements().items().is_empty());
    }

    #[test]
    fn grabbing_and_removing_unknown_placements_fail() {
        let mut studio = Studio::new();
        let id = Uuid::new_v4();
        assert_eq!(studio.grab_placement(id), Err(StudioError::PlacementNotFound(id)));
        assert_eq!(
            studio.remove_placement(id).err(),
            Some(StudioError::PlacementNotFound(id))
        );
        assert!(studio.drag_placement(Position::clamped(1.0, 1.0)).is_none());
    }
}
