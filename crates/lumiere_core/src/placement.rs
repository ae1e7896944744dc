//! crates/lumiere_core/src/placement.rs
//!
//! Furniture stickers placed on the room canvas, and the mapping from client
//! (pointer) coordinates to canvas percentages.

use uuid::Uuid;

use crate::domain::{PlacedProduct, Position, Product};

/// The on-screen bounding box of the room canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl CanvasRect {
    /// Maps a client point to a clamped canvas position.
    /// Returns `None` when the canvas has no usable area.
    pub fn to_position(&self, client_x: f64, client_y: f64) -> Option<Position> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return None;
        }
        let x = (client_x - self.left) / self.width * 100.0;
        let y = (client_y - self.top) / self.height * 100.0;
        Some(Position::clamped(x, y))
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlacementBoard {
    items: Vec<PlacedProduct>,
    dragging: Option<Uuid>,
}

impl PlacementBoard {
    pub fn items(&self) -> &[PlacedProduct] {
        &self.items
    }

    pub fn dragging(&self) -> Option<Uuid> {
        self.dragging
    }

    pub fn get(&self, unique_id: Uuid) -> Option<&PlacedProduct> {
        self.items.iter().find(|p| p.unique_id == unique_id)
    }

    pub fn drop_product(&mut self, product: Product, position: Position) -> &PlacedProduct {
        let index = self.items.len();
        self.items.push(PlacedProduct {
            unique_id: Uuid::new_v4(),
            product,
            position,
        });
        &self.items[index]
    }

    /// Starts dragging a placement. Returns `false` if it does not exist.
    pub fn grab(&mut self, unique_id: Uuid) -> bool {
        if self.get(unique_id).is_none() {
            return false;
        }
        self.dragging = Some(unique_id);
        true
    }

    /// Moves the grabbed placement, if any.
    pub fn drag_to(&mut self, position: Position) -> Option<&PlacedProduct> {
        let id = self.dragging?;
        let item = self.items.iter_mut().find(|p| p.unique_id == id)?;
        item.position = position;
        Some(&*item)
    }

    pub fn release(&mut self) {
        self.dragging = None;
    }

    pub fn remove(&mut self, unique_id: Uuid) -> Option<PlacedProduct> {
        let index = self.items.iter().position(|p| p.unique_id == unique_id)?;
        if self.dragging == Some(unique_id) {
            self.dragging = None;
        }
        Some(self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.dragging = None;
    }
}
